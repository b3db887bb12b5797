//! Protocol limits the rule tables are written against.

/// Max global state entries (ints + byte slices) per application
pub const MAX_APP_GLOBALS: f64 = 64.0;

/// Max local state entries (ints + byte slices) per application
pub const MAX_APP_LOCALS: f64 = 16.0;

/// Max accounts + foreign apps + foreign assets referenced by one call
pub const MAX_APP_TOTAL_REFS: usize = 8;

pub const MAX_APP_ACCOUNTS: usize = 4;
pub const MAX_APP_FOREIGN_APPS: usize = 8;
pub const MAX_APP_FOREIGN_ASSETS: usize = 8;
pub const MAX_APP_ARGS: usize = 16;
pub const MAX_EXTRA_PAGES: f64 = 3.0;

/// Highest on-completion code (DeleteApplication)
pub const MAX_ON_COMPLETE: f64 = 5.0;
pub const ON_COMPLETE_NOOP: f64 = 0.0;
pub const ON_COMPLETE_UPDATE: f64 = 4.0;

/// Max rounds between first and last valid round
pub const MAX_TXN_LIFE: f64 = 1000.0;

pub const MAX_NOTE_BYTES: usize = 1000;

/// Fee bounds in Algos
pub const MIN_FEE: f64 = 0.001;
pub const MAX_FEE: f64 = 10.0;

/// Fractional digits of one Algo (microAlgos)
pub const ALGO_DECIMALS: u32 = 6;

/// Total Algo supply
pub const MAX_ALGO_AMOUNT: f64 = 10_000_000_000.0;

pub const MAX_ASSET_TOTAL: f64 = u64::MAX as f64;
pub const MAX_ASSET_DECIMALS: f64 = 19.0;
pub const MAX_UNIT_NAME_BYTES: usize = 8;
pub const MAX_ASSET_NAME_BYTES: usize = 32;
pub const MAX_ASSET_URL_BYTES: usize = 96;

pub const VOTE_KEY_BYTES: usize = 32;
pub const SELECTION_KEY_BYTES: usize = 32;
pub const STATE_PROOF_KEY_BYTES: usize = 64;

/// Coin label used when the node config does not name one
pub const DEFAULT_COIN_NAME: &str = "Algo";
