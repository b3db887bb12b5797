//! Browser console backend for the `log` facade

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::str::FromStr;
use wasm_bindgen::prelude::*;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!(
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        ));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Route engine logs to the browser console.
///
/// `level` is one of `off`, `error`, `warn`, `info`, `debug`, `trace`
/// (default `warn`). Calling it again only changes the level.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) -> Result<(), JsValue> {
    let filter = match level.as_deref() {
        Some(level) => LevelFilter::from_str(level)
            .map_err(|_| JsValue::from_str(&format!("Invalid log level: {}", level)))?,
        None => LevelFilter::Warn,
    };
    // Already installed on a second call; only the level changes then
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(filter);
    Ok(())
}
