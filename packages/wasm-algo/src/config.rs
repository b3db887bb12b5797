//! Node configuration handed in by the host page

use crate::constants::DEFAULT_COIN_NAME;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHeader {
    pub key: String,
    pub value: String,
}

/// Connection settings for the node the composer talks to.
///
/// Only `coin_name` affects the form; the rest is carried for the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    pub coin_name: Option<String>,
    pub node_server: String,
    pub node_token: String,
    pub node_port: String,
    pub node_headers: Vec<NodeHeader>,
}

impl NodeConfig {
    /// Label for native amounts, e.g. "Algo" on mainnet
    pub fn coin_label(&self) -> &str {
        self.coin_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_COIN_NAME)
    }
}
