//! Server configuration types.
//!
//! Address/port bindings and request limits for the webhook listener.
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_BODY_SIZE, DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT};

fn default_address() -> String {
    DEFAULT_SERVER_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0)
    #[serde(default = "default_address")]
    pub address: String,

    /// Port to listen on (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted webhook body in bytes (default: 1 MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ServerConfig {
    /// `address:port` as a single socket address string
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
