//! `[serve]` section configuration.
//!
//! Contains preview server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! host = "127.0.0.1"          # Interface passed to `hugo server --bind`
//! port = 4321                 # HTTP port number
//! flags = ["-D", "-F"]        # Extra flags passed through to `hugo server`
//! watch = true                # Recompile documents on change while serving
//! ```
//!
//! Use `host = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub host: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Passthrough flags for `hugo server`.
    pub flags: Vec<String>,

    /// Recompile changed documents while the server runs.
    pub watch: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 4321,
            flags: ["-D", "-F", "--navigateToChanged"]
                .into_iter()
                .map(String::from)
                .collect(),
            watch: true,
        }
    }
}
