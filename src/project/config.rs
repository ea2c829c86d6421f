//! Connection settings consumed by the client/daemon transport.

use std::fmt;

use smol_str::SmolStr;

use crate::error::{Error, Result};

/// Port the indexing daemon listens on when none is given.
pub const DEFAULT_TCP_PORT: u16 = 12526;

/// Split a `host[:port]` argument.
///
/// Without a colon the default port is used. A port that is missing,
/// zero or not a number makes the whole argument invalid.
pub fn parse_host(arg: &str) -> Option<(SmolStr, u16)> {
    match arg.split_once(':') {
        Some((host, port)) => port
            .parse::<u16>()
            .ok()
            .filter(|&port| port != 0)
            .map(|port| (SmolStr::new(host), port)),
        None => Some((SmolStr::new(arg), DEFAULT_TCP_PORT)),
    }
}

/// Where to reach the indexing daemon.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerConfig {
    pub host: SmolStr,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<SmolStr>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Build from a command-line style `host[:port]` argument.
    pub fn from_host_arg(arg: &str) -> Result<Self> {
        let (host, port) = parse_host(arg).ok_or_else(|| Error::InvalidHost(arg.to_owned()))?;
        Ok(Self { host, port })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_TCP_PORT)
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
