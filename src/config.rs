//! Bridge configuration.
//!
//! The editor plugin listens on a fixed local endpoint, so the defaults are
//! usually all that is needed. Each field can be overridden from the
//! environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `UNREAL_BRIDGE_HOST` | `host` |
//! | `UNREAL_BRIDGE_PORT` | `port` |
//! | `UNREAL_BRIDGE_FRAMING` | `framing` (`unframed` or `content_length`) |

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default editor plugin host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default editor plugin port.
pub const DEFAULT_PORT: u16 = 9000;

/// Size of the single reply read in unframed mode (16 KiB).
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 16 * 1024;

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_IO_TIMEOUT_MS: u64 = 30_000;

/// How reply boundaries are found on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingMode {
    /// No framing. The request is written as-is and the reply is whatever a
    /// single bounded read returns. This is what the editor plugin speaks.
    #[default]
    Unframed,
    /// `Content-Length: N\r\n\r\n` header before every message, both ways.
    ContentLength,
}

impl FramingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FramingMode::Unframed => "unframed",
            FramingMode::ContentLength => "content_length",
        }
    }
}

impl FromStr for FramingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "unframed" | "raw" => Ok(FramingMode::Unframed),
            "content_length" => Ok(FramingMode::ContentLength),
            other => Err(format!("unknown framing mode: {other}")),
        }
    }
}

/// Endpoint and transport settings for a [`crate::BridgeClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Editor plugin host.
    pub host: String,
    /// Editor plugin port.
    pub port: u16,
    /// Upper bound on establishing a connection, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Upper bound on a single send or receive, in milliseconds.
    pub io_timeout_ms: u64,
    /// Buffer size for the single unframed reply read.
    pub recv_buffer_size: usize,
    /// Wire framing.
    pub framing: FramingMode,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            io_timeout_ms: DEFAULT_IO_TIMEOUT_MS,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            framing: FramingMode::Unframed,
        }
    }
}

impl BridgeConfig {
    /// Defaults overridden by `UNREAL_BRIDGE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("UNREAL_BRIDGE_HOST") {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }

        if let Some(port) = lookup("UNREAL_BRIDGE_PORT") {
            match port.trim().parse() {
                Ok(port) => config.port = port,
                Err(e) => tracing::warn!("Ignoring UNREAL_BRIDGE_PORT={}: {}", port, e),
            }
        }

        if let Some(framing) = lookup("UNREAL_BRIDGE_FRAMING") {
            match framing.parse() {
                Ok(mode) => config.framing = mode,
                Err(e) => tracing::warn!("Ignoring UNREAL_BRIDGE_FRAMING: {}", e),
            }
        }

        config
    }

    /// `host:port` string used for dialling and in diagnostics.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }

    /// Point the config at a different endpoint.
    pub fn with_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_framing(mut self, framing: FramingMode) -> Self {
        self.framing = framing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_plugin_endpoint() {
        let config = BridgeConfig::default();
        assert_eq!(config.endpoint(), "127.0.0.1:9000");
        assert_eq!(config.recv_buffer_size, 16384);
        assert_eq!(config.framing, FramingMode::Unframed);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.io_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("UNREAL_BRIDGE_HOST", "10.0.0.5"),
            ("UNREAL_BRIDGE_PORT", "9100"),
            ("UNREAL_BRIDGE_FRAMING", "content-length"),
        ]));
        assert_eq!(config.endpoint(), "10.0.0.5:9100");
        assert_eq!(config.framing, FramingMode::ContentLength);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("UNREAL_BRIDGE_HOST", "   "),
            ("UNREAL_BRIDGE_PORT", "not-a-port"),
            ("UNREAL_BRIDGE_FRAMING", "chunked"),
        ]));
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_framing_mode_parse() {
        assert_eq!("unframed".parse::<FramingMode>(), Ok(FramingMode::Unframed));
        assert_eq!(
            "Content_Length".parse::<FramingMode>(),
            Ok(FramingMode::ContentLength)
        );
        assert!("lines".parse::<FramingMode>().is_err());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let json = r#"{"port": 9001, "framing": "content_length"}"#;
        let config: BridgeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, 9001);
        assert_eq!(config.framing, FramingMode::ContentLength);
    }
}
