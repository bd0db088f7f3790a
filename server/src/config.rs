//! Server configuration module.
//!
//! Parses configuration from environment variables for the daynote server.
//! Journal settings (`DAYNOTE_ROOT` and friends) are read by
//! [`daynote_journal::config`] and carried here unchanged.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `DAYNOTE_PORT` | No | 8765 | HTTP port of the append endpoint |
//! | `DAYNOTE_BIND` | No | `127.0.0.1` | Address the endpoint binds to |
//! | `DAYNOTE_LOG_FORMAT` | No | `pretty` | `json` for JSON log lines |

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

use daynote_journal::config::{Config as JournalConfig, ConfigError as JournalConfigError};

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 8765;

/// Default bind address; the endpoint is meant for the local user.
const DEFAULT_BIND: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable has invalid format.
    #[error("invalid format for {var}: {message}")]
    InvalidFormat { var: String, message: String },

    /// Port number is invalid.
    #[error("invalid port number: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),

    /// Journal configuration is invalid.
    #[error(transparent)]
    Journal(#[from] JournalConfigError),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, for terminals.
    #[default]
    Pretty,
    /// One JSON object per line, for log collectors.
    Json,
}

/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Journal location and schedule.
    pub journal: JournalConfig,

    /// HTTP server port.
    pub port: u16,

    /// Address to bind the HTTP server to.
    pub bind: IpAddr,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Config {
    /// Parse configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Any journal variable is invalid
    /// - `DAYNOTE_PORT` is not a valid u16
    /// - `DAYNOTE_BIND` is not an IP address
    /// - `DAYNOTE_LOG_FORMAT` is neither `pretty` nor `json`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use daynote_server::config::Config;
    ///
    /// let config = Config::from_env().expect("Failed to load config");
    /// println!("Append endpoint on {}", config.socket_addr());
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            journal: JournalConfig::from_env()?,
            port: parse_port()?,
            bind: parse_bind()?,
            log_format: parse_log_format()?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Base URL a local client uses to reach the endpoint.
    pub fn base_url(&self) -> String {
        let host = if self.bind.is_unspecified() {
            DEFAULT_BIND
        } else {
            self.bind
        };
        format!("http://{}", SocketAddr::new(host, self.port))
    }
}

/// Parse the DAYNOTE_PORT environment variable.
///
/// Returns the default port if not set.
fn parse_port() -> Result<u16, ConfigError> {
    match env::var("DAYNOTE_PORT") {
        Ok(port_str) => Ok(port_str.trim().parse()?),
        Err(env::VarError::NotPresent) => Ok(DEFAULT_PORT),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidFormat {
            var: "DAYNOTE_PORT".to_string(),
            message: "contains invalid unicode".to_string(),
        }),
    }
}

fn parse_bind() -> Result<IpAddr, ConfigError> {
    match env::var("DAYNOTE_BIND") {
        Ok(addr) => addr.trim().parse().map_err(|_| ConfigError::InvalidFormat {
            var: "DAYNOTE_BIND".to_string(),
            message: format!("expected an IP address, got '{addr}'"),
        }),
        Err(_) => Ok(DEFAULT_BIND),
    }
}

fn parse_log_format() -> Result<LogFormat, ConfigError> {
    match env::var("DAYNOTE_LOG_FORMAT") {
        Ok(val) if val.eq_ignore_ascii_case("json") => Ok(LogFormat::Json),
        Ok(val) if val.eq_ignore_ascii_case("pretty") || val.is_empty() => Ok(LogFormat::Pretty),
        Ok(val) => Err(ConfigError::InvalidFormat {
            var: "DAYNOTE_LOG_FORMAT".to_string(),
            message: format!("expected 'pretty' or 'json', got '{val}'"),
        }),
        Err(_) => Ok(LogFormat::Pretty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing.
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old_value = env::var(key).ok();
            self.vars.push((key.to_string(), old_value));
            env::set_var(key, value);
        }

        fn remove(&mut self, key: &str) {
            let old_value = env::var(key).ok();
            self.vars.push((key.to_string(), old_value));
            env::remove_var(key);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.iter().rev() {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        let mut guard = EnvGuard::new();
        guard.set("DAYNOTE_ROOT", "/tmp/daynote-test");
        guard.remove("DAYNOTE_PORT");
        guard.remove("DAYNOTE_BIND");
        guard.remove("DAYNOTE_LOG_FORMAT");

        let config = Config::from_env().expect("should parse config");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.journal.root, std::path::PathBuf::from("/tmp/daynote-test"));
        assert_eq!(config.base_url(), "http://127.0.0.1:8765");
    }

    #[test]
    #[serial]
    fn test_config_custom_values() {
        let mut guard = EnvGuard::new();
        guard.set("DAYNOTE_ROOT", "/tmp/daynote-test");
        guard.set("DAYNOTE_PORT", "9090");
        guard.set("DAYNOTE_BIND", "0.0.0.0");
        guard.set("DAYNOTE_LOG_FORMAT", "JSON");

        let config = Config::from_env().expect("should parse config");
        assert_eq!(config.port, 9090);
        assert!(config.bind.is_unspecified());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9090");
        assert_eq!(config.base_url(), "http://127.0.0.1:9090");
    }

    #[test]
    #[serial]
    fn test_parse_port_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("DAYNOTE_PORT", "not-a-number");

        let result = parse_port();
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidPort(_)));
    }

    #[test]
    #[serial]
    fn test_parse_port_out_of_range() {
        let mut guard = EnvGuard::new();
        guard.set("DAYNOTE_PORT", "99999");

        assert!(parse_port().is_err());
    }

    #[test]
    #[serial]
    fn test_parse_bind_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("DAYNOTE_BIND", "localhost");

        let err = parse_bind().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { ref var, .. } if var == "DAYNOTE_BIND"));
    }

    #[test]
    #[serial]
    fn test_parse_log_format_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("DAYNOTE_LOG_FORMAT", "xml");

        assert!(parse_log_format().is_err());
    }

    #[test]
    #[serial]
    fn test_journal_errors_are_surfaced() {
        let mut guard = EnvGuard::new();
        guard.set("DAYNOTE_ROOT", "/tmp/daynote-test");
        guard.set("DAYNOTE_POLL_SECS", "0");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Journal(_)));
    }
}
