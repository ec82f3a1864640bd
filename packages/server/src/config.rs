//! Runtime configuration.
//!
//! Built once at startup from the command line and environment, then passed
//! to the constructors that need it.

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9999;
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;
pub const DEFAULT_ACK_PREFIX: &str = "ACK";
pub const DEFAULT_STATE_PATH: &str = "data/shared_data.json";
pub const DEFAULT_FPS: u32 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("fps must be greater than zero")]
    ZeroFps,

    #[error("max line length must be greater than zero")]
    ZeroMaxLineLength,

    #[error("ack prefix must not contain a newline")]
    MultilineAckPrefix,
}

/// Command server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Longest command accepted, in bytes, excluding the newline
    pub max_line_length: usize,
    /// Acknowledgements are sent as `"<ack_prefix> <command>"`
    pub ack_prefix: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_length == 0 {
            return Err(ConfigError::ZeroMaxLineLength);
        }
        if self.ack_prefix.contains(['\n', '\r']) {
            return Err(ConfigError::MultilineAckPrefix);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            ack_prefix: DEFAULT_ACK_PREFIX.to_string(),
        }
    }
}

/// Settings for the kiosk binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Spins played so far, carried across restarts by the launcher
    pub counter: u64,
    pub state_path: PathBuf,
    pub fps: u32,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        self.server.validate()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            counter: 0,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            fps: DEFAULT_FPS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_all_interfaces_on_9999() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:9999");
        assert_eq!(config.max_line_length, 1024);
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        // テスト項目: 0 の fps や最大行長は設定エラーになる
        // given (前提条件):
        let zero_fps = AppConfig {
            fps: 0,
            ..AppConfig::default()
        };
        let zero_line = AppConfig {
            server: ServerConfig {
                max_line_length: 0,
                ..ServerConfig::default()
            },
            ..AppConfig::default()
        };

        // when (操作) / then (期待する結果):
        assert_eq!(zero_fps.validate(), Err(ConfigError::ZeroFps));
        assert_eq!(zero_line.validate(), Err(ConfigError::ZeroMaxLineLength));
    }

    #[test]
    fn test_validate_rejects_multiline_ack_prefix() {
        let config = ServerConfig {
            ack_prefix: "ACK\n".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MultilineAckPrefix));
    }
}
