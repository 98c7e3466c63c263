//! Application settings loaded from TOML.
//!
//! ```toml
//! auto_connect = true
//! poll_interval_ms = 20
//!
//! [link]
//! port_name = "/dev/ttyACM0"
//! baud_rate = 115200
//! parity = "none"
//! ```

use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::link::ConnectionConfig;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 20;

#[derive(Debug, Error)]
pub enum ConfigError{
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig{
    #[serde(default)]
    pub link: ConnectionConfig,
    #[serde(default)]
    pub auto_connect: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64{
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for AppConfig{
    fn default() -> Self{
        AppConfig{
            link: ConnectionConfig::default(),
            auto_connect: false,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AppConfig{
    pub fn validate(&self) -> Result<(), ConfigError>{
        if self.poll_interval_ms == 0{
            return Err(ConfigError::Invalid("poll_interval_ms must be at least 1".to_string()));
        }
        if self.link.port_name.trim().is_empty(){
            return Err(ConfigError::Invalid("link.port_name is empty".to_string()));
        }
        if self.link.baud_rate == 0{
            return Err(ConfigError::Invalid("link.baud_rate must be non-zero".to_string()));
        }
        Ok(())
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError>{
    let config: AppConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError>{
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e|{
        tracing::error!("Failed to read config file '{}': {}", path.display(), e);
        ConfigError::Io(e)
    })?;
    parse_config(&contents).inspect_err(|e|{
        tracing::error!("Failed to load config '{}': {}", path.display(), e);
    })
}

#[cfg(test)]
mod tests{
    use super::*;
    use std::io::Write;
    use crate::link::{FlowControl, StopBits};

    #[test]
    fn test_empty_config_uses_defaults(){
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.poll_interval_ms, 20);
        assert!(!cfg.auto_connect);
    }

    #[test]
    fn test_full_config(){
        let cfg = parse_config(r#"
            poll_interval_ms = 50
            auto_connect = true

            [link]
            port_name = "COM3"
            baud_rate = 57600
            stop_bits = "two"
            flow_control = "software"
        "#).unwrap();
        assert_eq!(cfg.poll_interval_ms, 50);
        assert!(cfg.auto_connect);
        assert_eq!(cfg.link.port_name, "COM3");
        assert_eq!(cfg.link.stop_bits, StopBits::Two);
        assert_eq!(cfg.link.flow_control, FlowControl::Software);
    }

    #[test]
    fn test_malformed_settings_rejected(){
        assert!(matches!(parse_config("poll_interval_ms = 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse_config("[link]\nbaud_rate = 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse_config("[link]\nport_name = \"  \""), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse_config("poll_interval_ms = \"often\""), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_from_file(){
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[link]\nport_name = \"/dev/ttyACM1\"").unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.link.port_name, "/dev/ttyACM1");
    }

    #[test]
    fn test_missing_file(){
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
