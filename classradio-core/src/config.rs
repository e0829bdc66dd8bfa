use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Template written to the config path on first run
pub const CONFIG_TEMPLATE: &str = r#"# classradio configuration

[station]
# Station name shown in the console header
name = "CLASS_RADIO.FM"

[database]
# Queue database location; defaults to ~/.config/classradio/radio_queue.db
# path = "/var/lib/classradio/radio_queue.db"

[events]
# Buffered change notifications per subscriber before old events are dropped
channel_capacity = 64
"#;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadioConfig {
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default = "default_station_name")]
    pub name: String,
}

fn default_station_name() -> String {
    "CLASS_RADIO.FM".to_string()
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: default_station_name(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Queue database location; `None` means the default under the config
    /// directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

const fn default_channel_capacity() -> usize {
    64
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl RadioConfig {
    /// Get the config file path (~/.config/classradio/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from file or create template on first run
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template on
    /// first run, and parse or validation errors otherwise.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&config_path, CONFIG_TEMPLATE)?;
            return Err(CoreError::ConfigNotFound { path: config_path });
        }

        let content = fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Parse and validate a TOML config document
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed TOML and
    /// [`CoreError::ConfigMissingField`] for blank required fields.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;

        if config.station.name.trim().is_empty() {
            return Err(CoreError::ConfigMissingField {
                field: "station.name".to_string(),
            });
        }
        if config.events.channel_capacity == 0 {
            return Err(CoreError::ConfigMissingField {
                field: "events.channel_capacity".to_string(),
            });
        }

        Ok(config)
    }

    /// Resolved queue database path
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(crate::paths::queue_db_path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_with_defaults() {
        let config = RadioConfig::parse(CONFIG_TEMPLATE).expect("template must parse");
        assert_eq!(config.station.name, "CLASS_RADIO.FM");
        assert_eq!(config.events.channel_capacity, 64);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RadioConfig::parse("").expect("empty config must parse");
        assert_eq!(config.station.name, "CLASS_RADIO.FM");
    }

    #[test]
    fn test_blank_station_name_is_rejected() {
        let result = RadioConfig::parse("[station]\nname = \"  \"\n");
        assert!(matches!(
            result,
            Err(CoreError::ConfigMissingField { .. })
        ));
    }

    #[test]
    fn test_zero_channel_capacity_is_rejected() {
        let result = RadioConfig::parse("[events]\nchannel_capacity = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let config =
            RadioConfig::parse("[database]\npath = \"/tmp/radio.db\"\n").expect("must parse");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/radio.db"));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let result = RadioConfig::parse("[station\nname = 3");
        assert!(matches!(result, Err(CoreError::ConfigParseError(_))));
    }
}
