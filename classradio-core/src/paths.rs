//! Path constants for configuration and data files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "classradio";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the queue database file
pub const QUEUE_DB_FILE_NAME: &str = "radio_queue.db";

/// The name of the persisted per-device voter identity (prefixed with . for hidden)
pub const VOTER_ID_FILE_NAME: &str = ".voter_id";

/// Get the configuration directory path (~/.config/classradio/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/classradio/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the queue database path (`~/.config/classradio/radio_queue.db`)
#[must_use]
pub fn queue_db_path() -> PathBuf {
    config_dir().join(QUEUE_DB_FILE_NAME)
}

/// Get the voter identity file path (`~/.config/classradio/.voter_id`)
#[must_use]
pub fn voter_id_path() -> PathBuf {
    config_dir().join(VOTER_ID_FILE_NAME)
}
