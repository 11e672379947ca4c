//! Application settings loading from a TOML file.
//!
//! Settings cover the maintenance sweep windows and the admin allow-list.
//! Everything has a sensible default so the file is optional; `DATABASE_URL`
//! stays an environment concern (see [`super::database`]).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// How long soft-deleted reports are retained before the purge, in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 90;

/// How long a deactivated zero-balance profile lingers before auto-archival.
pub const DEFAULT_ARCHIVE_THRESHOLD_DAYS: i64 = 90;

/// Top-level settings structure for `stakeledger.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Days a soft-deleted report survives before physical purge
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Days a deactivated zero-balance bookmaker lingers before archival
    #[serde(default = "default_archive_threshold_days")]
    pub archive_threshold_days: i64,
    /// Employee ids allowed to perform admin operations
    #[serde(default)]
    pub admin_ids: Vec<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            archive_threshold_days: DEFAULT_ARCHIVE_THRESHOLD_DAYS,
            admin_ids: Vec::new(),
        }
    }
}

impl Settings {
    /// Whether the given employee id is on the admin allow-list.
    #[must_use]
    pub fn is_admin(&self, employee_id: i64) -> bool {
        self.admin_ids.contains(&employee_id)
    }
}

const fn default_retention_days() -> i64 {
    DEFAULT_RETENTION_DAYS
}

const fn default_archive_threshold_days() -> i64 {
    DEFAULT_ARCHIVE_THRESHOLD_DAYS
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read settings file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })
}

/// Loads settings from the default location (./stakeledger.toml), falling
/// back to defaults when the file is absent.
pub fn load_default_settings() -> Result<Settings> {
    if Path::new("stakeledger.toml").exists() {
        load_settings("stakeledger.toml")
    } else {
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r"
            retention_days = 30
            archive_threshold_days = 120
            admin_ids = [7, 12]
        ";

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.retention_days, 30);
        assert_eq!(settings.archive_threshold_days, 120);
        assert!(settings.is_admin(7));
        assert!(!settings.is_admin(8));
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.retention_days, DEFAULT_RETENTION_DAYS);
        assert_eq!(
            settings.archive_threshold_days,
            DEFAULT_ARCHIVE_THRESHOLD_DAYS
        );
        assert!(settings.admin_ids.is_empty());
    }
}
