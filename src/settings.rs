//! Board settings and preferences
//!
//! Persisted separately from board state in LocalStorage.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_STORAGE_KEY;
use crate::palette::ColorScheme;
use crate::persistence::{self, LoadError, PersistError, Storage};

/// Board settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Colors ===
    /// Palette for new and recolored shapes
    pub shape_colors: ColorScheme,
    /// Palette for new and recolored cards
    pub card_colors: ColorScheme,

    // === Behaviour ===
    /// Delay between the remove animation starting and the shape leaving the store
    pub remove_delay_ms: u32,
    /// Ask before deleting a card
    pub confirm_delete: bool,

    // === Diagnostics ===
    /// Log level name ("error", "warn", "info", "debug", "trace", "off")
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shape_colors: ColorScheme::Vivid,
            card_colors: ColorScheme::Pastel,

            remove_delay_ms: 300,
            confirm_delete: true,

            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Parsed log level, `Info` if unrecognized
    pub fn level_filter(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.log_level).unwrap_or(log::LevelFilter::Info)
    }

    /// Load settings, falling back to defaults
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Self {
        Self::from_outcome(Self::try_load(storage))
    }

    /// Read saved settings without logging or falling back
    ///
    /// Lets startup pick the log level before the outcome is reported.
    pub fn try_load<S: Storage + ?Sized>(storage: &S) -> Result<Self, LoadError> {
        persistence::load_json(storage, SETTINGS_STORAGE_KEY)
    }

    /// Log a `try_load` outcome and resolve it to usable settings
    pub fn from_outcome(outcome: Result<Self, LoadError>) -> Self {
        match outcome {
            Ok(settings) => {
                log::info!("Loaded settings from storage");
                settings
            }
            Err(LoadError::Missing(_)) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring saved settings: {}", err);
                Self::default()
            }
        }
    }

    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) -> Result<(), PersistError> {
        persistence::save_json(storage, SETTINGS_STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.remove_delay_ms, 300);
        assert!(settings.confirm_delete);
        assert_eq!(settings.card_colors, ColorScheme::Pastel);
        assert_eq!(settings.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = MemoryStorage::new();
        let settings = Settings {
            confirm_delete: false,
            log_level: "debug".to_string(),
            ..Settings::default()
        };
        settings.save(&mut storage).unwrap();

        let loaded = Settings::load(&storage);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let storage = MemoryStorage::new().with_item(SETTINGS_STORAGE_KEY, r#"{"remove_delay_ms": 0}"#);
        let loaded = Settings::load(&storage);
        assert_eq!(loaded.remove_delay_ms, 0);
        assert!(loaded.confirm_delete);
    }

    #[test]
    fn test_malformed_settings_use_defaults() {
        let storage = MemoryStorage::new().with_item(SETTINGS_STORAGE_KEY, "]]");
        assert_eq!(Settings::load(&storage), Settings::default());
    }

    #[test]
    fn test_try_load_reports_outcome() {
        let missing = Settings::try_load(&MemoryStorage::new());
        assert!(matches!(missing, Err(LoadError::Missing(_))));

        let storage = MemoryStorage::new().with_item(SETTINGS_STORAGE_KEY, r#"{"log_level": 5}"#);
        let outcome = Settings::try_load(&storage);
        assert!(matches!(outcome, Err(LoadError::Malformed { .. })));
        assert_eq!(Settings::from_outcome(outcome), Settings::default());

        let storage = MemoryStorage::new().with_item(SETTINGS_STORAGE_KEY, r#"{"log_level": "warn"}"#);
        let level = Settings::try_load(&storage).map(|s| s.level_filter());
        assert_eq!(level.ok(), Some(log::LevelFilter::Warn));
    }

    #[test]
    fn test_unknown_log_level() {
        let settings = Settings {
            log_level: "chatty".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.level_filter(), log::LevelFilter::Info);
    }
}
