//! Runtime settings.
//!
//! There is no settings file. Values come from environment variables with
//! the `AUDIO_BROWSER__` prefix (e.g. `AUDIO_BROWSER__AUDIO_DIR=~/Music`)
//! and fall back to the struct defaults.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "AUDIO_BROWSER";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory listed at startup.
    pub audio_dir: PathBuf,
    /// Destination for downloaded copies, created on demand.
    pub download_dir: PathBuf,
    /// Initial volume, 0-100.
    pub volume: f32,
    /// How often the progress poller samples the engine (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("./audios"),
            download_dir: PathBuf::from("./downloads"),
            volume: 70.0,
            poll_interval_ms: 100,
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::environment())
    }

    pub fn load_from(env: Environment) -> Result<Self, ConfigError> {
        Config::builder().add_source(env).build()?.try_deserialize()
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.volume) {
            return Err(format!("volume must be within 0-100, got {}", self.volume));
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be >= 1".to_string());
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::environment().source(Some(map))
    }

    #[test]
    fn defaults_match_the_original_layout() {
        let settings = Settings::load_from(env_with(&[])).unwrap();
        assert_eq!(settings.audio_dir, PathBuf::from("./audios"));
        assert_eq!(settings.download_dir, PathBuf::from("./downloads"));
        assert_eq!(settings.volume, 70.0);
        assert_eq!(settings.poll_interval(), Duration::from_millis(100));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::load_from(env_with(&[
            ("AUDIO_BROWSER__AUDIO_DIR", "/srv/music"),
            ("AUDIO_BROWSER__VOLUME", "25"),
            ("AUDIO_BROWSER__POLL_INTERVAL_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(settings.audio_dir, PathBuf::from("/srv/music"));
        assert_eq!(settings.volume, 25.0);
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(settings.download_dir, PathBuf::from("./downloads"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let loud = Settings {
            volume: 140.0,
            ..Settings::default()
        };
        assert!(loud.validate().is_err());

        let stalled = Settings {
            poll_interval_ms: 0,
            ..Settings::default()
        };
        assert!(stalled.validate().is_err());
    }
}
