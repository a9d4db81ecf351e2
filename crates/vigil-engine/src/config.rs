//! Engine configuration.
//!
//! Read from `vigil.toml`. Every section and field is optional; anything
//! missing takes its default. A missing file is written out with defaults so
//! there is something to edit.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use vigil_gameplay::{Command, SimConfig};

/// Configuration file name.
pub const CONFIG_FILE: &str = "vigil.toml";

/// Directory name used under the platform data directory.
const APP_DIR: &str = "vigil";

/// Errors reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML for this schema
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Defaults could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// How the headless session is paced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Frames per second
    pub frame_rate: u32,
    /// Simulated seconds to run
    pub duration_secs: f64,
    /// Sleep between frames and measure real deltas
    pub real_time: bool,
    /// Seconds between progress log lines (0 = off)
    pub report_interval_secs: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            duration_secs: 120.0,
            real_time: false,
            report_interval_secs: 10.0,
        }
    }
}

/// Where snapshots live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Snapshot directory; the platform data directory when unset
    pub dir: Option<PathBuf>,
    /// Resume from the stored snapshot on start
    pub load_on_start: bool,
    /// Write a snapshot when the session ends
    pub save_on_exit: bool,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            dir: None,
            load_on_start: true,
            save_on_exit: true,
        }
    }
}

impl SaveConfig {
    /// Resolves the snapshot directory.
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("saves"))
    }
}

/// A command issued at a fixed simulation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCommand {
    /// Simulation seconds at which to issue the command
    pub at: f64,
    /// The command
    #[serde(flatten)]
    pub command: Command,
}

/// Engine configuration parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation tuning
    pub simulation: SimConfig,
    /// Session pacing
    pub session: SessionConfig,
    /// Snapshot storage
    pub save: SaveConfig,
    /// Timed commands
    pub script: Vec<ScriptedCommand>,
}

impl EngineConfig {
    /// Loads configuration from `path`, writing defaults there if it is missing.
    ///
    /// A file that cannot be read or parsed is reported and replaced by
    /// defaults in memory; the file itself is left alone.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, writing defaults to {}", path.display());
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                warn!("Failed to write default config: {e}");
            }
            return config;
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file, using defaults: {e}");
                Self::default()
            },
        }
    }

    /// Loads configuration from `path`.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses configuration text.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        let mut config: Self = toml::from_str(contents)?;
        config.validate();
        Ok(config)
    }

    /// Saves configuration to `path`.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamps values to sensible ranges and orders the script by time.
    pub fn validate(&mut self) {
        self.session.frame_rate = self.session.frame_rate.clamp(1, 1000);
        if !self.session.duration_secs.is_finite() || self.session.duration_secs < 0.0 {
            self.session.duration_secs = 0.0;
        }
        if !self.session.report_interval_secs.is_finite() || self.session.report_interval_secs < 0.0 {
            self.session.report_interval_secs = 0.0;
        }
        self.simulation.autosave_chance = self.simulation.autosave_chance.clamp(0.0, 1.0);
        self.simulation.max_tick_delta = self.simulation.tick_delta_cap();

        self.script.retain(|s| s.at.is_finite());
        self.script.sort_by(|a, b| a.at.total_cmp(&b.at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vigil_gameplay::{AbilityKind, GearSlot};

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.session.frame_rate, 60);
        assert!(!config.session.real_time);
        assert!(config.save.load_on_start);
        assert!(config.script.is_empty());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.session.frame_rate = 0;
        config.session.duration_secs = -3.0;
        config.simulation.autosave_chance = 4.0;

        config.validate();

        assert_eq!(config.session.frame_rate, 1);
        assert_eq!(config.session.duration_secs, 0.0);
        assert!((config.simulation.autosave_chance - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tick_delta_cap_is_kept_positive() {
        for (raw, expected) in [("-0.1", 0.1), ("0.0", 0.1), ("0.05", 0.05), ("3.0", 0.1)] {
            let config = EngineConfig::from_toml(&format!("[simulation]\nmax_tick_delta = {raw}\n"))
                .expect("parse");
            assert!(
                (config.simulation.max_tick_delta - expected).abs() < 1e-6,
                "{raw} -> {}",
                config.simulation.max_tick_delta
            );
        }
    }

    #[test]
    fn test_script_parses_and_sorts() {
        let config = EngineConfig::from_toml(
            r#"
            [session]
            duration_secs = 30.0

            [[script]]
            at = 12.0
            command = "upgrade"
            slot = "weapon"

            [[script]]
            at = 3.5
            command = "cast"
            ability = "charge"
            "#,
        )
        .expect("valid config");

        assert!((config.session.duration_secs - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.session.frame_rate, 60);
        assert_eq!(config.script.len(), 2);
        assert_eq!(config.script[0].command, Command::Cast { ability: AbilityKind::Charge });
        assert_eq!(config.script[1].command, Command::Upgrade { slot: GearSlot::Weapon });
    }

    #[test]
    fn test_partial_simulation_section() {
        let config = EngineConfig::from_toml(
            r#"
            [simulation]
            seed = 7

            [simulation.hero]
            max_hp = 250.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.simulation.seed, Some(7));
        assert!((config.simulation.hero.max_hp - 250.0).abs() < f32::EPSILON);
        assert!((config.simulation.hero.attack_damage - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join(CONFIG_FILE);

        let mut config = EngineConfig::default();
        config.session.duration_secs = 45.0;
        config.simulation.seed = Some(12345);
        config.save.dir = Some(temp_dir.path().join("saves"));
        config.script.push(ScriptedCommand {
            at: 1.0,
            command: Command::GrantGold { amount: 500 },
        });

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::try_load_from(&config_path).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);

        let config = EngineConfig::load_or_create(&config_path);
        assert_eq!(config, EngineConfig::default());
        assert!(config_path.exists());
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "[session\nframe_rate = ").expect("write");

        let config = EngineConfig::load_or_create(&config_path);
        assert_eq!(config, EngineConfig::default());
    }
}
