//! Behavior configuration.
//!
//! Tuning constants shared by every controller. Configuration can be loaded
//! from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// Behavior tuning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    // === Escort ===
    /// Maximum distance between an escort and its invoking party
    pub escort_max_party_distance: f32,
    /// Period of the invoker range check (ms)
    pub invoker_check_interval_ms: u32,

    // === Follow ===
    /// Period of the arrival-marker search (ms)
    pub follow_arrival_check_ms: u32,
    /// Radius of the arrival-marker search
    pub interaction_distance: f32,
    /// Default follow distance
    pub pet_follow_distance: f32,
    /// Default follow angle (radians)
    pub pet_follow_angle: f32,
    /// Despawn delay after a follow completes (ms)
    pub follow_despawn_ms: u32,

    // === Despawn ===
    /// Length of the invisible despawn phase (ms)
    pub hidden_phase_ms: u32,

    // === Combat ===
    /// Radius for assisting parties in combat
    pub assist_distance: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            // Escort
            escort_max_party_distance: 50.0,
            invoker_check_interval_ms: 1000,

            // Follow
            follow_arrival_check_ms: 1000,
            interaction_distance: 5.0,
            pet_follow_distance: 1.0,
            pet_follow_angle: FRAC_PI_2,
            follow_despawn_ms: 5000,

            // Despawn
            hidden_phase_ms: 5000,

            // Combat
            assist_distance: 25.0,
        }
    }
}

impl BehaviorConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Behavior config not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read behavior config: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        config.validate();
                        info!("Loaded behavior config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse behavior config: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open behavior config: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved behavior config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values.
    pub fn validate(&mut self) {
        // Escort
        self.escort_max_party_distance = self.escort_max_party_distance.clamp(1.0, 500.0);
        self.invoker_check_interval_ms = self.invoker_check_interval_ms.clamp(100, 60_000);

        // Follow
        self.follow_arrival_check_ms = self.follow_arrival_check_ms.clamp(100, 60_000);
        self.interaction_distance = self.interaction_distance.clamp(0.5, 100.0);
        self.pet_follow_distance = self.pet_follow_distance.clamp(0.0, 50.0);
        self.pet_follow_angle = self.pet_follow_angle.clamp(0.0, std::f32::consts::TAU);

        // Combat
        self.assist_distance = self.assist_distance.clamp(0.0, 500.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = BehaviorConfig::default();
        assert!((config.escort_max_party_distance - 50.0).abs() < f32::EPSILON);
        assert_eq!(config.invoker_check_interval_ms, 1000);
        assert_eq!(config.hidden_phase_ms, 5000);
        assert!((config.pet_follow_angle - FRAC_PI_2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_validation() {
        let mut config = BehaviorConfig::default();
        config.escort_max_party_distance = -3.0;
        config.invoker_check_interval_ms = 0;
        config.interaction_distance = 1000.0;

        config.validate();

        assert!((config.escort_max_party_distance - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.invoker_check_interval_ms, 100);
        assert!((config.interaction_distance - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("behavior.toml");

        let mut config = BehaviorConfig::default();
        config.hidden_phase_ms = 2500;
        config.assist_distance = 30.0;
        config.save_to(&config_path).expect("Failed to save config");

        let loaded = BehaviorConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("behavior.toml");
        fs::write(&config_path, "follow_despawn_ms = 1234\n").expect("write");

        let loaded = BehaviorConfig::load_from(&config_path);
        assert_eq!(loaded.follow_despawn_ms, 1234);
        assert_eq!(loaded.hidden_phase_ms, 5000);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = BehaviorConfig::load_from("/nonexistent/path/behavior.toml");
        assert_eq!(config, BehaviorConfig::default());
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("behavior.toml");
        fs::write(&config_path, "hidden_phase_ms = \"soon\"").expect("write");

        assert_eq!(BehaviorConfig::load_from(&config_path), BehaviorConfig::default());
    }
}
