//! Engine configuration.
//!
//! World, streaming and session parameters, loaded from and saved to a TOML
//! file. Missing or invalid files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use survival_world::{StreamingConfig, WorldGenerationConfig};
use tracing::{info, warn};

use crate::error::ConfigError;

/// Configuration file name.
const CONFIG_FILE: &str = "survival.toml";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "SURVIVAL_CONFIG";

/// Engine configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === World Settings ===
    /// World seed (None = derived from the wall clock)
    pub world_seed: Option<u64>,
    /// Chunk size in tiles
    pub chunk_size: u32,
    /// View distance in chunks
    pub view_distance: u32,
    /// Idle seconds before a chunk is evicted
    pub unload_delay_secs: u64,
    /// Radius in chunks preloaded around the spawn point
    pub preload_radius: u32,
    /// Milliseconds between eviction sweeps
    pub sweep_interval_ms: u64,

    // === Session Settings ===
    /// Number of simulation ticks to run (0 = none)
    pub session_ticks: u32,
    /// Milliseconds per tick
    pub tick_interval_ms: u64,
    /// Tiles walked per tick
    pub walk_speed: f32,

    // === Generation ===
    /// Noise parameters for the world generator
    pub generation: WorldGenerationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // World
            world_seed: None,
            chunk_size: 32,
            view_distance: 3,
            unload_delay_secs: 300, // 5 minutes
            preload_radius: 5,
            sweep_interval_ms: 1000,

            // Session
            session_ticks: 600,
            tick_interval_ms: 16,
            walk_speed: 0.5,

            generation: WorldGenerationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration from a specific path, reporting failures.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        if let Some(config_dir) = dirs_config_path() {
            config_dir.join("survival").join(CONFIG_FILE)
        } else {
            // Fall back to current directory
            PathBuf::from(CONFIG_FILE)
        }
    }

    /// Validate and clamp engine values to sensible ranges.
    ///
    /// Generation parameters are left as given.
    pub fn validate(&mut self) {
        // World
        self.view_distance = self.view_distance.clamp(1, 16);
        self.chunk_size = self.chunk_size.clamp(8, 256);
        self.unload_delay_secs = self.unload_delay_secs.max(1);
        self.preload_radius = self.preload_radius.min(32);
        self.sweep_interval_ms = self.sweep_interval_ms.max(10);

        // Session
        if !self.walk_speed.is_finite() {
            self.walk_speed = 0.0;
        }
        self.walk_speed = self.walk_speed.clamp(0.0, 16.0);
    }

    /// World seed, or one derived from the wall clock when unset.
    #[must_use]
    pub fn resolve_seed(&self) -> u64 {
        self.world_seed.unwrap_or_else(random_seed)
    }

    /// Chunk manager settings.
    #[must_use]
    pub fn streaming(&self) -> StreamingConfig {
        StreamingConfig {
            chunk_size: self.chunk_size,
            view_distance: self.view_distance,
            unload_delay: Duration::from_secs(self.unload_delay_secs),
        }
    }

    /// Time between eviction sweeps.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Time per session tick.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Generates a seed from system time.
fn random_seed() -> u64 {
    use std::time::SystemTime;
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

/// Get platform-specific config directory.
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.chunk_size, 32);
        assert_eq!(config.view_distance, 3);
        assert_eq!(config.unload_delay_secs, 300);
        assert!(config.world_seed.is_none());

        let streaming = config.streaming();
        assert_eq!(streaming.unload_delay, Duration::from_secs(300));
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        // Set invalid values
        config.view_distance = 0;
        config.chunk_size = 4096;
        config.unload_delay_secs = 0;
        config.walk_speed = f32::NAN;
        config.generation.elevation.octaves = 0;

        config.validate();

        // Should be clamped
        assert_eq!(config.view_distance, 1);
        assert_eq!(config.chunk_size, 256);
        assert_eq!(config.unload_delay_secs, 1);
        assert_eq!(config.walk_speed, 0.0);
        // generation knobs are not clamped
        assert_eq!(config.generation.elevation.octaves, 0);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("survival.toml");

        // Create and save config
        let mut config = EngineConfig::default();
        config.world_seed = Some(12345);
        config.view_distance = 5;
        config.generation.moisture.scale = 0.05;

        config.save_to(&config_path).expect("Failed to save config");

        // Load and verify
        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded.world_seed, Some(12345));
        assert_eq!(loaded.view_distance, 5);
        assert!((loaded.generation.moisture.scale - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/survival.toml");
        // Should return defaults
        assert_eq!(config.chunk_size, 32);
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "chunk_size = \"big\"").expect("write");

        assert!(matches!(
            EngineConfig::try_load_from(&config_path),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(EngineConfig::load_from(&config_path).chunk_size, 32);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            "world_seed = 7\n\n[generation.elevation]\noctaves = 6\n",
        )
        .expect("parse");
        assert_eq!(config.world_seed, Some(7));
        assert_eq!(config.generation.elevation.octaves, 6);
        assert!((config.generation.elevation.scale - 0.02).abs() < f64::EPSILON);
        assert_eq!(config.generation.moisture.octaves, 3);
        assert_eq!(config.view_distance, 3);
    }

    #[test]
    fn test_resolve_seed() {
        let mut config = EngineConfig::default();
        config.world_seed = Some(99);
        assert_eq!(config.resolve_seed(), 99);
    }

    #[test]
    fn test_config_toml_serialization() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize");

        assert!(toml_str.contains("chunk_size"));
        assert!(toml_str.contains("[generation.elevation]"));
    }
}
