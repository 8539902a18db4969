//! JSON configuration for a game session.

use crate::ConfigError;
use grandmaster_devices::DeviceConfig;
use grandmaster_vision::DetectorParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where camera frames come from and how hard to try.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub url: String,
    pub timeout_ms: u64,
    /// Extra attempts after the first failed fetch.
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: "http://grandmaster.local:5555/camera.png".to_string(),
            timeout_ms: 10_000,
            retries: 5,
            retry_delay_ms: 3_000,
        }
    }
}

impl CameraConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Delay between failed turn attempts: `initial * multiplier^n`, capped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryBackoff {
    pub initial_delay_ms: u64,
    pub multiplier: f32,
    pub max_delay_ms: u64,
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self {
            initial_delay_ms: 3_000,
            multiplier: 1.0,
            max_delay_ms: 3_000,
        }
    }
}

impl RetryBackoff {
    /// No waiting at all.
    pub fn immediate() -> Self {
        Self {
            initial_delay_ms: 0,
            multiplier: 1.0,
            max_delay_ms: 0,
        }
    }

    /// Delay before retry number `failures` (0-based).
    pub fn delay(&self, failures: u32) -> Duration {
        let factor = f64::from(self.multiplier.max(1.0)).powi(failures.min(64) as i32);
        let ms = (self.initial_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(ms as u64)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub devices: DeviceConfig,
    pub detector: DetectorParams,
    pub camera: CameraConfig,
    pub turn_retry: RetryBackoff,
    /// Where `camshow` writes its annotated frame.
    pub debug_image_path: PathBuf,
    /// Idle sleep between loop iterations.
    pub poll_interval_ms: u64,
    /// Fixed seed for move selection; random when absent.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            devices: DeviceConfig::default(),
            detector: DetectorParams::default(),
            camera: CameraConfig::default(),
            turn_retry: RetryBackoff::default(),
            debug_image_path: PathBuf::from("camera-debug.png"),
            poll_interval_ms: 5,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_robot() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.camera.url, "http://grandmaster.local:5555/camera.png");
        assert_eq!(cfg.camera.retries, 5);
        assert_eq!(cfg.turn_retry.delay(0), Duration::from_secs(3));
        assert_eq!(cfg.turn_retry.delay(10), Duration::from_secs(3));
        assert_eq!(cfg.devices.baud_rate, 115_200);
        assert_eq!(cfg.detector.piece_id_threshold, 100);
    }

    #[test]
    fn backoff_grows_to_cap() {
        let backoff = RetryBackoff {
            initial_delay_ms: 100,
            multiplier: 2.0,
            max_delay_ms: 1_000,
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(400));
        assert_eq!(backoff.delay(5), Duration::from_millis(1_000));
        assert_eq!(RetryBackoff::immediate().delay(3), Duration::ZERO);
    }

    #[test]
    fn nested_partial_json() {
        let cfg: GameConfig = serde_json::from_str(
            r#"{"camera": {"retries": 1}, "devices": {"warmup_ms": 0}, "rng_seed": 9}"#,
        )
        .expect("parse");
        assert_eq!(cfg.camera.retries, 1);
        assert_eq!(cfg.camera.retry_delay_ms, 3_000);
        assert_eq!(cfg.devices.warmup_ms, 0);
        assert_eq!(cfg.rng_seed, Some(9));
    }

    #[test]
    fn round_trip_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("game.json");
        let mut cfg = GameConfig::default();
        cfg.turn_retry = RetryBackoff::immediate();
        cfg.debug_image_path = dir.path().join("debug.png");
        cfg.write_json(&path).expect("write");
        assert_eq!(GameConfig::load_json(&path).expect("load"), cfg);
    }
}
