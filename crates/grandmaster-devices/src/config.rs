use crate::DeviceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How to find and talk to the two controllers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// USB serial number of the gantry Arduino.
    pub gantry_serial: String,
    /// USB serial number of the board Arduino.
    pub board_serial: String,
    pub baud_rate: u32,
    /// The Arduinos reset when the port opens; status bytes before this
    /// much time has passed are boot noise.
    pub warmup_ms: u64,
    /// Upper bound for blocking moves. `None` waits forever.
    pub wait_timeout_ms: Option<u64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            gantry_serial: "85033313237351301221".to_string(),
            board_serial: "8503331323735140D1D0".to_string(),
            baud_rate: 115_200,
            warmup_ms: 2_000,
            wait_timeout_ms: None,
        }
    }
}

impl DeviceConfig {
    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DeviceError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: DeviceConfig = serde_json::from_str(r#"{"warmup_ms": 0}"#).expect("parse");
        assert_eq!(cfg.warmup_ms, 0);
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.wait_timeout(), None);
    }

    #[test]
    fn round_trip_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("devices.json");
        let cfg = DeviceConfig {
            wait_timeout_ms: Some(1500),
            ..DeviceConfig::default()
        };
        cfg.write_json(&path).expect("write");
        assert_eq!(DeviceConfig::load_json(&path).expect("load"), cfg);
    }
}
