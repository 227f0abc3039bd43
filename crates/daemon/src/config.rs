// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: `keel.toml` in the state directory, with
//! defaults for everything. Unknown keys are rejected so typos surface
//! at startup instead of silently using defaults.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "keel.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub smart: SmartConfig,
    pub disks: DisksConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Seconds between scanner rounds.
    pub interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmartConfig {
    /// Seconds between SMART collections; collection is slow and runs
    /// far less often than the presence scan.
    pub interval_secs: u64,
}

impl Default for SmartConfig {
    fn default() -> Self {
        Self { interval_secs: 1800 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisksConfig {
    /// Also track `loop` devices (development machines).
    pub scan_loop_devices: bool,
}

impl Config {
    /// Load `keel.toml` from the state dir; absent file means defaults.
    pub fn load(state_dir: &Path) -> Result<Self, ConfigError> {
        let path = state_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.interval_secs)
    }

    pub fn smart_interval(&self) -> Duration {
        Duration::from_secs(self.smart.interval_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
