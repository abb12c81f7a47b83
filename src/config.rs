// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration module.
//!
//! Handles loading and saving bridge settings.

use anyhow::{Context, Result};
use bluer::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bluetooth::DEFAULT_PERIPHERAL_NAME;

/// Bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which peripheral to drive.
    pub peripheral: PeripheralConfig,

    /// Keyboard settings.
    pub input: InputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeripheralConfig {
    /// Advertised name to look for during discovery.
    pub name: String,

    /// Bluetooth address (e.g. "AA:BB:CC:DD:EE:FF"). Takes precedence over
    /// the name when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// How long to scan before giving up, in seconds.
    pub scan_timeout_secs: u64,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PERIPHERAL_NAME.to_string(),
            address: None,
            scan_timeout_secs: 15,
        }
    }
}

impl PeripheralConfig {
    /// Parsed peripheral address, if one is configured.
    pub fn address(&self) -> Result<Option<Address>> {
        self.address
            .as_deref()
            .map(|addr| {
                addr.trim()
                    .parse::<Address>()
                    .with_context(|| format!("invalid peripheral address '{}'", addr))
            })
            .transpose()
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Keyboard backend: "auto", "global", or "terminal".
    pub backend: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            backend: "auto".to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keybridge")
            .join("config.toml")
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        // Reject a bad address up front rather than after a scan
        config.peripheral.address()?;

        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}
