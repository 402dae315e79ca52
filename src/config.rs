//! TOML configuration for the device daemon.
//!
//! Missing file or missing keys degrade to the default profile rather than
//! preventing startup; a default config is written out on first run so there
//! is always something to edit.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::device::ReportMode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub sampling: SamplingConfig,
    pub input: InputConfig,
    pub action: ActionSetting,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct SerialConfig {
    /// Path of the serial device; the first enumerable port when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: 115_200,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct SamplingConfig {
    pub rate_hz: u16,
    pub report_mode: ReportMode,
    pub threshold_bias: i16,
    /// Whether pressing (true) or releasing (false) the button counts as the
    /// trigger firing.
    pub trigger_on_press: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            rate_hz: 2000,
            report_mode: ReportMode::Combined,
            threshold_bias: 150,
            trigger_on_press: true,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct InputConfig {
    /// BCM pin of the trigger button (active-low, internal pull-up).
    pub button_pin: u8,
    /// MCP3008 channel the photodiode is wired to.
    pub adc_channel: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            button_pin: 13,
            adc_channel: 0,
        }
    }
}

/// Startup HID action in wire encoding (mode 0 = mouse, 1 = keyboard).
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct ActionSetting {
    pub mode: u8,
    pub code: u8,
}

impl Default for ActionSetting {
    fn default() -> Self {
        Self { mode: 0, code: 1 } // left mouse button
    }
}

pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fakeldat")
        .join("config.toml")
}

/// Writes the default configuration on first run.
pub async fn ensure_default_config() -> Result<(), ConfigError> {
    let path = config_path();
    if tokio::fs::try_exists(&path).await? {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = toml::to_string_pretty(&Config::default())?;
    tokio::fs::write(&path, content).await?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}

pub async fn load() -> Result<Config, ConfigError> {
    let path = config_path();
    let content = tokio::fs::read_to_string(&path).await?;
    let config = toml::from_str(&content)?;
    debug!("configuration loaded from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips_through_toml() {
        let serialized = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.sampling.rate_hz, 2000);
        assert_eq!(parsed.sampling.report_mode, ReportMode::Combined);
        assert_eq!(parsed.input.button_pin, 13);
        assert_eq!(parsed.serial.baud, 115_200);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [serial]
            port = "/dev/ttyGS0"

            [sampling]
            report_mode = "raw"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.serial.port.as_deref(), Some("/dev/ttyGS0"));
        assert_eq!(parsed.serial.baud, 115_200);
        assert_eq!(parsed.sampling.report_mode, ReportMode::Raw);
        assert_eq!(parsed.sampling.threshold_bias, 150);
        assert_eq!(parsed.action.mode, 0);
    }
}
