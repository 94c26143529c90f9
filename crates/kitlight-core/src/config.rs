//! Startup configuration
//!
//! Read once from a TOML file; nothing is re-read at runtime. The DMX line
//! parameters (250 kBd, 8N2) and the 3-channel fixture stride are protocol
//! constants and deliberately absent here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;
use crate::mapping::{LightMapping, MappingTable};

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial link to the DMX interface
    pub serial: SerialConfig,
    /// Physical rig dimensions
    pub rig: RigConfig,
    /// Schedule periods and fade behavior
    pub timing: TimingConfig,
    /// MIDI note source
    pub midi: MidiConfig,
    /// Log output
    pub log: LogConfig,
    /// Note-to-light mapping entries, in priority order
    pub lights: Vec<LightSpec>,
}

impl Config {
    /// Load and parse a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Build the mapping table from the `[[lights]]` entries.
    ///
    /// Color specs are parsed here, after logging is up, so a malformed
    /// spec produces a visible warning and a white fallback.
    pub fn mapping_table(&self) -> MappingTable {
        MappingTable::new(self.lights.iter().map(LightSpec::to_mapping).collect())
    }
}

/// Serial link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial device path of the DMX interface
    pub device: String,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
        }
    }
}

/// Physical rig configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Number of addressable fixtures
    pub fixtures: usize,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self { fixtures: 4 }
    }
}

/// Schedule periods and flash fade duration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Flash fade-out duration in milliseconds
    pub fade_ms: u64,
    /// Animation (compositor) tick period in milliseconds
    pub animation_tick_ms: u64,
    /// DMX transmission tick period in milliseconds
    pub transmit_tick_ms: u64,
}

impl TimingConfig {
    /// Flash fade-out duration
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    /// Animation tick period
    pub fn animation_tick(&self) -> Duration {
        Duration::from_millis(self.animation_tick_ms)
    }

    /// Transmission tick period
    pub fn transmit_tick(&self) -> Duration {
        Duration::from_millis(self.transmit_tick_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_ms: 400,
            animation_tick_ms: 16,
            transmit_tick_ms: 40,
        }
    }
}

/// MIDI input configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Substring to match against input port names; first port wins when unset
    pub port: Option<String>,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level; `RUST_LOG` takes precedence
    pub level: String,
    /// Optional log file path; console-only when unset
    pub file: Option<PathBuf>,
}

impl LogConfig {
    /// Parse the configured level, defaulting to INFO if invalid
    pub fn parse_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// One `[[lights]]` entry: a named light source, its trigger notes, and a
/// base color spec (`#RRGGBB` or `rgb(r, g, b)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightSpec {
    /// Display name
    pub name: String,
    /// Trigger note numbers
    pub notes: Vec<u8>,
    /// Base color spec
    pub color: String,
}

impl LightSpec {
    /// Resolve the color spec into a mapping entry
    pub fn to_mapping(&self) -> LightMapping {
        LightMapping::new(
            self.name.clone(),
            self.notes.clone(),
            Color::parse(&self.color),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.serial.device, "/dev/ttyUSB0");
        assert_eq!(config.rig.fixtures, 4);
        assert_eq!(config.timing.fade(), Duration::from_millis(400));
        assert_eq!(config.timing.animation_tick(), Duration::from_millis(16));
        assert_eq!(config.timing.transmit_tick(), Duration::from_millis(40));
        assert!(config.midi.port.is_none());
        assert!(config.lights.is_empty());
    }

    #[test]
    fn test_full_config_roundtrip() {
        let config: Config = toml::from_str(
            r##"
            [serial]
            device = "/dev/ttyUSB1"

            [rig]
            fixtures = 8

            [timing]
            fade_ms = 250
            animation_tick_ms = 10
            transmit_tick_ms = 50

            [midi]
            port = "drums"

            [log]
            level = "debug"

            [[lights]]
            name = "Kick"
            notes = [35, 36]
            color = "#323232"

            [[lights]]
            name = "Snare"
            notes = [38]
            color = "rgb(80, 0, 0)"
            "##,
        )
        .unwrap();

        assert_eq!(config.serial.device, "/dev/ttyUSB1");
        assert_eq!(config.rig.fixtures, 8);
        assert_eq!(config.midi.port.as_deref(), Some("drums"));
        assert_eq!(config.log.parse_level(), tracing::Level::DEBUG);

        let table = config.mapping_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(36).unwrap().color, Color::new(50, 50, 50));
        assert_eq!(table.lookup(38).unwrap().color, Color::new(80, 0, 0));
    }

    #[test]
    fn test_invalid_level_falls_back_to_info() {
        let log = LogConfig {
            level: "shouting".to_string(),
            file: None,
        };
        assert_eq!(log.parse_level(), tracing::Level::INFO);
    }
}
