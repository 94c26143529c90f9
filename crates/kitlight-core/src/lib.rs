//! Kitlight Core - Domain Model for the Lighting Engine
//!
//! This crate contains the pure domain model for kitlight:
//! - Color model: saturating 8-bit RGB arithmetic and config-spec parsing
//! - Note-to-light mapping table
//! - Flash registry and additive compositor
//! - Device channel buffer (one DMX universe frame)
//! - Startup configuration
//!
//! Everything here is free of device I/O; the serial link and the MIDI
//! source live in `kitlight-control`.

#![warn(missing_docs)]

pub mod color;
pub mod config;
pub mod flash;
pub mod frame;
pub mod mapping;

pub use color::Color;
pub use config::{Config, ConfigError, LightSpec, LogConfig, TimingConfig};
pub use flash::{Flash, FlashRegistry, MAX_VELOCITY};
pub use frame::{UniverseFrame, FIXTURE_STRIDE, MAX_FIXTURES, UNIVERSE_CHANNELS};
pub use mapping::{LightMapping, MappingTable};
