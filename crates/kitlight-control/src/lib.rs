//! Kitlight Control - Device Integration for the Lighting Engine
//!
//! This crate wires the pure domain model from `kitlight-core` to the
//! physical world:
//! - [`dmx`] - DMX512 frame transmission over a serial link
//! - [`midi`] - the MIDI note source that feeds the engine
//! - [`engine`] - the facade owning both periodic schedules
//! - [`error`] - error types

pub mod dmx;
pub mod engine;
pub mod error;
pub mod midi;

pub use dmx::{DmxPort, DmxTransmitter};
pub use engine::LightEngine;
pub use error::{LightError, Result};
pub use midi::{MidiNoteInput, NoteEvent};
