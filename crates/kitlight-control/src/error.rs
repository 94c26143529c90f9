//! Error types for the control layer
use thiserror::Error;

/// Control layer errors
#[derive(Error, Debug)]
pub enum LightError {
    /// Serial port error
    #[error("serial error: {0}")]
    Serial(#[from] serialport::Error),

    /// MIDI initialization error
    #[error("MIDI init error: {0}")]
    MidiInit(#[from] midir::InitError),

    /// MIDI connection error
    #[error("MIDI connection error: {0}")]
    MidiConnect(#[from] midir::ConnectError<midir::MidiInput>),

    /// No usable MIDI input port
    #[error("MIDI port error: {0}")]
    MidiPort(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, LightError>;
