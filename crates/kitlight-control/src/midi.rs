//! MIDI note source
//!
//! The deployed rig hangs off an electronic drum kit: each pad strike
//! arrives as a MIDI note-on. This module owns the input connection and
//! forwards note-ons to a caller-supplied handler; everything else on the
//! wire is dropped here.

use midir::{MidiInput, MidiInputConnection};

use crate::error::{LightError, Result};

const CLIENT_NAME: &str = "kitlight";

/// One note strike from the upstream source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    /// MIDI note number
    pub note: u8,
    /// Strike velocity in `[0, 127]`
    pub velocity: u8,
}

/// The subset of MIDI messages the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MidiMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
}

impl MidiMessage {
    /// Parse a raw MIDI message, ignoring everything but note events
    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }

        match bytes[0] & 0xF0 {
            0x90 => {
                let velocity = bytes[2];
                if velocity == 0 {
                    // Note On with velocity 0 is treated as Note Off
                    Some(MidiMessage::NoteOff { note: bytes[1] })
                } else {
                    Some(MidiMessage::NoteOn {
                        note: bytes[1],
                        velocity,
                    })
                }
            }
            0x80 => Some(MidiMessage::NoteOff { note: bytes[1] }),
            _ => None,
        }
    }
}

/// An open MIDI input connection feeding note events to the engine.
///
/// The connection closes when the value is dropped.
pub struct MidiNoteInput {
    _connection: MidiInputConnection<()>,
}

impl MidiNoteInput {
    /// Connect to an input port and forward note-ons to `on_note`.
    ///
    /// `port_hint` selects the first port whose name contains the hint
    /// (case-insensitive); with no hint the first available port is used.
    /// The handler runs on the MIDI driver's callback thread and must not
    /// block.
    pub fn connect<F>(port_hint: Option<&str>, on_note: F) -> Result<Self>
    where
        F: Fn(NoteEvent) + Send + 'static,
    {
        let input = MidiInput::new(CLIENT_NAME)?;
        let ports = input.ports();

        let port = ports
            .iter()
            .find(|port| {
                let name = input.port_name(port).unwrap_or_default();
                match port_hint {
                    Some(hint) => name.to_lowercase().contains(&hint.to_lowercase()),
                    None => true,
                }
            })
            .ok_or_else(|| match port_hint {
                Some(hint) => LightError::MidiPort(format!("no input port matching {hint:?}")),
                None => LightError::MidiPort("no MIDI input ports available".to_string()),
            })?;

        let port_name = input.port_name(port).unwrap_or_default();
        let connection = input.connect(
            port,
            "kitlight-notes",
            move |_timestamp, bytes, _| {
                if let Some(MidiMessage::NoteOn { note, velocity }) = MidiMessage::from_bytes(bytes)
                {
                    on_note(NoteEvent { note, velocity });
                }
            },
            (),
        )?;

        tracing::info!(port = %port_name, "listening for note events");
        Ok(Self {
            _connection: connection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_parsing() {
        assert_eq!(
            MidiMessage::from_bytes(&[0x90, 36, 100]),
            Some(MidiMessage::NoteOn {
                note: 36,
                velocity: 100
            })
        );
        // Channel bits are ignored; any channel triggers
        assert_eq!(
            MidiMessage::from_bytes(&[0x99, 38, 64]),
            Some(MidiMessage::NoteOn {
                note: 38,
                velocity: 64
            })
        );
    }

    #[test]
    fn test_velocity_zero_is_note_off() {
        assert_eq!(
            MidiMessage::from_bytes(&[0x90, 36, 0]),
            Some(MidiMessage::NoteOff { note: 36 })
        );
        assert_eq!(
            MidiMessage::from_bytes(&[0x80, 36, 64]),
            Some(MidiMessage::NoteOff { note: 36 })
        );
    }

    #[test]
    fn test_other_messages_are_dropped() {
        // Control change, clock, truncated note-on
        assert_eq!(MidiMessage::from_bytes(&[0xB0, 7, 64]), None);
        assert_eq!(MidiMessage::from_bytes(&[0xF8]), None);
        assert_eq!(MidiMessage::from_bytes(&[0x90, 36]), None);
    }
}
