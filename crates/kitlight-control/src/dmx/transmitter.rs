//! DMX frame transmission over a serial port

use std::io::{self, Write};
use std::time::Duration;

use kitlight_core::{UniverseFrame, UNIVERSE_CHANNELS};
use serialport::{DataBits, Parity, SerialPort, StopBits};

use super::{BREAK_DURATION, DMX_BAUD, DMX_START_CODE, MARK_AFTER_BREAK};
use crate::error::Result;

/// Bytes on the wire per frame: start code plus one byte per channel
pub const WIRE_FRAME_LEN: usize = 1 + UNIVERSE_CHANNELS;

/// Write timeout for the serial port; bounds the shutdown blackout send
/// when the link is wedged
const WRITE_TIMEOUT: Duration = Duration::from_millis(250);

/// The serial primitives a DMX frame needs.
///
/// The production implementation is any [`serialport::SerialPort`]; tests
/// substitute a recording mock.
pub trait DmxPort: Send {
    /// Hold the line in the break condition
    fn assert_break(&mut self) -> io::Result<()>;

    /// Release the break (start of the mark-after-break)
    fn release_break(&mut self) -> io::Result<()>;

    /// Write one complete frame's bytes
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl DmxPort for Box<dyn SerialPort> {
    fn assert_break(&mut self) -> io::Result<()> {
        self.set_break().map_err(io::Error::from)
    }

    fn release_break(&mut self) -> io::Result<()> {
        self.clear_break().map_err(io::Error::from)
    }

    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)?;
        self.flush()
    }
}

/// Open the serial device with the DMX512 line parameters
pub fn open_port(device: &str) -> Result<Box<dyn SerialPort>> {
    let port = serialport::new(device, DMX_BAUD)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::Two)
        .parity(Parity::None)
        .timeout(WRITE_TIMEOUT)
        .open()?;
    Ok(port)
}

/// Serialize a universe frame into its wire bytes
pub fn build_wire_frame(frame: &UniverseFrame) -> [u8; WIRE_FRAME_LEN] {
    let mut bytes = [0u8; WIRE_FRAME_LEN];
    bytes[0] = DMX_START_CODE;
    bytes[1..].copy_from_slice(frame.channels());
    bytes
}

/// Owns the serial connection and emits one framed universe per call.
///
/// Holds no reference to the channel buffer; callers pass the snapshot to
/// transmit, so no lock is ever held across the serial write.
pub struct DmxTransmitter {
    port: Option<Box<dyn DmxPort>>,
}

impl DmxTransmitter {
    /// Create a transmitter with no port attached
    pub fn new() -> Self {
        Self { port: None }
    }

    /// Attach an open port; transmission resumes on the next tick
    pub fn attach<P: DmxPort + 'static>(&mut self, port: P) {
        self.port = Some(Box::new(port));
    }

    /// Drop the port, closing the connection
    pub fn detach(&mut self) {
        self.port = None;
    }

    /// Whether a port is currently attached
    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Emit one complete DMX frame for the given universe snapshot.
    ///
    /// A no-op while disconnected. A timed-out write is logged and the
    /// port kept; any other I/O error drops the connection and subsequent
    /// ticks no-op until a new port is attached.
    pub fn transmit(&mut self, frame: &UniverseFrame) {
        let Some(port) = self.port.as_mut() else {
            return;
        };

        if let Err(error) = Self::send_frame(port.as_mut(), frame) {
            if error.kind() == io::ErrorKind::TimedOut {
                tracing::warn!(%error, "DMX frame write timed out; dropping frame");
            } else {
                tracing::error!(%error, "DMX serial link failed; transmission suspended");
                self.port = None;
            }
        }
    }

    fn send_frame(port: &mut dyn DmxPort, frame: &UniverseFrame) -> io::Result<()> {
        port.assert_break()?;
        std::thread::sleep(BREAK_DURATION);
        port.release_break()?;
        std::thread::sleep(MARK_AFTER_BREAK);
        port.write_frame(&build_wire_frame(frame))
    }
}

impl Default for DmxTransmitter {
    fn default() -> Self {
        Self::new()
    }
}
