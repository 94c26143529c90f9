//! DMX output system
//!
//! This module provides DMX512 output over a serial interface.
//!
//! ## Wire format
//!
//! One frame per protocol tick:
//! 1. Break condition, line held low (≥88 µs per the standard; 200 µs here
//!    for margin)
//! 2. Mark-after-break, line idle (≥8 µs per the standard; 100 µs here)
//! 3. Start code `0x00`, then 512 channel bytes in ascending order
//!
//! Line parameters are fixed by the DMX512 standard and are not
//! configurable per rig: 250 000 baud, 8 data bits, 2 stop bits, no
//! parity.
//!
//! ## Failure semantics
//!
//! Delivery is best-effort, at most one frame per tick. With no port
//! attached a tick is a silent no-op; a failed write is logged and the
//! next tick retries independently. Receivers hold their last received
//! state, so occasional dropped frames are invisible on stage.

mod transmitter;

pub use transmitter::{build_wire_frame, open_port, DmxPort, DmxTransmitter, WIRE_FRAME_LEN};

use std::time::Duration;

/// DMX512 line rate, fixed by the standard
pub const DMX_BAUD: u32 = 250_000;

/// Start code for a standard dimmer-data frame
pub const DMX_START_CODE: u8 = 0x00;

/// Break duration; the standard requires at least 88 µs
pub const BREAK_DURATION: Duration = Duration::from_micros(200);

/// Mark-after-break duration; the standard requires at least 8 µs
pub const MARK_AFTER_BREAK: Duration = Duration::from_micros(100);
