//! Device channel buffer: one DMX universe of channel values
//!
//! Channel layout is fixed: channel 1 is the rig's master dimmer, and each
//! fixture occupies a 3-channel R, G, B block starting at channel 2. The
//! engine only ever writes the first `1 + 3 × fixtures` channels; the rest
//! of the universe stays zero.

use crate::color::Color;

/// Channels in one DMX512 universe
pub const UNIVERSE_CHANNELS: usize = 512;

/// DMX channels per fixture (R, G, B)
pub const FIXTURE_STRIDE: usize = 3;

/// Most fixtures a single universe can address after the master dimmer
pub const MAX_FIXTURES: usize = (UNIVERSE_CHANNELS - 1) / FIXTURE_STRIDE;

/// A complete universe worth of channel values.
///
/// Index 0 holds DMX channel 1 (the master dimmer). Frames are built whole
/// by the compositor and published as immutable snapshots, so a reader
/// always sees the result of exactly one animation tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseFrame {
    channels: [u8; UNIVERSE_CHANNELS],
}

impl UniverseFrame {
    /// All channels dark except the master dimmer, which stays at full.
    ///
    /// "Dark" is expressed through the color channels only; disabling the
    /// dimmer would make fixture state ambiguous on re-light.
    pub fn blackout() -> Self {
        Self::composed(Color::BLACK, MAX_FIXTURES)
    }

    /// Build the frame for one composed color.
    ///
    /// Every fixture mirrors the same RGB value; the rig has no
    /// per-fixture addressing in this design. Fixture counts beyond the
    /// universe capacity are truncated.
    pub fn composed(color: Color, fixtures: usize) -> Self {
        let mut channels = [0u8; UNIVERSE_CHANNELS];
        channels[0] = 255; // master dimmer
        for fixture in 0..fixtures.min(MAX_FIXTURES) {
            let base = 1 + fixture * FIXTURE_STRIDE;
            channels[base] = color.r;
            channels[base + 1] = color.g;
            channels[base + 2] = color.b;
        }
        Self { channels }
    }

    /// Channel values, index 0 = DMX channel 1
    pub fn channels(&self) -> &[u8; UNIVERSE_CHANNELS] {
        &self.channels
    }

    /// RGB value of one fixture
    pub fn fixture_color(&self, fixture: usize) -> Color {
        let base = 1 + fixture.min(MAX_FIXTURES - 1) * FIXTURE_STRIDE;
        Color::new(
            self.channels[base],
            self.channels[base + 1],
            self.channels[base + 2],
        )
    }

    /// Master dimmer value (DMX channel 1)
    pub fn master_dimmer(&self) -> u8 {
        self.channels[0]
    }
}

impl Default for UniverseFrame {
    fn default() -> Self {
        Self::blackout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blackout_keeps_dimmer_at_full() {
        let frame = UniverseFrame::blackout();
        assert_eq!(frame.master_dimmer(), 255);
        assert!(frame.channels()[1..].iter().all(|&value| value == 0));
    }

    #[test]
    fn test_composed_writes_stride_3_blocks() {
        let frame = UniverseFrame::composed(Color::new(10, 20, 30), 2);
        assert_eq!(frame.channels()[0], 255);
        assert_eq!(&frame.channels()[1..7], &[10, 20, 30, 10, 20, 30]);
        // Channels past the rig stay zero
        assert!(frame.channels()[7..].iter().all(|&value| value == 0));
    }

    #[test]
    fn test_fixture_color_reads_back() {
        let frame = UniverseFrame::composed(Color::new(1, 2, 3), 4);
        assert_eq!(frame.fixture_color(0), Color::new(1, 2, 3));
        assert_eq!(frame.fixture_color(3), Color::new(1, 2, 3));
    }

    #[test]
    fn test_oversized_rig_is_truncated() {
        let frame = UniverseFrame::composed(Color::WHITE, 10_000);
        assert_eq!(frame.fixture_color(MAX_FIXTURES - 1), Color::WHITE);
    }
}
