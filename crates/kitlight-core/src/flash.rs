//! Flash registry and additive compositor
//!
//! A flash is one in-flight visual event: the light state triggered by a
//! single note strike, decaying linearly over the fade duration. The
//! registry owns every live flash; the animation schedule drives aging and
//! composition through [`FlashRegistry::advance`], and the note-ingestion
//! path appends through [`FlashRegistry::trigger`]. Append never touches
//! existing entries, so the two callers only contend on a short mutex that
//! is never held across I/O.

use std::time::Duration;

use parking_lot::Mutex;

use crate::color::Color;
use crate::mapping::MappingTable;

/// Full-scale MIDI note velocity
pub const MAX_VELOCITY: u8 = 127;

/// One in-flight flash event.
///
/// `intensity` is the current strength in `[0, 1]`, derived from `age` on
/// every animation tick. The color is copied from the mapping at creation;
/// later table changes never affect a live flash.
#[derive(Debug, Clone)]
pub struct Flash {
    /// Color at full strength
    pub color: Color,
    /// Current strength in `[0, 1]`
    pub intensity: f32,
    /// Time since the triggering strike
    pub age: Duration,
    /// Strength at creation, from the strike velocity
    peak: f32,
}

impl Flash {
    fn new(color: Color, velocity: u8) -> Self {
        let peak = velocity.min(MAX_VELOCITY) as f32 / MAX_VELOCITY as f32;
        Self {
            color,
            intensity: peak,
            age: Duration::ZERO,
            peak,
        }
    }

    /// Contribution to the composed output at the current intensity
    fn contribution(&self) -> Color {
        self.color.scale(self.intensity)
    }
}

/// The set of currently active flashes, plus the static mapping table that
/// turns note events into new ones.
#[derive(Debug)]
pub struct FlashRegistry {
    mappings: MappingTable,
    fade: Duration,
    flashes: Mutex<Vec<Flash>>,
}

impl FlashRegistry {
    /// Create a registry over a mapping table with the given fade duration
    pub fn new(mappings: MappingTable, fade: Duration) -> Self {
        Self {
            mappings,
            fade,
            flashes: Mutex::new(Vec::new()),
        }
    }

    /// Ingest one note event.
    ///
    /// Unmapped notes are ignored silently; most notes are not lighting
    /// triggers. A match appends a flash at `velocity / 127` strength.
    /// Safe to call concurrently with an in-progress [`advance`] pass; the
    /// new flash is visible within one animation period.
    ///
    /// [`advance`]: FlashRegistry::advance
    pub fn trigger(&self, note: u8, velocity: u8) {
        let Some(mapping) = self.mappings.lookup(note) else {
            return;
        };
        tracing::debug!(note, velocity, light = %mapping.name, "flash triggered");
        self.flashes.lock().push(Flash::new(mapping.color, velocity));
    }

    /// Run one animation tick of fixed duration `dt` and return the
    /// composed color.
    ///
    /// Every live flash contributes `scale(color, intensity)` into a
    /// saturating accumulator, then ages by `dt`; a flash whose decayed
    /// intensity reaches zero is dropped and never composes again. The
    /// pass is a single stable scan, so a removal never skips a neighbor.
    /// A fresh flash therefore composes at its strike intensity on the
    /// first tick after creation and starts decaying from the next.
    pub fn advance(&self, dt: Duration) -> Color {
        let mut composed = Color::BLACK;
        self.flashes.lock().retain_mut(|flash| {
            if flash.intensity > 0.0 {
                composed = composed.saturating_add(flash.contribution());
            }
            flash.age += dt;
            let decay = 1.0 - flash.age.as_secs_f32() / self.fade.as_secs_f32();
            flash.intensity = (flash.peak * decay).max(0.0);
            flash.intensity > 0.0
        });
        composed
    }

    /// Drop every live flash
    pub fn clear(&self) {
        self.flashes.lock().clear();
    }

    /// Number of live flashes
    pub fn active_count(&self) -> usize {
        self.flashes.lock().len()
    }
}
