//! 8-bit RGB color arithmetic for DMX channel values

use serde::{Deserialize, Serialize};

/// An 8-bit RGB triple, one byte per DMX color channel.
///
/// All arithmetic saturates to `[0, 255]`; channel values never wrap and
/// never go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel intensity
    pub r: u8,
    /// Green channel intensity
    pub g: u8,
    /// Blue channel intensity
    pub b: u8,
}

impl Color {
    /// All channels off
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    /// All channels full
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Create a color from channel values
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a color spec from configuration.
    ///
    /// Accepts `#RRGGBB` hex and `rgb(r, g, b)` decimal notation. Anything
    /// unparseable degrades to full white with a logged warning so a typo in
    /// the config never takes the rig down at startup.
    pub fn parse(spec: &str) -> Color {
        match Self::parse_strict(spec) {
            Some(color) => color,
            None => {
                tracing::warn!("unparseable color spec {:?}, falling back to white", spec);
                Color::WHITE
            }
        }
    }

    fn parse_strict(spec: &str) -> Option<Color> {
        let spec = spec.trim();

        if let Some(digits) = spec.strip_prefix('#') {
            let bytes = hex::decode(digits).ok()?;
            if bytes.len() != 3 {
                return None;
            }
            return Some(Color::new(bytes[0], bytes[1], bytes[2]));
        }

        if let Some(inner) = spec
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut channels = inner.split(',').map(|part| part.trim().parse::<u8>());
            let r = channels.next()?.ok()?;
            let g = channels.next()?.ok()?;
            let b = channels.next()?.ok()?;
            if channels.next().is_some() {
                return None;
            }
            return Some(Color::new(r, g, b));
        }

        None
    }

    /// Multiply each channel by `factor`, truncating toward zero and
    /// saturating to `[0, 255]` for any factor, including negative ones.
    pub fn scale(self, factor: f32) -> Color {
        let scale_channel = |channel: u8| (channel as f32 * factor).clamp(0.0, 255.0) as u8;
        Color {
            r: scale_channel(self.r),
            g: scale_channel(self.g),
            b: scale_channel(self.b),
        }
    }

    /// Channel-wise sum, saturating at 255.
    pub fn saturating_add(self, other: Color) -> Color {
        Color {
            r: self.r.saturating_add(other.r),
            g: self.g.saturating_add(other.g),
            b: self.b.saturating_add(other.b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse("#ff8040"), Color::new(255, 128, 64));
        assert_eq!(Color::parse("#000000"), Color::BLACK);
        assert_eq!(Color::parse(" #323232 "), Color::new(50, 50, 50));
    }

    #[test]
    fn test_parse_rgb_notation() {
        assert_eq!(Color::parse("rgb(255, 128, 64)"), Color::new(255, 128, 64));
        assert_eq!(Color::parse("rgb(0,0,0)"), Color::BLACK);
    }

    #[test]
    fn test_parse_fallback_is_white() {
        assert_eq!(Color::parse(""), Color::WHITE);
        assert_eq!(Color::parse("#12345"), Color::WHITE);
        assert_eq!(Color::parse("#gggggg"), Color::WHITE);
        assert_eq!(Color::parse("rgb(1, 2)"), Color::WHITE);
        assert_eq!(Color::parse("rgb(1, 2, 3, 4)"), Color::WHITE);
        assert_eq!(Color::parse("rgb(300, 0, 0)"), Color::WHITE);
        assert_eq!(Color::parse("blue"), Color::WHITE);
    }

    #[test]
    fn test_add_saturates() {
        assert_eq!(
            Color::new(200, 0, 0).saturating_add(Color::new(100, 0, 0)),
            Color::new(255, 0, 0)
        );
        assert_eq!(
            Color::new(255, 255, 255).saturating_add(Color::new(1, 1, 1)),
            Color::WHITE
        );
    }

    #[test]
    fn test_scale_truncates_toward_zero() {
        assert_eq!(Color::new(50, 50, 50).scale(0.96), Color::new(48, 48, 48));
        assert_eq!(Color::new(255, 255, 255).scale(0.5), Color::new(127, 127, 127));
    }

    #[test]
    fn test_scale_clamps_out_of_range_factors() {
        assert_eq!(Color::new(100, 100, 100).scale(-1.0), Color::BLACK);
        assert_eq!(Color::new(200, 200, 200).scale(10.0), Color::WHITE);
    }

    proptest! {
        #[test]
        fn add_never_wraps(r1: u8, g1: u8, b1: u8, r2: u8, g2: u8, b2: u8) {
            let sum = Color::new(r1, g1, b1).saturating_add(Color::new(r2, g2, b2));
            prop_assert!(sum.r as u16 >= r1.max(r2) as u16);
            prop_assert!(sum.g as u16 >= g1.max(g2) as u16);
            prop_assert!(sum.b as u16 >= b1.max(b2) as u16);
        }

        #[test]
        fn scale_stays_in_range(r: u8, g: u8, b: u8, factor in -10.0f32..10.0) {
            // u8 output can't leave [0, 255]; the property worth checking is
            // that negative factors floor at zero and large ones cap at 255.
            let scaled = Color::new(r, g, b).scale(factor);
            if factor <= 0.0 {
                prop_assert_eq!(scaled, Color::BLACK);
            }
            if factor >= 1.0 {
                prop_assert!(scaled.r >= r || scaled.r == 255);
            }
        }
    }
}
