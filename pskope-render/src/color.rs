//! RGBA colors and the stage palette

use pskope_signal::Stage;

/// 8-bit straight-alpha color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Same color with its alpha scaled by `opacity` (0.0 - 1.0)
    pub fn with_alpha(self, opacity: f32) -> Self {
        let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
        Self {
            a: (self.a as f32 * opacity).round() as u8,
            ..self
        }
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Source-over composite of `self` onto `dst`
    pub fn over(self, dst: Rgba) -> Rgba {
        if self.a == 255 || dst.a == 0 {
            return self;
        }
        if self.a == 0 {
            return dst;
        }

        let sa = self.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| {
            let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            c.round().clamp(0.0, 255.0) as u8
        };

        Rgba {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: (out_a * 255.0).round() as u8,
        }
    }
}

/// Playhead marker color
pub const ACCENT: Rgba = Rgba::rgb(0xf1, 0xc4, 0x0f);

/// Readout text color
pub const READOUT: Rgba = Rgba::rgb(0xec, 0xf0, 0xf1);

/// Trace color of a stage
pub fn stage_color(stage: Stage) -> Rgba {
    match stage {
        Stage::Original => Rgba::rgb(0xb1, 0x3c, 0xe7),
        Stage::Pcm => Rgba::rgb(0x34, 0x98, 0xdb),
        Stage::Binary => Rgba::rgb(0xe7, 0x3c, 0xae),
        Stage::Polar => Rgba::rgb(0x5e, 0xe7, 0x3c),
        Stage::Carrier => Rgba::rgb(0xd0, 0xe7, 0x3c),
        Stage::Psk => Rgba::rgb(0xe7, 0x4c, 0x3c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgba::from_hex("#3498db"), Some(Rgba::rgb(0x34, 0x98, 0xdb)));
        assert_eq!(Rgba::from_hex("e74c3c"), Some(stage_color(Stage::Psk)));
        assert_eq!(Rgba::from_hex("#34"), None);
        assert_eq!(Rgba::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_over() {
        let red = Rgba::rgb(255, 0, 0);
        let blue = Rgba::rgb(0, 0, 255);
        assert_eq!(red.over(blue), red);
        assert_eq!(red.over(Rgba::TRANSPARENT), red);
        assert_eq!(Rgba::TRANSPARENT.over(blue), blue);

        let half = red.with_alpha(0.5).over(blue);
        assert_eq!(half.a, 255);
        assert!(half.r > 120 && half.r < 135);
        assert!(half.b > 120 && half.b < 135);
    }

    #[test]
    fn test_stage_colors_distinct() {
        for a in Stage::ALL {
            for b in Stage::ALL {
                if a != b {
                    assert_ne!(stage_color(a), stage_color(b));
                }
            }
        }
    }
}
