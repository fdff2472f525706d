//! SassScript colors.
//!
//! A color is stored canonically as RGB channels in [0, 255] (fractional
//! while arithmetic is in flight) plus an alpha in [0, 1]. HSL and HWB
//! views convert on demand; construction from any of the three models is
//! supported and interconversion is exact up to floating-point error.

use crate::number::{format_double, fuzzy_equals};

/// A SassScript color.
#[derive(Clone, Debug)]
pub struct Color {
    red: f64,
    green: f64,
    blue: f64,
    alpha: f64,
}

impl Color {
    /// From RGB channels in [0, 255] and alpha in [0, 1]; channels clamp.
    pub fn from_rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Color {
            red: red.clamp(0.0, 255.0),
            green: green.clamp(0.0, 255.0),
            blue: blue.clamp(0.0, 255.0),
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// From hue in degrees (wraps), saturation and lightness in [0, 100].
    pub fn from_hsla(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);
        if s == 0.0 {
            let gray = l * 255.0;
            return Color::from_rgba(gray, gray, gray, alpha);
        }
        let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
        let m1 = l * 2.0 - m2;
        Color::from_rgba(
            hue_to_rgb(m1, m2, h + 1.0 / 3.0) * 255.0,
            hue_to_rgb(m1, m2, h) * 255.0,
            hue_to_rgb(m1, m2, h - 1.0 / 3.0) * 255.0,
            alpha,
        )
    }

    /// From hue in degrees, whiteness and blackness in [0, 100].
    pub fn from_hwba(hue: f64, whiteness: f64, blackness: f64, alpha: f64) -> Self {
        let mut white = (whiteness / 100.0).clamp(0.0, 1.0);
        let mut black = (blackness / 100.0).clamp(0.0, 1.0);
        let sum = white + black;
        if sum > 1.0 {
            white /= sum;
            black /= sum;
        }
        let base = Color::from_hsla(hue, 100.0, 50.0, alpha);
        let scale = |channel: f64| (channel / 255.0 * (1.0 - white - black) + white) * 255.0;
        Color::from_rgba(
            scale(base.red),
            scale(base.green),
            scale(base.blue),
            alpha,
        )
    }

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Hue in degrees, [0, 360).
    pub fn hue(&self) -> f64 {
        let (r, g, b) = self.scaled();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        if delta == 0.0 {
            return 0.0;
        }
        let hue = if max == r {
            (g - b) / delta % 6.0
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (hue * 60.0).rem_euclid(360.0)
    }

    /// Saturation in [0, 100].
    pub fn saturation(&self) -> f64 {
        let (r, g, b) = self.scaled();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        if delta == 0.0 {
            return 0.0;
        }
        let lightness = (max + min) / 2.0;
        let saturation = if lightness > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };
        saturation * 100.0
    }

    /// Lightness in [0, 100].
    pub fn lightness(&self) -> f64 {
        let (r, g, b) = self.scaled();
        (r.max(g).max(b) + r.min(g).min(b)) / 2.0 * 100.0
    }

    /// HWB whiteness in [0, 100].
    pub fn whiteness(&self) -> f64 {
        let (r, g, b) = self.scaled();
        r.min(g).min(b) * 100.0
    }

    /// HWB blackness in [0, 100].
    pub fn blackness(&self) -> f64 {
        let (r, g, b) = self.scaled();
        (1.0 - r.max(g).max(b)) * 100.0
    }

    /// A copy with a different alpha.
    #[must_use]
    pub fn with_alpha(&self, alpha: f64) -> Self {
        Color::from_rgba(self.red, self.green, self.blue, alpha)
    }

    /// Channel-rounded equality; colors compare by their displayed form.
    pub fn equals(&self, other: &Color) -> bool {
        round_channel(self.red) == round_channel(other.red)
            && round_channel(self.green) == round_channel(other.green)
            && round_channel(self.blue) == round_channel(other.blue)
            && fuzzy_equals(self.alpha, other.alpha)
    }

    /// Key for hashing, consistent with [`Color::equals`].
    pub fn canonical_key(&self) -> (u8, u8, u8, i64) {
        (
            round_channel(self.red),
            round_channel(self.green),
            round_channel(self.blue),
            (self.alpha * 1e11).round() as i64,
        )
    }

    /// CSS serialization: hex when fully opaque, `rgba(...)` otherwise.
    pub fn write_css(&self, out: &mut String, compressed: bool) {
        let (r, g, b) = (
            round_channel(self.red),
            round_channel(self.green),
            round_channel(self.blue),
        );
        if fuzzy_equals(self.alpha, 1.0) {
            if compressed && can_shorten(r, g, b) {
                out.push_str(&format!(
                    "#{:x}{:x}{:x}",
                    r & 0xf,
                    g & 0xf,
                    b & 0xf
                ));
            } else {
                out.push_str(&format!("#{r:02x}{g:02x}{b:02x}"));
            }
        } else {
            let comma = if compressed { "," } else { ", " };
            out.push_str(&format!(
                "rgba({r}{comma}{g}{comma}{b}{comma}{})",
                format_double(self.alpha, compressed)
            ));
        }
    }

    fn scaled(&self) -> (f64, f64, f64) {
        (self.red / 255.0, self.green / 255.0, self.blue / 255.0)
    }
}

fn hue_to_rgb(m1: f64, m2: f64, mut h: f64) -> f64 {
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }
    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}

fn round_channel(channel: f64) -> u8 {
    channel.round().clamp(0.0, 255.0) as u8
}

/// Whether `#rrggbb` compresses to `#rgb`.
fn can_shorten(r: u8, g: u8, b: u8) -> bool {
    let doubled = |c: u8| (c >> 4) == (c & 0xf);
    doubled(r) && doubled(g) && doubled(b)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_round_trip() {
        let color = Color::from_hsla(210.0, 40.0, 60.0, 1.0);
        assert!((color.hue() - 210.0).abs() < 1e-6);
        assert!((color.saturation() - 40.0).abs() < 1e-6);
        assert!((color.lightness() - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_hwb_normalizes_overflow() {
        // whiteness + blackness > 100 scales down proportionally: gray.
        let color = Color::from_hwba(0.0, 80.0, 80.0, 1.0);
        assert_eq!(round_channel(color.red()), round_channel(color.green()));
        assert_eq!(round_channel(color.green()), round_channel(color.blue()));
    }

    #[test]
    fn test_css_hex() {
        let mut out = String::new();
        Color::from_rgba(255.0, 0.0, 0.0, 1.0).write_css(&mut out, false);
        assert_eq!(out, "#ff0000");

        let mut short = String::new();
        Color::from_rgba(255.0, 0.0, 0.0, 1.0).write_css(&mut short, true);
        assert_eq!(short, "#f00");
    }

    #[test]
    fn test_css_rgba() {
        let mut out = String::new();
        Color::from_rgba(10.0, 20.0, 30.0, 0.5).write_css(&mut out, false);
        assert_eq!(out, "rgba(10, 20, 30, 0.5)");
    }

    #[test]
    fn test_equality_rounds_channels() {
        let a = Color::from_rgba(10.4, 20.0, 30.0, 1.0);
        let b = Color::from_rgba(10.0, 20.0, 30.0, 1.0);
        assert!(a.equals(&b));
    }
}
