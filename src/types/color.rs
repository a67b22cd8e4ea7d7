//! RGB colors and the gateway's XY chromaticity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::brightness::MAX_DIM;
use super::kelvin::Kelvin;
use crate::errors::Error;

/// An RGB color with red, green, and blue components (0-255 each).
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub(crate) red: u8,
    pub(crate) green: u8,
    pub(crate) blue: u8,
}

impl Color {
    /// Create a color with the given RGB values.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    /// Approximate the color of a black body at the given temperature.
    pub fn from_kelvin(kelvin: &Kelvin) -> Self {
        let t = f64::from(kelvin.kelvin()) / 100.0;

        let red = if t <= 66.0 {
            255.0
        } else {
            329.698_727_446 * (t - 60.0).powf(-0.133_204_759_2)
        };
        let green = if t <= 66.0 {
            99.470_802_586_1 * t.ln() - 161.119_568_166_1
        } else {
            288.122_169_528_3 * (t - 60.0).powf(-0.075_514_849_2)
        };
        let blue = if t >= 66.0 {
            255.0
        } else if t <= 19.0 {
            0.0
        } else {
            138.517_731_223_1 * (t - 10.0).ln() - 305.044_792_730_7
        };

        let channel = |v: f64| v.clamp(0.0, 255.0).round() as u8;
        Color::rgb(channel(red), channel(green), channel(blue))
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse from a hex string (e.g., "#ff8000"), case-insensitive.
    fn from_str(s: &str) -> Result<Self, Error> {
        let Some(hex) = s.strip_prefix('#') else {
            return Err(Error::invalid_color(s, "expected #rrggbb"));
        };
        if hex.len() != 6 {
            return Err(Error::invalid_color(s, "expected 6 hex digits"));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::invalid_color(s, "non-hex character"));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| Error::invalid_color(s, "non-hex character"))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// CIE 1931 xy coordinates in gateway units (0-65535) plus the dim level
/// implied by the color's luminance.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Chromaticity {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) dim: u8,
}

impl Chromaticity {
    const SCALE: f64 = 65535.0;

    pub fn x(&self) -> u16 {
        self.x
    }

    pub fn y(&self) -> u16 {
        self.y
    }

    pub fn dim(&self) -> u8 {
        self.dim
    }

    /// Convert an sRGB color.
    ///
    /// Black has no chromaticity and is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use tradfri_bridge::{Chromaticity, Color};
    ///
    /// let white = Chromaticity::from_color(&Color::rgb(255, 255, 255)).unwrap();
    /// assert_eq!(white.dim(), 254);
    /// assert!(Chromaticity::from_color(&Color::rgb(0, 0, 0)).is_err());
    /// ```
    pub fn from_color(color: &Color) -> Result<Self, Error> {
        let r = linearize(color.red);
        let g = linearize(color.green);
        let b = linearize(color.blue);

        // sRGB primaries, D65 white point
        let x = r * 0.412_456_4 + g * 0.357_576_1 + b * 0.180_437_5;
        let y = r * 0.212_672_9 + g * 0.715_152_2 + b * 0.072_175_0;
        let z = r * 0.019_333_9 + g * 0.119_192_0 + b * 0.950_304_1;

        let sum = x + y + z;
        if sum <= f64::EPSILON {
            return Err(Error::invalid_color(
                &format!("rgb({},{},{})", color.red, color.green, color.blue),
                "no chromaticity",
            ));
        }

        Ok(Chromaticity {
            x: (x / sum * Self::SCALE).round() as u16,
            y: (y / sum * Self::SCALE).round() as u16,
            dim: (y * f64::from(MAX_DIM)).round().min(f64::from(MAX_DIM)) as u8,
        })
    }

    /// Parse and convert a hex string in one step.
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        Self::from_color(&hex.parse()?)
    }

    /// Chromaticity of white light at the given temperature, for fixtures
    /// that cannot take mireds.
    pub fn from_kelvin(kelvin: &Kelvin) -> Result<Self, Error> {
        Self::from_color(&Color::from_kelvin(kelvin))
    }
}

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#ff8000".parse::<Color>().unwrap(), Color::rgb(255, 128, 0));
        assert_eq!("#FF8000".parse::<Color>().unwrap(), Color::rgb(255, 128, 0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["ff8000", "#ff800", "#ff80000", "#gg8000", "", "#"] {
            assert!(
                matches!(input.parse::<Color>(), Err(Error::InvalidColor(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_red_chromaticity() {
        let red = Chromaticity::from_hex("#ff0000").unwrap();
        // x = 0.64, y = 0.33
        assert!(red.x().abs_diff(41942) <= 2);
        assert!(red.y().abs_diff(21627) <= 2);
        assert_eq!(red.dim(), 54);
    }

    #[test]
    fn test_white_is_d65() {
        let white = Chromaticity::from_hex("#ffffff").unwrap();
        // x = 0.3127, y = 0.3290
        assert!(white.x().abs_diff(20493) <= 10);
        assert!(white.y().abs_diff(21561) <= 10);
        assert_eq!(white.dim(), MAX_DIM);
    }

    #[test]
    fn test_black_is_invalid() {
        assert!(matches!(
            Chromaticity::from_hex("#000000"),
            Err(Error::InvalidColor(_))
        ));
    }

    #[test]
    fn test_kelvin_warmer_is_redder() {
        let warm = Chromaticity::from_kelvin(&Kelvin::create(2200).unwrap()).unwrap();
        let cool = Chromaticity::from_kelvin(&Kelvin::create(4000).unwrap()).unwrap();
        assert!(warm.x() > cool.x());
    }

    #[test]
    fn test_kelvin_color() {
        assert_eq!(Color::from_kelvin(&Kelvin::create(6600).unwrap()).red(), 255);
        assert_eq!(Color::from_kelvin(&Kelvin::create(1500).unwrap()).blue(), 0);
    }
}
