//! Color temperature control.

use serde::{Deserialize, Serialize};

/// Color temperature in Kelvin.
///
/// Lower values produce warmer (more yellow/orange) light, while higher
/// values produce cooler (more blue) light. Typical values:
/// - 2200K: Warm glow
/// - 2700K: Warm white (incandescent-like)
/// - 4000K: Cool white
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Kelvin {
    pub(crate) kelvin: u16,
}

/// Reciprocal color temperature, as the gateway stores it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mired {
    pub(crate) value: u16,
}

impl Default for Kelvin {
    fn default() -> Self {
        Kelvin::new()
    }
}

impl Kelvin {
    const MIN: u16 = 1000;
    const MAX: u16 = 40000;
    const DEFAULT: u16 = 2700;

    /// Create a new Kelvin with the default value (2700K).
    ///
    /// # Examples
    ///
    /// ```
    /// use tradfri_bridge::Kelvin;
    ///
    /// assert_eq!(Kelvin::new().kelvin(), 2700);
    /// ```
    pub fn new() -> Self {
        Kelvin {
            kelvin: Self::DEFAULT,
        }
    }

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// Create a new Kelvin with the given value.
    ///
    /// Returns `None` if value is outside the valid range (1000-40000).
    ///
    /// # Examples
    ///
    /// ```
    /// use tradfri_bridge::Kelvin;
    ///
    /// assert!(Kelvin::create(999).is_none());
    /// assert!(Kelvin::create(2700).is_some());
    /// assert!(Kelvin::create(40001).is_none());
    /// ```
    pub fn create(kelvin: u16) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&kelvin)
            .then_some(Kelvin { kelvin })
    }

    /// Clamps any integer into the valid range.
    pub fn saturating(kelvin: i64) -> Self {
        Kelvin {
            kelvin: kelvin.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u16,
        }
    }

    /// Convert to mireds, clamped to what the gateway supports.
    ///
    /// # Examples
    ///
    /// ```
    /// use tradfri_bridge::Kelvin;
    ///
    /// assert_eq!(Kelvin::create(2700).unwrap().to_mired().value(), 370);
    /// // Cooler than the gateway can go
    /// assert_eq!(Kelvin::create(6500).unwrap().to_mired().value(), 250);
    /// ```
    pub fn to_mired(&self) -> Mired {
        Mired::clamped(kelvin_to_mired(self.kelvin))
    }
}

impl Mired {
    /// Coolest white the gateway accepts (4000K).
    pub const MIN: u16 = 250;
    /// Warmest white the gateway accepts (2200K).
    pub const MAX: u16 = 454;

    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn clamped(value: u16) -> Self {
        Mired {
            value: value.clamp(Self::MIN, Self::MAX),
        }
    }

    pub fn to_kelvin(&self) -> Kelvin {
        Kelvin {
            kelvin: mired_to_kelvin(self.value),
        }
    }
}

pub fn kelvin_to_mired(kelvin: u16) -> u16 {
    if kelvin == 0 {
        return u16::MAX;
    }
    (1_000_000.0 / f64::from(kelvin)).round().min(f64::from(u16::MAX)) as u16
}

pub fn mired_to_kelvin(mired: u16) -> u16 {
    if mired == 0 {
        return u16::MAX;
    }
    (1_000_000.0 / f64::from(mired)).round().min(f64::from(u16::MAX)) as u16
}
