//! Brightness percentage and gateway dim level.

use serde::{Deserialize, Serialize};

/// Highest dim level the gateway accepts.
pub const MAX_DIM: u8 = 254;

/// Brightness level from 0 to 100 percent.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    const MAX: u8 = 100;

    /// Create a new Brightness at full level.
    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is above 100.
    ///
    /// # Examples
    ///
    /// ```
    /// use tradfri_bridge::Brightness;
    ///
    /// assert!(Brightness::create(0).is_some());
    /// assert!(Brightness::create(100).is_some());
    /// assert!(Brightness::create(101).is_none());
    /// ```
    pub fn create(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Brightness { value })
    }

    /// Clamps any integer into 0-100.
    pub fn saturating(value: i64) -> Self {
        Brightness {
            value: value.clamp(0, i64::from(Self::MAX)) as u8,
        }
    }

    /// Convert to the gateway dim level (0-254).
    ///
    /// # Examples
    ///
    /// ```
    /// use tradfri_bridge::Brightness;
    ///
    /// assert_eq!(Brightness::create(0).unwrap().to_dim(), 0);
    /// assert_eq!(Brightness::create(50).unwrap().to_dim(), 127);
    /// assert_eq!(Brightness::create(100).unwrap().to_dim(), 254);
    /// ```
    pub fn to_dim(&self) -> u8 {
        percentage_to_dim(self.value)
    }

    /// Read a gateway dim level back as a percentage.
    pub fn from_dim(dim: u8) -> Self {
        Brightness {
            value: dim_to_percentage(dim),
        }
    }

    /// Caps the level at `ceiling`.
    pub fn at_most(self, ceiling: Brightness) -> Self {
        self.min(ceiling)
    }
}

pub fn percentage_to_dim(percentage: u8) -> u8 {
    let percentage = percentage.min(Brightness::MAX);
    (f32::from(percentage) * f32::from(MAX_DIM) / 100.0).round() as u8
}

pub fn dim_to_percentage(dim: u8) -> u8 {
    let dim = dim.min(MAX_DIM);
    (f32::from(dim) * 100.0 / f32::from(MAX_DIM)).round() as u8
}
