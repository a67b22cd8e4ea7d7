//! Change request sent to the gateway for a device or group.

use serde::{Deserialize, Serialize};

use crate::types::{Brightness, Chromaticity, Mired, Transition};

/// A sparse change request for a device or group.
///
/// Every field is optional: `None` leaves the attribute untouched, `Some`
/// sets it, even to zero. Serializes to the gateway's attribute codes with
/// unset fields left out.
///
/// # Examples
///
/// ```
/// use tradfri_bridge::{Payload, Transition};
///
/// let mut payload = Payload::new();
/// assert!(!payload.is_valid());
///
/// payload.dim(0);
/// payload.transition(&Transition::from_millis(0));
/// assert!(payload.is_valid());
/// assert_eq!(payload.get_dim(), Some(0));
/// assert_eq!(payload.get_power(), None);
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Payload {
    #[serde(rename = "5850")]
    pub(crate) power: Option<u8>,
    #[serde(rename = "5851")]
    pub(crate) dim: Option<u8>,
    #[serde(rename = "5711")]
    pub(crate) mireds: Option<u16>,
    #[serde(rename = "5709")]
    pub(crate) color_x: Option<u16>,
    #[serde(rename = "5710")]
    pub(crate) color_y: Option<u16>,
    #[serde(rename = "5712")]
    pub(crate) transition: Option<u32>,
}

impl Payload {
    /// Create a new empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this payload changes anything.
    ///
    /// A transition alone changes nothing.
    pub fn is_valid(&self) -> bool {
        self.power.is_some()
            || self.dim.is_some()
            || self.mireds.is_some()
            || (self.color_x.is_some() && self.color_y.is_some())
    }

    pub fn power(&mut self, on: bool) {
        self.power = Some(u8::from(on));
    }

    /// Set the raw gateway dim level.
    pub fn dim(&mut self, dim: u8) {
        self.dim = Some(dim);
    }

    pub fn brightness(&mut self, brightness: &Brightness) {
        self.dim(brightness.to_dim());
    }

    pub fn mireds(&mut self, mired: &Mired) {
        self.mireds = Some(mired.value());
    }

    /// Set the XY coordinates. The implied dim level is not applied.
    pub fn chromaticity(&mut self, xy: &Chromaticity) {
        self.color_x = Some(xy.x());
        self.color_y = Some(xy.y());
    }

    pub fn transition(&mut self, transition: &Transition) {
        self.transition = Some(transition.ticks());
    }

    pub fn get_power(&self) -> Option<bool> {
        self.power.map(|p| p != 0)
    }

    pub fn get_dim(&self) -> Option<u8> {
        self.dim
    }

    pub fn get_mireds(&self) -> Option<u16> {
        self.mireds
    }

    pub fn get_color_xy(&self) -> Option<(u16, u16)> {
        self.color_x.zip(self.color_y)
    }

    pub fn get_transition(&self) -> Option<Transition> {
        self.transition.map(Transition::from_ticks)
    }
}
