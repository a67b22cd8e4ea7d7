//! Fixture snapshots as reported by the gateway, and change detection.

use serde::{Deserialize, Serialize};
use serde_with::{BoolFromInt, serde_as};

use crate::fixture::FixtureId;
use crate::types::{Brightness, Kelvin, Mired, PowerMode, dim_to_percentage};

/// One light channel of a device.
///
/// Fields the fixture does not support are `None`: a white-only bulb has no
/// XY, a colour bulb usually has no mireds.
#[serde_as]
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct LightState {
    #[serde(rename = "5850")]
    #[serde_as(as = "BoolFromInt")]
    pub(crate) power: bool,
    #[serde(rename = "5851")]
    pub(crate) dim: Option<u8>,
    #[serde(rename = "5711")]
    pub(crate) mireds: Option<u16>,
    #[serde(rename = "5709")]
    pub(crate) color_x: Option<u16>,
    #[serde(rename = "5710")]
    pub(crate) color_y: Option<u16>,
    #[serde(rename = "5707")]
    pub(crate) hue: Option<u16>,
    #[serde(rename = "5708")]
    pub(crate) saturation: Option<u16>,
}

impl LightState {
    pub fn new(power: bool) -> Self {
        LightState {
            power,
            ..Default::default()
        }
    }

    pub fn with_dim(mut self, dim: u8) -> Self {
        self.dim = Some(dim);
        self
    }

    pub fn with_mireds(mut self, mireds: u16) -> Self {
        self.mireds = Some(mireds);
        self
    }

    pub fn with_color_xy(mut self, x: u16, y: u16) -> Self {
        self.color_x = Some(x);
        self.color_y = Some(y);
        self
    }

    pub fn with_hue_saturation(mut self, hue: u16, saturation: u16) -> Self {
        self.hue = Some(hue);
        self.saturation = Some(saturation);
        self
    }

    /// The power flag exactly as reported.
    pub fn raw_power(&self) -> bool {
        self.power
    }

    /// Power with the dim-to-zero quirk absorbed: the gateway leaves the
    /// power flag on after fading to zero, so a level that reads as 0% is off.
    pub fn emitting(&self) -> bool {
        self.power && self.dim.is_none_or(|dim| dim_to_percentage(dim) > 0)
    }

    pub fn dim(&self) -> Option<u8> {
        self.dim
    }

    pub fn brightness(&self) -> Option<Brightness> {
        self.dim.map(Brightness::from_dim)
    }

    pub fn mireds(&self) -> Option<u16> {
        self.mireds
    }

    pub fn temp(&self) -> Option<Kelvin> {
        self.mireds.map(|value| Mired { value }.to_kelvin())
    }

    pub fn color_xy(&self) -> Option<(u16, u16)> {
        self.color_x.zip(self.color_y)
    }

    pub fn hue(&self) -> Option<u16> {
        self.hue
    }

    pub fn saturation(&self) -> Option<u16> {
        self.saturation
    }

    fn same_as(&self, other: &Self) -> bool {
        self.emitting() == other.emitting() && self.dim == other.dim && self.mireds == other.mireds
    }
}

/// Last known state of a single device.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Device {
    #[serde(rename = "9003")]
    pub(crate) id: u32,
    #[serde(rename = "9001", default)]
    pub(crate) name: String,
    #[serde(rename = "3311", default)]
    pub(crate) light_control: Vec<LightState>,
}

impl Device {
    pub fn new(id: u32, name: &str) -> Self {
        Device {
            id,
            name: name.to_string(),
            light_control: Vec::new(),
        }
    }

    pub fn with_light(mut self, light: LightState) -> Self {
        self.light_control.push(light);
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn fixture(&self) -> FixtureId {
        FixtureId::device(self.id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The controllable light channel, if any. Remotes and sensors have none.
    pub fn light(&self) -> Option<&LightState> {
        self.light_control.first()
    }

    /// Whether the fixture takes color temperature in mireds. Fixtures that
    /// don't get temperature as XY instead.
    pub fn supports_direct_color_temperature(&self) -> bool {
        self.light().is_some_and(|light| light.mireds.is_some())
    }

    /// Whether the fixture takes chromaticity coordinates.
    pub fn supports_color_xy(&self) -> bool {
        self.light().is_some_and(|light| light.color_xy().is_some())
    }
}

/// Last known state of a group. Groups report aggregate power and dim only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Group {
    #[serde(rename = "9003")]
    pub(crate) id: u32,
    #[serde(rename = "9001", default)]
    pub(crate) name: String,
    #[serde(rename = "5850", default)]
    pub(crate) power: u8,
    #[serde(rename = "5851", default)]
    pub(crate) dim: u8,
}

impl Group {
    pub fn new(id: u32, name: &str, power: u8, dim: u8) -> Self {
        Group {
            id,
            name: name.to_string(),
            power,
            dim,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn fixture(&self) -> FixtureId {
        FixtureId::group(self.id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn power(&self) -> u8 {
        self.power
    }

    pub fn dim(&self) -> u8 {
        self.dim
    }

    pub fn brightness(&self) -> Brightness {
        Brightness::from_dim(self.dim)
    }

    pub fn emitting(&self) -> bool {
        self.power != 0 && dim_to_percentage(self.dim) > 0
    }

    pub fn power_mode(&self) -> PowerMode {
        PowerMode::from_emitting(self.emitting())
    }
}

/// Whether a device's state moved in a way worth acknowledging.
///
/// Compares normalized power, dim and mireds. Devices without a light channel
/// never change.
///
/// # Examples
///
/// ```
/// use tradfri_bridge::{Device, LightState, changed};
///
/// let bright = Device::new(65537, "lamp").with_light(LightState::new(true).with_dim(127));
/// let faded = Device::new(65537, "lamp").with_light(LightState::new(true).with_dim(25));
/// assert!(changed(&bright, &faded));
/// assert!(!changed(&bright, &bright.clone()));
/// ```
pub fn changed(prior: &Device, current: &Device) -> bool {
    match (prior.light(), current.light()) {
        (Some(before), Some(after)) => !before.same_as(after),
        _ => false,
    }
}
