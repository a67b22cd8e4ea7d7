//! The home-automation bus as seen by the engine, and the events the engine
//! publishes on it.

use serde::{Deserialize, Serialize};

use crate::status::{Device, Group};
use crate::types::PowerMode;

/// A newly seen fixture, announced so the bus can map it to a device.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub source: String,
    pub name: String,
}

impl Announcement {
    pub fn device(namespace: &str, device: &Device) -> Self {
        Announcement {
            source: device.fixture().source(namespace),
            name: device.name().to_string(),
        }
    }

    pub fn group(namespace: &str, group: &Group) -> Self {
        Announcement {
            source: group.fixture().source(namespace),
            name: group.name().to_string(),
        }
    }
}

/// The physical state of a fixture after a change.
///
/// Attributes are present only when the snapshot carries them.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    /// Bus device that issued the command; unset for unsolicited acks.
    pub device: Option<String>,
    pub source: String,
    pub command: PowerMode,
    pub level: Option<u8>,
    pub temp: Option<u16>,
    #[serde(rename = "colorX")]
    pub color_x: Option<u16>,
    #[serde(rename = "colorY")]
    pub color_y: Option<u16>,
    pub hue: Option<u16>,
    pub sat: Option<u16>,
}

impl Acknowledgement {
    /// Acknowledge a device's state. Devices with no light channel have
    /// nothing to acknowledge.
    pub fn from_device(namespace: &str, device: &Device) -> Option<Self> {
        let light = device.light()?;
        let (color_x, color_y) = light.color_xy().unzip();
        Some(Acknowledgement {
            device: None,
            source: device.fixture().source(namespace),
            command: PowerMode::from_emitting(light.emitting()),
            level: light.brightness().map(|b| b.value()),
            temp: light.temp().map(|k| k.kelvin()),
            color_x,
            color_y,
            hue: light.hue(),
            sat: light.saturation(),
        })
    }

    pub fn from_group(namespace: &str, group: &Group) -> Self {
        Acknowledgement {
            device: None,
            source: group.fixture().source(namespace),
            command: group.power_mode(),
            level: Some(group.brightness().value()),
            temp: None,
            color_x: None,
            color_y: None,
            hue: None,
            sat: None,
        }
    }

    pub fn for_device(mut self, device: &str) -> Self {
        self.device = Some(device.to_string());
        self
    }
}

/// An outbound bus event.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "topic", rename_all = "lowercase")]
pub enum BusEvent {
    Announce(Announcement),
    Ack(Acknowledgement),
}

impl BusEvent {
    pub fn source(&self) -> &str {
        match self {
            BusEvent::Announce(a) => &a.source,
            BusEvent::Ack(a) => &a.source,
        }
    }
}

/// The message bus.
///
/// Delivery, topic filtering and serialization are the bus's business; the
/// engine only resolves addresses, checks for known sources and emits.
pub trait Bus: Send + Sync {
    /// Gateway address configured for a bus device under `namespace`, if any.
    fn lookup_address(&self, device: &str, namespace: &str) -> Option<String>;

    /// Whether the bus already has a device bound to this source.
    fn has_source(&self, source: &str) -> bool;

    /// Publish an event. The bus deduplicates announcements by source.
    fn emit(&self, event: BusEvent);
}

/// Address of a fixture, resolved through the bus.
pub(crate) fn resolve(bus: &impl Bus, device: &str, namespace: &str) -> Option<String> {
    bus.lookup_address(device, namespace)
        .filter(|address| !address.is_empty())
}
