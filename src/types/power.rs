//! Power mode for light control.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Power state for a light, as spoken on the bus.
///
/// # Examples
///
/// ```
/// use tradfri_bridge::PowerMode;
///
/// assert_eq!("on".parse::<PowerMode>().unwrap(), PowerMode::On);
/// assert_eq!(PowerMode::Off.to_string(), "off");
/// assert!("toggle".parse::<PowerMode>().is_err());
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PowerMode {
    /// Turn the light on
    On,
    /// Turn the light off
    Off,
}

impl PowerMode {
    pub fn from_emitting(emitting: bool) -> Self {
        if emitting { PowerMode::On } else { PowerMode::Off }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, PowerMode::On)
    }
}
