//! Fixture identifiers and bus-facing source names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// A gateway fixture: numeric gateway ID plus a group flag in bit 31.
///
/// The gateway never hands out IDs with the top bit set, so decoding is
/// unambiguous. Any integer decodes to some fixture; whether it exists is
/// settled by looking it up in the inventory.
///
/// # Examples
///
/// ```
/// use tradfri_bridge::FixtureId;
///
/// let group = FixtureId::encode(131073, true);
/// assert_eq!(group.decode(), (131073, true));
/// assert_eq!(group.to_string(), "G131073");
///
/// let device: FixtureId = "65537".parse().unwrap();
/// assert_eq!(device.decode(), (65537, false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixtureId(u32);

impl FixtureId {
    const GROUP_BIT: u32 = 1 << 31;
    const GROUP_PREFIX: char = 'G';

    pub fn encode(id: u32, group: bool) -> Self {
        let id = id & !Self::GROUP_BIT;
        if group {
            FixtureId(id | Self::GROUP_BIT)
        } else {
            FixtureId(id)
        }
    }

    pub fn decode(self) -> (u32, bool) {
        (self.id(), self.is_group())
    }

    pub fn from_raw(raw: u32) -> Self {
        FixtureId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn device(id: u32) -> Self {
        Self::encode(id, false)
    }

    pub fn group(id: u32) -> Self {
        Self::encode(id, true)
    }

    pub fn id(self) -> u32 {
        self.0 & !Self::GROUP_BIT
    }

    pub fn is_group(self) -> bool {
        self.0 & Self::GROUP_BIT != 0
    }

    /// Bus-facing source name, e.g. `tradfri.65537` or `tradfri.G131073`.
    pub fn source(self, namespace: &str) -> String {
        format!("{namespace}.{self}")
    }
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_group() {
            write!(f, "{}{}", Self::GROUP_PREFIX, self.id())
        } else {
            write!(f, "{}", self.id())
        }
    }
}

impl FromStr for FixtureId {
    type Err = Error;

    /// Parse a bus address: `"<n>"`, `"G<n>"`, or a raw integer carrying the
    /// group bit.
    fn from_str(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidAddress(s.to_string());
        match s.strip_prefix(Self::GROUP_PREFIX) {
            Some(rest) => rest
                .parse::<u32>()
                .ok()
                .filter(|id| id & Self::GROUP_BIT == 0)
                .map(FixtureId::group)
                .ok_or_else(invalid),
            None => s.parse::<u32>().map(FixtureId::from_raw).map_err(|_| invalid()),
        }
    }
}
