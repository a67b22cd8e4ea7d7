//! Inbound commands and their translation into gateway payloads.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::payload::Payload;
use crate::status::Device;
use crate::types::{Brightness, Chromaticity, Kelvin, PowerMode, Transition};

type Result<T> = std::result::Result<T, Error>;

/// A command event as delivered by the bus.
///
/// `device` is the bus-level name; the bus maps it to a gateway address.
/// Everything besides `command` is optional and arrives untyped.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CommandMessage {
    pub device: String,
    pub command: String,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub colour: Option<String>,
    #[serde(default)]
    pub temp: Option<i64>,
    #[serde(default)]
    pub duration: Option<i64>,
}

impl CommandMessage {
    pub fn new(device: &str, command: &str) -> Self {
        CommandMessage {
            device: device.to_string(),
            command: command.to_string(),
            ..Default::default()
        }
    }
}

/// A validated light command, consumed by [`translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightCommand {
    pub action: PowerMode,
    pub level: Option<Brightness>,
    pub colour: Option<String>,
    pub temp: Option<Kelvin>,
    pub duration: Option<Transition>,
}

impl LightCommand {
    pub fn new(action: PowerMode) -> Self {
        LightCommand {
            action,
            level: None,
            colour: None,
            temp: None,
            duration: None,
        }
    }

    /// Validate the action and clamp the numeric fields into range.
    pub fn from_message(msg: &CommandMessage) -> Result<Self> {
        let action = msg
            .command
            .parse::<PowerMode>()
            .map_err(|_| Error::UnknownCommand(msg.command.clone()))?;

        Ok(LightCommand {
            action,
            level: msg.level.map(Brightness::saturating),
            colour: msg.colour.clone(),
            temp: msg.temp.map(Kelvin::saturating),
            duration: msg.duration.map(Transition::saturating),
        })
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = Some(Brightness::saturating(i64::from(level)));
        self
    }

    pub fn colour(mut self, colour: &str) -> Self {
        self.colour = Some(colour.to_string());
        self
    }

    pub fn temp(mut self, kelvin: u16) -> Self {
        self.temp = Some(Kelvin::saturating(i64::from(kelvin)));
        self
    }

    pub fn duration(mut self, millis: u32) -> Self {
        self.duration = Some(Transition::from_millis(millis));
        self
    }
}

/// Highest level an "off" command may fade to. Fixed hardware policy.
const OFF_FADE_CEILING: Brightness = Brightness { value: 50 };

/// Build the gateway payload for a command.
///
/// `prior` is the last known state of the target device and is only used to
/// decide how color temperature is expressed; groups ignore it. A field is
/// only populated if the command means to change it.
///
/// # Examples
///
/// ```
/// use tradfri_bridge::{LightCommand, PowerMode, Transition, translate};
///
/// let off = LightCommand::new(PowerMode::Off);
/// let payload = translate(&off, false, None, Transition::new());
/// assert_eq!(payload.get_power(), Some(false));
/// assert_eq!(payload.get_dim(), None);
/// ```
pub fn translate(
    command: &LightCommand,
    target_is_group: bool,
    prior: Option<&Device>,
    default_transition: Transition,
) -> Payload {
    let mut payload = Payload::new();

    // Colour sets XY now; its implied dim is only a fallback for "on".
    let mut colour_dim = None;
    if let Some(colour) = &command.colour {
        match Chromaticity::from_hex(colour) {
            Ok(xy) => {
                payload.chromaticity(&xy);
                colour_dim = Some(xy.dim());
            }
            Err(e) => warn!("Dropping colour field: {}", e),
        }
    }

    let transition = command.duration.unwrap_or(default_transition);

    match command.action {
        PowerMode::On => {
            payload.power(true);
            if let Some(level) = &command.level {
                payload.brightness(level);
            } else if let Some(dim) = colour_dim {
                payload.dim(dim);
            }
        }
        PowerMode::Off => {
            // The hardware fades brightness, never power, so a timed off is a
            // fade towards zero that leaves the power flag alone.
            let fading = command
                .duration
                .is_some_and(|requested| requested.ticks() != default_transition.ticks());
            if fading {
                let target = command
                    .level
                    .map(|level| level.at_most(OFF_FADE_CEILING).to_dim())
                    .unwrap_or(0);
                payload.dim(target);
            } else {
                payload.power(false);
            }
        }
    }

    if let Some(temp) = &command.temp {
        match prior {
            Some(device)
                if !target_is_group
                    && !device.supports_direct_color_temperature()
                    && device.supports_color_xy() =>
            {
                match Chromaticity::from_kelvin(temp) {
                    Ok(xy) => {
                        payload.chromaticity(&xy);
                        if command.action.is_on() && command.level.is_none() {
                            payload.dim(xy.dim());
                        }
                    }
                    Err(e) => warn!("Dropping temp field: {}", e),
                }
            }
            Some(device)
                if !target_is_group && !device.supports_direct_color_temperature() =>
            {
                warn!(
                    "Dropping temp field: device {} has no color control",
                    device.id()
                );
            }
            _ => payload.mireds(&temp.to_mired()),
        }
    }

    payload.transition(&transition);
    debug!("Translated {:?} into {:?}", command, payload);
    payload
}
