//! Bridge configuration.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};

use crate::errors::Error;
use crate::types::Transition;

type Result<T> = std::result::Result<T, Error>;

/// Where the gateway lives and how to authenticate. Handed to whichever
/// client gets built; the engine never reads it.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub host: String,
    /// Security code printed on the gateway, needed until a session key has
    /// been cached.
    #[serde(default)]
    pub key: Option<String>,
}

/// Configuration of the bridge.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tradfri_bridge::BridgeConfig;
///
/// let config: BridgeConfig = r#"{"gateway": {"host": "10.0.0.5"}}"#.parse().unwrap();
/// assert_eq!(config.namespace, "tradfri");
/// assert_eq!(config.poll_interval, Duration::from_secs(300));
/// ```
#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub gateway: GatewayConfig,
    /// Protocol namespace used for bus addresses and source names.
    #[serde(default = "BridgeConfig::default_namespace")]
    pub namespace: String,
    /// Time between automatic reconciliation passes, in seconds.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "BridgeConfig::default_poll_interval")]
    pub poll_interval: Duration,
    /// Fade used when a command carries no duration, in milliseconds.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "BridgeConfig::default_transition")]
    pub default_transition: Duration,
}

impl BridgeConfig {
    pub const DEFAULT_NAMESPACE: &'static str = "tradfri";
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);
    pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(500);

    pub fn new(host: &str) -> Self {
        BridgeConfig {
            gateway: GatewayConfig {
                host: host.to_string(),
                key: None,
            },
            namespace: Self::default_namespace(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            default_transition: Self::DEFAULT_TRANSITION,
        }
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| Error::ConfigRead {
            path: path.display().to_string(),
            err,
        })?;
        raw.parse()
    }

    pub fn transition(&self) -> Transition {
        Transition::from(self.default_transition)
    }

    fn default_namespace() -> String {
        Self::DEFAULT_NAMESPACE.to_string()
    }

    fn default_poll_interval() -> Duration {
        Self::DEFAULT_POLL_INTERVAL
    }

    fn default_transition() -> Duration {
        Self::DEFAULT_TRANSITION
    }
}

impl FromStr for BridgeConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(Error::JsonLoad)
    }
}
