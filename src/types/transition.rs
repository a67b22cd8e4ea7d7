//! Fade duration for light changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long a change takes to fade in.
///
/// The gateway counts in ticks of a tenth of a second. A zero transition is
/// instantaneous, not invalid.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub(crate) millis: u32,
}

impl Default for Transition {
    fn default() -> Self {
        Transition::new()
    }
}

impl Transition {
    const MILLIS_PER_TICK: u32 = 100;
    const DEFAULT_MILLIS: u32 = 500;

    /// Create the default transition (500ms).
    ///
    /// # Examples
    ///
    /// ```
    /// use tradfri_bridge::Transition;
    ///
    /// assert_eq!(Transition::new().ticks(), 5);
    /// ```
    pub fn new() -> Self {
        Transition {
            millis: Self::DEFAULT_MILLIS,
        }
    }

    pub fn from_millis(millis: u32) -> Self {
        Transition { millis }
    }

    /// Clamps negative durations to zero.
    pub fn saturating(millis: i64) -> Self {
        Transition {
            millis: millis.clamp(0, i64::from(u32::MAX)) as u32,
        }
    }

    pub fn from_ticks(ticks: u32) -> Self {
        Transition {
            millis: ticks.saturating_mul(Self::MILLIS_PER_TICK),
        }
    }

    pub fn millis(&self) -> u32 {
        self.millis
    }

    pub fn ticks(&self) -> u32 {
        self.millis / Self::MILLIS_PER_TICK
    }

    pub fn is_instant(&self) -> bool {
        self.ticks() == 0
    }
}

impl From<Duration> for Transition {
    fn from(duration: Duration) -> Self {
        Transition::saturating(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
    }
}
