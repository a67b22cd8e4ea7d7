//! Value types for light control parameters and their gateway units.

mod brightness;
mod color;
mod kelvin;
mod power;
mod transition;

pub use brightness::{Brightness, MAX_DIM, dim_to_percentage, percentage_to_dim};
pub use color::{Chromaticity, Color};
pub use kelvin::{Kelvin, Mired, kelvin_to_mired, mired_to_kelvin};
pub use power::PowerMode;
pub use transition::Transition;
