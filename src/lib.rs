//! # tradfri_bridge
//!
//! Command translation and state reconciliation between a home-automation
//! bus and a Tradfri lighting gateway.
//!
//! The bridge takes abstract intents from the bus ("turn the kitchen on, 40%,
//! warm white"), turns them into the gateway's native attributes, applies
//! them and acknowledges the state read back from the hardware. A periodic
//! reconciliation pass announces new fixtures and acknowledges changes made
//! outside the bus, e.g. with a physical remote.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tradfri_bridge::{BridgeConfig, Bus, CommandMessage, Engine, Error, Gateway};
//!
//! async fn serve(gateway: impl Gateway + 'static, bus: impl Bus + 'static) -> Result<(), Error> {
//!     let config = BridgeConfig::from_file("bridge.json")?;
//!     let (mut handle, task) = Engine::new(gateway, bus, config).spawn();
//!
//!     let mut msg = CommandMessage::new("light.kitchen", "on");
//!     msg.level = Some(40);
//!     msg.temp = Some(2700);
//!     handle.command(msg).await?;
//!
//!     println!("{}", handle.query("discover").await?);
//!     drop(handle);
//!     task.await
//! }
//! ```
//!
//! ## Features
//!
//! - **Translation**: [`translate`] builds a sparse [`Payload`] from a [`LightCommand`]
//! - **Units**: [`Brightness`], [`Kelvin`], [`Mired`], [`Chromaticity`] and [`Transition`]
//!   convert between bus and gateway units
//! - **Addressing**: [`FixtureId`] distinguishes devices from groups
//! - **Change detection**: [`changed`] compares snapshots, absorbing the dim-to-zero quirk
//! - **Reconciliation**: [`reconcile`] keeps the [`Inventory`] in step with the gateway
//! - **Engine**: [`Engine`] serializes commands, polls and queries on one task
//!
//! The gateway client and the bus are supplied by the caller through the
//! [`Gateway`] and [`Bus`] traits.
//!
//! ## Runtime Selection
//!
//! This library is runtime-agnostic. Select your preferred runtime using feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! tradfri-bridge = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! tradfri-bridge = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! tradfri-bridge = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

mod bus;
mod command;
mod config;
mod engine;
mod errors;
mod fixture;
mod gateway;
#[cfg(test)]
mod mock;
mod payload;
mod reconcile;
pub mod runtime;
mod status;
mod types;

// Re-export public API
pub use bus::{Acknowledgement, Announcement, Bus, BusEvent};
pub use command::{CommandMessage, LightCommand, translate};
pub use config::{BridgeConfig, GatewayConfig};
pub use engine::{Engine, EngineHandle, Request, channel};
pub use errors::Error;
pub use fixture::FixtureId;
pub use gateway::Gateway;
pub use payload::Payload;
pub use reconcile::{Inventory, reconcile};
pub use status::{Device, Group, LightState, changed};
pub use types::{
    Brightness, Chromaticity, Color, Kelvin, MAX_DIM, Mired, PowerMode, Transition,
    dim_to_percentage, kelvin_to_mired, mired_to_kelvin, percentage_to_dim,
};
