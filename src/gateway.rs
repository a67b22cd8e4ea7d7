//! The gateway client as seen by the engine.
//!
//! Session setup, key exchange and request framing belong to the client;
//! the engine only lists fixtures, pushes payloads and reads state back.

use std::future::Future;

use crate::errors::Error;
use crate::payload::Payload;
use crate::status::{Device, Group};

type Result<T> = std::result::Result<T, Error>;

/// An already connected gateway client.
///
/// Every method may block on network I/O. Transport failures are reported as
/// [`Error::Gateway`].
pub trait Gateway: Send + Sync {
    /// List every device the gateway knows, lights and remotes alike.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>>> + Send;

    /// List every group.
    fn list_groups(&self) -> impl Future<Output = Result<Vec<Group>>> + Send;

    /// Apply a payload to one device.
    fn set_device(&self, id: u32, payload: &Payload) -> impl Future<Output = Result<()>> + Send;

    /// Apply a payload to every member of a group.
    fn set_group(&self, id: u32, payload: &Payload) -> impl Future<Output = Result<()>> + Send;

    /// Read one device's current state.
    fn get_device(&self, id: u32) -> impl Future<Output = Result<Device>> + Send;

    /// Read one group's current state.
    fn get_group(&self, id: u32) -> impl Future<Output = Result<Group>> + Send;
}
