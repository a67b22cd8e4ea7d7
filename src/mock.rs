//! In-memory gateway and bus for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::bus::{Acknowledgement, Bus, BusEvent};
use crate::errors::Error;
use crate::gateway::Gateway;
use crate::payload::Payload;
use crate::status::{Device, Group};

type Result<T> = std::result::Result<T, Error>;

/// A gateway that applies payloads to its own snapshots.
#[derive(Debug, Default)]
pub(crate) struct MockGateway {
    devices: Mutex<Vec<Device>>,
    groups: Mutex<Vec<Group>>,
    writes: Mutex<Vec<(String, u32, Payload)>>,
    fail_groups: bool,
    fail_writes: bool,
}

impl MockGateway {
    pub(crate) fn new(devices: Vec<Device>, groups: Vec<Group>) -> Self {
        MockGateway {
            devices: Mutex::new(devices),
            groups: Mutex::new(groups),
            ..Default::default()
        }
    }

    pub(crate) fn failing_groups(mut self) -> Self {
        self.fail_groups = true;
        self
    }

    pub(crate) fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Every write as `("device" | "group", id, payload)`.
    pub(crate) fn writes(&self) -> Vec<(String, u32, Payload)> {
        self.writes.lock().unwrap().clone()
    }

    /// Change a device behind the engine's back, like a remote would.
    pub(crate) fn replace_device(&self, device: Device) {
        let mut devices = self.devices.lock().unwrap();
        devices.retain(|d| d.id() != device.id());
        devices.push(device);
    }

    fn record(&self, kind: &str, id: u32, payload: &Payload) -> Result<()> {
        if self.fail_writes {
            return Err(Error::gateway("set", "connection reset"));
        }
        self.writes
            .lock()
            .unwrap()
            .push((kind.to_string(), id, payload.clone()));
        Ok(())
    }
}

impl Gateway for MockGateway {
    async fn list_devices(&self) -> Result<Vec<Device>> {
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        if self.fail_groups {
            return Err(Error::gateway("list groups", "timed out"));
        }
        Ok(self.groups.lock().unwrap().clone())
    }

    async fn set_device(&self, id: u32, payload: &Payload) -> Result<()> {
        self.record("device", id, payload)?;
        let mut devices = self.devices.lock().unwrap();
        let device = devices
            .iter_mut()
            .find(|d| d.id() == id)
            .ok_or_else(|| Error::gateway("set device", "not found"))?;
        if let Some(light) = device.light_control.first_mut() {
            if let Some(power) = payload.get_power() {
                light.power = power;
            }
            if let Some(dim) = payload.get_dim() {
                light.dim = Some(dim);
            }
            if let Some(mireds) = payload.get_mireds() {
                light.mireds = Some(mireds);
            }
            if let Some((x, y)) = payload.get_color_xy() {
                light.color_x = Some(x);
                light.color_y = Some(y);
            }
        }
        Ok(())
    }

    async fn set_group(&self, id: u32, payload: &Payload) -> Result<()> {
        self.record("group", id, payload)?;
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .iter_mut()
            .find(|g| g.id() == id)
            .ok_or_else(|| Error::gateway("set group", "not found"))?;
        if let Some(power) = payload.get_power() {
            group.power = u8::from(power);
        }
        if let Some(dim) = payload.get_dim() {
            group.dim = dim;
        }
        Ok(())
    }

    async fn get_device(&self, id: u32) -> Result<Device> {
        self.devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id() == id)
            .cloned()
            .ok_or_else(|| Error::gateway("get device", "not found"))
    }

    async fn get_group(&self, id: u32) -> Result<Group> {
        self.groups
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id() == id)
            .cloned()
            .ok_or_else(|| Error::gateway("get group", "not found"))
    }
}

/// A bus that records every event.
#[derive(Debug, Default)]
pub(crate) struct MockBus {
    addresses: HashMap<String, String>,
    sources: Vec<String>,
    events: Mutex<Vec<BusEvent>>,
}

impl MockBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_address(mut self, device: &str, address: &str) -> Self {
        self.addresses.insert(device.to_string(), address.to_string());
        self
    }

    pub(crate) fn with_source(mut self, source: &str) -> Self {
        self.sources.push(source.to_string());
        self
    }

    pub(crate) fn events(&self) -> Vec<BusEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn announcements(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BusEvent::Announce(a) => Some(a.source),
                BusEvent::Ack(_) => None,
            })
            .collect()
    }

    pub(crate) fn acks(&self) -> Vec<Acknowledgement> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BusEvent::Ack(a) => Some(a),
                BusEvent::Announce(_) => None,
            })
            .collect()
    }
}

impl Bus for MockBus {
    fn lookup_address(&self, device: &str, _namespace: &str) -> Option<String> {
        self.addresses.get(device).cloned()
    }

    fn has_source(&self, source: &str) -> bool {
        self.sources.iter().any(|s| s == source)
    }

    fn emit(&self, event: BusEvent) {
        self.events.lock().unwrap().push(event);
    }
}
