//! Inventory of known fixtures and periodic reconciliation against the
//! gateway.

use std::collections::HashMap;

use log::{debug, info};

use crate::bus::{Acknowledgement, Announcement, Bus, BusEvent};
use crate::errors::Error;
use crate::gateway::Gateway;
use crate::status::{Device, Group, changed};

type Result<T> = std::result::Result<T, Error>;

/// Last known snapshot of every device and group, keyed by gateway ID.
///
/// Snapshots are only ever replaced whole.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    devices: HashMap<u32, Device>,
    groups: HashMap<u32, Group>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(&self, id: u32) -> Option<&Device> {
        self.devices.get(&id)
    }

    pub fn group(&self, id: u32) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Replace one device's snapshot, e.g. after a read-back.
    pub fn store_device(&mut self, device: Device) {
        self.devices.insert(device.id(), device);
    }

    /// Replace one group's snapshot, e.g. after a read-back.
    pub fn store_group(&mut self, group: Group) {
        self.groups.insert(group.id(), group);
    }

    /// Swap in a full listing. Fixtures the gateway no longer reports are
    /// dropped.
    pub fn replace(&mut self, devices: Vec<Device>, groups: Vec<Group>) {
        self.devices = devices.into_iter().map(|d| (d.id(), d)).collect();
        self.groups = groups.into_iter().map(|g| (g.id(), g)).collect();
    }
}

/// Run one reconciliation pass and return `(devices, groups)` counts.
///
/// Both listings are fetched before anything is emitted or stored, so a
/// transport failure leaves the inventory untouched.
pub async fn reconcile<G, B>(
    gateway: &G,
    bus: &B,
    inventory: &mut Inventory,
    namespace: &str,
) -> Result<(usize, usize)>
where
    G: Gateway,
    B: Bus,
{
    let devices = gateway.list_devices().await?;
    let groups = gateway.list_groups().await?;

    for device in &devices {
        if let Some(prior) = inventory.device(device.id())
            && changed(prior, device)
            && let Some(ack) = Acknowledgement::from_device(namespace, device)
        {
            info!(
                "Device {} changed outside the bus: {} level {:?}",
                ack.source, ack.command, ack.level
            );
            bus.emit(BusEvent::Ack(ack));
        }

        let announcement = Announcement::device(namespace, device);
        debug!("Announcing device: {} {}", announcement.source, announcement.name);
        bus.emit(BusEvent::Announce(announcement));
    }

    for group in &groups {
        let announcement = Announcement::group(namespace, group);
        if bus.has_source(&announcement.source) {
            continue;
        }
        info!(
            "Announcing new group discovered: {} {}",
            announcement.source, announcement.name
        );
        bus.emit(BusEvent::Announce(announcement));
    }

    let counts = (devices.len(), groups.len());
    inventory.replace(devices, groups);
    info!("Discovered {} devices, {} groups", counts.0, counts.1);
    Ok(counts)
}
