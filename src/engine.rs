//! The engine: a single task that owns the inventory and handles commands,
//! reconciliation passes and queries one at a time.

use futures::channel::{mpsc, oneshot};
use futures::{FutureExt, SinkExt, StreamExt, pin_mut, select};
use log::{debug, info, warn};

use crate::bus::{self, Acknowledgement, Bus, BusEvent};
use crate::command::{CommandMessage, LightCommand, translate};
use crate::config::BridgeConfig;
use crate::errors::Error;
use crate::fixture::FixtureId;
use crate::gateway::Gateway;
use crate::payload::Payload;
use crate::reconcile::{Inventory, reconcile};
use crate::runtime::{self, Instant, JoinHandle};

type Result<T> = std::result::Result<T, Error>;

/// Capacity of the request channel built by [`Engine::spawn`].
const REQUEST_CHANNEL_SIZE: usize = 64;

const HELP: &str = "discover: run discovery\n";

/// Work handed to a running engine.
#[derive(Debug)]
pub enum Request {
    Command(CommandMessage),
    Reconcile,
    Query {
        name: String,
        reply: oneshot::Sender<Result<String>>,
    },
}

/// Bridges a bus to one gateway.
pub struct Engine<G, B> {
    gateway: G,
    bus: B,
    config: BridgeConfig,
    inventory: Inventory,
}

impl<G, B> Engine<G, B>
where
    G: Gateway,
    B: Bus,
{
    pub fn new(gateway: G, bus: B, config: BridgeConfig) -> Self {
        Engine {
            gateway,
            bus,
            config,
            inventory: Inventory::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Apply one bus command and acknowledge the state read back from the
    /// gateway.
    ///
    /// Commands for devices this gateway doesn't serve and unknown actions are
    /// dropped. Failing to write or read back is an error and nothing is
    /// acknowledged.
    pub async fn handle_command(&mut self, msg: &CommandMessage) -> Result<()> {
        let namespace = self.config.namespace.as_str();
        let Some(address) = bus::resolve(&self.bus, &msg.device, namespace) else {
            debug!("No {} address for {}, ignoring", namespace, msg.device);
            return Ok(());
        };

        let command = match LightCommand::from_message(msg) {
            Ok(command) => command,
            Err(e) => {
                warn!("Ignoring message for {}: {}", msg.device, e);
                return Ok(());
            }
        };

        let fixture: FixtureId = address.parse()?;
        let transition = self.config.transition();

        let ack = if fixture.is_group() {
            let payload = translate(&command, true, None, transition);
            self.write(fixture, &payload).await?;
            let group = self.gateway.get_group(fixture.id()).await?;
            let ack = Acknowledgement::from_group(namespace, &group);
            self.inventory.store_group(group);
            Some(ack)
        } else {
            let prior = self.inventory.device(fixture.id());
            let payload = translate(&command, false, prior, transition);
            self.write(fixture, &payload).await?;
            let device = self.gateway.get_device(fixture.id()).await?;
            let ack = Acknowledgement::from_device(namespace, &device);
            self.inventory.store_device(device);
            ack
        };

        if let Some(ack) = ack {
            debug!("Acknowledging {} for {}", ack.source, msg.device);
            self.bus.emit(BusEvent::Ack(ack.for_device(&msg.device)));
        }
        Ok(())
    }

    async fn write(&self, fixture: FixtureId, payload: &Payload) -> Result<()> {
        if !payload.is_valid() {
            return Err(Error::NoAttribute);
        }
        if fixture.is_group() {
            self.gateway.set_group(fixture.id(), payload).await
        } else {
            self.gateway.set_device(fixture.id(), payload).await
        }
    }

    /// Run a reconciliation pass and return `(devices, groups)` counts.
    pub async fn reconcile(&mut self) -> Result<(usize, usize)> {
        reconcile(
            &self.gateway,
            &self.bus,
            &mut self.inventory,
            &self.config.namespace,
        )
        .await
    }

    /// Answer an operator query.
    pub async fn query(&mut self, name: &str) -> Result<String> {
        match name {
            "discover" => {
                let (devices, groups) = self.reconcile().await?;
                Ok(format!("Discovered {devices} devices, {groups} groups"))
            }
            "help" => Ok(HELP.to_string()),
            _ => Err(Error::UnknownQuery(name.to_string())),
        }
    }

    /// Reconcile once, then serve requests and poll every
    /// `poll_interval` until every [`EngineHandle`] is dropped.
    ///
    /// A failed reconciliation stops the loop with its error; a failed command
    /// is logged and skipped.
    pub async fn run(&mut self, mut requests: mpsc::Receiver<Request>) -> Result<()> {
        self.reconcile().await?;
        let mut last_pass = Instant::now();

        loop {
            let wait = self.config.poll_interval.saturating_sub(last_pass.elapsed());
            let timer = runtime::sleep(wait).fuse();
            pin_mut!(timer);

            select! {
                _ = timer => {
                    self.reconcile().await?;
                    last_pass = Instant::now();
                }
                request = requests.next() => match request {
                    Some(Request::Command(msg)) => {
                        if let Err(e) = self.handle_command(&msg).await {
                            warn!("Command {} for {} failed: {}", msg.command, msg.device, e);
                        }
                    }
                    Some(Request::Reconcile) => {
                        self.reconcile().await?;
                        last_pass = Instant::now();
                    }
                    Some(Request::Query { name, reply }) => match self.query(&name).await {
                        // Only a reconciliation can fail here besides an
                        // unknown name, and that ends the engine.
                        Err(e) if !matches!(e, Error::UnknownQuery(_)) => return Err(e),
                        answer => {
                            if name == "discover" {
                                last_pass = Instant::now();
                            }
                            if reply.send(answer).is_err() {
                                debug!("Query {} abandoned by its caller", name);
                            }
                        }
                    },
                    None => {
                        info!("All engine handles dropped, stopping");
                        return Ok(());
                    }
                },
            }
        }
    }
}

impl<G, B> Engine<G, B>
where
    G: Gateway + 'static,
    B: Bus + 'static,
{
    /// Run the engine as a background task.
    pub fn spawn(mut self) -> (EngineHandle, JoinHandle<Result<()>>) {
        let (handle, requests) = channel(REQUEST_CHANNEL_SIZE);
        let task = runtime::spawn(async move { self.run(requests).await });
        (handle, task)
    }
}

/// Create a request channel for [`Engine::run`].
pub fn channel(buffer: usize) -> (EngineHandle, mpsc::Receiver<Request>) {
    let (requests, receiver) = mpsc::channel(buffer);
    (EngineHandle { requests }, receiver)
}

/// Sending side of a running engine. Fails with [`Error::Closed`] once the
/// engine has stopped.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    requests: mpsc::Sender<Request>,
}

impl EngineHandle {
    /// Queue a bus command.
    pub async fn command(&mut self, msg: CommandMessage) -> Result<()> {
        self.send(Request::Command(msg)).await
    }

    /// Queue an on-demand reconciliation pass.
    pub async fn reconcile(&mut self) -> Result<()> {
        self.send(Request::Reconcile).await
    }

    /// Run a query and wait for its answer.
    pub async fn query(&mut self, name: &str) -> Result<String> {
        let (reply, answer) = oneshot::channel();
        self.send(Request::Query {
            name: name.to_string(),
            reply,
        })
        .await?;
        answer.await.map_err(|_| Error::Closed)?
    }

    async fn send(&mut self, request: Request) -> Result<()> {
        self.requests.send(request).await.map_err(|_| Error::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBus, MockGateway};
    use crate::status::{Device, Group, LightState};
    use crate::types::{PowerMode, Transition, percentage_to_dim};

    fn white_spectrum(id: u32) -> Device {
        Device::new(id, "ceiling").with_light(LightState::new(false).with_dim(0).with_mireds(370))
    }

    fn colour_bulb(id: u32) -> Device {
        let light = LightState::new(true).with_dim(254).with_color_xy(30015, 26870);
        Device::new(id, "strip").with_light(light)
    }

    fn engine(gateway: MockGateway, bus: MockBus) -> Engine<MockGateway, MockBus> {
        Engine::new(gateway, bus, BridgeConfig::new("10.0.0.5"))
    }

    #[tokio::test]
    async fn test_on_with_level_and_colour() {
        let gateway = MockGateway::new(vec![white_spectrum(65537)], vec![]);
        let bus = MockBus::new().with_address("light.ceiling", "65537");
        let mut engine = engine(gateway, bus);

        let mut msg = CommandMessage::new("light.ceiling", "on");
        msg.level = Some(40);
        msg.colour = Some("#ff0000".to_string());
        msg.duration = Some(0);
        engine.handle_command(&msg).await.unwrap();

        let writes = engine.gateway.writes();
        assert_eq!(writes.len(), 1);
        let (kind, id, payload) = &writes[0];
        assert_eq!((kind.as_str(), *id), ("device", 65537));
        assert_eq!(payload.get_power(), Some(true));
        assert_eq!(payload.get_dim(), Some(percentage_to_dim(40)));
        assert!(payload.get_color_xy().is_some());
        assert_eq!(payload.get_transition(), Some(Transition::from_millis(0)));

        let acks = engine.bus.acks();
        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].device.as_deref(), Some("light.ceiling"));
        assert_eq!(acks[0].source, "tradfri.65537");
        assert_eq!(acks[0].command, PowerMode::On);
        assert_eq!(acks[0].level, Some(40));
    }

    #[tokio::test]
    async fn test_read_back_replaces_snapshot() {
        let gateway = MockGateway::new(vec![white_spectrum(65537)], vec![]);
        let bus = MockBus::new().with_address("light.ceiling", "65537");
        let mut engine = engine(gateway, bus);
        engine.reconcile().await.unwrap();

        let mut msg = CommandMessage::new("light.ceiling", "on");
        msg.level = Some(100);
        engine.handle_command(&msg).await.unwrap();

        let light = engine.inventory().device(65537).unwrap().light().unwrap();
        assert!(light.emitting());
        assert_eq!(light.dim(), Some(254));
    }

    #[tokio::test]
    async fn test_temp_on_colour_only_bulb_uses_xy() {
        let gateway = MockGateway::new(vec![colour_bulb(65538)], vec![]);
        let bus = MockBus::new().with_address("light.strip", "65538");
        let mut engine = engine(gateway, bus);
        engine.reconcile().await.unwrap();

        let mut msg = CommandMessage::new("light.strip", "on");
        msg.temp = Some(2700);
        engine.handle_command(&msg).await.unwrap();

        let (_, _, payload) = &engine.gateway.writes()[0];
        assert_eq!(payload.get_mireds(), None);
        assert!(payload.get_color_xy().is_some());
        assert!(payload.get_dim().is_some());
    }

    #[tokio::test]
    async fn test_remote_change_after_command_is_acknowledged() {
        let gateway = MockGateway::new(vec![white_spectrum(65537)], vec![]);
        let bus = MockBus::new().with_address("light.ceiling", "65537");
        let mut engine = engine(gateway, bus);
        engine.reconcile().await.unwrap();

        let mut msg = CommandMessage::new("light.ceiling", "on");
        msg.level = Some(80);
        engine.handle_command(&msg).await.unwrap();

        let switched_off = LightState::new(false).with_dim(203).with_mireds(370);
        engine
            .gateway
            .replace_device(Device::new(65537, "ceiling").with_light(switched_off));
        engine.reconcile().await.unwrap();

        let acks = engine.bus.acks();
        assert_eq!(acks.len(), 2);
        assert_eq!(acks[1].device, None);
        assert_eq!(acks[1].command, PowerMode::Off);
    }

    #[tokio::test]
    async fn test_group_command() {
        let gateway = MockGateway::new(vec![], vec![Group::new(131073, "Kitchen", 1, 254)]);
        let bus = MockBus::new().with_address("light.kitchen", "G131073");
        let mut engine = engine(gateway, bus);

        engine
            .handle_command(&CommandMessage::new("light.kitchen", "off"))
            .await
            .unwrap();

        let (kind, id, payload) = &engine.gateway.writes()[0];
        assert_eq!((kind.as_str(), *id), ("group", 131073));
        assert_eq!(payload.get_power(), Some(false));

        let acks = engine.bus.acks();
        assert_eq!(acks[0].source, "tradfri.G131073");
        assert_eq!(acks[0].command, PowerMode::Off);
        assert_eq!(engine.inventory().group(131073).unwrap().power(), 0);
    }

    #[tokio::test]
    async fn test_unmapped_device_is_ignored() {
        let gateway = MockGateway::new(vec![white_spectrum(65537)], vec![]);
        let bus = MockBus::new().with_address("light.other", "");
        let mut engine = engine(gateway, bus);

        for device in ["light.other", "light.unknown"] {
            engine
                .handle_command(&CommandMessage::new(device, "on"))
                .await
                .unwrap();
        }

        assert!(engine.gateway.writes().is_empty());
        assert!(engine.bus.events().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_action_is_dropped() {
        let gateway = MockGateway::new(vec![white_spectrum(65537)], vec![]);
        let bus = MockBus::new().with_address("light.ceiling", "65537");
        let mut engine = engine(gateway, bus);

        engine
            .handle_command(&CommandMessage::new("light.ceiling", "toggle"))
            .await
            .unwrap();

        assert!(engine.gateway.writes().is_empty());
        assert!(engine.bus.acks().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_is_reported_without_ack() {
        let gateway = MockGateway::new(vec![white_spectrum(65537)], vec![]).failing_writes();
        let bus = MockBus::new().with_address("light.ceiling", "65537");
        let mut engine = engine(gateway, bus);

        let err = engine
            .handle_command(&CommandMessage::new("light.ceiling", "on"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Gateway { .. }));
        assert!(engine.bus.acks().is_empty());
    }

    #[tokio::test]
    async fn test_empty_payload_is_not_written() {
        let gateway = MockGateway::new(vec![white_spectrum(65537)], vec![]);
        let engine = engine(gateway, MockBus::new());

        let mut payload = Payload::new();
        payload.transition(&Transition::new());
        for fixture in [FixtureId::device(65537), FixtureId::group(131073)] {
            assert_eq!(
                engine.write(fixture, &payload).await.unwrap_err(),
                Error::NoAttribute
            );
        }
        assert!(engine.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn test_bad_address() {
        let gateway = MockGateway::new(vec![], vec![]);
        let bus = MockBus::new().with_address("light.ceiling", "lamp-1");
        let mut engine = engine(gateway, bus);

        let err = engine
            .handle_command(&CommandMessage::new("light.ceiling", "on"))
            .await
            .unwrap_err();
        assert_eq!(err, Error::InvalidAddress("lamp-1".to_string()));
    }

    #[tokio::test]
    async fn test_queries() {
        let gateway = MockGateway::new(
            vec![white_spectrum(65537), colour_bulb(65538)],
            vec![Group::new(131073, "Kitchen", 1, 254)],
        );
        let mut engine = engine(gateway, MockBus::new());

        assert_eq!(
            engine.query("discover").await.unwrap(),
            "Discovered 2 devices, 1 groups"
        );
        assert_eq!(engine.query("help").await.unwrap(), "discover: run discovery\n");
        assert_eq!(
            engine.query("reboot").await.unwrap_err(),
            Error::UnknownQuery("reboot".to_string())
        );
    }

    #[tokio::test]
    async fn test_run_serves_requests_until_handles_drop() {
        let gateway = MockGateway::new(vec![white_spectrum(65537)], vec![]);
        let bus = MockBus::new().with_address("light.ceiling", "65537");
        let mut engine = engine(gateway, bus);
        let (mut handle, requests) = channel(8);

        let client = async move {
            handle
                .command(CommandMessage::new("light.ceiling", "on"))
                .await
                .unwrap();
            handle
                .command(CommandMessage::new("light.ceiling", "dance"))
                .await
                .unwrap();
            handle.reconcile().await.unwrap();
            handle.query("help").await.unwrap()
        };
        let (result, help) = futures::join!(engine.run(requests), client);

        assert!(result.is_ok());
        assert_eq!(help, HELP);
        assert_eq!(engine.gateway.writes().len(), 1);
        assert_eq!(engine.bus.acks().len(), 1);
        // Initial pass plus the requested one.
        assert_eq!(engine.bus.announcements().len(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_failed_reconcile() {
        let gateway = MockGateway::new(vec![], vec![]).failing_groups();
        let mut engine = engine(gateway, MockBus::new());
        let (_handle, requests) = channel(8);

        let err = engine.run(requests).await.unwrap_err();
        assert!(matches!(err, Error::Gateway { .. }));
    }

    #[tokio::test]
    async fn test_handle_fails_once_engine_is_gone() {
        let (mut handle, requests) = channel(8);
        drop(requests);
        assert_eq!(handle.reconcile().await.unwrap_err(), Error::Closed);
        assert_eq!(handle.query("help").await.unwrap_err(), Error::Closed);
    }

    #[tokio::test]
    async fn test_spawned_engine() {
        let gateway = MockGateway::new(vec![white_spectrum(65537)], vec![]);
        let (mut handle, task) = engine(gateway, MockBus::new()).spawn();

        assert_eq!(
            handle.query("discover").await.unwrap(),
            "Discovered 1 devices, 0 groups"
        );
        drop(handle);
        assert!(task.await.is_ok());
    }
}
