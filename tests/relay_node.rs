//! Relay-node service integration tests against the simulation
//! adapters: command decode and actuation, unknown-command handling,
//! subscription lifecycle, and the silent reconnect policy.

#![cfg(not(feature = "espidf"))]

use gatenode::adapters::gpio::SimPin;
use gatenode::adapters::mqtt::MqttAdapter;
use gatenode::adapters::time::SimDelay;
use gatenode::adapters::wifi::WifiAdapter;
use gatenode::app::TickAction;
use gatenode::app::events::NodeEvent;
use gatenode::app::ports::EventSink;
use gatenode::app::relay::RelayService;
use gatenode::config::{RelayNodeConfig, WifiProfile};
use gatenode::drivers::relay::RelayDriver;

struct RecSink(Vec<NodeEvent>);

impl EventSink for RecSink {
    fn emit(&mut self, event: &NodeEvent) {
        self.0.push(event.clone());
    }
}

fn fast_cfg() -> RelayNodeConfig {
    let mut cfg = RelayNodeConfig::default();
    cfg.link
        .profiles
        .push(WifiProfile::new("lab", "hunter22").unwrap())
        .unwrap();
    cfg.link.poll_interval_ms = 100;
    cfg.link.polls_per_profile = 3;
    cfg.broker.retry_delay_ms = 100;
    cfg
}

struct Rig {
    net: WifiAdapter,
    bus: MqttAdapter,
    relay: RelayDriver<SimPin, SimDelay>,
    sink: RecSink,
    service: RelayService,
}

impl Rig {
    fn new(cfg: RelayNodeConfig) -> Self {
        let mut net = WifiAdapter::new();
        net.sim_plan("lab", Some(0));
        Self {
            net,
            bus: MqttAdapter::new(),
            relay: RelayDriver::new(SimPin::new(), SimDelay::new()).unwrap(),
            sink: RecSink(Vec::new()),
            service: RelayService::new(cfg, 0xFEED_F00D),
        }
    }

    fn tick(&mut self) -> TickAction {
        self.service
            .tick(&mut self.net, &mut self.bus, &mut self.relay, &mut self.sink)
    }

    fn run(&mut self, ticks: u32) {
        for _ in 0..ticks {
            assert_eq!(self.tick(), TickAction::Continue);
        }
    }
}

#[test]
fn subscribes_to_command_topic_after_connect() {
    let mut rig = Rig::new(fast_cfg());
    rig.run(3);
    assert_eq!(rig.bus.subscriptions, vec!["RFID_LOGIN"]);
}

#[test]
fn on_command_engages_relay_active_low() {
    let mut rig = Rig::new(fast_cfg());
    rig.run(3);

    rig.bus.sim_deliver("RFID_LOGIN", b"1");
    rig.run(1);

    assert!(rig.relay.is_engaged());
    assert!(rig.sink.0.contains(&NodeEvent::RelayEngaged));
    let (pin, _) = rig.relay.free();
    assert!(pin.is_low(), "engaged relay line sits LOW");
}

#[test]
fn off_command_releases_relay() {
    let mut rig = Rig::new(fast_cfg());
    rig.run(3);

    rig.bus.sim_deliver("RFID_LOGIN", b"1");
    rig.run(1);
    rig.bus.sim_deliver("RFID_LOGIN", b"0");
    rig.run(1);

    assert!(!rig.relay.is_engaged());
    assert!(rig.sink.0.contains(&NodeEvent::RelayReleased));
    let (pin, _) = rig.relay.free();
    assert!(!pin.is_low(), "released relay line sits HIGH");
}

#[test]
fn unknown_commands_never_actuate() {
    let mut rig = Rig::new(fast_cfg());
    rig.run(3);

    for payload in [&b"ON"[..], b"01", b"", b"10", b"true"] {
        rig.bus.sim_deliver("RFID_LOGIN", payload);
    }
    rig.run(2);

    assert!(!rig.relay.is_engaged());
    let ignored = rig
        .sink
        .0
        .iter()
        .filter(|e| matches!(e, NodeEvent::CommandIgnored { .. }))
        .count();
    assert_eq!(ignored, 5);
    assert!(!rig.sink.0.contains(&NodeEvent::RelayEngaged));
    let (pin, _) = rig.relay.free();
    assert_eq!(pin.history().len(), 1, "only the power-on release write");
}

#[test]
fn multiple_queued_commands_serviced_in_one_tick() {
    let mut rig = Rig::new(fast_cfg());
    rig.run(3);

    rig.bus.sim_deliver("RFID_LOGIN", b"1");
    rig.bus.sim_deliver("RFID_LOGIN", b"0");
    rig.run(1);

    assert!(!rig.relay.is_engaged());
    assert!(rig.sink.0.contains(&NodeEvent::RelayEngaged));
    assert!(rig.sink.0.contains(&NodeEvent::RelayReleased));
}

#[test]
fn reconnect_resubscribes_after_broker_drop() {
    let mut rig = Rig::new(fast_cfg());
    rig.run(3);
    assert_eq!(rig.bus.subscriptions.len(), 1);

    rig.bus.sim_drop_session();
    rig.run(5);

    assert_eq!(rig.bus.subscriptions.len(), 2, "subscription restored on reconnect");
}

#[test]
fn exhaustion_is_silent_and_never_restarts() {
    let mut rig = Rig::new(fast_cfg());
    rig.bus.sim_fail_connects(u32::MAX);

    for _ in 0..60 {
        assert_eq!(rig.tick(), TickAction::Continue);
    }
    let budget = u32::from(fast_cfg().broker.max_connect_attempts);
    assert!(
        rig.bus.connect_ids.len() as u32 > budget,
        "keeps retrying after the budget resets"
    );
}

#[test]
fn randomized_client_ids_rotate_per_attempt() {
    let mut rig = Rig::new(fast_cfg());
    rig.bus.sim_fail_connects(3);
    rig.run(10);

    assert!(rig.bus.connect_ids.len() >= 3);
    for id in &rig.bus.connect_ids {
        assert!(id.starts_with("gatenode-relay-"));
    }
    assert_ne!(rig.bus.connect_ids[0], rig.bus.connect_ids[1]);
    assert_ne!(rig.bus.connect_ids[1], rig.bus.connect_ids[2]);
}
