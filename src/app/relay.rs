//! Relay-actuator node service.
//!
//! Listens on the command topic and drives the door-strike relay.
//! Command payloads are exact single bytes: `1` engages (door open),
//! `0` releases (door locked). Anything else is logged and ignored with
//! no actuation.
//!
//! Actuation is synchronous inside the tick: one pulse sequence holds
//! the loop for ~350 ms, which is acceptable at this command rate and
//! keeps the relay line glitch-free.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::TickAction;
use crate::app::events::NodeEvent;
use crate::app::ports::{EventSink, MessageBusSession, NetworkLink};
use crate::config::RelayNodeConfig;
use crate::drivers::relay::RelayDriver;
use crate::net::link::LinkManager;
use crate::net::session::{SessionManager, SessionStatus};
use crate::protocol::RelayCommand;

pub struct RelayService {
    link: LinkManager,
    session: SessionManager,
}

impl RelayService {
    pub fn new(cfg: RelayNodeConfig, seed: u32) -> Self {
        let tick_ms = cfg.tick_interval_ms;
        Self {
            link: LinkManager::new(cfg.link, tick_ms),
            session: SessionManager::new(cfg.broker, tick_ms, seed),
        }
    }

    /// Advance the link and session machines, then service every queued
    /// inbound command.
    pub fn tick<P: OutputPin, D: DelayNs>(
        &mut self,
        net: &mut impl NetworkLink,
        bus: &mut impl MessageBusSession,
        relay: &mut RelayDriver<P, D>,
        sink: &mut impl EventSink,
    ) -> TickAction {
        self.link.step(net, sink);
        if !self.link.is_up() {
            return TickAction::Continue;
        }

        if self.session.step(bus, sink) == SessionStatus::RestartRequired {
            return TickAction::Restart;
        }

        while let Some(msg) = bus.poll() {
            match RelayCommand::decode(&msg.payload) {
                RelayCommand::On => {
                    sink.emit(&NodeEvent::CommandAccepted {
                        command: RelayCommand::On,
                    });
                    match relay.activate() {
                        Ok(()) => sink.emit(&NodeEvent::RelayEngaged),
                        Err(e) => {
                            warn!("relay: engage failed: {}", e);
                            sink.emit(&NodeEvent::RelayFault);
                        }
                    }
                }
                RelayCommand::Off => {
                    sink.emit(&NodeEvent::CommandAccepted {
                        command: RelayCommand::Off,
                    });
                    match relay.deactivate() {
                        Ok(()) => sink.emit(&NodeEvent::RelayReleased),
                        Err(e) => {
                            warn!("relay: release failed: {}", e);
                            sink.emit(&NodeEvent::RelayFault);
                        }
                    }
                }
                RelayCommand::Unknown(raw) => {
                    warn!(
                        "relay: unknown command on '{}': {:?}",
                        msg.topic,
                        core::str::from_utf8(&raw).unwrap_or("<binary>")
                    );
                    sink.emit(&NodeEvent::CommandIgnored {
                        command: RelayCommand::Unknown(raw),
                    });
                }
            }
        }

        TickAction::Continue
    }

    pub fn link_up(&self) -> bool {
        self.link.is_up()
    }

    pub fn session_open(&self) -> bool {
        self.session.is_open()
    }
}
