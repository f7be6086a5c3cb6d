//! Wireless link manager.
//!
//! Tries each configured network profile in priority order, first
//! success wins. Association is observed by polling link status at a
//! fixed interval with a bounded poll budget per profile (~10 s box).
//! Exhausting every profile is not exceptional: the manager returns to
//! `Disconnected` and the next loop pass starts over from the top —
//! fire-and-forget retry with no backoff escalation.

use log::{info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::{EventSink, NetworkLink};
use crate::config::{LinkConfig, ticks_for};

/// Externally visible link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Down,
    Associating {
        profile: usize,
        polls: u16,
        ticks: u32,
    },
    Up,
}

/// Tick-driven connectivity manager over a [`NetworkLink`] port.
pub struct LinkManager {
    cfg: LinkConfig,
    ticks_per_poll: u32,
    phase: Phase,
    warned_no_profiles: bool,
}

impl LinkManager {
    pub fn new(cfg: LinkConfig, tick_interval_ms: u32) -> Self {
        let ticks_per_poll = ticks_for(cfg.poll_interval_ms, tick_interval_ms);
        Self {
            cfg,
            ticks_per_poll,
            phase: Phase::Down,
            warned_no_profiles: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        match self.phase {
            Phase::Down => ConnectionState::Disconnected,
            Phase::Associating { .. } => ConnectionState::Connecting,
            Phase::Up => ConnectionState::Connected,
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self.phase, Phase::Up)
    }

    /// Advance the link state machine by one tick.
    pub fn step(&mut self, link: &mut impl NetworkLink, sink: &mut impl EventSink) {
        match self.phase {
            Phase::Down => {
                if self.cfg.profiles.is_empty() {
                    if !self.warned_no_profiles {
                        warn!("link: no network profiles configured");
                        self.warned_no_profiles = true;
                    }
                    return;
                }
                self.start_profile(0, link, sink);
            }

            Phase::Associating {
                profile,
                polls,
                ticks,
            } => {
                let ticks = ticks + 1;
                if ticks < self.ticks_per_poll {
                    self.phase = Phase::Associating {
                        profile,
                        polls,
                        ticks,
                    };
                    return;
                }

                if link.is_up() {
                    let addr = link.local_addr();
                    match addr {
                        Some(ip) => info!(
                            "link: associated with '{}' ({})",
                            self.cfg.profiles[profile].ssid, ip
                        ),
                        None => info!(
                            "link: associated with '{}' (no address yet)",
                            self.cfg.profiles[profile].ssid
                        ),
                    }
                    self.phase = Phase::Up;
                    sink.emit(&NodeEvent::LinkUp { addr });
                    return;
                }

                let polls = polls + 1;
                sink.emit(&NodeEvent::LinkPolling { profile, poll: polls });
                if polls < self.cfg.polls_per_profile {
                    self.phase = Phase::Associating {
                        profile,
                        polls,
                        ticks: 0,
                    };
                    return;
                }

                let next = profile + 1;
                if next < self.cfg.profiles.len() {
                    self.start_profile(next, link, sink);
                } else {
                    warn!("link: every profile exhausted, retrying next pass");
                    self.phase = Phase::Down;
                    sink.emit(&NodeEvent::LinkExhausted);
                }
            }

            Phase::Up => {
                if !link.is_up() {
                    warn!("link: connection lost");
                    self.phase = Phase::Down;
                    sink.emit(&NodeEvent::LinkLost);
                }
            }
        }
    }

    fn start_profile(
        &mut self,
        profile: usize,
        link: &mut impl NetworkLink,
        sink: &mut impl EventSink,
    ) {
        let p = &self.cfg.profiles[profile];
        info!("link: associating with '{}'", p.ssid);
        sink.emit(&NodeEvent::LinkConnecting { profile });
        match link.begin(p) {
            Ok(()) => {
                self.phase = Phase::Associating {
                    profile,
                    polls: 0,
                    ticks: 0,
                };
            }
            Err(e) => {
                // Driver refused outright; stay Down and retry next pass.
                warn!("link: begin('{}') failed: {}", p.ssid, e);
                self.phase = Phase::Down;
            }
        }
    }
}
