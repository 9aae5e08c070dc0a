//! Collision tracking state machine
//!
//! Tracks the boolean level of two bound channels and emits a
//! [`CollisionEvent`] for every maximal interval in which both are asserted.
//!
//! ```text
//! Idle      --[conjunction rises]-->  Colliding   (nothing emitted)
//! Colliding --[conjunction falls]-->  Idle        (interval emitted)
//! Colliding --[finalize]--------->    Idle        (degenerate interval emitted)
//! Idle      --[finalize]--------->    Idle
//! ```

use crate::config::ChannelBinding;
use crate::types::{ChannelEvent, ChannelRole, CloseReason, CollisionEvent, Timestamp};

/// Whether a collision interval is currently open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No collision open
    Idle,
    /// Both channels asserted since `start`
    Colliding { start: Timestamp },
}

/// Detects overlap between two boolean channels
///
/// One tracker handles one channel pair for one analysis run. Events must be
/// fed in non-decreasing time order, followed by a single [`finalize`] call.
///
/// [`finalize`]: CollisionTracker::finalize
#[derive(Debug, Clone)]
pub struct CollisionTracker {
    binding: ChannelBinding,
    levels: [bool; 2],
    state: TrackerState,
}

impl CollisionTracker {
    /// Create a tracker for a channel pair
    pub fn new(binding: ChannelBinding) -> Self {
        if binding.is_self_paired() {
            log::warn!(
                "Both roles are bound to '{}'; only channel1 is tracked, so no collision can be reported",
                binding.channel1
            );
        }

        Self {
            binding,
            levels: [false; 2],
            state: TrackerState::Idle,
        }
    }

    /// Process one channel event
    ///
    /// # Returns
    /// * `Some(CollisionEvent)` when this event ends an open collision
    /// * `None` otherwise, including for events on unrelated channels
    pub fn process_event(&mut self, event: &ChannelEvent) -> Option<CollisionEvent> {
        let role = match self.binding.role_of(&event.channel) {
            Some(role) => role,
            None => {
                log::trace!("Ignoring event on unrelated channel '{}'", event.channel);
                return None;
            }
        };
        self.levels[role_index(role)] = event.value;

        log::trace!(
            "{} -> {} at {} (levels: {:?})",
            event.channel,
            event.value,
            event.start_time,
            self.levels
        );

        match (self.conjunction(), self.state) {
            (true, TrackerState::Idle) => {
                log::debug!(
                    "Collision opened between {} and {} at {}",
                    self.binding.channel1,
                    self.binding.channel2,
                    event.start_time
                );
                self.state = TrackerState::Colliding {
                    start: event.start_time,
                };
                None
            }
            (false, TrackerState::Colliding { start }) => {
                log::debug!(
                    "Collision closed between {} and {} at {}",
                    self.binding.channel1,
                    self.binding.channel2,
                    event.end_time
                );
                self.state = TrackerState::Idle;
                Some(self.collision(start, event.end_time, CloseReason::FallingEdge))
            }
            _ => None,
        }
    }

    /// Close out the run
    ///
    /// A collision still open at end of stream is reported with its start time
    /// as both endpoints, since no later event bounds it.
    pub fn finalize(&mut self) -> Option<CollisionEvent> {
        match self.state {
            TrackerState::Colliding { start } => {
                log::debug!(
                    "Collision between {} and {} still open at end of stream (started {})",
                    self.binding.channel1,
                    self.binding.channel2,
                    start
                );
                self.state = TrackerState::Idle;
                Some(self.collision(start, start, CloseReason::EndOfStream))
            }
            TrackerState::Idle => None,
        }
    }

    /// The channel pair this tracker monitors
    pub fn binding(&self) -> &ChannelBinding {
        &self.binding
    }

    /// Current state of the collision interval
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// True while a collision interval is open
    pub fn is_colliding(&self) -> bool {
        matches!(self.state, TrackerState::Colliding { .. })
    }

    /// Last known level of a monitored role (false until first seen)
    pub fn level(&self, role: ChannelRole) -> bool {
        self.levels[role_index(role)]
    }

    fn conjunction(&self) -> bool {
        self.levels.iter().all(|level| *level)
    }

    fn collision(
        &self,
        start_time: Timestamp,
        end_time: Timestamp,
        closed_by: CloseReason,
    ) -> CollisionEvent {
        CollisionEvent {
            channel1: self.binding.channel1.clone(),
            channel2: self.binding.channel2.clone(),
            start_time,
            end_time,
            closed_by,
        }
    }
}

fn role_index(role: ChannelRole) -> usize {
    match role {
        ChannelRole::First => 0,
        ChannelRole::Second => 1,
    }
}
