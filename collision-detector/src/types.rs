//! Core types for the collision detector library
//!
//! This module defines the records that flow through the detector: the decoded
//! per-channel boolean events it consumes and the collision intervals it emits.
//! The detector does not decode raw samples itself - events arrive already
//! segmented by the host.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the detector
pub type Timestamp = DateTime<Utc>;

/// Result type for detector operations
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Build a timestamp from a nanosecond offset relative to the Unix epoch.
///
/// Logic analyzer captures usually carry times relative to the start of the
/// capture; hosts and tests map those onto the epoch with this helper.
pub fn timestamp_from_nanos(nanos: i64) -> Timestamp {
    DateTime::from_timestamp_nanos(nanos)
}

/// Errors that can occur while reading or emitting events
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("Failed to parse channel event on line {line}: {message}")]
    EventParse { line: usize, message: String },

    #[error("Failed to serialize event: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded boolean state change on a single logical channel
///
/// `value` is the level effective from `start_time` through `end_time`.
/// Events are expected in non-decreasing `start_time` order; the detector does
/// not check this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEvent {
    /// Identifier of the emitting channel
    pub channel: String,
    /// Boolean level after this event
    pub value: bool,
    /// Time the level took effect
    pub start_time: Timestamp,
    /// Time the event ended
    pub end_time: Timestamp,
}

impl ChannelEvent {
    /// Create a new channel event
    pub fn new(
        channel: impl Into<String>,
        value: bool,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Self {
        Self {
            channel: channel.into(),
            value,
            start_time,
            end_time,
        }
    }
}

/// The two monitored roles of a channel binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelRole {
    First,
    Second,
}

/// What ended a collision interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// One of the channels dropped
    #[default]
    FallingEdge,
    /// The stream ended while both channels were still asserted
    EndOfStream,
}

/// A closed interval during which both monitored channels were asserted
///
/// Emitted when the conjunction falls, or at end of stream with
/// `start_time == end_time` when the collision was still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Identifier bound to the first role
    pub channel1: String,
    /// Identifier bound to the second role
    pub channel2: String,
    /// Start time of the event that made both channels asserted
    pub start_time: Timestamp,
    /// End time of the event that dropped a channel (equals `start_time` at end of stream)
    pub end_time: Timestamp,
    /// Whether a falling edge or the end of the stream closed the interval
    #[serde(default)]
    pub closed_by: CloseReason,
}

impl CollisionEvent {
    /// Result type name used by presentation layers
    pub const KIND: &'static str = "collision";

    /// Length of the collision interval
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// True for zero-length intervals
    ///
    /// Every interval closed by end of stream is degenerate, but a falling edge
    /// can also close one at the instant it opened.
    pub fn is_degenerate(&self) -> bool {
        self.start_time == self.end_time
    }

    /// True when the stream ended before the interval closed
    pub fn is_open_at_end(&self) -> bool {
        self.closed_by == CloseReason::EndOfStream
    }
}

impl fmt::Display for CollisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Collision detected between {} and {}",
            self.channel1, self.channel2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collision(start_ns: i64, end_ns: i64, closed_by: CloseReason) -> CollisionEvent {
        CollisionEvent {
            channel1: "CS_A".to_string(),
            channel2: "CS_B".to_string(),
            start_time: timestamp_from_nanos(start_ns),
            end_time: timestamp_from_nanos(end_ns),
            closed_by,
        }
    }

    #[test]
    fn test_collision_display() {
        assert_eq!(
            format!("{}", collision(0, 10, CloseReason::FallingEdge)),
            "Collision detected between CS_A and CS_B"
        );
    }

    #[test]
    fn test_collision_duration() {
        let event = collision(1_000, 4_500, CloseReason::FallingEdge);
        assert_eq!(event.duration(), Duration::nanoseconds(3_500));
        assert!(!event.is_degenerate());
        assert!(!event.is_open_at_end());

        let open_at_end = collision(2_000, 2_000, CloseReason::EndOfStream);
        assert_eq!(open_at_end.duration(), Duration::zero());
        assert!(open_at_end.is_degenerate());
        assert!(open_at_end.is_open_at_end());
    }

    #[test]
    fn test_zero_length_falling_edge_is_not_open_at_end() {
        let instant = collision(5, 5, CloseReason::FallingEdge);
        assert!(instant.is_degenerate());
        assert!(!instant.is_open_at_end());
    }

    #[test]
    fn test_close_reason_json() {
        let json = serde_json::to_string(&collision(0, 0, CloseReason::EndOfStream)).unwrap();
        assert!(json.contains(r#""closed_by":"end_of_stream""#));

        // Records written without a reason read back as falling-edge closes
        let legacy = r#"{"channel1":"A","channel2":"B","start_time":"1970-01-01T00:00:00Z","end_time":"1970-01-01T00:00:01Z"}"#;
        let parsed: CollisionEvent = serde_json::from_str(legacy).unwrap();
        assert_eq!(parsed.closed_by, CloseReason::FallingEdge);
    }

    #[test]
    fn test_timestamp_from_nanos() {
        let ts = timestamp_from_nanos(1_500_000_000);
        assert_eq!(ts.timestamp(), 1);
        assert_eq!(ts.timestamp_subsec_nanos(), 500_000_000);
    }

    #[test]
    fn test_channel_event_json() {
        let json = r#"{"channel":"CS_A","value":true,"start_time":"1970-01-01T00:00:01Z","end_time":"1970-01-01T00:00:02Z"}"#;
        let event: ChannelEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.channel, "CS_A");
        assert!(event.value);
        assert_eq!(event.start_time, timestamp_from_nanos(1_000_000_000));
        assert_eq!(event.end_time, timestamp_from_nanos(2_000_000_000));
    }
}
