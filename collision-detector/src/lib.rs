//! Signal Collision Detector Library
//!
//! Detects temporal overlap ("collision") between two boolean signal traces.
//! Feed it decoded per-channel state changes and it emits one interval for
//! every period during which both channels are asserted.
//!
//! # Architecture
//!
//! The core is a small state machine, [`CollisionTracker`]:
//! - Tracks the last known level of two bound channels
//! - Opens an interval when both become asserted
//! - Emits the interval when either drops
//! - On [`finalize`](CollisionTracker::finalize), reports a still-open
//!   interval with its start time as both endpoints
//!
//! The library does NOT:
//! - Decode raw samples into channel events
//! - Filter, debounce or discover channels
//! - Render results
//!
//! Hosts feeding events from files or other pipelines can use the
//! [`Analyzer`] trait, [`AnalyzerIterator`] and [`JsonLinesSource`].
//!
//! # Example Usage
//!
//! ```no_run
//! use collision_detector::{AnalyzerIterator, ChannelBinding, CollisionTracker, JsonLinesSource};
//! use std::path::Path;
//!
//! let binding = ChannelBinding::new("CS_A", "CS_B");
//! let source = JsonLinesSource::open(Path::new("capture.jsonl")).unwrap();
//!
//! for collision in AnalyzerIterator::new(source, CollisionTracker::new(binding)) {
//!     match collision {
//!         Ok(c) => println!("{} .. {}: {}", c.start_time, c.end_time, c),
//!         Err(e) => eprintln!("Read error: {}", e),
//!     }
//! }
//! ```

// Public modules
pub mod analyzer;
pub mod config;
pub mod source;
pub mod tracker;
pub mod types;

// Re-export main types for convenience
pub use analyzer::{detect_collisions, Analyzer, AnalyzerIterator};
pub use config::{ChannelBinding, DEFAULT_CHANNEL1, DEFAULT_CHANNEL2};
pub use source::{write_json_line, JsonLinesSource};
pub use tracker::{CollisionTracker, TrackerState};
pub use types::{
    timestamp_from_nanos, ChannelEvent, ChannelRole, CloseReason, CollisionEvent, DetectorError,
    Result, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
