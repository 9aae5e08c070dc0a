//! Analyzer contract and stream driver
//!
//! Hosts drive analyzers through three calls: construction, one
//! `process_event` per input event, and one `finalize` at end of stream.
//! [`AnalyzerIterator`] wires that contract onto any event iterator.

use crate::config::ChannelBinding;
use crate::tracker::CollisionTracker;
use crate::types::{ChannelEvent, CollisionEvent, Result};

/// Common interface for event-driven analyzers
pub trait Analyzer {
    /// Record emitted by the analyzer
    type Output;

    /// Consume one input event, optionally emitting a result
    fn process_event(&mut self, event: &ChannelEvent) -> Option<Self::Output>;

    /// Signal end of stream, optionally emitting a final result
    fn finalize(&mut self) -> Option<Self::Output>;
}

impl Analyzer for CollisionTracker {
    type Output = CollisionEvent;

    fn process_event(&mut self, event: &ChannelEvent) -> Option<CollisionEvent> {
        CollisionTracker::process_event(self, event)
    }

    fn finalize(&mut self) -> Option<CollisionEvent> {
        CollisionTracker::finalize(self)
    }
}

/// Iterator that feeds channel events through an analyzer
///
/// For each event pulled from the source:
/// 1. Source error → forwarded as-is, analyzer untouched
/// 2. Event → passed to the analyzer, output yielded if any
/// 3. Source exhausted → analyzer finalized exactly once
pub struct AnalyzerIterator<I, A>
where
    I: Iterator<Item = Result<ChannelEvent>>,
    A: Analyzer,
{
    events: I,
    analyzer: A,
    finalized: bool,
}

impl<I, A> AnalyzerIterator<I, A>
where
    I: Iterator<Item = Result<ChannelEvent>>,
    A: Analyzer,
{
    /// Wrap an event source and an analyzer
    pub fn new(events: I, analyzer: A) -> Self {
        Self {
            events,
            analyzer,
            finalized: false,
        }
    }

    /// Borrow the analyzer (e.g. to inspect its state mid-stream)
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Consume the iterator and hand back the analyzer
    pub fn into_analyzer(self) -> A {
        self.analyzer
    }
}

impl<I, A> Iterator for AnalyzerIterator<I, A>
where
    I: Iterator<Item = Result<ChannelEvent>>,
    A: Analyzer,
{
    type Item = Result<A::Output>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finalized {
            return None;
        }

        loop {
            match self.events.next() {
                Some(Ok(event)) => {
                    if let Some(output) = self.analyzer.process_event(&event) {
                        return Some(Ok(output));
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.finalized = true;
                    return self.analyzer.finalize().map(Ok);
                }
            }
        }
    }
}

impl<I, A> std::iter::FusedIterator for AnalyzerIterator<I, A>
where
    I: Iterator<Item = Result<ChannelEvent>>,
    A: Analyzer,
{
}

/// Run a complete in-memory event sequence through a fresh tracker
///
/// # Example
/// ```
/// use collision_detector::{detect_collisions, timestamp_from_nanos, ChannelBinding, ChannelEvent};
///
/// let events = vec![
///     ChannelEvent::new("CS_A", true, timestamp_from_nanos(0), timestamp_from_nanos(1)),
///     ChannelEvent::new("CS_B", true, timestamp_from_nanos(1), timestamp_from_nanos(2)),
///     ChannelEvent::new("CS_A", false, timestamp_from_nanos(5), timestamp_from_nanos(6)),
/// ];
///
/// let collisions = detect_collisions(ChannelBinding::new("CS_A", "CS_B"), events);
/// assert_eq!(collisions.len(), 1);
/// assert_eq!(collisions[0].end_time, timestamp_from_nanos(6));
/// ```
pub fn detect_collisions<E>(binding: ChannelBinding, events: E) -> Vec<CollisionEvent>
where
    E: IntoIterator<Item = ChannelEvent>,
{
    let mut tracker = CollisionTracker::new(binding);
    let mut collisions: Vec<CollisionEvent> = events
        .into_iter()
        .filter_map(|event| tracker.process_event(&event))
        .collect();
    collisions.extend(tracker.finalize());
    collisions
}
