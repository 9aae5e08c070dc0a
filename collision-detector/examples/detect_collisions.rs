//! Standalone collision detection tool
//!
//! Reads a JSON-lines file of decoded channel events and prints every interval
//! in which both selected channels were asserted.
//!
//! Usage:
//!   detect_collisions <events.jsonl> [--channel1 <name>] [--channel2 <name>] [--verbose]
//!
//! Example:
//!   detect_collisions capture.jsonl --channel1 CS_A --channel2 CS_B

use collision_detector::{
    AnalyzerIterator, ChannelBinding, CollisionEvent, CollisionTracker, JsonLinesSource,
    Timestamp,
};
use std::env;
use std::path::PathBuf;

fn timestamp_to_secs(ts: &Timestamp) -> f64 {
    ts.timestamp() as f64 + (ts.timestamp_subsec_nanos() as f64 / 1_000_000_000.0)
}

struct DetectionStats {
    collisions: usize,
    open_at_end: usize,
    read_errors: usize,
    total_overlap_ns: i64,
}

impl DetectionStats {
    fn new() -> Self {
        Self {
            collisions: 0,
            open_at_end: 0,
            read_errors: 0,
            total_overlap_ns: 0,
        }
    }

    fn record(&mut self, collision: &CollisionEvent) {
        self.collisions += 1;
        if collision.is_open_at_end() {
            self.open_at_end += 1;
        }
        let overlap_ns = collision.duration().num_nanoseconds().unwrap_or(i64::MAX);
        self.total_overlap_ns = self.total_overlap_ns.saturating_add(overlap_ns);
    }

    fn print_summary(&self) {
        println!("\n=== DETECTION SUMMARY ===");
        println!("Collisions: {}", self.collisions);
        println!("Open at end of capture: {}", self.open_at_end);
        println!("Total overlap: {:.9}s", self.total_overlap_ns as f64 / 1_000_000_000.0);
        println!("Unreadable lines: {}", self.read_errors);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <events.jsonl> [--channel1 <name>] [--channel2 <name>] [--verbose]", args[0]);
        eprintln!("\nExample:");
        eprintln!("  {} capture.jsonl --channel1 CS_A --channel2 CS_B", args[0]);
        std::process::exit(1);
    }

    let input = PathBuf::from(&args[1]);
    let mut binding = ChannelBinding::default();
    let mut verbose = false;

    // Parse arguments
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--channel1" => {
                i += 1;
                if i < args.len() {
                    binding = binding.with_channel1(args[i].as_str());
                }
            }
            "--channel2" => {
                i += 1;
                if i < args.len() {
                    binding = binding.with_channel2(args[i].as_str());
                }
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    println!("=== Collision Detector ===");
    println!("Events: {:?}", input);
    println!("Channels: {} / {}", binding.channel1, binding.channel2);
    println!();

    let source = JsonLinesSource::open(&input)?;
    let tracker = CollisionTracker::new(binding);

    let mut stats = DetectionStats::new();
    for result in AnalyzerIterator::new(source, tracker) {
        match result {
            Ok(collision) => {
                stats.record(&collision);
                println!(
                    "[{:.9}s .. {:.9}s] {}",
                    timestamp_to_secs(&collision.start_time),
                    timestamp_to_secs(&collision.end_time),
                    collision
                );
                if verbose && collision.is_open_at_end() {
                    println!("    (still asserted when the capture ended)");
                }
            }
            Err(e) => {
                stats.read_errors += 1;
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    stats.print_summary();

    Ok(())
}
