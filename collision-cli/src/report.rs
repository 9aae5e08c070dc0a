//! Report generation
//!
//! TXT reports list collisions per job with an optional summary block.
//! JSON reports are one collision object per line.

use crate::config::OutputFormat;
use crate::pipeline::JobReport;
use anyhow::Result;
use chrono::{Duration, SecondsFormat};
use collision_detector::{write_json_line, Timestamp};
use std::io::Write;

/// Per-job totals shown in the TXT summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub collisions: usize,
    pub open_at_end: usize,
    pub total_overlap: Duration,
    pub skipped_lines: usize,
}

impl JobSummary {
    pub fn from_report(report: &JobReport) -> Self {
        Self {
            collisions: report.collisions.len(),
            open_at_end: report.collisions.iter().filter(|c| c.is_open_at_end()).count(),
            total_overlap: report.collisions.iter().fold(Duration::zero(), |total, c| {
                total
                    .checked_add(&c.duration())
                    .unwrap_or_else(Duration::max_value)
            }),
            skipped_lines: report.skipped_lines,
        }
    }
}

/// Write all job reports in the requested format
pub fn write_report<W: Write>(
    writer: &mut W,
    reports: &[JobReport],
    format: OutputFormat,
    include_summary: bool,
) -> Result<()> {
    match format {
        OutputFormat::Txt => write_txt(writer, reports, include_summary),
        OutputFormat::Json => write_json(writer, reports),
    }
}

fn write_txt<W: Write>(writer: &mut W, reports: &[JobReport], include_summary: bool) -> Result<()> {
    for report in reports {
        writeln!(
            writer,
            "== {} : {} / {} ==",
            report.job.file.display(),
            report.job.binding.channel1,
            report.job.binding.channel2
        )?;

        for collision in &report.collisions {
            writeln!(
                writer,
                "[{} .. {}] {}",
                format_timestamp(&collision.start_time),
                format_timestamp(&collision.end_time),
                collision
            )?;
        }

        if include_summary {
            let summary = JobSummary::from_report(report);
            writeln!(writer, "  collisions:     {}", summary.collisions)?;
            writeln!(writer, "  total overlap:  {}", format_duration(summary.total_overlap))?;
            writeln!(writer, "  open at end:    {}", summary.open_at_end)?;
            writeln!(writer, "  skipped lines:  {}", summary.skipped_lines)?;
        }

        writeln!(writer)?;
    }

    Ok(())
}

fn write_json<W: Write>(writer: &mut W, reports: &[JobReport]) -> Result<()> {
    for collision in reports.iter().flat_map(|r| &r.collisions) {
        write_json_line(writer, collision)?;
    }
    Ok(())
}

fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn format_duration(duration: Duration) -> String {
    match duration.num_nanoseconds() {
        Some(ns) => format!("{:.9}s", ns as f64 / 1_000_000_000.0),
        None => format!("{}s", duration.num_seconds()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Job;
    use collision_detector::{timestamp_from_nanos, ChannelBinding, CloseReason, CollisionEvent};
    use std::path::PathBuf;

    fn sample_report() -> JobReport {
        report_with(vec![
            collision(1_000, 3_500, CloseReason::FallingEdge),
            collision(9_000, 9_000, CloseReason::EndOfStream),
        ])
    }

    fn collision(start: i64, end: i64, closed_by: CloseReason) -> CollisionEvent {
        CollisionEvent {
            channel1: "CS_A".to_string(),
            channel2: "CS_B".to_string(),
            start_time: timestamp_from_nanos(start),
            end_time: timestamp_from_nanos(end),
            closed_by,
        }
    }

    fn report_with(collisions: Vec<CollisionEvent>) -> JobReport {
        JobReport {
            job: Job {
                file: PathBuf::from("capture.jsonl"),
                binding: ChannelBinding::new("CS_A", "CS_B"),
            },
            collisions,
            skipped_lines: 2,
        }
    }

    #[test]
    fn test_summary() {
        let summary = JobSummary::from_report(&sample_report());
        assert_eq!(summary.collisions, 2);
        assert_eq!(summary.open_at_end, 1);
        assert_eq!(summary.total_overlap, Duration::nanoseconds(2_500));
        assert_eq!(summary.skipped_lines, 2);
    }

    #[test]
    fn test_summary_zero_length_close_not_open_at_end() {
        let report = report_with(vec![collision(5, 5, CloseReason::FallingEdge)]);
        let summary = JobSummary::from_report(&report);
        assert_eq!(summary.collisions, 1);
        assert_eq!(summary.open_at_end, 0);
        assert_eq!(summary.total_overlap, Duration::zero());
    }

    #[test]
    fn test_txt_report() {
        let mut out = Vec::new();
        write_report(&mut out, &[sample_report()], OutputFormat::Txt, true).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("== capture.jsonl : CS_A / CS_B =="));
        assert!(text.contains(
            "[1970-01-01T00:00:00.000001000Z .. 1970-01-01T00:00:00.000003500Z] Collision detected between CS_A and CS_B"
        ));
        assert!(text.contains("total overlap:  0.000002500s"));
        assert!(text.contains("open at end:    1"));
    }

    #[test]
    fn test_txt_report_without_summary() {
        let mut out = Vec::new();
        write_report(&mut out, &[sample_report()], OutputFormat::Txt, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().filter(|l| l.contains("Collision detected")).count(), 2);
        assert!(!text.contains("total overlap"));
    }

    #[test]
    fn test_json_report() {
        let mut out = Vec::new();
        write_report(&mut out, &[sample_report()], OutputFormat::Json, true).unwrap();
        let text = String::from_utf8(out).unwrap();

        let parsed: Vec<CollisionEvent> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed, sample_report().collisions);
    }
}
