//! Job planning and execution
//!
//! A job is one input file analyzed for one channel pair. Every job owns its
//! own event source and tracker, so jobs run in parallel on the rayon pool.

use anyhow::{Context, Result};
use collision_detector::{
    AnalyzerIterator, ChannelBinding, CollisionEvent, CollisionTracker, DetectorError,
    JsonLinesSource,
};
use rayon::prelude::*;
use std::path::PathBuf;

/// One (input file, channel pair) analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub file: PathBuf,
    pub binding: ChannelBinding,
}

/// Everything a finished job produced
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: Job,
    pub collisions: Vec<CollisionEvent>,
    /// Lines that could not be parsed as channel events
    pub skipped_lines: usize,
}

/// Cross every input file with every channel pair, in file order then pair order
pub fn plan_jobs(files: &[PathBuf], pairs: &[ChannelBinding]) -> Vec<Job> {
    files
        .iter()
        .flat_map(|file| {
            pairs.iter().map(move |binding| Job {
                file: file.clone(),
                binding: binding.clone(),
            })
        })
        .collect()
}

/// Run a single job to completion
pub fn run_job(job: &Job) -> Result<JobReport> {
    log::info!(
        "Analyzing {:?} for {} / {}",
        job.file,
        job.binding.channel1,
        job.binding.channel2
    );

    let source = JsonLinesSource::open(&job.file)
        .with_context(|| format!("Failed to open event file: {:?}", job.file))?;
    let tracker = CollisionTracker::new(job.binding.clone());

    let mut collisions = Vec::new();
    let mut skipped_lines = 0;

    for result in AnalyzerIterator::new(source, tracker) {
        match result {
            Ok(collision) => collisions.push(collision),
            Err(e @ DetectorError::EventParse { .. }) => {
                log::warn!("{:?}: {}", job.file, e);
                skipped_lines += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read event file: {:?}", job.file));
            }
        }
    }

    log::info!(
        "{:?}: {} collision(s) between {} and {}",
        job.file,
        collisions.len(),
        job.binding.channel1,
        job.binding.channel2
    );

    Ok(JobReport {
        job: job.clone(),
        collisions,
        skipped_lines,
    })
}

/// Run all jobs in parallel; results keep the order of `jobs`
pub fn run_jobs(jobs: &[Job]) -> Vec<Result<JobReport>> {
    jobs.par_iter().map(run_job).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CAPTURE: &str = r#"{"channel":"A","value":true,"start_time":"1970-01-01T00:00:00Z","end_time":"1970-01-01T00:00:01Z"}
{"channel":"B","value":true,"start_time":"1970-01-01T00:00:01Z","end_time":"1970-01-01T00:00:02Z"}
garbage
{"channel":"A","value":false,"start_time":"1970-01-01T00:00:05Z","end_time":"1970-01-01T00:00:06Z"}
{"channel":"C","value":true,"start_time":"1970-01-01T00:00:07Z","end_time":"1970-01-01T00:00:08Z"}
{"channel":"A","value":true,"start_time":"1970-01-01T00:00:09Z","end_time":"1970-01-01T00:00:10Z"}
"#;

    fn capture_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CAPTURE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_plan_jobs_order() {
        let files = vec![PathBuf::from("one.jsonl"), PathBuf::from("two.jsonl")];
        let pairs = vec![ChannelBinding::new("A", "B"), ChannelBinding::new("A", "C")];

        let jobs = plan_jobs(&files, &pairs);
        assert_eq!(jobs.len(), 4);
        assert_eq!(jobs[0].file, PathBuf::from("one.jsonl"));
        assert_eq!(jobs[1].binding, ChannelBinding::new("A", "C"));
        assert_eq!(jobs[2].file, PathBuf::from("two.jsonl"));
    }

    #[test]
    fn test_run_job_skips_bad_lines() {
        let file = capture_file();
        let job = Job {
            file: file.path().to_path_buf(),
            binding: ChannelBinding::new("A", "B"),
        };

        let report = run_job(&job).unwrap();
        assert_eq!(report.skipped_lines, 1);
        assert_eq!(report.collisions.len(), 2);
        assert_eq!(report.collisions[0].start_time.timestamp(), 1);
        assert_eq!(report.collisions[0].end_time.timestamp(), 6);
        assert!(report.collisions[1].is_open_at_end());
        assert_eq!(report.collisions[1].start_time.timestamp(), 9);
    }

    #[test]
    fn test_run_job_skips_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = b"\xff\xfe\n".to_vec();
        bytes.extend_from_slice(CAPTURE.as_bytes());
        file.write_all(&bytes).unwrap();

        let job = Job {
            file: file.path().to_path_buf(),
            binding: ChannelBinding::new("A", "B"),
        };

        let report = run_job(&job).unwrap();
        assert_eq!(report.skipped_lines, 2);
        assert_eq!(report.collisions.len(), 2);
    }

    #[test]
    fn test_run_jobs_independent_pairs() {
        let file = capture_file();
        let jobs = plan_jobs(
            &[file.path().to_path_buf()],
            &[ChannelBinding::new("A", "B"), ChannelBinding::new("A", "C")],
        );

        let results = run_jobs(&jobs);
        assert_eq!(results.len(), 2);

        let ab = results[0].as_ref().unwrap();
        assert_eq!(ab.job.binding, ChannelBinding::new("A", "B"));
        assert_eq!(ab.collisions.len(), 2);

        // A drops at 5s before C rises at 7s; A rises again at 9s
        let ac = results[1].as_ref().unwrap();
        assert_eq!(ac.collisions.len(), 1);
        assert_eq!(ac.collisions[0].start_time.timestamp(), 9);
        assert!(ac.collisions[0].is_open_at_end());
    }

    #[test]
    fn test_run_job_missing_file() {
        let job = Job {
            file: PathBuf::from("missing/capture.jsonl"),
            binding: ChannelBinding::default(),
        };

        let err = run_job(&job).unwrap_err();
        assert!(err.to_string().contains("Failed to open event file"));
    }
}
