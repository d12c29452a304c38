//! Batch driver: one segmentation session per input file.
//!
//! Sessions are fully independent — each gets its own state machine,
//! accumulators and classifier instance — so files are processed in
//! parallel on blocking tasks, bounded by a semaphore. A failing file is
//! reported and skipped; it never aborts the rest of the batch.

use crate::audio::wav::read_wav_file;
use crate::classify::{Classifier, EnergyClassifier};
use crate::config::{ClassifierBackend, Config};
use crate::error::Result;
use crate::segment::session::{Session, SessionConfig, SessionSummary};
use crate::segment::sink::WavSink;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Per-file outcome of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: String,
    pub summary: SessionSummary,
}

/// A file the batch could not process.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub input: String,
    pub error: String,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    /// Total accepted segments across all files.
    pub fn accepted(&self) -> usize {
        self.files.iter().map(|f| f.summary.accepted).sum()
    }

    /// Total candidate segments across all files.
    pub fn candidates(&self) -> usize {
        self.files.iter().map(|f| f.summary.candidates).sum()
    }

    /// Total seconds of accepted audio across all files.
    pub fn accepted_duration_secs(&self) -> f64 {
        self.files.iter().map(|f| f.summary.accepted_duration_secs).sum()
    }
}

/// Segments every input file, at most `jobs` files in flight at once.
///
/// Results come back in input order regardless of completion order.
pub async fn run_batch(
    inputs: &[PathBuf],
    config: &Config,
    jobs: usize,
) -> anyhow::Result<BatchSummary> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut handles = Vec::with_capacity(inputs.len());

    for input in inputs {
        let input = input.clone();
        let config = config.clone();
        let semaphore = Arc::clone(&semaphore);

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore is never closed");
            tokio::task::spawn_blocking(move || {
                let summary = process_file(&input, &config);
                (input, summary)
            })
            .await
        }));
    }

    let mut batch = BatchSummary::default();
    for handle in handles {
        let (input, outcome) = handle.await??;
        let input_display = input.display().to_string();
        match outcome {
            Ok(summary) => {
                info!(
                    input = %input_display,
                    accepted = summary.accepted,
                    candidates = summary.candidates,
                    "file segmented"
                );
                batch.files.push(FileReport {
                    input: input_display,
                    summary,
                });
            }
            Err(e) => {
                warn!(input = %input_display, error = %e, "file skipped");
                batch.failures.push(FileFailure {
                    input: input_display,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(batch)
}

/// Segments a single input file into `<stem>-NNN.wav` clips.
pub fn process_file(input: &Path, config: &Config) -> Result<SessionSummary> {
    let wav = read_wav_file(input)?;
    let mut classifier = build_classifier(config, wav.sample_rate)?;
    let mut sink = WavSink::for_input(input, config.output.out_dir.as_deref());

    let session = Session::with_config(SessionConfig::from(config));
    session.run(&wav.samples, wav.sample_rate, &mut *classifier, &mut sink)
}

/// Instantiates the configured classifier backend for one session.
pub fn build_classifier(config: &Config, sample_rate: u32) -> Result<Box<dyn Classifier>> {
    match config.classifier.backend {
        ClassifierBackend::Energy => Ok(Box::new(EnergyClassifier::new(
            config.classifier.energy_threshold,
        ))),
        #[cfg(feature = "webrtc")]
        ClassifierBackend::Webrtc => Ok(Box::new(crate::classify::webrtc::WebRtcClassifier::new(
            sample_rate,
            config.classifier.webrtc_mode,
        )?)),
        #[cfg(not(feature = "webrtc"))]
        ClassifierBackend::Webrtc => {
            let _ = sample_rate;
            Err(crate::error::VadcutError::ConfigInvalidValue {
                key: "classifier.backend".to_string(),
                message: "this build does not include the webrtc feature".to_string(),
            })
        }
    }
}
