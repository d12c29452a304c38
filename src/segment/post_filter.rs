//! Amplitude-based acceptance filtering for candidate segments.
//!
//! Two independent checks run against a candidate's concatenated samples:
//! pure-silence rejection (the classifier opened a segment but nothing is
//! actually there) and tail-blank trimming (the segment ends in a run of
//! near-silence that would pad the training clip for no benefit).

use crate::defaults;
use tracing::{trace, warn};

/// Thresholds for the post-filter.
#[derive(Debug, Clone, Copy)]
pub struct PostFilterConfig {
    /// Mean-absolute-amplitude floor below which a segment is rejected.
    /// The mean divides by the segment's byte length, not its sample count;
    /// the default threshold is calibrated against that divisor.
    pub silence_mean_threshold: f64,
    /// Sample magnitude at or below which a tail sample counts as blank.
    pub noise_floor: i16,
    /// Above-floor samples tolerated before the backward scan stops.
    pub debounce_samples: u32,
    /// Bytes of near-silence retained after a trim.
    pub trim_retention_bytes: usize,
    /// Minimum trailing blank run before the trim applies at all.
    pub min_trailing_silence_samples: usize,
}

impl Default for PostFilterConfig {
    fn default() -> Self {
        Self {
            silence_mean_threshold: defaults::SILENCE_MEAN_THRESHOLD,
            noise_floor: defaults::NOISE_FLOOR,
            debounce_samples: defaults::DEBOUNCE_SAMPLES,
            trim_retention_bytes: defaults::TRIM_RETENTION_BYTES,
            min_trailing_silence_samples: defaults::MIN_TRAILING_SILENCE_SAMPLES,
        }
    }
}

/// Why a candidate segment was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Mean absolute amplitude below the silence threshold.
    Silence,
    /// The computed trim would have removed the entire buffer.
    DegenerateTrim,
}

/// Applies silence rejection and tail trimming to candidate segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    config: PostFilterConfig,
}

impl PostFilter {
    /// Creates a post-filter with the given thresholds.
    pub fn new(config: PostFilterConfig) -> Self {
        Self { config }
    }

    /// Filters one candidate's concatenated samples.
    ///
    /// Returns the (possibly tail-trimmed) buffer, or the reason the
    /// segment was rejected. Rejected segments consume no output index.
    pub fn apply(&self, mut samples: Vec<u8>) -> Result<Vec<u8>, RejectReason> {
        if mean_abs(&samples) < self.config.silence_mean_threshold {
            trace!(bytes = samples.len(), "segment rejected as silence");
            return Err(RejectReason::Silence);
        }

        let blank = self.trailing_blank_samples(&samples);
        if blank > self.config.min_trailing_silence_samples {
            // Convert the blank run to bytes, keeping a short retention pad
            // so the clip ends in a soft fade rather than a hard cut.
            let removal = (2 * blank).saturating_sub(self.config.trim_retention_bytes);
            if removal >= samples.len() {
                warn!(
                    bytes = samples.len(),
                    removal, "degenerate tail trim, segment dropped"
                );
                return Err(RejectReason::DegenerateTrim);
            }
            let new_len = samples.len() - removal;
            samples.truncate(new_len);
            trace!(removed = removal, "trailing blank trimmed");
        }

        Ok(samples)
    }

    /// Counts trailing blank samples, scanning backward from the end.
    ///
    /// Up to `debounce_samples` isolated above-floor samples are tolerated
    /// without ending the run; one more stops the scan.
    fn trailing_blank_samples(&self, samples: &[u8]) -> usize {
        let mut blank = 0usize;
        let mut above = 0u32;

        for chunk in samples.rchunks_exact(2) {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            if sample.unsigned_abs() > self.config.noise_floor.unsigned_abs() {
                above += 1;
                if above > self.config.debounce_samples {
                    break;
                }
            } else {
                blank += 1;
            }
        }

        blank
    }
}

/// Sum of absolute sample values divided by the buffer's byte length.
fn mean_abs(samples: &[u8]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: u64 = samples
        .chunks_exact(2)
        .map(|chunk| {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            u64::from(sample.unsigned_abs())
        })
        .sum();

    sum as f64 / samples.len() as f64
}
