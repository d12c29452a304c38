//! Per-input segmentation session.
//!
//! A session spans exactly one source buffer: it windows the buffer into
//! frames, queries the classifier once per frame in order, drives the state
//! machine, post-filters every candidate, and hands accepted segments to
//! the sink. All accumulators are created per run, so concurrent sessions
//! over different buffers share nothing.

use crate::audio::frame::FrameWindower;
use crate::classify::Classifier;
use crate::config::Config;
use crate::defaults::{self, SUPPORTED_SAMPLE_RATES};
use crate::error::{Result, VadcutError};
use crate::segment::post_filter::{PostFilter, PostFilterConfig, RejectReason};
use crate::segment::sink::SegmentSink;
use crate::segment::state_machine::{CandidateSegment, Segmenter, SegmenterConfig};
use serde::Serialize;
use tracing::debug;

/// Everything a session needs to know ahead of the audio itself.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Frame duration in milliseconds.
    pub frame_duration_ms: u32,
    /// State machine thresholds.
    pub segmenter: SegmenterConfig,
    /// Post-filter thresholds.
    pub filter: PostFilterConfig,
    /// Force-emit a pending utterance at end of input.
    pub flush_trailing: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_duration_ms: defaults::FRAME_DURATION_MS,
            segmenter: SegmenterConfig::default(),
            filter: PostFilterConfig::default(),
            flush_trailing: false,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            frame_duration_ms: config.segmenter.frame_duration_ms,
            segmenter: SegmenterConfig {
                onset_frames: config.segmenter.onset_frames,
                offset_frames: config.segmenter.offset_frames,
            },
            filter: PostFilterConfig {
                silence_mean_threshold: config.filter.silence_mean_threshold,
                noise_floor: config.filter.noise_floor,
                debounce_samples: config.filter.debounce_samples,
                trim_retention_bytes: config.filter.trim_retention_bytes,
                min_trailing_silence_samples: config.filter.min_trailing_silence_samples,
            },
            flush_trailing: config.output.flush_trailing,
        }
    }
}

/// Counters for one completed session.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SessionSummary {
    /// Frames fed through the classifier.
    pub frames: usize,
    /// Candidate segments the state machine emitted.
    pub candidates: usize,
    /// Segments accepted and written.
    pub accepted: usize,
    /// Candidates rejected as pure silence.
    pub rejected_silence: usize,
    /// Candidates dropped by the degenerate-trim clamp.
    pub rejected_degenerate: usize,
    /// Total bytes of accepted audio.
    pub accepted_bytes: u64,
    /// Total seconds of accepted audio.
    pub accepted_duration_secs: f64,
}

/// Runs the segmentation pipeline over single source buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Session {
    config: SessionConfig,
}

impl Session {
    /// Creates a session runner with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session runner with the given configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Segments one source buffer, writing accepted segments to `sink`.
    ///
    /// The classifier is queried once per frame, in frame order. A
    /// classifier error aborts the run; segments already handed to the
    /// sink stay written.
    pub fn run<C, S>(
        &self,
        audio: &[u8],
        sample_rate: u32,
        classifier: &mut C,
        sink: &mut S,
    ) -> Result<SessionSummary>
    where
        C: Classifier + ?Sized,
        S: SegmentSink + ?Sized,
    {
        if !SUPPORTED_SAMPLE_RATES.contains(&sample_rate) {
            return Err(VadcutError::UnsupportedSampleRate { rate: sample_rate });
        }

        let mut machine = Segmenter::new(self.config.segmenter);
        let filter = PostFilter::new(self.config.filter);
        let mut summary = SessionSummary::default();
        let mut next_index = 0usize;

        for frame in FrameWindower::new(audio, sample_rate, self.config.frame_duration_ms) {
            let voiced = classifier.classify(frame.bytes, sample_rate)?;
            summary.frames += 1;

            if let Some(candidate) = machine.advance(frame, voiced) {
                self.deliver(candidate, sample_rate, &filter, sink, &mut next_index, &mut summary)?;
            }
        }

        if self.config.flush_trailing
            && let Some(candidate) = machine.flush()
        {
            self.deliver(candidate, sample_rate, &filter, sink, &mut next_index, &mut summary)?;
        }

        debug!(
            frames = summary.frames,
            candidates = summary.candidates,
            accepted = summary.accepted,
            "session finished"
        );
        Ok(summary)
    }

    fn deliver<S>(
        &self,
        candidate: CandidateSegment<'_>,
        sample_rate: u32,
        filter: &PostFilter,
        sink: &mut S,
        next_index: &mut usize,
        summary: &mut SessionSummary,
    ) -> Result<()>
    where
        S: SegmentSink + ?Sized,
    {
        summary.candidates += 1;

        match filter.apply(candidate.into_bytes()) {
            Ok(samples) => {
                sink.write(*next_index, &samples, sample_rate)?;
                *next_index += 1;
                summary.accepted += 1;
                summary.accepted_bytes += samples.len() as u64;
                summary.accepted_duration_secs +=
                    samples.len() as f64 / 2.0 / sample_rate as f64;
            }
            Err(RejectReason::Silence) => summary.rejected_silence += 1,
            Err(RejectReason::DegenerateTrim) => summary.rejected_degenerate += 1,
        }
        Ok(())
    }
}
