//! vadcut - Utterance splitter for speech training corpora
//!
//! Takes long mono recordings plus a per-frame voice/non-voice classifier
//! and produces short, cleanly bounded utterance clips with trailing
//! silence trimmed away.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod runner;
pub mod segment;

// Core pipeline (windower → classifier → state machine → post-filter → sink)
pub use audio::frame::{Frame, FrameWindower};
pub use classify::{Classifier, EnergyClassifier};
#[cfg(feature = "webrtc")]
pub use classify::webrtc::WebRtcClassifier;
pub use segment::post_filter::{PostFilter, PostFilterConfig, RejectReason};
pub use segment::session::{Session, SessionConfig, SessionSummary};
pub use segment::sink::{CollectorSink, SegmentSink, WavSink};
pub use segment::state_machine::{CandidateSegment, Segmenter, SegmenterConfig, State};

// Batch driver
pub use runner::{BatchSummary, run_batch};

// Error handling
pub use error::{Result, VadcutError};

// Config
pub use config::{ClassifierBackend, Config};

/// Build version string with optional git commit hash.
///
/// Returns `"0.2.1+abc1234"` when git hash is available, `"0.2.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
