//! Default tuning constants for vadcut.
//!
//! This module provides shared constants used across the segmentation engine
//! and the configuration types to ensure consistency and eliminate duplication.

/// Sample rates the engine accepts, in Hz.
///
/// These match the rates the WebRTC VAD family of classifiers operates on.
/// Any other rate is a configuration error at session start.
pub const SUPPORTED_SAMPLE_RATES: [u32; 4] = [8000, 16000, 32000, 48000];

/// Bytes per PCM sample. The engine only handles 16-bit signed mono input.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Default frame duration in milliseconds.
///
/// 30ms is the longest frame the WebRTC VAD accepts and gives the state
/// machine the most stable per-frame decisions.
pub const FRAME_DURATION_MS: u32 = 30;

/// Minimum run of consecutive voiced frames before an onset is confirmed.
///
/// Filters single-frame classifier flicker so momentary false positives do
/// not open spurious segments. Historical tuning iterations used values
/// between 15 and 24; 22 is the shipped default.
pub const ONSET_FRAMES: usize = 22;

/// Minimum run of consecutive silent frames before an offset is confirmed.
///
/// Requires a sustained pause before closing a segment so brief gaps inside
/// an utterance do not fragment it. At 30ms frames this is roughly one
/// second of silence.
pub const OFFSET_FRAMES: usize = 33;

/// Mean-absolute-amplitude threshold below which a candidate segment is
/// rejected as pure silence.
///
/// The mean divides the sum of absolute sample values by the segment's BYTE
/// length, not its sample count; the threshold is calibrated against that
/// divisor and only makes sense with it.
pub const SILENCE_MEAN_THRESHOLD: f64 = 99.0;

/// Sample magnitude at or below which a sample counts as blank when scanning
/// a segment's tail.
pub const NOISE_FLOOR: i16 = 128;

/// Number of above-floor samples tolerated while scanning backward through a
/// segment's tail before the scan concludes real signal has resumed.
pub const DEBOUNCE_SAMPLES: u32 = 3;

/// Bytes of near-silence retained at a trimmed segment's tail, so clips end
/// with a short natural pad rather than a hard cut.
pub const TRIM_RETENTION_BYTES: usize = 64;

/// Minimum count of trailing blank samples before the tail trim applies at
/// all. Shorter runs are left untouched.
pub const MIN_TRAILING_SILENCE_SAMPLES: usize = 32;

/// Default RMS threshold for the energy classifier (0.0 to 1.0).
///
/// Tuned for typical recorded speech levels; anything quieter than this is
/// classified as non-voice.
pub const ENERGY_THRESHOLD: f32 = 0.02;

/// Default WebRTC VAD aggressiveness mode (0..=3, higher suppresses more
/// noise at the cost of clipping soft speech).
pub const WEBRTC_MODE: u8 = 3;
