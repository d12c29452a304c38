//! Four-state utterance segmentation state machine.
//!
//! Groups consecutive classified frames into candidate utterance segments.
//! Onset and offset are both debounced: a segment only opens after
//! `onset_frames` consecutive voiced frames, and only closes after
//! `offset_frames` consecutive silent frames, so single-frame classifier
//! flicker neither opens spurious segments nor fragments real ones.
//!
//! ```text
//!          voiced                  keep.len() > onset
//!  ┌──────┐ ────▶ ┌──────────┐ ──────────────────▶ ┌───────┐
//!  │ Null │       │ PreVoice │                     │ Voice │◀──┐
//!  └──────┘ ◀──── └──────────┘                     └───────┘   │ voiced
//!      ▲    silent                                  silent │   │
//!      │                                                   ▼   │
//!      │            silence.len() > offset           ┌──────────┐
//!      └──────────────── emit ◀───────────────────── │ PreNoise │
//!                                                    └──────────┘
//! ```
//!
//! All accumulators live on the machine instance; one machine serves exactly
//! one source buffer, so independent sessions never share state.

use crate::audio::frame::Frame;
use crate::defaults;
use tracing::{debug, trace};

/// Machine states. The enumeration is closed: there is no default branch
/// anywhere, an unknown state cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Idle, not inside speech.
    Null,
    /// Tentative onset, accumulating a voiced run.
    PreVoice,
    /// Confirmed speech.
    Voice,
    /// Tentative offset, accumulating a silent run.
    PreNoise,
}

/// Thresholds for the state machine, in frame counts.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// Consecutive voiced frames needed to confirm an onset.
    pub onset_frames: usize,
    /// Consecutive silent frames needed to confirm an offset.
    pub offset_frames: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            onset_frames: defaults::ONSET_FRAMES,
            offset_frames: defaults::OFFSET_FRAMES,
        }
    }
}

/// A contiguous run of frames grouped as one tentative utterance.
///
/// Never empty; frames are strictly time-ordered with no gaps.
#[derive(Debug, Clone)]
pub struct CandidateSegment<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> CandidateSegment<'a> {
    /// Number of frames in the candidate.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Candidates are never empty; this exists for clippy's sake.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Start of the first frame, in seconds.
    pub fn start(&self) -> f64 {
        self.frames[0].timestamp
    }

    /// End of the last frame, in seconds.
    pub fn end(&self) -> f64 {
        self.frames[self.frames.len() - 1].end()
    }

    /// The frames of this candidate, in order.
    pub fn frames(&self) -> &[Frame<'a>] {
        &self.frames
    }

    /// Concatenates the candidate's frame bytes into one contiguous buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        let total: usize = self.frames.iter().map(|f| f.bytes.len()).sum();
        let mut bytes = Vec::with_capacity(total);
        for frame in &self.frames {
            bytes.extend_from_slice(frame.bytes);
        }
        bytes
    }
}

/// The segmentation state machine for one source buffer.
pub struct Segmenter<'a> {
    config: SegmenterConfig,
    state: State,
    keep: Vec<Frame<'a>>,
    silence: Vec<Frame<'a>>,
}

impl<'a> Segmenter<'a> {
    /// Creates a machine in the `Null` state with empty accumulators.
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            state: State::Null,
            keep: Vec::new(),
            silence: Vec::new(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Feeds one classified frame into the machine.
    ///
    /// Returns a candidate segment when this frame confirms an utterance
    /// offset; otherwise `None`. Frames must be fed in temporal order.
    pub fn advance(&mut self, frame: Frame<'a>, voiced: bool) -> Option<CandidateSegment<'a>> {
        match self.state {
            State::Null => {
                if voiced {
                    self.keep.clear();
                    self.keep.push(frame);
                    self.state = State::PreVoice;
                }
                None
            }
            State::PreVoice => {
                if voiced {
                    self.keep.push(frame);
                    if self.keep.len() > self.config.onset_frames {
                        trace!(at = frame.timestamp, "onset confirmed");
                        self.state = State::Voice;
                    }
                } else {
                    self.keep.clear();
                    self.state = State::Null;
                }
                None
            }
            State::Voice => {
                self.keep.push(frame);
                if !voiced {
                    self.silence.clear();
                    self.state = State::PreNoise;
                }
                None
            }
            State::PreNoise => {
                self.keep.push(frame);
                if voiced {
                    self.state = State::Voice;
                    None
                } else {
                    self.silence.push(frame);
                    if self.silence.len() > self.config.offset_frames {
                        self.close_run()
                    } else {
                        None
                    }
                }
            }
        }
    }

    /// Force-emits a pending run at end of input.
    ///
    /// By default an utterance still in `PreVoice`/`Voice`/`PreNoise` when
    /// frames run out is dropped; callers opt into recovery with this. The
    /// tentative silent tail is removed and the remainder is emitted if it
    /// is longer than `offset_frames`.
    pub fn flush(&mut self) -> Option<CandidateSegment<'a>> {
        let mut keep = std::mem::take(&mut self.keep);
        let pending_silence = self.silence.len();
        self.silence = Vec::new();
        self.state = State::Null;

        keep.truncate(keep.len().saturating_sub(pending_silence));
        if keep.len() > self.config.offset_frames {
            debug!(frames = keep.len(), "flushed trailing utterance");
            Some(CandidateSegment { frames: keep })
        } else {
            None
        }
    }

    /// Resets to the initial state, discarding any pending run.
    pub fn reset(&mut self) {
        self.state = State::Null;
        self.keep.clear();
        self.silence.clear();
    }

    /// Confirmed-offset edge: emit the accumulated run, minus the silence
    /// tail, or discard it when the run is too short to be a real utterance.
    fn close_run(&mut self) -> Option<CandidateSegment<'a>> {
        let mut keep = std::mem::take(&mut self.keep);
        self.silence = Vec::new();
        self.state = State::Null;

        if keep.len() <= self.config.offset_frames {
            // Nothing but silence-confirmation noise accumulated.
            trace!(frames = keep.len(), "run discarded at offset");
            return None;
        }

        // Drop the confirmed-silence tail plus a small safety margin so the
        // segment ends near the last voiced frame.
        let trim = self.config.offset_frames + 2;
        let remaining = keep.len().saturating_sub(trim);
        if remaining == 0 {
            // Unreachable for any run that passed through Voice; keeps the
            // non-empty candidate invariant regardless.
            trace!(frames = keep.len(), "run shorter than trim margin, discarded");
            return None;
        }
        keep.truncate(remaining);

        debug!(
            frames = keep.len(),
            start = keep[0].timestamp,
            "segment closed"
        );
        Some(CandidateSegment { frames: keep })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_BYTES: [u8; 4] = [0; 4];

    fn frame(index: usize) -> Frame<'static> {
        Frame {
            bytes: &FRAME_BYTES,
            timestamp: index as f64 * 0.03,
            duration: 0.03,
        }
    }

    fn config(onset: usize, offset: usize) -> SegmenterConfig {
        SegmenterConfig {
            onset_frames: onset,
            offset_frames: offset,
        }
    }

    /// Runs a classification script through a fresh machine and collects
    /// everything it emits.
    fn run_script(cfg: SegmenterConfig, script: &[bool]) -> Vec<CandidateSegment<'static>> {
        let mut machine = Segmenter::new(cfg);
        let mut emitted = Vec::new();
        for (i, &voiced) in script.iter().enumerate() {
            if let Some(candidate) = machine.advance(frame(i), voiced) {
                emitted.push(candidate);
            }
        }
        emitted
    }

    #[test]
    fn starts_in_null() {
        let machine = Segmenter::new(SegmenterConfig::default());
        assert_eq!(machine.state(), State::Null);
    }

    #[test]
    fn silent_frames_stay_null() {
        let mut machine = Segmenter::new(config(15, 33));
        for i in 0..10 {
            assert!(machine.advance(frame(i), false).is_none());
        }
        assert_eq!(machine.state(), State::Null);
    }

    #[test]
    fn short_voiced_burst_never_reaches_voice() {
        // 5 voiced frames with onset threshold 15: classifier flips back to
        // silent before the run is long enough.
        let mut script = vec![false; 2];
        script.extend(vec![true; 5]);
        script.extend(vec![false; 50]);

        let emitted = run_script(config(15, 33), &script);
        assert!(emitted.is_empty());
    }

    #[test]
    fn onset_confirms_after_threshold() {
        let mut machine = Segmenter::new(config(15, 33));
        // Frames 0-1 silent, frame 2 opens PreVoice
        machine.advance(frame(0), false);
        machine.advance(frame(1), false);
        machine.advance(frame(2), true);
        assert_eq!(machine.state(), State::PreVoice);

        // keep reaches 16 (> 15) on the 16th voiced frame
        for i in 3..17 {
            machine.advance(frame(i), true);
        }
        assert_eq!(machine.state(), State::PreVoice);
        machine.advance(frame(17), true);
        assert_eq!(machine.state(), State::Voice);
    }

    #[test]
    fn full_cycle_emits_trimmed_segment() {
        // Reference scenario: 2 silent, 25 voiced, then sustained silence
        // with onset 15 / offset 33. The emitted candidate is exactly the
        // 25 voiced frames: the run closes with 60 frames accumulated and
        // the trailing 35 (offset + 2) are trimmed.
        let mut script = vec![false; 2];
        script.extend(vec![true; 25]);
        script.extend(vec![false; 40]);

        let emitted = run_script(config(15, 33), &script);
        assert_eq!(emitted.len(), 1);

        let candidate = &emitted[0];
        assert_eq!(candidate.len(), 25);
        assert!((candidate.start() - 2.0 * 0.03).abs() < 1e-9);
    }

    #[test]
    fn emitted_frames_are_time_contiguous() {
        let mut script = vec![true; 30];
        script.extend(vec![false; 40]);

        let emitted = run_script(config(15, 33), &script);
        assert_eq!(emitted.len(), 1);

        for pair in emitted[0].frames().windows(2) {
            assert!((pair[1].timestamp - pair[0].end()).abs() < 1e-9);
        }
    }

    #[test]
    fn brief_pause_does_not_fragment_utterance() {
        // Voice, a 10-frame dip (under offset 33), voice again, then real
        // silence: one single segment.
        let mut script = vec![true; 30];
        script.extend(vec![false; 10]);
        script.extend(vec![true; 30]);
        script.extend(vec![false; 40]);

        let emitted = run_script(config(15, 33), &script);
        assert_eq!(emitted.len(), 1);
        // The run closes with 105 frames accumulated (the last 6 silent
        // frames are consumed in Null); minus the 35-frame tail trim.
        assert_eq!(emitted[0].len(), 70);
    }

    #[test]
    fn machine_returns_to_null_after_emission() {
        let mut script = vec![true; 30];
        script.extend(vec![false; 40]);

        let mut machine = Segmenter::new(config(15, 33));
        let mut emitted = 0;
        for (i, &voiced) in script.iter().enumerate() {
            if machine.advance(frame(i), voiced).is_some() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 1);
        assert_eq!(machine.state(), State::Null);

        // A second utterance through the same machine works unchanged.
        let mut script2 = vec![true; 30];
        script2.extend(vec![false; 40]);
        for (i, &voiced) in script2.iter().enumerate() {
            if machine.advance(frame(100 + i), voiced).is_some() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 2);
    }

    #[test]
    fn minimal_run_emits_tiny_remainder() {
        // The shortest run that can close: nearly everything is trimmed as
        // silence tail, only the voiced head survives.
        //
        // onset=1: 2 voiced to confirm. offset=5: close once 6 silent
        // frames accumulate. keep at close = 2 voiced + 7 silent = 9 > 5,
        // trim = 7, remainder = 2.
        let mut script = vec![true; 2];
        script.extend(vec![false; 10]);

        let emitted = run_script(config(1, 5), &script);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].len(), 2);
    }

    #[test]
    fn pure_noise_burst_emits_nothing() {
        // offset 33 with a run that never accumulates more than 33 frames:
        // a 20-frame voiced blip never confirms onset (onset 25), and the
        // accumulator is discarded on the silent frame that follows.
        let mut script = vec![true; 20];
        script.extend(vec![false; 40]);

        let emitted = run_script(config(25, 33), &script);
        assert!(emitted.is_empty());
    }

    #[test]
    fn unterminated_speech_is_dropped_at_exhaustion() {
        // All-voiced input never reaches PreNoise; without an explicit
        // flush the accumulated run is simply lost.
        let script = vec![true; 100];
        let mut machine = Segmenter::new(config(15, 33));
        for (i, &voiced) in script.iter().enumerate() {
            assert!(machine.advance(frame(i), voiced).is_none());
        }
        assert_eq!(machine.state(), State::Voice);
        // Dropping the machine here loses the run; that is the documented
        // default behavior.
    }

    #[test]
    fn flush_recovers_unterminated_speech() {
        let mut machine = Segmenter::new(config(15, 33));
        for i in 0..100 {
            machine.advance(frame(i), true);
        }

        let flushed = machine.flush().expect("pending run should flush");
        assert_eq!(flushed.len(), 100);
        assert_eq!(machine.state(), State::Null);
    }

    #[test]
    fn flush_drops_tentative_silence_tail() {
        let mut machine = Segmenter::new(config(15, 33));
        for i in 0..50 {
            machine.advance(frame(i), true);
        }
        // 10 silent frames: PreNoise but offset not confirmed
        for i in 50..60 {
            machine.advance(frame(i), false);
        }
        assert_eq!(machine.state(), State::PreNoise);

        let flushed = machine.flush().expect("pending run should flush");
        // 50 voiced + the first silent frame (appended before the silence
        // accumulator starts); the 9 tracked silence frames are dropped.
        assert_eq!(flushed.len(), 51);
    }

    #[test]
    fn flush_of_short_run_emits_nothing() {
        let mut machine = Segmenter::new(config(5, 33));
        for i in 0..20 {
            machine.advance(frame(i), true);
        }
        // 20 frames <= offset 33: not a real utterance
        assert!(machine.flush().is_none());
    }

    #[test]
    fn flush_when_idle_emits_nothing() {
        let mut machine = Segmenter::new(SegmenterConfig::default());
        assert!(machine.flush().is_none());
    }

    #[test]
    fn reset_discards_pending_run() {
        let mut machine = Segmenter::new(config(5, 33));
        for i in 0..40 {
            machine.advance(frame(i), true);
        }
        assert_eq!(machine.state(), State::Voice);

        machine.reset();
        assert_eq!(machine.state(), State::Null);
        assert!(machine.flush().is_none());
    }

    #[test]
    fn candidate_into_bytes_concatenates_frames() {
        let mut script = vec![true; 30];
        script.extend(vec![false; 40]);

        let emitted = run_script(config(15, 33), &script);
        let candidate = emitted.into_iter().next().unwrap();
        let frames = candidate.len();
        let bytes = candidate.into_bytes();
        assert_eq!(bytes.len(), frames * FRAME_BYTES.len());
    }
}
