//! WebRTC VAD classifier backend.
//!
//! Wraps the GIPS/WebRTC voice activity detector. It only accepts frames of
//! 10, 20 or 30 ms at the supported sample rates, which is exactly what the
//! frame windower produces with the default configuration.

use crate::classify::Classifier;
use crate::error::{Result, VadcutError};
use webrtc_vad::{SampleRate, Vad, VadMode};

/// Per-frame classifier backed by the WebRTC VAD.
pub struct WebRtcClassifier {
    vad: Vad,
    mode: u8,
    sample_rate: u32,
    scratch: Vec<i16>,
}

impl WebRtcClassifier {
    /// Creates a classifier for the given sample rate and aggressiveness
    /// mode (0..=3, higher suppresses more noise).
    pub fn new(sample_rate: u32, mode: u8) -> Result<Self> {
        let mut vad = Vad::new_with_rate(vad_rate(sample_rate)?);
        vad.set_mode(vad_mode(mode)?);
        Ok(Self {
            vad,
            mode,
            sample_rate,
            scratch: Vec::new(),
        })
    }
}

impl Classifier for WebRtcClassifier {
    fn classify(&mut self, frame: &[u8], sample_rate: u32) -> Result<bool> {
        if sample_rate != self.sample_rate {
            // The detector's internal state is rate-specific.
            let mut vad = Vad::new_with_rate(vad_rate(sample_rate)?);
            vad.set_mode(vad_mode(self.mode)?);
            self.vad = vad;
            self.sample_rate = sample_rate;
        }

        self.scratch.clear();
        self.scratch.extend(
            frame
                .chunks_exact(2)
                .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]])),
        );

        self.vad
            .is_voice_segment(&self.scratch)
            .map_err(|_| VadcutError::Classifier {
                message: format!(
                    "webrtc vad rejected frame of {} samples at {} Hz (frames must be 10, 20 or 30 ms)",
                    self.scratch.len(),
                    sample_rate
                ),
            })
    }

    fn name(&self) -> &'static str {
        "webrtc"
    }
}

fn vad_mode(mode: u8) -> Result<VadMode> {
    match mode {
        0 => Ok(VadMode::Quality),
        1 => Ok(VadMode::LowBitrate),
        2 => Ok(VadMode::Aggressive),
        3 => Ok(VadMode::VeryAggressive),
        other => Err(VadcutError::ConfigInvalidValue {
            key: "classifier.webrtc_mode".to_string(),
            message: format!("mode {} out of range (0..=3)", other),
        }),
    }
}

fn vad_rate(sample_rate: u32) -> Result<SampleRate> {
    match sample_rate {
        8000 => Ok(SampleRate::Rate8kHz),
        16000 => Ok(SampleRate::Rate16kHz),
        32000 => Ok(SampleRate::Rate32kHz),
        48000 => Ok(SampleRate::Rate48kHz),
        rate => Err(VadcutError::UnsupportedSampleRate { rate }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn rejects_invalid_mode() {
        assert!(WebRtcClassifier::new(16000, 4).is_err());
    }

    #[test]
    fn rejects_unsupported_rate() {
        let result = WebRtcClassifier::new(44100, 3);
        assert!(matches!(
            result,
            Err(VadcutError::UnsupportedSampleRate { rate: 44100 })
        ));
    }

    #[test]
    fn silence_frame_is_not_voice() {
        let mut classifier = WebRtcClassifier::new(16000, 3).unwrap();
        // 30ms at 16kHz
        let frame = bytes_of(&[0i16; 480]);
        assert!(!classifier.classify(&frame, 16000).unwrap());
    }

    #[test]
    fn wrong_frame_length_is_classifier_error() {
        let mut classifier = WebRtcClassifier::new(16000, 3).unwrap();
        // 100 samples is not a 10/20/30ms frame at 16kHz
        let frame = bytes_of(&[0i16; 100]);
        let result = classifier.classify(&frame, 16000);
        assert!(matches!(result, Err(VadcutError::Classifier { .. })));
    }

    #[test]
    fn rate_change_reconfigures_detector() {
        let mut classifier = WebRtcClassifier::new(16000, 2).unwrap();
        // 30ms at 8kHz after starting at 16kHz
        let frame = bytes_of(&[0i16; 240]);
        assert!(!classifier.classify(&frame, 8000).unwrap());
    }

    #[test]
    fn webrtc_classifier_name() {
        let classifier = WebRtcClassifier::new(16000, 3).unwrap();
        assert_eq!(classifier.name(), "webrtc");
    }
}
