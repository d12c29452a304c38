//! WAV container adapter.
//!
//! The engine itself operates on raw PCM byte buffers; this module is the
//! byte-stream boundary to WAV files. Reading validates the format the
//! engine requires (mono, 16-bit, one of the supported rates) and surfaces
//! violations as configuration errors before any frame is processed.

use crate::defaults::SUPPORTED_SAMPLE_RATES;
use crate::error::{Result, VadcutError};
use std::io::{Read, Seek, Write};
use std::path::Path;

/// A decoded WAV payload: raw little-endian PCM bytes plus the sample rate.
#[derive(Debug, Clone)]
pub struct WavInput {
    /// 16-bit signed little-endian mono samples.
    pub samples: Vec<u8>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

/// Read a WAV stream, validating it is mono 16-bit at a supported rate.
pub fn read_wav<R: Read>(reader: R) -> Result<WavInput> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| VadcutError::WavRead {
        message: format!("failed to parse WAV: {}", e),
    })?;

    let spec = wav_reader.spec();

    if spec.channels != 1 {
        return Err(VadcutError::AudioFormatMismatch {
            expected: "1 channel (mono)".to_string(),
            actual: format!("{} channels", spec.channels),
        });
    }
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(VadcutError::AudioFormatMismatch {
            expected: "16-bit signed integer samples".to_string(),
            actual: format!("{}-bit {:?}", spec.bits_per_sample, spec.sample_format),
        });
    }
    if !SUPPORTED_SAMPLE_RATES.contains(&spec.sample_rate) {
        return Err(VadcutError::UnsupportedSampleRate {
            rate: spec.sample_rate,
        });
    }

    let mut samples = Vec::with_capacity(wav_reader.len() as usize * 2);
    for sample in wav_reader.samples::<i16>() {
        let sample = sample.map_err(|e| VadcutError::WavRead {
            message: format!("failed to read WAV samples: {}", e),
        })?;
        samples.extend_from_slice(&sample.to_le_bytes());
    }

    Ok(WavInput {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Read a WAV file from disk.
pub fn read_wav_file(path: &Path) -> Result<WavInput> {
    let file = std::fs::File::open(path)?;
    read_wav(std::io::BufReader::new(file))
}

/// Write raw little-endian PCM bytes as a mono 16-bit WAV stream.
pub fn write_wav<W: Write + Seek>(writer: W, samples: &[u8], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut wav_writer = hound::WavWriter::new(writer, spec).map_err(|e| VadcutError::WavWrite {
        message: format!("failed to create WAV writer: {}", e),
    })?;

    for chunk in samples.chunks_exact(2) {
        let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
        wav_writer
            .write_sample(sample)
            .map_err(|e| VadcutError::WavWrite {
                message: format!("failed to write WAV sample: {}", e),
            })?;
    }

    wav_writer.finalize().map_err(|e| VadcutError::WavWrite {
        message: format!("failed to finalize WAV: {}", e),
    })
}

/// Write raw little-endian PCM bytes as a mono 16-bit WAV file.
pub fn write_wav_file(path: &Path, samples: &[u8], sample_rate: u32) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_wav(std::io::BufWriter::new(file), samples, sample_rate)
}
