//! Output handling for accepted segments.
//!
//! The engine hands each accepted segment to a [`SegmentSink`] as
//! `(index, samples, sample_rate)`; the sink decides what a segment
//! becomes. `WavSink` writes numbered clip files, `CollectorSink` keeps
//! segments in memory for library and test use.

use crate::audio::wav::write_wav_file;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pluggable destination for accepted segments.
///
/// `index` increments only for accepted segments, starting at 0 per source
/// buffer; rejected candidates never reach the sink.
pub trait SegmentSink {
    /// Persists one accepted segment.
    fn write(&mut self, index: usize, samples: &[u8], sample_rate: u32) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Writes each accepted segment as `<stem>-NNN.wav` in a directory.
pub struct WavSink {
    dir: PathBuf,
    stem: String,
}

impl WavSink {
    /// Creates a sink writing into `dir` with the given file stem.
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// Path the given segment index is written to.
    pub fn segment_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}-{:03}.wav", self.stem, index))
    }

    /// Derives a sink for an input file: same stem, clips beside the input
    /// unless an output directory is given.
    pub fn for_input(input: &Path, out_dir: Option<&Path>) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "segment".to_string());
        let dir = out_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir, stem)
    }
}

impl SegmentSink for WavSink {
    fn write(&mut self, index: usize, samples: &[u8], sample_rate: u32) -> Result<()> {
        let path = self.segment_path(index);
        write_wav_file(&path, samples, sample_rate)?;
        info!(path = %path.display(), bytes = samples.len(), "segment written");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "wav"
    }
}

/// Collects accepted segments in memory.
#[derive(Debug, Default)]
pub struct CollectorSink {
    segments: Vec<(usize, Vec<u8>, u32)>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected `(index, samples, sample_rate)` triples, in order.
    pub fn segments(&self) -> &[(usize, Vec<u8>, u32)] {
        &self.segments
    }

    /// Consumes the sink and returns the collected segments.
    pub fn into_segments(self) -> Vec<(usize, Vec<u8>, u32)> {
        self.segments
    }
}

impl SegmentSink for CollectorSink {
    fn write(&mut self, index: usize, samples: &[u8], sample_rate: u32) -> Result<()> {
        self.segments.push((index, samples.to_vec(), sample_rate));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::read_wav_file;

    #[test]
    fn segment_sink_is_object_safe() {
        let _sink: Box<dyn SegmentSink> = Box::new(CollectorSink::new());
    }

    #[test]
    fn collector_sink_keeps_order_and_rates() {
        let mut sink = CollectorSink::new();
        sink.write(0, &[1, 2], 16000).unwrap();
        sink.write(1, &[3, 4], 16000).unwrap();

        let segments = sink.into_segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], (0, vec![1, 2], 16000));
        assert_eq!(segments[1], (1, vec![3, 4], 16000));
    }

    #[test]
    fn wav_sink_writes_numbered_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = WavSink::new(dir.path(), "speaker01");

        let samples: Vec<u8> = [1000i16, -1000, 2000]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        sink.write(0, &samples, 16000).unwrap();
        sink.write(7, &samples, 16000).unwrap();

        let first = dir.path().join("speaker01-000.wav");
        let eighth = dir.path().join("speaker01-007.wav");
        assert!(first.exists());
        assert!(eighth.exists());

        let input = read_wav_file(&first).unwrap();
        assert_eq!(input.samples, samples);
        assert_eq!(input.sample_rate, 16000);
    }

    #[test]
    fn wav_sink_for_input_uses_stem_and_parent() {
        let sink = WavSink::for_input(Path::new("/data/corpus/rec_042.wav"), None);
        assert_eq!(
            sink.segment_path(3),
            PathBuf::from("/data/corpus/rec_042-003.wav")
        );
    }

    #[test]
    fn wav_sink_for_input_honors_out_dir() {
        let sink = WavSink::for_input(
            Path::new("/data/corpus/rec_042.wav"),
            Some(Path::new("/tmp/clips")),
        );
        assert_eq!(
            sink.segment_path(0),
            PathBuf::from("/tmp/clips/rec_042-000.wav")
        );
    }

    #[test]
    fn wav_sink_write_fails_for_missing_directory() {
        let mut sink = WavSink::new("/nonexistent/clips", "x");
        assert!(sink.write(0, &[0, 0], 16000).is_err());
    }

    #[test]
    fn sink_names() {
        assert_eq!(CollectorSink::new().name(), "collector");
        assert_eq!(WavSink::new(".", "x").name(), "wav");
    }
}
