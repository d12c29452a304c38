//! Command-line interface for vadcut
//!
//! Provides argument parsing using clap derive macros.

use crate::config::Config;
use crate::error::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Utterance splitter for speech training corpora
#[derive(Parser, Debug)]
#[command(
    name = "vadcut",
    version,
    about = "Split long recordings into trimmed utterance clips"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input WAV files (mono, 16-bit, 8/16/32/48 kHz)
    #[arg(value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-file results, -vv: engine diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Directory segment files are written to (default: beside each input)
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Frame duration in milliseconds
    #[arg(long, value_name = "MS")]
    pub frame_ms: Option<u32>,

    /// Consecutive voiced frames needed to confirm an utterance onset
    #[arg(long, value_name = "N")]
    pub onset_frames: Option<usize>,

    /// Consecutive silent frames needed to confirm an utterance offset
    #[arg(long, value_name = "N")]
    pub offset_frames: Option<usize>,

    /// Classifier backend (energy, webrtc)
    #[arg(long, value_name = "BACKEND")]
    pub classifier: Option<String>,

    /// RMS threshold for the energy backend (0.0 to 1.0)
    #[arg(long, value_name = "LEVEL")]
    pub energy_threshold: Option<f32>,

    /// WebRTC VAD aggressiveness (0 to 3)
    #[arg(long, value_name = "MODE")]
    pub webrtc_mode: Option<u8>,

    /// Emit a trailing utterance left open when the input ends
    #[arg(long)]
    pub flush: bool,

    /// Files processed in parallel (default: available cores)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the batch summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the full default configuration as TOML
    Dump,
}

impl Cli {
    /// Applies command-line flags on top of a loaded configuration.
    ///
    /// Flags win over both the config file and environment overrides.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(dir) = &self.out_dir {
            config.output.out_dir = Some(dir.clone());
        }
        if let Some(frame_ms) = self.frame_ms {
            config.segmenter.frame_duration_ms = frame_ms;
        }
        if let Some(onset) = self.onset_frames {
            config.segmenter.onset_frames = onset;
        }
        if let Some(offset) = self.offset_frames {
            config.segmenter.offset_frames = offset;
        }
        if let Some(backend) = &self.classifier {
            config.classifier.backend = backend.parse()?;
        }
        if let Some(threshold) = self.energy_threshold {
            config.classifier.energy_threshold = threshold;
        }
        if let Some(mode) = self.webrtc_mode {
            config.classifier.webrtc_mode = mode;
        }
        if self.flush {
            config.output.flush_trailing = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierBackend;

    #[test]
    fn parse_inputs_and_flags() {
        let cli = Cli::parse_from([
            "vadcut",
            "a.wav",
            "b.wav",
            "--out-dir",
            "/tmp/clips",
            "--onset-frames",
            "15",
            "--flush",
            "-j",
            "4",
        ]);

        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.out_dir, Some(PathBuf::from("/tmp/clips")));
        assert_eq!(cli.onset_frames, Some(15));
        assert!(cli.flush);
        assert_eq!(cli.jobs, Some(4));
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cli = Cli::parse_from([
            "vadcut",
            "a.wav",
            "--classifier",
            "energy",
            "--offset-frames",
            "20",
            "--webrtc-mode",
            "1",
        ]);

        let mut config = Config::default();
        cli.apply_overrides(&mut config).unwrap();

        assert_eq!(config.classifier.backend, ClassifierBackend::Energy);
        assert_eq!(config.segmenter.offset_frames, 20);
        assert_eq!(config.classifier.webrtc_mode, 1);
        // Untouched fields keep their defaults
        assert_eq!(config.segmenter.onset_frames, 22);
        assert!(!config.output.flush_trailing);
    }

    #[test]
    fn unknown_classifier_is_an_error() {
        let cli = Cli::parse_from(["vadcut", "a.wav", "--classifier", "silero"]);
        let mut config = Config::default();
        assert!(cli.apply_overrides(&mut config).is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["vadcut", "-vv", "a.wav"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["vadcut", "completions", "bash"]);
        assert!(matches!(cli.command, Some(Commands::Completions { .. })));
    }
}
