use crate::defaults;
use crate::error::{Result, VadcutError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub segmenter: SegmenterSettings,
    pub filter: FilterSettings,
    pub classifier: ClassifierSettings,
    pub output: OutputSettings,
}

/// Frame windowing and state machine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterSettings {
    /// Frame duration in milliseconds.
    pub frame_duration_ms: u32,
    /// Consecutive voiced frames needed to confirm an utterance onset.
    pub onset_frames: usize,
    /// Consecutive silent frames needed to confirm an utterance offset.
    pub offset_frames: usize,
}

/// Post-filter configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterSettings {
    pub silence_mean_threshold: f64,
    pub noise_floor: i16,
    pub debounce_samples: u32,
    pub trim_retention_bytes: usize,
    pub min_trailing_silence_samples: usize,
}

/// Classifier backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierSettings {
    pub backend: ClassifierBackend,
    /// RMS threshold for the energy backend (0.0 to 1.0).
    pub energy_threshold: f32,
    /// Aggressiveness mode for the webrtc backend (0..=3).
    pub webrtc_mode: u8,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory segment files are written to. Defaults to the input's directory.
    pub out_dir: Option<PathBuf>,
    /// Force-emit a pending utterance when input ends without confirmed silence.
    pub flush_trailing: bool,
}

/// Classifier backend enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// RMS energy threshold, always available.
    Energy,
    /// WebRTC VAD, requires the `webrtc` feature.
    #[default]
    Webrtc,
}

impl FromStr for ClassifierBackend {
    type Err = VadcutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "energy" => Ok(Self::Energy),
            "webrtc" => Ok(Self::Webrtc),
            other => Err(VadcutError::ConfigInvalidValue {
                key: "classifier.backend".to_string(),
                message: format!("unknown backend '{}' (expected energy or webrtc)", other),
            }),
        }
    }
}

impl std::fmt::Display for ClassifierBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Energy => write!(f, "energy"),
            Self::Webrtc => write!(f, "webrtc"),
        }
    }
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self {
            frame_duration_ms: defaults::FRAME_DURATION_MS,
            onset_frames: defaults::ONSET_FRAMES,
            offset_frames: defaults::OFFSET_FRAMES,
        }
    }
}

impl Default for FilterSettings {
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

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            energy_threshold: defaults::ENERGY_THRESHOLD,
            webrtc_mode: defaults::WEBRTC_MODE,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            out_dir: None,
            flush_trailing: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VADCUT_OUT_DIR → output.out_dir
    /// - VADCUT_CLASSIFIER → classifier.backend
    /// - VADCUT_ENERGY_THRESHOLD → classifier.energy_threshold
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("VADCUT_OUT_DIR")
            && !dir.is_empty()
        {
            self.output.out_dir = Some(PathBuf::from(dir));
        }

        if let Ok(backend) = std::env::var("VADCUT_CLASSIFIER")
            && let Ok(parsed) = backend.parse()
        {
            self.classifier.backend = parsed;
        }

        if let Ok(threshold) = std::env::var("VADCUT_ENERGY_THRESHOLD")
            && let Ok(parsed) = threshold.parse()
        {
            self.classifier.energy_threshold = parsed;
        }

        self
    }

    /// Validate configuration values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.segmenter.frame_duration_ms == 0 {
            return Err(VadcutError::ConfigInvalidValue {
                key: "segmenter.frame_duration_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.segmenter.offset_frames == 0 {
            return Err(VadcutError::ConfigInvalidValue {
                key: "segmenter.offset_frames".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.classifier.energy_threshold) {
            return Err(VadcutError::ConfigInvalidValue {
                key: "classifier.energy_threshold".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if self.classifier.webrtc_mode > 3 {
            return Err(VadcutError::ConfigInvalidValue {
                key: "classifier.webrtc_mode".to_string(),
                message: "must be between 0 and 3".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/vadcut/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vadcut")
            .join("config.toml")
    }

    /// Render the full default configuration as annotated TOML.
    pub fn dump_template() -> String {
        toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# failed to render default config\n"))
    }
}
