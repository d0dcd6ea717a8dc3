//! Configuration types for nvgrab
//!
//! Capture and encoder options plus optional TOML file loading from
//! `~/.config/nvgrab/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{NvgrabError, Result};

/// Hardware encoder candidates probed in priority order.
///
/// Not every GPU supports every codec (AV1 needs RTX 40 series or newer),
/// so selection walks this list and takes the first available encoder.
pub const DEFAULT_ENCODER_PRIORITIES: [&str; 3] = ["av1_nvenc", "hevc_nvenc", "h264_nvenc"];

/// Screen capture options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOptions {
    /// Target capture frame rate
    #[serde(default = "default_framerate")]
    pub framerate: u32,

    /// Fixed capture resolution (width, height); None lets the backend decide
    #[serde(default)]
    pub capture_size: Option<(u32, u32)>,

    /// Source identifier passed to the capture backend
    /// (display string on X11, window name on gdigrab)
    #[serde(default = "default_source")]
    pub source: String,

    /// Capture backend override; None uses the platform default
    #[serde(default)]
    pub backend: Option<String>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            framerate: default_framerate(),
            capture_size: None,
            source: default_source(),
            backend: None,
        }
    }
}

impl CaptureOptions {
    /// Backend identifier to open, honoring the override
    pub fn backend_name(&self) -> &str {
        self.backend.as_deref().unwrap_or_else(|| default_backend())
    }
}

/// Platform-default FFmpeg capture backend
pub fn default_backend() -> &'static str {
    if cfg!(target_os = "windows") {
        "gdigrab"
    } else if cfg!(target_os = "macos") {
        "avfoundation"
    } else {
        "x11grab"
    }
}

fn default_source() -> String {
    if cfg!(target_os = "windows") {
        "desktop".to_string()
    } else if cfg!(target_os = "macos") {
        // avfoundation device index for the main screen
        "1:none".to_string()
    } else {
        std::env::var("DISPLAY").unwrap_or_else(|_| ":0.0".to_string())
    }
}

fn default_framerate() -> u32 {
    30
}

/// Hardware encoder options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderOptions {
    /// Encoder names probed in priority order
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Encoder preset, passed through as an opaque option
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Encoder profile, passed through as an opaque option
    #[serde(default = "default_profile")]
    pub profile: String,

    /// GPU index, passed through as an opaque option
    #[serde(default = "default_gpu")]
    pub gpu: String,

    /// Target bitrate in bits per second
    #[serde(default = "default_bitrate")]
    pub bitrate: usize,

    /// Keyframe interval in frames
    #[serde(default = "default_gop_size")]
    pub gop_size: u32,

    /// Maximum consecutive B-frames
    #[serde(default = "default_max_b_frames")]
    pub max_b_frames: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            preset: default_preset(),
            profile: default_profile(),
            gpu: default_gpu(),
            bitrate: default_bitrate(),
            gop_size: default_gop_size(),
            max_b_frames: default_max_b_frames(),
        }
    }
}

fn default_candidates() -> Vec<String> {
    DEFAULT_ENCODER_PRIORITIES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_preset() -> String {
    "fast".to_string()
}

fn default_profile() -> String {
    "main".to_string()
}

fn default_gpu() -> String {
    "0".to_string()
}

fn default_bitrate() -> usize {
    4_000_000
}

fn default_gop_size() -> u32 {
    10
}

fn default_max_b_frames() -> usize {
    2
}

/// Full capture session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Capture options
    #[serde(default)]
    pub capture: CaptureOptions,

    /// Encoder options
    #[serde(default)]
    pub encoder: EncoderOptions,

    /// Output file path; None delivers packets to the in-process handler
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl CaptureConfig {
    /// Validate configuration invariants before session setup
    pub fn validate(&self) -> Result<()> {
        if self.capture.framerate == 0 {
            return Err(NvgrabError::config("framerate must be positive"));
        }
        if self.encoder.candidates.is_empty() {
            return Err(NvgrabError::config("encoder candidate list is empty"));
        }
        if let Some((w, h)) = self.capture.capture_size {
            if w == 0 || h == 0 {
                return Err(NvgrabError::config("capture size must be non-zero"));
            }
        }
        Ok(())
    }
}

/// Configuration file wrapper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Capture settings
    #[serde(default)]
    pub capture: CaptureOptions,

    /// Encoder settings
    #[serde(default)]
    pub encoder: EncoderOptions,
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("nvgrab").join("config.toml")
        } else {
            PathBuf::from("/etc/nvgrab/config.toml")
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| NvgrabError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| NvgrabError::Config(format!("Failed to parse config file: {}", e)))?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load from the default path, logging and falling back on error
    pub fn load_or_default() -> Self {
        match Self::load_from(Self::default_path()) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config file: {}, using defaults", e);
                Self::default()
            }
        }
    }
}

/// Generate a sample configuration file
pub fn sample_config() -> String {
    r#"# nvgrab configuration

[capture]
# Capture frame rate
framerate = 30

# Fixed capture resolution (omit to let the backend decide)
# capture_size = [1920, 1080]

# Source identifier (X11 display, gdigrab window name, ...)
# source = ":0.0"

# Capture backend override (x11grab, gdigrab, avfoundation)
# backend = "x11grab"

[encoder]
# Encoder names probed in priority order
candidates = ["av1_nvenc", "hevc_nvenc", "h264_nvenc"]

# NVENC preset and profile, passed through unchanged
preset = "fast"
profile = "main"

# GPU index
gpu = "0"

# Bitrate in bits per second
bitrate = 4000000

# Keyframe interval in frames
gop_size = 10

# Maximum consecutive B-frames
max_b_frames = 2
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = EncoderOptions::default();
        assert_eq!(opts.candidates, DEFAULT_ENCODER_PRIORITIES.to_vec());
        assert_eq!(opts.bitrate, 4_000_000);
        assert_eq!(opts.gop_size, 10);
        assert_eq!(opts.max_b_frames, 2);
    }

    #[test]
    fn test_sample_config_parses() {
        let config: ConfigFile = toml::from_str(&sample_config()).unwrap();
        assert_eq!(config.capture.framerate, 30);
        assert_eq!(config.encoder.preset, "fast");
        assert_eq!(config.encoder.candidates.len(), 3);
    }

    #[test]
    fn test_validate_rejects_zero_framerate() {
        let mut config = CaptureConfig::default();
        config.capture.framerate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_candidates() {
        let mut config = CaptureConfig::default();
        config.encoder.candidates.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_override() {
        let mut opts = CaptureOptions::default();
        assert_eq!(opts.backend_name(), default_backend());
        opts.backend = Some("kmsgrab".to_string());
        assert_eq!(opts.backend_name(), "kmsgrab");
    }
}
