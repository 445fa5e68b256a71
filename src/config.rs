use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, VideoForgeError};

fn default_output_suffix() -> String {
    "_combo_processed".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media: MediaConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub speed: SpeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// Options appended to every re-encoding command, right before the output path
    /// Common options: ["-pix_fmt", "yuv420p", "-movflags", "+faststart"]
    #[serde(default)]
    pub extra_output_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Suffix added to the final artifact of a combo run
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
    /// Directory under which the scratch arena is created (system temp dir if unset)
    #[serde(default)]
    pub scratch_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedConfig {
    /// Slowest speed accepted by the standalone speed adjuster
    pub min: f64,
    /// Fastest speed accepted by the standalone speed adjuster
    pub max: f64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            extra_output_options: vec![
                // "-pix_fmt".to_string(), "yuv420p".to_string(),
            ],
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_suffix: default_output_suffix(),
            scratch_root: None,
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self { min: 0.25, max: 4.0 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig::default(),
            pipeline: PipelineConfig::default(),
            speed: SpeedConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VideoForgeError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| VideoForgeError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VideoForgeError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| VideoForgeError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.speed.min <= 0.0 || self.speed.min > self.speed.max {
            return Err(VideoForgeError::Config(format!(
                "Invalid speed range [{}, {}]",
                self.speed.min, self.speed.max
            )));
        }
        if self.pipeline.output_suffix.is_empty() {
            return Err(VideoForgeError::Config("output_suffix must not be empty".to_string()));
        }
        Ok(())
    }
}
