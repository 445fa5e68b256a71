use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, VideoForgeError};
use super::{MediaCommand, MediaCommandBuilder, MediaProcessorTrait};

/// ffprobe `-show_entries format=duration -print_format json` output
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse the JSON printed by the duration probe
pub fn parse_probe_duration(json: &str) -> Result<f64> {
    let probe: ProbeOutput = serde_json::from_str(json)?;
    let raw = probe
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| VideoForgeError::Media("ffprobe reported no duration".to_string()))?;

    let duration: f64 = raw
        .trim()
        .parse()
        .map_err(|_| VideoForgeError::Media(format!("Unparseable duration '{}'", raw)))?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(VideoForgeError::Media(format!("Invalid duration {}", duration)));
    }
    Ok(duration)
}

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.ffmpeg_path, &config.ffprobe_path)
            .with_output_options(config.extra_output_options);

        Self { command_builder }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    fn commands(&self) -> &MediaCommandBuilder {
        &self.command_builder
    }

    /// Check if media processor is available
    async fn check_availability(&self) -> Result<()> {
        self.command_builder.version_check().execute().await
            .map_err(|e| VideoForgeError::Media(format!("ffmpeg not available: {}", e)))?;
        self.command_builder.probe_version_check().execute().await
            .map_err(|e| VideoForgeError::Media(format!("ffprobe not available: {}", e)))?;

        info!("Media processor is available");
        Ok(())
    }

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let version_info = self.command_builder.version_check().execute_capture().await?;
        // The first line carries the version
        let first_line = version_info.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }

    async fn probe_duration(&self, video_path: &Path) -> Result<f64> {
        let json = self.command_builder.probe_duration(video_path).execute_capture().await?;
        let duration = parse_probe_duration(&json)?;
        debug!("Duration of {}: {:.3}s", video_path.display(), duration);
        Ok(duration)
    }

    /// Execute media processing command
    async fn execute_command(&self, command: MediaCommand) -> Result<()> {
        info!("Executing: {}", command.description);
        command.execute().await
    }
}
