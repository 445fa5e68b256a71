use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{Result, VideoForgeError};
use super::{MediaCommand, MediaCommandBuilder, MediaProcessorTrait};

/// In-memory media processor: records commands and writes a small file at
/// the output path instead of running ffmpeg.
pub struct FakeMediaProcessor {
    builder: MediaCommandBuilder,
    duration: f64,
    fail_on: Option<String>,
    executed: Mutex<Vec<MediaCommand>>,
}

impl FakeMediaProcessor {
    pub fn new(duration: f64) -> Self {
        Self {
            builder: MediaCommandBuilder::new("ffmpeg", "ffprobe"),
            duration,
            fail_on: None,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Fail every command with an argument containing `pattern`
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_on = Some(pattern.to_string());
        self
    }

    pub fn executed(&self) -> Vec<MediaCommand> {
        self.executed.lock().map(|cmds| cmds.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MediaProcessorTrait for FakeMediaProcessor {
    fn commands(&self) -> &MediaCommandBuilder {
        &self.builder
    }

    async fn check_availability(&self) -> Result<()> {
        Ok(())
    }

    async fn get_version_info(&self) -> Result<String> {
        Ok("ffmpeg version fake".to_string())
    }

    async fn probe_duration(&self, _video_path: &Path) -> Result<f64> {
        Ok(self.duration)
    }

    async fn execute_command(&self, command: MediaCommand) -> Result<()> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(command.clone());
        }

        if let Some(pattern) = &self.fail_on {
            if command.args.iter().any(|arg| arg.contains(pattern.as_str())) {
                return Err(VideoForgeError::Media(format!("{} failed", command.description)));
            }
        }

        if let Some(output) = command.args.last() {
            std::fs::write(output, b"fake video")?;
        }
        Ok(())
    }
}
