// Modular media processing architecture
//
// This module provides a clean abstraction over media processing operations:
// - Processor: ffmpeg/ffprobe backed implementation of MediaProcessorTrait
// - Commands: Command builders and abstractions

pub mod commands;
pub mod processor;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Builder for the commands this processor can execute
    fn commands(&self) -> &MediaCommandBuilder;

    /// Check if ffmpeg and ffprobe are available
    async fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;

    /// Duration of a media file in seconds
    async fn probe_duration(&self, video_path: &Path) -> Result<f64>;

    /// Execute a media processing command
    async fn execute_command(&self, command: MediaCommand) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Arc<dyn MediaProcessorTrait> {
        Arc::new(processor::MediaProcessorImpl::new(config))
    }
}
