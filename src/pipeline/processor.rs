use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::StepAnswers;
use crate::actions::{ActionFactory, VideoAction};
use crate::config::Config;
use crate::error::{Result, VideoForgeError};
use crate::files;
use crate::media::MediaProcessorTrait;
use crate::steps::{StepConfig, StepKind};

/// Runs one configured step from `input_dir` into `output_dir`
#[async_trait]
pub trait StepProcessor: Send + Sync {
    fn name(&self) -> &str;

    async fn process(&self, input_dir: &Path, output_dir: &Path, config: &StepConfig) -> Result<()>;
}

/// Drives an interactive action with answers derived from the step config
pub struct DelegatedActionProcessor {
    action: Box<dyn VideoAction>,
}

impl DelegatedActionProcessor {
    pub fn new(action: Box<dyn VideoAction>) -> Self {
        Self { action }
    }
}

#[async_trait]
impl StepProcessor for DelegatedActionProcessor {
    fn name(&self) -> &str {
        self.action.name()
    }

    async fn process(&self, input_dir: &Path, output_dir: &Path, config: &StepConfig) -> Result<()> {
        if config.kind() != self.action.kind() {
            return Err(VideoForgeError::Config(format!(
                "{} cannot run a {} step",
                self.action.name(),
                config.kind()
            )));
        }

        let mut answers = StepAnswers::new(config.clone());
        let report = self.action.execute(input_dir, output_dir, &mut answers).await?;
        debug!("{}: {:?}", self.action.name(), report);

        if report.processed == 0 || report.failed > 0 {
            return Err(VideoForgeError::Media(format!(
                "{} processed {} and failed {} file(s)",
                self.action.name(),
                report.processed,
                report.failed
            )));
        }
        Ok(())
    }
}

/// Runs the speed change as a single explicit ffmpeg command
pub struct DirectFfmpegProcessor {
    media: Arc<dyn MediaProcessorTrait>,
}

impl DirectFfmpegProcessor {
    pub fn new(media: Arc<dyn MediaProcessorTrait>) -> Self {
        Self { media }
    }
}

#[async_trait]
impl StepProcessor for DirectFfmpegProcessor {
    fn name(&self) -> &str {
        "Direct ffmpeg speed change"
    }

    async fn process(&self, input_dir: &Path, output_dir: &Path, config: &StepConfig) -> Result<()> {
        let StepConfig::SpeedAdjuster { speed } = config else {
            return Err(VideoForgeError::Config(format!(
                "{} only handles speed steps, got {}",
                self.name(),
                config.kind()
            )));
        };

        let input = files::list_video_files(input_dir)
            .into_iter()
            .next()
            .ok_or_else(|| VideoForgeError::FileNotFound(format!("No video in {}", input_dir.display())))?;
        let output = output_dir.join(format!("{}_processed.mp4", files::file_stem(&input)));

        info!("Changing speed of {} to {}x", input.display(), speed);
        let command = self.media.commands().change_speed(&input, &output, *speed);
        self.media.execute_command(command).await
    }
}

/// Step processor per step kind
#[derive(Clone, Default)]
pub struct ProcessorTable {
    processors: HashMap<StepKind, Arc<dyn StepProcessor>>,
}

impl ProcessorTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Delegated actions for every kind except the speed change, which runs directly
    pub fn standard(media: Arc<dyn MediaProcessorTrait>, config: &Config) -> Self {
        let mut table = Self::empty();
        for kind in StepKind::ALL {
            let processor: Arc<dyn StepProcessor> = match kind {
                StepKind::SpeedAdjuster => Arc::new(DirectFfmpegProcessor::new(media.clone())),
                _ => Arc::new(DelegatedActionProcessor::new(ActionFactory::create(kind, media.clone(), config))),
            };
            table.processors.insert(kind, processor);
        }
        table
    }

    pub fn with(mut self, kind: StepKind, processor: Arc<dyn StepProcessor>) -> Self {
        self.processors.insert(kind, processor);
        self
    }

    pub fn get(&self, kind: StepKind) -> Option<&Arc<dyn StepProcessor>> {
        self.processors.get(&kind)
    }
}
