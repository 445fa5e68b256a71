use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{choose, output_path, prepare, run_each, ActionReport, MenuChoice, VideoAction};
use crate::error::{Result, VideoForgeError};
use crate::files;
use crate::media::MediaProcessorTrait;
use crate::prompt::{ask, AnswerSource, Prompt, PromptKind, Reply};
use crate::steps::{Dimensions, Resolution, StepKind};

/// Largest custom edge accepted, in pixels
const MAX_EDGE: u32 = 7680;

fn parse_edge(raw: &str) -> Reply<u32> {
    if raw.is_empty() {
        return Reply::Cancel;
    }
    match raw.parse::<u32>() {
        Ok(value) if value > 0 && value <= MAX_EDGE => Reply::Value(value),
        Ok(_) => Reply::Invalid(format!("must be between 1 and {}", MAX_EDGE)),
        Err(_) => Reply::Invalid(format!("'{}' is not a whole number", raw)),
    }
}

/// Rescale videos to a preset or custom frame size
pub struct ResolutionChanger {
    media: Arc<dyn MediaProcessorTrait>,
}

impl ResolutionChanger {
    pub fn new(media: Arc<dyn MediaProcessorTrait>) -> Self {
        Self { media }
    }

    fn select_dimensions(&self, answers: &mut dyn AnswerSource) -> Result<Dimensions> {
        println!("\nTarget resolution:");
        for (i, resolution) in Resolution::ALL.iter().enumerate() {
            println!("{}. {} ({})", i + 1, resolution, resolution.dimensions());
        }
        println!("{}. Custom", Resolution::ALL.len() + 1);

        match choose(answers, PromptKind::ResolutionChoice, &Resolution::ALL, true)? {
            MenuChoice::Preset(resolution) => Ok(resolution.dimensions()),
            MenuChoice::Custom => {
                let width = ask(answers, &Prompt::new(PromptKind::CustomWidth, "Width (px):"), parse_edge)?
                    .ok_or(VideoForgeError::Cancelled)?;
                let height = ask(answers, &Prompt::new(PromptKind::CustomHeight, "Height (px):"), parse_edge)?
                    .ok_or(VideoForgeError::Cancelled)?;
                Ok(Dimensions { width, height })
            }
        }
    }
}

#[async_trait]
impl VideoAction for ResolutionChanger {
    fn name(&self) -> &'static str {
        "Resolution changer"
    }

    fn kind(&self) -> StepKind {
        StepKind::ResolutionChanger
    }

    async fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        answers: &mut dyn AnswerSource,
    ) -> Result<ActionReport> {
        let videos = prepare(input_dir, output_dir)?;
        let size = self.select_dimensions(answers)?;
        info!("Resizing {} file(s) to {}", videos.len(), size);

        let tag = format!("_{}", size);
        let media = self.media.as_ref();
        let report = run_each(media, &videos, |video| {
            let output = output_path(output_dir, video, &tag, &files::extension(video));
            Ok((output.clone(), media.commands().resize(video, &output, size)))
        })
        .await;

        report.print_summary(self.name());
        Ok(report)
    }
}
