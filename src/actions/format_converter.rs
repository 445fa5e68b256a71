use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{choose_preset, output_path, prepare, run_each, ActionReport, VideoAction};
use crate::error::Result;
use crate::media::MediaProcessorTrait;
use crate::prompt::{AnswerSource, PromptKind};
use crate::steps::{OutputFormat, StepKind};

/// Re-encode videos into another container format
pub struct FormatConverter {
    media: Arc<dyn MediaProcessorTrait>,
}

impl FormatConverter {
    pub fn new(media: Arc<dyn MediaProcessorTrait>) -> Self {
        Self { media }
    }

    fn select_format(&self, answers: &mut dyn AnswerSource) -> Result<OutputFormat> {
        println!("\nOutput format:");
        for (i, format) in OutputFormat::ALL.iter().enumerate() {
            println!("{}. {} ({} / {})", i + 1, format, format.video_codec(), format.audio_codec());
        }
        choose_preset(answers, PromptKind::FormatChoice, &OutputFormat::ALL)
    }
}

#[async_trait]
impl VideoAction for FormatConverter {
    fn name(&self) -> &'static str {
        "Format converter"
    }

    fn kind(&self) -> StepKind {
        StepKind::FormatConverter
    }

    async fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        answers: &mut dyn AnswerSource,
    ) -> Result<ActionReport> {
        let videos = prepare(input_dir, output_dir)?;
        let format = self.select_format(answers)?;
        info!("Converting {} file(s) to {}", videos.len(), format);

        let media = self.media.as_ref();
        let report = run_each(media, &videos, |video| {
            let output = output_path(output_dir, video, "", format.extension());
            Ok((output.clone(), media.commands().convert_format(video, &output, format)))
        })
        .await;

        report.print_summary(self.name());
        Ok(report)
    }
}
