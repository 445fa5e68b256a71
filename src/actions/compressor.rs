use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{choose_preset, output_path, prepare, run_each, ActionReport, VideoAction};
use crate::error::Result;
use crate::files;
use crate::media::MediaProcessorTrait;
use crate::prompt::{AnswerSource, PromptKind};
use crate::steps::{Quality, StepKind};

/// Shrink videos with x264 at a chosen quality tier
pub struct Compressor {
    media: Arc<dyn MediaProcessorTrait>,
}

impl Compressor {
    pub fn new(media: Arc<dyn MediaProcessorTrait>) -> Self {
        Self { media }
    }
}

#[async_trait]
impl VideoAction for Compressor {
    fn name(&self) -> &'static str {
        "Compressor"
    }

    fn kind(&self) -> StepKind {
        StepKind::Compressor
    }

    async fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        answers: &mut dyn AnswerSource,
    ) -> Result<ActionReport> {
        let videos = prepare(input_dir, output_dir)?;

        println!("\nCompression level:");
        for (i, quality) in Quality::ALL.iter().enumerate() {
            println!(
                "{}. {} - {} (crf {}, preset {})",
                i + 1,
                quality,
                quality.description(),
                quality.crf(),
                quality.preset()
            );
        }
        let quality = choose_preset(answers, PromptKind::QualityChoice, &Quality::ALL)?;
        info!("Compressing {} file(s) at {} quality", videos.len(), quality);

        let media = self.media.as_ref();
        let report = run_each(media, &videos, |video| {
            let output = output_path(output_dir, video, "_compressed", &files::extension(video));
            Ok((output.clone(), media.commands().compress(video, &output, quality)))
        })
        .await;

        report.print_summary(self.name());
        Ok(report)
    }
}
