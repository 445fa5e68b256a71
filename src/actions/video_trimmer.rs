use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::{choose_preset, output_path, prepare, ActionReport, VideoAction};
use crate::error::{Result, VideoForgeError};
use crate::files;
use crate::media::{trim_float, MediaProcessorTrait};
use crate::prompt::{ask, confirm, AnswerSource, Prompt, PromptKind, Reply};
use crate::steps::{StepKind, TrimDirection};

/// Cut a number of seconds from the start or the end of each video
pub struct VideoTrimmer {
    media: Arc<dyn MediaProcessorTrait>,
}

impl VideoTrimmer {
    pub fn new(media: Arc<dyn MediaProcessorTrait>) -> Self {
        Self { media }
    }

    /// Seconds are checked against the duration of the first video
    fn ask_seconds(&self, answers: &mut dyn AnswerSource, reference_duration: f64) -> Result<f64> {
        let prompt = Prompt::new(
            PromptKind::TrimSeconds,
            format!("Seconds to cut (0-{:.1}):", reference_duration),
        );
        let seconds = ask(answers, &prompt, |raw| {
            if raw.is_empty() {
                return Reply::Cancel;
            }
            match raw.parse::<f64>() {
                Ok(s) if s > 0.0 && s < reference_duration => Reply::Value(s),
                Ok(_) => Reply::Invalid(format!(
                    "seconds must be greater than 0 and less than {:.1}",
                    reference_duration
                )),
                Err(_) => Reply::Invalid(format!("'{}' is not a number", raw)),
            }
        })?;
        seconds.ok_or(VideoForgeError::Cancelled)
    }

    async fn trim_one(&self, video: &Path, output_dir: &Path, direction: TrimDirection, seconds: f64) -> Result<PathBuf> {
        let duration = self.media.probe_duration(video).await?;
        if seconds >= duration {
            return Err(VideoForgeError::Media(format!(
                "cannot cut {}s from a {:.1}s video",
                trim_float(seconds),
                duration
            )));
        }

        let tag = format!("_trimmed_{}_{}s", direction.key(), seconds.trunc() as u64);
        let output = output_path(output_dir, video, &tag, &files::extension(video));
        let command = match direction {
            TrimDirection::Start => self.media.commands().trim_start(video, &output, seconds),
            TrimDirection::End => self.media.commands().trim_to_duration(video, &output, duration - seconds),
        };
        self.media.execute_command(command).await?;

        if !output.exists() {
            return Err(VideoForgeError::FileNotFound(output.display().to_string()));
        }
        println!("  {:.1}s -> {:.1}s", duration, duration - seconds);
        Ok(output)
    }
}

#[async_trait]
impl VideoAction for VideoTrimmer {
    fn name(&self) -> &'static str {
        "Video trimmer"
    }

    fn kind(&self) -> StepKind {
        StepKind::VideoTrimmer
    }

    async fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        answers: &mut dyn AnswerSource,
    ) -> Result<ActionReport> {
        let videos = prepare(input_dir, output_dir)?;

        println!("\nTrim from:");
        println!("1. Start of the video");
        println!("2. End of the video");
        let direction = choose_preset(answers, PromptKind::TrimDirection, &TrimDirection::ALL)?;

        let reference = self.media.probe_duration(&videos[0]).await?;
        println!("Duration of {}: {:.1}s", videos[0].display(), reference);
        let seconds = self.ask_seconds(answers, reference)?;

        if !confirm(answers, &format!("Cut {}s from the {} of {} file(s)?", trim_float(seconds), direction, videos.len()))? {
            return Err(VideoForgeError::Cancelled);
        }
        info!("Trimming {}s from the {} of {} file(s)", seconds, direction, videos.len());

        let mut report = ActionReport::default();
        for (i, video) in videos.iter().enumerate() {
            println!("\n[{}/{}] {}", i + 1, videos.len(), video.display());
            match self.trim_one(video, output_dir, direction, seconds).await {
                Ok(output) => {
                    println!("  Done: {}", output.display());
                    report.record_success(output);
                }
                Err(e) => {
                    warn!("Failed to trim {}: {}", video.display(), e);
                    println!("  Failed: {}", e);
                    report.record_failure();
                }
            }
        }

        report.print_summary(self.name());
        Ok(report)
    }
}
