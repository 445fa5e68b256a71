use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{output_path, prepare, run_each, ActionReport, VideoAction};
use crate::error::{Result, VideoForgeError};
use crate::files;
use crate::media::{trim_float, MediaProcessorTrait};
use crate::prompt::{ask, AnswerSource, Prompt, PromptKind, Reply};
use crate::steps::StepKind;

/// Change playback speed of video and audio together
pub struct SpeedAdjuster {
    media: Arc<dyn MediaProcessorTrait>,
    min_speed: f64,
    max_speed: f64,
}

impl SpeedAdjuster {
    pub fn new(media: Arc<dyn MediaProcessorTrait>, min_speed: f64, max_speed: f64) -> Self {
        Self { media, min_speed, max_speed }
    }

    fn parse_speed(&self, raw: &str) -> Reply<f64> {
        if raw.is_empty() || raw == "0" {
            return Reply::Cancel;
        }
        match raw.parse::<f64>() {
            Ok(speed) if (self.min_speed..=self.max_speed).contains(&speed) => Reply::Value(speed),
            Ok(_) => Reply::Invalid(format!(
                "speed must be between {} and {}",
                self.min_speed, self.max_speed
            )),
            Err(_) => Reply::Invalid(format!("'{}' is not a number", raw)),
        }
    }
}

#[async_trait]
impl VideoAction for SpeedAdjuster {
    fn name(&self) -> &'static str {
        "Speed adjuster"
    }

    fn kind(&self) -> StepKind {
        StepKind::SpeedAdjuster
    }

    async fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        answers: &mut dyn AnswerSource,
    ) -> Result<ActionReport> {
        let videos = prepare(input_dir, output_dir)?;

        println!("\nPlayback speed (1.0 = unchanged, 0 = cancel)");
        let prompt = Prompt::new(
            PromptKind::SpeedValue,
            format!("Speed ({}-{}):", self.min_speed, self.max_speed),
        );
        let speed = ask(answers, &prompt, |raw| self.parse_speed(raw))?
            .ok_or(VideoForgeError::Cancelled)?;
        info!("Changing speed of {} file(s) to {}x", videos.len(), speed);

        let tag = format!("_speed_{}x", trim_float(speed));
        let media = self.media.as_ref();
        let report = run_each(media, &videos, |video| {
            let output = output_path(output_dir, video, &tag, &files::extension(video));
            Ok((output.clone(), media.commands().change_speed(video, &output, speed)))
        })
        .await;

        report.print_summary(self.name());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::FakeMediaProcessor;
    use crate::prompt::ScriptedAnswers;

    #[tokio::test]
    async fn test_speed_outside_configured_range_is_reprompted() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("clip.mp4"), b"x").unwrap();

        let media = Arc::new(FakeMediaProcessor::new(10.0));
        let action = SpeedAdjuster::new(media.clone(), 0.25, 4.0);
        let mut answers = ScriptedAnswers::new(["0.1", "fast", "2"]);
        let report = action.execute(input.path(), output.path(), &mut answers).await.unwrap();

        assert_eq!(report.outputs, vec![output.path().join("clip_speed_2x.mp4")]);
        let executed = media.executed();
        assert!(executed[0].args.contains(&"setpts=PTS/2".to_string()));
        assert!(executed[0].args.contains(&"atempo=2".to_string()));
    }

    #[tokio::test]
    async fn test_zero_cancels() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("clip.mp4"), b"x").unwrap();

        let action = SpeedAdjuster::new(Arc::new(FakeMediaProcessor::new(10.0)), 0.25, 4.0);
        let mut answers = ScriptedAnswers::new(["0"]);
        let result = action.execute(input.path(), output.path(), &mut answers).await;
        assert!(matches!(result, Err(VideoForgeError::Cancelled)));
    }
}
