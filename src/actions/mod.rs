//! Interactive video actions
//!
//! Each action lists the videos directly inside an input directory, asks its
//! questions through an [`AnswerSource`], then runs one ffmpeg command per
//! file. The same actions back the standalone subcommands and the delegated
//! steps of the combo pipeline.

pub mod compressor;
pub mod filter_applier;
pub mod format_converter;
pub mod resolution_changer;
pub mod speed_adjuster;
pub mod video_trimmer;
pub mod voice_changer;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub use compressor::Compressor;
pub use filter_applier::FilterApplier;
pub use format_converter::FormatConverter;
pub use resolution_changer::ResolutionChanger;
pub use speed_adjuster::SpeedAdjuster;
pub use video_trimmer::VideoTrimmer;
pub use voice_changer::VoiceChanger;

use crate::config::Config;
use crate::error::{Result, VideoForgeError};
use crate::files;
use crate::media::{MediaCommand, MediaProcessorTrait};
use crate::prompt::{ask, AnswerSource, Prompt, PromptKind, Reply};
use crate::steps::StepKind;

/// Outcome of one action over a directory
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActionReport {
    pub processed: usize,
    pub failed: usize,
    pub outputs: Vec<PathBuf>,
}

impl ActionReport {
    pub fn record_success(&mut self, output: PathBuf) {
        self.processed += 1;
        self.outputs.push(output);
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> usize {
        self.processed + self.failed
    }

    pub fn print_summary(&self, action: &str) {
        println!("\n{} finished", action);
        println!("  Succeeded: {}/{}", self.processed, self.total());
        println!("  Failed:    {}/{}", self.failed, self.total());
    }
}

/// An interactive operation over every video in a directory
#[async_trait]
pub trait VideoAction: Send + Sync {
    /// Display name of the action
    fn name(&self) -> &'static str;

    fn kind(&self) -> StepKind;

    async fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        answers: &mut dyn AnswerSource,
    ) -> Result<ActionReport>;
}

/// Factory for action instances
pub struct ActionFactory;

impl ActionFactory {
    pub fn create(kind: StepKind, media: Arc<dyn MediaProcessorTrait>, config: &Config) -> Box<dyn VideoAction> {
        match kind {
            StepKind::FormatConverter => Box::new(FormatConverter::new(media)),
            StepKind::Compressor => Box::new(Compressor::new(media)),
            StepKind::SpeedAdjuster => Box::new(SpeedAdjuster::new(media, config.speed.min, config.speed.max)),
            StepKind::ResolutionChanger => Box::new(ResolutionChanger::new(media)),
            StepKind::FilterApplier => Box::new(FilterApplier::new(media)),
            StepKind::VoiceChanger => Box::new(VoiceChanger::new(media)),
            StepKind::VideoTrimmer => Box::new(VideoTrimmer::new(media)),
        }
    }
}

/// Validate the folders and list the videos to work on
pub fn prepare(input_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(VideoForgeError::FileNotFound(format!(
            "Input directory does not exist: {}",
            input_dir.display()
        )));
    }
    std::fs::create_dir_all(output_dir)?;

    let videos = files::list_video_files(input_dir);
    if videos.is_empty() {
        return Err(VideoForgeError::FileNotFound(format!(
            "No video files found in {}",
            input_dir.display()
        )));
    }
    println!("Found {} video file(s)", videos.len());
    Ok(videos)
}

/// Answer to a numbered action menu
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuChoice<T> {
    Preset(T),
    Custom,
}

/// Ask for an entry of a numbered menu whose options were already printed.
///
/// "0" cancels the action; a trailing custom entry is offered when
/// `with_custom` is set.
pub fn choose<T: Copy>(
    answers: &mut dyn AnswerSource,
    kind: PromptKind,
    options: &[T],
    with_custom: bool,
) -> Result<MenuChoice<T>> {
    let last = options.len() + usize::from(with_custom);
    println!("0. Cancel");

    let prompt = Prompt::new(kind, format!("Choose (0-{}):", last));
    let choice = ask(answers, &prompt, |raw| match raw.parse::<usize>() {
        Ok(0) => Reply::Cancel,
        Ok(n) if n <= options.len() => Reply::Value(MenuChoice::Preset(options[n - 1])),
        Ok(n) if with_custom && n == last => Reply::Value(MenuChoice::Custom),
        _ => Reply::Invalid(format!("choose a number between 0 and {}", last)),
    })?;

    choice.ok_or(VideoForgeError::Cancelled)
}

/// [`choose`] for menus without a custom entry
pub fn choose_preset<T: Copy>(answers: &mut dyn AnswerSource, kind: PromptKind, options: &[T]) -> Result<T> {
    match choose(answers, kind, options, false)? {
        MenuChoice::Preset(value) => Ok(value),
        MenuChoice::Custom => Err(VideoForgeError::InvalidChoice("no custom entry".to_string())),
    }
}

/// Run one planned command per video, collecting the outcome.
///
/// A failed plan or command fails that file only.
pub async fn run_each<F>(
    media: &dyn MediaProcessorTrait,
    videos: &[PathBuf],
    mut plan: F,
) -> ActionReport
where
    F: FnMut(&Path) -> Result<(PathBuf, MediaCommand)> + Send,
{
    let mut report = ActionReport::default();

    for (i, video) in videos.iter().enumerate() {
        println!("\n[{}/{}] {}", i + 1, videos.len(), video.display());
        println!("  Size: {:.2} MB", files::size_mb(video));

        let outcome = match plan(video) {
            Ok((output, command)) => media.execute_command(command).await.map(|_| output),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(output) if output.exists() => {
                println!("  Done: {} ({:.2} MB)", output.display(), files::size_mb(&output));
                info!("Wrote {}", output.display());
                report.record_success(output);
            }
            Ok(output) => {
                warn!("No output produced for {}: {} is missing", video.display(), output.display());
                println!("  Failed: no output file");
                report.record_failure();
            }
            Err(e) => {
                warn!("Failed to process {}: {}", video.display(), e);
                println!("  Failed: {}", e);
                report.record_failure();
            }
        }
    }

    report
}

/// Output path `<output_dir>/<stem><tag>.<ext>`, never equal to the input
pub fn output_path(output_dir: &Path, input: &Path, tag: &str, ext: &str) -> PathBuf {
    let stem = files::file_stem(input);
    let candidate = output_dir.join(format!("{}{}.{}", stem, tag, ext));
    if candidate == input {
        output_dir.join(format!("{}{}_out.{}", stem, tag, ext))
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::FakeMediaProcessor;
    use crate::prompt::ScriptedAnswers;

    #[test]
    fn test_prepare_requires_videos() {
        let input = tempfile::tempdir().unwrap();
        let output = input.path().join("out");
        assert!(matches!(prepare(input.path(), &output), Err(VideoForgeError::FileNotFound(_))));
        assert!(output.is_dir());

        std::fs::write(input.path().join("a.mp4"), b"x").unwrap();
        assert_eq!(prepare(input.path(), &output).unwrap().len(), 1);
    }

    #[test]
    fn test_choose_handles_cancel_and_custom() {
        let options = [10, 20, 30];
        let mut answers = ScriptedAnswers::new(["2", "4", "0", "7", "3"]);
        assert_eq!(choose(&mut answers, PromptKind::FilterChoice, &options, true).unwrap(), MenuChoice::Preset(20));
        assert_eq!(choose(&mut answers, PromptKind::FilterChoice, &options, true).unwrap(), MenuChoice::Custom);
        assert!(matches!(
            choose(&mut answers, PromptKind::FilterChoice, &options, true),
            Err(VideoForgeError::Cancelled)
        ));
        // "7" is out of range and re-prompted
        assert_eq!(choose(&mut answers, PromptKind::FilterChoice, &options, false).unwrap(), MenuChoice::Preset(30));
    }

    #[test]
    fn test_output_path_never_overwrites_input() {
        let dir = Path::new("/videos");
        assert_eq!(output_path(dir, Path::new("/in/a.mov"), "", "mp4"), PathBuf::from("/videos/a.mp4"));
        assert_eq!(output_path(dir, Path::new("/videos/a.mp4"), "", "mp4"), PathBuf::from("/videos/a_out.mp4"));
    }

    #[tokio::test]
    async fn test_run_each_counts_failures_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.mp4");
        let bad = dir.path().join("bad.mp4");
        std::fs::write(&good, b"x").unwrap();
        std::fs::write(&bad, b"x").unwrap();

        let media = FakeMediaProcessor::new(10.0).failing_on("bad.mp4");
        let out_dir = dir.path().join("out");
        std::fs::create_dir_all(&out_dir).unwrap();

        let videos = vec![bad.clone(), good.clone()];
        let report = run_each(&media, &videos, |video| {
            let output = output_path(&out_dir, video, "_compressed", "mp4");
            let command = media.commands().compress(video, &output, crate::steps::Quality::Low);
            Ok((output, command))
        })
        .await;

        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.outputs, vec![out_dir.join("good_compressed.mp4")]);
    }
}
