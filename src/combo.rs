//! Combo controller: build a step list interactively, then run it over
//! every video of a directory.

use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::configurator::StepConfigurator;
use crate::error::{Result, VideoForgeError};
use crate::files;
use crate::pipeline::{PipelineExecutor, ProcessorTable, ScratchArena};
use crate::prompt::{confirm, AnswerSource, Prompt, PromptKind};
use crate::selector::{FunctionSelector, MenuCommand};
use crate::steps::SelectedStep;

/// Outcome of a combo run
#[derive(Debug, Clone)]
pub struct ComboSummary {
    pub succeeded: Vec<PathBuf>,
    /// Input video and the reason it failed
    pub failed: Vec<(PathBuf, String)>,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl ComboSummary {
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn print(&self) {
        let elapsed = self.finished_at - self.started_at;
        println!("\n{}", "=".repeat(60));
        println!("Combo processing finished");
        println!("  Succeeded: {}", self.succeeded_count());
        println!("  Failed:    {}", self.failed_count());
        println!("  Output:    {}", self.output_dir.display());
        println!(
            "  Started {} / finished {} ({}s)",
            self.started_at.format("%H:%M:%S"),
            self.finished_at.format("%H:%M:%S"),
            elapsed.num_seconds()
        );
        for (video, reason) in &self.failed {
            println!("  x {}: {}", video.display(), reason);
        }
        println!("{}", "=".repeat(60));
    }
}

pub struct ComboController {
    executor: PipelineExecutor,
    configurator: StepConfigurator,
    scratch_root: Option<PathBuf>,
}

impl ComboController {
    pub fn new(processors: ProcessorTable, config: &PipelineConfig) -> Self {
        Self {
            executor: PipelineExecutor::new(processors, config.output_suffix.clone()),
            configurator: StepConfigurator::new(),
            scratch_root: config.scratch_root.clone(),
        }
    }

    /// Interactive step selection; `None` when the user cancels
    pub fn select_steps(&self, answers: &mut dyn AnswerSource) -> Result<Option<Vec<SelectedStep>>> {
        let mut selector = FunctionSelector::new();

        loop {
            if selector.list_available().is_empty() {
                println!("\nAll steps have been selected");
                break;
            }
            if selector.has_steps() {
                println!("{}", selector.render_selected());
            }
            println!("{}", selector.render_available());

            let answer = answers.next_answer(&Prompt::new(PromptKind::StepMenu, "Choose a step:"))?;
            match selector.interpret(&answer) {
                Ok(MenuCommand::Done) if selector.has_steps() => break,
                Ok(MenuCommand::Done) => println!("Select at least one step first"),
                Ok(MenuCommand::Cancel) => {
                    selector.clear();
                    println!("Selection cancelled");
                    return Ok(None);
                }
                Ok(MenuCommand::Pick(kind)) => {
                    if let Some(step) = self.configurator.configure(kind, answers)? {
                        println!("Added: {}", step.summary);
                        if let Err(e) = selector.add(step) {
                            println!("{}", e);
                        }
                    }
                }
                Err(e) => println!("{}", e),
            }
        }

        Ok(Some(selector.into_steps()))
    }

    /// Select steps, confirm, then process every video directly inside `input_dir`
    pub async fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        answers: &mut dyn AnswerSource,
    ) -> Result<ComboSummary> {
        if !input_dir.is_dir() {
            return Err(VideoForgeError::FileNotFound(format!(
                "Input directory does not exist: {}",
                input_dir.display()
            )));
        }
        let videos = files::list_video_files(input_dir);
        if videos.is_empty() {
            return Err(VideoForgeError::FileNotFound(format!(
                "No video files found in {}",
                input_dir.display()
            )));
        }

        println!("\nCOMBO PROCESSING");
        println!("Found {} video file(s) in {}", videos.len(), input_dir.display());

        let steps = self.select_steps(answers)?.ok_or(VideoForgeError::Cancelled)?;

        println!("\nPipeline ({} steps):", steps.len());
        for (i, step) in steps.iter().enumerate() {
            println!("  {}. {} - {}", i + 1, step.descriptor().display_name, step.summary);
        }
        println!("Videos: {}", videos.len());
        println!("Output: {}", output_dir.display());
        if !confirm(answers, "Start processing?")? {
            return Err(VideoForgeError::Cancelled);
        }

        std::fs::create_dir_all(output_dir)?;
        let arena = ScratchArena::create(self.scratch_root.as_deref())?;
        let started_at = Local::now();
        info!("Combo run of {} step(s) over {} video(s)", steps.len(), videos.len());

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut produced: HashSet<PathBuf> = HashSet::new();
        for (m, video) in videos.iter().enumerate() {
            println!("\n[{}/{}] {}", m + 1, videos.len(), video.display());

            let outcome = match arena.video_scope(m + 1) {
                Ok(scratch) => {
                    self.executor
                        .process_video_avoiding(video, &steps, output_dir, &scratch, &produced)
                        .await
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(path) => {
                    println!("  Done: {}", path.display());
                    produced.insert(path.clone());
                    succeeded.push(path);
                }
                Err(e) => {
                    error!("Combo processing of {} failed: {}", video.display(), e);
                    println!("  Failed: {}", e);
                    failed.push((video.clone(), e.to_string()));
                }
            }
        }

        if let Err(e) = arena.close() {
            warn!("Failed to remove scratch arena: {}", e);
        }

        let summary = ComboSummary {
            succeeded,
            failed,
            output_dir: output_dir.to_path_buf(),
            started_at,
            finished_at: Local::now(),
        };
        summary.print();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::media::testing::FakeMediaProcessor;
    use crate::media::MediaCommand;
    use crate::prompt::ScriptedAnswers;
    use crate::steps::{StepConfig, StepKind};
    use std::sync::Arc;

    fn controller() -> ComboController {
        ComboController::new(ProcessorTable::empty(), &PipelineConfig::default())
    }

    #[test]
    fn test_select_steps_in_order() {
        // speed preset 1.5x, then format mkv, then done
        let mut answers = ScriptedAnswers::new(["3", "2", "1", "4", "0"]);
        let steps = controller().select_steps(&mut answers).unwrap().unwrap();
        let kinds: Vec<StepKind> = steps.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StepKind::SpeedAdjuster, StepKind::FormatConverter]);
        assert_eq!(steps[0].config, StepConfig::SpeedAdjuster { speed: 1.5 });
    }

    #[test]
    fn test_duplicate_pick_is_reprompted() {
        let mut answers = ScriptedAnswers::new(["2", "1", "2", "0"]);
        let steps = controller().select_steps(&mut answers).unwrap().unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(answers.remaining(), 0);
    }

    #[test]
    fn test_done_without_steps_keeps_asking() {
        let mut answers = ScriptedAnswers::new(["0", "9"]);
        assert!(controller().select_steps(&mut answers).unwrap().is_none());
    }

    #[test]
    fn test_rejected_configuration_is_not_added() {
        // format menu answered out of range, then done is refused, then cancel
        let mut answers = ScriptedAnswers::new(["1", "8", "0", "9"]);
        assert!(controller().select_steps(&mut answers).unwrap().is_none());
    }

    fn has_pair(commands: &[MediaCommand], flag: &str, value: &str) -> bool {
        commands
            .iter()
            .any(|cmd| cmd.args.windows(2).any(|w| w[0] == flag && w[1] == value))
    }

    async fn run_standard(video: &str, script: &[&str]) -> (ComboSummary, Vec<MediaCommand>, tempfile::TempDir) {
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("input");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join(video), b"source video").unwrap();

        let media = Arc::new(FakeMediaProcessor::new(30.0));
        let config = Config::default();
        let pipeline = PipelineConfig {
            scratch_root: Some(work.path().join("scratch")),
            ..config.pipeline.clone()
        };
        let controller = ComboController::new(ProcessorTable::standard(media.clone(), &config), &pipeline);

        let mut answers = ScriptedAnswers::new(script.iter().copied());
        let summary = controller
            .execute(&input, &work.path().join("output"), &mut answers)
            .await
            .unwrap();
        (summary, media.executed(), work)
    }

    #[tokio::test]
    async fn test_format_then_speed_through_standard_processors() {
        // format -> MP4, speed -> 1.5x, done, confirm
        let (summary, commands, work) = run_standard("clip.mp4", &["1", "1", "3", "2", "0", "y"]).await;

        assert_eq!(summary.succeeded_count(), 1);
        assert_eq!(summary.failed_count(), 0);
        assert!(work.path().join("output").join("clip_combo_processed.mp4").exists());
        assert_eq!(commands.len(), 2);
        assert!(has_pair(&commands, "-c:v", "libx264"));
        assert!(has_pair(&commands, "-filter:v", "setpts=PTS/1.5"));
        assert!(has_pair(&commands, "-filter:a", "atempo=1.5"));
        assert_eq!(std::fs::read_dir(work.path().join("scratch")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_webm_compression_through_standard_processors() {
        // compressor -> high, done, confirm
        let (summary, commands, work) = run_standard("clip.webm", &["2", "1", "0", "y"]).await;

        assert_eq!(summary.succeeded_count(), 1);
        assert!(work.path().join("output").join("clip_combo_processed.webm").exists());
        assert!(has_pair(&commands, "-c:v", "libvpx-vp9"));
        assert!(has_pair(&commands, "-c:a", "libopus"));
        assert!(has_pair(&commands, "-crf", "18"));
    }
}
