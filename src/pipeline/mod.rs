// Combo pipeline
//
// - Arena: scoped scratch directories for a run
// - Answers: typed step config answering an action's prompts
// - Processor: StepProcessor implementations and the per-kind table

pub mod answers;
pub mod arena;
pub mod processor;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use answers::StepAnswers;
pub use arena::{ScratchArena, StepDirs, VideoScratch};
pub use processor::{DelegatedActionProcessor, DirectFfmpegProcessor, ProcessorTable, StepProcessor};

use crate::error::{Result, VideoForgeError};
use crate::files;
use crate::steps::SelectedStep;

/// Progress of one video through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    StepRunning(usize),
    StepSucceeded(usize),
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::StepRunning(n) => write!(f, "running step {}", n),
            RunState::StepSucceeded(n) => write!(f, "step {} done", n),
            RunState::Finalizing => write!(f, "finalizing"),
            RunState::Done => write!(f, "done"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Exactly one video file must be present in a step's output directory
pub fn locate_artifact(step: usize, dir: &Path) -> Result<PathBuf> {
    let mut found = files::list_video_files(dir);
    match found.len() {
        0 => Err(VideoForgeError::MissingArtifact { step, dir: dir.to_path_buf() }),
        1 => Ok(found.remove(0)),
        n => Err(VideoForgeError::InconsistentResult { step, found: n }),
    }
}

/// Runs an ordered list of steps over single videos
pub struct PipelineExecutor {
    processors: ProcessorTable,
    output_suffix: String,
}

impl PipelineExecutor {
    pub fn new<S: Into<String>>(processors: ProcessorTable, output_suffix: S) -> Self {
        Self {
            processors,
            output_suffix: output_suffix.into(),
        }
    }

    /// Final artifact path `<output_dir>/<stem><suffix>.<ext>`
    pub fn final_path(&self, output_dir: &Path, original: &Path, artifact: &Path) -> PathBuf {
        output_dir.join(format!(
            "{}{}.{}",
            files::file_stem(original),
            self.output_suffix,
            files::extension(artifact)
        ))
    }

    /// Like [`final_path`](Self::final_path), but numbered `<stem><suffix>_<n>.<ext>`
    /// while the plain name is already in `taken`
    pub fn unique_final_path(
        &self,
        output_dir: &Path,
        original: &Path,
        artifact: &Path,
        taken: &HashSet<PathBuf>,
    ) -> PathBuf {
        let plain = self.final_path(output_dir, original, artifact);
        if !taken.contains(&plain) {
            return plain;
        }

        let stem = files::file_stem(original);
        let ext = files::extension(artifact);
        (2..)
            .map(|n| output_dir.join(format!("{}{}_{}.{}", stem, self.output_suffix, n, ext)))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or(plain)
    }

    /// Thread `video` through every step and copy the result into `output_dir`
    pub async fn process_single_video(
        &self,
        video: &Path,
        steps: &[SelectedStep],
        output_dir: &Path,
        scratch: &VideoScratch<'_>,
    ) -> Result<PathBuf> {
        self.process_video_avoiding(video, steps, output_dir, scratch, &HashSet::new())
            .await
    }

    /// Same as [`process_single_video`](Self::process_single_video), never
    /// writing to a destination listed in `taken`
    pub async fn process_video_avoiding(
        &self,
        video: &Path,
        steps: &[SelectedStep],
        output_dir: &Path,
        scratch: &VideoScratch<'_>,
        taken: &HashSet<PathBuf>,
    ) -> Result<PathBuf> {
        let mut state = RunState::Idle;
        let result = self
            .run_steps(video, steps, output_dir, scratch, taken, &mut state)
            .await;

        match &result {
            Ok(path) => info!("{} -> {} ({})", video.display(), path.display(), state),
            Err(e) => {
                warn!("{} failed while {}: {}", video.display(), state, e);
                state = RunState::Failed;
                debug!("{}: {}", video.display(), state);
            }
        }
        result
    }

    async fn run_steps(
        &self,
        video: &Path,
        steps: &[SelectedStep],
        output_dir: &Path,
        scratch: &VideoScratch<'_>,
        taken: &HashSet<PathBuf>,
        state: &mut RunState,
    ) -> Result<PathBuf> {
        if steps.is_empty() {
            return Err(VideoForgeError::Config("No steps selected".to_string()));
        }

        let mut current = video.to_path_buf();
        for (i, step) in steps.iter().enumerate() {
            let n = i + 1;
            *state = RunState::StepRunning(n);
            println!("  Step {}/{}: {} ({})", n, steps.len(), step.descriptor().display_name, step.summary);

            let dirs = scratch.step_dirs(n)?;
            let file_name = current
                .file_name()
                .ok_or_else(|| VideoForgeError::FileNotFound(current.display().to_string()))?;
            tokio::fs::copy(&current, dirs.input.join(file_name)).await?;

            let processor = self.processors.get(step.kind).ok_or_else(|| VideoForgeError::StepFailed {
                step: n,
                reason: format!("no processor for {}", step.kind),
            })?;
            debug!("Step {} uses {}", n, processor.name());

            processor
                .process(&dirs.input, &dirs.output, &step.config)
                .await
                .map_err(|e| VideoForgeError::StepFailed { step: n, reason: e.to_string() })?;

            current = locate_artifact(n, &dirs.output)?;
            *state = RunState::StepSucceeded(n);
            println!("    -> {}", current.file_name().map(|f| f.to_string_lossy()).unwrap_or_default());
        }

        *state = RunState::Finalizing;
        tokio::fs::create_dir_all(output_dir).await?;
        let destination = self.unique_final_path(output_dir, video, &current, taken);
        if destination != self.final_path(output_dir, video, &current) {
            warn!("{} would overwrite an earlier result, writing {}", video.display(), destination.display());
        }
        tokio::fs::copy(&current, &destination).await?;
        if !destination.exists() {
            return Err(VideoForgeError::FileNotFound(destination.display().to_string()));
        }

        *state = RunState::Done;
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_artifact_requires_exactly_one_video() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            locate_artifact(2, dir.path()),
            Err(VideoForgeError::MissingArtifact { step: 2, .. })
        ));

        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        assert_eq!(locate_artifact(1, dir.path()).unwrap(), dir.path().join("a.mp4"));

        std::fs::write(dir.path().join("b.mkv"), b"x").unwrap();
        assert!(matches!(
            locate_artifact(3, dir.path()),
            Err(VideoForgeError::InconsistentResult { step: 3, found: 2 })
        ));
    }

    #[test]
    fn test_final_path_takes_extension_of_last_artifact() {
        let executor = PipelineExecutor::new(ProcessorTable::empty(), "_combo_processed");
        let path = executor.final_path(Path::new("/out"), Path::new("/in/clip.mp4"), Path::new("/tmp/clip.mkv"));
        assert_eq!(path, PathBuf::from("/out/clip_combo_processed.mkv"));
    }

    #[test]
    fn test_unique_final_path_numbers_taken_names() {
        let executor = PipelineExecutor::new(ProcessorTable::empty(), "_combo_processed");
        let out = Path::new("/out");
        let mut taken = HashSet::new();

        let first = executor.unique_final_path(out, Path::new("/in/clip.mp4"), Path::new("/t/a.mp4"), &taken);
        assert_eq!(first, PathBuf::from("/out/clip_combo_processed.mp4"));
        taken.insert(first);

        let second = executor.unique_final_path(out, Path::new("/in/clip.mov"), Path::new("/t/b.mp4"), &taken);
        assert_eq!(second, PathBuf::from("/out/clip_combo_processed_2.mp4"));
        taken.insert(second);

        let third = executor.unique_final_path(out, Path::new("/in/clip.avi"), Path::new("/t/c.mp4"), &taken);
        assert_eq!(third, PathBuf::from("/out/clip_combo_processed_3.mp4"));

        let other_ext = executor.unique_final_path(out, Path::new("/in/clip.avi"), Path::new("/t/c.mkv"), &taken);
        assert_eq!(other_ext, PathBuf::from("/out/clip_combo_processed.mkv"));
    }
}
