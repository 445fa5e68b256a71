#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use videoforge::error::{Result, VideoForgeError};
use videoforge::files;
use videoforge::pipeline::StepProcessor;
use videoforge::steps::StepConfig;

/// What a [`FakeStep`] does with its input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behaviour {
    /// Copy the input, failing on zero-byte files like a real decoder would
    Copy,
    /// Always report failure
    Fail,
    /// Report success without writing anything
    NoOutput,
    /// Write two videos
    TwoOutputs,
}

/// Step processor that never runs ffmpeg
pub struct FakeStep {
    tag: &'static str,
    behaviour: Behaviour,
    calls: Mutex<Vec<StepConfig>>,
}

impl FakeStep {
    pub fn new(tag: &'static str, behaviour: Behaviour) -> Self {
        Self { tag, behaviour, calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl StepProcessor for FakeStep {
    fn name(&self) -> &str {
        self.tag
    }

    async fn process(&self, input_dir: &Path, output_dir: &Path, config: &StepConfig) -> Result<()> {
        self.calls.lock().unwrap().push(config.clone());

        let input = files::list_video_files(input_dir)
            .into_iter()
            .next()
            .ok_or_else(|| VideoForgeError::FileNotFound(input_dir.display().to_string()))?;
        let ext = match config {
            StepConfig::FormatConverter { format } => format.extension().to_string(),
            _ => files::extension(&input),
        };
        let output = output_dir.join(format!("{}_{}.{}", files::file_stem(&input), self.tag, ext));

        match self.behaviour {
            Behaviour::Fail => Err(VideoForgeError::Media(format!("{} failed", self.tag))),
            Behaviour::NoOutput => Ok(()),
            Behaviour::TwoOutputs => {
                std::fs::copy(&input, &output)?;
                std::fs::copy(&input, output_dir.join("extra.mp4"))?;
                Ok(())
            }
            Behaviour::Copy => {
                if std::fs::metadata(&input)?.len() == 0 {
                    return Err(VideoForgeError::Media(format!("{} is empty", input.display())));
                }
                std::fs::copy(&input, &output)?;
                Ok(())
            }
        }
    }
}

/// Write a small fake video
pub fn write_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not really a video").unwrap();
    path
}

/// Number of entries directly inside `dir`
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
