use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::Result;

/// Scratch directory owned by one combo run.
///
/// Every video gets its own subtree; the whole arena is removed when it is
/// dropped or closed.
#[derive(Debug)]
pub struct ScratchArena {
    root: TempDir,
}

impl ScratchArena {
    /// Create the arena under `parent`, or the system temp dir when `None`
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("videoforge_combo_");
        let root = match parent {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)?
            }
            None => builder.tempdir()?,
        };
        debug!("Scratch arena at {}", root.path().display());
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Subtree for the `index`-th video of the run (1-based)
    pub fn video_scope(&self, index: usize) -> Result<VideoScratch<'_>> {
        let root = self.root.path().join(format!("video_{}", index));
        std::fs::create_dir_all(&root)?;
        Ok(VideoScratch { root, _arena: PhantomData })
    }

    /// Remove the arena, reporting deletion errors
    pub fn close(self) -> Result<()> {
        let path = self.root.path().to_path_buf();
        self.root.close()?;
        debug!("Removed scratch arena {}", path.display());
        Ok(())
    }
}

/// Input and output directory of one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepDirs {
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Scratch subtree of one video; removed on drop
#[derive(Debug)]
pub struct VideoScratch<'a> {
    root: PathBuf,
    _arena: PhantomData<&'a ScratchArena>,
}

impl VideoScratch<'_> {
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create `step_<n>_input` and `step_<n>_output` (1-based)
    pub fn step_dirs(&self, index: usize) -> Result<StepDirs> {
        let dirs = StepDirs {
            index,
            input: self.root.join(format!("step_{}_input", index)),
            output: self.root.join(format!("step_{}_output", index)),
        };
        std::fs::create_dir_all(&dirs.input)?;
        std::fs::create_dir_all(&dirs.output)?;
        Ok(dirs)
    }
}

impl Drop for VideoScratch<'_> {
    fn drop(&mut self) {
        if self.root.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.root) {
                warn!("Failed to remove {}: {}", self.root.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_is_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();
        let path = {
            let arena = ScratchArena::create(Some(parent.path())).unwrap();
            let scratch = arena.video_scope(1).unwrap();
            let dirs = scratch.step_dirs(1).unwrap();
            std::fs::write(dirs.output.join("clip.mp4"), b"x").unwrap();
            arena.path().to_path_buf()
        };
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_videos_get_separate_subtrees() {
        let arena = ScratchArena::create(None).unwrap();
        let first = arena.video_scope(1).unwrap();
        let second = arena.video_scope(2).unwrap();

        let a = first.step_dirs(1).unwrap();
        let b = second.step_dirs(1).unwrap();
        assert_ne!(a.input, b.input);
        assert!(a.input.ends_with("video_1/step_1_input"));
        assert!(b.output.ends_with("video_2/step_1_output"));
        assert!(a.input.is_dir() && a.output.is_dir());

        let first_root = first.path().to_path_buf();
        drop(first);
        assert!(!first_root.exists());
        assert!(second.path().exists());

        drop(second);
        arena.close().unwrap();
    }
}
