use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognised as video files, compared case-insensitively
pub const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "wmv", "flv", "mkv", "webm"];

/// Check whether a path carries a recognised video extension
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// List the video files directly inside `dir` (non-recursive), sorted and de-duplicated.
///
/// A missing directory yields an empty list.
pub fn list_video_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_video_file(p))
        .collect();

    files.sort();
    files.dedup();
    files
}

/// File stem as an owned string ("video" when the name is unusable)
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}

/// Lowercase extension without the dot ("mp4" when missing)
pub fn extension(path: &Path) -> String {
    path.extension()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "mp4".to_string())
}

/// Size of a file in megabytes, 0.0 if it cannot be read
pub fn size_mb(path: &Path) -> f64 {
    std::fs::metadata(path)
        .map(|m| m.len() as f64 / 1024.0 / 1024.0)
        .unwrap_or(0.0)
}
