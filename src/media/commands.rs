use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, VideoForgeError};
use crate::steps::{Dimensions, OutputFormat, Quality};

/// Number of trailing stderr lines kept in error messages
const STDERR_TAIL_LINES: usize = 12;

/// Abstract media processing command representation
#[derive(Debug, Clone, PartialEq)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Copy every stream
    pub fn copy_all(self) -> Self {
        self.arg("-c").arg("copy")
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-filter:v").arg(filter)
    }

    /// Add audio filter
    pub fn audio_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-filter:a").arg(filter)
    }

    /// Set x264-style rate control
    pub fn crf(self, crf: u8, preset: &str) -> Self {
        self.arg("-crf").arg(crf.to_string()).arg("-preset").arg(preset)
    }

    /// Render the command line for logging
    pub fn command_line(&self) -> String {
        let mut line = self.binary_path.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(' ') {
                line.push_str(&format!("\"{}\"", arg));
            } else {
                line.push_str(arg);
            }
        }
        line
    }

    /// Execute the command, discarding stdout
    pub async fn execute(&self) -> Result<()> {
        self.run().await.map(|_| ())
    }

    /// Execute the command and return its stdout
    pub async fn execute_capture(&self) -> Result<String> {
        self.run().await
    }

    async fn run(&self) -> Result<String> {
        debug!("Executing media processing command: {}", self.command_line());
        debug!("Description: {}", self.description);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()));
        spinner.set_message(self.description.clone());
        spinner.enable_steady_tick(Duration::from_millis(120));

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await;
        spinner.finish_and_clear();

        let output = output.map_err(|e| {
            VideoForgeError::Media(format!("Failed to execute {}: {}", self.binary_path, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr_tail(&stderr, STDERR_TAIL_LINES);
            warn!("{} exited with {}: {}", self.description, output.status, tail);
            return Err(VideoForgeError::Media(format!(
                "{} failed ({}): {}",
                self.description, output.status, tail
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn stderr_tail(stderr: &str, lines: usize) -> String {
    let collected: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = collected.len().saturating_sub(lines);
    collected[start..].join("\n")
}

/// Builder for common media processing operations
#[derive(Debug, Clone)]
pub struct MediaCommandBuilder {
    ffmpeg_path: String,
    ffprobe_path: String,
    extra_output_options: Vec<String>,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(ffmpeg_path: S1, ffprobe_path: S2) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            extra_output_options: Vec::new(),
        }
    }

    /// Options appended to re-encoding commands before the output path
    pub fn with_output_options(mut self, options: Vec<String>) -> Self {
        self.extra_output_options = options;
        self
    }

    /// Build custom ffmpeg command, hiding the banner and never reading stdin
    pub fn ffmpeg<S: Into<String>>(&self, description: S) -> MediaCommand {
        MediaCommand::new(&self.ffmpeg_path, description.into())
            .arg("-hide_banner")
            .arg("-nostdin")
    }

    /// Container implied by the output path, mp4 when unknown
    fn container<P: AsRef<Path>>(output_path: P) -> OutputFormat {
        output_path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(OutputFormat::from_extension)
            .unwrap_or(OutputFormat::Mp4)
    }

    fn finish<P: AsRef<Path>>(&self, cmd: MediaCommand, output_path: P) -> MediaCommand {
        cmd.args(self.extra_output_options.iter().cloned())
            .overwrite()
            .output(output_path)
    }

    /// Build container/codec conversion command
    pub fn convert_format<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_path: P, output_path: Q, format: OutputFormat) -> MediaCommand {
        let cmd = self
            .ffmpeg(format!("Convert to {}", format))
            .input(input_path)
            .video_codec(format.video_codec())
            .audio_codec(format.audio_codec());
        self.finish(cmd, output_path)
    }

    /// Build compression command
    pub fn compress<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_path: P, output_path: Q, quality: Quality) -> MediaCommand {
        let format = Self::container(&output_path);
        let cmd = self
            .ffmpeg(format!("Compress ({})", quality))
            .input(input_path)
            .video_codec(format.video_codec());
        let cmd = match format {
            OutputFormat::Webm => cmd.arg("-crf").arg(quality.crf().to_string()).arg("-b:v").arg("0"),
            OutputFormat::Wmv => cmd.arg("-q:v").arg(quality.qscale().to_string()),
            _ => cmd.crf(quality.crf(), quality.preset()),
        };
        let cmd = cmd
            .audio_codec(format.audio_codec())
            .arg("-b:a").arg("128k");
        self.finish(cmd, output_path)
    }

    /// Build resize command
    pub fn resize<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_path: P, output_path: Q, size: Dimensions) -> MediaCommand {
        let cmd = self
            .ffmpeg(format!("Resize to {}", size))
            .input(input_path)
            .video_filter(format!("scale={}:{}", size.width, size.height))
            .video_codec(Self::container(&output_path).video_codec())
            .audio_codec("copy");
        self.finish(cmd, output_path)
    }

    /// Build video filter command, audio untouched
    pub fn apply_video_filter<P: AsRef<Path>, Q: AsRef<Path>, S: Into<String>>(
        &self,
        input_path: P,
        output_path: Q,
        filter_graph: S,
        description: &str,
    ) -> MediaCommand {
        let cmd = self
            .ffmpeg(description)
            .input(input_path)
            .video_filter(filter_graph)
            .video_codec(Self::container(&output_path).video_codec())
            .audio_codec("copy");
        self.finish(cmd, output_path)
    }

    /// Build playback speed command (video PTS and audio tempo)
    pub fn change_speed<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_path: P, output_path: Q, speed: f64) -> MediaCommand {
        let format = Self::container(&output_path);
        let cmd = self
            .ffmpeg(format!("Speed {}x", speed))
            .input(input_path)
            .video_filter(format!("setpts=PTS/{}", speed))
            .audio_filter(atempo_chain(speed))
            .video_codec(format.video_codec())
            .audio_codec(format.audio_codec());
        self.finish(cmd, output_path)
    }

    /// Build audio-only filter command, video stream copied
    pub fn apply_audio_filter<P: AsRef<Path>, Q: AsRef<Path>, S: Into<String>>(
        &self,
        input_path: P,
        output_path: Q,
        filter_chain: S,
        description: &str,
    ) -> MediaCommand {
        let cmd = self
            .ffmpeg(description)
            .input(input_path)
            .arg("-map").arg("0:v:0")
            .arg("-map").arg("0:a:0")
            .audio_filter(filter_chain)
            .copy_video()
            .audio_codec(Self::container(&output_path).audio_codec())
            .arg("-shortest");
        self.finish(cmd, output_path)
    }

    /// Build command dropping the first `seconds` (stream copy)
    pub fn trim_start<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_path: P, output_path: Q, seconds: f64) -> MediaCommand {
        self.ffmpeg(format!("Trim first {}s", seconds))
            .input(input_path)
            .arg("-ss").arg(seconds.to_string())
            .copy_all()
            .arg("-avoid_negative_ts").arg("make_zero")
            .overwrite()
            .output(output_path)
    }

    /// Build command keeping only the first `keep_seconds` (stream copy)
    pub fn trim_to_duration<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_path: P, output_path: Q, keep_seconds: f64) -> MediaCommand {
        self.ffmpeg(format!("Keep first {:.3}s", keep_seconds))
            .input(input_path)
            .arg("-t").arg(format!("{:.3}", keep_seconds))
            .copy_all()
            .overwrite()
            .output(output_path)
    }

    /// Build duration probe command (JSON output)
    pub fn probe_duration<P: AsRef<Path>>(&self, video_path: P) -> MediaCommand {
        MediaCommand::new(&self.ffprobe_path, "Duration probe")
            .arg("-v").arg("quiet")
            .arg("-print_format").arg("json")
            .arg("-show_entries").arg("format=duration")
            .output(video_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.ffmpeg_path, "Version check").arg("-version")
    }

    /// Build ffprobe version check command
    pub fn probe_version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.ffprobe_path, "Probe version check").arg("-version")
    }
}

/// `atempo` filter chain for `speed`, each factor kept inside [0.5, 2.0]
pub fn atempo_chain(speed: f64) -> String {
    let mut factors = Vec::new();
    let mut remaining = speed;
    while remaining > 2.0 {
        factors.push(2.0);
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        factors.push(0.5);
        remaining /= 0.5;
    }
    factors.push(remaining);

    factors
        .iter()
        .map(|f| format!("atempo={}", trim_float(*f)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Shortest decimal rendering of `value` (at most six places)
pub fn trim_float(value: f64) -> String {
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}
