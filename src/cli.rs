use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::steps::StepKind;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chain several operations and run them over every video in a directory
    Combo {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for processed files
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Convert videos to another container format
    Convert {
        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Compress videos
    Compress {
        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Change playback speed
    Speed {
        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Change resolution
    Resolution {
        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Apply a colour filter
    Filter {
        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Change the voice in the audio track
    Voice {
        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Cut seconds from the start or the end
    Trim {
        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Check that ffmpeg and ffprobe are available
    Check,

    /// Write the default configuration file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "videoforge.toml")]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct DirArgs {
    /// Input directory containing video files
    #[arg(short, long)]
    pub input_dir: PathBuf,

    /// Output directory for processed files
    #[arg(short, long)]
    pub output_dir: PathBuf,
}

impl Commands {
    /// Action kind and directories of a single-action subcommand
    pub fn action(&self) -> Option<(StepKind, &DirArgs)> {
        match self {
            Commands::Convert { dirs } => Some((StepKind::FormatConverter, dirs)),
            Commands::Compress { dirs } => Some((StepKind::Compressor, dirs)),
            Commands::Speed { dirs } => Some((StepKind::SpeedAdjuster, dirs)),
            Commands::Resolution { dirs } => Some((StepKind::ResolutionChanger, dirs)),
            Commands::Filter { dirs } => Some((StepKind::FilterApplier, dirs)),
            Commands::Voice { dirs } => Some((StepKind::VoiceChanger, dirs)),
            Commands::Trim { dirs } => Some((StepKind::VideoTrimmer, dirs)),
            Commands::Combo { .. } | Commands::Check | Commands::InitConfig { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_combo() {
        let args = Args::try_parse_from(["videoforge", "-v", "combo", "-i", "in", "-o", "out"]).unwrap();
        assert!(args.verbose);
        match args.command {
            Commands::Combo { input_dir, output_dir } => {
                assert_eq!(input_dir, PathBuf::from("in"));
                assert_eq!(output_dir, PathBuf::from("out"));
            }
            _ => panic!("expected combo"),
        }
    }

    #[test]
    fn test_action_subcommands_map_to_kinds() {
        let args = Args::try_parse_from(["videoforge", "trim", "--input-dir", "a", "--output-dir", "b"]).unwrap();
        let (kind, dirs) = args.command.action().unwrap();
        assert_eq!(kind, StepKind::VideoTrimmer);
        assert_eq!(dirs.output_dir, PathBuf::from("b"));

        let check = Args::try_parse_from(["videoforge", "check"]).unwrap();
        assert!(check.command.action().is_none());
    }
}
