//! VideoForge - batch video operations on top of ffmpeg
//!
//! Runs single interactive actions over a directory of videos, or chains
//! several of them into a combo pipeline.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use videoforge::actions::ActionFactory;
use videoforge::cli::{Args, Commands};
use videoforge::combo::ComboController;
use videoforge::config::Config;
use videoforge::error::VideoForgeError;
use videoforge::media::MediaProcessorFactory;
use videoforge::pipeline::ProcessorTable;
use videoforge::prompt::ConsoleAnswers;

const DEFAULT_CONFIG: &str = "videoforge.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting VideoForge");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG);
                Config::from_file(DEFAULT_CONFIG)?
            } else {
                Config::default()
            }
        }
    };

    if let Commands::InitConfig { output } = &args.command {
        config.save_to_file(output)?;
        println!("Wrote configuration to {}", output.display());
        return Ok(());
    }

    let media = MediaProcessorFactory::create_processor(config.media.clone());
    let mut answers = ConsoleAnswers;

    let outcome = match &args.command {
        Commands::Combo { input_dir, output_dir } => {
            let processors = ProcessorTable::standard(media.clone(), &config);
            let controller = ComboController::new(processors, &config.pipeline);
            controller
                .execute(input_dir, output_dir, &mut answers)
                .await
                .map(|summary| {
                    info!(
                        "Combo run finished: {} succeeded, {} failed",
                        summary.succeeded_count(),
                        summary.failed_count()
                    );
                })
        }
        Commands::Check => {
            media.check_availability().await?;
            let version = media.get_version_info().await?;
            println!("ffmpeg:  {}", config.media.ffmpeg_path);
            println!("ffprobe: {}", config.media.ffprobe_path);
            println!("{}", version);
            Ok(())
        }
        Commands::InitConfig { .. } => Ok(()),
        command => match command.action() {
            Some((kind, dirs)) => {
                let action = ActionFactory::create(kind, media.clone(), &config);
                info!("Running {} on {}", action.name(), dirs.input_dir.display());
                action
                    .execute(&dirs.input_dir, &dirs.output_dir, &mut answers)
                    .await
                    .map(|report| info!("{}: {} processed, {} failed", action.name(), report.processed, report.failed))
            }
            None => Ok(()),
        },
    };

    match outcome {
        Ok(()) => {}
        Err(VideoForgeError::Cancelled) => println!("Cancelled"),
        Err(e) => return Err(e.into()),
    }

    info!("VideoForge finished");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".videoforge").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "videoforge.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("videoforge.log").display());

    Ok(())
}
