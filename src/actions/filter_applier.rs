use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{choose, output_path, prepare, run_each, ActionReport, MenuChoice, VideoAction};
use crate::error::Result;
use crate::files;
use crate::media::{trim_float, MediaProcessorTrait};
use crate::prompt::{ask, AnswerSource, Prompt, PromptKind, Reply};
use crate::steps::{FilterPreset, StepKind};

/// Sepia colour matrix
const SEPIA_MATRIX: &str = "colorchannelmixer=.393:.769:.189:0:.349:.686:.168:0:.272:.534:.131";
/// Neutral white point of `colortemperature`, in kelvin
const NEUTRAL_KELVIN: i32 = 6500;

/// Extra stage appended after the `eq` adjustment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterExtra {
    Sepia,
    Vignette,
    /// Unsharp amount in tenths
    Sharpen(i32),
    /// Positive values warm the image, negative values cool it
    Temperature(i32),
}

/// Colour adjustment, each value in [-100, 100]
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    pub name: String,
    pub brightness: i32,
    pub contrast: i32,
    pub saturation: i32,
    pub extra: Option<FilterExtra>,
}

impl FilterSettings {
    pub fn preset(preset: FilterPreset) -> Self {
        let (brightness, contrast, saturation, extra) = match preset {
            FilterPreset::Vintage => (-10, 15, -20, Some(FilterExtra::Sepia)),
            FilterPreset::Cinematic => (5, 25, 10, Some(FilterExtra::Vignette)),
            FilterPreset::Vibrant => (10, 20, 30, Some(FilterExtra::Sharpen(15))),
            FilterPreset::BlackWhite => (0, 20, -100, Some(FilterExtra::Sharpen(10))),
            FilterPreset::Warm => (5, 10, 15, Some(FilterExtra::Temperature(200))),
            FilterPreset::Cool => (0, 15, 10, Some(FilterExtra::Temperature(-200))),
        };
        Self {
            name: preset.key().to_string(),
            brightness,
            contrast,
            saturation,
            extra,
        }
    }

    /// ffmpeg filter graph for these settings
    pub fn filter_graph(&self) -> String {
        let mut stages = vec![format!(
            "eq=brightness={}:contrast={}:saturation={}",
            trim_float(self.brightness as f64 / 100.0),
            trim_float(1.0 + self.contrast as f64 / 100.0),
            trim_float(1.0 + self.saturation as f64 / 100.0)
        )];

        match self.extra {
            Some(FilterExtra::Sepia) => stages.push(SEPIA_MATRIX.to_string()),
            Some(FilterExtra::Vignette) => stages.push("vignette=PI/5".to_string()),
            Some(FilterExtra::Sharpen(amount)) => {
                stages.push(format!("unsharp=5:5:{}", trim_float(amount as f64 / 10.0)))
            }
            Some(FilterExtra::Temperature(shift)) => {
                stages.push(format!("colortemperature=temperature={}", NEUTRAL_KELVIN - shift * 10))
            }
            None => {}
        }

        stages.join(",")
    }
}

fn parse_adjustment(raw: &str) -> Reply<i32> {
    // Blank keeps the value neutral
    if raw.is_empty() {
        return Reply::Value(0);
    }
    match raw.parse::<i32>() {
        Ok(value) if (-100..=100).contains(&value) => Reply::Value(value),
        Ok(_) => Reply::Invalid("must be between -100 and 100".to_string()),
        Err(_) => Reply::Invalid(format!("'{}' is not a whole number", raw)),
    }
}

/// Apply a colour grading preset or custom adjustment
pub struct FilterApplier {
    media: Arc<dyn MediaProcessorTrait>,
}

impl FilterApplier {
    pub fn new(media: Arc<dyn MediaProcessorTrait>) -> Self {
        Self { media }
    }

    fn select_settings(&self, answers: &mut dyn AnswerSource) -> Result<FilterSettings> {
        println!("\nFilter:");
        for (i, preset) in FilterPreset::ALL.iter().enumerate() {
            println!("{}. {} - {}", i + 1, preset, preset.description());
        }
        println!("{}. Custom", FilterPreset::ALL.len() + 1);

        match choose(answers, PromptKind::FilterChoice, &FilterPreset::ALL, true)? {
            MenuChoice::Preset(preset) => Ok(FilterSettings::preset(preset)),
            MenuChoice::Custom => {
                println!("Enter values from -100 to 100 (blank = unchanged)");
                let mut adjustment = |kind, label: &str| -> Result<i32> {
                    let prompt = Prompt::new(kind, format!("{} (-100 to 100):", label));
                    Ok(ask(answers, &prompt, parse_adjustment)?.unwrap_or(0))
                };
                let brightness = adjustment(PromptKind::CustomBrightness, "Brightness")?;
                let contrast = adjustment(PromptKind::CustomContrast, "Contrast")?;
                let saturation = adjustment(PromptKind::CustomSaturation, "Saturation")?;
                Ok(FilterSettings {
                    name: "custom".to_string(),
                    brightness,
                    contrast,
                    saturation,
                    extra: None,
                })
            }
        }
    }
}

#[async_trait]
impl VideoAction for FilterApplier {
    fn name(&self) -> &'static str {
        "Filter applier"
    }

    fn kind(&self) -> StepKind {
        StepKind::FilterApplier
    }

    async fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        answers: &mut dyn AnswerSource,
    ) -> Result<ActionReport> {
        let videos = prepare(input_dir, output_dir)?;
        let settings = self.select_settings(answers)?;
        let graph = settings.filter_graph();
        info!("Applying filter '{}' ({}) to {} file(s)", settings.name, graph, videos.len());

        let tag = format!("_filtered_{}", settings.name);
        let description = format!("Filter {}", settings.name);
        let media = self.media.as_ref();
        let report = run_each(media, &videos, |video| {
            let output = output_path(output_dir, video, &tag, &files::extension(video));
            let command = media
                .commands()
                .apply_video_filter(video, &output, graph.as_str(), &description);
            Ok((output, command))
        })
        .await;

        report.print_summary(self.name());
        Ok(report)
    }
}
