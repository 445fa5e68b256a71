//! Parameter collection for combo steps
//!
//! Each step kind has a short numbered menu. The parsers are plain functions
//! over the raw answer so they can be checked without any I/O.

use tracing::debug;

use crate::error::{Result, VideoForgeError};
use crate::prompt::{ask, AnswerSource, Prompt, PromptKind, Reply};
use crate::steps::{
    pick, FilterPreset, OutputFormat, Quality, Resolution, SelectedStep, StepConfig, StepKind,
    TrimDirection, VoicePreset,
};

pub const MIN_CUSTOM_SPEED: f64 = 0.1;
pub const MAX_CUSTOM_SPEED: f64 = 4.0;

/// Preset speeds offered before the custom entry
pub const SPEED_PRESETS: [f64; 3] = [0.5, 1.5, 2.0];
const CUSTOM_SPEED_CHOICE: &str = "4";

pub fn parse_format_choice(answer: &str) -> Option<OutputFormat> {
    pick(&OutputFormat::COMBO_CHOICES, answer)
}

pub fn parse_quality_choice(answer: &str) -> Option<Quality> {
    pick(&Quality::COMBO_CHOICES, answer)
}

pub fn parse_resolution_choice(answer: &str) -> Option<Resolution> {
    pick(&Resolution::COMBO_CHOICES, answer)
}

pub fn parse_filter_choice(answer: &str) -> Option<FilterPreset> {
    pick(&FilterPreset::COMBO_CHOICES, answer)
}

pub fn parse_voice_choice(answer: &str) -> Option<VoicePreset> {
    pick(&VoicePreset::COMBO_CHOICES, answer)
}

pub fn parse_trim_direction(answer: &str) -> Option<TrimDirection> {
    pick(&TrimDirection::ALL, answer)
}

/// Speed preset menu; `None` for the custom entry or anything unknown
pub fn parse_speed_preset(answer: &str) -> Option<f64> {
    pick(&SPEED_PRESETS, answer)
}

/// Custom speed must parse and lie in [0.1, 4.0]
pub fn parse_custom_speed(answer: &str) -> std::result::Result<f64, String> {
    let speed: f64 = answer
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", answer.trim()))?;
    if (MIN_CUSTOM_SPEED..=MAX_CUSTOM_SPEED).contains(&speed) {
        Ok(speed)
    } else {
        Err(format!(
            "speed must be between {} and {}",
            MIN_CUSTOM_SPEED, MAX_CUSTOM_SPEED
        ))
    }
}

/// Trim seconds must be a positive, finite number
pub fn parse_trim_seconds(answer: &str) -> std::result::Result<f64, String> {
    let seconds: f64 = answer
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", answer.trim()))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err("seconds must be greater than 0".to_string())
    }
}

/// Collects a validated [`StepConfig`] for one step kind
#[derive(Debug, Default)]
pub struct StepConfigurator;

impl StepConfigurator {
    pub fn new() -> Self {
        Self
    }

    /// Ask for the parameters of `kind`.
    ///
    /// `Ok(None)` means the step must not be added (cancelled or rejected).
    /// Only answer-source failures are returned as errors.
    pub fn configure(&self, kind: StepKind, answers: &mut dyn AnswerSource) -> Result<Option<SelectedStep>> {
        println!("\nConfigure: {}", kind.descriptor().display_name);
        println!("{}", "-".repeat(50));

        let config = match kind {
            StepKind::FormatConverter => self.configure_format(answers)?,
            StepKind::Compressor => self.configure_compressor(answers)?,
            StepKind::SpeedAdjuster => self.configure_speed(answers)?,
            StepKind::ResolutionChanger => self.configure_resolution(answers)?,
            StepKind::FilterApplier => self.configure_filter(answers)?,
            StepKind::VoiceChanger => self.configure_voice(answers)?,
            StepKind::VideoTrimmer => self.configure_trimmer(answers)?,
        };

        match config {
            Some(config) => {
                debug!("Configured {}: {:?}", kind, config);
                Ok(Some(SelectedStep::new(config)))
            }
            None => {
                println!("Step configuration cancelled");
                Ok(None)
            }
        }
    }

    fn menu_answer(&self, answers: &mut dyn AnswerSource, kind: PromptKind, options: usize) -> Result<String> {
        println!("0. Cancel");
        answers.next_answer(&Prompt::new(kind, format!("Choose (0-{}):", options)))
    }

    fn configure_format(&self, answers: &mut dyn AnswerSource) -> Result<Option<StepConfig>> {
        println!("Output format:");
        for (i, format) in OutputFormat::COMBO_CHOICES.iter().enumerate() {
            println!("{}. {}", i + 1, format);
        }
        let answer = self.menu_answer(answers, PromptKind::FormatChoice, OutputFormat::COMBO_CHOICES.len())?;
        Ok(parse_format_choice(&answer).map(|format| StepConfig::FormatConverter { format }))
    }

    fn configure_compressor(&self, answers: &mut dyn AnswerSource) -> Result<Option<StepConfig>> {
        println!("Compression level:");
        for (i, quality) in Quality::COMBO_CHOICES.iter().enumerate() {
            println!("{}. {} ({})", i + 1, quality, quality.description());
        }
        let answer = self.menu_answer(answers, PromptKind::QualityChoice, Quality::COMBO_CHOICES.len())?;
        Ok(parse_quality_choice(&answer).map(|quality| StepConfig::Compressor { quality }))
    }

    fn configure_speed(&self, answers: &mut dyn AnswerSource) -> Result<Option<StepConfig>> {
        println!("Playback speed:");
        for (i, speed) in SPEED_PRESETS.iter().enumerate() {
            println!("{}. {}x", i + 1, speed);
        }
        println!("{}. Custom", CUSTOM_SPEED_CHOICE);
        let answer = self.menu_answer(answers, PromptKind::SpeedChoice, SPEED_PRESETS.len() + 1)?;

        if let Some(speed) = parse_speed_preset(&answer) {
            return Ok(Some(StepConfig::SpeedAdjuster { speed }));
        }
        if answer.trim() != CUSTOM_SPEED_CHOICE {
            return Ok(None);
        }

        let prompt = Prompt::new(
            PromptKind::SpeedValue,
            format!("Enter speed ({}-{}):", MIN_CUSTOM_SPEED, MAX_CUSTOM_SPEED),
        );
        let speed = ask(answers, &prompt, |raw| {
            if raw.is_empty() {
                return Reply::Cancel;
            }
            match parse_custom_speed(raw) {
                Ok(speed) => Reply::Value(speed),
                Err(message) => Reply::Invalid(message),
            }
        });

        match speed {
            Ok(speed) => Ok(speed.map(|speed| StepConfig::SpeedAdjuster { speed })),
            Err(VideoForgeError::InvalidChoice(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn configure_resolution(&self, answers: &mut dyn AnswerSource) -> Result<Option<StepConfig>> {
        println!("Resolution:");
        for (i, resolution) in Resolution::COMBO_CHOICES.iter().enumerate() {
            println!("{}. {} ({})", i + 1, resolution, resolution.dimensions());
        }
        let answer = self.menu_answer(answers, PromptKind::ResolutionChoice, Resolution::COMBO_CHOICES.len())?;
        Ok(parse_resolution_choice(&answer).map(|resolution| StepConfig::ResolutionChanger { resolution }))
    }

    fn configure_filter(&self, answers: &mut dyn AnswerSource) -> Result<Option<StepConfig>> {
        println!("Filter:");
        for (i, filter) in FilterPreset::COMBO_CHOICES.iter().enumerate() {
            println!("{}. {} ({})", i + 1, filter, filter.description());
        }
        let answer = self.menu_answer(answers, PromptKind::FilterChoice, FilterPreset::COMBO_CHOICES.len())?;
        Ok(parse_filter_choice(&answer).map(|filter| StepConfig::FilterApplier { filter }))
    }

    fn configure_voice(&self, answers: &mut dyn AnswerSource) -> Result<Option<StepConfig>> {
        println!("Voice effect:");
        for (i, voice) in VoicePreset::COMBO_CHOICES.iter().enumerate() {
            println!("{}. {}", i + 1, voice);
        }
        let answer = self.menu_answer(answers, PromptKind::VoiceChoice, VoicePreset::COMBO_CHOICES.len())?;
        Ok(parse_voice_choice(&answer).map(|voice| StepConfig::VoiceChanger { voice }))
    }

    fn configure_trimmer(&self, answers: &mut dyn AnswerSource) -> Result<Option<StepConfig>> {
        println!("Trim from:");
        println!("1. Start of the video");
        println!("2. End of the video");
        let answer = self.menu_answer(answers, PromptKind::TrimDirection, TrimDirection::ALL.len())?;
        let Some(direction) = parse_trim_direction(&answer) else {
            return Ok(None);
        };

        let raw = answers.next_answer(&Prompt::new(PromptKind::TrimSeconds, "Seconds to cut:"))?;
        match parse_trim_seconds(&raw) {
            Ok(seconds) => Ok(Some(StepConfig::VideoTrimmer { direction, seconds })),
            Err(message) => {
                println!("Invalid input: {}", message);
                Ok(None)
            }
        }
    }
}
