use tracing::debug;

use crate::error::{Result, VideoForgeError};
use crate::media::trim_float;
use crate::prompt::{AnswerSource, Prompt, PromptKind};
use crate::steps::{
    menu_number, FilterPreset, OutputFormat, Quality, Resolution, StepConfig, TrimDirection, VoicePreset,
};

/// Answers an action's prompts from a typed step configuration
#[derive(Debug, Clone)]
pub struct StepAnswers {
    config: StepConfig,
}

impl StepAnswers {
    pub fn new(config: StepConfig) -> Self {
        Self { config }
    }

    /// Every prompt kind is listed so a new kind has to be handled here
    fn answer_for(&self, kind: PromptKind) -> Option<String> {
        let config = &self.config;
        let number = match kind {
            PromptKind::Confirm => return Some("y".to_string()),
            PromptKind::FormatChoice => match config {
                StepConfig::FormatConverter { format } => menu_number(&OutputFormat::ALL, format),
                _ => return None,
            },
            PromptKind::QualityChoice => match config {
                StepConfig::Compressor { quality } => menu_number(&Quality::ALL, quality),
                _ => return None,
            },
            PromptKind::ResolutionChoice => match config {
                StepConfig::ResolutionChanger { resolution } => menu_number(&Resolution::ALL, resolution),
                _ => return None,
            },
            PromptKind::FilterChoice => match config {
                StepConfig::FilterApplier { filter } => menu_number(&FilterPreset::ALL, filter),
                _ => return None,
            },
            PromptKind::VoiceChoice => match config {
                StepConfig::VoiceChanger { voice } => menu_number(&VoicePreset::ALL, voice),
                _ => return None,
            },
            PromptKind::TrimDirection => match config {
                StepConfig::VideoTrimmer { direction, .. } => menu_number(&TrimDirection::ALL, direction),
                _ => return None,
            },
            PromptKind::TrimSeconds => match config {
                StepConfig::VideoTrimmer { seconds, .. } => return Some(trim_float(*seconds)),
                _ => return None,
            },
            PromptKind::SpeedValue => match config {
                StepConfig::SpeedAdjuster { speed } => return Some(trim_float(*speed)),
                _ => return None,
            },
            // Custom entries and the combo menu itself are never reached from a typed config
            PromptKind::StepMenu
            | PromptKind::SpeedChoice
            | PromptKind::CustomWidth
            | PromptKind::CustomHeight
            | PromptKind::CustomBrightness
            | PromptKind::CustomContrast
            | PromptKind::CustomSaturation
            | PromptKind::CustomPitch
            | PromptKind::CustomTempo
            | PromptKind::CustomEffect => return None,
        };
        Some(number.to_string())
    }
}

impl AnswerSource for StepAnswers {
    fn next_answer(&mut self, prompt: &Prompt) -> Result<String> {
        let answer = self.answer_for(prompt.kind).ok_or_else(|| {
            VideoForgeError::InvalidChoice(format!(
                "{} cannot answer '{}'",
                self.config.summary(),
                prompt.text
            ))
        })?;
        debug!("{:?} -> {}", prompt.kind, answer);
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(config: StepConfig, kind: PromptKind) -> Result<String> {
        StepAnswers::new(config).next_answer(&Prompt::new(kind, "?"))
    }

    #[test]
    fn test_menu_answers_follow_action_menus() {
        assert_eq!(
            answer(StepConfig::FormatConverter { format: OutputFormat::Mkv }, PromptKind::FormatChoice).unwrap(),
            "6"
        );
        assert_eq!(
            answer(StepConfig::Compressor { quality: Quality::High }, PromptKind::QualityChoice).unwrap(),
            "2"
        );
        assert_eq!(
            answer(StepConfig::ResolutionChanger { resolution: Resolution::P720 }, PromptKind::ResolutionChoice)
                .unwrap(),
            "2"
        );
        assert_eq!(
            answer(StepConfig::VoiceChanger { voice: VoicePreset::Chipmunk }, PromptKind::VoiceChoice).unwrap(),
            "4"
        );
    }

    #[test]
    fn test_trimmer_answers_and_confirmation() {
        let config = StepConfig::VideoTrimmer { direction: TrimDirection::End, seconds: 2.5 };
        assert_eq!(answer(config.clone(), PromptKind::TrimDirection).unwrap(), "2");
        assert_eq!(answer(config.clone(), PromptKind::TrimSeconds).unwrap(), "2.5");
        assert_eq!(answer(config, PromptKind::Confirm).unwrap(), "y");
    }

    #[test]
    fn test_unrelated_prompt_is_an_error() {
        let result = answer(StepConfig::Compressor { quality: Quality::Low }, PromptKind::FormatChoice);
        assert!(matches!(result, Err(VideoForgeError::InvalidChoice(_))));
        let custom = answer(StepConfig::FilterApplier { filter: FilterPreset::Vintage }, PromptKind::CustomBrightness);
        assert!(custom.is_err());
    }

    #[test]
    fn test_custom_and_menu_prompts_are_never_answered() {
        let config = StepConfig::SpeedAdjuster { speed: 1.5 };
        for kind in [PromptKind::StepMenu, PromptKind::SpeedChoice, PromptKind::CustomTempo, PromptKind::CustomWidth] {
            assert!(matches!(answer(config.clone(), kind), Err(VideoForgeError::InvalidChoice(_))));
        }
        assert_eq!(answer(config, PromptKind::SpeedValue).unwrap(), "1.5");
    }
}
