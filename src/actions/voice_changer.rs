use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{choose, output_path, prepare, run_each, ActionReport, MenuChoice, VideoAction};
use crate::error::{Result, VideoForgeError};
use crate::files;
use crate::media::{atempo_chain, trim_float, MediaProcessorTrait};
use crate::prompt::{ask, confirm, AnswerSource, Prompt, PromptKind, Reply};
use crate::steps::{StepKind, VoicePreset};

/// Sample rate the voice chain works at
const SAMPLE_RATE: u32 = 44100;

/// Special effect stage of a voice chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceEffect {
    Robot,
    Echo,
    Reverb,
    Telephone,
    Monster,
}

impl VoiceEffect {
    pub const ALL: [VoiceEffect; 5] = [
        VoiceEffect::Robot,
        VoiceEffect::Echo,
        VoiceEffect::Reverb,
        VoiceEffect::Telephone,
        VoiceEffect::Monster,
    ];

    fn filters(self) -> &'static str {
        match self {
            VoiceEffect::Robot => "aphaser=in_gain=0.4:out_gain=0.74:delay=3:decay=0.4:speed=0.5:type=t",
            VoiceEffect::Echo => "aecho=0.8:0.9:1000:0.3",
            VoiceEffect::Reverb => "aecho=0.8:0.88:60:0.4",
            VoiceEffect::Telephone => "highpass=f=300,lowpass=f=3000,volume=1.5",
            VoiceEffect::Monster => "asetrate=22050,aresample=44100,atempo=2,volume=1.2",
        }
    }

    fn label(self) -> &'static str {
        match self {
            VoiceEffect::Robot => "Robot",
            VoiceEffect::Echo => "Echo",
            VoiceEffect::Reverb => "Reverb",
            VoiceEffect::Telephone => "Telephone",
            VoiceEffect::Monster => "Monster",
        }
    }
}

/// Pitch, tempo and effect of a voice transformation
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub name: String,
    /// Pitch shift in cents, [-1000, 1000]
    pub pitch_cents: i32,
    /// Tempo factor, [0.5, 2.0]
    pub tempo: f64,
    pub effect: Option<VoiceEffect>,
}

impl VoiceSettings {
    pub fn preset(preset: VoicePreset) -> Self {
        let (pitch_cents, tempo, effect) = match preset {
            VoicePreset::MaleToFemale => (300, 1.1, None),
            VoicePreset::FemaleToMale => (-200, 0.9, None),
            VoicePreset::Robot => (0, 1.0, Some(VoiceEffect::Robot)),
            VoicePreset::Chipmunk => (500, 1.3, None),
            VoicePreset::Monster => (-400, 0.8, Some(VoiceEffect::Monster)),
            VoicePreset::Echo => (0, 1.0, Some(VoiceEffect::Echo)),
            VoicePreset::Telephone => (0, 1.0, Some(VoiceEffect::Telephone)),
            VoicePreset::Reverb => (0, 1.0, Some(VoiceEffect::Reverb)),
        };
        Self {
            name: preset.key().to_string(),
            pitch_cents,
            tempo,
            effect,
        }
    }

    /// ffmpeg audio filter chain for these settings
    pub fn filter_chain(&self) -> String {
        let mut filters = vec![format!("aresample={}", SAMPLE_RATE)];

        if self.pitch_cents != 0 {
            let ratio = 2f64.powf(self.pitch_cents as f64 / 1200.0);
            let shifted_rate = (SAMPLE_RATE as f64 * ratio).round() as u32;
            filters.push(format!("asetrate={}", shifted_rate));
            filters.push(format!("aresample={}", SAMPLE_RATE));
            // asetrate also changes duration; undo it
            filters.push(atempo_chain(1.0 / ratio));
        }

        if (self.tempo - 1.0).abs() > f64::EPSILON {
            filters.push(atempo_chain(self.tempo));
        }

        if let Some(effect) = self.effect {
            filters.push(effect.filters().to_string());
        }

        filters.join(",")
    }

    pub fn describe(&self) -> String {
        format!(
            "pitch {:+} cents, tempo {}x, effect {}",
            self.pitch_cents,
            trim_float(self.tempo),
            self.effect.map(|e| e.label()).unwrap_or("none")
        )
    }
}

fn parse_pitch(raw: &str) -> Reply<i32> {
    if raw.is_empty() {
        return Reply::Value(0);
    }
    match raw.trim_start_matches('+').parse::<i32>() {
        Ok(cents) if (-1000..=1000).contains(&cents) => Reply::Value(cents),
        Ok(_) => Reply::Invalid("pitch must be between -1000 and 1000".to_string()),
        Err(_) => Reply::Invalid(format!("'{}' is not a whole number", raw)),
    }
}

fn parse_tempo(raw: &str) -> Reply<f64> {
    if raw.is_empty() {
        return Reply::Value(1.0);
    }
    match raw.parse::<f64>() {
        Ok(tempo) if (0.5..=2.0).contains(&tempo) => Reply::Value(tempo),
        Ok(_) => Reply::Invalid("tempo must be between 0.5 and 2.0".to_string()),
        Err(_) => Reply::Invalid(format!("'{}' is not a number", raw)),
    }
}

fn parse_effect(raw: &str) -> Reply<Option<VoiceEffect>> {
    match raw.parse::<usize>() {
        Ok(1) => Reply::Value(None),
        Ok(n) if (2..=VoiceEffect::ALL.len() + 1).contains(&n) => Reply::Value(Some(VoiceEffect::ALL[n - 2])),
        _ => Reply::Invalid(format!("choose a number between 1 and {}", VoiceEffect::ALL.len() + 1)),
    }
}

/// Transform the voice in the audio track, video stream copied
pub struct VoiceChanger {
    media: Arc<dyn MediaProcessorTrait>,
}

impl VoiceChanger {
    pub fn new(media: Arc<dyn MediaProcessorTrait>) -> Self {
        Self { media }
    }

    fn select_settings(&self, answers: &mut dyn AnswerSource) -> Result<VoiceSettings> {
        println!("\nVoice:");
        for (i, preset) in VoicePreset::ALL.iter().enumerate() {
            println!("{}. {}", i + 1, preset);
        }
        println!("{}. Custom", VoicePreset::ALL.len() + 1);

        match choose(answers, PromptKind::VoiceChoice, &VoicePreset::ALL, true)? {
            MenuChoice::Preset(preset) => Ok(VoiceSettings::preset(preset)),
            MenuChoice::Custom => self.custom_settings(answers),
        }
    }

    fn custom_settings(&self, answers: &mut dyn AnswerSource) -> Result<VoiceSettings> {
        let pitch_cents = ask(
            answers,
            &Prompt::new(PromptKind::CustomPitch, "Pitch in cents (-1000 to 1000, blank = 0):"),
            parse_pitch,
        )?
        .unwrap_or(0);
        let tempo = ask(
            answers,
            &Prompt::new(PromptKind::CustomTempo, "Tempo (0.5 to 2.0, blank = 1.0):"),
            parse_tempo,
        )?
        .unwrap_or(1.0);

        println!("Effect:");
        println!("1. None");
        for (i, effect) in VoiceEffect::ALL.iter().enumerate() {
            println!("{}. {}", i + 2, effect.label());
        }
        let effect = ask(
            answers,
            &Prompt::new(PromptKind::CustomEffect, format!("Choose (1-{}):", VoiceEffect::ALL.len() + 1)),
            parse_effect,
        )?
        .flatten();

        Ok(VoiceSettings {
            name: "custom".to_string(),
            pitch_cents,
            tempo,
            effect,
        })
    }
}

#[async_trait]
impl VideoAction for VoiceChanger {
    fn name(&self) -> &'static str {
        "Voice changer"
    }

    fn kind(&self) -> StepKind {
        StepKind::VoiceChanger
    }

    async fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        answers: &mut dyn AnswerSource,
    ) -> Result<ActionReport> {
        let videos = prepare(input_dir, output_dir)?;
        let settings = self.select_settings(answers)?;

        println!("\nVoice '{}': {}", settings.name, settings.describe());
        if !confirm(answers, "Start processing?")? {
            return Err(VideoForgeError::Cancelled);
        }

        let chain = settings.filter_chain();
        info!("Voice chain for {} file(s): {}", videos.len(), chain);

        let tag = format!("_voice_{}", settings.name);
        let description = format!("Voice {}", settings.name);
        let media = self.media.as_ref();
        let report = run_each(media, &videos, |video| {
            let output = output_path(output_dir, video, &tag, &files::extension(video));
            let command = media
                .commands()
                .apply_audio_filter(video, &output, chain.as_str(), &description);
            Ok((output, command))
        })
        .await;

        report.print_summary(self.name());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::FakeMediaProcessor;
    use crate::prompt::ScriptedAnswers;

    #[test]
    fn test_pitch_shift_keeps_duration() {
        let settings = VoiceSettings {
            name: "octave".to_string(),
            pitch_cents: 1200,
            tempo: 1.0,
            effect: None,
        };
        assert_eq!(
            settings.filter_chain(),
            "aresample=44100,asetrate=88200,aresample=44100,atempo=0.5"
        );
    }

    #[test]
    fn test_effect_only_presets() {
        assert_eq!(
            VoiceSettings::preset(VoicePreset::Echo).filter_chain(),
            "aresample=44100,aecho=0.8:0.9:1000:0.3"
        );
        assert!(VoiceSettings::preset(VoicePreset::Telephone)
            .filter_chain()
            .contains("highpass=f=300,lowpass=f=3000"));
    }

    #[tokio::test]
    async fn test_preset_requires_confirmation() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("clip.mp4"), b"x").unwrap();

        let action = VoiceChanger::new(Arc::new(FakeMediaProcessor::new(10.0)));
        let mut answers = ScriptedAnswers::new(["3", "n"]);
        let result = action.execute(input.path(), output.path(), &mut answers).await;
        assert!(matches!(result, Err(VideoForgeError::Cancelled)));
        assert!(!output.path().join("clip_voice_robot.mp4").exists());
    }

    #[tokio::test]
    async fn test_robot_voice_copies_video() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("clip.mp4"), b"x").unwrap();

        let media = Arc::new(FakeMediaProcessor::new(10.0));
        let action = VoiceChanger::new(media.clone());
        let mut answers = ScriptedAnswers::new(["3", "y"]);
        let report = action.execute(input.path(), output.path(), &mut answers).await.unwrap();

        assert_eq!(report.outputs, vec![output.path().join("clip_voice_robot.mp4")]);
        let executed = media.executed();
        assert!(executed[0].args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "copy"));
        assert!(executed[0].args.iter().any(|a| a.contains("aphaser")));
    }

    #[tokio::test]
    async fn test_custom_voice() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("clip.mp4"), b"x").unwrap();

        let media = Arc::new(FakeMediaProcessor::new(10.0));
        let action = VoiceChanger::new(media.clone());
        let mut answers = ScriptedAnswers::new(["9", "5000", "", "1.5", "3", "y"]);
        let report = action.execute(input.path(), output.path(), &mut answers).await.unwrap();

        assert_eq!(report.outputs, vec![output.path().join("clip_voice_custom.mp4")]);
        let executed = media.executed();
        assert!(executed[0]
            .args
            .contains(&"aresample=44100,atempo=1.5,aecho=0.8:0.9:1000:0.3".to_string()));
    }
}
