//! Answer sources for interactive menus
//!
//! Actions and the step configurator never read stdin themselves; they ask an
//! [`AnswerSource`] passed in by the caller. The console implementation talks
//! to the user, scripted implementations drive the same code unattended.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use tracing::debug;

use crate::error::{Result, VideoForgeError};

/// Re-prompts allowed before a question is treated as invalid
pub const MAX_ATTEMPTS: usize = 5;

/// What a prompt is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Step selection menu of the combo builder
    StepMenu,
    FormatChoice,
    QualityChoice,
    SpeedChoice,
    SpeedValue,
    ResolutionChoice,
    CustomWidth,
    CustomHeight,
    FilterChoice,
    CustomBrightness,
    CustomContrast,
    CustomSaturation,
    VoiceChoice,
    CustomPitch,
    CustomTempo,
    CustomEffect,
    TrimDirection,
    TrimSeconds,
    /// Yes/no confirmation
    Confirm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
}

impl Prompt {
    pub fn new<S: Into<String>>(kind: PromptKind, text: S) -> Self {
        Self { kind, text: text.into() }
    }
}

/// Capability that supplies one answer per prompt
pub trait AnswerSource: Send {
    fn next_answer(&mut self, prompt: &Prompt) -> Result<String>;
}

/// Reads answers from stdin
pub struct ConsoleAnswers;

impl AnswerSource for ConsoleAnswers {
    fn next_answer(&mut self, prompt: &Prompt) -> Result<String> {
        print!("{} ", prompt.text);
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(VideoForgeError::InputExhausted(prompt.text.clone()));
        }
        Ok(line.trim().trim_matches('"').to_string())
    }
}

/// Replays a fixed list of answers in order
#[derive(Debug, Default)]
pub struct ScriptedAnswers {
    answers: VecDeque<String>,
    asked: Vec<PromptKind>,
}

impl ScriptedAnswers {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|s| s.into()).collect(),
            asked: Vec::new(),
        }
    }

    /// Kinds of every prompt seen so far
    pub fn asked(&self) -> &[PromptKind] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl AnswerSource for ScriptedAnswers {
    fn next_answer(&mut self, prompt: &Prompt) -> Result<String> {
        self.asked.push(prompt.kind);
        let answer = self
            .answers
            .pop_front()
            .ok_or_else(|| VideoForgeError::InputExhausted(prompt.text.clone()))?;
        debug!("Scripted answer for {:?}: {}", prompt.kind, answer);
        Ok(answer)
    }
}

/// Result of interpreting one raw answer
pub enum Reply<T> {
    Value(T),
    Cancel,
    Invalid(String),
}

/// Ask until `parse` accepts an answer, the user cancels, or attempts run out.
///
/// Returns `Ok(None)` on cancellation and `InvalidChoice` once
/// [`MAX_ATTEMPTS`] invalid answers have been given.
pub fn ask<T, F>(answers: &mut dyn AnswerSource, prompt: &Prompt, mut parse: F) -> Result<Option<T>>
where
    F: FnMut(&str) -> Reply<T>,
{
    let mut last_error = String::new();
    for _ in 0..MAX_ATTEMPTS {
        let answer = answers.next_answer(prompt)?;
        match parse(answer.trim()) {
            Reply::Value(value) => return Ok(Some(value)),
            Reply::Cancel => return Ok(None),
            Reply::Invalid(message) => {
                println!("Invalid input: {}", message);
                last_error = message;
            }
        }
    }
    Err(VideoForgeError::InvalidChoice(last_error))
}

/// Ask a yes/no question; anything but "y"/"yes" is a no
pub fn confirm(answers: &mut dyn AnswerSource, text: &str) -> Result<bool> {
    let answer = answers.next_answer(&Prompt::new(PromptKind::Confirm, format!("{} (y/n):", text)))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
