use thiserror::Error;

use crate::steps::{SelectedStep, StepDescriptor, StepKind, CATALOG};

/// Menu answer that finishes the selection
pub const DONE_CHOICE: &str = "0";
/// Menu answer that abandons the selection
pub const CANCEL_CHOICE: &str = "9";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Not a known step number or key
    #[error("'{0}' is not a valid choice")]
    Invalid(String),
    /// Known step that is already part of this run
    #[error("{} has already been selected", .0.descriptor().display_name)]
    AlreadyChosen(StepKind),
}

/// Interpreted answer to the step selection menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Done,
    Cancel,
    Pick(StepKind),
}

/// Ordered set of steps chosen for one pipeline run
#[derive(Debug, Default)]
pub struct FunctionSelector {
    selected: Vec<SelectedStep>,
}

impl FunctionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_chosen(&self, kind: StepKind) -> bool {
        self.selected.iter().any(|step| step.kind == kind)
    }

    /// Descriptors not chosen yet, in catalog order; empty when everything is taken
    pub fn list_available(&self) -> Vec<&'static StepDescriptor> {
        CATALOG.iter().filter(|d| !self.is_chosen(d.kind)).collect()
    }

    /// Validate a menu number ("1".."7") or a descriptor key ("compressor")
    pub fn choose(&self, key: &str) -> Result<StepKind, SelectionError> {
        let key = key.trim();
        let kind = CATALOG
            .iter()
            .find(|d| d.key == key || d.menu_number.to_string() == key)
            .map(|d| d.kind)
            .ok_or_else(|| SelectionError::Invalid(key.to_string()))?;

        if self.is_chosen(kind) {
            return Err(SelectionError::AlreadyChosen(kind));
        }
        Ok(kind)
    }

    /// Interpret an answer to the selection menu
    pub fn interpret(&self, answer: &str) -> Result<MenuCommand, SelectionError> {
        match answer.trim() {
            DONE_CHOICE => Ok(MenuCommand::Done),
            CANCEL_CHOICE => Ok(MenuCommand::Cancel),
            other => self.choose(other).map(MenuCommand::Pick),
        }
    }

    /// Append a configured step; each kind may appear once
    pub fn add(&mut self, step: SelectedStep) -> Result<(), SelectionError> {
        if self.is_chosen(step.kind) {
            return Err(SelectionError::AlreadyChosen(step.kind));
        }
        self.selected.push(step);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn has_steps(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn steps(&self) -> &[SelectedStep] {
        &self.selected
    }

    pub fn into_steps(self) -> Vec<SelectedStep> {
        self.selected
    }

    /// Menu text listing the remaining steps
    pub fn render_available(&self) -> String {
        let mut text = String::from("\nSelect the processing steps:\n");
        text.push_str(&"-".repeat(60));
        text.push('\n');
        for descriptor in self.list_available() {
            text.push_str(&format!(
                "{}. {} - {}\n",
                descriptor.menu_number, descriptor.display_name, descriptor.description
            ));
        }
        text.push_str(&format!("{}. Done selecting\n", DONE_CHOICE));
        text.push_str(&format!("{}. Cancel and go back\n", CANCEL_CHOICE));
        text.push_str(&"-".repeat(60));
        text
    }

    /// Numbered list of the chosen steps with their summaries
    pub fn render_selected(&self) -> String {
        let mut text = format!("\nSelected ({} steps):\n", self.selected.len());
        for (i, step) in self.selected.iter().enumerate() {
            text.push_str(&format!(
                "  {}. {}\n     -> {}\n",
                i + 1,
                step.descriptor().display_name,
                step.summary
            ));
        }
        text
    }
}
