use anyhow::Result;
use inquire::error::InquireError;
use inquire::validator::Validation;
use inquire::{Confirm, Select, Text};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::error::Error;

use crate::error::GwtError;
use crate::git::parse::is_valid_name;

/// Type alias for validation functions
pub type ValidatorFn = fn(&str) -> Result<Validation, Box<dyn Error + Send + Sync>>;

/// Validator for worktree and branch names.
///
/// # Errors
/// Never fails; invalid input is reported through [`Validation::Invalid`].
pub fn name_validator(input: &str) -> Result<Validation, Box<dyn Error + Send + Sync>> {
    if input.is_empty() {
        Ok(Validation::Invalid("Name is required".into()))
    } else if is_valid_name(input) {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid("Invalid name".into()))
    }
}

/// Trait for providing interactive prompts.
///
/// Every method returns `Ok(None)` when the user cancels (Esc or Ctrl-C);
/// callers treat that as a clean exit rather than a failure.
pub trait Prompter {
    /// Picks one of `options`, returning its index.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be used for prompting.
    fn select(&self, message: &str, options: &[String], default: usize) -> Result<Option<usize>>;

    /// Like [`Prompter::select`], but the list is filtered as the user types.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be used for prompting.
    fn search(&self, message: &str, options: &[String]) -> Result<Option<usize>>;

    /// Reads a worktree or branch name.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be used for prompting.
    fn text(&self, message: &str, placeholder: &str, default: Option<&str>)
    -> Result<Option<String>>;

    /// Asks a yes/no question.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be used for prompting.
    fn confirm(&self, message: &str, default: bool) -> Result<Option<bool>>;
}

fn cancelled_as_none<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(GwtError::Prompt(e.to_string()).into()),
    }
}

/// Real implementation using inquire for production use
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn select(&self, message: &str, options: &[String], default: usize) -> Result<Option<usize>> {
        let result = Select::new(message, options.to_vec())
            .with_starting_cursor(default)
            .with_vim_mode(true)
            .raw_prompt();
        Ok(cancelled_as_none(result)?.map(|choice| choice.index))
    }

    fn search(&self, message: &str, options: &[String]) -> Result<Option<usize>> {
        let result = Select::new(message, options.to_vec())
            .with_page_size(10)
            .with_help_message("type to filter, ↑↓ to move, enter to select, esc to finish")
            .raw_prompt();
        Ok(cancelled_as_none(result)?.map(|choice| choice.index))
    }

    fn text(
        &self,
        message: &str,
        placeholder: &str,
        default: Option<&str>,
    ) -> Result<Option<String>> {
        let validator: ValidatorFn = name_validator;
        let mut prompt = Text::new(message)
            .with_placeholder(placeholder)
            .with_validator(validator);
        if let Some(default) = default {
            prompt = prompt.with_default(default);
        }
        cancelled_as_none(prompt.prompt())
    }

    fn confirm(&self, message: &str, default: bool) -> Result<Option<bool>> {
        cancelled_as_none(Confirm::new(message).with_default(default).prompt())
    }
}

/// A scripted answer for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Pick the first option whose label starts with this text.
    Choose(String),
    Text(String),
    Confirm(bool),
    Cancel,
}

impl Answer {
    pub fn choose(label: impl Into<String>) -> Self {
        Answer::Choose(label.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Answer::Text(value.into())
    }
}

/// Mock implementation for testing that replays predetermined answers in order.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    #[must_use]
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Messages of every prompt shown so far.
    #[must_use]
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, message: &str) -> Result<Answer> {
        self.asked.borrow_mut().push(message.to_string());
        match self.answers.borrow_mut().pop_front() {
            Some(answer) => Ok(answer),
            None => anyhow::bail!("Unexpected prompt: {}", message),
        }
    }

    fn pick(&self, message: &str, options: &[String]) -> Result<Option<usize>> {
        match self.next(message)? {
            Answer::Choose(label) => options
                .iter()
                .position(|option| option.starts_with(&label))
                .map(Some)
                .ok_or_else(|| anyhow::anyhow!("Mock response '{}' not found in options", label)),
            Answer::Cancel => Ok(None),
            other => anyhow::bail!("Expected a choice for '{}', scripted {:?}", message, other),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, message: &str, options: &[String], _default: usize) -> Result<Option<usize>> {
        self.pick(message, options)
    }

    fn search(&self, message: &str, options: &[String]) -> Result<Option<usize>> {
        self.pick(message, options)
    }

    fn text(
        &self,
        message: &str,
        _placeholder: &str,
        default: Option<&str>,
    ) -> Result<Option<String>> {
        match self.next(message)? {
            Answer::Text(value) if value.is_empty() => Ok(default.map(ToString::to_string)),
            Answer::Text(value) => Ok(Some(value)),
            Answer::Cancel => Ok(None),
            other => anyhow::bail!("Expected text for '{}', scripted {:?}", message, other),
        }
    }

    fn confirm(&self, message: &str, _default: bool) -> Result<Option<bool>> {
        match self.next(message)? {
            Answer::Confirm(value) => Ok(Some(value)),
            Answer::Cancel => Ok(None),
            other => anyhow::bail!("Expected confirmation for '{}', scripted {:?}", message, other),
        }
    }
}
