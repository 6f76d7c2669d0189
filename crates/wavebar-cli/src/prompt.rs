//! Input validation for console prompts
//!
//! A [`Prompt`] is a small state machine that knows nothing about the
//! console. Every line the operator types is fed to it and it answers with a
//! [`PromptEvent`]; the caller keeps asking until it gets `Accepted`.
//!
//! ```text
//! Awaiting --valid--> Valid
//!    |  ^
//! invalid|  |retry
//!    v  |
//! InvalidRetry
//! ```
//!
//! The `last` command is recognised by every prompt and leaves it in
//! `Awaiting`.

use std::path::PathBuf;
use thiserror::Error;

/// In-band command that shows the stored parameters
pub const LAST_COMMAND: &str = "last";

/// Why an input line was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Input of type {expected} expected!")]
    WrongType { expected: &'static str },

    #[error("Value must be {0}")]
    OutOfRange(&'static str),

    #[error("Please answer with one of: {0}")]
    NotAChoice(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Awaiting,
    Valid,
    InvalidRetry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptEvent<T> {
    /// Input parsed; the prompt is done
    Accepted(T),
    /// Operator asked for the stored parameters
    ShowLast,
    /// Blank line, ask again silently
    Empty,
    /// Input didn't parse; ask again
    Rejected(InputError),
}

/// Strategy menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyChoice {
    ScaledAverage,
    AbsolutePeak,
}

pub struct Prompt<T> {
    label: String,
    parse: fn(&str) -> Result<T, InputError>,
    state: PromptState,
}

impl<T> Prompt<T> {
    pub fn new(label: impl Into<String>, parse: fn(&str) -> Result<T, InputError>) -> Self {
        Self {
            label: label.into(),
            parse,
            state: PromptState::Awaiting,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    /// Process one line of input
    pub fn feed(&mut self, input: &str) -> PromptEvent<T> {
        let input = input.trim();

        if input == LAST_COMMAND {
            self.state = PromptState::Awaiting;
            return PromptEvent::ShowLast;
        }
        if input.is_empty() {
            self.state = PromptState::Awaiting;
            return PromptEvent::Empty;
        }

        match (self.parse)(input) {
            Ok(value) => {
                self.state = PromptState::Valid;
                PromptEvent::Accepted(value)
            }
            Err(e) => {
                self.state = PromptState::InvalidRetry;
                PromptEvent::Rejected(e)
            }
        }
    }
}

impl Prompt<u32> {
    pub fn positive_int(label: impl Into<String>) -> Self {
        Self::new(label, parse_positive_int)
    }

    pub fn non_negative_int(label: impl Into<String>) -> Self {
        Self::new(label, parse_non_negative_int)
    }
}

impl Prompt<f32> {
    pub fn scale(label: impl Into<String>) -> Self {
        Self::new(label, parse_scale)
    }
}

impl Prompt<PathBuf> {
    pub fn path(label: impl Into<String>) -> Self {
        Self::new(label, parse_path)
    }
}

impl Prompt<StrategyChoice> {
    pub fn strategy(label: impl Into<String>) -> Self {
        Self::new(label, parse_strategy)
    }
}

impl Prompt<bool> {
    pub fn yes_no(label: impl Into<String>) -> Self {
        Self::new(label, parse_yes_no)
    }
}

fn parse_int(input: &str) -> Result<i64, InputError> {
    input
        .parse::<i64>()
        .map_err(|_| InputError::WrongType { expected: "integer" })
}

fn parse_positive_int(input: &str) -> Result<u32, InputError> {
    let value = parse_int(input)?;
    if value <= 0 {
        return Err(InputError::OutOfRange("greater than zero"));
    }
    u32::try_from(value).map_err(|_| InputError::OutOfRange("at most 4294967295"))
}

fn parse_non_negative_int(input: &str) -> Result<u32, InputError> {
    let value = parse_int(input)?;
    if value < 0 {
        return Err(InputError::OutOfRange("zero or greater"));
    }
    u32::try_from(value).map_err(|_| InputError::OutOfRange("at most 4294967295"))
}

fn parse_scale(input: &str) -> Result<f32, InputError> {
    let value = input
        .parse::<f32>()
        .map_err(|_| InputError::WrongType { expected: "float" })?;
    // Negative scales would also collide with the absolute-peak sentinel
    if !value.is_finite() || value < 0.0 {
        return Err(InputError::OutOfRange("a finite number, zero or greater"));
    }
    Ok(value)
}

/// Paths dropped onto a terminal often arrive quoted
fn parse_path(input: &str) -> Result<PathBuf, InputError> {
    let cleaned = input.replace('"', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(InputError::WrongType { expected: "path" });
    }
    Ok(PathBuf::from(cleaned))
}

fn parse_strategy(input: &str) -> Result<StrategyChoice, InputError> {
    match parse_int(input)? {
        1 => Ok(StrategyChoice::ScaledAverage),
        2 => Ok(StrategyChoice::AbsolutePeak),
        _ => Err(InputError::NotAChoice("1, 2")),
    }
}

fn parse_yes_no(input: &str) -> Result<bool, InputError> {
    match input.to_ascii_lowercase().as_str() {
        "y" => Ok(true),
        "n" => Ok(false),
        _ => Err(InputError::NotAChoice("y, n")),
    }
}
