//! Wavebar CLI - interactive front end for wavebar-core

pub mod config;
pub mod console;
pub mod prompt;
pub mod session;

pub use config::AppConfig;
pub use console::Console;
pub use prompt::{InputError, Prompt, PromptEvent, PromptState, StrategyChoice};
pub use session::{Session, SessionState};
