//! Presentation interface between the interpreter and whatever shows the
//! game
//!
//! The interpreter emits HTML-like fragments (see `markup`) and location
//! updates. Screen effects of the newer schema revisions (colours, border,
//! beeps, clearing) default to no-ops.

use std::fmt;

use log::debug;

use crate::database::DIRECTION_COUNT;
use crate::presenter_headless::HeadlessPresenter;
use crate::presenter_terminal::TerminalPresenter;

/// Which colour a PAPER, INK or BORDER action sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourTarget {
    Paper,
    Ink,
    Border,
}

pub trait Presenter {
    /// Show a text fragment produced by a turn
    fn print(&mut self, html: &str) -> Result<(), DisplayError>;

    /// Show a location description with its open exits, indexed in
    /// `Direction::ALL` order
    fn location_changed(
        &mut self,
        description: &str,
        exits: &[bool; DIRECTION_COUNT],
    ) -> Result<(), DisplayError>;

    /// Block until the player presses a key
    fn wait_for_key(&mut self, _prompt: &str) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Suspend for `ticks` fiftieths of a second
    fn pause(&mut self, _ticks: u8) -> Result<(), DisplayError> {
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn set_colour(&mut self, _target: ColourTarget, _value: u8) -> Result<(), DisplayError> {
        Ok(())
    }

    fn beep(&mut self, _duration: u8, _pitch: u8) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Display error type
#[derive(Debug, Clone)]
pub struct DisplayError {
    pub message: String,
}

impl DisplayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Display error: {}", self.message)
    }
}

impl std::error::Error for DisplayError {}

impl From<std::io::Error> for DisplayError {
    fn from(error: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", error))
    }
}

/// Presenter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenterMode {
    /// Terminal output, coloured only when stdout is a terminal
    #[default]
    Auto,
    Terminal,
    /// Record output without showing it
    Headless,
}

/// Whether stdin and stdout are both attached to a terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Build a presenter; `direction_names` label the exit line of the
/// terminal presenter
pub fn create_presenter(
    mode: PresenterMode,
    direction_names: &[String],
) -> Result<Box<dyn Presenter>, DisplayError> {
    debug!("Creating presenter with mode {:?}", mode);
    let terminal = |colour: bool| -> Result<Box<dyn Presenter>, DisplayError> {
        let mut presenter = TerminalPresenter::new(colour, is_interactive())?;
        presenter.set_direction_names(direction_names);
        Ok(Box::new(presenter))
    };
    match mode {
        PresenterMode::Auto => terminal(atty::is(atty::Stream::Stdout)),
        PresenterMode::Terminal => terminal(true),
        PresenterMode::Headless => Ok(Box::new(HeadlessPresenter::new())),
    }
}
