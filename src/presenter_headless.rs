//! Headless presenter for tests and non-interactive runs
//!
//! Everything is recorded in a shared `Transcript`, so a test can hand the
//! presenter to an interpreter and still read what was shown.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::database::DIRECTION_COUNT;
use crate::markup::to_plain_text;
use crate::presenter::{ColourTarget, DisplayError, Presenter};

/// What a headless session showed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Printed fragments in order
    pub fragments: Vec<String>,
    /// Location descriptions with their exit vectors
    pub locations: Vec<(String, [bool; DIRECTION_COUNT])>,
    pub key_waits: usize,
    pub pauses: Vec<u8>,
    pub colours: Vec<(ColourTarget, u8)>,
    pub beeps: Vec<(u8, u8)>,
    pub clears: usize,
}

impl Transcript {
    /// Fragments and location descriptions, in the order they were shown,
    /// as plain text
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| to_plain_text(f))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn last_location(&self) -> Option<&(String, [bool; DIRECTION_COUNT])> {
        self.locations.last()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.fragments.iter().any(|f| f.contains(needle))
    }

    pub fn clear(&mut self) {
        *self = Transcript::default();
    }
}

#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    transcript: Rc<RefCell<Transcript>>,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        HeadlessPresenter::default()
    }

    /// A presenter and a handle on its transcript
    pub fn with_transcript() -> (Self, Rc<RefCell<Transcript>>) {
        let presenter = HeadlessPresenter::new();
        let transcript = Rc::clone(&presenter.transcript);
        (presenter, transcript)
    }
}

impl Presenter for HeadlessPresenter {
    fn print(&mut self, html: &str) -> Result<(), DisplayError> {
        self.transcript.borrow_mut().fragments.push(html.to_string());
        Ok(())
    }

    fn location_changed(
        &mut self,
        description: &str,
        exits: &[bool; DIRECTION_COUNT],
    ) -> Result<(), DisplayError> {
        let mut transcript = self.transcript.borrow_mut();
        transcript.fragments.push(description.to_string());
        transcript.locations.push((description.to_string(), *exits));
        Ok(())
    }

    fn wait_for_key(&mut self, _prompt: &str) -> Result<(), DisplayError> {
        debug!("Headless: wait_for_key");
        self.transcript.borrow_mut().key_waits += 1;
        Ok(())
    }

    fn pause(&mut self, ticks: u8) -> Result<(), DisplayError> {
        debug!("Headless: pause({})", ticks);
        self.transcript.borrow_mut().pauses.push(ticks);
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<(), DisplayError> {
        self.transcript.borrow_mut().clears += 1;
        Ok(())
    }

    fn set_colour(&mut self, target: ColourTarget, value: u8) -> Result<(), DisplayError> {
        self.transcript.borrow_mut().colours.push((target, value));
        Ok(())
    }

    fn beep(&mut self, duration: u8, pitch: u8) -> Result<(), DisplayError> {
        self.transcript.borrow_mut().beeps.push((duration, pitch));
        Ok(())
    }
}
