//! The event interpreter: word matching, rule dispatch and the turn loop
//!
//! One `Interpreter` drives one session. The database is shared read-only;
//! the game state, presenter and dice belong to the session.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::conditions::all_hold;
use crate::config::{fill, Config};
use crate::database::{Database, EventTable, DIRECTION_COUNT};
use crate::dice::Dice;
use crate::error::SaveError;
use crate::event::{Action, WILDCARD};
use crate::presenter::Presenter;
use crate::savegame;
use crate::state::{GameState, SavedState, DARKNESS_FLAG};

/// Outcome of scanning an event table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// No event matched
    NoMatch,
    /// An action ended the turn, or at least one event ran to completion
    Handled,
    /// An action failed and aborted its event
    Error,
}

/// Outcome of a single action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    /// Keep running actions and scanning the table
    Continue,
    /// Stop scanning the table; the turn is done
    Handled,
    /// Abort the event and report failure
    Error,
}

/// Persistence the front end is asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    Save,
    Load,
}

/// What a submitted command did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input, nothing happened
    Empty,
    /// No word of the command is in the vocabulary
    NotUnderstood,
    /// A single direction word moved the player to this location
    Moved(u8),
    /// The response table was consulted
    Dispatched(DispatchResult),
    /// A save or load command word; no rules ran
    Request(SessionRequest),
}

/// A slot matches its own word. The wildcard stands only for a missing word.
fn word_matches(slot: u8, input: Option<u8>) -> bool {
    Some(slot) == input || (input.is_none() && slot == WILDCARD)
}

pub struct Interpreter {
    pub(crate) db: Arc<Database>,
    pub(crate) state: GameState,
    pub(crate) presenter: Box<dyn Presenter>,
    pub(crate) dice: Dice,
    pub(crate) config: Config,
    /// Word codes of the command being processed
    pub(crate) words: (Option<u8>, Option<u8>),
    requests: Vec<SessionRequest>,
    resetting: bool,
}

impl Interpreter {
    pub fn new(
        db: Arc<Database>,
        config: Config,
        presenter: Box<dyn Presenter>,
        dice: Dice,
    ) -> Interpreter {
        let state = GameState::new(&db);
        Interpreter {
            db,
            state,
            presenter,
            dice,
            config,
            words: (None, None),
            requests: Vec::new(),
            resetting: false,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Begin the session: reset, describe, run the process table
    pub fn start(&mut self) {
        info!(
            "Starting session: {} locations, {} objects",
            self.db.locations.len(),
            self.db.objects.len()
        );
        self.restart();
    }

    /// Reset the state and describe the start location. The process table
    /// runs unless this reset was reached from inside another reset's
    /// process pass.
    pub fn restart(&mut self) {
        self.state.reset(&self.db);
        self.describe();
        if self.resetting {
            debug!("Nested reset, skipping the process pass");
            return;
        }
        self.resetting = true;
        self.process_pass();
        self.resetting = false;
    }

    /// Scan an event table. Process events skip word matching.
    pub fn dispatch(
        &mut self,
        table: EventTable,
        is_system_pass: bool,
        word1: Option<u8>,
        word2: Option<u8>,
    ) -> DispatchResult {
        let db = Arc::clone(&self.db);
        let mut matched = false;
        for event in db.events(table) {
            if !is_system_pass
                && !(word_matches(event.word1, word1) && word_matches(event.word2, word2))
            {
                continue;
            }
            if !all_hold(&event.conditions, &self.state, &mut self.dice) {
                continue;
            }
            match self.run_actions(&event.actions) {
                ActionResult::Continue => matched = true,
                ActionResult::Handled => return DispatchResult::Handled,
                ActionResult::Error => return DispatchResult::Error,
            }
        }
        if matched {
            DispatchResult::Handled
        } else {
            DispatchResult::NoMatch
        }
    }

    fn run_actions(&mut self, actions: &[Action]) -> ActionResult {
        for action in actions {
            match self.execute(action) {
                ActionResult::Continue => {}
                result => return result,
            }
        }
        ActionResult::Continue
    }

    /// The unconditional pass over the process table
    pub fn process_pass(&mut self) {
        let result = self.dispatch(EventTable::Process, true, None, None);
        debug!("Process pass: {:?}", result);
    }

    /// Run one player command
    pub fn submit(&mut self, command: &str) -> TurnOutcome {
        let command = command.trim().to_uppercase();
        if command.is_empty() {
            return TurnOutcome::Empty;
        }
        self.show(&format!(
            "<font color=\"yellow\">&gt;&nbsp; {}</font>",
            escape(&command)
        ));
        self.state.turns += 1;

        let tokens: Vec<&str> = command.split_whitespace().collect();
        if let Some(first) = tokens.first() {
            if self.config.is_save_word(first) {
                return TurnOutcome::Request(SessionRequest::Save);
            }
            if self.config.is_load_word(first) {
                return TurnOutcome::Request(SessionRequest::Load);
            }
        }

        let codes: Vec<u8> = tokens
            .iter()
            .filter_map(|t| self.db.vocabulary.lookup(t))
            .filter(|&code| code != 0)
            .take(2)
            .collect();
        debug!("Command {:?} -> codes {:?}", command, codes);
        self.words = (codes.first().copied(), codes.get(1).copied());

        let outcome = if codes.is_empty() {
            let text = self.config.messages.not_understood.clone();
            self.show(&text);
            TurnOutcome::NotUnderstood
        } else if let Some(destination) = self.exit_for(&codes) {
            self.state.goto(destination);
            self.describe();
            TurnOutcome::Moved(destination)
        } else {
            let result = self.dispatch(EventTable::Responses, false, self.words.0, self.words.1);
            if result == DispatchResult::NoMatch {
                let text = if codes.len() == 1 && self.db.is_movement_word(codes[0]) {
                    self.config.messages.no_exit.clone()
                } else {
                    self.config.messages.cannot_do.clone()
                };
                self.show(&text);
            }
            TurnOutcome::Dispatched(result)
        };

        self.process_pass();
        outcome
    }

    /// Destination when the command is a single word naming an exit here
    fn exit_for(&self, codes: &[u8]) -> Option<u8> {
        if codes.len() != 1 {
            return None;
        }
        let location = self.db.locations.get(self.state.current_location as usize)?;
        location.connections.get(&codes[0]).copied()
    }

    /// Show the current location, or the darkness message when it is dark
    pub fn describe(&mut self) {
        if self.state.flag(DARKNESS_FLAG).unwrap_or_default() != 0 {
            let text = self.config.messages.darkness.clone();
            self.show_location(&text, &[false; DIRECTION_COUNT]);
            return;
        }
        let here = self.state.current_location;
        let Some(location) = self.db.locations.get(here as usize) else {
            warn!("Current location {} does not exist", here);
            return;
        };
        let mut text = location.description.clone();
        let present: Vec<&str> = self
            .state
            .objects_at(here)
            .into_iter()
            .filter_map(|o| self.db.objects.get(o))
            .map(|o| o.description.as_str())
            .collect();
        match present.as_slice() {
            [] => {}
            [only] => {
                text.push_str("<br>");
                text.push_str(&fill(&self.config.messages.also_see_one, only));
                text.push_str("<br>");
            }
            many => {
                text.push_str("<br>");
                text.push_str(&self.config.messages.also_see_many);
                for description in many {
                    text.push_str("<br>- ");
                    text.push_str(description);
                }
            }
        }
        let exits = self.db.open_exits(here);
        self.show_location(&text, &exits);
    }

    pub(crate) fn show(&mut self, html: &str) {
        if let Err(e) = self.presenter.print(html) {
            warn!("{}", e);
        }
    }

    fn show_location(&mut self, html: &str, exits: &[bool; DIRECTION_COUNT]) {
        if let Err(e) = self.presenter.location_changed(html, exits) {
            warn!("{}", e);
        }
    }

    pub(crate) fn request(&mut self, request: SessionRequest) {
        self.requests.push(request);
    }

    /// Persistence requests queued by SAVE and LOAD actions
    pub fn take_requests(&mut self) -> Vec<SessionRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn export_state(&self) -> SavedState {
        self.state.export()
    }

    /// Replace the state with a saved one and describe the saved location
    pub fn import_state(&mut self, saved: &SavedState) -> Result<(), SaveError> {
        self.state.import(saved, &self.db)?;
        self.describe();
        Ok(())
    }

    /// Carry out a persistence request against a save file, reporting the
    /// result to the player
    pub fn perform(&mut self, request: SessionRequest, path: &Path) -> Result<(), SaveError> {
        let result = match request {
            SessionRequest::Save => savegame::write_file(path, &self.export_state()),
            SessionRequest::Load => {
                savegame::read_file(path).and_then(|saved| self.import_state(&saved))
            }
        };
        let messages = &self.config.messages;
        let text = match (request, &result) {
            (SessionRequest::Save, Ok(())) => messages.saved.clone(),
            (SessionRequest::Load, Ok(())) => messages.loaded.clone(),
            (SessionRequest::Save, Err(_)) => messages.save_failed.clone(),
            (SessionRequest::Load, Err(_)) => messages.load_failed.clone(),
        };
        self.show(&text);
        result
    }
}

/// Escape typed text for the markup stream
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
