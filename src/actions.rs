//! Action handlers for the event interpreter
//!
//! Each handler mutates the game state and/or shows a message and returns
//! whether the event keeps running (`Continue`), ends the turn (`Handled`)
//! or fails (`Error`). A parameter that indexes past its table fails the
//! action with a warning.

use log::{debug, warn};

use crate::config::fill;
use crate::database::LocationRef;
use crate::event::Action;
use crate::interpreter::{ActionResult, Interpreter, SessionRequest};
use crate::opcodes::ActionKind;
use crate::presenter::{ColourTarget, DisplayError, Presenter};
use crate::state::{CARRIED_FLAG, FLAG_COUNT, SCORE_FLAG};

/// Which basic object action an AUTO action stands for
#[derive(Debug, Clone, Copy)]
enum ObjectVerb {
    Get,
    Drop,
    Wear,
    Remove,
}

impl Interpreter {
    /// Run one action
    pub fn execute(&mut self, action: &Action) -> ActionResult {
        debug!("{} {:?}", action.kind.mnemonic(), action.params);
        match action.kind {
            // ---- OBJECT ACTIONS ----
            ActionKind::Get => match self.object_param(action, 0) {
                Some(object) => self.object_verb(ObjectVerb::Get, object),
                None => ActionResult::Error,
            },
            ActionKind::Drop => match self.object_param(action, 0) {
                Some(object) => self.object_verb(ObjectVerb::Drop, object),
                None => ActionResult::Error,
            },
            ActionKind::Wear => match self.object_param(action, 0) {
                Some(object) => self.object_verb(ObjectVerb::Wear, object),
                None => ActionResult::Error,
            },
            ActionKind::Remove => match self.object_param(action, 0) {
                Some(object) => self.object_verb(ObjectVerb::Remove, object),
                None => ActionResult::Error,
            },
            ActionKind::AutoG => self.auto_verb(ObjectVerb::Get),
            ActionKind::AutoD => self.auto_verb(ObjectVerb::Drop),
            ActionKind::AutoW => self.auto_verb(ObjectVerb::Wear),
            ActionKind::AutoR => self.auto_verb(ObjectVerb::Remove),
            ActionKind::DropAll => {
                self.state.drop_all();
                ActionResult::Continue
            }
            ActionKind::Create => {
                let Some(object) = self.object_param(action, 0) else {
                    return ActionResult::Error;
                };
                let here = LocationRef::At(self.state.current_location);
                self.state.relocate(object, here);
                ActionResult::Continue
            }
            ActionKind::Destroy => {
                let Some(object) = self.object_param(action, 0) else {
                    return ActionResult::Error;
                };
                self.state.relocate(object, LocationRef::NotCreated);
                ActionResult::Continue
            }
            ActionKind::Place => {
                let (Some(object), Some(to)) =
                    (self.object_param(action, 0), self.place_param(action, 1))
                else {
                    return ActionResult::Error;
                };
                self.state.relocate(object, to);
                ActionResult::Continue
            }
            ActionKind::Swap => {
                let (Some(a), Some(b)) = (self.object_param(action, 0), self.object_param(action, 1))
                else {
                    return ActionResult::Error;
                };
                self.state.swap(a, b);
                ActionResult::Continue
            }

            // ---- LOCATION ----
            ActionKind::Goto => {
                let Some(location) = self.location_param(action, 0) else {
                    return ActionResult::Error;
                };
                self.state.goto(location);
                ActionResult::Continue
            }
            ActionKind::Desc => {
                self.describe();
                ActionResult::Continue
            }

            // ---- FLAGS ----
            ActionKind::Set | ActionKind::Clear | ActionKind::Let => {
                let Some(flag) = self.flag_param(action, 0) else {
                    return ActionResult::Error;
                };
                let value = match action.kind {
                    ActionKind::Set => u8::MAX,
                    ActionKind::Clear => 0,
                    _ => action.param(1),
                };
                self.state.set_flag(flag, value);
                ActionResult::Continue
            }
            ActionKind::Plus => {
                let Some(flag) = self.flag_param(action, 0) else {
                    return ActionResult::Error;
                };
                self.state.plus(flag, action.param(1));
                ActionResult::Continue
            }
            ActionKind::Minus => {
                let Some(flag) = self.flag_param(action, 0) else {
                    return ActionResult::Error;
                };
                self.state.minus(flag, action.param(1));
                ActionResult::Continue
            }

            // ---- OUTPUT ----
            ActionKind::Message => {
                let index = action.param(0) as usize;
                let Some(text) = self.db.messages.get(index).cloned() else {
                    warn!("MESSAGE {} is past the message table", index);
                    return ActionResult::Error;
                };
                self.show(&text);
                ActionResult::Continue
            }
            ActionKind::Inven => {
                let text = self.inventory();
                self.show(&text);
                ActionResult::Continue
            }
            ActionKind::Score => {
                let score = self.state.flag(SCORE_FLAG).unwrap_or_default();
                let text = fill(&self.config.messages.score, score);
                self.show(&text);
                ActionResult::Continue
            }
            ActionKind::Turns => {
                let text = fill(&self.config.messages.turns, self.state.turns);
                self.show(&text);
                ActionResult::Continue
            }
            ActionKind::Ok => {
                let text = self.config.messages.ok.clone();
                self.show(&text);
                ActionResult::Handled
            }
            ActionKind::Done => ActionResult::Handled,

            // ---- SESSION ----
            ActionKind::Quit => {
                self.restart();
                ActionResult::Continue
            }
            ActionKind::End => {
                self.wait_for_key();
                self.restart();
                ActionResult::Continue
            }
            ActionKind::AnyKey => {
                self.wait_for_key();
                ActionResult::Continue
            }
            ActionKind::Save => {
                self.request(SessionRequest::Save);
                ActionResult::Continue
            }
            ActionKind::Load => {
                self.request(SessionRequest::Load);
                ActionResult::Continue
            }

            // ---- SCREEN ----
            ActionKind::Pause => self.screen(|p, a| p.pause(a.param(0)), action),
            ActionKind::Cls => self.screen(|p, _| p.clear_screen(), action),
            ActionKind::Paper => {
                self.screen(|p, a| p.set_colour(ColourTarget::Paper, a.param(0)), action)
            }
            ActionKind::Ink => self.screen(|p, a| p.set_colour(ColourTarget::Ink, a.param(0)), action),
            ActionKind::Border => {
                self.screen(|p, a| p.set_colour(ColourTarget::Border, a.param(0)), action)
            }
            ActionKind::Beep => self.screen(|p, a| p.beep(a.param(0), a.param(1)), action),
        }
    }

    fn object_param(&self, action: &Action, i: usize) -> Option<usize> {
        let object = action.param(i) as usize;
        if object < self.db.objects.len() {
            Some(object)
        } else {
            warn!(
                "{}: object {} is past the object table",
                action.kind.mnemonic(),
                object
            );
            None
        }
    }

    fn location_param(&self, action: &Action, i: usize) -> Option<u8> {
        let location = action.param(i);
        if (location as usize) < self.db.locations.len() {
            Some(location)
        } else {
            warn!(
                "{}: location {} is past the location table",
                action.kind.mnemonic(),
                location
            );
            None
        }
    }

    /// PLACE accepts a location or one of the object state sentinels
    fn place_param(&self, action: &Action, i: usize) -> Option<LocationRef> {
        match LocationRef::from_byte(action.param(i)) {
            LocationRef::At(_) => self.location_param(action, i).map(LocationRef::At),
            sentinel => Some(sentinel),
        }
    }

    fn flag_param(&self, action: &Action, i: usize) -> Option<usize> {
        let flag = action.param(i) as usize;
        if flag < FLAG_COUNT {
            Some(flag)
        } else {
            warn!("{}: flag {} does not exist", action.kind.mnemonic(), flag);
            None
        }
    }

    fn refuse(&mut self, text: String) -> ActionResult {
        self.show(&text);
        ActionResult::Error
    }

    fn object_verb(&mut self, verb: ObjectVerb, object: usize) -> ActionResult {
        let Some(location) = self.state.object_location(object) else {
            return ActionResult::Error;
        };
        let here = LocationRef::At(self.state.current_location);
        let messages = &self.config.messages;
        match verb {
            ObjectVerb::Get => {
                if location.is_held() {
                    let text = messages.already_carrying.clone();
                    return self.refuse(text);
                }
                if location != here {
                    let text = messages.not_here.clone();
                    return self.refuse(text);
                }
                let carried = self.state.flag(CARRIED_FLAG).unwrap_or_default();
                if carried >= self.db.capacity {
                    debug!("GET {}: carrying {} already", object, carried);
                    return ActionResult::Error;
                }
                self.state.relocate(object, LocationRef::Carried);
            }
            ObjectVerb::Wear => {
                if location == LocationRef::Worn {
                    let text = messages.already_wearing.clone();
                    return self.refuse(text);
                }
                if location != LocationRef::Carried {
                    let text = messages.dont_have.clone();
                    return self.refuse(text);
                }
                self.state.relocate(object, LocationRef::Worn);
            }
            ObjectVerb::Drop => {
                if !location.is_held() {
                    let text = messages.dont_have.clone();
                    return self.refuse(text);
                }
                self.state.relocate(object, here);
            }
            ObjectVerb::Remove => {
                if location != LocationRef::Worn {
                    let text = messages.not_wearing.clone();
                    return self.refuse(text);
                }
                self.state.relocate(object, LocationRef::Carried);
            }
        }
        ActionResult::Continue
    }

    /// Apply a verb to the object whose noun is the command's second word
    fn auto_verb(&mut self, verb: ObjectVerb) -> ActionResult {
        let object = self.words.1.and_then(|noun| self.db.object_for_word(noun));
        match object {
            Some(object) => self.object_verb(verb, object),
            None => {
                debug!("{:?}: no object for noun {:?}", verb, self.words.1);
                let text = self.config.messages.not_here.clone();
                self.refuse(text)
            }
        }
    }

    fn inventory(&self) -> String {
        let messages = &self.config.messages;
        let mut items = String::new();
        for (object, location) in self.state.object_locations().iter().enumerate() {
            let Some(description) = self.db.objects.get(object).map(|o| &o.description) else {
                continue;
            };
            match location {
                LocationRef::Carried => items.push_str(&format!("<LI>{}</LI>", description)),
                LocationRef::Worn => items.push_str(&format!(
                    "<LI>{}{}</LI>",
                    description, messages.worn_suffix
                )),
                _ => {}
            }
        }
        if items.is_empty() {
            items = messages.inventory_empty.clone();
        }
        format!("{}<UL>{}</UL>", messages.inventory, items)
    }

    fn wait_for_key(&mut self) {
        let prompt = self.config.messages.press_key.clone();
        if let Err(e) = self.presenter.wait_for_key(&prompt) {
            warn!("{}", e);
        }
    }

    fn screen(
        &mut self,
        effect: impl FnOnce(&mut dyn Presenter, &Action) -> Result<(), DisplayError>,
        action: &Action,
    ) -> ActionResult {
        if let Err(e) = effect(self.presenter.as_mut(), action) {
            warn!("{}: {}", action.kind.mnemonic(), e);
        }
        ActionResult::Continue
    }
}
