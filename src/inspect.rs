//! Cross references and readable listings of the event tables
//!
//! Nothing here touches game state; the inspector only reads a decoded
//! `Database`.

use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;

use crate::database::{Database, EventTable, LocationRef};
use crate::event::{Action, Condition, Event, WILDCARD};
use crate::opcodes::ParamKind;

/// Position of an event in one of the two tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventRef {
    pub table: EventTable,
    pub index: usize,
}

/// Everything that leads to, leaves from or mentions one location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationXref {
    pub location: u8,
    /// Exits as (movement word, destination)
    pub exits: Vec<(u8, u8)>,
    /// Locations with an exit into this one
    pub entrances: Vec<u8>,
    /// Objects that start here
    pub objects: Vec<usize>,
    pub events: Vec<EventRef>,
}

pub struct Inspector<'a> {
    db: &'a Database,
}

impl<'a> Inspector<'a> {
    pub fn new(db: &'a Database) -> Inspector<'a> {
        Inspector { db }
    }

    fn all_events(&self) -> impl Iterator<Item = (EventRef, &'a Event)> {
        let db = self.db;
        [EventTable::Responses, EventTable::Process]
            .into_iter()
            .flat_map(move |table| {
                db.events(table)
                    .iter()
                    .enumerate()
                    .map(move |(index, event)| (EventRef { table, index }, event))
            })
    }

    fn select(
        &self,
        condition_hit: impl Fn(&Condition) -> bool,
        action_hit: impl Fn(&Action) -> bool,
    ) -> Vec<EventRef> {
        self.all_events()
            .filter(|(_, event)| {
                event.conditions.iter().any(&condition_hit) || event.actions.iter().any(&action_hit)
            })
            .map(|(r, _)| r)
            .collect()
    }

    /// Events testing for or moving things to a location
    pub fn events_for_location(&self, location: u8) -> Vec<EventRef> {
        self.select(
            |c| c.kind.names_location() && c.param1 == location,
            |a| match a.kind.param_kind() {
                ParamKind::Location => a.param(0) == location,
                ParamKind::ObjectLocation => a.param(1) == location,
                _ => false,
            },
        )
    }

    /// Events testing or moving an object
    pub fn events_for_object(&self, object: u8) -> Vec<EventRef> {
        self.select(
            |c| c.kind.names_object() && c.param1 == object,
            |a| match a.kind.param_kind() {
                ParamKind::Object | ParamKind::ObjectLocation => a.param(0) == object,
                ParamKind::ObjectPair => a.param(0) == object || a.param(1) == object,
                _ => false,
            },
        )
    }

    pub fn events_for_message(&self, message: u8) -> Vec<EventRef> {
        self.select(
            |_| false,
            |a| a.kind.param_kind() == ParamKind::Message && a.param(0) == message,
        )
    }

    /// Events reading or writing a flag
    pub fn events_for_flag(&self, flag: u8) -> Vec<EventRef> {
        self.select(
            |c| c.kind.names_flag() && c.param1 == flag,
            |a| {
                matches!(a.kind.param_kind(), ParamKind::Flag | ParamKind::FlagValue)
                    && a.param(0) == flag
            },
        )
    }

    pub fn location_xref(&self, location: u8) -> Option<LocationXref> {
        let here = self.db.locations.get(location as usize)?;
        let exits = here.connections.iter().map(|(&w, &d)| (w, d)).collect();
        let entrances = self
            .db
            .locations
            .iter()
            .enumerate()
            .filter(|(_, l)| l.connections.values().any(|&d| d == location))
            .map(|(i, _)| i as u8)
            .collect();
        let objects = self
            .db
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.initial_location == LocationRef::At(location))
            .map(|(i, _)| i)
            .collect();
        Some(LocationXref {
            location,
            exits,
            entrances,
            objects,
            events: self.events_for_location(location),
        })
    }

    pub fn event(&self, r: EventRef) -> Option<&'a Event> {
        self.db.events(r.table).get(r.index)
    }

    pub fn listing(&self, r: EventRef) -> Option<EventListing<'a>> {
        self.event(r).map(|event| EventListing { db: self.db, event })
    }

    /// Every event of a table, one line each
    pub fn table_listing(&self, table: EventTable) -> String {
        let mut out = String::new();
        for (index, event) in self.db.events(table).iter().enumerate() {
            out.push_str(&format!(
                "{:>4}  {}\n",
                index,
                EventListing { db: self.db, event }
            ));
        }
        out
    }
}

/// One event rendered with vocabulary words and mnemonics
pub struct EventListing<'a> {
    db: &'a Database,
    event: &'a Event,
}

impl EventListing<'_> {
    fn word(&self, code: u8) -> String {
        if code == WILDCARD {
            return "_".to_string();
        }
        match self.db.vocabulary.word(code) {
            Some(w) => w.to_string(),
            None => format!("#{}", code),
        }
    }
}

impl Display for EventListing<'_> {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(
            f,
            "{:<5}{:<5}",
            self.word(self.event.word1),
            self.word(self.event.word2)
        )?;
        let conditions: Vec<String> = self
            .event
            .conditions
            .iter()
            .map(|c| match c.param2 {
                Some(value) => format!("{} {} {}", c.kind.mnemonic(), c.param1, value),
                None => format!("{} {}", c.kind.mnemonic(), c.param1),
            })
            .collect();
        let actions: Vec<String> = self
            .event
            .actions
            .iter()
            .map(|a| {
                let mut text = a.kind.mnemonic().to_string();
                for p in &a.params {
                    text.push_str(&format!(" {}", p));
                }
                text
            })
            .collect();
        write!(f, "{} => {}", conditions.join(" / "), actions.join(" / "))
    }
}
