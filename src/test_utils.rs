// Test utilities for building small databases without a snapshot file
use indexmap::IndexMap;

use crate::database::{resolve_directions, Database, Location, LocationRef, Object, LoadOptions};
use crate::dictionary::Vocabulary;
use crate::event::{Action, Condition, Event};
use crate::header::SchemaRevision;

/// Incrementally assembled game database
pub struct GameBuilder {
    db: Database,
    direction_words: Vec<String>,
}

impl GameBuilder {
    pub fn new(revision: SchemaRevision) -> Self {
        GameBuilder {
            db: Database {
                revision,
                capacity: 4,
                vocabulary: Vocabulary::default(),
                locations: Vec::new(),
                objects: Vec::new(),
                object_words: Vec::new(),
                messages: Vec::new(),
                system_messages: Vec::new(),
                responses: Vec::new(),
                process: Vec::new(),
                direction_codes: [None; 12],
            },
            direction_words: LoadOptions::default().direction_words,
        }
    }

    pub fn capacity(mut self, capacity: u8) -> Self {
        self.db.capacity = capacity;
        self
    }

    pub fn word(mut self, word: &str, code: u8) -> Self {
        self.db.vocabulary.insert(word, code);
        self
    }

    pub fn location(mut self, description: &str) -> Self {
        self.db.locations.push(Location {
            description: description.to_string(),
            connections: IndexMap::new(),
        });
        self
    }

    /// Exit from `from` taken with word `code`. Locations must exist already.
    pub fn connection(mut self, from: usize, code: u8, to: u8) -> Self {
        if let Some(location) = self.db.locations.get_mut(from) {
            location.connections.insert(code, to);
        }
        self
    }

    /// Object with its noun word; the noun lands in the object map for
    /// revisions 5 and 7
    pub fn object(mut self, description: &str, initial: LocationRef, noun: u8) -> Self {
        self.db.objects.push(Object {
            description: description.to_string(),
            initial_location: initial,
        });
        if self.db.revision.is_extended() {
            self.db.object_words.push(noun);
        }
        self
    }

    pub fn message(mut self, text: &str) -> Self {
        self.db.messages.push(text.to_string());
        self
    }

    pub fn system_message(mut self, text: &str) -> Self {
        self.db.system_messages.push(text.to_string());
        self
    }

    pub fn response(mut self, word1: u8, word2: u8, conditions: Vec<Condition>, actions: Vec<Action>) -> Self {
        self.db.responses.push(Event {
            word1,
            word2,
            conditions,
            actions,
        });
        self
    }

    /// Process events carry no words; the table walk stops at a zero
    /// `word1`, so they are stored with a wildcard pair
    pub fn process(mut self, conditions: Vec<Condition>, actions: Vec<Action>) -> Self {
        self.db.process.push(Event {
            word1: 255,
            word2: 255,
            conditions,
            actions,
        });
        self
    }

    pub fn build(mut self) -> Database {
        self.db.direction_codes = resolve_directions(&self.db.vocabulary, &self.direction_words);
        self.db
    }
}

/// Revision 0 images must hold exactly 25 system messages
pub fn standard_system_messages(builder: GameBuilder) -> GameBuilder {
    (0..25).fold(builder, |b, i| b.system_message(&format!("SYSTEM {}", i)))
}
