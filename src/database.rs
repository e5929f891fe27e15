//! The decoded game database
//!
//! Every table is reached from the header. Objects, locations, messages,
//! system messages and connections sit behind a pointer table whose first
//! entry addresses the first item; the items themselves are consecutive.

use indexmap::IndexMap;
use log::{debug, warn};

use crate::dictionary::Vocabulary;
use crate::error::FormatError;
use crate::event::{decode_table, Event, LIST_END};
use crate::header::{Header, SchemaRevision, SYSTEM_MESSAGE_ADDRESSES};
use crate::snapshot::Snapshot;
use crate::text::{decode_item, decode_plain, ITEM_TERMINATOR};

/// Number of fixed movement directions
pub const DIRECTION_COUNT: usize = 12;

/// Word codes below this value are movement words by engine convention
pub const MOVEMENT_WORD_LIMIT: u8 = 16;

/// Direction order used for exit vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
    In,
    Out,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::West,
        Direction::East,
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
        Direction::In,
        Direction::Out,
        Direction::Up,
        Direction::Down,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            Direction::NorthWest => "NW",
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::West => "W",
            Direction::East => "E",
            Direction::SouthWest => "SW",
            Direction::South => "S",
            Direction::SouthEast => "SE",
            Direction::In => "IN",
            Direction::Out => "OUT",
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }
}

/// Where an object is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationRef {
    At(u8),
    Carried,
    Worn,
    NotCreated,
    Invalid,
}

impl LocationRef {
    pub const INVALID: u8 = 0xFF;
    pub const CARRIED: u8 = 0xFE;
    pub const WORN: u8 = 0xFD;
    pub const NOT_CREATED: u8 = 0xFC;

    pub fn from_byte(b: u8) -> LocationRef {
        match b {
            LocationRef::INVALID => LocationRef::Invalid,
            LocationRef::CARRIED => LocationRef::Carried,
            LocationRef::WORN => LocationRef::Worn,
            LocationRef::NOT_CREATED => LocationRef::NotCreated,
            loc => LocationRef::At(loc),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            LocationRef::At(loc) => loc,
            LocationRef::Carried => LocationRef::CARRIED,
            LocationRef::Worn => LocationRef::WORN,
            LocationRef::NotCreated => LocationRef::NOT_CREATED,
            LocationRef::Invalid => LocationRef::INVALID,
        }
    }

    /// Carried or worn objects count against the capacity
    pub fn is_held(self) -> bool {
        matches!(self, LocationRef::Carried | LocationRef::Worn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub description: String,
    /// Movement word code to destination, in table order
    pub connections: IndexMap<u8, u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub description: String,
    pub initial_location: LocationRef,
}

/// The two event tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTable {
    Responses,
    Process,
}

/// Decoding choices the image cannot answer by itself
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Force a schema revision instead of reading the marker byte
    pub revision: Option<SchemaRevision>,
    /// Vocabulary words of the twelve directions, in `Direction::ALL` order
    pub direction_words: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            revision: None,
            direction_words: Direction::ALL
                .iter()
                .map(|d| d.short_name().to_string())
                .collect(),
        }
    }
}

/// Immutable tables of one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub revision: SchemaRevision,
    pub capacity: u8,
    pub vocabulary: Vocabulary,
    pub locations: Vec<Location>,
    pub objects: Vec<Object>,
    /// Noun word of each object (revisions 5 and 7 only)
    pub object_words: Vec<u8>,
    pub messages: Vec<String>,
    pub system_messages: Vec<String>,
    pub responses: Vec<Event>,
    pub process: Vec<Event>,
    pub direction_codes: [Option<u8>; DIRECTION_COUNT],
}

impl Database {
    /// Decode a `.sna` file
    pub fn load(file: &[u8], options: &LoadOptions) -> Result<Database, FormatError> {
        let snap = Snapshot::from_file_bytes(file);
        let header = Header::locate(&snap, options.revision)?;
        Database::decode(&snap, &header, &options.direction_words)
    }

    /// Decode all tables named by a located header
    pub fn decode<S: AsRef<str>>(
        snap: &Snapshot,
        header: &Header,
        direction_words: &[S],
    ) -> Result<Database, FormatError> {
        let revision = header.revision;
        let vocabulary = Vocabulary::decode(snap, header.vocabulary)?;

        let responses = decode_table(snap, header.responses, revision, "response table")?;
        let process = decode_table(snap, header.process, revision, "process table")?;

        let object_texts = decode_items(
            snap,
            header.objects,
            header.object_count as usize,
            "object table",
        )?;
        let mut objects = Vec::with_capacity(object_texts.len());
        for (i, description) in object_texts.into_iter().enumerate() {
            let position = snap.byte(header.object_positions + i, "object positions")?;
            objects.push(Object {
                description,
                initial_location: LocationRef::from_byte(position),
            });
        }

        let object_words = match header.object_map {
            Some(map) => (0..objects.len())
                .map(|i| snap.byte(map + i, "object map"))
                .collect::<Result<Vec<u8>, FormatError>>()?,
            None => Vec::new(),
        };

        let location_texts = decode_items(
            snap,
            header.locations,
            header.location_count as usize,
            "location table",
        )?;
        let locations = decode_connections(snap, header.connections, location_texts)?;

        let messages = decode_items(
            snap,
            header.messages,
            header.message_count as usize,
            "message table",
        )?;

        let system_messages = match header.system_messages {
            Some(table) => decode_items(
                snap,
                table,
                header.system_message_count as usize,
                "system message table",
            )?,
            None => SYSTEM_MESSAGE_ADDRESSES
                .iter()
                .map(|&addr| decode_plain(snap.memory(), addr, ITEM_TERMINATOR).map(|(s, _)| s))
                .collect::<Result<Vec<String>, FormatError>>()?,
        };

        let direction_codes = resolve_directions(&vocabulary, direction_words);

        debug!(
            "Decoded database: {} locations, {} objects, {} messages, {} responses, {} process events",
            locations.len(),
            objects.len(),
            messages.len(),
            responses.len(),
            process.len()
        );

        Ok(Database {
            revision,
            capacity: header.capacity,
            vocabulary,
            locations,
            objects,
            object_words,
            messages,
            system_messages,
            responses,
            process,
            direction_codes,
        })
    }

    pub fn events(&self, table: EventTable) -> &[Event] {
        match table {
            EventTable::Responses => &self.responses,
            EventTable::Process => &self.process,
        }
    }

    /// Whether a failed single-word command should get the "no exit" reply
    pub fn is_movement_word(&self, code: u8) -> bool {
        code < MOVEMENT_WORD_LIMIT || self.direction_codes.contains(&Some(code))
    }

    /// Which of the twelve directions lead somewhere from a location
    pub fn open_exits(&self, location: u8) -> [bool; DIRECTION_COUNT] {
        let mut exits = [false; DIRECTION_COUNT];
        if let Some(loc) = self.locations.get(location as usize) {
            for (slot, code) in exits.iter_mut().zip(self.direction_codes.iter()) {
                *slot = code.map_or(false, |c| loc.connections.contains_key(&c));
            }
        }
        exits
    }

    /// Object whose noun word is `word`
    pub fn object_for_word(&self, word: u8) -> Option<usize> {
        self.object_words.iter().position(|&w| w == word)
    }
}

/// Resolve the configured direction words against the vocabulary
pub fn resolve_directions<S: AsRef<str>>(
    vocabulary: &Vocabulary,
    words: &[S],
) -> [Option<u8>; DIRECTION_COUNT] {
    let mut codes = [None; DIRECTION_COUNT];
    for (slot, direction) in codes.iter_mut().zip(Direction::ALL.iter()) {
        let word = words.get(*direction as usize).map(|w| w.as_ref());
        *slot = word.and_then(|w| vocabulary.lookup(w));
        if slot.is_none() {
            warn!(
                "Direction {} ({:?}) is not in the vocabulary",
                direction.short_name(),
                word
            );
        }
    }
    codes
}

/// Decode `count` consecutive texts whose start is the first entry of the
/// pointer table at `table`
fn decode_items(
    snap: &Snapshot,
    table: usize,
    count: usize,
    what: &'static str,
) -> Result<Vec<String>, FormatError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut p = snap.pointer(table, what)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let (text, len) = decode_item(snap.memory(), p)?;
        items.push(text);
        p += len;
    }
    Ok(items)
}

/// Walk the connection lists of all locations with one shared cursor
fn decode_connections(
    snap: &Snapshot,
    table: usize,
    texts: Vec<String>,
) -> Result<Vec<Location>, FormatError> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }
    let start = snap.pointer(table, "connection table")?;
    let unterminated = |_| FormatError::Unterminated {
        what: "connection table",
        start,
    };
    let mut p = start;
    let mut locations = Vec::with_capacity(texts.len());
    for description in texts {
        let mut connections = IndexMap::new();
        loop {
            let word = snap.byte(p, "connection table").map_err(unterminated)?;
            if word == LIST_END {
                p += 1;
                break;
            }
            let destination = snap.byte(p + 1, "connection table").map_err(unterminated)?;
            connections.insert(word, destination);
            p += 2;
        }
        locations.push(Location {
            description,
            connections,
        });
    }
    Ok(locations)
}
