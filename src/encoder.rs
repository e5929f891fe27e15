//! Snapshot encoder
//!
//! Lays a database out the way the decoder expects to find it: the signature
//! and header at `SIGNATURE_ADDRESS`, revision 0 system messages at their
//! fixed addresses, and every other table packed upwards from
//! `TABLE_ADDRESS`. Text tables get one pointer per item even though the
//! decoder only follows the first.

use log::{debug, warn};

use crate::database::Database;
use crate::dictionary::WORD_LENGTH;
use crate::error::FormatError;
use crate::event::{Event, EVENT_HEADER_SIZE, LIST_END};
use crate::header::{HEADER_OFFSET, REVISION_MARKER_OFFSET, SYSTEM_MESSAGE_ADDRESSES};
use crate::snapshot::{LOAD_PADDING, SIGNATURE_LEAD, SIGNATURE_TAIL};
use crate::text::{encode_item, encode_plain, ITEM_TERMINATOR};

/// Size of the target machine's address space
pub const IMAGE_SIZE: usize = 0x10000;

pub const SIGNATURE_ADDRESS: usize = 0x6000;

/// First address used for tables
pub const TABLE_ADDRESS: usize = 0x7000;

/// Revision 0 system messages may run up to the table area
const SYSTEM_MESSAGE_LIMIT: usize = TABLE_ADDRESS;

struct ImageWriter {
    image: Vec<u8>,
    cursor: usize,
}

impl ImageWriter {
    fn new() -> ImageWriter {
        ImageWriter {
            image: vec![0u8; IMAGE_SIZE],
            cursor: TABLE_ADDRESS,
        }
    }

    fn put_at(&mut self, addr: usize, bytes: &[u8], what: &'static str) -> Result<(), FormatError> {
        let end = addr + bytes.len();
        if end > self.image.len() {
            return Err(FormatError::DoesNotFit { what, addr });
        }
        self.image[addr..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Append at the cursor and return the address written to
    fn append(&mut self, bytes: &[u8], what: &'static str) -> Result<usize, FormatError> {
        let addr = self.cursor;
        self.put_at(addr, bytes, what)?;
        self.cursor += bytes.len();
        Ok(addr)
    }

    fn word_at(&mut self, addr: usize, value: usize, what: &'static str) -> Result<(), FormatError> {
        let value = u16::try_from(value).map_err(|_| FormatError::DoesNotFit { what, addr })?;
        self.put_at(addr, &value.to_le_bytes(), what)
    }

    /// Reserve `count` words for a pointer table
    fn reserve_pointers(&mut self, count: usize, what: &'static str) -> Result<usize, FormatError> {
        // An empty table still needs an address inside the image
        self.append(&vec![0u8; 2 * count.max(1)], what)
    }

    /// Pointer table followed by the consecutive items it addresses
    fn text_table(&mut self, items: &[String], what: &'static str) -> Result<usize, FormatError> {
        let table = self.reserve_pointers(items.len(), what)?;
        for (i, text) in items.iter().enumerate() {
            let addr = self.append(&encode_item(text)?, what)?;
            self.word_at(table + 2 * i, addr, what)?;
        }
        Ok(table)
    }

    fn event_table(&mut self, events: &[Event], what: &'static str) -> Result<usize, FormatError> {
        let table = self.append(&vec![0u8; EVENT_HEADER_SIZE * (events.len() + 1)], what)?;
        for (i, event) in events.iter().enumerate() {
            if event.word1 == 0 {
                // A zero first word would end the table early
                return Err(FormatError::DoesNotFit {
                    what,
                    addr: table + EVENT_HEADER_SIZE * i,
                });
            }
            let stream = self.append(&event_stream(event), what)?;
            let header = table + EVENT_HEADER_SIZE * i;
            self.put_at(header, &[event.word1, event.word2], what)?;
            self.word_at(header + 2, stream, what)?;
        }
        Ok(table)
    }
}

/// Conditions, sentinel, actions, sentinel
fn event_stream(event: &Event) -> Vec<u8> {
    let mut stream = Vec::new();
    for condition in &event.conditions {
        stream.push(condition.kind.opcode());
        stream.push(condition.param1);
        if condition.kind.takes_value() {
            stream.push(condition.param2.unwrap_or_default());
        }
    }
    stream.push(LIST_END);
    for action in &event.actions {
        stream.push(action.opcode);
        stream.extend_from_slice(&action.params);
    }
    stream.push(LIST_END);
    stream
}

fn count(n: usize, what: &'static str) -> Result<u8, FormatError> {
    u8::try_from(n).map_err(|_| FormatError::DoesNotFit {
        what,
        addr: SIGNATURE_ADDRESS + HEADER_OFFSET,
    })
}

fn vocabulary_records(db: &Database) -> Result<Vec<u8>, FormatError> {
    let mut records = Vec::new();
    for (word, code) in db.vocabulary.iter() {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > WORD_LENGTH || chars.iter().any(|&c| c as u32 > 0xFE) {
            return Err(FormatError::DoesNotFit {
                what: "vocabulary word",
                addr: records.len(),
            });
        }
        for i in 0..WORD_LENGTH {
            let c = chars.get(i).copied().unwrap_or(' ');
            records.push(255 - c as u8);
        }
        records.push(code);
    }
    records.push(0);
    Ok(records)
}

/// Build the full 64K memory image of a database
pub fn encode_image(db: &Database) -> Result<Vec<u8>, FormatError> {
    let revision = db.revision;
    let mut w = ImageWriter::new();

    // Signature and revision marker
    w.put_at(SIGNATURE_ADDRESS, &[SIGNATURE_LEAD], "signature")?;
    for (i, b) in SIGNATURE_TAIL.iter().enumerate() {
        w.put_at(SIGNATURE_ADDRESS + 2 * (i + 1), &[*b], "signature")?;
    }
    w.put_at(
        SIGNATURE_ADDRESS + REVISION_MARKER_OFFSET,
        &[revision.marker()],
        "revision marker",
    )?;

    let vocabulary = w.append(&vocabulary_records(db)?, "vocabulary")?;
    let responses = w.event_table(&db.responses, "response table")?;
    let process = w.event_table(&db.process, "process table")?;

    let objects = w.text_table(
        &db.objects.iter().map(|o| o.description.clone()).collect::<Vec<_>>(),
        "object table",
    )?;
    let locations = w.text_table(
        &db.locations.iter().map(|l| l.description.clone()).collect::<Vec<_>>(),
        "location table",
    )?;
    let messages = w.text_table(&db.messages, "message table")?;

    let connections = w.reserve_pointers(db.locations.len(), "connection table")?;
    for (i, location) in db.locations.iter().enumerate() {
        let mut list = Vec::with_capacity(2 * location.connections.len() + 1);
        for (&word, &destination) in &location.connections {
            list.push(word);
            list.push(destination);
        }
        list.push(LIST_END);
        let addr = w.append(&list, "connection table")?;
        w.word_at(connections + 2 * i, addr, "connection table")?;
    }

    let positions: Vec<u8> = db
        .objects
        .iter()
        .map(|o| o.initial_location.to_byte())
        .collect();
    // Keep a valid address even with no objects
    let object_positions = w.append(&positions, "object positions")?;
    if positions.is_empty() {
        w.append(&[0], "object positions")?;
    }

    let base = SIGNATURE_ADDRESS + HEADER_OFFSET;
    let counts = [
        db.capacity,
        count(db.objects.len(), "object count")?,
        count(db.locations.len(), "location count")?,
        count(db.messages.len(), "message count")?,
    ];
    w.put_at(base, &counts, "header")?;

    if revision.is_extended() {
        let system_messages = w.text_table(&db.system_messages, "system message table")?;

        let mut map = db.object_words.clone();
        if map.len() != db.objects.len() {
            warn!(
                "{} object words for {} objects; padding the object map",
                map.len(),
                db.objects.len()
            );
            map.resize(db.objects.len(), 0);
        }
        let object_map = w.append(&map, "object map")?;
        if map.is_empty() {
            w.append(&[0], "object map")?;
        }

        let p = base + 1;
        w.put_at(
            p + 3,
            &[count(db.system_messages.len(), "system message count")?],
            "header",
        )?;
        let pointers = [
            responses,
            process,
            objects,
            locations,
            messages,
            system_messages,
            connections,
            vocabulary,
            object_positions,
            object_map,
        ];
        for (i, addr) in pointers.iter().enumerate() {
            w.word_at(p + 4 + 2 * i, *addr, "header")?;
        }
    } else {
        if db.system_messages.len() > SYSTEM_MESSAGE_ADDRESSES.len() {
            warn!(
                "Only {} system messages fit a revision 0 image, dropping {}",
                SYSTEM_MESSAGE_ADDRESSES.len(),
                db.system_messages.len() - SYSTEM_MESSAGE_ADDRESSES.len()
            );
        }
        for (i, &addr) in SYSTEM_MESSAGE_ADDRESSES.iter().enumerate() {
            let text = db.system_messages.get(i).map(String::as_str).unwrap_or("");
            let bytes = encode_plain(text, ITEM_TERMINATOR)?;
            let limit = SYSTEM_MESSAGE_ADDRESSES
                .get(i + 1)
                .copied()
                .unwrap_or(SYSTEM_MESSAGE_LIMIT);
            if addr + bytes.len() > limit {
                return Err(FormatError::DoesNotFit {
                    what: "system message",
                    addr,
                });
            }
            w.put_at(addr, &bytes, "system message")?;
        }

        let pointers = [
            responses,
            process,
            objects,
            locations,
            messages,
            connections,
            vocabulary,
            object_positions,
        ];
        for (i, addr) in pointers.iter().enumerate() {
            w.word_at(base + 4 + 2 * i, *addr, "header")?;
        }
    }

    debug!(
        "Encoded revision {} database, tables end at {:#06x}",
        revision.marker(),
        w.cursor
    );
    Ok(w.image)
}

/// Encode a database as the contents of a `.sna` file
pub fn encode_snapshot(db: &Database) -> Result<Vec<u8>, FormatError> {
    let image = encode_image(db)?;
    Ok(image[LOAD_PADDING..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{LoadOptions, LocationRef};
    use crate::event::{Action, Condition};
    use crate::header::{Header, SchemaRevision};
    use crate::opcodes::{ActionKind, ConditionKind};
    use crate::snapshot::Snapshot;
    use crate::test_utils::GameBuilder;

    fn sample(revision: SchemaRevision) -> Database {
        GameBuilder::new(revision)
            .word("N", 2)
            .word("LAMP", 20)
            .location("Dark cellar")
            .location("Kitchen")
            .connection(0, 2, 1)
            .object("a lamp", LocationRef::At(1), 20)
            .message("Hello")
            .response(
                20,
                255,
                vec![Condition::compare(ConditionKind::Eq, 5, 1)],
                vec![Action::new(revision, ActionKind::Message, &[0]).unwrap()],
            )
            .build()
    }

    #[test]
    fn test_header_is_found_where_written() {
        let image = encode_image(&sample(SchemaRevision::V5)).unwrap();
        let snap = Snapshot::from_memory(image);
        let header = Header::locate(&snap, None).unwrap();
        assert_eq!(header.signature, SIGNATURE_ADDRESS);
        assert_eq!(header.revision, SchemaRevision::V5);
        assert_eq!(header.object_count, 1);
        assert_eq!(header.location_count, 2);
        assert_eq!(header.vocabulary, TABLE_ADDRESS);
    }

    #[test]
    fn test_snapshot_starts_at_load_address() {
        let file = encode_snapshot(&sample(SchemaRevision::V7)).unwrap();
        assert_eq!(file.len(), IMAGE_SIZE - LOAD_PADDING);
        let db = Database::load(&file, &LoadOptions::default()).unwrap();
        assert_eq!(db.revision, SchemaRevision::V7);
        assert_eq!(db.object_words, vec![20]);
    }

    #[test]
    fn test_event_stream_layout() {
        let event = &sample(SchemaRevision::V0).responses[0];
        // EQ 5 1 | MESSAGE 0 |
        assert_eq!(event_stream(event), vec![13, 5, 1, 0xFF, 13, 0, 0xFF]);
    }

    #[test]
    fn test_long_vocabulary_word_does_not_fit() {
        let db = GameBuilder::new(SchemaRevision::V5)
            .word("LANTERN", 3)
            .build();
        assert!(matches!(
            encode_image(&db),
            Err(FormatError::DoesNotFit { what: "vocabulary word", .. })
        ));
    }

    #[test]
    fn test_long_system_message_does_not_fit() {
        // The 16th fixed slot only has room for four characters
        let mut builder = GameBuilder::new(SchemaRevision::V0);
        for i in 0..25 {
            builder = builder.system_message(if i == 15 { "TOO LONG" } else { "ok" });
        }
        assert!(matches!(
            encode_image(&builder.build()),
            Err(FormatError::DoesNotFit { what: "system message", .. })
        ));
    }
}
