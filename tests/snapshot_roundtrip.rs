//! Round trips through the snapshot encoder and decoder
//!
//! Each test builds a database in memory, lays it out as a `.sna` file and
//! decodes it again, so the header walk, the double indirection of the text
//! tables, the event streams and the revision 0 fixed system messages are
//! all exercised without a real game file.

use quillplay::database::{Database, LoadOptions, LocationRef};
use quillplay::encoder::{encode_image, encode_snapshot, SIGNATURE_ADDRESS};
use quillplay::error::FormatError;
use quillplay::event::{Action, Condition, Event};
use quillplay::header::{Header, SchemaRevision, SYSTEM_MESSAGE_ADDRESSES};
use quillplay::opcodes::{ActionKind, ConditionKind};
use quillplay::snapshot::Snapshot;
use quillplay::test_utils::GameBuilder;
use quillplay::text::{decode_plain, ITEM_TERMINATOR};
use test_log::test;

fn act(revision: SchemaRevision, kind: ActionKind, params: &[u8]) -> Action {
    Action::new(revision, kind, params).unwrap()
}

fn game(revision: SchemaRevision) -> Database {
    let mut builder = GameBuilder::new(revision)
        .capacity(3)
        .word("N", 2)
        .word("NORT", 2)
        .word("S", 6)
        .word("UP", 10)
        .word("GET", 20)
        .word("LOOK", 21)
        .word("LAMP", 40)
        .word("ROPE", 41)
        .location("A dusty <FONT COLOR=#ff0000>red room")
        .location("Garden<P>Birds sing.")
        .location("Tower top")
        .connection(0, 2, 1)
        .connection(0, 10, 2)
        .connection(1, 6, 0)
        .connection(2, 6, 0)
        .object("a lamp", LocationRef::At(0), 40)
        .object("a rope", LocationRef::Carried, 41)
        .object("a hat", LocationRef::Worn, 42)
        .object("a ghost", LocationRef::NotCreated, 43)
        .message("Fish &amp; chips")
        .message("Nothing happens.")
        .response(
            20,
            40,
            vec![
                Condition::new(ConditionKind::Present, 0),
                Condition::compare(ConditionKind::Lt, 1, 3),
            ],
            vec![
                act(revision, ActionKind::Get, &[0]),
                act(revision, ActionKind::Ok, &[]),
            ],
        )
        .response(
            21,
            255,
            vec![],
            vec![
                act(revision, ActionKind::Desc, &[]),
                act(revision, ActionKind::Plus, &[50, 7]),
            ],
        )
        .process(
            vec![
                Condition::new(ConditionKind::Chance, 30),
                Condition::compare(ConditionKind::Eq, 5, 0),
            ],
            vec![
                act(revision, ActionKind::Message, &[1]),
                act(revision, ActionKind::Beep, &[10, 20]),
            ],
        );
    builder = if revision.is_extended() {
        builder
            .system_message("It is dark.")
            .system_message("You can also see:")
    } else {
        (0..25).fold(builder, |b, i| b.system_message(&format!("S{}", i)))
    };
    if revision == SchemaRevision::V7 {
        builder = builder.response(
            20,
            255,
            vec![],
            vec![act(revision, ActionKind::AutoG, &[]), act(revision, ActionKind::Done, &[])],
        );
    }
    builder.build()
}

#[test]
fn test_revision_0_round_trip() {
    let built = game(SchemaRevision::V0);
    let file = encode_snapshot(&built).unwrap();
    let decoded = Database::load(&file, &LoadOptions::default()).unwrap();
    assert_eq!(decoded, built);
    assert!(decoded.object_words.is_empty());
}

#[test]
fn test_revision_5_round_trip() {
    let built = game(SchemaRevision::V5);
    let file = encode_snapshot(&built).unwrap();
    let decoded = Database::load(&file, &LoadOptions::default()).unwrap();
    assert_eq!(decoded, built);
    assert_eq!(decoded.object_words, vec![40, 41, 42, 43]);
}

#[test]
fn test_revision_7_round_trip() {
    let built = game(SchemaRevision::V7);
    let file = encode_snapshot(&built).unwrap();
    let decoded = Database::load(&file, &LoadOptions::default()).unwrap();
    assert_eq!(decoded, built);
    assert_eq!(decoded.responses[2].actions[0].kind, ActionKind::AutoG);
}

#[test]
fn test_decoded_text_keeps_markup() {
    let file = encode_snapshot(&game(SchemaRevision::V5)).unwrap();
    let db = Database::load(&file, &LoadOptions::default()).unwrap();
    assert_eq!(db.locations[0].description, "A dusty <FONT COLOR=#ff0000>red room");
    assert_eq!(db.locations[1].description, "Garden<P>Birds sing.");
    assert_eq!(db.messages[0], "Fish &amp; chips");
    assert_eq!(db.objects[2].initial_location, LocationRef::Worn);
    assert_eq!(db.locations[0].connections.get(&10), Some(&2));
}

#[test]
fn test_revision_0_system_messages_sit_at_fixed_addresses() {
    let image = encode_image(&game(SchemaRevision::V0)).unwrap();
    let (text, consumed) = decode_plain(&image, SYSTEM_MESSAGE_ADDRESSES[3], ITEM_TERMINATOR).unwrap();
    assert_eq!(text, "S3");
    assert_eq!(consumed, 3);
}

#[test]
fn test_directions_resolve_through_synonyms() {
    // "NORT" shares the code of "N"; both select the north slot
    let file = encode_snapshot(&game(SchemaRevision::V5)).unwrap();
    let options = LoadOptions {
        revision: None,
        direction_words: vec![
            "NW", "NORT", "NE", "W", "E", "SW", "S", "SE", "IN", "OUT", "UP", "DOWN",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
    };
    let db = Database::load(&file, &options).unwrap();
    assert_eq!(db.direction_codes[1], Some(2));
    let exits = db.open_exits(0);
    assert!(exits[1]);
    assert!(exits[10]);
    assert!(!exits[6]);
}

#[test]
fn test_forced_revision_overrides_marker() {
    let image = encode_image(&game(SchemaRevision::V5)).unwrap();
    let snap = Snapshot::from_memory(image);
    let read = Header::locate(&snap, None).unwrap();
    assert_eq!(read.revision, SchemaRevision::V5);
    assert_eq!(read.signature, SIGNATURE_ADDRESS);
    let forced = Header::locate(&snap, Some(SchemaRevision::V0)).unwrap();
    assert_eq!(forced.revision, SchemaRevision::V0);
    assert_eq!(forced.system_messages, None);
}

#[test]
fn test_missing_signature() {
    let result = Database::load(&[0u8; 2048], &LoadOptions::default());
    assert_eq!(result, Err(FormatError::SignatureNotFound));
}

#[test]
fn test_unknown_action_opcode_is_reported() {
    // Opcode 30 is past the 27 entry table of revision 0
    let mut db = game(SchemaRevision::V0);
    db.process.push(Event {
        word1: 255,
        word2: 255,
        conditions: vec![],
        actions: vec![Action {
            opcode: 30,
            kind: ActionKind::Beep,
            params: vec![],
        }],
    });
    let file = encode_snapshot(&db).unwrap();
    match Database::load(&file, &LoadOptions::default()) {
        Err(FormatError::UnknownAction {
            opcode, revision, ..
        }) => {
            assert_eq!(opcode, 30);
            assert_eq!(revision, 0);
        }
        other => panic!("expected an unknown action, got {:?}", other.map(|_| ())),
    }
}

/// Texts long enough to cross the 32 column wrap, some more than once
fn wrapping_game(revision: SchemaRevision) -> Database {
    let mut db = game(revision);
    db.locations[2].description =
        "You are standing in a long narrow corridor. Torches flicker on the damp walls.".to_string();
    db.objects[0].description = "a battered brass lamp with a cracked chimney".to_string();
    db.messages[1] =
        "The <FONT COLOR=#ffff00>guard looks at you and shrugs.<P>Nothing at all happens here.".to_string();
    db
}

#[test]
fn test_reencoding_reproduces_the_bytes() {
    for revision in [SchemaRevision::V0, SchemaRevision::V5, SchemaRevision::V7] {
        let original = encode_snapshot(&wrapping_game(revision)).unwrap();
        let decoded = Database::load(&original, &LoadOptions::default()).unwrap();
        assert!(decoded.locations[2].description.contains("narro w corridor"));
        let again = encode_snapshot(&decoded).unwrap();
        assert!(again == original, "revision {:?} bytes differ", revision);
        assert_eq!(Database::load(&again, &LoadOptions::default()).unwrap(), decoded);
    }
}
