//! Event records: a word pair guarding a list of conditions and a list of
//! actions
//!
//! An event table is a run of 4 byte headers `(word1, word2, stream)` closed
//! by a header whose first word is 0. The stream holds the conditions, a
//! 0xFF sentinel, the actions and another 0xFF sentinel.

use log::trace;

use crate::error::FormatError;
use crate::header::SchemaRevision;
use crate::opcodes::{action_kind, ActionKind, ConditionKind, LAST_SINGLE_PARAM_CONDITION};
use crate::snapshot::Snapshot;

/// Word slot value matching any input word
pub const WILDCARD: u8 = 255;

/// Closes both the condition and the action list
pub const LIST_END: u8 = 0xFF;

/// Size of one event header
pub const EVENT_HEADER_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub kind: ConditionKind,
    pub param1: u8,
    pub param2: Option<u8>,
}

impl Condition {
    pub fn new(kind: ConditionKind, param1: u8) -> Condition {
        Condition {
            kind,
            param1,
            param2: None,
        }
    }

    pub fn compare(kind: ConditionKind, flag: u8, value: u8) -> Condition {
        Condition {
            kind,
            param1: flag,
            param2: Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Opcode byte as stored, meaningful only with the revision's table
    pub opcode: u8,
    pub kind: ActionKind,
    pub params: Vec<u8>,
}

impl Action {
    /// Build an action for a revision; `None` when the revision lacks it
    pub fn new(revision: SchemaRevision, kind: ActionKind, params: &[u8]) -> Option<Action> {
        let opcode = kind.opcode_in(revision)?;
        if params.len() != kind.param_count() {
            return None;
        }
        Some(Action {
            opcode,
            kind,
            params: params.to_vec(),
        })
    }

    pub fn param(&self, i: usize) -> u8 {
        self.params.get(i).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub word1: u8,
    pub word2: u8,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

impl Event {
    /// Decode the event whose header starts at `addr`
    pub fn decode(
        snap: &Snapshot,
        addr: usize,
        revision: SchemaRevision,
    ) -> Result<Event, FormatError> {
        let word1 = snap.byte(addr, "event header")?;
        let word2 = snap.byte(addr + 1, "event header")?;
        let start = snap.pointer(addr + 2, "event stream")?;
        let mut p = start;

        let mut conditions = Vec::new();
        loop {
            let opcode = stream_byte(snap, p, start)?;
            if opcode == LIST_END {
                break;
            }
            let kind = ConditionKind::from_opcode(opcode)
                .ok_or(FormatError::UnknownCondition { opcode, addr: p })?;
            let param1 = stream_byte(snap, p + 1, start)?;
            let param2 = if opcode > LAST_SINGLE_PARAM_CONDITION {
                let value = stream_byte(snap, p + 2, start)?;
                p += 3;
                Some(value)
            } else {
                p += 2;
                None
            };
            conditions.push(Condition {
                kind,
                param1,
                param2,
            });
        }

        p += 1;
        let mut actions = Vec::new();
        loop {
            let opcode = stream_byte(snap, p, start)?;
            if opcode == LIST_END {
                break;
            }
            let kind = action_kind(revision, opcode).ok_or(FormatError::UnknownAction {
                opcode,
                revision: revision.marker(),
                addr: p,
            })?;
            let count = kind.param_count();
            let mut params = Vec::with_capacity(count);
            for i in 0..count {
                params.push(stream_byte(snap, p + 1 + i, start)?);
            }
            actions.push(Action {
                opcode,
                kind,
                params,
            });
            p += 1 + count;
        }

        trace!(
            "Event at {:#06x}: words {}/{}, {} conditions, {} actions",
            addr,
            word1,
            word2,
            conditions.len(),
            actions.len()
        );
        Ok(Event {
            word1,
            word2,
            conditions,
            actions,
        })
    }
}

fn stream_byte(snap: &Snapshot, addr: usize, start: usize) -> Result<u8, FormatError> {
    snap.byte(addr, "event stream")
        .map_err(|_| FormatError::Unterminated {
            what: "event stream",
            start,
        })
}

/// Decode every event of a table
pub fn decode_table(
    snap: &Snapshot,
    addr: usize,
    revision: SchemaRevision,
    what: &'static str,
) -> Result<Vec<Event>, FormatError> {
    let mut events = Vec::new();
    let mut p = addr;
    loop {
        let word1 = snap.byte(p, what).map_err(|_| FormatError::Unterminated {
            what,
            start: addr,
        })?;
        if word1 == 0 {
            break;
        }
        events.push(Event::decode(snap, p, revision)?);
        p += EVENT_HEADER_SIZE;
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(stream: &[u8], stream_addr: usize, headers: &[u8], header_addr: usize) -> Snapshot {
        let mut mem = vec![0u8; 0x400];
        mem[stream_addr..stream_addr + stream.len()].copy_from_slice(stream);
        mem[header_addr..header_addr + headers.len()].copy_from_slice(headers);
        Snapshot::from_memory(mem)
    }

    #[test]
    fn test_decode_conditions_and_actions() {
        // AT 3; EQ 12 7; | MESSAGE 4; PLUS 5 1; DONE |
        let stream = [0, 3, 13, 12, 7, 0xFF, 13, 4, 23, 5, 1, 4, 0xFF];
        let headers = [20, 255, 0x00, 0x02, 0];
        let snap = image(&stream, 0x200, &headers, 0x100);
        let events = decode_table(&snap, 0x100, SchemaRevision::V0, "responses").unwrap();
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!((e.word1, e.word2), (20, WILDCARD));
        assert_eq!(
            e.conditions,
            vec![
                Condition::new(ConditionKind::At, 3),
                Condition::compare(ConditionKind::Eq, 12, 7),
            ]
        );
        let kinds: Vec<_> = e.actions.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Message, ActionKind::Plus, ActionKind::Done]
        );
        assert_eq!(e.actions[1].params, vec![5, 1]);
    }

    #[test]
    fn test_same_opcode_differs_by_revision() {
        // Opcode 12 is GOTO in revision 0 and DROPALL in revision 5
        let stream = [0xFF, 12, 2, 0xFF];
        let headers = [1, 2, 0x00, 0x02, 0];
        let snap = image(&stream, 0x200, &headers, 0x100);
        let v0 = decode_table(&snap, 0x100, SchemaRevision::V0, "process").unwrap();
        assert_eq!(v0[0].actions[0].kind, ActionKind::Goto);
        assert_eq!(v0[0].actions[0].params, vec![2]);
        // Revision 5 reads DROPALL, then trips over the stray 2
        let v5 = decode_table(&snap, 0x100, SchemaRevision::V5, "process").unwrap();
        assert_eq!(v5[0].actions[0].kind, ActionKind::DropAll);
        assert_eq!(v5[0].actions[1].kind, ActionKind::Quit);
    }

    #[test]
    fn test_revision_7_clear_takes_one_flag() {
        // CLEAR 9; SET 10
        let stream = [0xFF, 32, 9, 31, 10, 0xFF];
        let headers = [1, 2, 0x00, 0x02, 0];
        let snap = image(&stream, 0x200, &headers, 0x100);
        let events = decode_table(&snap, 0x100, SchemaRevision::V7, "process").unwrap();
        let actions = &events[0].actions;
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind, ActionKind::Clear);
        assert_eq!(actions[0].params, vec![9]);
        assert_eq!(actions[1].kind, ActionKind::Set);
        assert_eq!(actions[1].params, vec![10]);
    }

    #[test]
    fn test_unknown_action_opcode() {
        let stream = [0xFF, 40, 0xFF];
        let headers = [1, 2, 0x00, 0x02, 0];
        let snap = image(&stream, 0x200, &headers, 0x100);
        assert!(matches!(
            decode_table(&snap, 0x100, SchemaRevision::V7, "process"),
            Err(FormatError::UnknownAction { opcode: 40, .. })
        ));
    }

    #[test]
    fn test_unknown_condition_opcode() {
        let stream = [16, 1, 0xFF, 0xFF];
        let headers = [1, 2, 0x00, 0x02, 0];
        let snap = image(&stream, 0x200, &headers, 0x100);
        assert!(matches!(
            decode_table(&snap, 0x100, SchemaRevision::V0, "process"),
            Err(FormatError::UnknownCondition { opcode: 16, .. })
        ));
    }

    #[test]
    fn test_unterminated_stream() {
        let mut mem = vec![0u8; 0x104];
        mem[0x100..0x104].copy_from_slice(&[1, 2, 0x00, 0x01]);
        // Stream at 0x100 is the header itself, which never reaches 0xFF
        let snap = Snapshot::from_memory(mem);
        assert!(matches!(
            Event::decode(&snap, 0x100, SchemaRevision::V0),
            Err(FormatError::Unterminated { .. })
        ));
    }
}
