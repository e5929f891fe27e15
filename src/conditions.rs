//! Condition evaluation
//!
//! Each kind is a predicate over the game state. A condition naming an
//! object or flag that does not exist is false.

use log::warn;

use crate::database::LocationRef;
use crate::dice::Dice;
use crate::event::Condition;
use crate::opcodes::ConditionKind;
use crate::state::GameState;

pub fn evaluate(condition: &Condition, state: &GameState, dice: &mut Dice) -> bool {
    let p1 = condition.param1;
    let here = state.current_location;
    match condition.kind {
        ConditionKind::At => here == p1,
        ConditionKind::NotAt => here != p1,
        ConditionKind::AtGt => here > p1,
        ConditionKind::AtLt => here < p1,
        ConditionKind::Present => object_is(state, p1, |l| l == LocationRef::At(here)),
        ConditionKind::Absent => object_is(state, p1, |l| l != LocationRef::At(here)),
        ConditionKind::Worn => object_is(state, p1, |l| l == LocationRef::Worn),
        ConditionKind::NotWorn => object_is(state, p1, |l| l != LocationRef::Worn),
        ConditionKind::Carried => object_is(state, p1, |l| l == LocationRef::Carried),
        ConditionKind::NotCarried => object_is(state, p1, |l| l != LocationRef::Carried),
        ConditionKind::Chance => dice.chance(p1),
        ConditionKind::Zero => flag_is(state, p1, |v| v == 0),
        ConditionKind::NotZero => flag_is(state, p1, |v| v != 0),
        ConditionKind::Eq => compare(condition, state, |v, x| v == x),
        ConditionKind::Gt => compare(condition, state, |v, x| v > x),
        ConditionKind::Lt => compare(condition, state, |v, x| v < x),
    }
}

/// All conditions hold
pub fn all_hold(conditions: &[Condition], state: &GameState, dice: &mut Dice) -> bool {
    conditions.iter().all(|c| evaluate(c, state, dice))
}

fn object_is(state: &GameState, object: u8, test: impl Fn(LocationRef) -> bool) -> bool {
    match state.object_location(object as usize) {
        Some(location) => test(location),
        None => {
            warn!("Condition names object {} which does not exist", object);
            false
        }
    }
}

fn flag_is(state: &GameState, flag: u8, test: impl Fn(u16) -> bool) -> bool {
    match state.flag_value(flag as usize) {
        Some(value) => test(value),
        None => {
            warn!("Condition names flag {} which does not exist", flag);
            false
        }
    }
}

fn compare(condition: &Condition, state: &GameState, test: impl Fn(u16, u16) -> bool) -> bool {
    let value = condition.param2.unwrap_or_default() as u16;
    flag_is(state, condition.param1, |v| test(v, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::SchemaRevision;
    use crate::test_utils::GameBuilder;
    use test_log::test;

    fn state() -> GameState {
        let db = GameBuilder::new(SchemaRevision::V0)
            .location("room 0")
            .location("room 1")
            .location("room 2")
            .location("room 3")
            .object("lamp", LocationRef::At(0), 0)
            .object("coat", LocationRef::Worn, 0)
            .object("key", LocationRef::Carried, 0)
            .build();
        let mut state = GameState::new(&db);
        state.reset(&db);
        state.goto(2);
        state
    }

    fn holds(kind: ConditionKind, p1: u8, state: &GameState) -> bool {
        evaluate(&Condition::new(kind, p1), state, &mut Dice::new_predictable(1))
    }

    #[test]
    fn test_location_conditions() {
        let s = state();
        assert!(holds(ConditionKind::At, 2, &s));
        assert!(holds(ConditionKind::NotAt, 1, &s));
        assert!(holds(ConditionKind::AtGt, 1, &s));
        assert!(!holds(ConditionKind::AtLt, 2, &s));
    }

    #[test]
    fn test_object_conditions() {
        let mut s = state();
        assert!(holds(ConditionKind::Absent, 0, &s));
        s.goto(0);
        assert!(holds(ConditionKind::Present, 0, &s));
        assert!(holds(ConditionKind::Worn, 1, &s));
        assert!(holds(ConditionKind::NotCarried, 1, &s));
        assert!(holds(ConditionKind::Carried, 2, &s));
        assert!(holds(ConditionKind::NotWorn, 2, &s));
        // Unknown objects make every object condition false
        assert!(!holds(ConditionKind::Absent, 9, &s));
        assert!(!holds(ConditionKind::NotWorn, 9, &s));
    }

    #[test]
    fn test_flag_conditions() {
        let mut s = state();
        let mut dice = Dice::new_predictable(1);
        assert!(holds(ConditionKind::Zero, 5, &s));
        s.set_flag(5, 3);
        assert!(holds(ConditionKind::NotZero, 5, &s));
        assert!(evaluate(&Condition::compare(ConditionKind::Eq, 5, 3), &s, &mut dice));
        assert!(evaluate(&Condition::compare(ConditionKind::Gt, 5, 2), &s, &mut dice));
        assert!(evaluate(&Condition::compare(ConditionKind::Lt, 5, 4), &s, &mut dice));
        assert!(!holds(ConditionKind::Zero, 64, &s));
        assert!(!holds(ConditionKind::NotZero, 64, &s));
    }

    #[test]
    fn test_counter_flags_compare_both_bytes() {
        let mut s = state();
        let mut dice = Dice::new_predictable(1);
        s.set_flag(49, 1);
        assert!(holds(ConditionKind::NotZero, 48, &s));
        assert!(evaluate(&Condition::compare(ConditionKind::Gt, 48, 255), &s, &mut dice));
        assert!(!evaluate(&Condition::compare(ConditionKind::Eq, 48, 0), &s, &mut dice));
    }

    #[test]
    fn test_odd_flag_reads_its_own_byte() {
        let mut s = state();
        let mut dice = Dice::new_predictable(1);
        s.set_flag(50, 1);
        assert!(holds(ConditionKind::Zero, 49, &s));
        s.set_flag(51, 4);
        assert!(evaluate(&Condition::compare(ConditionKind::Eq, 51, 4), &s, &mut dice));
        assert!(!evaluate(&Condition::compare(ConditionKind::Eq, 50, 1), &s, &mut dice));
        assert!(!holds(ConditionKind::NotZero, 63, &s));
    }

    #[test]
    fn test_chance_bounds() {
        let s = state();
        let mut dice = Dice::new_predictable(9);
        for _ in 0..100 {
            assert!(!evaluate(&Condition::new(ConditionKind::Chance, 0), &s, &mut dice));
            assert!(evaluate(&Condition::new(ConditionKind::Chance, 100), &s, &mut dice));
        }
    }
}
