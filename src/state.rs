//! Mutable session state: current location, object locations, flags and the
//! turn counter
//!
//! Flags up to 47 are plain bytes. From 48 on, flags pair up into
//! little-endian 16-bit counters: the even flag holds the low byte and the
//! odd flag after it the high byte. An odd flag addressed directly is read
//! and written as a single byte.

use log::{debug, trace};

use crate::database::{Database, LocationRef};
use crate::error::SaveError;

pub const FLAG_COUNT: usize = 64;

/// Non-zero when the location is dark
pub const DARKNESS_FLAG: usize = 0;
/// Number of carried or worn objects
pub const CARRIED_FLAG: usize = 1;
/// Mirror of the current location
pub const LOCATION_FLAG: usize = 2;
/// Percentage shown by SCORE
pub const SCORE_FLAG: usize = 30;
/// Highest flag that is a plain byte
pub const LAST_BYTE_FLAG: usize = 47;

/// What a save file holds: the flag array and one location byte per object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedState {
    pub flags: [u8; FLAG_COUNT],
    pub object_locations: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub current_location: u8,
    pub turns: u32,
    object_locations: Vec<LocationRef>,
    flags: [u8; FLAG_COUNT],
}

impl GameState {
    /// State of a freshly loaded game, before its first reset. The player
    /// starts at location 1 and the carried count reads 255 until `reset`.
    pub fn new(db: &Database) -> GameState {
        let current_location = if db.locations.len() > 1 { 1 } else { 0 };
        let mut flags = [0u8; FLAG_COUNT];
        flags[CARRIED_FLAG] = 255;
        flags[LOCATION_FLAG] = current_location;
        GameState {
            current_location,
            turns: 0,
            object_locations: db.objects.iter().map(|o| o.initial_location).collect(),
            flags,
        }
    }

    /// Restart at location 0 with every object back at its initial
    /// location. Flags other than the carried count and the location
    /// mirror keep their values.
    pub fn reset(&mut self, db: &Database) {
        self.current_location = 0;
        self.flags[LOCATION_FLAG] = 0;
        self.turns = 0;
        self.object_locations = db.objects.iter().map(|o| o.initial_location).collect();
        self.flags[CARRIED_FLAG] = self.carried_count().min(u8::MAX as usize) as u8;
        debug!(
            "Reset: {} objects, {} held",
            self.object_locations.len(),
            self.flags[CARRIED_FLAG]
        );
    }

    pub fn flags(&self) -> &[u8; FLAG_COUNT] {
        &self.flags
    }

    /// Raw byte of a flag
    pub fn flag(&self, flag: usize) -> Option<u8> {
        self.flags.get(flag).copied()
    }

    /// Value of a flag, combining the pair for 16-bit counters
    pub fn flag_value(&self, flag: usize) -> Option<u16> {
        let low = self.flag(flag)? as u16;
        match self.high_partner(flag) {
            Some(high) => Some(low | (self.flags[high] as u16) << 8),
            None => Some(low),
        }
    }

    pub fn set_flag(&mut self, flag: usize, value: u8) -> Option<()> {
        *self.flags.get_mut(flag)? = value;
        Some(())
    }

    /// Add to a flag. Byte flags saturate at 255; counter flags carry into
    /// their high byte, which wraps.
    pub fn plus(&mut self, flag: usize, amount: u8) -> Option<()> {
        let sum = self.flag(flag)? as u16 + amount as u16;
        if sum <= u8::MAX as u16 {
            self.flags[flag] = sum as u8;
        } else if let Some(high) = self.high_partner(flag) {
            self.flags[flag] = (sum - 256) as u8;
            self.flags[high] = self.flags[high].wrapping_add(1);
        } else {
            self.flags[flag] = u8::MAX;
        }
        trace!("PLUS {} {} -> {:?}", flag, amount, self.flag_value(flag));
        Some(())
    }

    /// Subtract from a flag. Byte flags stop at 0; counter flags borrow from
    /// their high byte, and a counter that would go negative becomes 0.
    pub fn minus(&mut self, flag: usize, amount: u8) -> Option<()> {
        let low = self.flag(flag)?;
        if low >= amount {
            self.flags[flag] = low - amount;
        } else if let Some(high) = self.high_partner(flag) {
            if self.flags[high] == 0 {
                self.flags[flag] = 0;
            } else {
                self.flags[flag] = (low as u16 + 256 - amount as u16) as u8;
                self.flags[high] -= 1;
            }
        } else {
            self.flags[flag] = 0;
        }
        trace!("MINUS {} {} -> {:?}", flag, amount, self.flag_value(flag));
        Some(())
    }

    /// High byte of the counter whose low byte is `flag`
    fn high_partner(&self, flag: usize) -> Option<usize> {
        if flag > LAST_BYTE_FLAG && flag % 2 == 0 && flag + 1 < FLAG_COUNT {
            Some(flag + 1)
        } else {
            None
        }
    }

    pub fn goto(&mut self, location: u8) {
        self.current_location = location;
        self.flags[LOCATION_FLAG] = location;
    }

    pub fn object_count(&self) -> usize {
        self.object_locations.len()
    }

    pub fn object_location(&self, object: usize) -> Option<LocationRef> {
        self.object_locations.get(object).copied()
    }

    pub fn object_locations(&self) -> &[LocationRef] {
        &self.object_locations
    }

    /// Move an object and keep the carried count in step. Returns where the
    /// object was.
    pub fn relocate(&mut self, object: usize, to: LocationRef) -> Option<LocationRef> {
        let slot = self.object_locations.get_mut(object)?;
        let from = *slot;
        *slot = to;
        if from.is_held() {
            self.flags[CARRIED_FLAG] = self.flags[CARRIED_FLAG].saturating_sub(1);
        }
        if to.is_held() {
            self.flags[CARRIED_FLAG] = self.flags[CARRIED_FLAG].saturating_add(1);
        }
        trace!("Object {}: {:?} -> {:?}", object, from, to);
        Some(from)
    }

    /// Exchange the locations of two objects
    pub fn swap(&mut self, a: usize, b: usize) -> Option<()> {
        let la = self.object_location(a)?;
        let lb = self.object_location(b)?;
        self.relocate(a, lb)?;
        self.relocate(b, la)?;
        Some(())
    }

    /// Put every carried or worn object at the current location
    pub fn drop_all(&mut self) {
        let here = LocationRef::At(self.current_location);
        for object in 0..self.object_locations.len() {
            if self.object_locations[object].is_held() {
                self.relocate(object, here);
            }
        }
        self.flags[CARRIED_FLAG] = 0;
    }

    /// Objects currently carried or worn, counted from their locations
    pub fn carried_count(&self) -> usize {
        self.object_locations.iter().filter(|l| l.is_held()).count()
    }

    /// Indices of the objects at a location
    pub fn objects_at(&self, location: u8) -> Vec<usize> {
        self.object_locations
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == LocationRef::At(location))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn export(&self) -> SavedState {
        SavedState {
            flags: self.flags,
            object_locations: self.object_locations.iter().map(|l| l.to_byte()).collect(),
        }
    }

    /// Replace flags and object locations; the current location comes from
    /// the location mirror flag
    pub fn import(&mut self, saved: &SavedState, db: &Database) -> Result<(), SaveError> {
        if saved.object_locations.len() != db.objects.len() {
            return Err(SaveError::Mismatch(format!(
                "save holds {} objects, game has {}",
                saved.object_locations.len(),
                db.objects.len()
            )));
        }
        let location = saved.flags[LOCATION_FLAG];
        if location as usize >= db.locations.len() {
            return Err(SaveError::Mismatch(format!(
                "saved location {} does not exist",
                location
            )));
        }
        self.flags = saved.flags;
        self.object_locations = saved
            .object_locations
            .iter()
            .map(|&b| LocationRef::from_byte(b))
            .collect();
        self.current_location = location;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::SchemaRevision;
    use crate::test_utils::GameBuilder;
    use test_log::test;

    fn database(locations: usize, objects: &[LocationRef]) -> Database {
        let mut builder = GameBuilder::new(SchemaRevision::V0);
        for i in 0..locations {
            builder = builder.location(&format!("room {}", i));
        }
        for (i, &l) in objects.iter().enumerate() {
            builder = builder.object(&format!("thing {}", i), l, 0);
        }
        builder.build()
    }

    #[test]
    fn test_new_and_reset_differ() {
        let db = database(3, &[LocationRef::Carried, LocationRef::At(2)]);
        let mut state = GameState::new(&db);
        assert_eq!(state.current_location, 1);
        assert_eq!(state.flag(CARRIED_FLAG), Some(255));
        assert_eq!(state.flag(LOCATION_FLAG), Some(1));

        state.set_flag(20, 9);
        state.turns = 5;
        state.reset(&db);
        assert_eq!(state.current_location, 0);
        assert_eq!(state.flag(LOCATION_FLAG), Some(0));
        assert_eq!(state.flag(CARRIED_FLAG), Some(1));
        assert_eq!(state.flag(20), Some(9));
        assert_eq!(state.turns, 0);
    }

    #[test]
    fn test_single_location_starts_at_zero() {
        let db = database(1, &[]);
        assert_eq!(GameState::new(&db).current_location, 0);
    }

    #[test]
    fn test_byte_flags_saturate() {
        let db = database(1, &[]);
        let mut state = GameState::new(&db);
        state.set_flag(10, 250);
        state.plus(10, 10);
        assert_eq!(state.flag(10), Some(255));
        state.set_flag(10, 3);
        state.minus(10, 10);
        assert_eq!(state.flag(10), Some(0));
        state.set_flag(47, 255);
        state.plus(47, 1);
        assert_eq!(state.flag(47), Some(255));
        assert_eq!(state.flag(48), Some(0));
    }

    #[test]
    fn test_counter_flags_carry_and_borrow() {
        let db = database(1, &[]);
        let mut state = GameState::new(&db);
        state.set_flag(48, 255);
        state.plus(48, 1);
        assert_eq!((state.flag(48), state.flag(49)), (Some(0), Some(1)));
        assert_eq!(state.flag_value(48), Some(256));
        state.minus(48, 1);
        assert_eq!((state.flag(48), state.flag(49)), (Some(255), Some(0)));
        assert_eq!(state.flag_value(48), Some(255));
    }

    #[test]
    fn test_counter_borrow_below_zero_clamps() {
        let db = database(1, &[]);
        let mut state = GameState::new(&db);
        state.set_flag(50, 2);
        state.minus(50, 5);
        assert_eq!((state.flag(50), state.flag(51)), (Some(0), Some(0)));
    }

    #[test]
    fn test_high_byte_wraps() {
        let db = database(1, &[]);
        let mut state = GameState::new(&db);
        state.set_flag(60, 200);
        state.set_flag(61, 255);
        state.plus(60, 100);
        assert_eq!((state.flag(60), state.flag(61)), (Some(44), Some(0)));
    }

    #[test]
    fn test_odd_flags_are_high_bytes() {
        let db = database(1, &[]);
        let mut state = GameState::new(&db);
        state.set_flag(49, 0);
        state.set_flag(50, 1);
        assert_eq!(state.flag_value(49), Some(0));
        assert_eq!(state.flag_value(48), Some(0));
        state.set_flag(49, 2);
        assert_eq!(state.flag_value(48), Some(512));
        assert_eq!(state.flag_value(49), Some(2));

        // Adding to a high byte directly saturates like a byte flag
        state.set_flag(51, 250);
        state.plus(51, 10);
        assert_eq!((state.flag(51), state.flag(52)), (Some(255), Some(0)));
        state.minus(51, 255);
        assert_eq!(state.flag(51), Some(0));
        assert_eq!(state.flag(50), Some(1));
    }

    #[test]
    fn test_last_flag_is_a_byte() {
        let db = database(1, &[]);
        let mut state = GameState::new(&db);
        state.set_flag(63, 250);
        state.plus(63, 10);
        assert_eq!(state.flag(63), Some(255));
        assert_eq!(state.flag_value(63), Some(255));
        assert_eq!(state.plus(64, 1), None);
    }

    #[test]
    fn test_relocate_tracks_carried_count() {
        let db = database(2, &[LocationRef::At(0), LocationRef::At(1), LocationRef::NotCreated]);
        let mut state = GameState::new(&db);
        state.reset(&db);
        assert_eq!(state.flag(CARRIED_FLAG), Some(0));
        state.relocate(0, LocationRef::Carried);
        state.relocate(1, LocationRef::Worn);
        assert_eq!(state.flag(CARRIED_FLAG), Some(2));
        state.relocate(1, LocationRef::Carried);
        assert_eq!(state.flag(CARRIED_FLAG), Some(2));
        state.swap(0, 2);
        assert_eq!(state.object_location(2), Some(LocationRef::Carried));
        assert_eq!(state.flag(CARRIED_FLAG), Some(2));
        state.drop_all();
        assert_eq!(state.flag(CARRIED_FLAG), Some(0));
        assert_eq!(state.objects_at(0), vec![1, 2]);
    }

    #[test]
    fn test_export_import() {
        let db = database(3, &[LocationRef::At(0), LocationRef::Worn]);
        let mut state = GameState::new(&db);
        state.reset(&db);
        state.goto(2);
        state.set_flag(33, 7);
        let saved = state.export();
        assert_eq!(saved.object_locations, vec![0, 0xFD]);

        let mut other = GameState::new(&db);
        other.import(&saved, &db).unwrap();
        assert_eq!(other.current_location, 2);
        assert_eq!(other.flag(33), Some(7));
        assert_eq!(other.object_location(1), Some(LocationRef::Worn));
    }

    #[test]
    fn test_import_rejects_wrong_object_count() {
        let db = database(3, &[LocationRef::At(0)]);
        let mut state = GameState::new(&db);
        let saved = SavedState {
            flags: [0; FLAG_COUNT],
            object_locations: vec![0, 0],
        };
        assert!(matches!(state.import(&saved, &db), Err(SaveError::Mismatch(_))));
    }
}
