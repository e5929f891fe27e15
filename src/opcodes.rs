//! Condition and action opcode tables
//!
//! Condition opcodes are the same in every revision. Action opcodes are
//! positions in a per-revision mnemonic table: the byte stream only carries
//! the opcode, and the table decides how many parameter bytes follow.

use std::collections::HashMap;

use crate::header::SchemaRevision;

/// Condition opcodes above this value carry a second parameter
pub const LAST_SINGLE_PARAM_CONDITION: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    At,
    NotAt,
    AtGt,
    AtLt,
    Present,
    Absent,
    Worn,
    NotWorn,
    Carried,
    NotCarried,
    Chance,
    Zero,
    NotZero,
    Eq,
    Gt,
    Lt,
}

const CONDITIONS: [ConditionKind; 16] = [
    ConditionKind::At,
    ConditionKind::NotAt,
    ConditionKind::AtGt,
    ConditionKind::AtLt,
    ConditionKind::Present,
    ConditionKind::Absent,
    ConditionKind::Worn,
    ConditionKind::NotWorn,
    ConditionKind::Carried,
    ConditionKind::NotCarried,
    ConditionKind::Chance,
    ConditionKind::Zero,
    ConditionKind::NotZero,
    ConditionKind::Eq,
    ConditionKind::Gt,
    ConditionKind::Lt,
];

impl ConditionKind {
    pub fn from_opcode(opcode: u8) -> Option<ConditionKind> {
        CONDITIONS.get(opcode as usize).copied()
    }

    pub fn opcode(self) -> u8 {
        CONDITIONS
            .iter()
            .position(|&k| k == self)
            .map(|p| p as u8)
            .unwrap_or_default()
    }

    /// Whether the stream stores a comparison value after the first parameter
    pub fn takes_value(self) -> bool {
        self.opcode() > LAST_SINGLE_PARAM_CONDITION
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            ConditionKind::At => "AT",
            ConditionKind::NotAt => "NOT AT",
            ConditionKind::AtGt => "AT GT",
            ConditionKind::AtLt => "AT LT",
            ConditionKind::Present => "PRESENT",
            ConditionKind::Absent => "ABSENT",
            ConditionKind::Worn => "WORN",
            ConditionKind::NotWorn => "NOT WORN",
            ConditionKind::Carried => "CARRIED",
            ConditionKind::NotCarried => "NOT CARR",
            ConditionKind::Chance => "CHANCE",
            ConditionKind::Zero => "ZERO",
            ConditionKind::NotZero => "NOT ZERO",
            ConditionKind::Eq => "EQ",
            ConditionKind::Gt => "GT",
            ConditionKind::Lt => "LT",
        }
    }

    /// Conditions whose first parameter is a location index
    pub fn names_location(self) -> bool {
        matches!(
            self,
            ConditionKind::At | ConditionKind::NotAt | ConditionKind::AtGt | ConditionKind::AtLt
        )
    }

    /// Conditions whose first parameter is an object index
    pub fn names_object(self) -> bool {
        matches!(
            self,
            ConditionKind::Present
                | ConditionKind::Absent
                | ConditionKind::Worn
                | ConditionKind::NotWorn
                | ConditionKind::Carried
                | ConditionKind::NotCarried
        )
    }

    /// Conditions whose first parameter is a flag index
    pub fn names_flag(self) -> bool {
        matches!(
            self,
            ConditionKind::Zero
                | ConditionKind::NotZero
                | ConditionKind::Eq
                | ConditionKind::Gt
                | ConditionKind::Lt
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Inven,
    Desc,
    Quit,
    End,
    Done,
    Ok,
    AnyKey,
    Save,
    Load,
    Turns,
    Score,
    Cls,
    DropAll,
    AutoG,
    AutoD,
    AutoW,
    AutoR,
    Pause,
    Paper,
    Ink,
    Border,
    Goto,
    Message,
    Remove,
    Get,
    Drop,
    Wear,
    Destroy,
    Create,
    Swap,
    Place,
    Set,
    Clear,
    Plus,
    Minus,
    Let,
    Beep,
}

/// What the parameter bytes of an action refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    None,
    Location,
    Message,
    Object,
    ObjectPair,
    ObjectLocation,
    Flag,
    FlagValue,
    Raw,
}

impl ActionKind {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ActionKind::Inven => "INVEN",
            ActionKind::Desc => "DESC",
            ActionKind::Quit => "QUIT",
            ActionKind::End => "END",
            ActionKind::Done => "DONE",
            ActionKind::Ok => "OK",
            ActionKind::AnyKey => "ANYKEY",
            ActionKind::Save => "SAVE",
            ActionKind::Load => "LOAD",
            ActionKind::Turns => "TURNS",
            ActionKind::Score => "SCORE",
            ActionKind::Cls => "CLS",
            ActionKind::DropAll => "DROPALL",
            ActionKind::AutoG => "AUTOG",
            ActionKind::AutoD => "AUTOD",
            ActionKind::AutoW => "AUTOW",
            ActionKind::AutoR => "AUTOR",
            ActionKind::Pause => "PAUSE",
            ActionKind::Paper => "PAPER",
            ActionKind::Ink => "INK",
            ActionKind::Border => "BORDER",
            ActionKind::Goto => "GOTO",
            ActionKind::Message => "MESSAGE",
            ActionKind::Remove => "REMOVE",
            ActionKind::Get => "GET",
            ActionKind::Drop => "DROP",
            ActionKind::Wear => "WEAR",
            ActionKind::Destroy => "DESTROY",
            ActionKind::Create => "CREATE",
            ActionKind::Swap => "SWAP",
            ActionKind::Place => "PLACE",
            ActionKind::Set => "SET",
            ActionKind::Clear => "CLEAR",
            ActionKind::Plus => "PLUS",
            ActionKind::Minus => "MINUS",
            ActionKind::Let => "LET",
            ActionKind::Beep => "BEEP",
        }
    }

    pub fn param_kind(self) -> ParamKind {
        match self {
            ActionKind::Goto => ParamKind::Location,
            ActionKind::Message => ParamKind::Message,
            ActionKind::Remove
            | ActionKind::Get
            | ActionKind::Drop
            | ActionKind::Wear
            | ActionKind::Destroy
            | ActionKind::Create => ParamKind::Object,
            ActionKind::Swap => ParamKind::ObjectPair,
            ActionKind::Place => ParamKind::ObjectLocation,
            ActionKind::Set | ActionKind::Clear => ParamKind::Flag,
            ActionKind::Plus | ActionKind::Minus | ActionKind::Let => ParamKind::FlagValue,
            ActionKind::Pause
            | ActionKind::Paper
            | ActionKind::Ink
            | ActionKind::Border
            | ActionKind::Beep => ParamKind::Raw,
            _ => ParamKind::None,
        }
    }

    /// Number of parameter bytes following the opcode
    pub fn param_count(self) -> usize {
        match self.param_kind() {
            ParamKind::None => 0,
            ParamKind::ObjectPair | ParamKind::ObjectLocation | ParamKind::FlagValue => 2,
            ParamKind::Raw if self == ActionKind::Beep => 2,
            _ => 1,
        }
    }

    /// Opcode of this action in a revision's table, if the revision has it
    pub fn opcode_in(self, revision: SchemaRevision) -> Option<u8> {
        OPCODES_BY_KIND.get(&(revision, self)).copied()
    }
}

const V0_ACTIONS: [ActionKind; 27] = [
    ActionKind::Inven,
    ActionKind::Desc,
    ActionKind::Quit,
    ActionKind::End,
    ActionKind::Done,
    ActionKind::Ok,
    ActionKind::AnyKey,
    ActionKind::Save,
    ActionKind::Load,
    ActionKind::Turns,
    ActionKind::Score,
    ActionKind::Pause,
    ActionKind::Goto,
    ActionKind::Message,
    ActionKind::Remove,
    ActionKind::Get,
    ActionKind::Drop,
    ActionKind::Wear,
    ActionKind::Destroy,
    ActionKind::Create,
    ActionKind::Swap,
    ActionKind::Set,
    ActionKind::Clear,
    ActionKind::Plus,
    ActionKind::Minus,
    ActionKind::Let,
    ActionKind::Beep,
];

const V5_ACTIONS: [ActionKind; 33] = [
    ActionKind::Inven,
    ActionKind::Desc,
    ActionKind::Quit,
    ActionKind::End,
    ActionKind::Done,
    ActionKind::Ok,
    ActionKind::AnyKey,
    ActionKind::Save,
    ActionKind::Load,
    ActionKind::Turns,
    ActionKind::Score,
    ActionKind::Cls,
    ActionKind::DropAll,
    ActionKind::Pause,
    ActionKind::Paper,
    ActionKind::Ink,
    ActionKind::Border,
    ActionKind::Goto,
    ActionKind::Message,
    ActionKind::Remove,
    ActionKind::Get,
    ActionKind::Drop,
    ActionKind::Wear,
    ActionKind::Destroy,
    ActionKind::Create,
    ActionKind::Swap,
    ActionKind::Place,
    ActionKind::Set,
    ActionKind::Clear,
    ActionKind::Plus,
    ActionKind::Minus,
    ActionKind::Let,
    ActionKind::Beep,
];

const V7_ACTIONS: [ActionKind; 37] = [
    ActionKind::Inven,
    ActionKind::Desc,
    ActionKind::Quit,
    ActionKind::End,
    ActionKind::Done,
    ActionKind::Ok,
    ActionKind::AnyKey,
    ActionKind::Save,
    ActionKind::Load,
    ActionKind::Turns,
    ActionKind::Score,
    ActionKind::Cls,
    ActionKind::DropAll,
    ActionKind::AutoG,
    ActionKind::AutoD,
    ActionKind::AutoW,
    ActionKind::AutoR,
    ActionKind::Pause,
    ActionKind::Paper,
    ActionKind::Ink,
    ActionKind::Border,
    ActionKind::Goto,
    ActionKind::Message,
    ActionKind::Remove,
    ActionKind::Get,
    ActionKind::Drop,
    ActionKind::Wear,
    ActionKind::Destroy,
    ActionKind::Create,
    ActionKind::Swap,
    ActionKind::Place,
    ActionKind::Set,
    ActionKind::Clear,
    ActionKind::Plus,
    ActionKind::Minus,
    ActionKind::Let,
    ActionKind::Beep,
];

/// Mnemonic table of a revision, indexed by opcode byte
pub fn action_table(revision: SchemaRevision) -> &'static [ActionKind] {
    match revision {
        SchemaRevision::V0 => &V0_ACTIONS,
        SchemaRevision::V5 => &V5_ACTIONS,
        SchemaRevision::V7 => &V7_ACTIONS,
    }
}

/// Look up the action an opcode byte stands for
pub fn action_kind(revision: SchemaRevision, opcode: u8) -> Option<ActionKind> {
    action_table(revision).get(opcode as usize).copied()
}

lazy_static! {
    static ref OPCODES_BY_KIND: HashMap<(SchemaRevision, ActionKind), u8> = {
        let mut m = HashMap::new();
        for revision in [SchemaRevision::V0, SchemaRevision::V5, SchemaRevision::V7] {
            for (opcode, kind) in action_table(revision).iter().enumerate() {
                m.insert((revision, *kind), opcode as u8);
            }
        }
        m
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_opcodes() {
        assert_eq!(ConditionKind::from_opcode(0), Some(ConditionKind::At));
        assert_eq!(ConditionKind::from_opcode(10), Some(ConditionKind::Chance));
        assert_eq!(ConditionKind::from_opcode(15), Some(ConditionKind::Lt));
        assert_eq!(ConditionKind::from_opcode(16), None);
        assert!(!ConditionKind::NotZero.takes_value());
        assert!(ConditionKind::Eq.takes_value());
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(action_table(SchemaRevision::V0).len(), 27);
        assert_eq!(action_table(SchemaRevision::V5).len(), 33);
        assert_eq!(action_table(SchemaRevision::V7).len(), 37);
    }

    #[test]
    fn test_opcodes_move_between_revisions() {
        assert_eq!(ActionKind::Goto.opcode_in(SchemaRevision::V0), Some(12));
        assert_eq!(ActionKind::Goto.opcode_in(SchemaRevision::V5), Some(17));
        assert_eq!(ActionKind::Goto.opcode_in(SchemaRevision::V7), Some(21));
        assert_eq!(ActionKind::Place.opcode_in(SchemaRevision::V0), None);
        assert_eq!(action_kind(SchemaRevision::V7, 13), Some(ActionKind::AutoG));
    }

    #[test]
    fn test_param_counts() {
        assert_eq!(ActionKind::Inven.param_count(), 0);
        assert_eq!(ActionKind::Pause.param_count(), 1);
        assert_eq!(ActionKind::Clear.param_count(), 1);
        assert_eq!(ActionKind::Swap.param_count(), 2);
        assert_eq!(ActionKind::Place.param_count(), 2);
        assert_eq!(ActionKind::Let.param_count(), 2);
        assert_eq!(ActionKind::Beep.param_count(), 2);
    }
}
