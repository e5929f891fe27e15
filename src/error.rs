//! Error types for snapshot loading, configuration and save files
//!
//! Decoding never panics on a malformed snapshot: every table walk reports
//! a `FormatError` instead, and no partially decoded database escapes.

use std::fmt;
use std::io;

/// Fatal problems found while decoding (or re-encoding) a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The engine signature does not occur anywhere in the image
    SignatureNotFound,
    /// A read at `addr` fell outside the image while decoding `what`
    OutOfBounds { what: &'static str, addr: usize },
    /// A walk starting at `start` ran off the image before its terminator
    Unterminated { what: &'static str, start: usize },
    /// A condition opcode outside the sixteen known kinds
    UnknownCondition { opcode: u8, addr: usize },
    /// An action opcode missing from the revision's opcode table
    UnknownAction { opcode: u8, revision: u8, addr: usize },
    /// The encoder could not fit a table at its address
    DoesNotFit { what: &'static str, addr: usize },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::SignatureNotFound => write!(f, "database signature not found"),
            FormatError::OutOfBounds { what, addr } => {
                write!(f, "{} pointer {:#06x} is outside the snapshot", what, addr)
            }
            FormatError::Unterminated { what, start } => {
                write!(f, "{} starting at {:#06x} has no terminator", what, start)
            }
            FormatError::UnknownCondition { opcode, addr } => {
                write!(f, "unknown condition opcode {} at {:#06x}", opcode, addr)
            }
            FormatError::UnknownAction {
                opcode,
                revision,
                addr,
            } => write!(
                f,
                "unknown action opcode {} for revision {} at {:#06x}",
                opcode, revision, addr
            ),
            FormatError::DoesNotFit { what, addr } => {
                write!(f, "{} does not fit at {:#06x}", what, addr)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Problems reading a TOML configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    /// A value parsed but is not usable
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "invalid configuration: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(error: io::Error) -> Self {
        ConfigError::Io(error)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::Parse(error)
    }
}

/// Problems writing, reading or applying a saved position
#[derive(Debug)]
pub enum SaveError {
    Io(io::Error),
    /// The file is not a save file or a chunk is damaged
    Malformed(String),
    /// The saved position does not fit the loaded database
    Mismatch(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "save file I/O error: {}", e),
            SaveError::Malformed(msg) => write!(f, "malformed save file: {}", msg),
            SaveError::Mismatch(msg) => write!(f, "save file does not match this game: {}", msg),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<io::Error> for SaveError {
    fn from(error: io::Error) -> Self {
        SaveError::Io(error)
    }
}
