//! Player-facing configuration
//!
//! Every fixed message the interpreter prints, the twelve direction words,
//! the save/load command words and an optional schema revision override.
//! Fields missing from a TOML file keep their English defaults.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::database::{Direction, LoadOptions, DIRECTION_COUNT};
use crate::error::ConfigError;
use crate::header::SchemaRevision;

/// Placeholder replaced by a number or a description in message templates
pub const PLACEHOLDER: &str = "{}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema revision (0, 5 or 7) to use instead of the image's marker
    pub revision: Option<u8>,
    /// Vocabulary words for NW, N, NE, W, E, SW, S, SE, IN, OUT, UP, DOWN
    pub directions: Vec<String>,
    /// First words that save the position instead of running rules
    pub save_words: Vec<String>,
    /// First words that restore a saved position
    pub load_words: Vec<String>,
    /// File used by the save and load commands
    pub save_file: String,
    pub messages: Messages,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            revision: None,
            directions: Direction::ALL
                .iter()
                .map(|d| d.short_name().to_string())
                .collect(),
            save_words: vec!["SAVE".to_string()],
            load_words: vec!["LOAD".to_string()],
            save_file: "quill.sav".to_string(),
            messages: Messages::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub already_carrying: String,
    pub not_here: String,
    pub dont_have: String,
    pub already_wearing: String,
    pub not_wearing: String,
    pub not_understood: String,
    pub no_exit: String,
    pub cannot_do: String,
    pub darkness: String,
    /// One object at the location; `{}` is its description
    pub also_see_one: String,
    /// Heading of the list when several objects are at the location
    pub also_see_many: String,
    pub inventory: String,
    pub inventory_empty: String,
    pub worn_suffix: String,
    /// `{}` is the turn counter
    pub turns: String,
    /// `{}` is the score flag
    pub score: String,
    pub ok: String,
    pub press_key: String,
    pub saved: String,
    pub loaded: String,
    pub save_failed: String,
    pub load_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Messages {
            already_carrying: "I already have it.".to_string(),
            not_here: "It isn't here.".to_string(),
            dont_have: "I don't have it.".to_string(),
            already_wearing: "I'm already wearing it.".to_string(),
            not_wearing: "I'm not wearing it.".to_string(),
            not_understood: "I don't understand that. Try saying it another way.".to_string(),
            no_exit: "I can't go in that direction.".to_string(),
            cannot_do: "I can't do that.".to_string(),
            darkness: "It is too dark to see anything.".to_string(),
            also_see_one: "I can also see {}".to_string(),
            also_see_many: "I can also see:".to_string(),
            inventory: "I am carrying:".to_string(),
            inventory_empty: "nothing at all".to_string(),
            worn_suffix: " (worn)".to_string(),
            turns: "You have given {} commands".to_string(),
            score: "You have scored {} percent".to_string(),
            ok: "OK".to_string(),
            press_key: "Press any key to continue".to_string(),
            saved: "Position saved.".to_string(),
            loaded: "Position loaded.".to_string(),
            save_failed: "Cannot save the position.".to_string(),
            load_failed: "Cannot load the position.".to_string(),
        }
    }
}

/// Fill the first placeholder of a message template
pub fn fill(template: &str, value: impl std::fmt::Display) -> String {
    template.replacen(PLACEHOLDER, &value.to_string(), 1)
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(path)?;
        Config::from_toml(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.schema_revision()?;
        if self.directions.len() != DIRECTION_COUNT {
            return Err(ConfigError::Invalid(format!(
                "expected {} direction words, found {}",
                DIRECTION_COUNT,
                self.directions.len()
            )));
        }
        Ok(())
    }

    /// The revision override, if any
    pub fn schema_revision(&self) -> Result<Option<SchemaRevision>, ConfigError> {
        match self.revision {
            None => Ok(None),
            Some(n) => SchemaRevision::from_number(n)
                .map(Some)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown schema revision {}", n))),
        }
    }

    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        Ok(LoadOptions {
            revision: self.schema_revision()?,
            direction_words: self.directions.iter().map(|w| w.to_uppercase()).collect(),
        })
    }

    pub fn is_save_word(&self, token: &str) -> bool {
        self.save_words.iter().any(|w| w.eq_ignore_ascii_case(token))
    }

    pub fn is_load_word(&self, token: &str) -> bool {
        self.load_words.iter().any(|w| w.eq_ignore_ascii_case(token))
    }
}
