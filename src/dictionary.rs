use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;

use indexmap::IndexMap;
use log::trace;

use crate::error::FormatError;
use crate::snapshot::Snapshot;

/// Characters stored per vocabulary word
pub const WORD_LENGTH: usize = 4;

/// Size of one vocabulary record: the word plus its code
pub const RECORD_SIZE: usize = WORD_LENGTH + 1;

/// Word list mapping typed words to word codes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    /// Words in table order; several words may share a code
    words: IndexMap<String, u8>,
    /// First word seen for each code, for listings
    index_to_word: Vec<Option<String>>,
}

impl Vocabulary {
    /// Read 5 byte records until one starts with a zero byte
    pub fn decode(snap: &Snapshot, addr: usize) -> Result<Vocabulary, FormatError> {
        let mut vocabulary = Vocabulary::default();
        let mut p = addr;
        let unterminated = |_| FormatError::Unterminated {
            what: "vocabulary",
            start: addr,
        };
        while snap.byte(p, "vocabulary").map_err(unterminated)? != 0 {
            let mut word = String::with_capacity(WORD_LENGTH);
            for i in 0..WORD_LENGTH {
                word.push((255 - snap.byte(p + i, "vocabulary").map_err(unterminated)?) as char);
            }
            let code = snap.byte(p + WORD_LENGTH, "vocabulary").map_err(unterminated)?;
            vocabulary.insert(word.trim(), code);
            p += RECORD_SIZE;
        }
        trace!("Vocabulary: {} words", vocabulary.words.len());
        Ok(vocabulary)
    }

    /// Add a word; a repeated word keeps its position and takes the new code
    pub fn insert(&mut self, word: &str, code: u8) {
        self.words.insert(word.to_string(), code);
        let index = code as usize;
        if index >= self.index_to_word.len() {
            self.index_to_word.resize(index + 1, None);
        }
        if self.index_to_word[index].is_none() {
            self.index_to_word[index] = Some(word.to_string());
        }
    }

    /// Code of a typed word, matched on its first four characters
    pub fn lookup(&self, token: &str) -> Option<u8> {
        let key: String = token.chars().take(WORD_LENGTH).collect();
        self.words.get(key.as_str()).copied()
    }

    /// Display form of a word code
    pub fn word(&self, code: u8) -> Option<&str> {
        self.index_to_word
            .get(code as usize)
            .and_then(|w| w.as_deref())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words and codes in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.words.iter().map(|(w, c)| (w.as_str(), *c))
    }
}

impl Display for Vocabulary {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        writeln!(f, "Vocabulary: {} words", self.words.len())?;
        for (word, code) in self.iter() {
            writeln!(f, "  {:<4} {:>3}", word, code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(word: &[u8; 4], code: u8) -> Vec<u8> {
        let mut r: Vec<u8> = word.iter().map(|b| 255 - b).collect();
        r.push(code);
        r
    }

    #[test]
    fn test_decode_records_until_zero() {
        let mut mem = vec![0u8; 0x10];
        mem.extend(record(b"N   ", 2));
        mem.extend(record(b"GET ", 20));
        mem.extend(record(b"TAKE", 20));
        mem.extend(record(b"LAMP", 51));
        mem.push(0);
        let vocab = Vocabulary::decode(&Snapshot::from_memory(mem), 0x10).unwrap();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.lookup("N"), Some(2));
        assert_eq!(vocab.lookup("TAKE"), Some(20));
        assert_eq!(vocab.lookup("LAMPSHADE"), Some(51));
        assert_eq!(vocab.lookup("LAM"), None);
        assert_eq!(vocab.word(20), Some("GET"));
        assert_eq!(vocab.word(3), None);
    }

    #[test]
    fn test_missing_terminator() {
        let mem = record(b"LOOK", 7);
        assert_eq!(
            Vocabulary::decode(&Snapshot::from_memory(mem), 0),
            Err(FormatError::Unterminated {
                what: "vocabulary",
                start: 0
            })
        );
    }
}
