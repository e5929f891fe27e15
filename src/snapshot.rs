//! Raw memory image of the target machine
//!
//! A `.sna` file starts with a 27 byte register block followed by the RAM
//! from address 16384 upwards. Padding the file with `16384 - 27` zero bytes
//! makes every buffer offset equal to the machine address it came from, so
//! the pointers stored in the database can be followed directly.

use crate::error::FormatError;
use log::debug;

/// Number of zero bytes placed in front of the file contents
pub const LOAD_PADDING: usize = 16384 - 27;

/// First signature byte; the next five follow at a stride of two
pub const SIGNATURE_LEAD: u8 = 0x10;
pub const SIGNATURE_TAIL: [u8; 5] = [0x11, 0x12, 0x13, 0x14, 0x15];

/// The padded memory image
#[derive(Debug, Clone)]
pub struct Snapshot {
    memory: Vec<u8>,
}

impl Snapshot {
    /// Build the image from the raw file contents
    pub fn from_file_bytes(file: &[u8]) -> Snapshot {
        let mut memory = vec![0u8; LOAD_PADDING];
        memory.extend_from_slice(file);
        debug!(
            "Snapshot image: {} file bytes, top address {:#06x}",
            file.len(),
            memory.len()
        );
        Snapshot { memory }
    }

    /// Wrap an image that is already laid out by address
    pub fn from_memory(memory: Vec<u8>) -> Snapshot {
        Snapshot { memory }
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Read one byte, naming the table being decoded on failure
    pub fn byte(&self, addr: usize, what: &'static str) -> Result<u8, FormatError> {
        self.memory
            .get(addr)
            .copied()
            .ok_or(FormatError::OutOfBounds { what, addr })
    }

    /// Read a little-endian word
    pub fn word(&self, addr: usize, what: &'static str) -> Result<u16, FormatError> {
        let lo = self.byte(addr, what)? as u16;
        let hi = self.byte(addr + 1, what)? as u16;
        Ok(lo | (hi << 8))
    }

    /// Read a word and check that it points inside the image
    pub fn pointer(&self, addr: usize, what: &'static str) -> Result<usize, FormatError> {
        let target = self.word(addr, what)? as usize;
        if target >= self.memory.len() {
            return Err(FormatError::OutOfBounds { what, addr: target });
        }
        Ok(target)
    }

    /// Address of the first complete engine signature
    pub fn find_signature(&self) -> Result<usize, FormatError> {
        let mem = &self.memory;
        let found = (0..mem.len()).find(|&start| {
            mem[start] == SIGNATURE_LEAD
                && SIGNATURE_TAIL
                    .iter()
                    .enumerate()
                    .all(|(i, &b)| mem.get(start + 2 * (i + 1)) == Some(&b))
        });
        match found {
            Some(addr) => {
                debug!("Signature found at {:#06x}", addr);
                Ok(addr)
            }
            None => Err(FormatError::SignatureNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature_at(mem: &mut [u8], addr: usize) {
        mem[addr] = SIGNATURE_LEAD;
        for (i, b) in SIGNATURE_TAIL.iter().enumerate() {
            mem[addr + 2 * (i + 1)] = *b;
        }
    }

    #[test]
    fn test_padding_maps_file_start_to_load_address() {
        let snap = Snapshot::from_file_bytes(&[0xAA, 0xBB]);
        assert_eq!(snap.len(), LOAD_PADDING + 2);
        assert_eq!(snap.byte(16357, "test").unwrap(), 0xAA);
        assert_eq!(snap.byte(0, "test").unwrap(), 0);
    }

    #[test]
    fn test_word_is_little_endian() {
        let snap = Snapshot::from_memory(vec![0x34, 0x12]);
        assert_eq!(snap.word(0, "test").unwrap(), 0x1234);
        assert_eq!(
            snap.word(1, "test"),
            Err(FormatError::OutOfBounds {
                what: "test",
                addr: 2
            })
        );
    }

    #[test]
    fn test_signature_skips_partial_matches() {
        let mut mem = vec![0u8; 64];
        // A lone lead byte with a broken tail comes first
        mem[3] = SIGNATURE_LEAD;
        mem[5] = 0x11;
        signature_at(&mut mem, 20);
        let snap = Snapshot::from_memory(mem);
        assert_eq!(snap.find_signature().unwrap(), 20);
    }

    #[test]
    fn test_missing_signature() {
        let snap = Snapshot::from_memory(vec![0x10; 8]);
        assert_eq!(snap.find_signature(), Err(FormatError::SignatureNotFound));
    }

    #[test]
    fn test_pointer_out_of_range() {
        let snap = Snapshot::from_memory(vec![0xFF, 0xFF, 0, 0]);
        assert!(matches!(
            snap.pointer(0, "objects"),
            Err(FormatError::OutOfBounds {
                what: "objects",
                addr: 0xFFFF
            })
        ));
    }
}
