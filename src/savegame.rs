//! Saved positions as a small IFF file
//!
//! Layout: `FORM` <u32 length> `QSAV`, then a `FLAG` chunk holding the 64
//! flag bytes and an `OBJL` chunk holding one location byte per object.
//! Lengths are big-endian and odd chunks are padded to an even size.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::SaveError;
use crate::state::{SavedState, FLAG_COUNT};

const FORM_TYPE: [u8; 4] = *b"QSAV";
const FLAG_CHUNK: [u8; 4] = *b"FLAG";
const OBJECT_CHUNK: [u8; 4] = *b"OBJL";

/// Individual chunk in a save file
struct Chunk {
    chunk_type: [u8; 4],
    data: Vec<u8>,
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let slice = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

fn chunk_type_name(chunk_type: &[u8; 4]) -> String {
    String::from_utf8_lossy(chunk_type).into_owned()
}

pub fn to_bytes(saved: &SavedState) -> Vec<u8> {
    let chunks = [
        Chunk {
            chunk_type: FLAG_CHUNK,
            data: saved.flags.to_vec(),
        },
        Chunk {
            chunk_type: OBJECT_CHUNK,
            data: saved.object_locations.clone(),
        },
    ];

    // Form type plus each chunk's header, data and padding
    let total_size = 4 + chunks
        .iter()
        .map(|c| 8 + c.data.len() + c.data.len() % 2)
        .sum::<usize>();

    let mut out = Vec::with_capacity(8 + total_size);
    out.extend_from_slice(b"FORM");
    out.extend_from_slice(&(total_size as u32).to_be_bytes());
    out.extend_from_slice(&FORM_TYPE);
    for chunk in &chunks {
        out.extend_from_slice(&chunk.chunk_type);
        out.extend_from_slice(&(chunk.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&chunk.data);
        if chunk.data.len() % 2 == 1 {
            out.push(0);
        }
    }
    out
}

fn read_chunks(bytes: &[u8]) -> Result<Vec<Chunk>, SaveError> {
    if bytes.get(0..4) != Some(b"FORM".as_slice()) {
        return Err(SaveError::Malformed("missing FORM header".to_string()));
    }
    let total_size = read_u32(bytes, 4)
        .ok_or_else(|| SaveError::Malformed("truncated FORM header".to_string()))?
        as usize;
    if bytes.get(8..12) != Some(FORM_TYPE.as_slice()) {
        return Err(SaveError::Malformed("not a QSAV form".to_string()));
    }
    let end = 8 + total_size;
    if end > bytes.len() {
        return Err(SaveError::Malformed(format!(
            "form claims {} bytes, file has {}",
            total_size,
            bytes.len() - 8
        )));
    }

    let mut chunks = Vec::new();
    let mut pos = 12;
    while pos + 8 <= end {
        let mut chunk_type = [0u8; 4];
        chunk_type.copy_from_slice(&bytes[pos..pos + 4]);
        let size = read_u32(bytes, pos + 4)
            .ok_or_else(|| SaveError::Malformed("truncated chunk header".to_string()))?
            as usize;
        let data = bytes.get(pos + 8..pos + 8 + size).ok_or_else(|| {
            SaveError::Malformed(format!("chunk {} overruns the file", chunk_type_name(&chunk_type)))
        })?;
        chunks.push(Chunk {
            chunk_type,
            data: data.to_vec(),
        });
        pos += 8 + size + size % 2;
    }
    Ok(chunks)
}

pub fn from_bytes(bytes: &[u8]) -> Result<SavedState, SaveError> {
    let chunks = read_chunks(bytes)?;
    let find = |chunk_type: &[u8; 4]| {
        chunks
            .iter()
            .find(|c| &c.chunk_type == chunk_type)
            .ok_or_else(|| {
                SaveError::Malformed(format!("missing {} chunk", chunk_type_name(chunk_type)))
            })
    };

    let flag_chunk = find(&FLAG_CHUNK)?;
    if flag_chunk.data.len() != FLAG_COUNT {
        return Err(SaveError::Malformed(format!(
            "FLAG chunk holds {} bytes, expected {}",
            flag_chunk.data.len(),
            FLAG_COUNT
        )));
    }
    let mut flags = [0u8; FLAG_COUNT];
    flags.copy_from_slice(&flag_chunk.data);

    let object_locations = find(&OBJECT_CHUNK)?.data.clone();

    Ok(SavedState {
        flags,
        object_locations,
    })
}

/// Write a saved position to disk
pub fn write_file(path: &Path, saved: &SavedState) -> Result<(), SaveError> {
    let bytes = to_bytes(saved);
    fs::write(path, &bytes)?;
    debug!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Read a saved position from disk
pub fn read_file(path: &Path) -> Result<SavedState, SaveError> {
    let bytes = fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    from_bytes(&bytes)
}
