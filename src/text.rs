use log::trace;
use std::collections::HashMap;

use crate::error::FormatError;

/// Raw byte closing every location, object and message text
pub const ITEM_TERMINATOR: u8 = 0xE0;

/// Screen width of the target machine; text is soft-wrapped at this column
pub const COLUMN_WIDTH: usize = 32;

/// Source codes with special meaning below the printable range
const PARAGRAPH: u8 = 0x06;
const INK: u8 = 0x10;
const PAPER: u8 = 0x11;

/// Ink colours 0-7 as HTML colours
pub const INK_COLOURS: [&str; 8] = [
    "#000000", "#0000ff", "#ff0000", "#ff00ff", "#00ff00", "#00ffff", "#ffff00", "#ffffff",
];

pub const PARAGRAPH_TOKEN: &str = "<P>";

lazy_static! {
    /// Source codes rendered as HTML entities or accented letters
    pub static ref SUBSTITUTIONS: HashMap<u8, &'static str> = {
        let mut m = HashMap::new();
        m.insert(b'&', "&amp;");
        m.insert(b'<', "&lt;");
        m.insert(b'>', "&gt;");
        m.insert(0x60, "&pound;");
        m.insert(0x7F, "&copy;");
        m.insert(0x95, "č");
        m.insert(0x94, "š");
        m.insert(0xA0, "ž");
        m.insert(0x92, "Č");
        m.insert(0xA2, "Š");
        m.insert(0x90, "Ž");
        m
    };
}

/// Build the markup token that switches the ink colour
pub fn ink_token(index: usize) -> String {
    format!("<FONT COLOR={}>", INK_COLOURS[index])
}

/// Decode a text item terminated by `ITEM_TERMINATOR`
/// Returns the decoded markup and the number of bytes consumed
pub fn decode_item(memory: &[u8], addr: usize) -> Result<(String, usize), FormatError> {
    decode_item_until(memory, addr, ITEM_TERMINATOR)
}

/// Decode a text item with an explicit terminator byte
pub fn decode_item_until(
    memory: &[u8],
    addr: usize,
    terminator: u8,
) -> Result<(String, usize), FormatError> {
    let unterminated = FormatError::Unterminated {
        what: "text",
        start: addr,
    };
    let mut result = String::new();
    let mut offset = addr;
    let mut column = 0;

    loop {
        let raw = *memory.get(offset).ok_or(unterminated.clone())?;
        offset += 1;
        if raw == terminator {
            break;
        }
        let code = 255 - raw;

        if let Some(sub) = SUBSTITUTIONS.get(&code) {
            result.push_str(sub);
            column += 1;
        } else if code >= b' ' {
            result.push(code as char);
            column += 1;
        } else {
            match code {
                PARAGRAPH => {
                    if memory.get(offset).map(|b| 255 - b) == Some(PARAGRAPH) {
                        result.push_str(PARAGRAPH_TOKEN);
                        offset += 1;
                    } else {
                        result.push(' ');
                    }
                    column = 0;
                }
                INK => {
                    let colour = 255 - *memory.get(offset).ok_or(unterminated.clone())?;
                    offset += 1;
                    if (colour as usize) < INK_COLOURS.len() {
                        result.push_str(&ink_token(colour as usize));
                    } else {
                        trace!("Ignoring ink colour {} at {:#06x}", colour, offset - 1);
                    }
                }
                PAPER => {
                    memory.get(offset).ok_or(unterminated.clone())?;
                    offset += 1;
                }
                _ => trace!("Dropping control code {:#04x} at {:#06x}", code, offset - 1),
            }
        }

        if column == COLUMN_WIDTH {
            if memory.get(offset) != Some(&(255 - b' ')) {
                result.push(' ');
            }
            column = 0;
        }
    }

    Ok((result, offset - addr))
}

/// Decode a plain string: every byte up to the terminator is a complemented
/// Latin-1 character, with no markup or wrapping
pub fn decode_plain(
    memory: &[u8],
    addr: usize,
    terminator: u8,
) -> Result<(String, usize), FormatError> {
    let end = memory
        .get(addr..)
        .and_then(|rest| rest.iter().position(|&b| b == terminator))
        .ok_or(FormatError::Unterminated {
            what: "string",
            start: addr,
        })?;
    let text = memory[addr..addr + end]
        .iter()
        .map(|&b| (255 - b) as char)
        .collect();
    Ok((text, end + 1))
}

/// Encode decoded markup back into complemented bytes, terminator included.
///
/// Tracks the wrap column the way the decoder does. A space standing at a
/// wrap boundary is the one the decoder inserts and is not written, unless
/// another space follows it; then the decoder saw a real space and inserted
/// nothing.
pub fn encode_item(text: &str) -> Result<Vec<u8>, FormatError> {
    let mut bytes = Vec::with_capacity(text.len() + 1);
    let mut rest = text;
    let mut column = 0;
    'outer: while let Some(ch) = rest.chars().next() {
        if column == COLUMN_WIDTH {
            column = 0;
            if let Some(after) = rest.strip_prefix(' ') {
                if !after.starts_with(' ') {
                    rest = after;
                    continue;
                }
            }
        }
        if let Some(after) = rest.strip_prefix(PARAGRAPH_TOKEN) {
            bytes.extend_from_slice(&[255 - PARAGRAPH, 255 - PARAGRAPH]);
            rest = after;
            column = 0;
            continue;
        }
        for (index, _) in INK_COLOURS.iter().enumerate() {
            if let Some(after) = rest.strip_prefix(ink_token(index).as_str()) {
                bytes.extend_from_slice(&[255 - INK, 255 - index as u8]);
                rest = after;
                continue 'outer;
            }
        }
        for (code, sub) in SUBSTITUTIONS.iter() {
            if let Some(after) = rest.strip_prefix(sub) {
                bytes.push(255 - code);
                rest = after;
                column += 1;
                continue 'outer;
            }
        }
        let code = ch as u32;
        if code > 0xFF {
            return Err(FormatError::DoesNotFit {
                what: "text character",
                addr: text.len() - rest.len(),
            });
        }
        bytes.push(255 - code as u8);
        rest = &rest[ch.len_utf8()..];
        column += 1;
    }
    bytes.push(ITEM_TERMINATOR);
    Ok(bytes)
}

/// Encode a plain string, terminator included
pub fn encode_plain(text: &str, terminator: u8) -> Result<Vec<u8>, FormatError> {
    let mut bytes = Vec::with_capacity(text.len() + 1);
    for (i, ch) in text.chars().enumerate() {
        let code = ch as u32;
        if code > 0xFF || 255 - code as u8 == terminator {
            return Err(FormatError::DoesNotFit {
                what: "string character",
                addr: i,
            });
        }
        bytes.push(255 - code as u8);
    }
    bytes.push(terminator);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invert(text: &[u8]) -> Vec<u8> {
        text.iter().map(|b| 255 - b).collect()
    }

    #[test]
    fn test_simple_item() {
        let mut memory = vec![0u8; 4];
        memory.extend(invert(b"Hello"));
        memory.push(ITEM_TERMINATOR);
        let (text, len) = decode_item(&memory, 4).unwrap();
        assert_eq!(text, "Hello");
        assert_eq!(len, 6);
    }

    #[test]
    fn test_escapes_and_accents() {
        let mut memory = invert(b"a&b<c>");
        memory.push(255 - 0x95);
        memory.push(255 - 0x60);
        memory.push(ITEM_TERMINATOR);
        let (text, _) = decode_item(&memory, 0).unwrap();
        assert_eq!(text, "a&amp;b&lt;c&gt;č&pound;");
    }

    #[test]
    fn test_paragraph_and_soft_space() {
        let memory = vec![
            255 - b'A',
            255 - PARAGRAPH,
            255 - PARAGRAPH,
            255 - b'B',
            255 - PARAGRAPH,
            255 - b'C',
            ITEM_TERMINATOR,
        ];
        let (text, len) = decode_item(&memory, 0).unwrap();
        assert_eq!(text, "A<P>B C");
        assert_eq!(len, 7);
    }

    #[test]
    fn test_ink_tokens_and_ignored_colours() {
        let memory = vec![
            255 - INK,
            255 - 2,
            255 - b'r',
            255 - INK,
            255 - 9,
            255 - PAPER,
            255 - 3,
            255 - b'x',
            ITEM_TERMINATOR,
        ];
        let (text, len) = decode_item(&memory, 0).unwrap();
        assert_eq!(text, "<FONT COLOR=#ff0000>rx");
        assert_eq!(len, 9);
    }

    #[test]
    fn test_wrap_inserts_one_space_at_column_32() {
        let mut memory = invert(&[b'x'; 33]);
        memory.push(ITEM_TERMINATOR);
        let (text, _) = decode_item(&memory, 0).unwrap();
        assert_eq!(text, format!("{} x", "x".repeat(32)));
    }

    #[test]
    fn test_wrap_skips_space_when_next_is_space() {
        let mut raw = vec![b'y'; 32];
        raw.extend_from_slice(b" z");
        let mut memory = invert(&raw);
        memory.push(ITEM_TERMINATOR);
        let (text, _) = decode_item(&memory, 0).unwrap();
        assert_eq!(text, format!("{} z", "y".repeat(32)));
    }

    #[test]
    fn test_unterminated_item() {
        let memory = invert(b"never ends");
        assert_eq!(
            decode_item(&memory, 0),
            Err(FormatError::Unterminated {
                what: "text",
                start: 0
            })
        );
    }

    #[test]
    fn test_custom_terminator() {
        let memory = vec![255 - b'o', 255 - b'k', 0x00, 255 - b'!'];
        let (text, len) = decode_item_until(&memory, 0, 0x00).unwrap();
        assert_eq!(text, "ok");
        assert_eq!(len, 3);
    }

    #[test]
    fn test_plain_string_keeps_markup_characters() {
        let mut memory = invert(b"<&>");
        memory.push(0xE0);
        let (text, len) = decode_plain(&memory, 0, 0xE0).unwrap();
        assert_eq!(text, "<&>");
        assert_eq!(len, 4);
    }

    #[test]
    fn test_encode_inverts_decode() {
        let text = "Kraj<P>ob <FONT COLOR=#00ff00>reki &amp; Š";
        let bytes = encode_item(text).unwrap();
        let (decoded, len) = decode_item(&bytes, 0).unwrap();
        assert_eq!(decoded, text);
        assert_eq!(len, bytes.len());
    }

    #[test]
    fn test_encode_drops_the_wrap_space() {
        let mut raw = b"You are standing in a long narrow corridor.".to_vec();
        let mut memory = invert(&raw);
        memory.push(ITEM_TERMINATOR);
        let (text, _) = decode_item(&memory, 0).unwrap();
        assert_eq!(text, "You are standing in a long narro w corridor.");
        assert_eq!(encode_item(&text).unwrap(), memory);

        // A real space at the boundary stays, and a second one after it too
        raw = vec![b'y'; 32];
        raw.extend_from_slice(b"  z");
        memory = invert(&raw);
        memory.push(ITEM_TERMINATOR);
        let (text, _) = decode_item(&memory, 0).unwrap();
        assert_eq!(text, format!("{}  z", "y".repeat(32)));
        assert_eq!(encode_item(&text).unwrap(), memory);
    }

    #[test]
    fn test_encode_wraps_after_markup() {
        // Ink tokens take no column; the paragraph restarts the count
        let mut raw = vec![255 - INK, 255 - 4];
        raw.extend(invert(&[b'g'; 32]));
        raw.extend(invert(b"h"));
        raw.extend([255 - PARAGRAPH, 255 - PARAGRAPH]);
        raw.extend(invert(&[b'k'; 33]));
        raw.push(ITEM_TERMINATOR);
        let (text, _) = decode_item(&raw, 0).unwrap();
        assert_eq!(
            text,
            format!("<FONT COLOR=#00ff00>{} h<P>{} k", "g".repeat(32), "k".repeat(32))
        );
        assert_eq!(encode_item(&text).unwrap(), raw);
    }
}
