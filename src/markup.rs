//! Structured view of the HTML fragments produced by the text decoder and
//! the interpreter
//!
//! Only the handful of tags the crate itself emits are recognised: `<P>`,
//! `<br>`, `<FONT COLOR=..>`/`</FONT>`, `<UL>`/`</UL>` and `<LI>`/`</LI>`.
//! Anything else is passed through as `Unknown` so a renderer can drop it.

use crate::text::INK_COLOURS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken {
    Text(String),
    Paragraph,
    LineBreak,
    /// Start of coloured text; the value is the raw colour attribute
    Colour(String),
    EndColour,
    ListStart,
    ListEnd,
    ListItem,
    ListItemEnd,
    Unknown(String),
}

/// Split a fragment into tokens, decoding entities inside text runs
pub fn tokenize(fragment: &str) -> Vec<MarkupToken> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = fragment;

    while let Some(ch) = rest.chars().next() {
        if ch == '<' {
            if let Some(end) = rest.find('>') {
                if !text.is_empty() {
                    tokens.push(MarkupToken::Text(std::mem::take(&mut text)));
                }
                tokens.push(parse_tag(&rest[1..end]));
                rest = &rest[end + 1..];
                continue;
            }
        } else if ch == '&' {
            if let Some((decoded, len)) = parse_entity(rest) {
                text.push_str(decoded);
                rest = &rest[len..];
                continue;
            }
        }
        text.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    if !text.is_empty() {
        tokens.push(MarkupToken::Text(text));
    }
    tokens
}

fn parse_tag(body: &str) -> MarkupToken {
    let body = body.trim();
    let name = body
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    match name.as_str() {
        "P" => MarkupToken::Paragraph,
        "BR" | "BR/" => MarkupToken::LineBreak,
        "UL" => MarkupToken::ListStart,
        "/UL" => MarkupToken::ListEnd,
        "LI" => MarkupToken::ListItem,
        "/LI" => MarkupToken::ListItemEnd,
        "/FONT" => MarkupToken::EndColour,
        "FONT" => match colour_attribute(body) {
            Some(colour) => MarkupToken::Colour(colour),
            None => MarkupToken::Unknown(body.to_string()),
        },
        _ => MarkupToken::Unknown(body.to_string()),
    }
}

fn colour_attribute(body: &str) -> Option<String> {
    let upper = body.to_ascii_uppercase();
    let start = upper.find("COLOR=")? + "COLOR=".len();
    let value = body[start..]
        .trim_start_matches(['"', '\''])
        .split(['"', '\'', ' '])
        .next()?;
    Some(value.to_string())
}

fn parse_entity(rest: &str) -> Option<(&'static str, usize)> {
    const ENTITIES: [(&str, &str); 6] = [
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&pound;", "£"),
        ("&copy;", "©"),
        ("&nbsp;", " "),
    ];
    ENTITIES
        .iter()
        .find(|(entity, _)| rest.starts_with(entity))
        .map(|(entity, decoded)| (*decoded, entity.len()))
}

/// Ink index (0-7) for a colour attribute, accepting the decoder's hex
/// values and the few colour names the interpreter uses
pub fn ink_index(colour: &str) -> Option<usize> {
    if let Some(i) = INK_COLOURS
        .iter()
        .position(|c| c.eq_ignore_ascii_case(colour))
    {
        return Some(i);
    }
    match colour.to_ascii_lowercase().as_str() {
        "black" => Some(0),
        "blue" => Some(1),
        "red" => Some(2),
        "magenta" => Some(3),
        "green" => Some(4),
        "cyan" => Some(5),
        "yellow" => Some(6),
        "white" => Some(7),
        _ => None,
    }
}

/// Render a fragment as plain text for logs and simple terminals
pub fn to_plain_text(fragment: &str) -> String {
    let mut out = String::new();
    for token in tokenize(fragment) {
        match token {
            MarkupToken::Text(t) => out.push_str(&t),
            MarkupToken::Paragraph => out.push_str("\n\n"),
            MarkupToken::LineBreak | MarkupToken::ListEnd => out.push('\n'),
            MarkupToken::ListItem => out.push_str("\n- "),
            _ => {}
        }
    }
    out
}
