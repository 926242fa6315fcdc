//! Conversions between LSP positions and offsets.
//!
//! Offsets count UTF-16 code units, the LSP default encoding and the unit the
//! server uses for `RenamePosition::offset`. `\n`, `\r\n` and a lone `\r` all
//! end a line.

use lsp_types::Position;

/// Where a position landed in a text: its UTF-16 offset and its byte index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Located {
    pub utf16: u32,
    pub byte: usize,
}

/// Convert a UTF-16 offset to a position, clamping past-the-end offsets to the end of the text
pub fn offset_to_position(text: &str, offset: u32) -> Position {
    let mut line = 0;
    let mut character = 0;
    let mut consumed = 0u32;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let width = ch.len_utf16() as u32;
        if consumed + width > offset {
            break;
        }
        consumed += width;
        match ch {
            '\n' => {
                line += 1;
                character = 0;
            },
            // The line ends at the '\n' of a CRLF pair
            '\r' if chars.peek() == Some(&'\n') => {},
            '\r' => {
                line += 1;
                character = 0;
            },
            _ => character += width,
        }
    }

    Position { line, character }
}

/// Convert a position to a UTF-16 offset, clamping to the end of its line or of the text
pub fn position_to_offset(text: &str, position: Position) -> u32 {
    locate(text, position).utf16
}

pub(crate) fn locate(text: &str, position: Position) -> Located {
    let mut line = 0;
    let mut character = 0;
    let mut utf16 = 0u32;
    let mut chars = text.char_indices().peekable();

    while let Some((byte, ch)) = chars.next() {
        if line == position.line && (character >= position.character || is_line_break(ch)) {
            return Located { utf16, byte };
        }
        let width = ch.len_utf16() as u32;
        utf16 += width;
        match ch {
            '\n' => {
                line += 1;
                character = 0;
            },
            '\r' if chars.peek().map(|(_, next)| *next) == Some('\n') => {},
            '\r' => {
                line += 1;
                character = 0;
            },
            _ => character += width,
        }
    }

    Located { utf16, byte: text.len() }
}

fn is_line_break(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}
