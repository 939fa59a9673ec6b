//! UTF-16 offset helpers
//!
//! Offsets exchanged with the page are UTF-16 code units, while Rust strings
//! index by byte. These helpers translate between the two.

/// Length of `text` in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte index of the UTF-16 offset `offset`, or `None` if it is past the end
/// or falls inside a surrogate pair
pub fn byte_index(text: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        if units == offset {
            return Some(idx);
        }
        if units > offset {
            return None;
        }
        units += ch.len_utf16();
    }
    (units == offset).then_some(text.len())
}

/// Substring between two UTF-16 offsets
pub fn utf16_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let from = byte_index(text, start)?;
    let to = byte_index(text, end)?;
    text.get(from..to)
}

/// Substring between two UTF-16 offsets, clamped to the text and widened to
/// the nearest character boundaries
pub fn utf16_slice_clamped(text: &str, start: usize, end: usize) -> &str {
    let mut from = text.len();
    let mut to = text.len();
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if from == text.len() && next > start {
            from = idx;
        }
        if next > end {
            to = idx;
            break;
        }
        units = next;
    }
    if from > to {
        return "";
    }
    &text[from..to]
}

/// Converts ascending byte offsets into UTF-16 offsets in a single pass
#[derive(Debug)]
pub struct Utf16Cursor<'a> {
    text: &'a str,
    byte: usize,
    units: usize,
}

impl<'a> Utf16Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            units: 0,
        }
    }

    /// UTF-16 offset of a byte index on a character boundary
    pub fn advance_to(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.units = 0;
        }
        self.units += utf16_len(&self.text[self.byte..byte]);
        self.byte = byte;
        self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_offsets_match_bytes() {
        assert_eq!(utf16_len("very comprehensive"), 18);
        assert_eq!(byte_index("very", 4), Some(4));
        assert_eq!(utf16_slice("very comprehensive", 5, 18), Some("comprehensive"));
    }

    #[test]
    fn test_multibyte_offsets() {
        // 'é' is 2 bytes / 1 unit, '😀' is 4 bytes / 2 units
        let text = "é😀 ok";
        assert_eq!(utf16_len(text), 6);
        assert_eq!(byte_index(text, 1), Some(2));
        assert_eq!(byte_index(text, 3), Some(6));
        assert_eq!(byte_index(text, 2), None);
        assert_eq!(utf16_slice(text, 4, 6), Some("ok"));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(byte_index("abc", 4), None);
        assert_eq!(utf16_slice("abc", 2, 1), None);
    }

    #[test]
    fn test_clamped_slice() {
        assert_eq!(utf16_slice_clamped("hello world", 0, 100), "hello world");
        assert_eq!(utf16_slice_clamped("hello world", 6, 11), "world");
        assert_eq!(utf16_slice_clamped("hello", 9, 12), "");
    }

    #[test]
    fn test_cursor_tracks_ascending_offsets() {
        let text = "é a é b";
        let mut cursor = Utf16Cursor::new(text);
        assert_eq!(cursor.advance_to(3), 2);
        assert_eq!(cursor.advance_to(text.len()), utf16_len(text));
        // Going backwards restarts from the beginning
        assert_eq!(cursor.advance_to(2), 1);
    }
}
