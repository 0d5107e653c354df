//! Split-at-caret and the pending insertion cursor

/// Split `text` at a character offset.
///
/// Any caret in `0..=char_count` is accepted; at either end one half is
/// empty. `left + right == text` holds for every accepted offset.
pub fn split_text(text: &str, caret: usize) -> Option<(String, String)> {
    let byte = match text.char_indices().nth(caret) {
        Some((byte, _)) => byte,
        None if caret == text.chars().count() => text.len(),
        None => return None,
    };
    let (left, right) = text.split_at(byte);
    Some((left.to_string(), right.to_string()))
}

/// Byte offset of a character offset, clamped to the end of the string
pub fn byte_offset(text: &str, caret: usize) -> usize {
    text.char_indices()
        .nth(caret)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Pending position at which the next added module lands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertionCursor {
    pending: Option<usize>,
}

impl InsertionCursor {
    pub fn get(&self) -> Option<usize> {
        self.pending
    }

    pub fn open(&mut self, index: usize) {
        self.pending = Some(index);
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Called after a module was inserted at `index`
    pub fn inserted_at(&mut self, index: usize) {
        if let Some(pending) = self.pending {
            if index <= pending {
                self.pending = Some(pending.max(index) + 1);
            }
        }
    }

    /// Called after the module at `index` was removed
    pub fn removed_at(&mut self, index: usize) {
        if let Some(pending) = self.pending {
            if index < pending {
                self.pending = Some(pending - 1);
            }
        }
    }

    /// Keep the cursor within `0..=len`
    pub fn clamp(&mut self, len: usize) {
        if let Some(pending) = self.pending {
            self.pending = Some(pending.min(len));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ascii() {
        assert_eq!(
            split_text("hello", 2),
            Some(("he".to_string(), "llo".to_string()))
        );
    }

    #[test]
    fn test_split_hangul_on_char_boundaries() {
        let text = "영업시간입니다";
        for k in 0..=text.chars().count() {
            let (left, right) = split_text(text, k).unwrap();
            assert_eq!(left.chars().count(), k);
            assert_eq!(format!("{}{}", left, right), text);
        }
    }

    #[test]
    fn test_split_edges_leave_empty_half() {
        assert_eq!(split_text("abc", 0), Some((String::new(), "abc".to_string())));
        assert_eq!(split_text("abc", 3), Some(("abc".to_string(), String::new())));
        assert_eq!(split_text("", 0), Some((String::new(), String::new())));
    }

    #[test]
    fn test_split_rejects_out_of_range() {
        assert_eq!(split_text("abc", 4), None);
        assert_eq!(split_text("가나", 3), None);
        assert_eq!(split_text("", 1), None);
    }

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset("가나다", 1), 3);
        assert_eq!(byte_offset("가나다", 3), 9);
        assert_eq!(byte_offset("가나다", 9), 9);
    }

    #[test]
    fn test_cursor_advances_on_insert() {
        let mut cursor = InsertionCursor::default();
        cursor.inserted_at(0);
        assert_eq!(cursor.get(), None);

        cursor.open(2);
        cursor.inserted_at(2);
        assert_eq!(cursor.get(), Some(3));
        cursor.inserted_at(3);
        assert_eq!(cursor.get(), Some(4));
        // Inserts after the cursor do not move it
        cursor.inserted_at(9);
        assert_eq!(cursor.get(), Some(4));
    }

    #[test]
    fn test_cursor_follows_removal() {
        let mut cursor = InsertionCursor::default();
        cursor.open(3);
        cursor.removed_at(0);
        assert_eq!(cursor.get(), Some(2));
        cursor.removed_at(2);
        assert_eq!(cursor.get(), Some(2));
        cursor.clamp(1);
        assert_eq!(cursor.get(), Some(1));
    }
}
