//! Byte-offset to line/column mapping.
//!
//! Parsers report AST node positions as byte offsets into the raw document;
//! reports want 1-indexed line/column pairs. [`LineIndex`] bridges the two
//! with a sorted vector of line-start offsets and a binary search per lookup.

/// Ascending byte offsets of line starts for one document.
///
/// Offset 0 is always present, so lookups never observe an empty index.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Builds the index from raw document content.
    #[must_use]
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            content
                .bytes()
                .enumerate()
                .filter_map(|(offset, byte)| (byte == b'\n').then_some(offset + 1)),
        );
        Self { line_starts }
    }

    /// Maps a byte offset to a 1-indexed `(line, column)` pair.
    ///
    /// Columns are byte-based within the line. Offsets past the end of the
    /// content map to the final line.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        // partition_point is at least 1 because line_starts[0] == 0.
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        (line, offset - line_start + 1)
    }

    /// Number of lines in the document (at least 1, even when empty).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_has_single_line() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(0), (1, 1));
    }

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("hello world");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(6), (1, 7));
    }

    #[test]
    fn test_multi_line() {
        //                          0123 4567 8
        let index = LineIndex::new("abc\ndef\ng");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(3), (1, 4));
        assert_eq!(index.line_col(4), (2, 1));
        assert_eq!(index.line_col(6), (2, 3));
        assert_eq!(index.line_col(8), (3, 1));
    }

    #[test]
    fn test_trailing_newline_retains_final_line() {
        let index = LineIndex::new("abc\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_col(4), (2, 1));
    }

    #[test]
    fn test_offset_past_end_maps_to_final_line() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.line_col(100), (2, 98));
    }
}
