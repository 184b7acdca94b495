use serde::{Deserialize, Serialize};
use std::fmt;

/// Range in the checked source in UTF-16 code units, as reported by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Maps parser offsets to 1-based line and column numbers.
///
/// Offsets count UTF-16 code units, the unit JavaScript string indices use,
/// so a CJK character advances by one and an astral one by two. Columns are
/// counted the same way. `\n`, `\r\n` and a lone `\r` all terminate a line.
#[derive(Debug, Clone)]
pub struct LineIndex<'s> {
    source: &'s str,
    /// `(utf16_offset, byte_offset)` of each line start
    line_starts: Vec<(usize, usize)>,
    utf16_len: usize,
}

impl<'s> LineIndex<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut line_starts = vec![(0, 0)];
        let mut utf16 = 0;
        let mut chars = source.char_indices().peekable();
        while let Some((byte, ch)) = chars.next() {
            utf16 += ch.len_utf16();
            match ch {
                '\r' if matches!(chars.peek(), Some((_, '\n'))) => {
                    chars.next();
                    utf16 += 1;
                    line_starts.push((utf16, byte + 2));
                }
                '\r' | '\n' => line_starts.push((utf16, byte + 1)),
                _ => {}
            }
        }

        LineIndex {
            source,
            line_starts,
            utf16_len: utf16,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line and column of `offset`, both 1-based. Offsets past the end clamp to it.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.utf16_len);
        let line = self
            .line_starts
            .partition_point(|&(start, _)| start <= offset);
        let column = offset - self.line_starts[line - 1].0 + 1;
        (line, column)
    }

    /// Text of a 1-based line without its terminator
    pub fn line_text(&self, line: usize) -> Option<&'s str> {
        if line == 0 || line > self.line_starts.len() {
            return None;
        }
        let (_, start) = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|&(_, byte)| byte)
            .unwrap_or(self.source.len());
        let text = self.source.get(start..end)?;
        Some(text.trim_end_matches(['\n', '\r']))
    }

    /// Inclusive range of lines touched by `span`
    pub fn lines_of(&self, span: Span) -> (usize, usize) {
        let (first, _) = self.line_col(span.start);
        let (last, _) = self.line_col(span.end.saturating_sub(1).max(span.start));
        (first, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_single_line() {
        let index = LineIndex::new("let x = 1");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(4), (1, 5));
    }

    #[test]
    fn test_line_col_mixed_terminators() {
        let index = LineIndex::new("a\nb\r\nc\rd");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_col(2), (2, 1));
        assert_eq!(index.line_col(5), (3, 1));
        assert_eq!(index.line_col(7), (4, 1));
        assert_eq!(index.line_text(2), Some("b"));
        assert_eq!(index.line_text(3), Some("c"));
        assert_eq!(index.line_text(5), None);
    }

    #[test]
    fn test_offsets_count_utf16_units() {
        let source = "<: \"ああああ\"\nvar x: str = 1234\n";
        let index = LineIndex::new(source);
        assert_eq!(index.line_col(10), (2, 1));
        assert_eq!(index.lines_of(Span::new(10, 27)), (2, 2));
        assert_eq!(index.line_text(1), Some("<: \"ああああ\""));
        assert_eq!(index.line_text(2), Some("var x: str = 1234"));

        // Astral characters take two units
        let index = LineIndex::new("😀\nx");
        assert_eq!(index.line_col(2), (1, 3));
        assert_eq!(index.line_col(3), (2, 1));
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.line_col(100), (2, 3));
    }

    #[test]
    fn test_lines_of_multiline_span() {
        let source = "var x = {\n  a: 1\n}\nx";
        let index = LineIndex::new(source);
        assert_eq!(index.lines_of(Span::new(0, 18)), (1, 3));
        assert_eq!(index.lines_of(Span::new(19, 20)), (4, 4));
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(3, 9).to_string(), "3..9");
        assert_eq!(Span::new(3, 9).len(), 6);
        assert!(Span::default().is_empty());
    }
}
