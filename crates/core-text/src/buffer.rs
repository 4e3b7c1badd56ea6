//! Rope-backed, line-indexed text buffer.
//!
//! The rope is built with LF-only line breaks (ropey without `cr_lines`), so a
//! CRLF break is seen by the rope as a line ending in `\r\n` and stripped here.
//! Every break in the rope uses the buffer's single `Eol`; mixed input is
//! normalized at construction. Cloning is O(1) (shared tree nodes) and an
//! edit only rebuilds the nodes it touches.

use crate::edit::TextError;
use crate::eol::{Eol, EolCounts, collapse_to_lf, normalize_eol};
use crate::position::{Position, Range};
use ropey::{Rope, RopeSlice};
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use tracing::trace;

/// Identity of a buffer's line structure: EOL, line count, length and a hash of every line.
///
/// Two buffers with equal fingerprints have (up to hash collision) the same
/// lines and the same EOL, so positions computed against one are valid in the
/// other. Raw text equality does not give that: `"a\r\nb"` is one text but
/// two line structures depending on the EOL it is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint {
    pub eol: Eol,
    pub line_count: usize,
    pub len_chars: usize,
    pub hash: u64,
}

#[derive(Clone, Debug)]
pub struct LineBuffer {
    rope: Rope,
    eol: Eol,
    default_eol: Eol,
    detected_eol: Option<Eol>,
    mixed_eol: bool,
}

impl LineBuffer {
    /// Build a buffer from raw text. The EOL is detected from the text and falls back to
    /// `default_eol` when the text has no line break. Mixed text read as LF loses any
    /// `\r` that sat directly before a break.
    pub fn new(text: &str, default_eol: Eol) -> Self {
        let counts = EolCounts::scan(text);
        let detected_eol = counts.dominant();
        let eol = detected_eol.unwrap_or(default_eol);
        let rope = if eol == Eol::Lf && counts.crlf > 0 {
            Rope::from_str(&collapse_to_lf(text))
        } else {
            Rope::from_str(&normalize_eol(text, eol))
        };
        if counts.is_mixed() {
            trace!(target: "text.buffer", lf = counts.lf, crlf = counts.crlf, eol = %eol, "mixed_eol_normalized");
        }
        Self {
            rope,
            eol,
            default_eol,
            detected_eol,
            mixed_eol: counts.is_mixed(),
        }
    }

    /// Join `lines` with `eol`.
    pub fn from_lines<S: AsRef<str>>(lines: &[S], eol: Eol) -> Self {
        let text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(eol.as_str());
        Self::new(&text, eol)
    }

    pub fn eol(&self) -> Eol {
        self.eol
    }

    /// EOL requested by the creator of the buffer (used when the text had no break).
    pub fn default_eol(&self) -> Eol {
        self.default_eol
    }

    /// EOL actually found in the source text, if it had any break.
    pub fn detected_eol(&self) -> Option<Eol> {
        self.detected_eol
    }

    /// True when the source text mixed `\n` and `\r\n` and had to be normalized.
    pub fn had_mixed_eol(&self) -> bool {
        self.mixed_eol
    }

    /// Number of lines; never zero.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Char offset of the line start and the char length of its content (EOL excluded).
    fn line_bounds(&self, line_number: usize) -> (usize, usize) {
        debug_assert!(
            (1..=self.line_count()).contains(&line_number),
            "line {line_number} outside 1..={}",
            self.line_count()
        );
        let idx = line_number.clamp(1, self.line_count()) - 1;
        let start = self.rope.line_to_char(idx);
        let line = self.rope.line(idx);
        let mut len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
            if self.eol == Eol::Crlf && len > 0 && line.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        (start, len)
    }

    /// Content of a line without its EOL, as a rope slice (no allocation).
    pub(crate) fn line_slice(&self, line_number: usize) -> RopeSlice<'_> {
        let (start, len) = self.line_bounds(line_number);
        self.rope.slice(start..start + len)
    }

    /// Whether the content of `line_number` ends in `\r`.
    pub(crate) fn line_ends_in_cr(&self, line_number: usize) -> bool {
        let (start, len) = self.line_bounds(line_number);
        len > 0 && self.rope.char(start + len - 1) == '\r'
    }

    /// Content of line `line_number` (1-based) without its EOL.
    pub fn line_content(&self, line_number: usize) -> String {
        self.line_slice(line_number).to_string()
    }

    /// Length in chars of a line's content.
    pub fn line_length(&self, line_number: usize) -> usize {
        self.line_bounds(line_number).1
    }

    /// Column just past the last char of the line.
    pub fn line_max_column(&self, line_number: usize) -> usize {
        self.line_length(line_number) + 1
    }

    pub fn lines_content(&self) -> Vec<String> {
        (1..=self.line_count())
            .map(|n| self.line_content(n))
            .collect()
    }

    /// Line-wise content equality, ignoring the EOL of either buffer.
    pub fn equals_lines(&self, other: &LineBuffer) -> bool {
        self.line_count() == other.line_count()
            && (1..=self.line_count()).all(|n| self.line_slice(n) == other.line_slice(n))
    }

    pub fn fingerprint(&self) -> ContentFingerprint {
        let mut h = DefaultHasher::new();
        for n in 1..=self.line_count() {
            for chunk in self.line_slice(n).chunks() {
                h.write(chunk.as_bytes());
            }
            // 0xff never occurs in UTF-8, so it separates lines unambiguously
            h.write_u8(0xff);
        }
        ContentFingerprint {
            eol: self.eol,
            line_count: self.line_count(),
            len_chars: self.len_chars(),
            hash: h.finish(),
        }
    }

    /// Full text including EOL sequences.
    pub fn value(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.line_number >= 1
            && pos.line_number <= self.line_count()
            && pos.column >= 1
            && pos.column <= self.line_max_column(pos.line_number)
    }

    pub fn is_valid_range(&self, range: &Range) -> bool {
        self.is_valid_position(range.start()) && self.is_valid_position(range.end())
    }

    pub fn validate_position(&self, pos: Position) -> Position {
        let mut out = pos;
        out.clamp_to(self.line_count(), |line| self.line_bounds(line).1 + 1);
        out
    }

    pub fn validate_range(&self, range: Range) -> Range {
        Range::from_positions(
            self.validate_position(range.start()),
            self.validate_position(range.end()),
        )
    }

    /// Absolute char offset of a (clamped) position.
    pub fn offset_at(&self, pos: Position) -> usize {
        let pos = self.validate_position(pos);
        let (start, _) = self.line_bounds(pos.line_number);
        start + pos.column - 1
    }

    /// Text covered by `range`, with the buffer's own EOL between lines.
    pub fn value_in_range(&self, range: Range) -> String {
        let start = self.offset_at(range.start());
        let end = self.offset_at(range.end());
        self.rope.slice(start..end).to_string()
    }

    /// Replace the chars in `[start, end)` with `text`. `text` must already use the buffer EOL.
    pub(crate) fn replace_chars(&mut self, start: usize, end: usize, text: &str) {
        debug_assert!(start <= end && end <= self.rope.len_chars());
        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
    }

    /// Rewrite every line break with `eol`.
    ///
    /// Switching to LF fails when a line other than the last ends in `\r`:
    /// that `\r` would merge with the new break into a CRLF.
    pub fn set_eol(&mut self, eol: Eol) -> Result<(), TextError> {
        if self.eol == eol {
            return Ok(());
        }
        if eol == Eol::Lf {
            if let Some(line_number) =
                (1..self.line_count()).find(|&n| self.line_ends_in_cr(n))
            {
                return Err(TextError::CarriageReturnBeforeLineFeed { line_number });
            }
        }
        let current = self.rope.to_string();
        self.rope = Rope::from_str(&normalize_eol(&current, eol));
        self.eol = eol;
        trace!(target: "text.buffer", eol = %eol, lines = self.line_count(), "eol_changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_one_empty_line() {
        let b = LineBuffer::new("", Eol::Lf);
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line_content(1), "");
        assert_eq!(b.line_max_column(1), 1);
        assert_eq!(b.eol(), Eol::Lf);
        assert_eq!(b.detected_eol(), None);
    }

    #[test]
    fn crlf_lines_strip_both_bytes() {
        let b = LineBuffer::new("hello\r\nworld\r\n", Eol::Lf);
        assert_eq!(b.eol(), Eol::Crlf);
        assert_eq!(b.line_count(), 3);
        assert_eq!(b.line_content(1), "hello");
        assert_eq!(b.line_content(2), "world");
        assert_eq!(b.line_content(3), "");
        assert_eq!(b.line_length(2), 5);
    }

    #[test]
    fn default_eol_used_without_breaks() {
        let b = LineBuffer::new("farboo", Eol::Crlf);
        assert_eq!(b.eol(), Eol::Crlf);
        assert_eq!(b.default_eol(), Eol::Crlf);
        assert_eq!(b.detected_eol(), None);
    }

    #[test]
    fn mixed_input_is_normalized_to_majority() {
        let b = LineBuffer::new("a\r\nb\r\nc\nd", Eol::Lf);
        assert!(b.had_mixed_eol());
        assert_eq!(b.eol(), Eol::Crlf);
        assert_eq!(b.value(), "a\r\nb\r\nc\r\nd");
        assert_eq!(b.lines_content(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn mixed_input_read_as_lf_holds_no_cr_before_break() {
        let b = LineBuffer::new("a\r\r\nb\nc\rd\ne", Eol::Crlf);
        assert_eq!(b.eol(), Eol::Lf);
        assert_eq!(b.value(), "a\nb\nc\rd\ne");
        assert_eq!(LineBuffer::new(&b.value(), Eol::Crlf).lines_content(), b.lines_content());
    }

    #[test]
    fn lone_cr_stays_in_line_content() {
        let b = LineBuffer::new("a\rb\nc", Eol::Lf);
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_content(1), "a\rb");
    }

    #[test]
    fn equality_ignores_eol() {
        let lf = LineBuffer::new("x\ny\nz", Eol::Lf);
        let crlf = LineBuffer::new("x\r\ny\r\nz", Eol::Lf);
        assert!(lf.equals_lines(&crlf));
        assert_ne!(lf.value(), crlf.value());
        let other = LineBuffer::new("x\ny\nZ", Eol::Lf);
        assert!(!lf.equals_lines(&other));
    }

    #[test]
    fn value_in_range_uses_buffer_eol() {
        let b = LineBuffer::new("one\r\ntwo\r\nthree", Eol::Lf);
        assert_eq!(b.value_in_range(Range::new(1, 2, 2, 3)), "ne\r\ntw");
        assert_eq!(b.value_in_range(Range::new(1, 4, 2, 1)), "\r\n");
        assert_eq!(b.value_in_range(Range::new(3, 1, 3, 6)), "three");
    }

    #[test]
    fn validate_clamps_out_of_bounds() {
        let b = LineBuffer::new("ab\ncde", Eol::Lf);
        assert_eq!(b.validate_position(Position::new(9, 9)), Position::new(2, 4));
        assert_eq!(b.validate_position(Position::new(1, 0)), Position::new(1, 1));
        assert!(!b.is_valid_range(&Range::new(1, 1, 1, 4)));
        assert!(b.is_valid_range(&Range::new(1, 1, 2, 4)));
    }

    #[test]
    fn multibyte_columns_count_chars() {
        let b = LineBuffer::new("漢字x\né", Eol::Lf);
        assert_eq!(b.line_length(1), 3);
        assert_eq!(b.offset_at(Position::new(2, 1)), 4);
        assert_eq!(b.value_in_range(Range::new(1, 2, 1, 4)), "字x");
    }

    #[test]
    fn set_eol_rewrites_breaks() {
        let mut b = LineBuffer::new("a\nb\n", Eol::Lf);
        b.set_eol(Eol::Crlf).unwrap();
        assert_eq!(b.value(), "a\r\nb\r\n");
        assert_eq!(b.line_count(), 3);
        assert_eq!(b.line_content(2), "b");
    }

    #[test]
    fn set_eol_to_lf_refuses_line_ending_in_cr() {
        let mut b = LineBuffer::new("a\r\r\nb\r", Eol::Lf);
        assert_eq!(b.eol(), Eol::Crlf);
        assert_eq!(b.lines_content(), vec!["a\r", "b\r"]);
        assert_eq!(
            b.set_eol(Eol::Lf),
            Err(TextError::CarriageReturnBeforeLineFeed { line_number: 1 })
        );
        assert_eq!(b.value(), "a\r\r\nb\r");

        // a '\r' at the end of the last line has no break after it
        let mut last = LineBuffer::new("a\r\nb\r", Eol::Lf);
        last.set_eol(Eol::Lf).unwrap();
        assert_eq!(last.lines_content(), vec!["a", "b\r"]);
    }

    #[test]
    fn fingerprint_tracks_line_structure_not_raw_text() {
        assert_eq!(
            LineBuffer::new("x\ny", Eol::Lf).fingerprint(),
            LineBuffer::new("x\ny", Eol::Crlf).fingerprint()
        );
        assert_ne!(
            LineBuffer::new("x\ny", Eol::Lf).fingerprint(),
            LineBuffer::new("x\r\ny", Eol::Lf).fingerprint(),
            "same lines, different eol"
        );
        assert_ne!(
            LineBuffer::new("xy", Eol::Lf).fingerprint(),
            LineBuffer::new("x\ny", Eol::Lf).fingerprint()
        );
        assert_ne!(
            LineBuffer::new("a\nbc", Eol::Lf).fingerprint(),
            LineBuffer::new("ab\nc", Eol::Lf).fingerprint()
        );
    }
}
