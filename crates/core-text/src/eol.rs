//! End-of-line styles, detection and normalization.

use serde::Serialize;
use std::fmt;

/// Line break sequence used by a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Eol {
    Lf,
    Crlf,
}

impl Eol {
    pub fn as_str(self) -> &'static str {
        match self {
            Eol::Lf => "\n",
            Eol::Crlf => "\r\n",
        }
    }

    /// Number of chars in the sequence.
    pub fn char_len(self) -> usize {
        match self {
            Eol::Lf => 1,
            Eol::Crlf => 2,
        }
    }

    /// Parse a literal EOL sequence (`"\n"` or `"\r\n"`).
    pub fn from_sequence(s: &str) -> Option<Self> {
        match s {
            "\n" => Some(Eol::Lf),
            "\r\n" => Some(Eol::Crlf),
            _ => None,
        }
    }

    /// `\n` on unix-like targets, `\r\n` on Windows.
    pub const fn platform_default() -> Self {
        if cfg!(windows) { Eol::Crlf } else { Eol::Lf }
    }
}

impl fmt::Display for Eol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eol::Lf => f.write_str("LF"),
            Eol::Crlf => f.write_str("CRLF"),
        }
    }
}

/// Line break census of a piece of text. A lone `\r` is content, not a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EolCounts {
    pub lf: usize,
    pub crlf: usize,
}

impl EolCounts {
    pub fn scan(input: &str) -> Self {
        let bytes = input.as_bytes();
        let mut counts = Self::default();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'\n' {
                if i > 0 && bytes[i - 1] == b'\r' {
                    counts.crlf += 1;
                } else {
                    counts.lf += 1;
                }
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.lf + self.crlf
    }

    pub fn is_mixed(&self) -> bool {
        self.lf > 0 && self.crlf > 0
    }

    /// The style actually used by the text: CRLF when CRLF breaks are more than half of
    /// all breaks, LF otherwise, `None` for text without any break.
    pub fn dominant(&self) -> Option<Eol> {
        let total = self.total();
        if total == 0 {
            None
        } else if self.crlf > total / 2 {
            Some(Eol::Crlf)
        } else {
            Some(Eol::Lf)
        }
    }
}

/// Rewrite every `\n` / `\r\n` break of `input` as `eol`. Borrows when nothing changes.
pub fn normalize_eol(input: &str, eol: Eol) -> std::borrow::Cow<'_, str> {
    let counts = EolCounts::scan(input);
    let clean = match eol {
        Eol::Lf => counts.crlf == 0,
        Eol::Crlf => counts.lf == 0,
    };
    if clean {
        return std::borrow::Cow::Borrowed(input);
    }
    // Span-copy: only slice at '\r' / '\n' boundaries so multi-byte sequences stay intact.
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len() + counts.lf);
    let mut seg_start = 0usize;
    let mut j = 0usize;
    while j < bytes.len() {
        let break_len = match bytes[j] {
            b'\r' if j + 1 < bytes.len() && bytes[j + 1] == b'\n' => 2,
            b'\n' => 1,
            _ => 0,
        };
        if break_len == 0 {
            j += 1;
            continue;
        }
        out.push_str(&input[seg_start..j]);
        out.push_str(eol.as_str());
        j += break_len;
        seg_start = j;
    }
    out.push_str(&input[seg_start..]);
    std::borrow::Cow::Owned(out)
}

/// LF normalization used when reading mixed text: every `\r*\n` run becomes one `\n`.
/// An LF buffer cannot hold a `\r` directly before a break, so such a `\r` is dropped.
pub(crate) fn collapse_to_lf(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut segments = input.split('\n').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            out.push_str(segment.trim_end_matches('\r'));
            out.push('\n');
        } else {
            out.push_str(segment);
        }
    }
    out
}
