//! Alignment of token surface strings against the base text.
//!
//! Tokens arrive in document order. The aligner keeps a cursor into the base
//! text and, for each token, searches a small window after the cursor for
//! the surface string. The window is as wide as the whitespace run at the
//! cursor plus one character, so formatting noise between tokens is
//! tolerated while a token missing from the text does not drag every later
//! token out of place.

/// Outcome of aligning one token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    /// The token covers `start..end` (byte offsets).
    Aligned { start: usize, end: usize },
    /// The surface string was not found within the lookahead budget.
    Mismatch,
}

#[derive(Clone, Debug, Default)]
pub struct TokenAligner {
    cursor: usize,
}

impl TokenAligner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unconsumed byte offset of the base text.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Start over at the beginning of a new text.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Number of characters that may be skipped before the match starts.
    pub fn lookahead(&self, text: &str) -> usize {
        text.get(self.cursor..)
            .unwrap_or_default()
            .chars()
            .take_while(|&c| is_formatting(c))
            .count()
            + 1
    }

    /// Align `surface` against `text`, advancing the cursor on success.
    ///
    /// On a mismatch the cursor stays where it was.
    pub fn align(&mut self, text: &str, surface: &str) -> Alignment {
        let budget = self.lookahead(text);
        let rest = text.get(self.cursor..).unwrap_or_default();

        let found = rest
            .char_indices()
            .take(budget + 1)
            .map(|(offset, _)| offset)
            .find(|&offset| rest[offset..].starts_with(surface));

        match found {
            Some(offset) => {
                let start = self.cursor + offset;
                let end = start + surface.len();
                self.cursor = end;
                Alignment::Aligned { start, end }
            }
            None => Alignment::Mismatch,
        }
    }
}

fn is_formatting(c: char) -> bool {
    c.is_whitespace() || c.is_control()
}
