//! In-place replacement of reference arguments.
//!
//! A [`ContentRewriter`] replaces the value inside a matched argument literal
//! with a package-local token and leaves the quotes and call syntax alone.
//! Matches must be fed in content order; each rewrite advances a cursor past
//! the inserted token, so a literal that appears twice is rewritten exactly
//! twice and a token that happens to contain the old value is never
//! rewritten again.

use super::extractor::RawMatch;

/// A rewriting session over one content string.
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    content: String,
    cursor: usize,
    // Bytes added (or removed) by earlier rewrites; shifts match offsets
    delta: isize,
}

impl ContentRewriter {
    /// Start a session over `content`.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            cursor: 0,
            delta: 0,
        }
    }

    /// Replace the value of the next occurrence of `m.literal` with `token`.
    ///
    /// Returns `false` when no occurrence remains at or after the cursor, in
    /// which case the content is left unchanged.
    pub fn rewrite(&mut self, m: &RawMatch<'_>, token: &str) -> bool {
        let shifted = m.offset.saturating_add_signed(self.delta);
        let start = self.cursor.max(shifted);
        let Some(relative) = self.content.get(start..).and_then(|rest| rest.find(&m.literal))
        else {
            return false;
        };

        let found = start + relative;
        let quote = &m.literal[..1];
        let replacement = format!("{quote}{token}{quote}");
        let end = found + m.literal.len();
        self.content.replace_range(found..end, &replacement);

        self.cursor = found + replacement.len();
        self.delta += replacement.len() as isize - m.literal.len() as isize;
        true
    }

    /// Current content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Finish the session and hand back the content.
    #[must_use]
    pub fn into_content(self) -> String {
        self.content
    }
}
