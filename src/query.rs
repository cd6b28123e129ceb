//! Query translation.
//!
//! Maps a validated `list-blog` request onto the filter consumed by the store
//! connector. Pure: no I/O, no error conditions.

use mongodb::bson::{doc, Document};

use crate::store::CatalogEntry;

/// Result limit applied when a caller omits `limit`.
pub const DEFAULT_LIMIT: i64 = 20;

/// Field predicates for a catalog read.
///
/// The only supported predicate is a case-insensitive substring match on the
/// author name. An empty filter matches every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Substring to match against `author.name`, case-insensitively.
    /// `None` disables filtering; `Some("")` matches everything.
    pub author: Option<String>,
}

impl CatalogFilter {
    /// Filter on an author-name substring.
    pub fn by_author(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
        }
    }

    /// Render the filter as a MongoDB query document.
    ///
    /// Substring semantics are expressed as an unanchored `$regex` with the
    /// needle's regex metacharacters escaped, matched case-insensitively.
    pub fn to_document(&self) -> Document {
        match &self.author {
            Some(needle) => doc! {
                "author.name": { "$regex": escape_regex(needle), "$options": "i" }
            },
            None => Document::new(),
        }
    }

    /// Evaluate the filter against an entry in memory.
    ///
    /// Same semantics as [`to_document`](Self::to_document); used by in-memory
    /// catalog implementations and as the reference for tests.
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match &self.author {
            Some(needle) => entry
                .author
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

/// Escape regex metacharacters so the needle matches literally.
fn escape_regex(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(
            c,
            '\\' | '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
