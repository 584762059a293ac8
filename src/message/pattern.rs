//! Informal mention scanning
//!
//! Two forms are recognised:
//! - `@name`
//! - `艾特一name` / `艾特一下name` ("mention name")
//!
//! In both cases the name runs up to the next whitespace.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?P<at>\S+)|艾特一下?(?P<phrase>\S+)").expect("mention pattern is valid")
});

/// Which form of mention matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    /// `@name`
    At,
    /// `艾特一下name`
    Phrase,
}

/// A mention found in reply text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionCandidate<'a> {
    pub kind: MentionKind,

    /// The whole matched text, kept verbatim when the name does not resolve
    pub raw_text: &'a str,

    /// The captured name
    pub name: &'a str,

    /// Byte offset of the match in the scanned text
    pub start: usize,

    /// Byte offset just past the match
    pub end: usize,
}

impl MentionCandidate<'_> {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Find all non-overlapping mentions, left to right
pub fn scan_mentions(text: &str) -> Vec<MentionCandidate<'_>> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (kind, name) = match (caps.name("at"), caps.name("phrase")) {
                (Some(name), _) => (MentionKind::At, name),
                (None, Some(name)) => (MentionKind::Phrase, name),
                (None, None) => return None,
            };

            Some(MentionCandidate {
                kind,
                raw_text: whole.as_str(),
                name: name.as_str(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}
