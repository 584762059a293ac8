mod pattern;
mod rewriter;
mod types;

pub use pattern::{MentionCandidate, MentionKind, scan_mentions};
pub use rewriter::{MentionRewriter, RewriteOutcome, build_chain};
pub use types::{OutgoingMessage, Segment};
