//! Rewrites informal mentions in outgoing replies into real mention segments

use crate::directory::{GroupId, MemberDirectory, MemberFetcher, UserId};
use crate::logging::Timer;
use crate::message::pattern::{MentionCandidate, scan_mentions};
use crate::message::types::{OutgoingMessage, Segment};
use std::sync::Arc;

/// What the rewrite hook did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Not a group message, nothing to resolve against
    NotGroup,
    /// No mention patterns in the text
    NoCandidates,
    /// Mentions found but none resolved; message left untouched
    Unresolved { candidates: usize },
    /// Chain replaced
    Rewritten { mentions: usize, candidates: usize },
}

impl RewriteOutcome {
    pub fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten { .. })
    }
}

pub struct MentionRewriter {
    directory: Arc<MemberDirectory>,
}

impl MentionRewriter {
    pub fn new(directory: Arc<MemberDirectory>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &Arc<MemberDirectory> {
        &self.directory
    }

    /// Replace informal mentions in `message` with mention segments
    ///
    /// The chain is rebuilt from the message's plain text and only swapped in when at
    /// least one mention resolved, so structured segments survive untouched otherwise.
    /// Never fails; a miss leaves the mention as literal text.
    pub async fn rewrite(
        &self,
        message: &mut OutgoingMessage,
        fetcher: &dyn MemberFetcher,
    ) -> RewriteOutcome {
        let Some(group_id) = message.group_id.clone() else {
            return RewriteOutcome::NotGroup;
        };

        let original_text = message.plain_text();
        let candidates = scan_mentions(&original_text);
        if candidates.is_empty() {
            return RewriteOutcome::NoCandidates;
        }

        let _timer = Timer::new("rewrite_mentions");
        self.directory.ensure_fresh(&group_id, fetcher).await;

        let (chain, mentions) = build_chain(&original_text, &candidates, |candidate| {
            self.resolve(&group_id, candidate)
        });

        if mentions == 0 {
            return RewriteOutcome::Unresolved {
                candidates: candidates.len(),
            };
        }

        message.chain = chain;
        tracing::info!(
            group_id = %group_id,
            mentions = mentions,
            original = %original_text,
            rewritten = %message.render(),
            "Converted mention text to mention segments"
        );

        RewriteOutcome::Rewritten {
            mentions,
            candidates: candidates.len(),
        }
    }

    fn resolve(&self, group_id: &GroupId, candidate: &MentionCandidate<'_>) -> Option<UserId> {
        match self.directory.lookup(group_id, candidate.name) {
            Some(user_id) => {
                tracing::info!(
                    group_id = %group_id,
                    name = %candidate.name,
                    user_id = %user_id,
                    "Resolved mention"
                );
                Some(user_id)
            }
            None => {
                tracing::warn!(
                    group_id = %group_id,
                    name = %candidate.name,
                    "No member found for mention, keeping original text"
                );
                None
            }
        }
    }
}

/// Rebuild `text` as a chain, turning resolved candidates into mention segments
///
/// Returns the chain and how many mentions resolved. Unresolved candidates keep their
/// full matched text. Neighbouring text pieces are merged, and empty ones never emitted.
pub fn build_chain<F>(
    text: &str,
    candidates: &[MentionCandidate<'_>],
    mut resolve: F,
) -> (Vec<Segment>, usize)
where
    F: FnMut(&MentionCandidate<'_>) -> Option<UserId>,
{
    let mut chain = Vec::with_capacity(candidates.len() * 2 + 1);
    let mut mentions = 0;
    let mut cursor = 0;

    for candidate in candidates {
        push_text(&mut chain, &text[cursor..candidate.start]);

        match resolve(candidate) {
            Some(user_id) => {
                chain.push(Segment::At { qq: user_id });
                mentions += 1;
            }
            None => push_text(&mut chain, candidate.raw_text),
        }

        cursor = candidate.end;
    }

    push_text(&mut chain, &text[cursor..]);
    (chain, mentions)
}

fn push_text(chain: &mut Vec<Segment>, piece: &str) {
    if piece.is_empty() {
        return;
    }

    match chain.last_mut() {
        Some(Segment::Text { text }) => text.push_str(piece),
        _ => chain.push(Segment::text(piece)),
    }
}
