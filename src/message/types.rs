use crate::directory::{GroupId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One element of a OneBot v11 message chain
///
/// Serializes as `{"type": "text", "data": {"text": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Segment {
    Text { text: String },
    At { qq: UserId },
    Face { id: String },
    Image { file: String },
    Reply { id: String },
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn at(qq: impl Into<UserId>) -> Self {
        Self::At { qq: qq.into() }
    }

    /// Text carried by a plain-text segment
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_mention(&self) -> bool {
        matches!(self, Self::At { .. })
    }
}

/// Text verbatim, everything else as its CQ code
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { text } => f.write_str(text),
            Self::At { qq } => write!(f, "[CQ:at,qq={}]", qq),
            Self::Face { id } => write!(f, "[CQ:face,id={}]", id),
            Self::Image { file } => write!(f, "[CQ:image,file={}]", file),
            Self::Reply { id } => write!(f, "[CQ:reply,id={}]", id),
        }
    }
}

/// A fully-formed reply about to be delivered
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    /// Group the reply goes to; `None` for private conversations
    pub group_id: Option<GroupId>,

    pub chain: Vec<Segment>,
}

impl OutgoingMessage {
    pub fn group(group_id: GroupId, chain: Vec<Segment>) -> Self {
        Self {
            group_id: Some(group_id),
            chain,
        }
    }

    pub fn private(chain: Vec<Segment>) -> Self {
        Self {
            group_id: None,
            chain,
        }
    }

    /// All plain-text pieces of the chain joined together
    pub fn plain_text(&self) -> String {
        self.chain.iter().filter_map(Segment::as_text).collect()
    }

    /// Render the chain with CQ codes for non-text segments
    pub fn render(&self) -> String {
        self.chain.iter().map(ToString::to_string).collect()
    }
}
