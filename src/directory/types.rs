//! Member directory types

use crate::error::{AutoAtError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Group identifier (e.g., "123456789")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Member identifier as reported by the platform
///
/// OneBot implementations disagree on whether `user_id` is a number or a string,
/// so both are accepted and kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Text(String),
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl UserId {
    /// Ids that cannot be mentioned: empty strings and zero
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Numeric(id) => *id == 0,
            Self::Text(id) => id.trim().is_empty(),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{}", id),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// One entry of a group's member list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub user_id: UserId,

    /// Account nickname
    #[serde(default)]
    pub nickname: Option<String>,

    /// Group card, overrides the nickname inside the group when set
    #[serde(default)]
    pub card: Option<String>,

    /// owner / admin / member
    #[serde(default)]
    pub role: Option<String>,
}

impl MemberRecord {
    /// Check whether either name field equals `name` exactly
    pub fn answers_to(&self, name: &str) -> bool {
        self.nickname.as_deref() == Some(name) || self.card.as_deref() == Some(name)
    }
}

/// Shapes a member list fetch may come back in
///
/// Records stay as raw JSON here so one odd entry cannot sink the whole roster.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MemberListResponse {
    /// The list itself
    Bare(Vec<serde_json::Value>),

    /// A OneBot action envelope carrying the list in `data`
    Wrapped {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        retcode: Option<i64>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        data: Option<Vec<serde_json::Value>>,
    },
}

impl MemberListResponse {
    /// Decode a raw fetch result into the canonical member list
    ///
    /// An empty bare list is rejected: it is what some adapters return on failure.
    /// An envelope explicitly marked `failed` is surfaced as an API error, whatever its `data`.
    /// Records that do not parse are skipped; a non-empty list with no usable record is
    /// malformed.
    pub fn decode(raw: serde_json::Value) -> Result<Vec<MemberRecord>> {
        let preview = preview(&raw);
        let response: Self = serde_json::from_value(raw)
            .map_err(|e| AutoAtError::MalformedResponse(format!("{}: {}", e, preview)))?;

        let records = match response {
            Self::Bare(records) if records.is_empty() => {
                return Err(AutoAtError::MalformedResponse(
                    "empty member list".to_string(),
                ));
            }
            Self::Bare(records) => records,
            Self::Wrapped {
                status: Some(status),
                retcode,
                message,
                ..
            } if status == "failed" => {
                return Err(AutoAtError::Api {
                    retcode: retcode.unwrap_or(-1),
                    message: message.unwrap_or_default(),
                });
            }
            Self::Wrapped {
                data: Some(records),
                ..
            } => records,
            Self::Wrapped { data: None, .. } => {
                return Err(AutoAtError::MalformedResponse(format!(
                    "missing data: {}",
                    preview
                )));
            }
        };

        let total = records.len();
        let members: Vec<MemberRecord> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                match serde_json::from_value::<MemberRecord>(record) {
                    Ok(member) => Some(member),
                    Err(e) => {
                        tracing::warn!(index = index, error = %e, "Skipping unreadable member record");
                        None
                    }
                }
            })
            .collect();

        if total > 0 && members.is_empty() {
            return Err(AutoAtError::MalformedResponse(format!(
                "none of {} member records readable",
                total
            )));
        }
        Ok(members)
    }
}

fn preview(raw: &serde_json::Value) -> String {
    let text = raw.to_string();
    if text.chars().count() > 200 {
        format!("{}...", text.chars().take(200).collect::<String>())
    } else {
        text
    }
}

/// Cached roster of one group
#[derive(Debug, Clone)]
pub struct GroupCacheEntry {
    /// Members in fetch order
    pub members: Vec<MemberRecord>,

    /// When this roster was fetched
    pub last_updated: Instant,
}

impl GroupCacheEntry {
    pub fn new(members: Vec<MemberRecord>, last_updated: Instant) -> Self {
        Self {
            members,
            last_updated,
        }
    }

    /// Fresh iff `now - last_updated < ttl`
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_updated) < ttl
    }

    /// First member in fetch order answering to `name`, ignoring blank ids
    pub fn find(&self, name: &str) -> Option<&MemberRecord> {
        self.members
            .iter()
            .find(|m| m.answers_to(name) && !m.user_id.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member(user_id: i64, nickname: &str, card: Option<&str>) -> MemberRecord {
        MemberRecord {
            user_id: UserId::from(user_id),
            nickname: Some(nickname.to_string()),
            card: card.map(str::to_string),
            role: None,
        }
    }

    #[test]
    fn test_user_id_accepts_number_and_string() {
        let numeric: UserId = serde_json::from_value(json!(1001)).unwrap();
        let text: UserId = serde_json::from_value(json!("u-1001")).unwrap();

        assert_eq!(numeric, UserId::Numeric(1001));
        assert_eq!(text, UserId::Text("u-1001".to_string()));
        assert_eq!(numeric.to_string(), "1001");
        assert_eq!(text.to_string(), "u-1001");
    }

    #[test]
    fn test_member_record_without_card() {
        let record: MemberRecord =
            serde_json::from_value(json!({"user_id": 7, "nickname": "小明", "sex": "male"}))
                .unwrap();

        assert_eq!(record.card, None);
        assert!(record.answers_to("小明"));
        assert!(!record.answers_to(""));
    }

    #[test]
    fn test_decode_bare_and_wrapped_are_equivalent() {
        let records = json!([
            {"user_id": 1001, "nickname": "小明", "card": ""},
            {"user_id": 42, "nickname": "bee", "card": "B"}
        ]);

        let bare = MemberListResponse::decode(records.clone()).unwrap();
        let wrapped = MemberListResponse::decode(
            json!({"status": "ok", "retcode": 0, "data": records}),
        )
        .unwrap();

        assert_eq!(bare.len(), 2);
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        assert!(matches!(
            MemberListResponse::decode(json!({"members": []})),
            Err(AutoAtError::MalformedResponse(_))
        ));
        assert!(matches!(
            MemberListResponse::decode(json!("nope")),
            Err(AutoAtError::MalformedResponse(_))
        ));
        assert!(matches!(
            MemberListResponse::decode(json!(null)),
            Err(AutoAtError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_empty_lists() {
        assert!(MemberListResponse::decode(json!([])).is_err());
        assert_eq!(
            MemberListResponse::decode(json!({"data": []})).unwrap(),
            Vec::new()
        );
    }

    #[test]
    fn test_decode_failed_envelope() {
        let err = MemberListResponse::decode(
            json!({"status": "failed", "retcode": 100, "message": "group not found", "data": []}),
        )
        .unwrap_err();

        assert!(matches!(err, AutoAtError::Api { retcode: 100, .. }));
    }

    #[test]
    fn test_decode_failed_envelope_with_null_data() {
        let err = MemberListResponse::decode(
            json!({"status": "failed", "retcode": 100, "message": "no group", "data": null}),
        )
        .unwrap_err();

        match err {
            AutoAtError::Api { retcode, message } => {
                assert_eq!(retcode, 100);
                assert_eq!(message, "no group");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_ok_envelope_without_data_is_malformed() {
        assert!(matches!(
            MemberListResponse::decode(json!({"status": "ok", "retcode": 0, "data": null})),
            Err(AutoAtError::MalformedResponse(_))
        ));
        assert!(matches!(
            MemberListResponse::decode(json!({"status": "ok", "retcode": 0})),
            Err(AutoAtError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_skips_unreadable_records() {
        let bare = MemberListResponse::decode(json!([
            {"user_id": 1001, "nickname": "小明"},
            {"nickname": "ghost"},
            "not a record",
            {"user_id": "42", "card": "B"}
        ]))
        .unwrap();

        let ids: Vec<_> = bare.iter().map(|m| m.user_id.to_string()).collect();
        assert_eq!(ids, ["1001", "42"]);

        let wrapped = MemberListResponse::decode(
            json!({"data": [{"nickname": "ghost"}, {"user_id": 7, "nickname": "七"}]}),
        )
        .unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].user_id, UserId::from(7));
    }

    #[test]
    fn test_decode_rejects_list_without_readable_records() {
        assert!(matches!(
            MemberListResponse::decode(json!([{"nickname": "ghost"}, 3])),
            Err(AutoAtError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_entry_freshness_boundary() {
        let start = Instant::now();
        let entry = GroupCacheEntry::new(vec![], start);
        let ttl = Duration::from_secs(3000);

        assert!(entry.is_fresh(start, ttl));
        assert!(entry.is_fresh(start + Duration::from_secs(2999), ttl));
        assert!(!entry.is_fresh(start + ttl, ttl));
    }

    #[test]
    fn test_entry_find_prefers_fetch_order() {
        let entry = GroupCacheEntry::new(
            vec![
                member(1, "alice", None),
                member(2, "bob", Some("alice")),
                member(3, "carol", Some("Carol")),
            ],
            Instant::now(),
        );

        assert_eq!(entry.find("alice").map(|m| &m.user_id), Some(&UserId::from(1)));
        assert_eq!(entry.find("Carol").map(|m| &m.user_id), Some(&UserId::from(3)));
        assert!(entry.find("ali").is_none());
    }

    #[test]
    fn test_entry_find_ignores_blank_ids() {
        let blank = MemberRecord {
            user_id: UserId::from(""),
            nickname: Some("dave".to_string()),
            card: None,
            role: None,
        };
        let entry = GroupCacheEntry::new(
            vec![member(0, "erin", None), blank, member(8, "dave", None)],
            Instant::now(),
        );

        assert!(entry.find("erin").is_none());
        assert_eq!(entry.find("dave").map(|m| &m.user_id), Some(&UserId::from(8)));
    }
}
