//! Group member list fetching

use crate::config::OneBotConfig;
use crate::directory::GroupId;
use crate::error::{AutoAtError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Capability to fetch a group's raw member list from the platform
///
/// The raw JSON is returned untouched; shape handling happens in the cache.
#[async_trait]
pub trait MemberFetcher: Send + Sync {
    async fn fetch_group_members(&self, group_id: &GroupId) -> Result<serde_json::Value>;
}

/// OneBot v11 HTTP API client
pub struct OneBotClient {
    http: reqwest::Client,
    api_url: String,
    access_token: Option<String>,
}

impl OneBotClient {
    pub fn new(config: &OneBotConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn action_url(&self, action: &str) -> String {
        format!("{}/{}", self.api_url, action)
    }

    /// Call a OneBot action and return the raw JSON reply
    pub async fn call_action(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let mut request = self.http.post(self.action_url(action)).json(&params);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(action = %action, "Calling OneBot action");

        let response = request
            .send()
            .await
            .map_err(|e| AutoAtError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutoAtError::Fetch(format!(
                "{} returned HTTP {}",
                action, status
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MemberFetcher for OneBotClient {
    async fn fetch_group_members(&self, group_id: &GroupId) -> Result<serde_json::Value> {
        // OneBot expects a numeric group_id; fall back to the raw string for other adapters
        let group = match group_id.as_str().parse::<i64>() {
            Ok(id) => serde_json::Value::from(id),
            Err(_) => serde_json::Value::from(group_id.as_str()),
        };

        self.call_action(
            "get_group_member_list",
            serde_json::json!({ "group_id": group }),
        )
        .await
    }
}
