//! Bright Data Reddit datasets.
//!
//! Both operations trigger a dataset collection, then hand the snapshot id
//! to a [`SnapshotJob`]. A job that fails or runs out of attempts yields
//! `Ok(None)`.

use futures::future::BoxFuture;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use scout_core::config::SocialConfig;
use scout_core::error::{Result, ScoutError};
use scout_core::traits::SocialScrapeProvider;
use scout_core::types::{PostComment, PostDetails, SocialPost, SocialPosts};

use crate::job::{JobOutcome, PollPolicy, SnapshotApi, SnapshotJob, SnapshotStatus};

const PROVIDER: &str = "reddit";

pub struct BrightDataReddit {
    http: reqwest::Client,
    api_key: String,
    config: SocialConfig,
    policy: PollPolicy,
}

impl BrightDataReddit {
    pub fn new(api_key: &str, config: SocialConfig) -> Self {
        let policy = PollPolicy::from(&config.polling);
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            config,
            policy,
        }
    }

    pub fn from_config(config: &SocialConfig) -> Self {
        Self::new(config.api_key.as_deref().unwrap_or_default(), config.clone())
    }

    /// Override the polling policy (tests and impatient callers).
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request_error(e: impl std::fmt::Display) -> ScoutError {
        ScoutError::ProviderRequest {
            provider: PROVIDER.into(),
            message: e.to_string(),
        }
    }

    /// Start a collection and return its snapshot id, if the API handed one out.
    async fn trigger(&self, params: &[(&str, &str)], body: &Value) -> Result<Option<String>> {
        let resp = self
            .http
            .post(self.url("trigger"))
            .bearer_auth(&self.api_key)
            .query(params)
            .json(body)
            .send()
            .await
            .map_err(Self::request_error)?;

        if !resp.status().is_success() {
            return Err(Self::request_error(format!("HTTP {} from trigger", resp.status())));
        }

        let body: Value = resp.json().await.map_err(|e| ScoutError::ProviderResponse {
            provider: PROVIDER.into(),
            message: e.to_string(),
        })?;

        let snapshot_id = body
            .get("snapshot_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        if snapshot_id.is_none() {
            warn!("No snapshot_id found in the trigger response");
        }
        Ok(snapshot_id)
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .query(&[("format", "json")])
            .send()
            .await
            .map_err(Self::request_error)?;

        if !resp.status().is_success() {
            return Err(Self::request_error(format!("HTTP {} from {}", resp.status(), path)));
        }

        resp.json().await.map_err(|e| ScoutError::ProviderResponse {
            provider: PROVIDER.into(),
            message: e.to_string(),
        })
    }

    /// Trigger a collection and wait for its records.
    async fn collect(&self, params: &[(&str, &str)], body: Value) -> Result<Option<Vec<Value>>> {
        let Some(snapshot_id) = self.trigger(params, &body).await? else {
            return Ok(None);
        };
        info!(snapshot_id = %snapshot_id, "Dataset collection triggered");

        match SnapshotJob::new(self, snapshot_id, self.policy).run().await {
            JobOutcome::Ready(records) => Ok(Some(records)),
            JobOutcome::Failed(reason) => {
                warn!(reason = %reason, "Dataset collection failed");
                Ok(None)
            }
            JobOutcome::TimedOut(attempts) => {
                warn!(attempts, "Dataset collection timed out");
                Ok(None)
            }
        }
    }
}

impl SnapshotApi for BrightDataReddit {
    fn progress<'a>(&'a self, snapshot_id: &'a str) -> BoxFuture<'a, Result<SnapshotStatus>> {
        Box::pin(async move {
            let body = self.get_json(&format!("progress/{}", snapshot_id)).await?;
            let status = body.get("status").and_then(Value::as_str).unwrap_or_default();
            Ok(SnapshotStatus::parse(status))
        })
    }

    fn download<'a>(&'a self, snapshot_id: &'a str) -> BoxFuture<'a, Result<Vec<Value>>> {
        Box::pin(async move {
            match self.get_json(&format!("snapshot/{}", snapshot_id)).await? {
                Value::Array(records) => Ok(records),
                other => Err(ScoutError::Job {
                    snapshot_id: snapshot_id.to_string(),
                    message: format!("expected an array of records, got {}", kind_of(&other)),
                }),
            }
        })
    }
}

impl SocialScrapeProvider for BrightDataReddit {
    fn search_posts<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Option<SocialPosts>>> {
        Box::pin(async move {
            debug!(query, "Searching posts");
            let params = [
                ("dataset_id", self.config.posts_dataset_id.as_str()),
                ("include_errors", "true"),
                ("type", "discover_new"),
                ("discover_by", "keyword"),
            ];
            let records = self.collect(&params, posts_request_body(&self.config, query)).await?;
            Ok(records.map(|r| parse_posts(&r)))
        })
    }

    fn fetch_post_details<'a>(
        &'a self,
        urls: &'a [String],
    ) -> BoxFuture<'a, Result<Option<PostDetails>>> {
        Box::pin(async move {
            debug!(urls = urls.len(), "Fetching post details");
            let params = [
                ("dataset_id", self.config.comments_dataset_id.as_str()),
                ("include_errors", "true"),
            ];
            let records = self.collect(&params, comments_request_body(&self.config, urls)).await?;
            Ok(records.map(|r| parse_comments(&r)))
        })
    }
}

fn posts_request_body(config: &SocialConfig, query: &str) -> Value {
    json!([{
        "keyword": query,
        "date": config.date,
        "sort_by": config.sort_by,
        "num_of_posts": config.num_of_posts,
    }])
}

fn comments_request_body(config: &SocialConfig, urls: &[String]) -> Value {
    Value::Array(
        urls.iter()
            .map(|url| {
                json!({
                    "url": url,
                    "days_back": config.days_back,
                    "load_all_replies": config.load_all_replies,
                    "comment_limit": config.comment_limit,
                })
            })
            .collect(),
    )
}

/// Read a record field as text. Numeric ids are rendered, null/absent is `None`.
fn field_text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_posts(records: &[Value]) -> SocialPosts {
    SocialPosts {
        parsed_posts: records
            .iter()
            .map(|r| SocialPost {
                title: field_text(r, "title"),
                url: field_text(r, "url"),
            })
            .collect(),
        total_found: records.len(),
    }
}

fn parse_comments(records: &[Value]) -> PostDetails {
    PostDetails {
        parsed_comments: records
            .iter()
            .map(|r| PostComment {
                comment_id: field_text(r, "comment_id"),
                content: field_text(r, "content"),
                date: field_text(r, "date"),
                parent_comment_id: field_text(r, "parent_comment_id"),
                post_title: field_text(r, "post_title"),
                url: field_text(r, "url"),
            })
            .collect(),
        total_found: records.len(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_body_uses_config() {
        let config = SocialConfig::default();
        let body = posts_request_body(&config, "best rust books");
        assert_eq!(
            body,
            json!([{
                "keyword": "best rust books",
                "date": "All time",
                "sort_by": "Hot",
                "num_of_posts": 100
            }])
        );
    }

    #[test]
    fn test_comments_body_one_entry_per_url() {
        let config = SocialConfig::default();
        let urls = vec!["https://reddit.com/r/a/1".to_string(), "https://reddit.com/r/b/2".to_string()];
        let body = comments_request_body(&config, &urls);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["url"], "https://reddit.com/r/b/2");
        assert_eq!(entries[0]["days_back"], 365);
        assert_eq!(entries[0]["comment_limit"], 20);
        assert_eq!(entries[0]["load_all_replies"], false);
    }

    #[test]
    fn test_parse_posts_keeps_title_and_url() {
        let records = vec![
            json!({"title": "Tokio vs async-std", "url": "https://reddit.com/1", "num_comments": 40}),
            json!({"url": "https://reddit.com/2"}),
        ];
        let posts = parse_posts(&records);
        assert_eq!(posts.total_found, 2);
        assert_eq!(posts.parsed_posts[0].title.as_deref(), Some("Tokio vs async-std"));
        assert!(posts.parsed_posts[1].title.is_none());
        assert_eq!(posts.parsed_posts[1].url.as_deref(), Some("https://reddit.com/2"));
    }

    #[test]
    fn test_parse_comments_six_fields() {
        let records = vec![json!({
            "comment_id": 991,
            "content": "Use tokio.",
            "date": "2024-05-01",
            "parent_comment_id": null,
            "post_title": "Which runtime?",
            "url": "https://reddit.com/1",
            "upvotes": 12
        })];
        let details = parse_comments(&records);
        assert_eq!(details.total_found, 1);
        let c = &details.parsed_comments[0];
        assert_eq!(c.comment_id.as_deref(), Some("991"));
        assert_eq!(c.content.as_deref(), Some("Use tokio."));
        assert!(c.parent_comment_id.is_none());
        assert_eq!(c.post_title.as_deref(), Some("Which runtime?"));
    }

    #[test]
    fn test_url_joins_base() {
        let mut config = SocialConfig::default();
        config.base_url = "https://example.test/datasets/v3/".into();
        let client = BrightDataReddit::new("k", config);
        assert_eq!(client.url("progress/s_1"), "https://example.test/datasets/v3/progress/s_1");
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = SocialConfig::default();
        config.polling.max_attempts = 3;
        config.polling.interval_secs = 1;
        let client = BrightDataReddit::new("k", config);
        assert_eq!(client.policy.max_attempts, 3);
        assert_eq!(client.policy.interval, std::time::Duration::from_secs(1));
    }
}
