//! HTTP client for the content store query and mutation APIs

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::post::{Post, PostSummary, Slug};
use super::query;
use super::{ContentError, ContentSource};
use crate::comments::{CommentIntake, CommentSubmission, IntakeError};
use crate::config::SanityConfig;

/// Envelope of every query response
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct SlugRow {
    #[serde(default)]
    slug: Option<Slug>,
}

/// Content store client. One GET per query; no retries.
#[derive(Debug, Clone)]
pub struct SanityClient {
    client: Client,
    query_url: String,
    mutate_url: String,
    token: Option<String>,
}

impl SanityClient {
    pub fn new(config: &SanityConfig) -> Result<Self, ContentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            query_url: format!(
                "{}/{}/data/query/{}",
                config.query_base(),
                config.api_version,
                config.dataset
            ),
            mutate_url: format!(
                "{}/{}/data/mutate/{}",
                config.api_base(),
                config.api_version,
                config.dataset
            ),
            token: config.token.clone(),
        })
    }

    /// Run a GROQ query. Parameters are sent as `$name=<json>`.
    async fn fetch<T>(&self, groq: &str, params: &[(&str, &str)]) -> Result<T, ContentError>
    where
        T: DeserializeOwned,
    {
        let mut pairs = vec![("query".to_string(), groq.to_string())];
        for (name, value) in params {
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }

        tracing::debug!("Querying {} with {} params", self.query_url, params.len());
        let response = self.client.get(&self.query_url).query(&pairs).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::QueryFailed(format!(
                "store returned {}: {}",
                status, body
            )));
        }

        let envelope: QueryResponse<T> = response.json().await?;
        Ok(envelope.result)
    }
}

#[async_trait]
impl ContentSource for SanityClient {
    async fn list_post_slugs(&self) -> Result<Vec<Slug>, ContentError> {
        let rows: Vec<SlugRow> = self.fetch(query::POST_SLUGS, &[]).await?;
        Ok(rows.into_iter().filter_map(|row| row.slug).collect())
    }

    async fn get_post(&self, slug: &str) -> Result<Post, ContentError> {
        let post: Option<Post> = self.fetch(query::POST_BY_SLUG, &[("slug", slug)]).await?;
        let mut post = post.ok_or_else(|| ContentError::NotFound(slug.to_string()))?;

        let dropped = post.retain_visible_comments();
        if dropped > 0 {
            tracing::warn!(
                "Store returned {} comments for {} that are unapproved or belong elsewhere",
                dropped,
                slug
            );
        }

        Ok(post)
    }

    /// Rows without a slug, or that do not decode, are skipped so that one
    /// broken document cannot take the home page down
    async fn list_posts(&self) -> Result<Vec<PostSummary>, ContentError> {
        let rows: Vec<Value> = self.fetch(query::POST_SUMMARIES, &[]).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.get("_id").cloned().unwrap_or(Value::Null);
                match serde_json::from_value::<PostSummary>(row) {
                    Ok(summary) => Some(summary),
                    Err(e) => {
                        tracing::warn!("Skipping post {} in listing: {}", id, e);
                        None
                    }
                }
            })
            .collect())
    }
}

#[async_trait]
impl CommentIntake for SanityClient {
    /// Create an unapproved `comment` document referencing the post
    async fn submit(&self, comment: &CommentSubmission) -> Result<(), IntakeError> {
        let token = self.token.as_deref().ok_or(IntakeError::MissingToken)?;

        let mutation = json!({
            "mutations": [{
                "create": {
                    "_type": "comment",
                    "post": {
                        "_type": "reference",
                        "_ref": comment.post_id,
                    },
                    "name": comment.name,
                    "email": comment.email,
                    "comment": comment.comment,
                    "approved": false,
                }
            }]
        });

        self.client
            .post(&self.mutate_url)
            .bearer_auth(token)
            .json(&mutation)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
