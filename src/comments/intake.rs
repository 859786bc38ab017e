//! Moderation intake: where validated comments are sent

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use super::form::CommentSubmission;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("comment intake unreachable: {0}")]
    Transport(String),

    #[error("comment intake rejected the submission with status {0}")]
    Rejected(u16),

    #[error("no write token configured for the content store")]
    MissingToken,

    #[error("no post with id {0}")]
    UnknownPost(String),
}

impl From<reqwest::Error> for IntakeError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => IntakeError::Rejected(status.as_u16()),
            None => IntakeError::Transport(err.to_string()),
        }
    }
}

/// Accepts new comments for moderation. Created comments start unapproved.
#[async_trait]
pub trait CommentIntake: Send + Sync {
    async fn submit(&self, comment: &CommentSubmission) -> Result<(), IntakeError>;
}

/// Forwards submissions as JSON to an external moderation endpoint.
/// Only transport success matters; the response body is ignored.
#[derive(Debug, Clone)]
pub struct HttpIntake {
    client: Client,
    endpoint: String,
}

impl HttpIntake {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, IntakeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CommentIntake for HttpIntake {
    async fn submit(&self, comment: &CommentSubmission) -> Result<(), IntakeError> {
        tracing::debug!("POST {} for post {}", self.endpoint, comment.post_id);
        self.client
            .post(&self.endpoint)
            .json(comment)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn submission() -> CommentSubmission {
        CommentSubmission {
            post_id: "post-1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            comment: "Hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_http_intake_posts_json() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let app = Router::new().route(
            "/api/createComment",
            post(move |Json(body): Json<serde_json::Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(body);
                    "not json, ignored"
                }
            }),
        );
        let base = spawn(app).await;

        let intake =
            HttpIntake::new(format!("{}/api/createComment", base), Duration::from_secs(5)).unwrap();
        intake.submit(&submission()).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["_id"], "post-1");
        assert_eq!(received[0]["comment"], "Hi");
    }

    #[tokio::test]
    async fn test_http_intake_reports_rejection() {
        let app = Router::new().route(
            "/api/createComment",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn(app).await;

        let intake =
            HttpIntake::new(format!("{}/api/createComment", base), Duration::from_secs(5)).unwrap();
        let err = intake.submit(&submission()).await.unwrap_err();
        assert_eq!(err, IntakeError::Rejected(500));
    }

    #[tokio::test]
    async fn test_http_intake_unreachable() {
        let intake =
            HttpIntake::new("http://127.0.0.1:9/api/createComment", Duration::from_secs(2)).unwrap();
        let err = intake.submit(&submission()).await.unwrap_err();
        assert!(matches!(err, IntakeError::Transport(_)));
    }
}
