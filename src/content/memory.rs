//! In-memory document store, loaded from a dataset export
//!
//! Holds raw `post`, `author` and `comment` documents and answers the same
//! questions as the remote store, doing the author join and the comment
//! filter itself. Draft documents (`drafts.` ids) are never published.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use super::post::{Post, PostSummary, Slug};
use super::{ContentError, ContentSource};
use crate::comments::{CommentIntake, CommentSubmission, IntakeError};

#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: RwLock<Vec<Value>>,
    next_comment: AtomicU64,
}

impl DocumentStore {
    pub fn new(documents: Vec<Value>) -> Self {
        let store = Self::default();
        for doc in documents {
            store.insert(doc);
        }
        store
    }

    /// Parse a JSON array of documents or an NDJSON export
    pub fn from_json(src: &str) -> Result<Self, ContentError> {
        let trimmed = src.trim_start();
        let documents: Vec<Value> = if trimmed.starts_with('[') {
            serde_json::from_str(trimmed)?
        } else {
            trimmed
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str)
                .collect::<Result<_, _>>()?
        };
        Ok(Self::new(documents))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|e| {
            ContentError::QueryFailed(format!("failed to read dataset {}: {}", path.display(), e))
        })?;
        let store = Self::from_json(&src)?;
        tracing::info!("Loaded {} documents from {}", store.len(), path.display());
        Ok(store)
    }

    /// Add a published document. Drafts and non-objects are ignored.
    pub fn insert(&self, doc: Value) {
        let is_draft = doc_id(&doc)
            .map(|id| id.starts_with("drafts."))
            .unwrap_or(true);
        if !doc.is_object() || is_draft {
            tracing::debug!("Skipping unpublished document {:?}", doc_id(&doc));
            return;
        }
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(doc);
    }

    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Value> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("_id")?.as_str()
}

fn doc_type(doc: &Value) -> Option<&str> {
    doc.get("_type")?.as_str()
}

fn slug_of(doc: &Value) -> Option<&str> {
    doc.get("slug")?.get("current")?.as_str()
}

fn ref_of(value: &Value) -> Option<&str> {
    value.get("_ref")?.as_str()
}

fn is_post(doc: &Value) -> bool {
    doc_type(doc) == Some("post")
}

/// `author->{name, image}`
fn join_author(docs: &[Value], post: &Value) -> Value {
    post.get("author")
        .and_then(ref_of)
        .and_then(|id| {
            docs.iter()
                .find(|d| doc_type(d) == Some("author") && doc_id(d) == Some(id))
        })
        .map(|author| {
            json!({
                "name": author.get("name").cloned().unwrap_or(Value::Null),
                "image": author.get("image").cloned().unwrap_or(Value::Null),
            })
        })
        .unwrap_or(Value::Null)
}

/// `*[_type == "comment" && post._ref == ^._id && approved == true]`
fn approved_comments(docs: &[Value], post_id: &str) -> Vec<Value> {
    docs.iter()
        .filter(|d| doc_type(d) == Some("comment"))
        .filter(|d| d.get("post").and_then(ref_of) == Some(post_id))
        .filter(|d| d.get("approved").and_then(Value::as_bool) == Some(true))
        .cloned()
        .collect()
}

fn join_post(docs: &[Value], post: &Value, with_comments: bool) -> Value {
    let mut joined = post.clone();
    let author = join_author(docs, post);
    let comments = if with_comments {
        Some(approved_comments(docs, doc_id(post).unwrap_or_default()))
    } else {
        None
    };

    if let Some(fields) = joined.as_object_mut() {
        fields.insert("author".to_string(), author);
        if let Some(comments) = comments {
            fields.insert("comments".to_string(), Value::Array(comments));
        }
    }
    joined
}

#[async_trait]
impl ContentSource for DocumentStore {
    async fn list_post_slugs(&self) -> Result<Vec<Slug>, ContentError> {
        Ok(self
            .snapshot()
            .iter()
            .filter(|d| is_post(d))
            .filter_map(slug_of)
            .map(Slug::new)
            .collect())
    }

    async fn get_post(&self, slug: &str) -> Result<Post, ContentError> {
        let docs = self.snapshot();
        let post = docs
            .iter()
            .find(|d| is_post(d) && slug_of(d) == Some(slug))
            .ok_or_else(|| ContentError::NotFound(slug.to_string()))?;

        let mut post: Post = serde_json::from_value(join_post(&docs, post, true))?;
        post.retain_visible_comments();
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>, ContentError> {
        let docs = self.snapshot();
        docs.iter()
            .filter(|d| is_post(d) && slug_of(d).is_some())
            .map(|post| serde_json::from_value(join_post(&docs, post, false)).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl CommentIntake for DocumentStore {
    async fn submit(&self, comment: &CommentSubmission) -> Result<(), IntakeError> {
        let post_exists = self
            .snapshot()
            .iter()
            .any(|d| is_post(d) && doc_id(d) == Some(comment.post_id.as_str()));
        if !post_exists {
            return Err(IntakeError::UnknownPost(comment.post_id.clone()));
        }

        let n = self.next_comment.fetch_add(1, Ordering::Relaxed);
        self.insert(json!({
            "_id": format!("comment-{}-{}", Utc::now().timestamp_millis(), n),
            "_type": "comment",
            "_createdAt": Utc::now().to_rfc3339(),
            "post": { "_type": "reference", "_ref": comment.post_id },
            "name": comment.name,
            "email": comment.email,
            "comment": comment.comment,
            "approved": false,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::hello_world_dataset;

    #[tokio::test]
    async fn test_list_post_slugs_skips_drafts() {
        let store = DocumentStore::new(hello_world_dataset());
        let slugs = store.list_post_slugs().await.unwrap();
        assert_eq!(slugs, vec![Slug::new("hello-world"), Slug::new("second")]);
    }

    #[tokio::test]
    async fn test_get_post_joins_author_and_approved_comments() {
        let store = DocumentStore::new(hello_world_dataset());
        let post = store.get_post("hello-world").await.unwrap();

        assert_eq!(post.author.as_ref().unwrap().name, "Jane Doe");
        let texts: Vec<_> = post.comments.iter().map(|c| c.comment.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert!(post.comments.iter().all(|c| c.is_visible_on("post-1")));
    }

    #[tokio::test]
    async fn test_get_post_unknown_and_draft() {
        let store = DocumentStore::new(hello_world_dataset());
        assert_eq!(
            store.get_post("missing").await.unwrap_err(),
            ContentError::NotFound("missing".to_string())
        );
        assert!(matches!(
            store.get_post("draft").await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_post_without_author_or_body() {
        let store = DocumentStore::new(hello_world_dataset());
        let post = store.get_post("second").await.unwrap();
        assert!(post.author.is_none());
        assert!(post.body.is_empty());
        assert_eq!(post.comments.len(), 1);
    }

    #[tokio::test]
    async fn test_submitted_comment_is_hidden_until_approved() {
        let store = DocumentStore::new(hello_world_dataset());
        let before = store.len();

        let submission = CommentSubmission {
            post_id: "post-1".to_string(),
            name: "New".to_string(),
            email: "new@example.com".to_string(),
            comment: "hello".to_string(),
        };
        store.submit(&submission).await.unwrap();

        assert_eq!(store.len(), before + 1);
        let post = store.get_post("hello-world").await.unwrap();
        assert_eq!(post.comments.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_to_unknown_post() {
        let store = DocumentStore::new(hello_world_dataset());
        let submission = CommentSubmission {
            post_id: "nope".to_string(),
            name: "New".to_string(),
            email: "new@example.com".to_string(),
            comment: "hello".to_string(),
        };
        assert_eq!(
            store.submit(&submission).await.unwrap_err(),
            IntakeError::UnknownPost("nope".to_string())
        );
    }

    #[test]
    fn test_from_ndjson() {
        let src = hello_world_dataset()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let store = DocumentStore::from_json(&src).unwrap();
        // the draft is dropped
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn test_from_json_array() {
        let src = Value::Array(hello_world_dataset()).to_string();
        assert_eq!(DocumentStore::from_json(&src).unwrap().len(), 7);
        assert!(DocumentStore::from_json("[{").is_err());
    }
}
