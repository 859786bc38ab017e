//! Post, Author and Comment models as returned by the content store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::portable::Block;

/// Human-readable unique key of a post (`slug.current`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }
}

/// A reference to another document (`{"_ref": "..."}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref")]
    pub id: String,
}

/// An image field: a reference to an uploaded image asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub asset: Reference,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Post author, joined from the `author` reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// A reader comment. `approved` is flipped by moderation outside this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub post: Option<Reference>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Whether this comment may be shown on the page of `post_id`
    pub fn is_visible_on(&self, post_id: &str) -> bool {
        self.approved
            && self
                .post
                .as_ref()
                .map(|r| r.id == post_id)
                .unwrap_or(false)
    }
}

/// A blog post with its author and approved comments
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub slug: Slug,
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<Block>,
    /// Approved comments, in the order the store returned them
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
}

impl Post {
    /// Drop every comment that is unapproved or attached to another post.
    /// Returns the number of comments removed.
    pub fn retain_visible_comments(&mut self) -> usize {
        let before = self.comments.len();
        let id = self.id.clone();
        self.comments.retain(|c| c.is_visible_on(&id));
        before - self.comments.len()
    }
}

/// Post fields needed for the home page listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub slug: Slug,
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub author: Option<Author>,
}

/// GROQ projections yield `null` for fields a document does not have
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
