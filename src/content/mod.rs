//! Content module - typed access to the headless content store

mod client;
mod error;
mod image;
mod memory;
mod post;
pub mod query;

use async_trait::async_trait;

pub use client::SanityClient;
pub use error::ContentError;
pub use image::ImageUrlBuilder;
pub use memory::DocumentStore;
pub use post::{Author, Comment, ImageRef, Post, PostSummary, Reference, Slug};

/// Read access to posts.
///
/// Implementations must only ever return approved comments that reference
/// the returned post.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Slugs of every published post, in store order
    async fn list_post_slugs(&self) -> Result<Vec<Slug>, ContentError>;

    /// One post with its author and approved comments, or `NotFound`
    async fn get_post(&self, slug: &str) -> Result<Post, ContentError>;

    /// Post cards for the home page, in store order
    async fn list_posts(&self) -> Result<Vec<PostSummary>, ContentError>;
}
