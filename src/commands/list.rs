//! List posts in the content store

use anyhow::Result;

use crate::content::{ContentSource, PostSummary};
use crate::helpers::post_path;
use crate::Blog;

/// Print every published post
pub async fn run(blog: &Blog) -> Result<()> {
    let backend = blog.backend()?;
    let posts = backend.source.list_posts().await?;

    println!("Posts ({}):", posts.len());
    for line in listing(&posts) {
        println!("  {}", line);
    }
    Ok(())
}

fn listing(posts: &[PostSummary]) -> Vec<String> {
    posts
        .iter()
        .map(|post| {
            format!(
                "{} - {} [{}]",
                post.created_at.format("%Y-%m-%d"),
                post.title,
                post_path(&post.slug.current)
            )
        })
        .collect()
}
