//! Generator module - assembles pages from store content using the built-in Tera templates

use std::sync::Arc;
use thiserror::Error;

use crate::comments::CommentForm;
use crate::config::SiteConfig;
use crate::content::{ContentError, ContentSource, ImageUrlBuilder, Post, PostSummary, Slug};
use crate::helpers::{date_xml, format_date, full_url_for, post_path};
use crate::portable::{BlogSerializers, PortableRenderer};
use crate::templates::{CommentView, PostCard, PostPage, SiteView, TemplateRenderer};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

/// A page to generate for one post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub slug: Slug,
    pub path: String,
}

/// Outcome of generating one post page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Rendered(String),
    NotFound,
}

/// Page generator backed by a content source
pub struct Generator {
    source: Arc<dyn ContentSource>,
    renderer: TemplateRenderer,
    images: ImageUrlBuilder,
    site: SiteView,
    date_format: String,
}

impl Generator {
    pub fn new(config: &SiteConfig, source: Arc<dyn ContentSource>) -> Result<Self, GenerateError> {
        Ok(Self {
            source,
            renderer: TemplateRenderer::new()?,
            images: ImageUrlBuilder::new(&config.sanity),
            site: SiteView {
                title: config.title.clone(),
                description: config.description.clone(),
                url: config.url.clone(),
                version: env!("CARGO_PKG_VERSION"),
            },
            date_format: config.date_format.clone(),
        })
    }

    /// One target per post slug, in store order
    pub async fn paths(&self) -> Result<Vec<PageTarget>, ContentError> {
        let slugs = self.source.list_post_slugs().await?;
        Ok(slugs
            .into_iter()
            .map(|slug| PageTarget {
                path: post_path(&slug.current),
                slug,
            })
            .collect())
    }

    /// Load a post; `None` when the slug is unknown
    pub async fn load_post(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        match self.source.get_post(slug).await {
            Ok(post) => Ok(Some(post)),
            Err(ContentError::NotFound(_)) => Ok(None),
            Err(e) => {
                tracing::error!("Failed to load post {}: {}", slug, e);
                Err(e)
            }
        }
    }

    /// Generate a post page with an idle comment form
    pub async fn generate(&self, slug: &str) -> Result<PageOutcome, GenerateError> {
        let Some(post) = self.load_post(slug).await? else {
            tracing::debug!("No post for slug {}", slug);
            return Ok(PageOutcome::NotFound);
        };
        let form = CommentForm::new(&post.id);
        Ok(PageOutcome::Rendered(self.render_post(&post, &form)?))
    }

    /// Render a loaded post with the given form state
    pub fn render_post(&self, post: &Post, form: &CommentForm) -> Result<String, GenerateError> {
        let page = self.build_page(post);
        Ok(self.renderer.render_post(&self.site, &page, &form.view())?)
    }

    /// Template data for a post page
    pub fn build_page(&self, post: &Post) -> PostPage {
        let body = PortableRenderer::new(&self.images).render(&post.body, &BlogSerializers);
        let path = post_path(&post.slug.current);
        let author = post.author.as_ref();

        PostPage {
            id: post.id.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            permalink: full_url_for(&self.site.url, &path),
            path,
            main_image: post.main_image.as_ref().and_then(|i| self.images.url(i)),
            author_name: author.map(|a| a.name.clone()).unwrap_or_default(),
            author_image: author
                .and_then(|a| a.image.as_ref())
                .and_then(|i| self.images.url(i)),
            published: format_date(&post.created_at, &self.date_format),
            published_iso: date_xml(&post.created_at),
            body_html: body.html(),
            comments: post
                .comments
                .iter()
                .map(|c| CommentView {
                    name: c.name.clone(),
                    comment: c.comment.clone(),
                })
                .collect(),
        }
    }

    /// Home page listing every post
    pub async fn index(&self) -> Result<String, GenerateError> {
        let posts = self.source.list_posts().await.map_err(|e| {
            tracing::error!("Failed to list posts: {}", e);
            e
        })?;
        let cards: Vec<PostCard> = posts.iter().map(|p| self.card(p)).collect();
        Ok(self.renderer.render_index(&self.site, &cards)?)
    }

    pub fn not_found(&self) -> Result<String, GenerateError> {
        Ok(self.renderer.render_not_found(&self.site)?)
    }

    fn card(&self, post: &PostSummary) -> PostCard {
        let author = post.author.as_ref();
        PostCard {
            title: post.title.clone(),
            description: post.description.clone(),
            path: post_path(&post.slug.current),
            main_image: post.main_image.as_ref().and_then(|i| self.images.url(i)),
            author_name: author.map(|a| a.name.clone()).unwrap_or_default(),
            author_image: author
                .and_then(|a| a.image.as_ref())
                .and_then(|i| self.images.url(i)),
        }
    }
}
