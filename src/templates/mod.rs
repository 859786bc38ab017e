//! Built-in blog templates using the Tera template engine
//!
//! All templates are embedded directly in the binary. Autoescaping is on for
//! every `.html` template; the rendered post body is the only value marked
//! `safe`.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::comments::FormView;
use crate::helpers::{html_escape, truncate};

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("index.html", include_str!("blog/index.html")),
            ("post.html", include_str!("blog/post.html")),
            ("not_found.html", include_str!("blog/not_found.html")),
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
        ])?;

        // Leave `/` alone so paths and URLs stay readable in attributes
        tera.set_escape_fn(html_escape);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template_name, context)
    }

    pub fn render_post(
        &self,
        site: &SiteView,
        page: &PostPage,
        form: &FormView,
    ) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("page", page);
        context.insert("form", form);
        self.render("post.html", &context)
    }

    pub fn render_index(&self, site: &SiteView, posts: &[PostCard]) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("posts", posts);
        self.render("index.html", &context)
    }

    pub fn render_not_found(&self, site: &SiteView) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        self.render("not_found.html", &context)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(&s, length, Some(&omission))))
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub title: String,
    pub description: String,
    pub url: String,
    pub version: &'static str,
}

/// Everything `post.html` shows apart from the comment form
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub id: String,
    pub title: String,
    pub description: String,
    pub path: String,
    pub permalink: String,
    pub main_image: Option<String>,
    pub author_name: String,
    pub author_image: Option<String>,
    pub published: String,
    pub published_iso: String,
    pub body_html: String,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub name: String,
    pub comment: String,
}

/// A post card on the home page
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub description: String,
    pub path: String,
    pub main_image: Option<String>,
    pub author_name: String,
    pub author_image: Option<String>,
}
