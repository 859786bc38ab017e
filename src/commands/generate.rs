//! Export every page as static HTML

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::generator::{Generator, PageOutcome};
use crate::Blog;

/// Write the home page, one page per post and `404.html` to the public
/// directory. Returns the number of pages written.
pub async fn run(blog: &Blog) -> Result<usize> {
    let start = std::time::Instant::now();

    let backend = blog.backend()?;
    let generator = Generator::new(&blog.config, backend.source)?;
    let public_dir = &blog.public_dir;
    fs::create_dir_all(public_dir)?;

    write_page(&public_dir.join("index.html"), &generator.index().await?)?;
    let mut count = 1;

    for target in generator.paths().await? {
        let slug = &target.slug.current;
        if !is_safe_segment(slug) {
            tracing::warn!("Skipping post with unusable slug {:?}", slug);
            continue;
        }

        match generator.generate(slug).await? {
            PageOutcome::Rendered(html) => {
                let dest = public_dir
                    .join(target.path.trim_start_matches('/'))
                    .join("index.html");
                write_page(&dest, &html)?;
                count += 1;
            }
            PageOutcome::NotFound => {
                tracing::warn!("Post {} disappeared during generation", slug);
            }
        }
    }

    write_page(&public_dir.join("404.html"), &generator.not_found()?)?;
    count += 1;

    tracing::info!(
        "Generated {} pages in {:.2}s",
        count,
        start.elapsed().as_secs_f64()
    );
    Ok(count)
}

fn write_page(dest: &Path, html: &str) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, html)?;
    tracing::debug!("Generated: {:?}", dest);
    Ok(())
}

/// A slug must map to exactly one directory under the public dir
fn is_safe_segment(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::test_data::hello_world_dataset;

    fn blog(dir: &Path, documents: Vec<serde_json::Value>) -> Blog {
        let dataset = dir.join("dataset.json");
        fs::write(&dataset, serde_json::Value::Array(documents).to_string()).unwrap();

        let mut config = SiteConfig::default();
        config.sanity.project_id = "abc123".to_string();
        config.sanity.dataset = "production".to_string();
        Blog::from_config(dir, config)
            .unwrap()
            .with_dataset_file(Some(dataset))
    }

    #[tokio::test]
    async fn test_generate_writes_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let blog = blog(dir.path(), hello_world_dataset());

        assert_eq!(blog.generate().await.unwrap(), 4);

        let public = dir.path().join("public");
        let hello = fs::read_to_string(public.join("post/hello-world/index.html")).unwrap();
        assert_eq!(hello.matches(r#"class="my-3 comment""#).count(), 2);
        assert!(public.join("post/second/index.html").exists());
        assert!(public.join("index.html").exists());
        assert!(public.join("404.html").exists());
        assert!(!public.join("post/draft").exists());

        blog.clean().unwrap();
        assert!(!public.exists());
    }

    #[tokio::test]
    async fn test_generate_skips_unsafe_slugs() {
        let dir = tempfile::tempdir().unwrap();
        let mut documents = hello_world_dataset();
        documents.push(serde_json::json!({
            "_id": "post-9", "_type": "post", "_createdAt": "2022-06-01T10:00:00Z",
            "title": "Escape", "slug": { "current": "../outside" }
        }));
        let blog = blog(dir.path(), documents);

        assert_eq!(blog.generate().await.unwrap(), 4);
        assert!(!dir.path().join("outside").exists());
    }

    #[test]
    fn test_is_safe_segment() {
        assert!(is_safe_segment("hello-world"));
        assert!(!is_safe_segment(".."));
        assert!(!is_safe_segment("a/b"));
        assert!(!is_safe_segment(""));
    }
}
