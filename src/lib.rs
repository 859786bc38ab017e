//! portable-blog: a server-rendered blog front end for a headless content store
//!
//! Posts, authors and moderated comments live in the content store. This
//! crate queries them, renders the portable-text bodies with Tera templates,
//! serves the pages with time-based revalidation and forwards reader comments
//! to moderation.

pub mod cache;
pub mod commands;
pub mod comments;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod portable;
pub mod server;
pub mod templates;

#[cfg(test)]
mod test_data;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use comments::{CommentIntake, HttpIntake};
use content::{ContentSource, DocumentStore, SanityClient};

/// Where content is read from and where comments go
pub struct Backend {
    pub source: Arc<dyn ContentSource>,
    pub intake: Arc<dyn CommentIntake>,
}

/// The blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory for static export
    pub public_dir: PathBuf,
    /// Local dataset export used instead of the remote store
    pub dataset_file: Option<PathBuf>,
}

impl Blog {
    /// Load `_config.yml` from a directory and apply environment overrides.
    /// Fails when the content store cannot be addressed.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let blog = Self::open(base_dir)?;
        blog.config.validate()?;
        Ok(blog)
    }

    /// Like [`Blog::new`] but without checking the store settings, for
    /// commands that only touch the local directory
    pub fn open<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir.as_ref());
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::assemble(base_dir, config))
    }

    /// Build from an already loaded configuration. Fails when the content
    /// store cannot be addressed.
    pub fn from_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(base_dir, config))
    }

    fn assemble<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            public_dir,
            dataset_file: None,
        }
    }

    /// Read content from a dataset export instead of the remote store
    pub fn with_dataset_file(mut self, path: Option<PathBuf>) -> Self {
        self.dataset_file = path.map(|p| {
            if p.is_absolute() {
                p
            } else {
                self.base_dir.join(p)
            }
        });
        self
    }

    /// Connect the content source and the comment intake
    pub fn backend(&self) -> Result<Backend> {
        let (source, store_intake): (Arc<dyn ContentSource>, Arc<dyn CommentIntake>) =
            match &self.dataset_file {
                Some(path) => {
                    let store = Arc::new(DocumentStore::load(path)?);
                    (store.clone(), store)
                }
                None => {
                    let client = Arc::new(SanityClient::new(&self.config.sanity)?);
                    tracing::info!(
                        "Using content store project {} dataset {}",
                        self.config.sanity.project_id,
                        self.config.sanity.dataset
                    );
                    (client.clone(), client)
                }
            };

        let intake: Arc<dyn CommentIntake> = match &self.config.comments.intake_url {
            Some(url) => {
                tracing::info!("Forwarding comments to {}", url);
                let timeout = Duration::from_secs(self.config.sanity.request_timeout_secs);
                Arc::new(HttpIntake::new(url.as_str(), timeout)?)
            }
            None => {
                if self.dataset_file.is_none() && self.config.sanity.token.is_none() {
                    tracing::warn!("No write token configured, comment submissions will fail");
                }
                store_intake
            }
        };

        Ok(Backend { source, intake })
    }

    /// Export every page to the public directory
    pub async fn generate(&self) -> Result<usize> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
