//! Image asset URL building

use lazy_static::lazy_static;
use regex::Regex;

use super::post::ImageRef;
use crate::config::SanityConfig;

lazy_static! {
    /// `image-<assetId>-<width>x<height>-<format>`
    static ref IMAGE_REF: Regex =
        Regex::new(r"^image-([A-Za-z0-9]+)-(\d+)x(\d+)-([a-z0-9]+)$").expect("valid image ref regex");
}

/// Resolves image asset references to CDN URLs
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    base: String,
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(config: &SanityConfig) -> Self {
        Self {
            base: config.cdn_base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            dataset: config.dataset.clone(),
        }
    }

    /// URL of an image field, `None` when the reference is malformed
    pub fn url(&self, image: &ImageRef) -> Option<String> {
        self.url_for_ref(&image.asset.id)
    }

    pub fn url_for_ref(&self, asset_ref: &str) -> Option<String> {
        let caps = IMAGE_REF.captures(asset_ref)?;
        Some(format!(
            "{}/images/{}/{}/{}-{}x{}.{}",
            self.base, self.project_id, self.dataset, &caps[1], &caps[2], &caps[3], &caps[4]
        ))
    }
}
