//! Configuration module

mod site;

pub use site::CommentsConfig;
pub use site::ConfigError;
pub use site::SanityConfig;
pub use site::SiteConfig;
pub use site::{ENV_API_TOKEN, ENV_DATASET, ENV_PROJECT_ID};
