//! Page cache with time-based revalidation
//!
//! A generated page is served as-is until it is older than the revalidation
//! interval. After that it is still served, but the first request to see it
//! stale claims a refresh so that exactly one regeneration runs per page.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CachedPage {
    html: String,
    generated_at: Instant,
}

/// Result of looking a page up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Within the revalidation interval
    Fresh(String),
    /// Past the interval; serve it and regenerate in the background
    Stale(String),
    /// Never generated; the request has to wait for generation
    Missing,
}

/// Generated pages keyed by site path
#[derive(Debug)]
pub struct PageCache {
    revalidate: Duration,
    pages: RwLock<HashMap<String, CachedPage>>,
    refreshing: Mutex<HashSet<String>>,
}

impl PageCache {
    pub fn new(revalidate: Duration) -> Self {
        Self {
            revalidate,
            pages: RwLock::new(HashMap::new()),
            refreshing: Mutex::new(HashSet::new()),
        }
    }

    pub fn revalidate(&self) -> Duration {
        self.revalidate
    }

    pub async fn lookup(&self, path: &str) -> Lookup {
        let pages = self.pages.read().await;
        match pages.get(path) {
            Some(page) if page.generated_at.elapsed() < self.revalidate => {
                Lookup::Fresh(page.html.clone())
            }
            Some(page) => Lookup::Stale(page.html.clone()),
            None => Lookup::Missing,
        }
    }

    /// Store a freshly generated page, restarting its interval
    pub async fn store(&self, path: impl Into<String>, html: String) {
        let page = CachedPage {
            html,
            generated_at: Instant::now(),
        };
        self.pages.write().await.insert(path.into(), page);
    }

    /// Drop a page, e.g. when its post no longer exists
    pub async fn remove(&self, path: &str) -> bool {
        self.pages.write().await.remove(path).is_some()
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Claim the regeneration of `path`. Returns `None` while another
    /// regeneration of the same page holds the claim. The claim is released
    /// when the guard is dropped.
    pub fn try_begin_refresh(self: &Arc<Self>, path: &str) -> Option<RefreshGuard> {
        let mut refreshing = self
            .refreshing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !refreshing.insert(path.to_string()) {
            return None;
        }
        Some(RefreshGuard {
            cache: Arc::clone(self),
            path: path.to_string(),
        })
    }

    pub fn is_refreshing(&self, path: &str) -> bool {
        self.refreshing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

/// An in-progress regeneration of one page
#[derive(Debug)]
pub struct RefreshGuard {
    cache: Arc<PageCache>,
    path: String,
}

impl RefreshGuard {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.cache
            .refreshing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
    }
}
