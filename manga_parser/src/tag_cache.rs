use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::{model::MangaTag, parse_error::Result};

pub type TagSet = BTreeSet<MangaTag>;

/// Lazily loaded tag vocabulary of one parser instance.
///
/// Concurrent callers share a single load; a failed load leaves the cache
/// empty so the next caller tries again.
#[derive(Debug, Default)]
pub struct TagCache {
    tags: RwLock<Option<Arc<TagSet>>>,
    loading: Mutex<()>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<TagSet>> {
        self.tags.read().clone()
    }

    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<TagSet>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TagSet>>,
    {
        if let Some(tags) = self.get() {
            return Ok(tags);
        }
        let _guard = self.loading.lock().await;
        if let Some(tags) = self.get() {
            return Ok(tags);
        }
        let tags = Arc::new(load().await?);
        *self.tags.write() = Some(tags.clone());
        Ok(tags)
    }

    pub fn invalidate(&self) {
        self.tags.write().take();
    }
}
