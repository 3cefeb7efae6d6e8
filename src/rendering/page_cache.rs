//! Per-page drawing log cache.
//!
//! Pages keep their interpreted [`DrawingLog`] around so repaints only
//! replay. The cache is bounded; a log that leaves it for any reason is
//! disposed, which frees its images even if a replay still holds an `Arc`.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::display_list::DrawingLog;

/// Default number of page logs kept alive.
pub const DEFAULT_CACHED_PAGES: usize = 8;

/// LRU cache from page index to drawing log.
pub struct PageLogCache {
    logs: LruCache<usize, Arc<DrawingLog>>,
}

impl Default for PageLogCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHED_PAGES)
    }
}

impl PageLogCache {
    /// Creates a cache holding at most `capacity` logs (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PageLogCache {
            logs: LruCache::new(capacity),
        }
    }

    /// Stores the log for `page`, disposing whatever it displaces.
    pub fn insert(&mut self, page: usize, log: Arc<DrawingLog>) {
        if let Some((old_page, old)) = self.logs.push(page, Arc::clone(&log)) {
            if !Arc::ptr_eq(&old, &log) {
                log::debug!("disposing drawing log of page {}", old_page);
                old.dispose();
            }
        }
    }

    /// Looks up a page's log and marks it most recently used.
    pub fn get(&mut self, page: usize) -> Option<Arc<DrawingLog>> {
        self.logs.get(&page).cloned()
    }

    pub fn contains(&self, page: usize) -> bool {
        self.logs.contains(&page)
    }

    /// Removes and disposes a page's log.
    pub fn remove(&mut self, page: usize) -> bool {
        match self.logs.pop(&page) {
            Some(log) => {
                log.dispose();
                true
            }
            None => false,
        }
    }

    /// Disposes every cached log.
    pub fn clear(&mut self) {
        while let Some((_, log)) = self.logs.pop_lru() {
            log.dispose();
        }
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.logs.cap().get()
    }
}

impl Drop for PageLogCache {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::display_list::DrawingOperation;

    fn page_log() -> Arc<DrawingLog> {
        let log = DrawingLog::new();
        log.append(DrawingOperation::ResetClip);
        Arc::new(log)
    }

    #[test]
    fn test_eviction_disposes_least_recent() {
        let mut cache = PageLogCache::new(2);
        let (a, b, c) = (page_log(), page_log(), page_log());

        cache.insert(0, Arc::clone(&a));
        cache.insert(1, Arc::clone(&b));
        assert!(cache.get(0).is_some());
        cache.insert(2, Arc::clone(&c));

        assert!(cache.contains(0));
        assert!(!cache.contains(1));
        assert!(b.is_retired());
        assert!(!a.is_retired());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_replacement_disposes_old_log() {
        let mut cache = PageLogCache::new(4);
        let (old, new) = (page_log(), page_log());

        cache.insert(3, Arc::clone(&old));
        cache.insert(3, Arc::clone(&old));
        assert!(!old.is_retired());

        cache.insert(3, Arc::clone(&new));
        assert!(old.is_retired());
        assert!(!new.is_retired());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cache = PageLogCache::new(0);
        assert_eq!(cache.capacity(), 1);

        let log = page_log();
        cache.insert(0, Arc::clone(&log));
        assert!(cache.remove(0));
        assert!(!cache.remove(0));
        assert!(log.is_retired());

        let log = page_log();
        cache.insert(5, Arc::clone(&log));
        cache.clear();
        assert!(cache.is_empty());
        assert!(log.is_retired());
    }
}
