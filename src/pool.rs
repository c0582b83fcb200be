//! Reusable storage for high-churn entities.
//!
//! The pool is a free list: a stack of idle items that are handed out and
//! taken back in O(1). Items are moved in and out, so a pooled item can
//! never also sit in a live collection. The pool does no liveness tracking;
//! callers reset what they acquire.

#[derive(Debug)]
pub struct ObjectPool<T> {
    free: Vec<T>,
    capacity: Option<usize>,
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> ObjectPool<T> {
    pub fn unbounded() -> Self {
        Self {
            free: Vec::new(),
            capacity: None,
        }
    }

    /// A pool that keeps at most `capacity` idle items; extra releases are dropped.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity.min(64)),
            capacity: Some(capacity),
        }
    }

    /// Take an idle item, or `None` when the caller has to build a new one.
    pub fn acquire(&mut self) -> Option<T> {
        self.free.pop()
    }

    /// Hand an item back. Returns `false` when the pool is full and the item was dropped.
    pub fn release(&mut self, item: T) -> bool {
        if self.capacity.is_some_and(|cap| self.free.len() >= cap) {
            return false;
        }
        self.free.push(item);
        true
    }

    /// Keep the items of `live` for which `keep` returns true, in order, and
    /// release the rest into the pool. Returns how many left `live`.
    pub fn reclaim_from(&mut self, live: &mut Vec<T>, mut keep: impl FnMut(&mut T) -> bool) -> usize {
        let mut kept = Vec::with_capacity(live.len());
        let mut removed = 0;
        for mut item in live.drain(..) {
            if keep(&mut item) {
                kept.push(item);
            } else {
                self.release(item);
                removed += 1;
            }
        }
        *live = kept;
        removed
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}
