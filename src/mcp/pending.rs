//! Request id allocation and response correlation
//!
//! Ids are handed out sequentially starting at 1. Each outstanding request
//! carries a continuation value that is returned when the matching
//! response arrives.

use std::collections::HashMap;

/// Map from request id to the continuation waiting on it
#[derive(Debug)]
pub struct PendingRequests<T> {
    next_id: u64,
    pending: HashMap<u64, T>,
}

impl<T> PendingRequests<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: HashMap::new(),
        }
    }

    /// Allocate the next id and park `continuation` under it
    pub fn register(&mut self, continuation: T) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(id, continuation);
        id
    }

    /// Take the continuation for `id`, if one is waiting
    pub fn complete(&mut self, id: u64) -> Option<T> {
        self.pending.remove(&id)
    }

    /// Number of requests still waiting for a response
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for PendingRequests<T> {
    fn default() -> Self {
        Self::new()
    }
}
