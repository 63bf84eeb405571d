use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use axum::body::Bytes;
use parking_lot::Mutex;

/// Cache for serialized GET responses.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Bytes>;
    fn insert(&self, key: String, body: Bytes);
    /// Drops every entry whose key starts with `prefix`.
    fn invalidate_prefix(&self, prefix: &str);
}

struct Entry {
    body: Bytes,
    stored_at: Instant,
    last_used: u64,
}

struct Entries {
    map: HashMap<String, Entry>,
    clock: u64,
}

impl Entries {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// In-process cache with a time-to-live and least-recently-used eviction.
pub struct LruResponseCache {
    entries: Mutex<Entries>,
    ttl: Duration,
    capacity: usize,
}

impl LruResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        LruResponseCache {
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                clock: 0,
            }),
            ttl,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<Bytes> {
        let mut entries = self.entries.lock();
        let tick = entries.tick();

        match entries.map.get_mut(key) {
            None => return None,
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                entry.last_used = tick;
                return Some(entry.body.clone());
            }
            Some(_) => {}
        }

        entries.map.remove(key);
        None
    }

    pub fn insert_at(&self, key: String, body: Bytes, now: Instant) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.lock();
        let tick = entries.tick();

        if !entries.map.contains_key(&key) && entries.map.len() >= self.capacity {
            let least_recent = entries
                .map
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            if let Some(least_recent) = least_recent {
                tracing::debug!(key = %least_recent, "Evicting cached response");
                entries.map.remove(&least_recent);
            }
        }

        entries.map.insert(
            key,
            Entry {
                body,
                stored_at: now,
                last_used: tick,
            },
        );
    }
}

impl ResponseCache for LruResponseCache {
    fn get(&self, key: &str) -> Option<Bytes> {
        self.get_at(key, Instant::now())
    }

    fn insert(&self, key: String, body: Bytes) {
        self.insert_at(key, body, Instant::now())
    }

    fn invalidate_prefix(&self, prefix: &str) {
        self.entries
            .lock()
            .map
            .retain(|key, _| !key.starts_with(prefix));
    }
}
