use std::collections::HashMap;

use yew::Callback;

use super::ApiError;

/// Outcome of asking the cache for a key.
#[derive(Debug, PartialEq)]
pub enum Lookup<V> {
    /// A resolved value younger than the window; the waiter was not queued.
    Fresh(V),
    /// A request for the key is already in flight; the waiter was queued.
    Joined,
    /// Nothing usable; the caller must issue the request and `resolve` it.
    Fetch,
}

enum Entry<V> {
    InFlight(Vec<Callback<Result<V, ApiError>>>),
    Ready { value: V, at_ms: f64 },
}

/// Request deduplication for idempotent reads. Concurrent lookups for one key
/// share a single request; a resolved value is reused until `window_ms`
/// passes. Errors are handed to every waiter but never stored.
pub struct DedupCache<V> {
    window_ms: f64,
    entries: HashMap<String, Entry<V>>,
}

impl<V: Clone> DedupCache<V> {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            entries: HashMap::new(),
        }
    }

    pub fn lookup(&mut self, key: &str, now_ms: f64, waiter: Callback<Result<V, ApiError>>) -> Lookup<V> {
        match self.entries.get_mut(key) {
            Some(Entry::InFlight(waiters)) => {
                waiters.push(waiter);
                Lookup::Joined
            }
            Some(Entry::Ready { value, at_ms }) if now_ms - *at_ms < self.window_ms => {
                Lookup::Fresh(value.clone())
            }
            _ => {
                self.entries.insert(key.to_string(), Entry::InFlight(vec![waiter]));
                Lookup::Fetch
            }
        }
    }

    /// Completes an in-flight key and returns the waiters to notify.
    pub fn resolve(
        &mut self,
        key: &str,
        now_ms: f64,
        result: &Result<V, ApiError>,
    ) -> Vec<Callback<Result<V, ApiError>>> {
        let waiters = match self.entries.remove(key) {
            Some(Entry::InFlight(w)) => w,
            _ => Vec::new(),
        };
        if let Ok(value) = result {
            self.entries.insert(
                key.to_string(),
                Entry::Ready {
                    value: value.clone(),
                    at_ms: now_ms,
                },
            );
        }
        waiters
    }

    /// Drops stored values whose key starts with `prefix`; in-flight
    /// requests are left alone so their waiters still hear back.
    pub fn invalidate_prefix(&mut self, prefix: &str) {
        self.entries
            .retain(|k, e| !(k.starts_with(prefix) && matches!(e, Entry::Ready { .. })));
    }

    #[cfg(test)]
    pub fn in_flight(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(Entry::InFlight(_)))
    }
}
