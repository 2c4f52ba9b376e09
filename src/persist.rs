// Browser persistence for the two values that survive a reload: the session
// identity and the notify-cooldown timestamp.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::model::TelegramId;

pub const KEY_IDENTITY: &str = "bw_tg_id";
pub const KEY_USERNAME: &str = "bw_username";
pub const KEY_NOTIFY_NEXT: &str = "bw_notify_next_ms";
/// Session-scoped marker for the one-shot rate-limit reload.
pub const KEY_RELOAD_ATTEMPTED: &str = "bw_reload_attempted";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// `window.localStorage`, or `sessionStorage` when `session` is set.
/// Every operation is a silent no-op when storage is unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore {
    pub session: bool,
}

impl BrowserStore {
    pub const LOCAL: BrowserStore = BrowserStore { session: false };
    pub const SESSION: BrowserStore = BrowserStore { session: true };

    fn storage(&self) -> Option<web_sys::Storage> {
        let win = web_sys::window()?;
        let store = if self.session {
            win.session_storage()
        } else {
            win.local_storage()
        };
        store.ok().flatten()
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(store) = self.storage() {
            let _ = store.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(store) = self.storage() {
            let _ = store.remove_item(key);
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.borrow_mut().remove(key);
    }
}

pub fn load_identity(store: &dyn KeyValueStore) -> Option<TelegramId> {
    store.get(KEY_IDENTITY)?.trim().parse().ok()
}

pub fn save_identity(store: &dyn KeyValueStore, tg_id: TelegramId, username: &str) {
    store.set(KEY_IDENTITY, &tg_id.to_string());
    store.set(KEY_USERNAME, username);
}

pub fn load_username(store: &dyn KeyValueStore) -> Option<String> {
    store.get(KEY_USERNAME).filter(|s| !s.is_empty())
}

pub fn load_notify_next(store: &dyn KeyValueStore) -> Option<f64> {
    store.get(KEY_NOTIFY_NEXT)?.parse().ok()
}

pub fn save_notify_next(store: &dyn KeyValueStore, at_ms: f64) {
    store.set(KEY_NOTIFY_NEXT, &format!("{}", at_ms));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trips_and_rejects_garbage() {
        let store = MemoryStore::default();
        assert_eq!(load_identity(&store), None);
        save_identity(&store, 123456789, "wave");
        assert_eq!(load_identity(&store), Some(123456789));
        assert_eq!(load_username(&store).as_deref(), Some("wave"));
        store.set(KEY_IDENTITY, "not-a-number");
        assert_eq!(load_identity(&store), None);
    }
}
