//! Observable, persisted state container
//!
//! A store owns one state value and the storage it is persisted to. All
//! mutation goes through [`ObservableStore::update`], which follows the same
//! sequence every time:
//! 1. apply the mutation
//! 2. if anything changed, write the whole state to storage
//! 3. hand the new state to every observer, in registration order
//!
//! Persistence failures never block step 3. They are logged and returned in
//! the [`Commit`] so callers and tests can see them.

pub mod subscribers;

pub use subscribers::{Observer, SubscriptionId, Subscribers};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::persistence::{self, LoadError, PersistError, Storage};

/// Outcome of a mutating store operation
#[derive(Debug)]
pub enum Commit {
    /// Nothing changed; storage and observers were not touched
    Unchanged,
    /// Changed, persisted, observers notified
    Persisted,
    /// Changed and observers notified, but the write failed
    NotPersisted(PersistError),
}

impl Commit {
    /// Whether the operation changed the state
    pub fn changed(&self) -> bool {
        !matches!(self, Commit::Unchanged)
    }

    /// Whether storage reflects the in-memory state after this operation
    pub fn is_durable(&self) -> bool {
        !matches!(self, Commit::NotPersisted(_))
    }

    pub fn error(&self) -> Option<&PersistError> {
        match self {
            Commit::NotPersisted(err) => Some(err),
            _ => None,
        }
    }
}

/// State `T` persisted under a fixed key of storage `S`
#[derive(Debug)]
pub struct ObservableStore<T, S> {
    state: T,
    storage: S,
    key: String,
    subscribers: Subscribers<T>,
}

impl<T, S> ObservableStore<T, S>
where
    T: Serialize + DeserializeOwned + Default + Clone,
    S: Storage,
{
    /// Load the snapshot under `key`, or start from `T::default()`
    ///
    /// Nothing is written back on load.
    pub fn initialize(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match persistence::load_json(&storage, &key) {
            Ok(state) => {
                log::info!("Loaded `{}` from storage", key);
                state
            }
            Err(LoadError::Missing(_)) => {
                log::info!("No saved `{}`, starting fresh", key);
                T::default()
            }
            Err(err) => {
                log::warn!("Discarding saved `{}`: {}", key, err);
                T::default()
            }
        };

        Self {
            state,
            storage,
            key,
            subscribers: Subscribers::new(),
        }
    }

    /// Register an observer for every future change
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        self.subscribers.insert(Box::new(observer))
    }

    /// Drop a registration; false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Read-only view of the current state
    pub fn state(&self) -> &T {
        &self.state
    }

    /// Owned copy of the current state; changes to it never reach the store
    pub fn get_state(&self) -> T {
        self.state.clone()
    }

    /// Apply `mutate`, then persist and notify if it reports a change
    ///
    /// `mutate` must return true exactly when it modified the state.
    pub fn update<F>(&mut self, mutate: F) -> Commit
    where
        F: FnOnce(&mut T) -> bool,
    {
        if !mutate(&mut self.state) {
            return Commit::Unchanged;
        }

        let commit = match self.persist() {
            Ok(()) => Commit::Persisted,
            Err(err) => {
                log::warn!("Failed to save `{}`: {}", self.key, err);
                Commit::NotPersisted(err)
            }
        };
        self.subscribers.notify(&self.state);
        commit
    }

    /// Write the whole state to storage
    pub fn persist(&mut self) -> Result<(), PersistError> {
        persistence::save_json(&mut self.storage, &self.key, &self.state)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use serde::Deserialize;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: i64,
    }

    fn counter_store(storage: MemoryStorage) -> ObservableStore<Counter, MemoryStorage> {
        ObservableStore::initialize(storage, "counter")
    }

    #[test]
    fn test_initialize_empty_storage() {
        let store = counter_store(MemoryStorage::new());
        assert_eq!(store.state(), &Counter::default());
        // No write-back on load
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_initialize_adopts_snapshot() {
        let store = counter_store(MemoryStorage::new().with_item("counter", r#"{"value":41}"#));
        assert_eq!(store.state().value, 41);
    }

    #[test]
    fn test_initialize_malformed_falls_back() {
        let store = counter_store(MemoryStorage::new().with_item("counter", "{{{"));
        assert_eq!(store.state(), &Counter::default());
        // Malformed blob is left alone until the next change
        assert_eq!(store.storage().read("counter").unwrap().as_deref(), Some("{{{"));
    }

    #[test]
    fn test_update_persists_then_notifies() {
        let mut store = counter_store(MemoryStorage::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            store.subscribe(move |c: &Counter| seen.borrow_mut().push(c.value));
        }

        let commit = store.update(|c| {
            c.value += 1;
            true
        });
        assert!(commit.changed());
        assert!(commit.is_durable());
        assert_eq!(*seen.borrow(), vec![1]);

        let saved: Counter = persistence::load_json(store.storage(), "counter").unwrap();
        assert_eq!(saved, store.get_state());
    }

    /// Storage that records each write into a shared event log
    struct RecordingStorage {
        inner: MemoryStorage,
        events: Rc<RefCell<Vec<String>>>,
    }

    impl Storage for RecordingStorage {
        fn read(&self, key: &str) -> Result<Option<String>, crate::persistence::StorageError> {
            self.inner.read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> Result<(), crate::persistence::StorageError> {
            self.events.borrow_mut().push(format!("write {}", value));
            self.inner.write(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), crate::persistence::StorageError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_persist_happens_before_notify() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let storage = RecordingStorage {
            inner: MemoryStorage::new(),
            events: events.clone(),
        };
        let mut store: ObservableStore<Counter, _> = ObservableStore::initialize(storage, "counter");
        {
            let events = events.clone();
            store.subscribe(move |c: &Counter| events.borrow_mut().push(format!("notify {}", c.value)));
        }

        store.update(|c| {
            c.value = 5;
            true
        });
        assert_eq!(
            *events.borrow(),
            vec![r#"write {"value":5}"#.to_string(), "notify 5".to_string()]
        );
    }

    #[test]
    fn test_unchanged_update_skips_persist_and_notify() {
        let mut store = counter_store(MemoryStorage::new());
        let calls = Rc::new(Cell::new(0));
        {
            let calls = calls.clone();
            store.subscribe(move |_| calls.set(calls.get() + 1));
        }

        let commit = store.update(|_| false);
        assert!(!commit.changed());
        assert_eq!(calls.get(), 0);
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_persist_failure_still_notifies() {
        let mut storage = MemoryStorage::new();
        storage.set_read_only(true);
        let mut store = counter_store(storage);
        let calls = Rc::new(Cell::new(0));
        {
            let calls = calls.clone();
            store.subscribe(move |_| calls.set(calls.get() + 1));
        }

        let commit = store.update(|c| {
            c.value = 9;
            true
        });
        assert!(commit.changed());
        assert!(!commit.is_durable());
        assert!(matches!(commit.error(), Some(PersistError::Storage(_))));
        assert_eq!(calls.get(), 1);
        assert_eq!(store.state().value, 9);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = counter_store(MemoryStorage::new());
        let order = Rc::new(RefCell::new(Vec::new()));
        let ids: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|name| {
                let order = order.clone();
                store.subscribe(move |_| order.borrow_mut().push(name))
            })
            .collect();

        assert!(store.unsubscribe(ids[1]));
        assert!(!store.unsubscribe(ids[1]));
        assert_eq!(store.subscriber_count(), 2);

        store.update(|c| {
            c.value += 1;
            true
        });
        assert_eq!(*order.borrow(), vec!["a", "c"]);
    }

    #[test]
    fn test_get_state_is_detached() {
        let mut store = counter_store(MemoryStorage::new());
        let mut copy = store.get_state();
        copy.value = 100;
        assert_eq!(store.state().value, 0);

        store.update(|c| {
            c.value = 1;
            true
        });
        assert_eq!(copy.value, 100);
    }
}
