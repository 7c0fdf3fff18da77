//! Observer registry
//!
//! Ids are handed out in increasing order, so iterating the map visits
//! observers in registration order.

use std::collections::BTreeMap;
use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked with the new state after every change
pub type Observer<T> = Box<dyn FnMut(&T)>;

pub struct Subscribers<T> {
    next_id: u64,
    observers: BTreeMap<SubscriptionId, Observer<T>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            observers: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, observer: Observer<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, observer);
        id
    }

    /// Returns false if `id` was not registered
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&mut self, state: &T) {
        for observer in self.observers.values_mut() {
            observer(state);
        }
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.observers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscribers::<u32>::new();
        for name in ["first", "second", "third"] {
            let log = log.clone();
            subs.insert(Box::new(move |v: &u32| log.borrow_mut().push((name, *v))));
        }

        subs.notify(&7);
        assert_eq!(
            *log.borrow(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn test_remove_only_once() {
        let mut subs = Subscribers::<u32>::new();
        let a = subs.insert(Box::new(|_: &u32| {}));
        let b = subs.insert(Box::new(|_: &u32| {}));
        assert_ne!(a, b);

        assert!(subs.remove(a));
        assert!(!subs.remove(a));
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut subs = Subscribers::<u32>::new();
        let a = subs.insert(Box::new(|_: &u32| {}));
        subs.remove(a);
        let b = subs.insert(Box::new(|_: &u32| {}));
        assert!(b > a);
    }
}
