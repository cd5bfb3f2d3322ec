//! Storage-change notifications between browsing contexts.
//!
//! Mirrors the browser `storage` event: a write made through one context is
//! announced to every *other* context sharing the substrate, never to the
//! writer itself. Contexts subscribe with a callback and stay subscribed for as
//! long as they hold the returned [`Subscription`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::debug;

use super::{KeyValueStore, StorageError};

/// Identity of one browsing context (a tab, a window, a CLI process).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// `None` when the whole storage area was cleared
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl StorageChange {
    pub fn new(key: &str, old_value: Option<String>, new_value: Option<String>) -> Self {
        Self {
            key: Some(key.to_string()),
            old_value,
            new_value,
        }
    }

    pub const fn cleared() -> Self {
        Self {
            key: None,
            old_value: None,
            new_value: None,
        }
    }

    /// Whether a listener interested in `key` should re-read.
    pub fn affects(&self, key: &str) -> bool {
        self.key.as_deref().is_none_or(|changed| changed == key)
    }
}

type Listener = Rc<dyn Fn(&StorageChange)>;

struct Registration {
    id: u64,
    context: ContextId,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_subscription: u64,
    next_context: u64,
    registrations: Vec<Registration>,
}

/// Notification bus shared by every context of one application.
#[derive(Clone, Default)]
pub struct StorageEvents {
    registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for StorageEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl StorageEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_context(&self) -> ContextId {
        let mut registry = self.registry.borrow_mut();
        registry.next_context += 1;
        ContextId(registry.next_context)
    }

    /// Register `listener` for changes made by contexts other than `context`.
    pub fn subscribe(
        &self,
        context: ContextId,
        listener: impl Fn(&StorageChange) + 'static,
    ) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_subscription += 1;
        let id = registry.next_subscription;
        registry.registrations.push(Registration {
            id,
            context,
            listener: Rc::new(listener),
        });

        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Deliver `change` to every listener outside `origin`.
    ///
    /// `origin` is `None` for changes observed from outside this process, which
    /// reach every listener. Returns the number of listeners called.
    pub fn publish(&self, origin: Option<ContextId>, change: &StorageChange) -> usize {
        // Listeners may subscribe or unsubscribe while running.
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .registrations
            .iter()
            .filter(|registration| Some(registration.context) != origin)
            .map(|registration| Rc::clone(&registration.listener))
            .collect();

        debug!(
            "storage change {:?} delivered to {} listeners",
            change.key,
            listeners.len()
        );
        for listener in &listeners {
            listener(change);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().registrations.len()
    }
}

/// Keeps a listener registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    id: u64,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .registrations
                .retain(|registration| registration.id != self.id);
        }
    }
}

/// One context's view of a shared substrate.
///
/// Writes go straight to the substrate and are then announced to the other
/// contexts on the bus. Writes that leave the value unchanged announce nothing.
#[derive(Debug, Clone)]
pub struct ContextStorage<S> {
    inner: S,
    events: StorageEvents,
    context: ContextId,
}

impl<S: KeyValueStore> ContextStorage<S> {
    pub fn new(inner: S, events: &StorageEvents) -> Self {
        Self {
            inner,
            events: events.clone(),
            context: events.new_context(),
        }
    }

    pub const fn context(&self) -> ContextId {
        self.context
    }

    pub const fn events(&self) -> &StorageEvents {
        &self.events
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }

    fn previous(&self, key: &str) -> Option<String> {
        self.inner.read(key).ok().flatten()
    }
}

impl<S: KeyValueStore> KeyValueStore for ContextStorage<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let old_value = self.previous(key);
        self.inner.write(key, value)?;
        if old_value.as_deref() != Some(value) {
            let change = StorageChange::new(key, old_value, Some(value.to_string()));
            self.events.publish(Some(self.context), &change);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let old_value = self.previous(key);
        self.inner.remove(key)?;
        if old_value.is_some() {
            self.events
                .publish(Some(self.context), &StorageChange::new(key, old_value, None));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::cell::Cell;

    #[test]
    fn writer_is_not_notified_of_its_own_change() -> Result<(), StorageError> {
        let events = StorageEvents::new();
        let substrate = Rc::new(MemoryStore::new());
        let tab_a = ContextStorage::new(Rc::clone(&substrate), &events);
        let tab_b = ContextStorage::new(Rc::clone(&substrate), &events);

        let seen_a = Rc::new(Cell::new(0));
        let seen_b = Rc::new(RefCell::new(Vec::new()));
        let _sub_a = events.subscribe(tab_a.context(), {
            let seen_a = Rc::clone(&seen_a);
            move |_| seen_a.set(seen_a.get() + 1)
        });
        let _sub_b = events.subscribe(tab_b.context(), {
            let seen_b = Rc::clone(&seen_b);
            move |change: &StorageChange| seen_b.borrow_mut().push(change.clone())
        });

        tab_a.write("home-city", "Paris, France")?;

        assert_eq!(seen_a.get(), 0);
        assert_eq!(
            *seen_b.borrow(),
            vec![StorageChange::new(
                "home-city",
                None,
                Some("Paris, France".to_string())
            )]
        );
        Ok(())
    }

    #[test]
    fn unchanged_write_is_silent() -> Result<(), StorageError> {
        let events = StorageEvents::new();
        let substrate = Rc::new(MemoryStore::new());
        let tab_a = ContextStorage::new(Rc::clone(&substrate), &events);
        let tab_b = events.new_context();

        let seen = Rc::new(Cell::new(0));
        let _sub = events.subscribe(tab_b, {
            let seen = Rc::clone(&seen);
            move |_| seen.set(seen.get() + 1)
        });

        tab_a.write("home-city", "Berlin")?;
        tab_a.write("home-city", "Berlin")?;
        tab_a.remove("radar-events")?;
        assert_eq!(seen.get(), 1);
        Ok(())
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let events = StorageEvents::new();
        let context = events.new_context();
        let seen = Rc::new(Cell::new(0));

        let subscription = events.subscribe(context, {
            let seen = Rc::clone(&seen);
            move |_| seen.set(seen.get() + 1)
        });
        assert_eq!(events.listener_count(), 1);
        assert_eq!(events.publish(None, &StorageChange::cleared()), 1);

        subscription.unsubscribe();
        assert_eq!(events.listener_count(), 0);
        assert_eq!(events.publish(None, &StorageChange::cleared()), 0);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn cleared_change_affects_every_key() {
        assert!(StorageChange::cleared().affects("home-city"));
        let change = StorageChange::new("radar-events", None, None);
        assert!(change.affects("radar-events"));
        assert!(!change.affects("home-city"));
    }
}
