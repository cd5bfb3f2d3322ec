//! Where the user travels from.
//!
//! Stored as a plain string, not JSON. Other contexts learn about edits through
//! [`StorageEvents`]; the context that made the edit updates its own copy on
//! write, since it never receives its own notification.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::storage::{
    ContextId, KeyValueStore, StorageChange, StorageEvents, StorageKey, Subscription,
};

pub const DEFAULT_HOME_CITY: &str = "London, UK";

#[derive(Debug)]
pub struct HomeCityStore<S> {
    store: S,
    current: Rc<RefCell<String>>,
    subscription: Option<Subscription>,
}

/// Persisted home city, or the default when absent or unreadable.
pub fn read_home_city<S: KeyValueStore + ?Sized>(store: &S) -> String {
    match store.read(StorageKey::HomeCity.as_str()) {
        Ok(Some(city)) => city,
        Ok(None) => DEFAULT_HOME_CITY.to_string(),
        Err(e) => {
            warn!("falling back to default home city: {e}");
            DEFAULT_HOME_CITY.to_string()
        }
    }
}

impl<S: KeyValueStore> HomeCityStore<S> {
    pub fn load(store: S) -> Self {
        let current = read_home_city(&store);
        Self {
            store,
            current: Rc::new(RefCell::new(current)),
            subscription: None,
        }
    }

    /// Read straight from storage, bypassing the cached value.
    pub fn read(&self) -> String {
        read_home_city(&self.store)
    }

    /// The value this context is showing.
    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }

    /// Persist `city` and show it here at once. Free text, not validated.
    pub fn write(&self, city: &str) {
        if let Err(e) = self.store.write(StorageKey::HomeCity.as_str(), city) {
            warn!("dropped home city write: {e}");
        }
        city.clone_into(&mut self.current.borrow_mut());
        debug!("home city set to {city}");
    }

    /// Re-read storage into the cached value.
    pub fn refresh(&self) -> String {
        let city = self.read();
        city.clone_into(&mut self.current.borrow_mut());
        city
    }

    /// Hook for leaving the settings view: same-context edits made there are not
    /// announced on the bus, so pick them up explicitly.
    pub fn on_leave_settings(&self) -> String {
        self.refresh()
    }

    pub const fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop reacting to other contexts.
    pub fn unwatch(&mut self) {
        self.subscription = None;
    }
}

impl<S: KeyValueStore + Clone + 'static> HomeCityStore<S> {
    /// Re-read whenever another context changes the home city, then call
    /// `on_change` with the fresh value. Replaces any earlier subscription.
    pub fn watch(
        &mut self,
        events: &StorageEvents,
        context: ContextId,
        on_change: impl Fn(&str) + 'static,
    ) {
        let store = self.store.clone();
        let current = Rc::clone(&self.current);
        let subscription = events.subscribe(context, move |change: &StorageChange| {
            if !change.affects(StorageKey::HomeCity.as_str()) {
                return;
            }
            let city = read_home_city(&store);
            debug!("home city changed elsewhere: {city}");
            city.clone_into(&mut current.borrow_mut());
            on_change(&city);
        });
        self.subscription = Some(subscription);
    }
}
