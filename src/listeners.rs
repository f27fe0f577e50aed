//! Change notification
//!
//! Every view owns a `Listeners` registry. Listeners receive the view's
//! `(columns, rows)` snapshot after each recomputation.
//!
//! # Emission rules
//!
//! - Listeners run in registration order.
//! - The entry list is copied before iterating and the registry is not
//!   borrowed while a listener runs, so a listener may register or remove
//!   listeners, or mutate views, without invalidating the pass.
//! - A listener removed during a pass is skipped for the rest of that pass if
//!   it has not run yet, and never runs again.
//! - A listener registered during a pass first runs on the next pass.
//!
//! # Duplicates
//!
//! Registering the same `Rc` twice is rejected: the second call returns the
//! id of the existing registration, and a single `off_update` removes it.

use crate::column::Columns;
use crate::view::Rows;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Callback invoked with a view's `(columns, rows)` after each update
pub type Listener<T> = Rc<dyn Fn(&Columns<T>, &Rows<T>)>;

/// Handle identifying one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Entry<T> {
    id: ListenerId,
    active: Cell<bool>,
    listener: Listener<T>,
}

struct Registry<T> {
    entries: RefCell<Vec<Rc<Entry<T>>>>,
    next_id: Cell<u64>,
}

impl<T> Registry<T> {
    fn remove(&self, id: ListenerId) {
        self.entries.borrow_mut().retain(|entry| {
            if entry.id == id {
                entry.active.set(false);
                false
            } else {
                true
            }
        });
    }
}

fn same_listener<T>(a: &Listener<T>, b: &Listener<T>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

/// Listener registry owned by a view
pub struct Listeners<T> {
    registry: Rc<Registry<T>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Listeners {
            registry: Rc::new(Registry {
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Register a listener. Returns the existing id if this exact `Rc` is
    /// already registered.
    pub fn on_update(&self, listener: Listener<T>) -> ListenerId {
        let mut entries = self.registry.entries.borrow_mut();
        if let Some(existing) = entries.iter().find(|e| same_listener(&e.listener, &listener)) {
            return existing.id;
        }

        let id = ListenerId(self.registry.next_id.get());
        self.registry.next_id.set(id.0 + 1);
        entries.push(Rc::new(Entry {
            id,
            active: Cell::new(true),
            listener,
        }));
        id
    }

    /// Remove a registration. Unknown ids are ignored.
    pub fn off_update(&self, id: ListenerId) {
        self.registry.remove(id);
    }

    /// Register a listener that stays registered until the returned
    /// `Subscription` is dropped.
    pub fn subscribe(&self, listener: Listener<T>) -> Subscription<T> {
        let id = self.on_update(listener);
        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
            armed: true,
        }
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.registry.entries.borrow().iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.registry.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.entries.borrow().is_empty()
    }

    /// Invoke every registered listener with the same snapshot.
    pub fn emit(&self, columns: &Columns<T>, rows: &Rows<T>) {
        let entries: Vec<Rc<Entry<T>>> = self.registry.entries.borrow().clone();
        for entry in entries {
            if entry.active.get() {
                (entry.listener)(columns, rows);
            }
        }
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

/// Scoped registration; dropping it removes the listener
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription<T> {
    registry: Weak<Registry<T>>,
    id: ListenerId,
    armed: bool,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn unsubscribe(self) {
        drop(self)
    }

    /// Keep the listener registered for the lifetime of the view.
    pub fn detach(mut self) -> ListenerId {
        self.armed = false;
        self.id
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("armed", &self.armed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;

    fn snapshot() -> (Columns<i32>, Rows<i32>) {
        (Rc::from(Vec::<Column<i32>>::new()), Rc::from(vec![1, 2, 3]))
    }

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Listener<i32> {
        let log = Rc::clone(log);
        Rc::new(move |_: &Columns<i32>, _: &Rows<i32>| log.borrow_mut().push(name))
    }

    #[test]
    fn test_registration_order() {
        let listeners = Listeners::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        listeners.on_update(recorder(&log, "a"));
        listeners.on_update(recorder(&log, "b"));
        listeners.on_update(recorder(&log, "c"));

        let (columns, rows) = snapshot();
        listeners.emit(&columns, &rows);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_listener_receives_shared_snapshot() {
        let listeners = Listeners::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..2 {
            let seen = Rc::clone(&seen);
            listeners.on_update(Rc::new(move |_: &Columns<i32>, rows: &Rows<i32>| {
                seen.borrow_mut().push(Rc::clone(rows))
            }));
        }

        let (columns, rows) = snapshot();
        listeners.emit(&columns, &rows);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(Rc::ptr_eq(&seen[0], &rows));
        assert!(Rc::ptr_eq(&seen[1], &rows));
    }

    #[test]
    fn test_off_update_unknown_is_noop() {
        let listeners = Listeners::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = listeners.on_update(recorder(&log, "a"));
        listeners.off_update(id);
        listeners.off_update(id);
        listeners.on_update(recorder(&log, "b"));

        let (columns, rows) = snapshot();
        listeners.emit(&columns, &rows);
        assert_eq!(*log.borrow(), vec!["b"]);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let listeners = Listeners::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let listener = recorder(&log, "a");

        let first = listeners.on_update(Rc::clone(&listener));
        let second = listeners.on_update(Rc::clone(&listener));
        assert_eq!(first, second);
        assert_eq!(listeners.len(), 1);

        let (columns, rows) = snapshot();
        listeners.emit(&columns, &rows);
        assert_eq!(*log.borrow(), vec!["a"]);

        listeners.off_update(first);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_self_removal_during_emit() {
        let listeners = Rc::new(Listeners::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let own_id = Rc::new(Cell::new(None));

        let id = {
            let listeners_ref = Rc::clone(&listeners);
            let log = Rc::clone(&log);
            let own_id = Rc::clone(&own_id);
            listeners.on_update(Rc::new(move |_: &Columns<i32>, _: &Rows<i32>| {
                log.borrow_mut().push("once");
                if let Some(id) = own_id.get() {
                    listeners_ref.off_update(id);
                }
            }))
        };
        own_id.set(Some(id));
        listeners.on_update(recorder(&log, "after"));

        let (columns, rows) = snapshot();
        listeners.emit(&columns, &rows);
        listeners.emit(&columns, &rows);
        assert_eq!(*log.borrow(), vec!["once", "after", "after"]);
    }

    #[test]
    fn test_removed_later_listener_is_skipped() {
        let listeners = Rc::new(Listeners::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let victim = Rc::new(Cell::new(None));

        {
            let listeners_ref = Rc::clone(&listeners);
            let victim = Rc::clone(&victim);
            listeners.on_update(Rc::new(move |_: &Columns<i32>, _: &Rows<i32>| {
                if let Some(id) = victim.get() {
                    listeners_ref.off_update(id);
                }
            }));
        }
        victim.set(Some(listeners.on_update(recorder(&log, "victim"))));

        let (columns, rows) = snapshot();
        listeners.emit(&columns, &rows);
        assert!(log.borrow().is_empty());
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_registration_during_emit_waits_for_next_pass() {
        let listeners = Rc::new(Listeners::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let late = recorder(&log, "late");

        {
            let listeners_ref = Rc::clone(&listeners);
            let late = Rc::clone(&late);
            listeners.on_update(Rc::new(move |_: &Columns<i32>, _: &Rows<i32>| {
                listeners_ref.on_update(Rc::clone(&late));
            }));
        }

        let (columns, rows) = snapshot();
        listeners.emit(&columns, &rows);
        assert!(log.borrow().is_empty());
        listeners.emit(&columns, &rows);
        assert_eq!(*log.borrow(), vec!["late"]);
    }

    #[test]
    fn test_subscription_drop_unregisters() {
        let listeners = Listeners::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (columns, rows) = snapshot();

        let subscription = listeners.subscribe(recorder(&log, "a"));
        assert!(listeners.contains(subscription.id()));
        listeners.emit(&columns, &rows);
        drop(subscription);
        listeners.emit(&columns, &rows);
        assert_eq!(*log.borrow(), vec!["a"]);
        assert!(listeners.is_empty());

        let id = listeners.subscribe(recorder(&log, "kept")).detach();
        assert!(listeners.contains(id));
        listeners.emit(&columns, &rows);
        assert_eq!(*log.borrow(), vec!["a", "kept"]);
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let listeners = Listeners::<i32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let subscription = listeners.subscribe(recorder(&log, "a"));
        drop(listeners);
        subscription.unsubscribe();
    }
}
