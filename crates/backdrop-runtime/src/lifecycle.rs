//! Host lifecycle hooks as owned subscriptions.
//!
//! Single-threaded by contract (the render loop thread), hence `Rc`/`RefCell`. A `Subscription`
//! removes its callback when dropped, so a detached view cannot be called back.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse a platform theme name; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Theme> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

struct Listener<T> {
    id: u64,
    active: Cell<bool>,
    callback: RefCell<Box<dyn FnMut(&T)>>,
}

struct HubInner<T> {
    next_id: u64,
    listeners: Vec<Rc<Listener<T>>>,
}

impl<T> HubInner<T> {
    fn remove(&mut self, id: u64) {
        self.listeners.retain(|l| {
            if l.id == id {
                l.active.set(false);
            }
            l.id != id
        });
    }
}

/// Broadcasts values to subscribed callbacks.
pub struct EventHub<T> {
    inner: Rc<RefCell<HubInner<T>>>,
}

impl<T> fmt::Debug for EventHub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<T: 'static> Default for EventHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> EventHub<T> {
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl<T: 'static> EventHub<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HubInner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register `callback`; it stays registered for as long as the returned handle lives.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push(Rc::new(Listener {
                id,
                active: Cell::new(true),
                callback: RefCell::new(Box::new(callback)),
            }));
            id
        };

        let weak: Weak<RefCell<HubInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            id,
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Deliver `value` to every listener registered when the call starts.
    ///
    /// Callbacks may subscribe, unsubscribe or emit again while being called. A listener removed
    /// mid-emit is not called afterwards, and a listener already running is not re-entered by a
    /// nested emit.
    pub fn emit(&self, value: &T) {
        let current = self.inner.borrow().listeners.clone();

        for l in &current {
            if !l.active.get() {
                continue;
            }
            if let Ok(mut callback) = l.callback.try_borrow_mut() {
                callback(value);
            }
        }
    }
}

/// Registration handle; unsubscribes on drop.
pub struct Subscription {
    id: u64,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unsubscribe now (same as dropping).
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}
