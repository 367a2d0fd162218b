//! Observable state Atom
//!
//! Atom holds a single value and notifies registered listeners whenever the
//! value changes. Listeners stay registered until their [`Subscription`] is
//! explicitly unsubscribed; dropping the handle does not remove them.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct AtomState<T> {
    value: T,
    listeners: Vec<(u64, Listener<T>)>,
    next_listener_id: u64,
}

/// Shared observable value.
///
/// Clones share the same value and listener list.
///
/// ```rust
/// use frontend::dataflow::Atom;
///
/// let compare_examples = Atom::new(false);
/// let subscription = compare_examples.subscribe(|enabled| println!("compare: {enabled}"));
/// compare_examples.set_neq(true);
/// subscription.unsubscribe();
/// ```
pub struct Atom<T> {
    state: Arc<Mutex<AtomState<T>>>,
}

impl<T> Clone for Atom<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Atom<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(AtomState {
                value: initial,
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AtomState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value. Prefer subscriptions for anything that must react.
    pub fn get_cloned(&self) -> T {
        self.lock().value.clone()
    }

    /// Read the value without cloning it.
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        f(&self.lock().value)
    }

    /// Replace the value and notify listeners unconditionally.
    pub fn set(&self, value: T) {
        let listeners = {
            let mut state = self.lock();
            state.value = value.clone();
            snapshot(&state.listeners)
        };
        notify(&listeners, &value);
    }

    /// Register a listener called with every new value.
    ///
    /// Listeners run after the internal lock is released, so they may read
    /// or write this Atom.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut state = self.lock();
            let id = state.next_listener_id;
            state.next_listener_id += 1;
            let listener: Listener<T> = Arc::new(listener);
            state.listeners.push((id, listener));
            id
        };

        let weak: Weak<Mutex<AtomState<T>>> = Arc::downgrade(&self.state);
        Subscription {
            id,
            remove: Some(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                    state.listeners.retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

impl<T> Atom<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Replace the value only if it differs; returns whether it changed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frontend::dataflow::Atom;
    ///
    /// let layout_name = Atom::new("default".to_string());
    /// assert!(!layout_name.set_neq("default".to_string()));
    /// assert!(layout_name.set_neq("simple".to_string()));
    /// ```
    pub fn set_neq(&self, value: T) -> bool {
        let listeners = {
            let mut state = self.lock();
            if state.value == value {
                return false;
            }
            state.value = value.clone();
            snapshot(&state.listeners)
        };
        notify(&listeners, &value);
        true
    }
}

impl Atom<bool> {
    /// Flip the flag and notify listeners with the new value.
    ///
    /// Read and write happen under one lock, so concurrent toggles are never
    /// lost.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frontend::dataflow::Atom;
    ///
    /// let dialog_open = Atom::new(false);
    /// dialog_open.toggle();
    /// assert!(dialog_open.get_cloned());
    /// ```
    pub fn toggle(&self) {
        let (value, listeners) = {
            let mut state = self.lock();
            state.value = !state.value;
            (state.value, snapshot(&state.listeners))
        };
        notify(&listeners, &value);
    }
}

impl<T> Default for Atom<T>
where
    T: Clone + Send + Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Atom<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Atom")
            .field("value", &state.value)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

fn snapshot<T>(listeners: &[(u64, Listener<T>)]) -> Vec<Listener<T>> {
    listeners.iter().map(|(_, listener)| Arc::clone(listener)).collect()
}

fn notify<T>(listeners: &[Listener<T>], value: &T) {
    for listener in listeners {
        listener(value);
    }
}

/// Handle for a registered Atom listener.
#[must_use = "a listener stays registered until `unsubscribe` is called"]
pub struct Subscription {
    id: u64,
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the listener. A no-op when the Atom is already gone.
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
