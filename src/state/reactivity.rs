// ============================================================================
// REACTIVITY - Subscriber notifications for Rc<RefCell> state
// ============================================================================
// Subscribers are shared between clones, and the list is copied before a
// notification runs so a callback may subscribe or mutate state re-entrantly.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Callback = Rc<dyn Fn()>;

/// Shared list of change callbacks
#[derive(Clone, Default)]
pub struct Subscribers {
    callbacks: Rc<RefCell<Vec<Callback>>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.callbacks.borrow_mut().push(Rc::new(callback));
    }

    pub fn notify(&self) {
        let callbacks: Vec<Callback> = self.callbacks.borrow().clone();
        for callback in callbacks {
            callback();
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reactive value: every `set`/`update` notifies subscribers
pub struct ReactiveState<T> {
    value: Rc<RefCell<T>>,
    subscribers: Subscribers,
}

impl<T> ReactiveState<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            subscribers: Subscribers::new(),
        }
    }

    /// Read through a closure; the borrow ends before this returns
    pub fn with<R>(&self, reader: impl FnOnce(&T) -> R) -> R {
        let value = self.value.borrow();
        reader(&*value)
    }

    pub fn set(&self, new_value: T) {
        *self.value.borrow_mut() = new_value;
        self.subscribers.notify();
    }

    pub fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        updater(&mut *self.value.borrow_mut());
        self.subscribers.notify();
    }

    /// Mutates without notifying (form keystrokes must not trigger a re-render)
    pub fn update_silently<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        updater(&mut *self.value.borrow_mut());
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.subscribers.subscribe(callback);
    }
}

impl<T: Clone> ReactiveState<T> {
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T> Clone for ReactiveState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            subscribers: self.subscribers.clone(),
        }
    }
}

/// Fire-and-forget event with a raise counter (e.g. "request was unauthorized")
#[derive(Clone, Default)]
pub struct EventSignal {
    subscribers: Subscribers,
    raised: Rc<Cell<u64>>,
}

impl EventSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.subscribers.subscribe(callback);
    }

    pub fn raise(&self) {
        self.raised.set(self.raised.get() + 1);
        self.subscribers.notify();
    }

    /// How many times the signal has fired
    pub fn raised_count(&self) -> u64 {
        self.raised.get()
    }
}
