//! Plain observable cell.

use crate::id::AtomId;
use crate::traits::{Observable, Readable};
use core_types::{Listener, ListenerId, ListenerList};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Undo action returned by a mount hook; runs on unmount.
pub type Cleanup = Box<dyn FnOnce()>;

/// Runs when a [`State`] gains its first listener.
pub type OnMount<T> = Rc<dyn Fn(&StateSetter<T>) -> Option<Cleanup>>;

struct StateInner<T> {
    id: AtomId,
    value: RefCell<T>,
    listeners: ListenerList,
    on_mount: RefCell<Option<OnMount<T>>>,
    cleanup: RefCell<Option<Cleanup>>,
}

/// Observable cell holding a `T`.
///
/// Setting a value equal to the current one is a no-op: listeners are only
/// notified on actual changes.
pub struct State<T> {
    inner: Rc<StateInner<T>>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> State<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StateInner {
                id: AtomId::next(),
                value: RefCell::new(value),
                listeners: ListenerList::new(),
                on_mount: RefCell::new(None),
                cleanup: RefCell::new(None),
            }),
        }
    }

    /// Installs the mount hook. If the cell is already mounted the hook takes
    /// effect on the next mount.
    pub fn with_on_mount(
        self,
        hook: impl Fn(&StateSetter<T>) -> Option<Cleanup> + 'static,
    ) -> Self {
        *self.inner.on_mount.borrow_mut() = Some(Rc::new(hook));
        self
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Reads without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Stores `value` and notifies listeners. Returns `false` (and notifies
    /// nobody) if the value did not change.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.inner.listeners.notify();
        true
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        let next = f(&self.inner.value.borrow());
        self.set(next)
    }

    pub fn setter(&self) -> StateSetter<T> {
        StateSetter {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn mount(&self) {
        let hook = self.inner.on_mount.borrow().clone();
        if let Some(hook) = hook {
            let cleanup = hook(&self.setter());
            *self.inner.cleanup.borrow_mut() = cleanup;
        }
    }

    fn unmount(&self) {
        let cleanup = self.inner.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable for State<T> {
    fn atom_id(&self) -> AtomId {
        self.inner.id
    }

    fn add_listener(&self, listener: Listener) -> ListenerId {
        let (id, first) = self.inner.listeners.add(listener);
        if first {
            self.mount();
        }
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        if self.inner.listeners.remove(id) {
            self.unmount();
        }
    }

    fn is_mounted(&self) -> bool {
        !self.inner.listeners.is_empty()
    }
}

impl<T: Clone + PartialEq + 'static> Readable<T> for State<T> {
    fn get(&self) -> T {
        State::get(self)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("id", &self.inner.id)
            .field("value", &self.inner.value.borrow())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

/// Weak write handle given to mount hooks.
///
/// Holding it does not keep the cell alive, so hooks may stash it inside
/// browser listeners without creating a cycle.
pub struct StateSetter<T> {
    inner: Weak<StateInner<T>>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> StateSetter<T> {
    /// Returns `false` if the cell is gone or the value did not change.
    pub fn set(&self, value: T) -> bool {
        match self.inner.upgrade() {
            Some(inner) => State { inner }.set(value),
            None => false,
        }
    }

    pub fn get(&self) -> Option<T> {
        self.inner
            .upgrade()
            .map(|inner| inner.value.borrow().clone())
    }
}
