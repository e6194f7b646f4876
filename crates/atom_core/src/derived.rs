//! Read-only cells computed from other cells.
//!
//! Invariants while mounted:
//! - `cached` holds the value of the latest evaluation.
//! - `deps` holds exactly one listener per atom read by that evaluation.
//! - A dependency notification re-evaluates and forwards the notification
//!   only if the value changed.
//!
//! While unmounted, nothing is cached and no dependency is observed.

use crate::id::AtomId;
use crate::traits::{Observable, Readable};
use core_types::{Listener, ListenerId, ListenerList};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Dependency recorder handed to read functions.
pub struct Getter {
    sources: Option<RefCell<Vec<Rc<dyn Observable>>>>,
}

impl Getter {
    fn tracking() -> Self {
        Self {
            sources: Some(RefCell::new(Vec::new())),
        }
    }

    fn untracked() -> Self {
        Self { sources: None }
    }

    /// Reads `atom` and records it as a dependency.
    pub fn get<T, R>(&self, atom: &R) -> T
    where
        R: Readable<T> + Clone + 'static,
    {
        if let Some(sources) = &self.sources {
            let mut sources = sources.borrow_mut();
            let id = atom.atom_id();
            if !sources.iter().any(|s| s.atom_id() == id) {
                sources.push(Rc::new(atom.clone()));
            }
        }
        atom.get()
    }

    fn into_sources(self) -> Vec<Rc<dyn Observable>> {
        self.sources.map(RefCell::into_inner).unwrap_or_default()
    }
}

struct DepLink {
    source: Rc<dyn Observable>,
    listener: ListenerId,
}

struct DerivedInner<T> {
    id: AtomId,
    read: Box<dyn Fn(&Getter) -> T>,
    cached: RefCell<Option<T>>,
    deps: RefCell<Vec<DepLink>>,
    listeners: ListenerList,
    busy: Cell<bool>,
    dirty: Cell<bool>,
}

pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Derived<T> {
    pub fn new(read: impl Fn(&Getter) -> T + 'static) -> Self {
        Self {
            inner: Rc::new(DerivedInner {
                id: AtomId::next(),
                read: Box::new(read),
                cached: RefCell::new(None),
                deps: RefCell::new(Vec::new()),
                listeners: ListenerList::new(),
                busy: Cell::new(false),
                dirty: Cell::new(false),
            }),
        }
    }

    pub fn get(&self) -> T {
        if !self.inner.listeners.is_empty() {
            if let Some(value) = self.inner.cached.borrow().as_ref() {
                return value.clone();
            }
        }
        (self.inner.read)(&Getter::untracked())
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    pub fn dependency_count(&self) -> usize {
        self.inner.deps.borrow().len()
    }
}

/// Re-evaluates and re-links dependencies. Returns whether the cached value
/// changed.
///
/// Linking a new dependency may mount it, and a mount hook may write to that
/// dependency synchronously. Such notifications arrive while `busy`; they
/// only mark the cell dirty and the loop evaluates once more. A nested
/// derived dependency reseeded by its own mount does not notify at all, so
/// any evaluation that linked a new dependency is also repeated.
fn refresh<T: Clone + PartialEq + 'static>(inner: &Rc<DerivedInner<T>>) -> bool {
    if inner.busy.replace(true) {
        inner.dirty.set(true);
        return false;
    }
    let before = inner.cached.borrow().clone();
    loop {
        inner.dirty.set(false);
        let getter = Getter::tracking();
        let value = (inner.read)(&getter);
        *inner.cached.borrow_mut() = Some(value);
        let linked_new = relink(inner, getter.into_sources());
        if !inner.dirty.get() && !linked_new {
            break;
        }
    }
    inner.busy.set(false);
    before.as_ref() != inner.cached.borrow().as_ref()
}

/// Returns whether any source was not linked before.
fn relink<T: Clone + PartialEq + 'static>(
    inner: &Rc<DerivedInner<T>>,
    sources: Vec<Rc<dyn Observable>>,
) -> bool {
    let mut stale = std::mem::take(&mut *inner.deps.borrow_mut());
    let mut linked = Vec::with_capacity(sources.len());
    let mut linked_new = false;
    for source in sources {
        let id = source.atom_id();
        if let Some(pos) = stale.iter().position(|dep| dep.source.atom_id() == id) {
            linked.push(stale.swap_remove(pos));
        } else {
            let listener = source.add_listener(on_dependency_changed(Rc::downgrade(inner)));
            linked.push(DepLink { source, listener });
            linked_new = true;
        }
    }
    *inner.deps.borrow_mut() = linked;
    // New links are in place before old ones go, so a source read by both
    // evaluations never sees a transient unmount.
    for dep in stale {
        dep.source.remove_listener(dep.listener);
    }
    linked_new
}

fn on_dependency_changed<T: Clone + PartialEq + 'static>(weak: Weak<DerivedInner<T>>) -> Listener {
    Rc::new(move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if inner.listeners.is_empty() {
            return;
        }
        if refresh(&inner) {
            inner.listeners.notify();
        }
    })
}

fn unlink<T>(inner: &DerivedInner<T>) {
    let deps = std::mem::take(&mut *inner.deps.borrow_mut());
    for dep in deps {
        dep.source.remove_listener(dep.listener);
    }
    *inner.cached.borrow_mut() = None;
}

impl<T: Clone + PartialEq + 'static> Observable for Derived<T> {
    fn atom_id(&self) -> AtomId {
        self.inner.id
    }

    fn add_listener(&self, listener: Listener) -> ListenerId {
        let (id, first) = self.inner.listeners.add(listener);
        if first {
            refresh(&self.inner);
        }
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        if self.inner.listeners.remove(id) {
            unlink(&self.inner);
        }
    }

    fn is_mounted(&self) -> bool {
        !self.inner.listeners.is_empty()
    }
}

impl<T: Clone + PartialEq + 'static> Readable<T> for Derived<T> {
    fn get(&self) -> T {
        Derived::get(self)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived")
            .field("id", &self.inner.id)
            .field("cached", &self.inner.cached.borrow())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}
