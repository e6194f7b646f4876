//! Cell traits shared by every atom kind.
//!
//! [`Observable`] is object-safe so that derived atoms can hold their
//! dependencies as `Rc<dyn Observable>` regardless of value type.

use crate::id::AtomId;
use crate::subscription::Subscription;
use core_types::{Listener, ListenerId};
use std::rc::Rc;

pub trait Observable {
    fn atom_id(&self) -> AtomId;

    /// Attaches a listener. The first listener mounts the atom.
    fn add_listener(&self, listener: Listener) -> ListenerId;

    /// Detaches a listener. Removing the last listener unmounts the atom.
    fn remove_listener(&self, id: ListenerId);

    fn is_mounted(&self) -> bool;

    /// Attaches `f` for as long as the returned guard lives.
    fn subscribe(&self, f: impl Fn() + 'static) -> Subscription
    where
        Self: Clone + Sized + 'static,
    {
        Subscription::new(Rc::new(self.clone()), Rc::new(f))
    }
}

pub trait Readable<T>: Observable {
    /// Current value. Mounted atoms answer from their cache; unmounted
    /// derived atoms evaluate afresh.
    fn get(&self) -> T;
}
