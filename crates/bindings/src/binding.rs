//! The surface every adapter exposes, plus navigator plumbing they share.

use crate::error::BindingError;
use atom_core::Subscription;
use core_types::Listener;
use platform::{NavEventKind, Navigator};
use std::rc::Rc;

/// Detaches a browser listener installed by a [`SubscribeFn`].
pub type Unsubscribe = Box<dyn FnOnce()>;

/// Installs `callback` on some change source and returns its remover.
pub type SubscribeFn = Rc<dyn Fn(Listener) -> Unsubscribe>;

/// Read/write handle synchronizing one piece of state with the URL.
pub trait Binding {
    type Value: Clone + PartialEq + 'static;
    type Action;
    type WriteOptions: Default;

    /// Current value. Consistent with every write this code path issued,
    /// even before the browser reports the navigation back.
    fn read(&self) -> Self::Value;

    fn write_with(
        &self,
        action: Self::Action,
        options: Self::WriteOptions,
    ) -> Result<(), BindingError>;

    fn write(&self, action: impl Into<Self::Action>) -> Result<(), BindingError> {
        self.write_with(action.into(), Self::WriteOptions::default())
    }

    /// Observes the value. The first observer installs the browser listener
    /// and resyncs from the URL; dropping the last one removes it.
    fn subscribe(&self, f: impl Fn() + 'static) -> Subscription;

    fn is_mounted(&self) -> bool;
}

/// The explicit navigator, or the thread's window as of this call.
pub(crate) fn navigator_of(explicit: &Option<Rc<dyn Navigator>>) -> Rc<dyn Navigator> {
    match explicit {
        Some(nav) => nav.clone(),
        None => platform::window(),
    }
}

/// Subscribe function listening for `kind` events on a navigator.
pub(crate) fn listen_on(navigator: Option<Rc<dyn Navigator>>, kind: NavEventKind) -> SubscribeFn {
    Rc::new(move |listener| {
        let nav = navigator_of(&navigator);
        let id = nav.add_event_listener(kind, listener);
        let unsubscribe: Unsubscribe = Box::new(move || nav.remove_event_listener(id));
        unsubscribe
    })
}
