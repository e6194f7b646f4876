use crate::traits::Observable;
use core_types::{Listener, ListenerId};
use std::rc::Rc;

/// Keeps a listener attached to an atom until dropped.
#[must_use = "dropping a Subscription detaches the listener immediately"]
pub struct Subscription {
    source: Rc<dyn Observable>,
    id: Option<ListenerId>,
}

impl Subscription {
    pub fn new(source: Rc<dyn Observable>, listener: Listener) -> Self {
        let id = source.add_listener(listener);
        Self {
            source,
            id: Some(id),
        }
    }

    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.source.remove_listener(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("atom", &self.source.atom_id())
            .field("active", &self.id.is_some())
            .finish()
    }
}
