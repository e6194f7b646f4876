use crate::Navigator;
use bus::NavEventKind;
use core_types::{Listener, ListenerId};
use std::cell::Cell;
use url::Url;

/// Host without a window: no location, no history, no events.
///
/// Listeners are accepted (and handed an id) so that mount/unmount code
/// stays symmetric, but they are never called.
#[derive(Debug, Default)]
pub struct Detached {
    next_id: Cell<ListenerId>,
}

impl Detached {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Navigator for Detached {
    fn location(&self) -> Option<Url> {
        None
    }

    fn push_state(&self, url: &Url) {
        log::debug!(target: "navstate.platform", "no window; dropping pushState({url})");
    }

    fn replace_state(&self, url: &Url) {
        log::debug!(target: "navstate.platform", "no window; dropping replaceState({url})");
    }

    fn history_length(&self) -> usize {
        0
    }

    fn add_event_listener(&self, _kind: NavEventKind, _listener: Listener) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        id
    }

    fn remove_event_listener(&self, _id: ListenerId) {}
}
