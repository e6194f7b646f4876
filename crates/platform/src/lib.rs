//! Navigation host surface: the History/Location capability bindings talk to.
//!
//! Everything a binding needs from a browser tab goes through [`Navigator`]:
//! reading the current URL, pushing or replacing history entries, and
//! listening for `popstate`/`hashchange`. Three hosts are provided:
//! - [`MemoryHistory`]: an in-memory tab with a real entry stack and a queued
//!   event loop, used by tests and non-browser hosts
//! - [`Detached`]: no navigable context at all (server-side, CLI)
//! - whatever the embedder installs with [`install`]
//!
//! Bindings that are not handed a navigator explicitly resolve [`window()`]
//! on every call, so installing a host after a binding was built still works.

mod detached;
mod memory;
mod window;

pub use bus::{NavEvent, NavEventKind};
pub use core_types::{Listener, ListenerId, NavMode};
pub use detached::Detached;
pub use memory::MemoryHistory;
pub use url::Url;
pub use window::{WindowGuard, install, window};

/// History/Location capability of a browsing context.
pub trait Navigator {
    /// Current URL, or `None` when there is no navigable context.
    fn location(&self) -> Option<Url>;

    /// Appends an entry after the current one, dropping the forward branch.
    /// Fires no events.
    fn push_state(&self, url: &Url);

    /// Overwrites the current entry. Fires no events.
    fn replace_state(&self, url: &Url);

    fn history_length(&self) -> usize;

    fn add_event_listener(&self, kind: NavEventKind, listener: Listener) -> ListenerId;

    fn remove_event_listener(&self, id: ListenerId);

    fn commit(&self, url: &Url, mode: NavMode) {
        match mode {
            NavMode::Push => self.push_state(url),
            NavMode::Replace => self.replace_state(url),
        }
    }
}
