//! In-memory browsing context.
//!
//! Invariants:
//! - `entries` is never empty and `index < entries.len()`.
//! - Script-driven mutations (`push_state`/`replace_state`) never queue
//!   events; user-driven navigation (`set_hash`, `back`, `forward`, `go`)
//!   queues them on the bus. Nothing is delivered until
//!   [`MemoryHistory::dispatch_pending`] runs.

use crate::Navigator;
use bus::{EventBus, NavEvent, NavEventKind};
use core_types::{Listener, ListenerId};
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

struct Entries {
    entries: Vec<Url>,
    index: usize,
}

pub struct MemoryHistory {
    history: RefCell<Entries>,
    bus: EventBus,
}

impl MemoryHistory {
    pub fn new(start: &str) -> Result<Rc<Self>, url::ParseError> {
        let url = Url::parse(start)?;
        Ok(Rc::new(Self {
            history: RefCell::new(Entries {
                entries: vec![url],
                index: 0,
            }),
            bus: EventBus::new(),
        }))
    }

    pub fn current(&self) -> Url {
        let h = self.history.borrow();
        h.entries[h.index].clone()
    }

    pub fn href(&self) -> String {
        self.current().to_string()
    }

    pub fn pathname(&self) -> String {
        self.current().path().to_string()
    }

    /// `location.search`: empty, or the query with its leading `?`.
    pub fn search(&self) -> String {
        match self.current().query() {
            Some(q) if !q.is_empty() => format!("?{q}"),
            _ => String::new(),
        }
    }

    /// `location.hash`: empty, or the fragment with its leading `#`.
    pub fn hash(&self) -> String {
        match self.current().fragment() {
            Some(f) if !f.is_empty() => format!("#{f}"),
            _ => String::new(),
        }
    }

    /// `history.length`.
    pub fn length(&self) -> usize {
        self.history.borrow().entries.len()
    }

    /// Number of events queued and not yet delivered.
    pub fn pending_events(&self) -> usize {
        self.bus.pending()
    }

    pub fn listener_count(&self, kind: NavEventKind) -> usize {
        self.bus.listener_count(kind)
    }

    /// Like assigning `location.hash`: navigates to the same document with a
    /// new fragment. A leading `#` is optional.
    pub fn set_hash(&self, hash: &str) {
        let fragment = hash.strip_prefix('#').unwrap_or(hash);
        let old = self.current();
        if old.fragment().unwrap_or("") == fragment {
            return;
        }
        let mut next = old.clone();
        next.set_fragment(Some(fragment));
        self.push_state(&next);
        self.bus.emit(NavEvent::PopState {
            href: next.to_string(),
        });
        self.bus.emit(NavEvent::HashChange {
            old_url: old.to_string(),
            new_url: next.to_string(),
        });
    }

    pub fn back(&self) {
        self.go(-1);
    }

    pub fn forward(&self) {
        self.go(1);
    }

    /// Moves `delta` entries through the stack. Out-of-range moves are
    /// ignored, as in a browser.
    pub fn go(&self, delta: isize) {
        let (old, next) = {
            let mut h = self.history.borrow_mut();
            let Some(target) = h.index.checked_add_signed(delta) else {
                return;
            };
            if delta == 0 || target >= h.entries.len() {
                return;
            }
            let old = h.entries[h.index].clone();
            h.index = target;
            (old, h.entries[target].clone())
        };

        self.bus.emit(NavEvent::PopState {
            href: next.to_string(),
        });
        if old.fragment() != next.fragment() {
            self.bus.emit(NavEvent::HashChange {
                old_url: old.to_string(),
                new_url: next.to_string(),
            });
        }
    }

    /// Runs queued `popstate`/`hashchange` listeners, like a turn of the
    /// browser event loop. Returns the number of events delivered.
    pub fn dispatch_pending(&self) -> usize {
        self.bus.dispatch_pending()
    }
}

impl Navigator for MemoryHistory {
    fn location(&self) -> Option<Url> {
        Some(self.current())
    }

    fn push_state(&self, url: &Url) {
        let mut h = self.history.borrow_mut();
        // truncate forward branch
        let keep = h.index + 1;
        h.entries.truncate(keep);
        h.entries.push(url.clone());
        h.index = h.entries.len() - 1;
        log::trace!(target: "navstate.platform", "pushState {url} (length {})", h.entries.len());
    }

    fn replace_state(&self, url: &Url) {
        let mut h = self.history.borrow_mut();
        let index = h.index;
        h.entries[index] = url.clone();
        log::trace!(target: "navstate.platform", "replaceState {url}");
    }

    fn history_length(&self) -> usize {
        self.length()
    }

    fn add_event_listener(&self, kind: NavEventKind, listener: Listener) -> ListenerId {
        self.bus.listen(kind, listener)
    }

    fn remove_event_listener(&self, id: ListenerId) {
        self.bus.unlisten(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn count(history: &MemoryHistory, kind: NavEventKind) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        history.add_event_listener(kind, Rc::new(move || h.set(h.get() + 1)));
        hits
    }

    #[test]
    fn push_grows_and_replace_overwrites() {
        let history = MemoryHistory::new("http://localhost/").unwrap();
        assert_eq!(history.length(), 1);

        history.push_state(&url("http://localhost/1"));
        history.push_state(&url("http://localhost/2"));
        assert_eq!(history.length(), 3);
        assert_eq!(history.pathname(), "/2");

        history.replace_state(&url("http://localhost/3"));
        assert_eq!(history.length(), 3);
        assert_eq!(history.pathname(), "/3");
    }

    #[test]
    fn push_after_back_truncates_forward_branch() {
        let history = MemoryHistory::new("http://localhost/").unwrap();
        history.push_state(&url("http://localhost/1"));
        history.push_state(&url("http://localhost/2"));
        history.back();
        history.back();
        assert_eq!(history.pathname(), "/");

        history.push_state(&url("http://localhost/x"));
        assert_eq!(history.length(), 2);
        history.forward();
        assert_eq!(history.pathname(), "/x");
    }

    #[test]
    fn script_mutations_fire_no_events() {
        let history = MemoryHistory::new("http://localhost/").unwrap();
        let pops = count(&history, NavEventKind::PopState);
        history.push_state(&url("http://localhost/#a=1"));
        history.replace_state(&url("http://localhost/#a=2"));
        assert_eq!(history.dispatch_pending(), 0);
        assert_eq!(pops.get(), 0);
    }

    #[test]
    fn traversal_fires_popstate_after_dispatch() {
        let history = MemoryHistory::new("http://localhost/").unwrap();
        let pops = count(&history, NavEventKind::PopState);
        let hashes = count(&history, NavEventKind::HashChange);
        history.push_state(&url("http://localhost/1"));

        history.back();
        assert_eq!(pops.get(), 0);
        assert_eq!(history.pending_events(), 1);
        history.dispatch_pending();
        assert_eq!(pops.get(), 1);
        assert_eq!(hashes.get(), 0);
        assert_eq!(history.pathname(), "/");
    }

    #[test]
    fn out_of_range_traversal_is_ignored() {
        let history = MemoryHistory::new("http://localhost/").unwrap();
        history.back();
        history.forward();
        history.go(5);
        assert_eq!(history.pending_events(), 0);
        assert_eq!(history.pathname(), "/");
    }

    #[test]
    fn set_hash_pushes_and_fires_hashchange() {
        let history = MemoryHistory::new("http://localhost/?q=foo").unwrap();
        let hashes = count(&history, NavEventKind::HashChange);

        history.set_hash("count=3");
        assert_eq!(history.hash(), "#count=3");
        assert_eq!(history.search(), "?q=foo");
        assert_eq!(history.length(), 2);
        history.dispatch_pending();
        assert_eq!(hashes.get(), 1);

        // same fragment: nothing happens
        history.set_hash("#count=3");
        assert_eq!(history.length(), 2);
        assert_eq!(history.dispatch_pending(), 0);
    }

    #[test]
    fn back_across_fragments_fires_hashchange() {
        let history = MemoryHistory::new("http://localhost/").unwrap();
        let hashes = count(&history, NavEventKind::HashChange);
        history.push_state(&url("http://localhost/#a=1"));
        history.back();
        history.dispatch_pending();
        assert_eq!(hashes.get(), 1);
        assert_eq!(history.hash(), "");
    }
}
