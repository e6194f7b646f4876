#![allow(dead_code)]

use platform::{MemoryHistory, WindowGuard};
use std::cell::Cell;
use std::rc::Rc;

/// A `MemoryHistory` installed as this thread's window for the test's
/// lifetime.
pub struct Tab {
    pub history: Rc<MemoryHistory>,
    _guard: WindowGuard,
}

impl Tab {
    pub fn open(url: &str) -> Self {
        let history = MemoryHistory::new(url).expect("valid start url");
        let guard = platform::install(history.clone());
        Self {
            history,
            _guard: guard,
        }
    }

    /// Delivers queued `popstate`/`hashchange` events.
    pub fn settle(&self) -> usize {
        self.history.dispatch_pending()
    }

    pub fn back(&self) {
        self.history.back();
        self.settle();
    }

    pub fn forward(&self) {
        self.history.forward();
        self.settle();
    }

    /// Like a user typing a new fragment into the address bar.
    pub fn type_hash(&self, hash: &str) {
        self.history.set_hash(hash);
        self.settle();
    }
}

/// Notification counter for `subscribe` callbacks.
#[derive(Clone, Default)]
pub struct Hits(Rc<Cell<usize>>);

impl Hits {
    pub fn callback(&self) -> impl Fn() + 'static {
        let hits = self.0.clone();
        move || hits.set(hits.get() + 1)
    }

    pub fn count(&self) -> usize {
        self.0.get()
    }
}
