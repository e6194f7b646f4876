use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type ListenerId = u64;

/// Callback invoked on a change notification.
pub type Listener = Rc<dyn Fn()>;

/// Whether a history mutation grows the stack or overwrites the current entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NavMode {
    #[default]
    Push,
    Replace,
}

impl NavMode {
    pub fn from_replace(replace: bool) -> Self {
        if replace { NavMode::Replace } else { NavMode::Push }
    }

    pub fn is_replace(self) -> bool {
        matches!(self, NavMode::Replace)
    }
}

/// Ordered set of listeners with stable ids.
///
/// Dispatch works on a snapshot of the list, so listeners may attach or
/// detach other listeners (or themselves) while being notified.
#[derive(Default)]
pub struct ListenerList {
    next_id: Cell<ListenerId>,
    entries: RefCell<Vec<(ListenerId, Listener)>>,
}

impl ListenerList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. Returns its id and whether it is the first one.
    pub fn add(&self, listener: Listener) -> (ListenerId, bool) {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        let mut entries = self.entries.borrow_mut();
        entries.push((id, listener));
        (id, entries.len() == 1)
    }

    /// Removes a listener. Returns `true` if it existed and was the last one.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let Some(pos) = entries.iter().position(|(entry_id, _)| *entry_id == id) else {
            return false;
        };
        entries.remove(pos);
        entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn notify(&self) {
        let snapshot: Vec<Listener> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener();
        }
    }
}

impl std::fmt::Debug for ListenerList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerList")
            .field("len", &self.len())
            .finish()
    }
}
