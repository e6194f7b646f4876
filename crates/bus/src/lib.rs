use core_types::{Listener, ListenerId};
use std::cell::{Cell, RefCell};
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavEventKind {
    PopState,
    HashChange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavEvent {
    // History traversal or fragment navigation
    PopState { href: String },
    // Fragment changed between two URLs of the same document
    HashChange { old_url: String, new_url: String },
}

impl NavEvent {
    pub fn kind(&self) -> NavEventKind {
        match self {
            NavEvent::PopState { .. } => NavEventKind::PopState,
            NavEvent::HashChange { .. } => NavEventKind::HashChange,
        }
    }
}

/// Queued navigation events plus the listeners they are delivered to.
///
/// `emit` only enqueues; nothing runs until `dispatch_pending` is called,
/// the same way a browser delivers `popstate`/`hashchange` on a later turn
/// of the event loop rather than inside the call that caused them.
pub struct EventBus {
    evt_tx: Sender<NavEvent>,
    evt_rx: Receiver<NavEvent>,
    queued: Cell<usize>,
    next_id: Cell<ListenerId>,
    listeners: RefCell<Vec<(ListenerId, NavEventKind, Listener)>>,
}

impl EventBus {
    pub fn new() -> Self {
        let (evt_tx, evt_rx) = mpsc::channel();
        Self {
            evt_tx,
            evt_rx,
            queued: Cell::new(0),
            next_id: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn listen(&self, kind: NavEventKind, listener: Listener) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.listeners.borrow_mut().push((id, kind, listener));
        id
    }

    /// Returns `false` if no listener had this id.
    pub fn unlisten(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(entry_id, _, _)| *entry_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self, kind: NavEventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    pub fn emit(&self, event: NavEvent) {
        if self.evt_tx.send(event).is_ok() {
            self.queued.set(self.queued.get() + 1);
        }
    }

    pub fn pending(&self) -> usize {
        self.queued.get()
    }

    /// Delivers every queued event, including events queued by listeners
    /// while dispatching. Returns how many events were delivered.
    pub fn dispatch_pending(&self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.evt_rx.try_recv() {
            self.queued.set(self.queued.get().saturating_sub(1));
            let kind = event.kind();
            log::trace!(target: "navstate.platform", "dispatch {event:?}");
            let targets: Vec<Listener> = self
                .listeners
                .borrow()
                .iter()
                .filter(|(_, k, _)| *k == kind)
                .map(|(_, _, listener)| listener.clone())
                .collect();
            for listener in targets {
                listener();
            }
            delivered += 1;
        }
        delivered
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
