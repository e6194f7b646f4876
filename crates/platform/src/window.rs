//! Per-thread "global window".
//!
//! Browser code reaches for `window` implicitly; bindings do the same through
//! [`window()`]. The slot is thread-local, so parallel test threads each get
//! their own tab.

use crate::{Detached, Navigator};
use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static WINDOW: RefCell<Option<Rc<dyn Navigator>>> = const { RefCell::new(None) };
}

/// Returns the installed navigator, or a [`Detached`] host if none is.
pub fn window() -> Rc<dyn Navigator> {
    WINDOW
        .with(|slot| slot.borrow().clone())
        .unwrap_or_else(|| Rc::new(Detached::new()))
}

/// Installs `nav` as this thread's window until the guard is dropped.
#[must_use = "the previous window is restored when the guard drops"]
pub fn install(nav: Rc<dyn Navigator>) -> WindowGuard {
    let previous = WINDOW.with(|slot| slot.borrow_mut().replace(nav));
    WindowGuard { previous }
}

pub struct WindowGuard {
    previous: Option<Rc<dyn Navigator>>,
}

impl Drop for WindowGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        WINDOW.with(|slot| *slot.borrow_mut() = previous);
    }
}
