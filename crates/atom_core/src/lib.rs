//! # atom_core
//!
//! Minimal fine-grained reactive cells for a single-threaded event loop.
//!
//! - [`State`]: a plain observable cell, with an optional mount hook that runs
//!   when the first observer attaches and cleans up when the last one leaves
//! - [`Derived`]: a read-only cell computed from other cells through a
//!   [`Getter`], re-evaluated when any dependency notifies
//! - [`Writable`]: a derived read side plus an arbitrary write handler
//! - [`Subscription`]: RAII handle for an attached observer
//!
//! ## Example
//!
//! ```
//! use atom_core::{Derived, Observable, Readable, State};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let count = State::new(1);
//! let doubled = Derived::new({
//!     let count = count.clone();
//!     move |get| get.get(&count) * 2
//! });
//!
//! let seen = Rc::new(Cell::new(0));
//! let _sub = doubled.subscribe({
//!     let seen = seen.clone();
//!     let doubled = doubled.clone();
//!     move || seen.set(doubled.get())
//! });
//!
//! count.set(5);
//! assert_eq!(seen.get(), 10);
//! ```

mod derived;
mod id;
mod state;
mod subscription;
mod traits;
mod writable;

pub use core_types::{Listener, ListenerId};
pub use derived::{Derived, Getter};
pub use id::AtomId;
pub use state::{Cleanup, OnMount, State, StateSetter};
pub use subscription::Subscription;
pub use traits::{Observable, Readable};
pub use writable::Writable;
