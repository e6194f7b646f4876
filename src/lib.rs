//! URL-bound reactive state.
//!
//! Re-exports the binding adapters together with the reactive cells they
//! are built from and the navigation hosts they run against.

pub use bindings::*;

pub mod atom {
    pub use atom_core::*;
}

pub mod nav {
    pub use platform::*;
}
