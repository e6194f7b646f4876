//! Reactive state bound to the browser URL.
//!
//! Four adapters keep an atom and the address bar in sync in both
//! directions:
//! - [`LocationBinding`]: pathname, query, and fragment as one snapshot
//! - [`HashBinding`]: one key inside the fragment (`#count=2`)
//! - [`QueryParamBinding`]: one codec-encoded key of the query string
//! - [`SearchParamBinding`]: one string, number, or boolean query key
//!
//! Writes update the in-memory mirror before touching history, so a read
//! right after a write sees the new value. Navigation the user performs
//! (back, forward, editing the URL) flows back through `popstate` and
//! `hashchange` while the binding is observed.
//!
//! ```
//! use bindings::{Binding, HashBinding, RESET};
//! use platform::MemoryHistory;
//!
//! let tab = MemoryHistory::new("http://localhost/").unwrap();
//! let _window = platform::install(tab.clone());
//!
//! let count = HashBinding::json("count", 1);
//! let _sub = count.subscribe(|| {});
//! count.set(2).unwrap();
//! assert_eq!(tab.hash(), "#count=2");
//!
//! tab.set_hash("count=3");
//! tab.dispatch_pending();
//! assert_eq!(count.read(), 3);
//!
//! count.write(RESET).unwrap();
//! assert_eq!(tab.hash(), "");
//! assert_eq!(count.read(), 1);
//! ```

mod action;
mod binding;
mod codec;
mod error;
mod hash;
mod location;
mod params;
mod query;
mod search;
mod snapshot;

pub use action::{LocationAction, Next, RESET, Reset, SetAction};
pub use binding::{Binding, SubscribeFn, Unsubscribe};
pub use codec::{Codec, CodecError};
pub use error::BindingError;
pub use hash::{HashAtom, HashBinding, HashOptions, HashWriteOptions, SetHash};
pub use location::{
    ApplyLocation, ApplyOptions, GetLocation, LocationAtom, LocationBinding, LocationOptions,
    LocationWriteOptions,
};
pub use params::SearchParams;
pub use query::{ParamWriteOptions, QueryParamAtom, QueryParamBinding, QueryParamOptions};
pub use search::{
    Primitive, PrimitiveKind, SearchParamBinding, SearchParamOptions, SearchPrimitive, SearchValue,
};
pub use snapshot::{LocationSnapshot, LocationValue};
