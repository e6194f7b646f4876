//! Write actions accepted by bindings.

use std::fmt;

/// Marker meaning "remove this key from the URL and fall back to the
/// initial value".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Reset;

pub const RESET: Reset = Reset;

/// Outcome of an updater: a new value or the reset marker.
#[derive(Clone, Debug, PartialEq)]
pub enum Next<V> {
    Value(V),
    Reset,
}

impl<V> From<Reset> for Next<V> {
    fn from(_: Reset) -> Self {
        Next::Reset
    }
}

type Updater<V> = Box<dyn FnOnce(&V) -> Next<V>>;

pub enum SetAction<V> {
    Value(V),
    Reset,
    /// Receives the current resolved value.
    Update(Updater<V>),
}

impl<V> SetAction<V> {
    pub fn update(f: impl FnOnce(&V) -> V + 'static) -> Self {
        SetAction::Update(Box::new(move |prev| Next::Value(f(prev))))
    }

    /// Updater that may also answer with [`RESET`].
    pub fn update_or_reset(f: impl FnOnce(&V) -> Next<V> + 'static) -> Self {
        SetAction::Update(Box::new(f))
    }

    /// Resolves against the current value; `current` only runs for updaters.
    pub(crate) fn resolve(self, current: impl FnOnce() -> V) -> Next<V> {
        match self {
            SetAction::Value(v) => Next::Value(v),
            SetAction::Reset => Next::Reset,
            SetAction::Update(f) => f(&current()),
        }
    }
}

impl<V> From<Reset> for SetAction<V> {
    fn from(_: Reset) -> Self {
        SetAction::Reset
    }
}

impl<V: fmt::Debug> fmt::Debug for SetAction<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetAction::Value(v) => f.debug_tuple("Value").field(v).finish(),
            SetAction::Reset => f.write_str("Reset"),
            SetAction::Update(_) => f.write_str("Update(..)"),
        }
    }
}

/// Write action for location bindings (no reset: there is no key to drop).
pub enum LocationAction<T> {
    Value(T),
    Update(Box<dyn FnOnce(&T) -> T>),
}

impl<T> LocationAction<T> {
    pub fn update(f: impl FnOnce(&T) -> T + 'static) -> Self {
        LocationAction::Update(Box::new(f))
    }

    pub(crate) fn resolve(self, prev: &T) -> T {
        match self {
            LocationAction::Value(v) => v,
            LocationAction::Update(f) => f(prev),
        }
    }
}

impl<T> From<T> for LocationAction<T> {
    fn from(value: T) -> Self {
        LocationAction::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for LocationAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationAction::Value(v) => f.debug_tuple("Value").field(v).finish(),
            LocationAction::Update(_) => f.write_str("Update(..)"),
        }
    }
}
