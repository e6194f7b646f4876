//! Binding for one key of the query string, layered on [`LocationBinding`].

use crate::action::{Next, Reset, SetAction};
use crate::binding::{Binding, Unsubscribe};
use crate::codec::Codec;
use crate::error::BindingError;
use crate::location::{LocationBinding, LocationOptions, LocationWriteOptions};
use crate::params::SearchParams;
use crate::snapshot::LocationSnapshot;
use atom_core::{Derived, Listener, Observable, Subscription, Writable};
use log::debug;
use platform::Navigator;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::rc::{Rc, Weak};

const LOG_TARGET: &str = "navstate.query";

/// Per-write overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParamWriteOptions {
    pub replace: Option<bool>,
}

impl ParamWriteOptions {
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = Some(replace);
        self
    }
}

pub struct QueryParamOptions<V> {
    pub(crate) codec: Codec<V>,
    pub(crate) location: Option<LocationBinding>,
    pub(crate) location_options: LocationOptions,
    pub(crate) log_target: &'static str,
}

impl<V: Serialize + DeserializeOwned + 'static> Default for QueryParamOptions<V> {
    fn default() -> Self {
        Self::with_codec(Codec::json())
    }
}

impl<V: 'static> QueryParamOptions<V> {
    pub fn with_codec(codec: Codec<V>) -> Self {
        Self {
            codec,
            location: None,
            location_options: LocationOptions::default(),
            log_target: LOG_TARGET,
        }
    }

    pub fn serialize(mut self, serialize: impl Fn(&V) -> String + 'static) -> Self {
        self.codec = self.codec.with_serialize(serialize);
        self
    }

    pub fn deserialize(mut self, deserialize: impl Fn(&str) -> Option<V> + 'static) -> Self {
        self.codec = self.codec.with_deserialize(deserialize);
        self
    }

    /// Shares an existing location binding (and its mirror) instead of
    /// building a private one. Location options set here are then ignored.
    pub fn location(mut self, location: LocationBinding) -> Self {
        self.location = Some(location);
        self
    }

    pub fn location_options(mut self, options: LocationOptions) -> Self {
        self.location_options = options;
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.location_options = self.location_options.replace(replace);
        self
    }

    pub fn navigator(mut self, navigator: Rc<dyn Navigator>) -> Self {
        self.location_options = self.location_options.navigator(navigator);
        self
    }

    pub fn subscribe(mut self, subscribe: impl Fn(Listener) -> Unsubscribe + 'static) -> Self {
        self.location_options = self.location_options.subscribe(subscribe);
        self
    }
}

pub type QueryParamAtom<V> =
    Writable<V, (SetAction<V>, ParamWriteOptions), Result<(), BindingError>>;

struct ParamInner<V> {
    key: String,
    codec: Codec<V>,
    location: LocationBinding,
    log_target: &'static str,
    atom: QueryParamAtom<V>,
}

/// Value of a single query-string key.
///
/// Reads derive from the location mirror; writes rewrite only this key and
/// hand the location binding a `{search_params}`-only snapshot, so pathname
/// and fragment are left alone.
pub struct QueryParamBinding<V> {
    inner: Rc<ParamInner<V>>,
}

impl<V> Clone for QueryParamBinding<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Clone + PartialEq + 'static> QueryParamBinding<V> {
    pub fn new(key: impl Into<String>, initial: V, options: QueryParamOptions<V>) -> Self {
        let key = key.into();
        let QueryParamOptions {
            codec,
            location,
            location_options,
            log_target,
        } = options;
        let location = location.unwrap_or_else(|| LocationBinding::new(location_options));

        let inner = Rc::new_cyclic(|weak: &Weak<ParamInner<V>>| {
            let read = Derived::new({
                let key = key.clone();
                let codec = codec.clone();
                let location = location.atom().clone();
                move |get| {
                    let snapshot = get.get(&location);
                    let raw = snapshot.search_params.as_ref().and_then(|p| p.get(&key));
                    match raw {
                        None => initial.clone(),
                        Some(raw) => codec.decode(raw).unwrap_or_else(|| {
                            debug!(target: log_target, "{key}: cannot decode {raw:?}, using initial value");
                            initial.clone()
                        }),
                    }
                }
            });
            let atom = Writable::new(read, {
                let weak = weak.clone();
                move |(action, opts): (SetAction<V>, ParamWriteOptions)| match weak.upgrade() {
                    Some(inner) => inner.write(action, opts),
                    None => Ok(()),
                }
            });
            ParamInner {
                key,
                codec,
                location,
                log_target,
                atom,
            }
        });
        Self { inner }
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn set(&self, value: V) -> Result<(), BindingError> {
        self.write(SetAction::Value(value))
    }

    /// Removes the key from the query string and reverts to the initial value.
    pub fn reset(&self) -> Result<(), BindingError> {
        self.write(Reset)
    }

    pub fn update(&self, f: impl FnOnce(&V) -> V + 'static) -> Result<(), BindingError> {
        self.write(SetAction::update(f))
    }

    pub fn location(&self) -> &LocationBinding {
        &self.inner.location
    }

    pub fn atom(&self) -> &QueryParamAtom<V> {
        &self.inner.atom
    }
}

impl<V: Clone + PartialEq + Serialize + DeserializeOwned + 'static> QueryParamBinding<V> {
    pub fn json(key: impl Into<String>, initial: V) -> Self {
        Self::new(key, initial, QueryParamOptions::default())
    }
}

impl<V: Clone + PartialEq + 'static> ParamInner<V> {
    /// The query as the navigator has it now, or the mirror's copy when
    /// there is no navigable context.
    fn current_params(&self) -> SearchParams {
        self.location
            .current()
            .search_params
            .or_else(|| self.location.mirror().with(|snap| snap.search_params.clone()))
            .unwrap_or_default()
    }

    fn write(&self, action: SetAction<V>, opts: ParamWriteOptions) -> Result<(), BindingError> {
        let next = action.resolve(|| self.atom.read_side().get());
        let mut params = self.current_params();
        match next {
            Next::Value(value) => {
                let raw = self
                    .codec
                    .encode(&value)
                    .map_err(|e| BindingError::from_codec(&self.key, e))?;
                params.set(&self.key, &raw);
            }
            Next::Reset => {
                debug!(target: self.log_target, "{}: reset", self.key);
                params.delete(&self.key);
            }
        }
        self.location.write_with(
            LocationSnapshot::default().with_search_params(params).into(),
            LocationWriteOptions {
                replace: opts.replace,
            },
        )
    }
}

impl<V: Clone + PartialEq + 'static> Binding for QueryParamBinding<V> {
    type Value = V;
    type Action = SetAction<V>;
    type WriteOptions = ParamWriteOptions;

    fn read(&self) -> V {
        self.inner.atom.get()
    }

    fn write_with(&self, action: SetAction<V>, options: ParamWriteOptions) -> Result<(), BindingError> {
        self.inner.atom.write((action, options))
    }

    fn subscribe(&self, f: impl Fn() + 'static) -> Subscription {
        self.inner.atom.subscribe(f)
    }

    fn is_mounted(&self) -> bool {
        self.inner.atom.is_mounted()
    }
}
