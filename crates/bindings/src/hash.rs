//! Binding for one key inside the URL fragment, e.g. `#count=2&tab=1`.

use crate::action::{Next, Reset, SetAction};
use crate::binding::{Binding, SubscribeFn, Unsubscribe, listen_on, navigator_of};
use crate::codec::Codec;
use crate::error::BindingError;
use crate::params::SearchParams;
use crate::snapshot::hash_of;
use atom_core::{Derived, Listener, Observable, State, Subscription, Writable};
use log::{debug, trace, warn};
use platform::{NavEventKind, NavMode, Navigator, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Once;

const LOG_TARGET: &str = "navstate.hash";

static REPLACE_STATE_DEPRECATION: Once = Once::new();

/// How a new fragment reaches the navigator.
#[derive(Clone, Default)]
pub enum SetHash {
    /// New history entry with the same pathname and query.
    #[default]
    Push,
    /// Overwrite the current entry.
    Replace,
    /// Receives the fragment without its `#` and owns the navigation.
    Custom(Rc<dyn Fn(&str)>),
}

impl SetHash {
    pub fn custom(f: impl Fn(&str) + 'static) -> Self {
        SetHash::Custom(Rc::new(f))
    }
}

impl fmt::Debug for SetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetHash::Push => f.write_str("Push"),
            SetHash::Replace => f.write_str("Replace"),
            SetHash::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub struct HashOptions<V> {
    codec: Codec<V>,
    set_hash: SetHash,
    navigator: Option<Rc<dyn Navigator>>,
    subscribe: Option<SubscribeFn>,
}

impl<V: Serialize + DeserializeOwned + 'static> Default for HashOptions<V> {
    fn default() -> Self {
        Self::with_codec(Codec::json())
    }
}

impl<V: 'static> HashOptions<V> {
    /// Options for value types without a JSON form.
    pub fn with_codec(codec: Codec<V>) -> Self {
        Self {
            codec,
            set_hash: SetHash::Push,
            navigator: None,
            subscribe: None,
        }
    }

    pub fn serialize(mut self, serialize: impl Fn(&V) -> String + 'static) -> Self {
        self.codec = self.codec.with_serialize(serialize);
        self
    }

    /// `None` marks malformed input; the binding then reads its initial value.
    pub fn deserialize(mut self, deserialize: impl Fn(&str) -> Option<V> + 'static) -> Self {
        self.codec = self.codec.with_deserialize(deserialize);
        self
    }

    pub fn set_hash(mut self, set_hash: SetHash) -> Self {
        self.set_hash = set_hash;
        self
    }

    #[deprecated(note = "use `set_hash(SetHash::Replace)`")]
    pub fn replace_state(mut self, replace: bool) -> Self {
        REPLACE_STATE_DEPRECATION.call_once(|| {
            warn!(
                target: LOG_TARGET,
                "`replace_state` is deprecated, use `set_hash(SetHash::Replace)` instead"
            );
        });
        if replace {
            self.set_hash = SetHash::Replace;
        }
        self
    }

    pub fn navigator(mut self, navigator: Rc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replaces the `hashchange` listener used to learn about edits.
    pub fn subscribe(mut self, subscribe: impl Fn(Listener) -> Unsubscribe + 'static) -> Self {
        self.subscribe = Some(Rc::new(subscribe));
        self
    }
}

/// Per-write overrides.
#[derive(Clone, Debug, Default)]
pub struct HashWriteOptions {
    pub set_hash: Option<SetHash>,
}

impl HashWriteOptions {
    pub fn set_hash(mut self, set_hash: SetHash) -> Self {
        self.set_hash = Some(set_hash);
        self
    }
}

pub type HashAtom<V> = Writable<V, (SetAction<V>, HashWriteOptions), Result<(), BindingError>>;

struct HashInner<V> {
    key: String,
    initial: V,
    codec: Codec<V>,
    set_hash: SetHash,
    navigator: Option<Rc<dyn Navigator>>,
    /// Raw string last seen for `key`; `None` while the key is absent.
    cache: RefCell<Option<String>>,
    mirror: State<V>,
    atom: HashAtom<V>,
}

/// Value of a single key in the fragment's `key=value&...` list.
///
/// Independent of [`LocationBinding`](crate::LocationBinding): it listens for
/// `hashchange` itself and composes with other keys by rewriting only its own
/// entry.
pub struct HashBinding<V> {
    inner: Rc<HashInner<V>>,
}

impl<V> Clone for HashBinding<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Clone + PartialEq + 'static> HashBinding<V> {
    pub fn new(key: impl Into<String>, initial: V, options: HashOptions<V>) -> Self {
        let key = key.into();
        let HashOptions {
            codec,
            set_hash,
            navigator,
            subscribe,
        } = options;
        let subscribe =
            subscribe.unwrap_or_else(|| listen_on(navigator.clone(), NavEventKind::HashChange));

        let inner = Rc::new_cyclic(|weak: &Weak<HashInner<V>>| {
            let raw = navigator_of(&navigator)
                .location()
                .and_then(|url| raw_param(&url, &key));
            let value = decode(&key, &codec, &initial, raw.as_deref());

            let mirror = State::new(value).with_on_mount({
                let weak = weak.clone();
                move |_| {
                    let resync: Listener = {
                        let weak = weak.clone();
                        Rc::new(move || {
                            if let Some(inner) = weak.upgrade() {
                                inner.sync_from_location();
                            }
                        })
                    };
                    let unsubscribe = subscribe(resync.clone());
                    resync();
                    Some(unsubscribe)
                }
            });

            let read = Derived::new({
                let mirror = mirror.clone();
                move |get| get.get(&mirror)
            });
            let atom = Writable::new(read, {
                let weak = weak.clone();
                move |(action, opts): (SetAction<V>, HashWriteOptions)| match weak.upgrade() {
                    Some(inner) => inner.write(action, opts),
                    None => Ok(()),
                }
            });

            HashInner {
                key,
                initial,
                codec,
                set_hash,
                navigator,
                cache: RefCell::new(raw),
                mirror,
                atom,
            }
        });
        Self { inner }
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn initial(&self) -> &V {
        &self.inner.initial
    }

    pub fn set(&self, value: V) -> Result<(), BindingError> {
        self.write(SetAction::Value(value))
    }

    /// Removes the key from the fragment and reverts to the initial value.
    pub fn reset(&self) -> Result<(), BindingError> {
        self.write(Reset)
    }

    pub fn update(&self, f: impl FnOnce(&V) -> V + 'static) -> Result<(), BindingError> {
        self.write(SetAction::update(f))
    }

    pub fn atom(&self) -> &HashAtom<V> {
        &self.inner.atom
    }
}

impl<V: Clone + PartialEq + Serialize + DeserializeOwned + 'static> HashBinding<V> {
    /// JSON-encoded binding with default options.
    pub fn json(key: impl Into<String>, initial: V) -> Self {
        Self::new(key, initial, HashOptions::default())
    }
}

impl<V: Clone + PartialEq + 'static> HashInner<V> {
    /// Pulls the key from the navigator. Unchanged raw strings stop here,
    /// before decoding, so observers see nothing.
    fn sync_from_location(&self) {
        let Some(url) = navigator_of(&self.navigator).location() else {
            return;
        };
        let raw = raw_param(&url, &self.key);
        if *self.cache.borrow() == raw {
            trace!(target: LOG_TARGET, "{}: fragment entry unchanged", self.key);
            return;
        }
        self.cache.replace(raw.clone());
        let value = decode(&self.key, &self.codec, &self.initial, raw.as_deref());
        self.mirror.set(value);
    }

    fn write(&self, action: SetAction<V>, opts: HashWriteOptions) -> Result<(), BindingError> {
        let next = action.resolve(|| self.mirror.get());
        let nav = navigator_of(&self.navigator);
        let location = nav.location();
        let mut params = location
            .as_ref()
            .map(|url| SearchParams::parse(&hash_of(url)))
            .unwrap_or_default();

        let (raw, value) = match next {
            Next::Value(value) => {
                let raw = self
                    .codec
                    .encode(&value)
                    .map_err(|e| BindingError::from_codec(&self.key, e))?;
                params.set(&self.key, &raw);
                (Some(raw), value)
            }
            Next::Reset => {
                params.delete(&self.key);
                (None, self.initial.clone())
            }
        };

        // cache and mirror first: the navigator reports back asynchronously
        self.cache.replace(raw);
        self.mirror.set(value);

        let set_hash = opts.set_hash.unwrap_or_else(|| self.set_hash.clone());
        write_hash(&*nav, location, &params.to_string(), &set_hash);
        Ok(())
    }
}

fn raw_param(url: &Url, key: &str) -> Option<String> {
    SearchParams::parse(&hash_of(url)).get(key).map(str::to_string)
}

fn decode<V: Clone + 'static>(key: &str, codec: &Codec<V>, initial: &V, raw: Option<&str>) -> V {
    let Some(raw) = raw else {
        return initial.clone();
    };
    codec.decode(raw).unwrap_or_else(|| {
        debug!(target: LOG_TARGET, "{key}: cannot decode {raw:?}, using initial value");
        initial.clone()
    })
}

/// Commits `fragment` keeping the current pathname and query. An empty
/// fragment drops the `#` entirely.
fn write_hash(nav: &dyn Navigator, location: Option<Url>, fragment: &str, set_hash: &SetHash) {
    let mode = match set_hash {
        SetHash::Custom(f) => {
            f(fragment);
            return;
        }
        SetHash::Push => NavMode::Push,
        SetHash::Replace => NavMode::Replace,
    };
    let Some(current) = location else {
        debug!(target: LOG_TARGET, "no navigable context, dropping fragment write");
        return;
    };
    let mut next = current.clone();
    next.set_fragment((!fragment.is_empty()).then_some(fragment));
    if next == current {
        trace!(target: LOG_TARGET, "{next} is already current");
        return;
    }
    debug!(target: LOG_TARGET, "{mode:?} {next}");
    nav.commit(&next, mode);
}

impl<V: Clone + PartialEq + 'static> Binding for HashBinding<V> {
    type Value = V;
    type Action = SetAction<V>;
    type WriteOptions = HashWriteOptions;

    fn read(&self) -> V {
        self.inner.atom.get()
    }

    fn write_with(&self, action: SetAction<V>, options: HashWriteOptions) -> Result<(), BindingError> {
        self.inner.atom.write((action, options))
    }

    fn subscribe(&self, f: impl Fn() + 'static) -> Subscription {
        self.inner.atom.subscribe(f)
    }

    fn is_mounted(&self) -> bool {
        self.inner.atom.is_mounted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::MemoryHistory;
    use std::cell::Cell;

    fn tab(start: &str) -> Rc<MemoryHistory> {
        MemoryHistory::new(start).unwrap()
    }

    fn options<V: Serialize + DeserializeOwned + 'static>(tab: &Rc<MemoryHistory>) -> HashOptions<V> {
        HashOptions::default().navigator(tab.clone())
    }

    #[test]
    fn reads_key_at_construction() {
        let tab = tab("http://localhost/#count=5&other=x");
        let count = HashBinding::new("count", 1, options(&tab));
        assert_eq!(count.read(), 5);
    }

    #[test]
    fn question_mark_after_hash_is_ignored() {
        let tab = tab("http://localhost/#?a=5");
        let a = HashBinding::new("a", 0, options(&tab));
        assert_eq!(a.read(), 5);
    }

    #[test]
    fn malformed_entry_falls_back_to_initial() {
        let tab = tab("http://localhost/#count=abc");
        let count = HashBinding::new("count", 1, options(&tab));
        assert_eq!(count.read(), 1);
    }

    #[test]
    fn write_keeps_pathname_and_query() {
        let tab = tab("http://localhost/page?x=1");
        let count = HashBinding::new("count", 1, options(&tab));
        count.set(2).unwrap();
        assert_eq!(tab.href(), "http://localhost/page?x=1#count=2");
        assert_eq!(tab.length(), 2);
    }

    #[test]
    fn replace_mode_keeps_history_length() {
        let tab = tab("http://localhost/");
        let count = HashBinding::new(
            "count",
            0,
            options(&tab).set_hash(SetHash::Replace),
        );
        for n in 1..=3 {
            count.set(n).unwrap();
        }
        assert_eq!(tab.length(), 1);
        assert_eq!(tab.hash(), "#count=3");
    }

    #[test]
    fn custom_set_hash_receives_bare_fragment() {
        let tab = tab("http://localhost/#a=1");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let b = HashBinding::new(
            "b",
            String::new(),
            options(&tab).set_hash(SetHash::custom({
                let seen = seen.clone();
                move |fragment| seen.borrow_mut().push(fragment.to_string())
            })),
        );
        b.set("hi there".into()).unwrap();
        assert_eq!(*seen.borrow(), vec!["a=1&b=%22hi+there%22"]);
        // custom setter owns navigation
        assert_eq!(tab.length(), 1);
        assert_eq!(b.read(), "hi there");
    }

    #[test]
    fn per_call_set_hash_override() {
        let tab = tab("http://localhost/");
        let count = HashBinding::new("count", 0, options(&tab));
        count
            .write_with(
                SetAction::Value(4),
                HashWriteOptions::default().set_hash(SetHash::Replace),
            )
            .unwrap();
        assert_eq!(tab.length(), 1);
        assert_eq!(tab.hash(), "#count=4");
    }

    #[test]
    #[allow(deprecated)]
    fn deprecated_replace_state_flag_replaces() {
        let tab = tab("http://localhost/");
        let count = HashBinding::new("count", 0, options(&tab).replace_state(true));
        count.set(1).unwrap();
        assert_eq!(tab.length(), 1);
    }

    #[test]
    fn unchanged_raw_entry_does_not_notify() {
        let tab = tab("http://localhost/#count=1");
        let count = HashBinding::new("count", 0, options(&tab));
        let hits = Rc::new(Cell::new(0));
        let _sub = count.subscribe({
            let hits = hits.clone();
            move || hits.set(hits.get() + 1)
        });

        // another key changes; ours stays `1`
        tab.set_hash("count=1&other=2");
        tab.dispatch_pending();
        assert_eq!(hits.get(), 0);

        tab.set_hash("count=7&other=2");
        tab.dispatch_pending();
        assert_eq!(hits.get(), 1);
        assert_eq!(count.read(), 7);
    }

    #[test]
    fn serialize_error_surfaces_with_key() {
        let tab = tab("http://localhost/");
        let codec = Codec::fallible(
            |_: &u8| Err(crate::codec::CodecError::Serialize("nope".into())),
            |raw| raw.parse().ok(),
        );
        let b = HashBinding::new("n", 0_u8, HashOptions::with_codec(codec).navigator(tab.clone()));
        let err = b.set(3).unwrap_err();
        assert_eq!(err.key(), "n");
        assert_eq!(b.read(), 0);
        assert_eq!(tab.length(), 1);
    }
}
