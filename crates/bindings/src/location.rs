//! Binding over the whole location: pathname, query, and fragment.

use crate::action::LocationAction;
use crate::binding::{Binding, SubscribeFn, Unsubscribe, listen_on, navigator_of};
use crate::error::BindingError;
use crate::snapshot::{LocationSnapshot, LocationValue};
use atom_core::{Derived, Listener, Observable, State, Subscription, Writable};
use log::{debug, trace};
use platform::{NavEventKind, NavMode, Navigator};
use std::rc::Rc;

const LOG_TARGET: &str = "navstate.location";

pub type GetLocation<T> = Rc<dyn Fn() -> T>;
pub type ApplyLocation<T> = Rc<dyn Fn(&T, ApplyOptions)>;

/// The writable atom behind a [`LocationBinding`].
pub type LocationAtom<T> = Writable<T, (LocationAction<T>, LocationWriteOptions)>;

/// Options handed to an `apply_location` adapter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    pub replace: bool,
}

/// Per-write overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocationWriteOptions {
    /// Overrides the binding's default navigation mode for this write.
    pub replace: Option<bool>,
}

impl LocationWriteOptions {
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = Some(replace);
        self
    }
}

pub struct LocationOptions<T = LocationSnapshot> {
    replace: bool,
    preloaded: Option<T>,
    navigator: Option<Rc<dyn Navigator>>,
    subscribe: Option<SubscribeFn>,
    get_location: Option<GetLocation<T>>,
    apply_location: Option<ApplyLocation<T>>,
}

impl<T> Default for LocationOptions<T> {
    fn default() -> Self {
        Self {
            replace: false,
            preloaded: None,
            navigator: None,
            subscribe: None,
            get_location: None,
            apply_location: None,
        }
    }
}

impl<T: 'static> LocationOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default navigation mode for writes: replace the current entry
    /// instead of pushing a new one.
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Initial mirror value, instead of reading the location at construction.
    pub fn preloaded(mut self, value: T) -> Self {
        self.preloaded = Some(value);
        self
    }

    pub fn navigator(mut self, navigator: Rc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replaces the `popstate` listener used to learn about navigation.
    pub fn subscribe(mut self, subscribe: impl Fn(Listener) -> Unsubscribe + 'static) -> Self {
        self.subscribe = Some(Rc::new(subscribe));
        self
    }

    pub fn get_location(mut self, get: impl Fn() -> T + 'static) -> Self {
        self.get_location = Some(Rc::new(get));
        self
    }

    pub fn apply_location(mut self, apply: impl Fn(&T, ApplyOptions) + 'static) -> Self {
        self.apply_location = Some(Rc::new(apply));
        self
    }
}

/// Mirrors the current location in a reactive atom.
///
/// Writes update the mirror first, then push (or replace) a history entry.
/// While observed, `popstate` resyncs the mirror from the navigator.
#[derive(Clone)]
pub struct LocationBinding<T: LocationValue = LocationSnapshot> {
    get_location: GetLocation<T>,
    mirror: State<T>,
    atom: LocationAtom<T>,
}

impl LocationBinding<LocationSnapshot> {
    pub fn new(options: LocationOptions) -> Self {
        let get: GetLocation<LocationSnapshot> = match options.get_location.clone() {
            Some(get) => get,
            None => {
                let navigator = options.navigator.clone();
                Rc::new(move || read_snapshot(&navigator))
            }
        };
        let apply: ApplyLocation<LocationSnapshot> = match options.apply_location.clone() {
            Some(apply) => apply,
            None => {
                let navigator = options.navigator.clone();
                Rc::new(move |snapshot: &LocationSnapshot, opts: ApplyOptions| {
                    apply_snapshot(&navigator, snapshot, opts)
                })
            }
        };
        Self::build(get, apply, options)
    }
}

impl Default for LocationBinding<LocationSnapshot> {
    fn default() -> Self {
        Self::new(LocationOptions::default())
    }
}

impl<T: LocationValue> LocationBinding<T> {
    /// Binding over a custom location representation. `get` and `apply` take
    /// precedence over any adapters set on `options`.
    pub fn with_adapter(
        get: impl Fn() -> T + 'static,
        apply: impl Fn(&T, ApplyOptions) + 'static,
        options: LocationOptions<T>,
    ) -> Self {
        Self::build(Rc::new(get), Rc::new(apply), options)
    }

    fn build(get: GetLocation<T>, apply: ApplyLocation<T>, options: LocationOptions<T>) -> Self {
        let LocationOptions {
            replace: default_replace,
            preloaded,
            navigator,
            subscribe,
            ..
        } = options;
        let subscribe = subscribe.unwrap_or_else(|| listen_on(navigator, NavEventKind::PopState));

        let initial = preloaded.unwrap_or_else(|| get());
        let mirror = State::new(initial).with_on_mount({
            let get = get.clone();
            move |set| {
                let resync: Listener = {
                    let get = get.clone();
                    let set = set.clone();
                    Rc::new(move || {
                        if set.set(get()) {
                            trace!(target: LOG_TARGET, "mirror resynced from navigator");
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
            let mirror = mirror.clone();
            move |(action, opts): (LocationAction<T>, LocationWriteOptions)| {
                let prev = mirror.get();
                let next = action.resolve(&prev);
                let replace = opts.replace.unwrap_or(default_replace);
                mirror.set(T::merge(&prev, next.clone()));
                apply(&next, ApplyOptions { replace });
            }
        });

        Self {
            get_location: get,
            mirror,
            atom,
        }
    }

    pub fn set(&self, value: T) {
        self.atom.write((LocationAction::Value(value), LocationWriteOptions::default()));
    }

    /// Reads the navigator directly, bypassing the mirror.
    pub fn current(&self) -> T {
        (self.get_location)()
    }

    pub fn mirror(&self) -> &State<T> {
        &self.mirror
    }

    pub fn atom(&self) -> &LocationAtom<T> {
        &self.atom
    }
}

impl<T: LocationValue> Binding for LocationBinding<T> {
    type Value = T;
    type Action = LocationAction<T>;
    type WriteOptions = LocationWriteOptions;

    fn read(&self) -> T {
        self.atom.get()
    }

    fn write_with(
        &self,
        action: LocationAction<T>,
        options: LocationWriteOptions,
    ) -> Result<(), BindingError> {
        self.atom.write((action, options));
        Ok(())
    }

    fn subscribe(&self, f: impl Fn() + 'static) -> Subscription {
        self.atom.subscribe(f)
    }

    fn is_mounted(&self) -> bool {
        self.atom.is_mounted()
    }
}

fn read_snapshot(navigator: &Option<Rc<dyn Navigator>>) -> LocationSnapshot {
    navigator_of(navigator)
        .location()
        .map(|url| LocationSnapshot::from_url(&url))
        .unwrap_or_default()
}

/// Merges the present fields of `snapshot` into the current URL and commits
/// it, unless that URL is already current.
fn apply_snapshot(
    navigator: &Option<Rc<dyn Navigator>>,
    snapshot: &LocationSnapshot,
    options: ApplyOptions,
) {
    let nav = navigator_of(navigator);
    let Some(current) = nav.location() else {
        debug!(target: LOG_TARGET, "no navigable context, dropping location write");
        return;
    };
    let mut next = current.clone();
    snapshot.apply_to(&mut next);
    if next == current {
        trace!(target: LOG_TARGET, "{next} is already current");
        return;
    }
    let mode = NavMode::from_replace(options.replace);
    debug!(target: LOG_TARGET, "{mode:?} {next}");
    nav.commit(&next, mode);
}
