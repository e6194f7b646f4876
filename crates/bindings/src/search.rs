//! Typed query-string binding restricted to string, number, and boolean.
//!
//! The kind is taken from the default value. Raw query text that does not
//! parse as that kind falls back to the default with a warning; it never
//! errors.

use crate::action::{Reset, SetAction};
use crate::binding::{Binding, Unsubscribe};
use crate::codec::{Codec, CodecError};
use crate::error::BindingError;
use crate::location::{LocationBinding, LocationOptions};
use crate::query::{ParamWriteOptions, QueryParamAtom, QueryParamBinding, QueryParamOptions};
use atom_core::{Listener, Subscription};
use log::warn;
use platform::Navigator;
use std::fmt;
use std::rc::Rc;

const LOG_TARGET: &str = "navstate.search";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        })
    }
}

/// A query value already parsed as the kind its binding expects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive<'a> {
    String(&'a str),
    Number { raw: &'a str, value: f64 },
    Boolean(bool),
}

/// Runtime-typed primitive, for bindings whose kind is chosen at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl SearchValue {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            SearchValue::String(_) => PrimitiveKind::String,
            SearchValue::Number(_) => PrimitiveKind::Number,
            SearchValue::Boolean(_) => PrimitiveKind::Boolean,
        }
    }
}

impl From<&str> for SearchValue {
    fn from(value: &str) -> Self {
        SearchValue::String(value.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(value: String) -> Self {
        SearchValue::String(value)
    }
}

impl From<f64> for SearchValue {
    fn from(value: f64) -> Self {
        SearchValue::Number(value)
    }
}

impl From<bool> for SearchValue {
    fn from(value: bool) -> Self {
        SearchValue::Boolean(value)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Value types a [`SearchParamBinding`] can hold. Sealed: the set of kinds
/// is closed.
pub trait SearchPrimitive: sealed::Sealed + Clone + PartialEq + fmt::Debug + 'static {
    fn kind(&self) -> PrimitiveKind;

    /// Canonical query form.
    fn to_param(&self) -> String;

    /// Converts a parsed primitive of `self.kind()`; `None` when it does not
    /// fit (e.g. `2.5` for an integer binding). `self` is the default value.
    fn from_primitive(&self, value: Primitive<'_>) -> Option<Self>;
}

impl sealed::Sealed for String {}

impl SearchPrimitive for String {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::String
    }

    fn to_param(&self) -> String {
        self.clone()
    }

    fn from_primitive(&self, value: Primitive<'_>) -> Option<Self> {
        match value {
            Primitive::String(s) => Some(s.to_string()),
            _ => None,
        }
    }
}

impl sealed::Sealed for bool {}

impl SearchPrimitive for bool {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Boolean
    }

    fn to_param(&self) -> String {
        self.to_string()
    }

    fn from_primitive(&self, value: Primitive<'_>) -> Option<Self> {
        match value {
            Primitive::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl sealed::Sealed for f64 {}

impl SearchPrimitive for f64 {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Number
    }

    fn to_param(&self) -> String {
        format_number(*self)
    }

    fn from_primitive(&self, value: Primitive<'_>) -> Option<Self> {
        match value {
            Primitive::Number { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl sealed::Sealed for f32 {}

impl SearchPrimitive for f32 {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Number
    }

    fn to_param(&self) -> String {
        format_number(f64::from(*self))
    }

    fn from_primitive(&self, value: Primitive<'_>) -> Option<Self> {
        match value {
            Primitive::Number { value, .. } => Some(value as f32),
            _ => None,
        }
    }
}

macro_rules! integer_primitive {
    ($($ty:ty => $value_bits:expr),*) => {$(
        impl sealed::Sealed for $ty {}

        impl SearchPrimitive for $ty {
            fn kind(&self) -> PrimitiveKind {
                PrimitiveKind::Number
            }

            fn to_param(&self) -> String {
                self.to_string()
            }

            fn from_primitive(&self, value: Primitive<'_>) -> Option<Self> {
                let Primitive::Number { raw, value } = value else {
                    return None;
                };
                // exact parse first so large values keep full precision
                if let Ok(n) = raw.trim().parse::<$ty>() {
                    return Some(n);
                }
                // `MAX as f64` rounds up to 2^N for 64-bit types, so the upper
                // bound has to be exclusive
                let in_range = value >= <$ty>::MIN as f64 && value < 2f64.powi($value_bits);
                (value.fract() == 0.0 && in_range).then(|| value as $ty)
            }
        }
    )*};
}

integer_primitive!(i32 => 31, i64 => 63, u32 => 32, u64 => 64, usize => usize::BITS as i32);

impl sealed::Sealed for SearchValue {}

impl SearchPrimitive for SearchValue {
    fn kind(&self) -> PrimitiveKind {
        SearchValue::kind(self)
    }

    fn to_param(&self) -> String {
        match self {
            SearchValue::String(s) => s.clone(),
            SearchValue::Number(n) => format_number(*n),
            SearchValue::Boolean(b) => b.to_string(),
        }
    }

    fn from_primitive(&self, value: Primitive<'_>) -> Option<Self> {
        Some(match value {
            Primitive::String(s) => SearchValue::String(s.to_string()),
            Primitive::Number { value, .. } => SearchValue::Number(value),
            Primitive::Boolean(b) => SearchValue::Boolean(b),
        })
    }
}

/// Number text as a browser's `String(n)` would print it.
fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.is_infinite() {
        String::from(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let s = format!("{n:e}");
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        }
    } else {
        n.to_string()
    }
}

/// Numeric conversion with browser `Number(text)` rules: surrounding
/// whitespace is ignored and blank text is zero. `Infinity` and
/// `0x`/`0o`/`0b` literals are accepted, Rust-only spellings such as `inf`
/// or `nan` are not.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    match s {
        "" => return Some(0.0),
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    for (prefixes, radix) in [(["0x", "0X"], 16), (["0o", "0O"], 8), (["0b", "0B"], 2)] {
        if let Some(digits) = prefixes.iter().find_map(|p| s.strip_prefix(p)) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    s.parse().ok()
}

/// Decodes `raw` as the kind of `default`, warning and falling back to it
/// on mismatch.
fn resolve_value<P: SearchPrimitive>(key: &str, default: &P, raw: &str) -> P {
    match default.kind() {
        PrimitiveKind::String => default
            .from_primitive(Primitive::String(raw))
            .unwrap_or_else(|| default.clone()),
        PrimitiveKind::Number => {
            if raw.is_empty() {
                warn!(
                    target: LOG_TARGET,
                    "Empty string provided for key \"{key}\". Falling back to default value."
                );
                return default.clone();
            }
            let Some(value) = parse_number(raw) else {
                warn!(target: LOG_TARGET, "Expected a number for key \"{key}\", got \"{raw}\".");
                return default.clone();
            };
            default
                .from_primitive(Primitive::Number { raw, value })
                .unwrap_or_else(|| {
                    warn!(
                        target: LOG_TARGET,
                        "Number \"{raw}\" for key \"{key}\" does not fit {default:?}. Falling back to default value."
                    );
                    default.clone()
                })
        }
        PrimitiveKind::Boolean => {
            let parsed = match raw {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            };
            match parsed.and_then(|b| default.from_primitive(Primitive::Boolean(b))) {
                Some(value) => value,
                None => {
                    warn!(target: LOG_TARGET, "Expected a boolean for key \"{key}\", got \"{raw}\".");
                    default.clone()
                }
            }
        }
    }
}

fn primitive_codec<P: SearchPrimitive>(key: String, default: P) -> Codec<P> {
    let expected = default.kind();
    let encode_key = key.clone();
    Codec::fallible(
        move |value: &P| {
            let found = value.kind();
            if found != expected {
                warn!(target: LOG_TARGET, "Unsupported value type for key \"{encode_key}\": {found}");
                return Err(CodecError::UnsupportedValue { expected, found });
            }
            Ok(value.to_param())
        },
        move |raw| Some(resolve_value(&key, &default, raw)),
    )
}

#[derive(Default)]
pub struct SearchParamOptions {
    location: Option<LocationBinding>,
    location_options: LocationOptions,
}

impl SearchParamOptions {
    pub fn new() -> Self {
        Self::default()
    }

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

/// Query-string binding whose type is one of the [`SearchPrimitive`] kinds.
pub struct SearchParamBinding<P> {
    param: QueryParamBinding<P>,
}

impl<P> Clone for SearchParamBinding<P> {
    fn clone(&self) -> Self {
        Self {
            param: self.param.clone(),
        }
    }
}

impl<P: SearchPrimitive> SearchParamBinding<P> {
    pub fn new(key: impl Into<String>, default: P, options: SearchParamOptions) -> Self {
        let key = key.into();
        let codec = primitive_codec(key.clone(), default.clone());
        let param = QueryParamBinding::new(
            key,
            default,
            QueryParamOptions {
                codec,
                location: options.location,
                location_options: options.location_options,
                log_target: LOG_TARGET,
            },
        );
        Self { param }
    }

    pub fn key(&self) -> &str {
        self.param.key()
    }

    pub fn set(&self, value: P) -> Result<(), BindingError> {
        self.param.set(value)
    }

    pub fn reset(&self) -> Result<(), BindingError> {
        self.write(Reset)
    }

    pub fn update(&self, f: impl FnOnce(&P) -> P + 'static) -> Result<(), BindingError> {
        self.param.update(f)
    }

    pub fn location(&self) -> &LocationBinding {
        self.param.location()
    }

    pub fn atom(&self) -> &QueryParamAtom<P> {
        self.param.atom()
    }
}

impl<P: SearchPrimitive> Binding for SearchParamBinding<P> {
    type Value = P;
    type Action = SetAction<P>;
    type WriteOptions = ParamWriteOptions;

    fn read(&self) -> P {
        self.param.read()
    }

    fn write_with(&self, action: SetAction<P>, options: ParamWriteOptions) -> Result<(), BindingError> {
        self.param.write_with(action, options)
    }

    fn subscribe(&self, f: impl Fn() + 'static) -> Subscription {
        self.param.subscribe(f)
    }

    fn is_mounted(&self) -> bool {
        self.param.is_mounted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_parsing_follows_browser_rules() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("0x1F"), Some(31.0));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("12px"), None);
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("  "), Some(0.0));
    }

    #[test]
    fn numbers_print_like_a_browser() {
        assert_eq!(2.0_f64.to_param(), "2");
        assert_eq!(0.25_f64.to_param(), "0.25");
        assert_eq!((-0.0_f64).to_param(), "0");
        assert_eq!(f64::INFINITY.to_param(), "Infinity");
        assert_eq!(7_u32.to_param(), "7");
        assert_eq!(1e20_f64.to_param(), "100000000000000000000");
        assert_eq!(1e21_f64.to_param(), "1e+21");
        assert_eq!((-1.5e22_f64).to_param(), "-1.5e+22");
        assert_eq!(0.000001_f64.to_param(), "0.000001");
        assert_eq!(1e-7_f64.to_param(), "1e-7");
    }

    #[test]
    fn resolve_by_default_kind() {
        assert_eq!(resolve_value("q", &String::from("d"), "hello"), "hello");
        assert_eq!(resolve_value("n", &1.0_f64, "2.5"), 2.5);
        assert_eq!(resolve_value("n", &1.0_f64, ""), 1.0);
        assert_eq!(resolve_value("n", &1.0_f64, "  "), 0.0);
        assert_eq!(resolve_value("n", &1.0_f64, "abc"), 1.0);
        assert!(resolve_value("b", &false, "true"));
        assert!(!resolve_value("b", &true, "false"));
        assert!(resolve_value("b", &true, "yes"));
    }

    #[test]
    fn integers_reject_fractions_and_overflow() {
        assert_eq!(resolve_value("p", &1_i32, "3"), 3);
        assert_eq!(resolve_value("p", &1_i32, "3.0"), 3);
        assert_eq!(resolve_value("p", &1_i32, "3.5"), 1);
        assert_eq!(resolve_value("p", &1_u32, "-4"), 1);
        assert_eq!(resolve_value("p", &1_i32, "1e12"), 1);
        assert_eq!(resolve_value("p", &0_u64, "18446744073709551615"), u64::MAX);
    }

    #[test]
    fn integer_bounds_are_exclusive_above() {
        assert_eq!(resolve_value("n", &7_u64, "18446744073709551616"), 7);
        assert_eq!(resolve_value("n", &7_u64, "1.8446744073709552e19"), 7);
        assert_eq!(resolve_value("n", &7_i64, "9223372036854775808"), 7);
        assert_eq!(resolve_value("n", &7_i64, "-9223372036854775808"), i64::MIN);
        assert_eq!(resolve_value("n", &7_u32, "4294967296"), 7);
        assert_eq!(resolve_value("n", &7_u32, "4294967295"), u32::MAX);
        assert_eq!(resolve_value("n", &7_u32, "4.294967295e9"), u32::MAX);
        assert_eq!(resolve_value("n", &7_i32, "2147483648"), 7);
        assert_eq!(resolve_value("n", &7_i32, "-2147483648"), i32::MIN);
    }

    #[test]
    fn dynamic_value_keeps_default_kind() {
        let default = SearchValue::from(10.0);
        assert_eq!(resolve_value("n", &default, "4"), SearchValue::Number(4.0));
        assert_eq!(resolve_value("n", &default, "x"), default);

        let codec = primitive_codec("n".into(), default);
        assert_eq!(codec.encode(&SearchValue::Number(3.0)).unwrap(), "3");
        assert_eq!(
            codec.encode(&SearchValue::from("three")),
            Err(CodecError::UnsupportedValue {
                expected: PrimitiveKind::Number,
                found: PrimitiveKind::String,
            })
        );
    }
}
