mod common;

use bindings::{
    Binding, BindingError, PrimitiveKind, SearchParamBinding, SearchParamOptions, SearchValue,
    SetAction,
};
use common::Tab;

#[test]
fn primitives_round_trip() {
    let tab = Tab::open("http://localhost/");
    let name = SearchParamBinding::new("name", String::from("John"), SearchParamOptions::new());
    let ratio = SearchParamBinding::new("ratio", 1.0_f64, SearchParamOptions::new());
    let page = SearchParamBinding::new("page", 1_u32, SearchParamOptions::new());
    let open = SearchParamBinding::new("open", false, SearchParamOptions::new());

    name.set("Jane Doe".into()).unwrap();
    ratio.set(0.5).unwrap();
    page.set(12).unwrap();
    open.set(true).unwrap();

    assert_eq!(tab.history.search(), "?name=Jane+Doe&ratio=0.5&page=12&open=true");
    assert_eq!(name.read(), "Jane Doe");
    assert_eq!(ratio.read(), 0.5);
    assert_eq!(page.read(), 12);
    assert!(open.read());
}

#[test]
fn mismatched_text_falls_back_to_default() {
    let _tab = Tab::open("http://localhost/?count=abc&flag=yes&empty=&frac=2.5");
    assert_eq!(SearchParamBinding::new("count", 7.0, SearchParamOptions::new()).read(), 7.0);
    assert!(SearchParamBinding::new("flag", true, SearchParamOptions::new()).read());
    assert_eq!(SearchParamBinding::new("empty", 3.0, SearchParamOptions::new()).read(), 3.0);
    assert_eq!(SearchParamBinding::new("frac", 1_i64, SearchParamOptions::new()).read(), 1);
    assert_eq!(SearchParamBinding::new("frac", 1.0, SearchParamOptions::new()).read(), 2.5);
}

#[test]
fn integer_overflow_falls_back_to_default() {
    let _tab = Tab::open("http://localhost/?n=18446744073709551616&m=9223372036854775808&blank=%20%20");
    assert_eq!(SearchParamBinding::new("n", 7_u64, SearchParamOptions::new()).read(), 7);
    assert_eq!(SearchParamBinding::new("m", 7_i64, SearchParamOptions::new()).read(), 7);
    assert_eq!(SearchParamBinding::new("blank", 3.0, SearchParamOptions::new()).read(), 0.0);
}

#[test]
fn updater_receives_resolved_value() {
    let tab = Tab::open("http://localhost/?page=oops");
    let page = SearchParamBinding::new("page", 1_i32, SearchParamOptions::new());
    page.update(|p| p + 1).unwrap();
    assert_eq!(tab.history.search(), "?page=2");
}

#[test]
fn dynamic_value_rejects_other_kinds() {
    let tab = Tab::open("http://localhost/");
    let limit = SearchParamBinding::new("limit", SearchValue::Number(10.0), SearchParamOptions::new());

    let err = limit.set(SearchValue::from("ten")).unwrap_err();
    assert_eq!(
        err,
        BindingError::UnsupportedValue {
            key: "limit".into(),
            expected: PrimitiveKind::Number,
            found: PrimitiveKind::String,
        }
    );
    assert_eq!(tab.history.length(), 1);

    limit.set(SearchValue::Number(25.0)).unwrap();
    assert_eq!(tab.history.search(), "?limit=25");
}

#[test]
fn reset_removes_the_key() {
    let tab = Tab::open("http://localhost/?q=rust&page=3");
    let page = SearchParamBinding::new("page", 1_u32, SearchParamOptions::new());
    page.reset().unwrap();
    assert_eq!(tab.history.search(), "?q=rust");
    assert_eq!(page.read(), 1);
}

#[test]
fn replace_mode_keeps_history_length() {
    let tab = Tab::open("http://localhost/");
    let q = SearchParamBinding::new("q", String::new(), SearchParamOptions::new().replace(true));
    for text in ["r", "ru", "rus", "rust"] {
        q.write(SetAction::Value(text.to_string())).unwrap();
    }
    assert_eq!(tab.history.length(), 1);
    assert_eq!(tab.history.search(), "?q=rust");
}

#[test]
fn manual_edit_is_observed() {
    let tab = Tab::open("http://localhost/?page=1");
    let page = SearchParamBinding::new("page", 1_u32, SearchParamOptions::new());
    let _sub = page.subscribe(|| {});

    page.set(2).unwrap();
    page.set(3).unwrap();
    tab.back();
    assert_eq!(page.read(), 2);
}
