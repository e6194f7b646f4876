use bindings::{
    Binding, HashBinding, LocationBinding, QueryParamBinding, SearchParamBinding,
    SearchParamOptions,
};
use platform::Navigator;

#[test]
fn every_binding_builds_without_a_window() {
    assert!(platform::window().location().is_none());

    let location = LocationBinding::default();
    let hash = HashBinding::json("count", 1);
    let query = QueryParamBinding::json("q", String::from("none"));
    let search = SearchParamBinding::new("page", 1_u32, SearchParamOptions::new());

    assert!(location.read().is_empty());
    assert_eq!(hash.read(), 1);
    assert_eq!(query.read(), "none");
    assert_eq!(search.read(), 1);
}

#[test]
fn writes_without_a_window_update_the_mirror_only() {
    let hash = HashBinding::json("count", 1);
    let _sub = hash.subscribe(|| {});
    hash.set(5).unwrap();
    assert_eq!(hash.read(), 5);

    let search = SearchParamBinding::new("page", 1_u32, SearchParamOptions::new());
    search.set(4).unwrap();
    assert_eq!(search.read(), 4);
    search.reset().unwrap();
    assert_eq!(search.read(), 1);
}
