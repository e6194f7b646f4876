//! Point-in-time capture of a URL's pathname, query, and fragment.

use crate::params::SearchParams;
use url::Url;

/// Location value as seen by bindings.
///
/// Every field is optional: a snapshot read without a navigable context is
/// entirely empty, and a write only touches the fields it carries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationSnapshot {
    pub pathname: Option<String>,
    pub search_params: Option<SearchParams>,
    /// Fragment including its leading `#`, or empty.
    pub hash: Option<String>,
}

impl LocationSnapshot {
    pub fn from_url(url: &Url) -> Self {
        Self {
            pathname: Some(url.path().to_string()),
            search_params: Some(SearchParams::parse(url.query().unwrap_or(""))),
            hash: Some(hash_of(url)),
        }
    }

    pub fn with_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = Some(pathname.into());
        self
    }

    pub fn with_search_params(mut self, params: SearchParams) -> Self {
        self.search_params = Some(params);
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pathname.is_none() && self.search_params.is_none() && self.hash.is_none()
    }

    /// Fields present in `next` win; absent ones keep their current value.
    pub fn merged(&self, next: &LocationSnapshot) -> Self {
        Self {
            pathname: next.pathname.clone().or_else(|| self.pathname.clone()),
            search_params: next
                .search_params
                .clone()
                .or_else(|| self.search_params.clone()),
            hash: next.hash.clone().or_else(|| self.hash.clone()),
        }
    }

    /// Writes the present fields into `url`, leaving the rest untouched.
    pub fn apply_to(&self, url: &mut Url) {
        if let Some(pathname) = &self.pathname {
            url.set_path(pathname);
        }
        if let Some(params) = &self.search_params {
            let query = params.to_string();
            url.set_query((!query.is_empty()).then_some(query.as_str()));
        }
        if let Some(hash) = &self.hash {
            let fragment = hash.strip_prefix('#').unwrap_or(hash);
            url.set_fragment((!fragment.is_empty()).then_some(fragment));
        }
    }
}

/// `location.hash` for `url`.
pub(crate) fn hash_of(url: &Url) -> String {
    match url.fragment() {
        Some(f) if !f.is_empty() => format!("#{f}"),
        _ => String::new(),
    }
}

/// Values a location binding can hold.
///
/// `merge` decides what the mirror holds after a write of `next`; the
/// default keeps exactly what was written.
pub trait LocationValue: Clone + PartialEq + 'static {
    fn merge(prev: &Self, next: Self) -> Self {
        let _ = prev;
        next
    }
}

impl LocationValue for LocationSnapshot {
    fn merge(prev: &Self, next: Self) -> Self {
        prev.merged(&next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn from_url_mirrors_location_fields() {
        let snap = LocationSnapshot::from_url(&url("http://localhost/a/b?x=1&y=two#frag"));
        assert_eq!(snap.pathname.as_deref(), Some("/a/b"));
        assert_eq!(snap.search_params.as_ref().and_then(|p| p.get("y")), Some("two"));
        assert_eq!(snap.hash.as_deref(), Some("#frag"));

        let bare = LocationSnapshot::from_url(&url("http://localhost/"));
        assert_eq!(bare.hash.as_deref(), Some(""));
        assert!(bare.search_params.unwrap().is_empty());
    }

    #[test]
    fn apply_touches_only_present_fields() {
        let mut target = url("http://localhost/keep?q=foo#h=1");
        LocationSnapshot::default()
            .with_search_params(SearchParams::parse("q=bar"))
            .apply_to(&mut target);
        assert_eq!(target.as_str(), "http://localhost/keep?q=bar#h=1");

        LocationSnapshot::default()
            .with_pathname("/next")
            .apply_to(&mut target);
        assert_eq!(target.as_str(), "http://localhost/next?q=bar#h=1");
    }

    #[test]
    fn empty_search_and_hash_drop_their_delimiters() {
        let mut target = url("http://localhost/p?q=1#h");
        LocationSnapshot::default()
            .with_search_params(SearchParams::new())
            .with_hash("")
            .apply_to(&mut target);
        assert_eq!(target.as_str(), "http://localhost/p");
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let prev = LocationSnapshot::from_url(&url("http://localhost/a?x=1#h"));
        let next = LocationSnapshot::default().with_pathname("/b");
        let merged = LocationSnapshot::merge(&prev, next);
        assert_eq!(merged.pathname.as_deref(), Some("/b"));
        assert_eq!(merged.search_params, prev.search_params);
        assert_eq!(merged.hash.as_deref(), Some("#h"));
    }
}
