//! # Request Context
//!
//! The parameters of one inbound request, keyed by name, in the order the
//! keys first appeared. A context is built fresh for every dispatch and is
//! read-only afterwards: the pre-dispatch hook, the discriminator lookup and
//! argument binding all read from the same instance.
//!
//! ## Ordering
//!
//! Direct-callable handlers receive parameter values positionally, so the
//! order is part of the contract. A key that occurs more than once keeps the
//! position of its first occurrence and the value of its last, which is how
//! form decoders that fold repeated keys into a map behave.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;

use crate::method::HttpMethod;

/// Maximum inline parameters before heap allocation
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered parameter storage
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Read-only view of the current request's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    method: HttpMethod,
    params: ParamVec,
}

impl RequestContext {
    /// Build a context from ordered `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(method: HttpMethod, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = ParamVec::new();
        // Key positions, so repeated keys are found without rescanning `params`
        let mut positions: HashMap<Arc<str>, usize> = HashMap::new();
        for (k, v) in pairs {
            let k = k.as_ref();
            match positions.get(k) {
                Some(&idx) => params[idx].1 = v.into(),
                None => {
                    let name: Arc<str> = Arc::from(k);
                    positions.insert(Arc::clone(&name), params.len());
                    params.push((name, v.into()));
                }
            }
        }
        Self { method, params }
    }

    /// Parse an `application/x-www-form-urlencoded` payload.
    #[must_use]
    pub fn from_urlencoded(method: HttpMethod, input: &[u8]) -> Self {
        Self::from_pairs(method, url::form_urlencoded::parse(input).into_owned())
    }

    /// The method of the request this context belongs to.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.params.iter().any(|(k, _)| k.as_ref() == name)
    }

    /// Iterate `(name, value)` pairs in context order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Every value in context order, skipping the entry stored under `key`.
    ///
    /// The entry is excluded by name, so the result does not depend on where
    /// `key` sits in the parameter order.
    #[must_use]
    pub fn values_except(&self, key: &str) -> Vec<String> {
        self.params
            .iter()
            .filter(|(k, _)| k.as_ref() != key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Sorted snapshot of the parameters.
    /// Note: This allocates - use get() in hot paths
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl Serialize for RequestContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for (k, v) in &self.params {
            map.serialize_entry(k.as_ref(), v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_urlencoded_decodes_and_keeps_order() {
        let ctx = RequestContext::from_urlencoded(HttpMethod::Post, b"b=2&a=hello+world&c=%3D");
        let pairs: Vec<_> = ctx.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "hello world"), ("c", "=")]);
        assert_eq!(ctx.method(), HttpMethod::Post);
    }

    #[test]
    fn test_repeated_key_keeps_first_position_last_value() {
        let ctx = RequestContext::from_pairs(
            HttpMethod::Get,
            [("x", "1"), ("y", "2"), ("x", "3")],
        );
        let pairs: Vec<_> = ctx.iter().collect();
        assert_eq!(pairs, vec![("x", "3"), ("y", "2")]);
    }

    #[test]
    fn test_many_keys_with_late_repeat() {
        let mut pairs: Vec<(String, String)> = (0..20_000)
            .map(|i| (format!("k{i}"), i.to_string()))
            .collect();
        pairs.push(("k7".to_string(), "last".to_string()));
        pairs.push(("action".to_string(), "x".to_string()));

        let ctx = RequestContext::from_pairs(HttpMethod::Post, pairs);
        assert_eq!(ctx.len(), 20_001);
        assert_eq!(ctx.get("k7"), Some("last"));
        let names: Vec<&str> = ctx.iter().take(9).map(|(k, _)| k).collect();
        assert_eq!(names, vec!["k0", "k1", "k2", "k3", "k4", "k5", "k6", "k7", "k8"]);
        assert_eq!(ctx.iter().nth(7), Some(("k7", "last")));
        assert_eq!(ctx.iter().last(), Some(("action", "x")));
        assert_eq!(ctx.values_except("action")[19_999], "19999");
    }

    #[test]
    fn test_values_except_excludes_by_name() {
        let ctx = RequestContext::from_pairs(
            HttpMethod::Get,
            [("a", "1"), ("action", "x"), ("b", "2")],
        );
        assert_eq!(ctx.values_except("action"), vec!["1", "2"]);
        assert_eq!(ctx.values_except("missing").len(), 3);
    }

    #[test]
    fn test_serializes_as_object() {
        let ctx = RequestContext::from_pairs(HttpMethod::Get, [("action", "list"), ("page", "2")]);
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"action":"list","page":"2"}"#);
    }

    #[test]
    fn test_empty_context() {
        let ctx = RequestContext::from_urlencoded(HttpMethod::Get, b"");
        assert!(ctx.is_empty());
        assert!(!ctx.contains_key("action"));
        assert_eq!(ctx.get("action"), None);
    }
}
