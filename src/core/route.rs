//! # Fragment Routing
//!
//! Encoding and decoding of navigation fragments. A fragment is the
//! `#!<page>` or `#!<page>?k=v&k2=v2` string that names the current page and
//! its query parameters, the same shape the server's web console links use.
//!
//! Values are percent-decoded on parse. The router never re-encodes values it
//! did not produce itself; callers building links are responsible for
//! encoding (see [`encode_fragment`]).

use std::collections::BTreeMap;

/// Prefix carried by deep links. Accepted and stripped on parse, always
/// emitted on encode.
pub const FRAGMENT_PREFIX: &str = "#!";

/// Current page plus its query parameters. One write per navigation, never
/// partially mutated: `params` is replaced wholesale so stale keys from a
/// previous page cannot leak into the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteState {
    pub current: String,
    pub params: BTreeMap<String, String>,
}

/// Parse a navigation target into `(page, params)`.
///
/// Accepts both bare targets (`templates?id=3`) and full fragments
/// (`#!templates?id=3`). The target is split on the first `?`; pairs are
/// split on `&`, then on the first `=`. Values are percent-decoded; keys are
/// taken verbatim. Pairs without a `=` map to an empty value.
pub fn parse_target(target: &str) -> (String, BTreeMap<String, String>) {
    let target = target.strip_prefix(FRAGMENT_PREFIX).unwrap_or(target);

    let (page, query) = match target.split_once('?') {
        Some((page, query)) => (page, Some(query)),
        None => (target, None),
    };

    let mut params = BTreeMap::new();
    if let Some(query) = query {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((k, v)) => (k, v),
                None => (pair, ""),
            };
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            params.insert(key.to_string(), value);
        }
    }

    (page.to_string(), params)
}

/// Encode a page name and parameter map back into a `#!` fragment.
/// Values are percent-encoded so [`parse_target`] inverts this exactly.
pub fn encode_fragment(page: &str, params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        return format!("{FRAGMENT_PREFIX}{page}");
    }
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    format!("{FRAGMENT_PREFIX}{}?{}", page, query.join("&"))
}
