//! Deep link resolution.
//!
//! A deep link is a custom-scheme URI (`stillhere://checkin`) that routes a
//! tap outside the app process into a specific in-app action. The URI host
//! is the action name; future actions extend the host, not the scheme.
//!
//! Resolution is a pure, synchronous function of its input. There are no
//! retries: a malformed link cannot succeed on a second attempt, so callers
//! log the failure and fall back to the default launch.

use std::collections::BTreeMap;

use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

/// The custom scheme registered for the app. Any other scheme is rejected.
pub const APP_SCHEME: &str = "stillhere";

/// URI host for the one-tap check-in action.
pub const CHECK_IN_HOST: &str = "checkin";

/// Parsed, immutable deep link value.
///
/// Constructed only by [`resolve`] or the fixed [`DeepLink::check_in`]
/// constructor; fields are read through accessors and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepLink {
    scheme: String,
    host: String,
    path: String,
    query: BTreeMap<String, String>,
}

impl DeepLink {
    /// The fixed check-in link the widget tap dispatches:
    /// `stillhere://checkin`, empty path and query.
    pub fn check_in() -> DeepLink {
        DeepLink {
            scheme: APP_SCHEME.to_string(),
            host: CHECK_IN_HOST.to_string(),
            path: String::new(),
            query: BTreeMap::new(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The action name (`checkin` for the check-in link).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// URI path, including its leading `/` when present. Empty for the
    /// check-in link.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn is_check_in(&self) -> bool {
        self.host == CHECK_IN_HOST
    }

    /// Render back to URI form. The links this crate constructs carry no
    /// query, so values are emitted as-is without percent-encoding.
    pub fn to_uri(&self) -> String {
        let mut uri = format!("{}://{}{}", self.scheme, self.host, self.path);
        if !self.query.is_empty() {
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            uri.push('?');
            uri.push_str(&pairs.join("&"));
        }
        uri
    }
}

/// Parse a raw dispatch payload into a [`DeepLink`].
///
/// Fails with [`Error::InvalidDeepLink`] when the string is not a
/// well-formed URI or its scheme is not [`APP_SCHEME`]. Never panics.
/// Repeated keys in the query keep the last value.
pub fn resolve(uri: &str) -> Result<DeepLink> {
    let parsed = Url::parse(uri).map_err(|e| Error::InvalidDeepLink {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.scheme() != APP_SCHEME {
        return Err(Error::InvalidDeepLink {
            uri: uri.to_string(),
            reason: format!("unrecognized scheme `{}`", parsed.scheme()),
        });
    }

    let query: BTreeMap<String, String> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    Ok(DeepLink {
        scheme: parsed.scheme().to_string(),
        host: parsed.host_str().unwrap_or_default().to_string(),
        path: parsed.path().to_string(),
        query,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
