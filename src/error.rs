//! Crate-wide error taxonomy.
//!
//! Every failure in this crate is one of these variants. None of them is
//! retried internally: a malformed deep link cannot succeed on retry, and a
//! failed widget update is picked up by the next natural redraw cycle.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or wrong-scheme deep link. Recovered locally: the caller
    /// logs it and falls back to the default launch behavior.
    #[error("invalid deep link `{uri}`: {reason}")]
    InvalidDeepLink { uri: String, reason: String },

    /// The OS widget-manager update call failed for one placed widget
    /// instance. Isolated per instance; siblings are unaffected.
    #[error("widget update failed for instance {instance_id}: {details}")]
    WidgetUpdateFailed { instance_id: i32, details: String },

    /// A plugin was registered after the bridge started accepting script
    /// calls. Programming error: the web layer may already have queried the
    /// capability list.
    #[error("plugin `{name}` registered after the bridge started")]
    LateRegistration { name: String },

    /// Two plugins tried to claim the same name. Rejected, never
    /// overwritten.
    #[error("plugin `{name}` is already registered")]
    DuplicatePlugin { name: String },

    /// The script layer asked for a capability no plugin registered.
    #[error("no plugin registered under `{name}`")]
    UnknownCapability { name: String },

    /// A plugin descriptor failed validation before registration.
    #[error("invalid plugin descriptor `{name}`: {reason}")]
    InvalidDescriptor { name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
