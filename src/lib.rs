//! Native core of the Still Here hybrid app: the deep-link check-in
//! bridge.
//!
//! One tap on the home-screen widget dispatches `stillhere://checkin`; the
//! OS brings the app shell to the foreground, the shell resolves the link
//! and forwards a check-in event into the webview's script context, where
//! plugins registered in the [`bridge::PluginRegistry`] expose native
//! capability (widget data, widget refresh) back to script.
//!
//! The hybrid runtime itself is not part of this crate. Its entry points
//! are the [`widget::WidgetManager`] and [`host::ScriptContext`] traits the
//! host framework implements, plus the [`host::ShellHost::start`] startup
//! hook, which guarantees plugin registration completes before the bridge
//! accepts script calls.

pub mod bridge;
pub mod checkin;
pub mod deeplink;
pub mod error;
pub mod host;
pub mod store;
pub mod widget;

pub use error::{Error, Result};
