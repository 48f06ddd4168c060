//! App shell host: startup sequencing and dispatch routing.
//!
//! Thin glue with one hard contract: every plugin registers before the
//! bridge starts accepting script calls. [`ShellHost::start`] enforces it
//! by construction: it consumes the [`PluginRegistry`] by value and seals
//! it before any lookup path exists.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::bridge::{PluginDescriptor, PluginRegistry};
use crate::checkin::CheckInEvent;
use crate::deeplink;

/// Event name emitted into the script context for a resolved check-in.
pub const CHECK_IN_EVENT: &str = "checkin";

/// Event name for other well-formed app-scheme links; the web layer routes
/// these by host name.
pub const DEEP_LINK_EVENT: &str = "deeplink";

/// The webview's script context, as the host framework presents it.
pub trait ScriptContext: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

/// What the shell does with an incoming dispatch payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// The link resolved and was routed into the script context.
    Routed,
    /// Resolution failed; the app opens with its default launch behavior.
    Default,
}

/// Owns the sealed registry and the script context for the process
/// lifetime.
pub struct ShellHost {
    registry: PluginRegistry,
    script: Arc<dyn ScriptContext>,
}

impl ShellHost {
    /// The startup hook. Seals the registry, ending registration, and
    /// brings up the bridge. After this returns the shell is interactive
    /// and any further `register` call is a late-registration error.
    pub fn start(registry: PluginRegistry, script: Arc<dyn ScriptContext>) -> ShellHost {
        registry.seal();
        info!(
            plugins = registry.descriptors().len(),
            "bridge sealed and started"
        );
        ShellHost { registry, script }
    }

    /// Route an incoming dispatch payload, from either a cold start or a
    /// resume. A check-in link becomes a [`CheckInEvent`] in the script
    /// context. A resolution failure is logged and swallowed: the app
    /// falls back to its default launch, it never crashes and never
    /// retries. Repeated taps while the app is foregrounded each deliver
    /// their own event; deduplication is the web layer's concern.
    pub fn handle_dispatch(&self, uri: &str) -> Launch {
        let link = match deeplink::resolve(uri) {
            Ok(link) => link,
            Err(err) => {
                warn!("{err}; falling back to default launch");
                return Launch::Default;
            }
        };

        if link.is_check_in() {
            let event = CheckInEvent::from_widget_tap();
            let payload = serde_json::to_value(&event).unwrap_or(Value::Null);
            self.script.emit(CHECK_IN_EVENT, payload);
        } else {
            self.script.emit(
                DEEP_LINK_EVENT,
                json!({
                    "host": link.host(),
                    "path": link.path(),
                    "query": link.query(),
                }),
            );
        }
        Launch::Routed
    }

    /// The generic "call native capability by name" surface the script
    /// layer uses. Errors cross the bridge as strings.
    pub fn invoke(
        &self,
        plugin: &str,
        method: &str,
        args: Value,
    ) -> std::result::Result<Value, String> {
        let handler = self.registry.lookup(plugin).map_err(|e| e.to_string())?;
        handler.call(method, args)
    }

    /// Capability list for the script layer.
    pub fn capabilities(&self) -> Vec<PluginDescriptor> {
        self.registry.descriptors()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
