//! Plugin registry: the table of native capabilities exposed to the web
//! shell's script context.
//!
//! Lifecycle is register-once-then-read-only: the host registers every
//! plugin during startup, seals the registry before the webview accepts
//! script calls, and never mutates it again. Steady-state lookups are
//! race-free by construction: the one writable phase ends before any
//! concurrent script-invocation path exists.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Descriptors and handlers
// ---------------------------------------------------------------------------

/// A named native handler exposed to the script layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    /// Unique, case-sensitive, stable across versions.
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, capabilities: &[&str]) -> PluginDescriptor {
        PluginDescriptor {
            name: name.into(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Known capability strings. Anything outside this set is rejected.
pub const KNOWN_CAPABILITIES: &[&str] = &["widget:update", "widget:read"];

/// Native handler behind a registered plugin name. The script layer calls
/// methods by name with JSON arguments; errors cross the bridge as strings.
pub trait PluginHandler: Send + Sync {
    fn call(&self, method: &str, args: Value) -> std::result::Result<Value, String>;
}

fn validate_descriptor(descriptor: &PluginDescriptor) -> Result<()> {
    if descriptor.name.is_empty() {
        return Err(Error::InvalidDescriptor {
            name: String::new(),
            reason: "name is empty".to_string(),
        });
    }
    for cap in &descriptor.capabilities {
        if !KNOWN_CAPABILITIES.contains(&cap.as_str()) {
            return Err(Error::InvalidDescriptor {
                name: descriptor.name.clone(),
                reason: format!("unknown capability: `{cap}`"),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// `Registering` until the host seals it; `Sealed` for the rest of the
/// process. There is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Registering,
    Sealed,
}

struct Registered {
    descriptor: PluginDescriptor,
    handler: Arc<dyn PluginHandler>,
}

struct Inner {
    phase: Phase,
    plugins: HashMap<String, Registered>,
}

/// Process-wide mapping from capability name to live handler.
pub struct PluginRegistry {
    inner: RwLock<Inner>,
}

impl PluginRegistry {
    pub fn new() -> PluginRegistry {
        PluginRegistry {
            inner: RwLock::new(Inner {
                phase: Phase::Registering,
                plugins: HashMap::new(),
            }),
        }
    }

    /// Register a plugin. Must happen before the registry is sealed.
    ///
    /// Fails with [`Error::LateRegistration`] once sealed; the web layer
    /// may already have queried the capability list, so succeeding silently
    /// here would hide a programming error. Duplicate names are rejected,
    /// never overwritten.
    pub fn register(
        &self,
        descriptor: PluginDescriptor,
        handler: Arc<dyn PluginHandler>,
    ) -> Result<()> {
        validate_descriptor(&descriptor)?;

        let mut inner = self.inner.write();
        if inner.phase == Phase::Sealed {
            let err = Error::LateRegistration {
                name: descriptor.name,
            };
            error!("{err}");
            return Err(err);
        }
        if inner.plugins.contains_key(&descriptor.name) {
            return Err(Error::DuplicatePlugin {
                name: descriptor.name,
            });
        }
        inner.plugins.insert(
            descriptor.name.clone(),
            Registered {
                descriptor,
                handler,
            },
        );
        Ok(())
    }

    /// End the registration phase. One-way; returns false if the registry
    /// was already sealed.
    pub fn seal(&self) -> bool {
        let mut inner = self.inner.write();
        if inner.phase == Phase::Sealed {
            return false;
        }
        inner.phase = Phase::Sealed;
        true
    }

    pub fn is_sealed(&self) -> bool {
        self.inner.read().phase == Phase::Sealed
    }

    /// Resolve a capability name to its handler. Read-only; safe from any
    /// number of script-invocation contexts once sealed. Case-sensitive.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn PluginHandler>> {
        let inner = self.inner.read();
        inner
            .plugins
            .get(name)
            .map(|r| Arc::clone(&r.handler))
            .ok_or_else(|| Error::UnknownCapability {
                name: name.to_string(),
            })
    }

    /// The capability list the web layer may query.
    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        let inner = self.inner.read();
        let mut out: Vec<PluginDescriptor> = inner
            .plugins
            .values()
            .map(|r| r.descriptor.clone())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

impl Default for PluginRegistry {
    fn default() -> PluginRegistry {
        PluginRegistry::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
