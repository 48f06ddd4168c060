//! The check-in capability: event payloads and the `WidgetBridge` plugin.
//!
//! `WidgetBridge` is the one plugin this core ships. The web layer calls
//! `updateWidget` after a check-in to persist fresh state and redraw every
//! placed widget, and `getWidgetData` to read the state back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::bridge::{PluginDescriptor, PluginHandler};
use crate::store::{WidgetData, WidgetDataStore};
use crate::widget::{self, WidgetManager};

/// Registered plugin name the web layer consumes. Case-sensitive, stable
/// across versions.
pub const WIDGET_BRIDGE: &str = "WidgetBridge";

// ---------------------------------------------------------------------------
// Check-in event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInSource {
    Widget,
    Other,
}

/// Resolved semantic payload of a check-in deep link. Constructed on the
/// dispatch path, handed to the web layer; never persisted by this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInEvent {
    pub triggered_at: DateTime<Utc>,
    pub source: CheckInSource,
}

impl CheckInEvent {
    pub fn from_widget_tap() -> CheckInEvent {
        CheckInEvent {
            triggered_at: Utc::now(),
            source: CheckInSource::Widget,
        }
    }

    pub fn other() -> CheckInEvent {
        CheckInEvent {
            triggered_at: Utc::now(),
            source: CheckInSource::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// WidgetBridge plugin
// ---------------------------------------------------------------------------

/// Bridges script calls to the native widget surface and its data store.
pub struct WidgetBridgePlugin {
    store: WidgetDataStore,
    manager: Arc<dyn WidgetManager>,
}

impl WidgetBridgePlugin {
    pub fn new(store: WidgetDataStore, manager: Arc<dyn WidgetManager>) -> WidgetBridgePlugin {
        WidgetBridgePlugin { store, manager }
    }

    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(WIDGET_BRIDGE, &["widget:update", "widget:read"])
    }

    /// Persist new data from the script layer, then redraw every placed
    /// widget instance. Per-instance redraw failures are logged and left to
    /// the next redraw cycle; the call itself still succeeds.
    fn update_widget(&self, args: Value) -> std::result::Result<Value, String> {
        let data: WidgetData =
            serde_json::from_value(args).map_err(|e| format!("invalid widget data: {e}"))?;
        self.store
            .save(&data)
            .map_err(|e| format!("failed to persist widget data: {e}"))?;

        let ids = self.manager.instance_ids();
        widget::update_instances(self.manager.as_ref(), &ids, &data);

        Ok(json!({ "success": true }))
    }

    fn get_widget_data(&self) -> std::result::Result<Value, String> {
        serde_json::to_value(self.store.load())
            .map_err(|e| format!("failed to serialize widget data: {e}"))
    }
}

impl PluginHandler for WidgetBridgePlugin {
    fn call(&self, method: &str, args: Value) -> std::result::Result<Value, String> {
        match method {
            "updateWidget" => self.update_widget(args),
            "getWidgetData" => self.get_widget_data(),
            other => Err(format!("unknown method `{other}` on {WIDGET_BRIDGE}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{WidgetAction, WidgetView};
    use parking_lot::Mutex;

    struct FakeManager {
        placed: Vec<i32>,
        updated: Mutex<Vec<i32>>,
    }

    impl FakeManager {
        fn new(placed: Vec<i32>) -> Arc<FakeManager> {
            Arc::new(FakeManager {
                placed,
                updated: Mutex::new(Vec::new()),
            })
        }
    }

    impl WidgetManager for FakeManager {
        fn instance_ids(&self) -> Vec<i32> {
            self.placed.clone()
        }

        fn update_instance(
            &self,
            instance_id: i32,
            _view: &WidgetView,
            _action: &WidgetAction,
        ) -> std::result::Result<(), String> {
            self.updated.lock().push(instance_id);
            Ok(())
        }
    }

    fn plugin_with(placed: Vec<i32>) -> (WidgetBridgePlugin, Arc<FakeManager>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let manager = FakeManager::new(placed);
        let plugin = WidgetBridgePlugin::new(
            WidgetDataStore::new(dir.path()),
            Arc::clone(&manager) as Arc<dyn WidgetManager>,
        );
        (plugin, manager, dir)
    }

    #[test]
    fn update_widget_persists_and_refreshes_all_instances() {
        let (plugin, manager, _dir) = plugin_with(vec![1, 2]);

        let out = plugin
            .call("updateWidget", json!({ "streak": 5, "hasCheckedInToday": true }))
            .unwrap();
        assert_eq!(out, json!({ "success": true }));
        assert_eq!(*manager.updated.lock(), vec![1, 2]);

        let data = plugin.call("getWidgetData", json!({})).unwrap();
        assert_eq!(data["streak"], 5);
        assert_eq!(data["hasCheckedInToday"], true);
    }

    #[test]
    fn get_widget_data_defaults_before_first_update() {
        let (plugin, _manager, _dir) = plugin_with(vec![]);
        let data = plugin.call("getWidgetData", json!({})).unwrap();
        assert_eq!(data["streak"], 0);
        assert_eq!(data["hasCheckedInToday"], false);
        assert_eq!(data["lastCheckIn"], Value::Null);
    }

    #[test]
    fn update_widget_rejects_malformed_args() {
        let (plugin, manager, _dir) = plugin_with(vec![1]);
        let err = plugin
            .call("updateWidget", json!({ "streak": "not a number" }))
            .unwrap_err();
        assert!(err.contains("invalid widget data"));
        assert!(manager.updated.lock().is_empty());
    }

    #[test]
    fn unknown_method_fails_by_name() {
        let (plugin, _manager, _dir) = plugin_with(vec![]);
        let err = plugin.call("vibrate", json!({})).unwrap_err();
        assert!(err.contains("vibrate"));
        assert!(err.contains(WIDGET_BRIDGE));
    }

    #[test]
    fn descriptor_uses_stable_name_and_known_capabilities() {
        let d = WidgetBridgePlugin::descriptor();
        assert_eq!(d.name, "WidgetBridge");
        assert_eq!(d.capabilities, vec!["widget:update", "widget:read"]);
    }

    #[test]
    fn check_in_event_serializes_camel_case() {
        let event = CheckInEvent::from_widget_tap();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["source"], "WIDGET");
        assert!(value["triggeredAt"].is_string());

        let other = serde_json::to_value(CheckInEvent::other()).unwrap();
        assert_eq!(other["source"], "OTHER");
    }
}
