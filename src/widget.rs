//! Widget surface: tap target construction and per-instance updates.
//!
//! The host framework drives this module: it calls [`update_instances`]
//! with the instance ids the OS hands it, zero or more times over a
//! widget's displayed lifetime. Nothing here is long-lived: each redraw
//! builds one view and one tap target and pushes them to every instance.

use tracing::{debug, warn};

use crate::deeplink::DeepLink;
use crate::error::Error;
use crate::store::WidgetData;

// ---------------------------------------------------------------------------
// Dispatch flags
// ---------------------------------------------------------------------------

/// OS dispatch flag set for the tap-triggered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchFlags(u32);

impl DispatchFlags {
    /// Launch the app shell's top-level entry point in a new task.
    pub const NEW_TASK: DispatchFlags = DispatchFlags(1 << 0);
    /// Clear any intermediate screen so the destination is reached directly.
    pub const CLEAR_TOP: DispatchFlags = DispatchFlags(1 << 1);
    /// Update the existing dispatchable in place on repeated redraws.
    pub const UPDATE_CURRENT: DispatchFlags = DispatchFlags(1 << 2);
    /// The dispatchable cannot be altered by another party after creation.
    pub const IMMUTABLE: DispatchFlags = DispatchFlags(1 << 3);

    pub const fn empty() -> DispatchFlags {
        DispatchFlags(0)
    }

    pub const fn contains(self, other: DispatchFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for DispatchFlags {
    type Output = DispatchFlags;

    fn bitor(self, rhs: DispatchFlags) -> DispatchFlags {
        DispatchFlags(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Tap target
// ---------------------------------------------------------------------------

/// Request code for the tap dispatchable. Stable across redraws so the OS
/// updates the existing dispatchable instead of accumulating duplicates.
const TAP_REQUEST_ID: i32 = 0;

/// Immutable description of "launch this deep link with these flags",
/// bound to the widget's single tap region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetAction {
    deep_link: DeepLink,
    request_id: i32,
    flags: DispatchFlags,
}

impl WidgetAction {
    pub fn deep_link(&self) -> &DeepLink {
        &self.deep_link
    }

    /// Opaque OS-level dedup identifier. Carries no business meaning.
    pub fn request_id(&self) -> i32 {
        self.request_id
    }

    pub fn flags(&self) -> DispatchFlags {
        self.flags
    }
}

/// Build the check-in tap target. Hardcoded intent, so this cannot fail.
pub fn build_tap_target() -> WidgetAction {
    WidgetAction {
        deep_link: DeepLink::check_in(),
        request_id: TAP_REQUEST_ID,
        flags: DispatchFlags::NEW_TASK
            | DispatchFlags::CLEAR_TOP
            | DispatchFlags::UPDATE_CURRENT
            | DispatchFlags::IMMUTABLE,
    }
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetStatus {
    Pending,
    CheckedIn,
    OnVacation,
}

impl WidgetStatus {
    pub fn label(self) -> &'static str {
        match self {
            WidgetStatus::Pending => "Check In",
            WidgetStatus::CheckedIn => "Checked In",
            WidgetStatus::OnVacation => "On Vacation",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            WidgetStatus::Pending => "#fbbf24",
            WidgetStatus::CheckedIn => "#4ade80",
            WidgetStatus::OnVacation => "#60a5fa",
        }
    }
}

/// What one widget instance renders: streak count, day label, status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub streak_text: String,
    pub streak_label: &'static str,
    pub status: WidgetStatus,
}

impl WidgetView {
    /// Vacation wins over checked-in, checked-in over pending.
    pub fn from_data(data: &WidgetData) -> WidgetView {
        let status = if data.is_on_vacation {
            WidgetStatus::OnVacation
        } else if data.has_checked_in_today {
            WidgetStatus::CheckedIn
        } else {
            WidgetStatus::Pending
        };
        WidgetView {
            streak_text: data.streak.to_string(),
            streak_label: if data.streak == 1 { "day" } else { "days" },
            status,
        }
    }
}

// ---------------------------------------------------------------------------
// OS widget-manager seam
// ---------------------------------------------------------------------------

/// The OS widget manager, as the host framework presents it.
pub trait WidgetManager: Send + Sync {
    /// Ids of every placed copy of the widget.
    fn instance_ids(&self) -> Vec<i32>;

    /// Push a rendered view and tap binding to one widget instance.
    /// Fire-and-forget from this crate's perspective beyond the result.
    fn update_instance(
        &self,
        instance_id: i32,
        view: &WidgetView,
        action: &WidgetAction,
    ) -> std::result::Result<(), String>;
}

/// Do-nothing manager for platforms without a widget surface.
pub struct NoopWidgetManager;

impl WidgetManager for NoopWidgetManager {
    fn instance_ids(&self) -> Vec<i32> {
        Vec::new()
    }

    fn update_instance(
        &self,
        instance_id: i32,
        _view: &WidgetView,
        _action: &WidgetAction,
    ) -> std::result::Result<(), String> {
        debug!("no widget surface; skipping update for instance {instance_id}");
        Ok(())
    }
}

/// Redraw every given widget instance with the current data.
///
/// A failing instance is logged and skipped; failure for one must not
/// abort updates for the others. Returns the per-instance failures; the
/// next natural redraw cycle is the retry, never this function.
pub fn update_instances(
    manager: &dyn WidgetManager,
    instance_ids: &[i32],
    data: &WidgetData,
) -> Vec<Error> {
    let view = WidgetView::from_data(data);
    let action = build_tap_target();

    let mut failures = Vec::new();
    for &id in instance_ids {
        if let Err(details) = manager.update_instance(id, &view, &action) {
            let err = Error::WidgetUpdateFailed {
                instance_id: id,
                details,
            };
            warn!("{err}");
            failures.push(err);
        }
    }
    failures
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Records updates; fails for ids listed in `fail_ids`.
    struct RecordingManager {
        placed: Vec<i32>,
        fail_ids: Vec<i32>,
        updated: Mutex<Vec<i32>>,
    }

    impl RecordingManager {
        fn new(placed: Vec<i32>, fail_ids: Vec<i32>) -> RecordingManager {
            RecordingManager {
                placed,
                fail_ids,
                updated: Mutex::new(Vec::new()),
            }
        }
    }

    impl WidgetManager for RecordingManager {
        fn instance_ids(&self) -> Vec<i32> {
            self.placed.clone()
        }

        fn update_instance(
            &self,
            instance_id: i32,
            _view: &WidgetView,
            _action: &WidgetAction,
        ) -> std::result::Result<(), String> {
            if self.fail_ids.contains(&instance_id) {
                return Err("widget manager unavailable".to_string());
            }
            self.updated.lock().push(instance_id);
            Ok(())
        }
    }

    #[test]
    fn tap_target_carries_check_in_link_and_flags() {
        let action = build_tap_target();
        assert!(action.deep_link().is_check_in());
        assert_eq!(action.deep_link().to_uri(), "stillhere://checkin");
        assert!(action.flags().contains(DispatchFlags::NEW_TASK));
        assert!(action.flags().contains(DispatchFlags::CLEAR_TOP));
        assert!(action.flags().contains(DispatchFlags::UPDATE_CURRENT));
        assert!(action.flags().contains(DispatchFlags::IMMUTABLE));
    }

    #[test]
    fn request_id_stable_across_redraws() {
        assert_eq!(build_tap_target().request_id(), build_tap_target().request_id());
        assert_eq!(build_tap_target(), build_tap_target());
    }

    #[test]
    fn empty_flags_contain_nothing() {
        assert!(!DispatchFlags::empty().contains(DispatchFlags::NEW_TASK));
        let combined = DispatchFlags::NEW_TASK | DispatchFlags::CLEAR_TOP;
        assert!(combined.contains(DispatchFlags::NEW_TASK));
        assert!(!combined.contains(DispatchFlags::IMMUTABLE));
    }

    #[test]
    fn failed_instance_does_not_abort_siblings() {
        let manager = RecordingManager::new(vec![1, 2, 3], vec![3]);
        let failures = update_instances(&manager, &[1, 2, 3], &WidgetData::default());

        assert_eq!(*manager.updated.lock(), vec![1, 2]);
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0],
            Error::WidgetUpdateFailed { instance_id: 3, .. }
        ));
    }

    #[test]
    fn all_instances_updated_on_success() {
        let manager = RecordingManager::new(vec![7], vec![]);
        let failures = update_instances(&manager, &[7], &WidgetData::default());
        assert!(failures.is_empty());
        assert_eq!(*manager.updated.lock(), vec![7]);
    }

    #[test]
    fn view_status_precedence() {
        let mut data = WidgetData {
            is_on_vacation: true,
            has_checked_in_today: true,
            ..WidgetData::default()
        };
        assert_eq!(WidgetView::from_data(&data).status, WidgetStatus::OnVacation);

        data.is_on_vacation = false;
        assert_eq!(WidgetView::from_data(&data).status, WidgetStatus::CheckedIn);

        data.has_checked_in_today = false;
        assert_eq!(WidgetView::from_data(&data).status, WidgetStatus::Pending);
    }

    #[test]
    fn streak_label_singular_plural() {
        let one = WidgetData {
            streak: 1,
            ..WidgetData::default()
        };
        assert_eq!(WidgetView::from_data(&one).streak_label, "day");
        assert_eq!(WidgetView::from_data(&one).streak_text, "1");

        let many = WidgetData {
            streak: 14,
            ..WidgetData::default()
        };
        assert_eq!(WidgetView::from_data(&many).streak_label, "days");
        assert_eq!(WidgetView::from_data(&many).streak_text, "14");

        let zero = WidgetData::default();
        assert_eq!(WidgetView::from_data(&zero).streak_label, "days");
    }

    #[test]
    fn status_labels_and_colors_are_stable() {
        assert_eq!(WidgetStatus::Pending.label(), "Check In");
        assert_eq!(WidgetStatus::CheckedIn.label(), "Checked In");
        assert_eq!(WidgetStatus::OnVacation.label(), "On Vacation");
        assert_eq!(WidgetStatus::CheckedIn.color(), "#4ade80");
    }

    #[test]
    fn noop_manager_always_succeeds() {
        let failures = update_instances(&NoopWidgetManager, &[1, 2], &WidgetData::default());
        assert!(failures.is_empty());
        assert!(NoopWidgetManager.instance_ids().is_empty());
    }
}
