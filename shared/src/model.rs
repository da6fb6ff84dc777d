use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::router::{self, Screen, ScreenRegistry};
use crate::session::Session;
use crate::signals::{ConfirmationRequest, ConfirmationSlot, ToastKind, ToastMessage};
use crate::upload::{FileUpload, UploadFieldId};
use crate::view::Route;

/// Application state. Fields are crate-private: shells and screens change
/// them only by sending events through `App::update`.
#[derive(Debug, Default)]
pub struct Model {
    pub(crate) config: AppConfig,
    pub(crate) route: Route,
    pub(crate) screens: ScreenRegistry,
    pub(crate) session: Option<Session>,
    pub(crate) is_loading: bool,
    pub(crate) toast: Option<ToastMessage>,
    pub(crate) confirmation: ConfirmationSlot,
    pub(crate) uploads: BTreeMap<UploadFieldId, MountedUpload>,
    /// Last clock value reported by the shell; `None` until the first tick.
    pub(crate) now_ms: Option<u64>,
    /// Set while the stored route is being read back at startup. Any
    /// navigation before the read completes wins over the stored value.
    pub(crate) restore_pending: bool,
}

/// An upload field together with the screen that mounted it.
#[derive(Debug)]
pub struct MountedUpload {
    pub owner: Screen,
    pub upload: FileUpload,
}

impl Model {
    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    #[must_use]
    pub fn current_screen(&self) -> Screen {
        router::route(&self.route)
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn toast(&self) -> Option<&ToastMessage> {
        self.toast.as_ref()
    }

    #[must_use]
    pub fn confirmation(&self) -> Option<&ConfirmationRequest> {
        self.confirmation.pending()
    }

    #[must_use]
    pub fn upload(&self, field: &UploadFieldId) -> Option<&FileUpload> {
        self.uploads.get(field).map(|mounted| &mounted.upload)
    }

    #[must_use]
    pub fn screen_registry(&self) -> &ScreenRegistry {
        &self.screens
    }

    pub(crate) fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        let mut toast = ToastMessage::new(message, kind, self.now_ms.unwrap_or_default());
        if let Some(duration) = self.config.toast_duration_ms {
            toast = toast.with_duration(duration);
        }
        self.toast = Some(toast);
    }

    pub(crate) fn clear_toast(&mut self) {
        self.toast = None;
    }

    /// Advances the clock. Returns true when the toast timed out.
    pub(crate) fn tick(&mut self, now_ms: u64) -> bool {
        let first_tick = self.now_ms.is_none();
        self.now_ms = Some(now_ms);

        let Some(toast) = self.toast.as_mut() else {
            return false;
        };
        // Toasts shown before the clock started are timed from the first tick.
        if first_tick {
            toast.created_at_ms = now_ms;
            return false;
        }
        if toast.is_expired(now_ms) {
            self.toast = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_before_first_tick_is_timed_from_that_tick() {
        let mut model = Model::default();
        model.show_toast("Saved", ToastKind::Success);

        assert!(!model.tick(1_700_000_000_000));
        assert!(model.toast().is_some());
        assert!(!model.tick(1_700_000_001_999));
        assert!(model.tick(1_700_000_002_001));
        assert!(model.toast().is_none());
    }

    #[test]
    fn configured_duration_overrides_kind_default() {
        let mut model = Model::default();
        model.config.toast_duration_ms = Some(10_000);
        model.tick(0);
        model.show_toast("Order placed", ToastKind::Success);
        assert_eq!(model.toast().map(|t| t.duration_ms), Some(10_000));
        assert!(!model.tick(9_000));
        assert!(model.tick(10_001));
    }

    #[test]
    fn tick_without_toast_only_moves_clock() {
        let mut model = Model::default();
        assert!(!model.tick(42));
        assert_eq!(model.now_ms, Some(42));
    }
}
