use crux_kv::error::KeyValueError;

use crate::capabilities::{FilesResult, ScreenLoadResult};
use crate::config::AppConfig;
use crate::router::Screen;
use crate::session::Session;
use crate::signals::{ConfirmationRequest, ToastKind};
use crate::upload::{FileId, SelectedFile, SelectionId, UploadFieldId, UploadFieldSpec};
use crate::view::View;

/// Raw key-value response: the stored (or previous) bytes, if any.
pub type KvResponse = Result<Option<Vec<u8>>, KeyValueError>;

#[derive(Debug, Clone, Default)]
pub enum Event {
    #[default]
    Noop,

    AppStarted,
    Configure(Box<AppConfig>),
    RouteRestored(Box<KvResponse>),
    RoutePersisted(Box<KvResponse>),

    // Navigation
    NavigateTo(View),
    /// Identifier from outside the closed view set (deep link, URL bar).
    OpenPath {
        path: String,
    },
    ScreenLoaded {
        screen: Screen,
        result: Box<ScreenLoadResult>,
    },
    RetryScreenLoad,

    SessionChanged {
        session: Option<Session>,
    },

    // Process-wide signals
    SetLoading {
        active: bool,
    },
    ShowToast {
        message: String,
        kind: ToastKind,
    },
    DismissToast,
    TimerTick {
        now_ms: u64,
    },
    RequestConfirmation(Box<ConfirmationRequest>),
    ConfirmationConfirmed,
    ConfirmationCancelled,

    // File upload fields
    UploadFieldMounted {
        field: UploadFieldId,
        spec: Box<UploadFieldSpec>,
    },
    UploadFieldUnmounted {
        field: UploadFieldId,
    },
    FileSelected {
        field: UploadFieldId,
        file: Option<SelectedFile>,
    },
    PreviewCreated {
        field: UploadFieldId,
        selection: SelectionId,
        result: Box<FilesResult>,
    },
    CurrentImageUrlChanged {
        field: UploadFieldId,
        url: Option<String>,
    },
    EncodeUploadRequested {
        field: UploadFieldId,
    },
    DataUrlRead {
        field: UploadFieldId,
        file: FileId,
        result: Box<FilesResult>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::RouteRestored(_) => "route_restored",
            Self::RoutePersisted(_) => "route_persisted",
            Self::NavigateTo(_) => "navigate_to",
            Self::OpenPath { .. } => "open_path",
            Self::ScreenLoaded { .. } => "screen_loaded",
            Self::RetryScreenLoad => "retry_screen_load",
            Self::SessionChanged { .. } => "session_changed",
            Self::SetLoading { .. } => "set_loading",
            Self::ShowToast { .. } => "show_toast",
            Self::DismissToast => "dismiss_toast",
            Self::TimerTick { .. } => "timer_tick",
            Self::RequestConfirmation(_) => "request_confirmation",
            Self::ConfirmationConfirmed => "confirmation_confirmed",
            Self::ConfirmationCancelled => "confirmation_cancelled",
            Self::UploadFieldMounted { .. } => "upload_field_mounted",
            Self::UploadFieldUnmounted { .. } => "upload_field_unmounted",
            Self::FileSelected { .. } => "file_selected",
            Self::PreviewCreated { .. } => "preview_created",
            Self::CurrentImageUrlChanged { .. } => "current_image_url_changed",
            Self::EncodeUploadRequested { .. } => "encode_upload_requested",
            Self::DataUrlRead { .. } => "data_url_read",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::NavigateTo(_)
                | Self::OpenPath { .. }
                | Self::RetryScreenLoad
                | Self::DismissToast
                | Self::ConfirmationConfirmed
                | Self::ConfirmationCancelled
                | Self::FileSelected { .. }
                | Self::EncodeUploadRequested { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_default() {
        assert!(matches!(Event::default(), Event::Noop));
    }

    #[test]
    fn event_name() {
        assert_eq!(Event::Noop.name(), "noop");
        assert_eq!(Event::NavigateTo(View::Cart).name(), "navigate_to");
        assert_eq!(Event::DismissToast.name(), "dismiss_toast");
        assert_eq!(Event::TimerTick { now_ms: 1 }.name(), "timer_tick");
    }

    #[test]
    fn event_is_user_initiated() {
        assert!(!Event::Noop.is_user_initiated());
        assert!(!Event::AppStarted.is_user_initiated());
        assert!(!Event::TimerTick { now_ms: 0 }.is_user_initiated());
        assert!(Event::NavigateTo(View::Home).is_user_initiated());
        assert!(Event::ConfirmationCancelled.is_user_initiated());
        assert!(Event::FileSelected {
            field: UploadFieldId::new("avatar"),
            file: None,
        }
        .is_user_initiated());
    }

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 128,
            "Event enum is {size} bytes, box more variants"
        );
    }
}
