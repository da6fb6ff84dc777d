// lib.rs - Marketplace shared core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;
pub mod router;
pub mod session;
pub mod signals;
pub mod upload;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::AppConfig;
pub use event::Event;
pub use model::Model;
pub use router::{Screen, ScreenState};
pub use session::{AccountRole, Session, UserId};
pub use signals::{ConfirmationRequest, ToastKind};
pub use upload::{FileId, SelectedFile, UploadConfig, UploadFieldId, UploadFieldSpec};
pub use view::{Route, View, ViewNamespace};

pub const DEFAULT_CONFIRM_LABEL: &str = "Confirm";
pub const DEFAULT_CANCEL_LABEL: &str = "Cancel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ScreenLoad,
    FileAccess,
    Storage,
    Serialization,
    Deserialization,
    Validation,
    InvalidState,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ScreenLoad => "SCREEN_LOAD_ERROR",
            Self::FileAccess => "FILE_ACCESS_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::ScreenLoad | Self::FileAccess | Self::Storage => ErrorSeverity::Transient,
            Self::Validation | Self::Deserialization => ErrorSeverity::Permanent,
            Self::Serialization | Self::InvalidState | Self::Internal => ErrorSeverity::Fatal,
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ScreenLoad | Self::FileAccess | Self::Storage)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable() && !matches!(self.severity, ErrorSeverity::Fatal)
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::ScreenLoad => {
                "This page could not be loaded. Check your connection and try again.".into()
            }
            ErrorKind::FileAccess => {
                "The selected file could not be read. Please choose it again.".into()
            }
            ErrorKind::Storage => "Unable to save data locally.".into(),
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Serialization | ErrorKind::Deserialization => {
                "A data error occurred. Please contact support if this persists.".into()
            }
            ErrorKind::InvalidState | ErrorKind::Internal => {
                "An unexpected error occurred. Please try again or contact support.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&signals::ToastMessage> for ToastView {
    fn from(t: &signals::ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmationView {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl From<&ConfirmationRequest> for ConfirmationView {
    fn from(request: &ConfirmationRequest) -> Self {
        Self {
            title: request.title.clone(),
            message: request.message.clone(),
            confirm_label: request
                .confirm_label
                .clone()
                .unwrap_or_else(|| DEFAULT_CONFIRM_LABEL.into()),
            cancel_label: request
                .cancel_label
                .clone()
                .unwrap_or_else(|| DEFAULT_CANCEL_LABEL.into()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UploadFieldView {
    pub field: String,
    pub label: String,
    pub is_avatar: bool,
    /// For the picker's `accept` attribute.
    pub accepted_formats: Vec<String>,
    pub max_size_mb: f64,
    pub has_file: bool,
    pub file_name: Option<String>,
    pub preview_url: Option<String>,
    pub preview_pending: bool,
    pub error: Option<String>,
    pub encoding: bool,
    pub data_url: Option<String>,
    pub encode_error: Option<String>,
}

impl UploadFieldView {
    fn new(field: &UploadFieldId, upload: &upload::FileUpload) -> Self {
        let (encoding, data_url, encode_error) = match upload.encode_state() {
            upload::EncodeState::Idle => (false, None, None),
            upload::EncodeState::Reading => (true, None, None),
            upload::EncodeState::Ready(url) => (false, Some(url.clone()), None),
            upload::EncodeState::Failed(reason) => (false, None, Some(reason.clone())),
        };
        Self {
            field: field.to_string(),
            label: upload.spec().label.clone(),
            is_avatar: upload.spec().is_avatar,
            accepted_formats: upload.config().accepted_formats.clone(),
            max_size_mb: upload.config().max_size_mb,
            has_file: upload.accepted_file().is_some(),
            file_name: upload.file_name().map(str::to_string),
            preview_url: upload.preview_url().map(str::to_string),
            preview_pending: matches!(upload.preview(), Some(upload::Preview::Pending(_))),
            error: upload.error().map(ToString::to_string),
            encoding,
            data_url,
            encode_error,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionView {
    pub user_id: String,
    pub display_name: String,
    pub role: AccountRole,
    pub avatar_url: Option<String>,
}

impl From<&Session> for SessionView {
    fn from(s: &Session) -> Self {
        Self {
            user_id: s.user_id.to_string(),
            display_name: s.display_name.clone(),
            role: s.role,
            avatar_url: s.avatar_url.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub screen: ScreenState,
    pub namespace: Option<ViewNamespace>,
    /// Account type for the shared registration screen.
    pub registration_role: Option<AccountRole>,
    pub show_spinner: bool,
    pub toast: Option<ToastView>,
    pub confirmation: Option<ConfirmationView>,
    pub uploads: Vec<UploadFieldView>,
    pub session: Option<SessionView>,
}

pub mod app {
    use super::*;
    use crate::capabilities::{
        decode, encode, CapabilityError, FilesOutput, FilesResult, KvError, StoredRoute,
        LAST_ROUTE_KEY,
    };
    use crate::model::MountedUpload;
    use crate::router;
    use crate::upload::{FileUpload, PreviewEffects, PreviewHandle};
    use tracing::{debug, info, instrument, warn};

    #[derive(Default)]
    pub struct App;

    impl App {
        /// Sets the current-view slot (last write wins) and makes sure the
        /// target screen's code is on its way.
        fn navigate(route: Route, persist: bool, model: &mut Model, caps: &Capabilities) {
            let screen = router::route(&route);
            info!(path = route.as_path(), ?screen, "navigate");

            if matches!(route, Route::Unrecognized(_)) {
                warn!(path = route.as_path(), "unrecognized view, showing fallback");
            }

            model.route = route;
            model.restore_pending = false;

            Self::release_foreign_uploads(screen, model, caps);
            Self::ensure_loaded(screen, model, caps);

            if persist && model.config.restore_last_view {
                Self::persist_route(&model.route, caps);
            }

            caps.render.render();
        }

        fn ensure_loaded(screen: Screen, model: &mut Model, caps: &Capabilities) {
            if model.screens.begin_load(screen) {
                debug!(bundle = screen.bundle(), "requesting screen chunk");
                caps.screen_loader.load(screen, move |result| Event::ScreenLoaded {
                    screen,
                    result: Box::new(result),
                });
            }
        }

        fn persist_route(route: &Route, caps: &Capabilities) {
            match encode(&StoredRoute::from_route(route)) {
                Ok(bytes) => caps.key_value.set(LAST_ROUTE_KEY.to_string(), bytes, |result| {
                    Event::RoutePersisted(Box::new(result))
                }),
                Err(e) => warn!(error = %e, "cannot encode route for storage"),
            }
        }

        /// Fields belong to the screen that mounted them; leaving that screen
        /// tears them down.
        fn release_foreign_uploads(screen: Screen, model: &mut Model, caps: &Capabilities) {
            let stale: Vec<UploadFieldId> = model
                .uploads
                .iter()
                .filter(|(_, mounted)| mounted.owner != screen)
                .map(|(id, _)| id.clone())
                .collect();

            for field in stale {
                if let Some(mounted) = model.uploads.remove(&field) {
                    debug!(%field, "releasing upload field of previous screen");
                    Self::revoke(mounted.upload.release(), caps);
                }
            }
        }

        fn revoke(handle: Option<PreviewHandle>, caps: &Capabilities) {
            if let Some(handle) = handle {
                debug!(url = handle.url(), "revoking preview");
                caps.files.revoke_preview(handle);
            }
        }

        fn apply_preview_effects(
            field: &UploadFieldId,
            effects: PreviewEffects,
            caps: &Capabilities,
        ) {
            Self::revoke(effects.release, caps);

            if let Some((selection, file)) = effects.create {
                let field = field.clone();
                caps.files.create_preview(file, move |result| Event::PreviewCreated {
                    field,
                    selection,
                    result: Box::new(result),
                });
            }
        }

        fn upload_mut<'a>(
            model: &'a mut Model,
            field: &UploadFieldId,
        ) -> Option<&'a mut FileUpload> {
            let found = model.uploads.get_mut(field).map(|m| &mut m.upload);
            if found.is_none() {
                warn!(%field, "event for unmounted upload field ignored");
            }
            found
        }

        fn storage_error(e: &crux_kv::error::KeyValueError) -> AppError {
            AppError::from(CapabilityError::from(KvError::Storage {
                message: format!("{e:?}"),
            }))
            .with_context("key", LAST_ROUTE_KEY)
        }

        fn files_error(e: crate::capabilities::FilesError) -> AppError {
            AppError::from(CapabilityError::from(e))
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        #[instrument(skip_all, fields(event = event.name()))]
        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            if event.is_user_initiated() {
                debug!("user event");
            }

            match event {
                Event::Noop => {}

                Event::AppStarted => {
                    let initial = Route::Known(model.config.initial_view);
                    info!(initial = initial.as_path(), "app started");
                    Self::navigate(initial, false, model, caps);

                    if model.config.restore_last_view {
                        model.restore_pending = true;
                        caps.key_value.get(LAST_ROUTE_KEY.to_string(), |result| {
                            Event::RouteRestored(Box::new(result))
                        });
                    }
                }

                Event::Configure(config) => match (*config).validated() {
                    Ok(config) => {
                        info!(
                            initial_view = %config.initial_view,
                            restore_last_view = config.restore_last_view,
                            "configuration applied"
                        );
                        model.config = config;
                        caps.render.render();
                    }
                    Err(error) => {
                        warn!(code = error.code(), error = %error, "configuration rejected, keeping current");
                    }
                },

                Event::RouteRestored(result) => {
                    if !model.restore_pending {
                        debug!("stored route arrived after navigation, ignored");
                        return;
                    }
                    model.restore_pending = false;

                    match *result {
                        Ok(Some(bytes)) => match decode::<StoredRoute>(&bytes) {
                            Ok(stored) => Self::navigate(stored.into_route(), false, model, caps),
                            Err(e) => {
                                let error = AppError::from(CapabilityError::from(e));
                                warn!(code = error.code(), error = %error, "stored route unreadable");
                            }
                        },
                        Ok(None) => debug!("no stored route"),
                        Err(e) => {
                            let error = Self::storage_error(&e);
                            warn!(code = error.code(), error = %error, "reading stored route failed");
                        }
                    }
                }

                Event::RoutePersisted(result) => {
                    if let Err(e) = *result {
                        let error = Self::storage_error(&e);
                        warn!(code = error.code(), error = %error, "persisting route failed");
                    }
                }

                Event::NavigateTo(view) => {
                    Self::navigate(Route::Known(view), true, model, caps);
                }

                Event::OpenPath { path } => {
                    Self::navigate(Route::parse(&path), true, model, caps);
                }

                Event::ScreenLoaded { screen, result } => {
                    let is_current = model.current_screen() == screen;
                    match *result {
                        Ok(()) => model.screens.mark_loaded(screen),
                        Err(e) => {
                            let error = AppError::from(CapabilityError::from(e))
                                .with_context("bundle", screen.bundle());
                            warn!(code = error.code(), error = %error, "screen load failed");
                            model.screens.mark_failed(screen, error.user_facing_message());
                        }
                    }

                    if is_current {
                        caps.render.render();
                    } else {
                        debug!(?screen, "load finished for a screen no longer shown");
                    }
                }

                Event::RetryScreenLoad => {
                    let screen = model.current_screen();
                    Self::ensure_loaded(screen, model, caps);
                    caps.render.render();
                }

                Event::SessionChanged { session } => {
                    info!(
                        signed_in = session.is_some(),
                        role = session.as_ref().map(|s| s.role.as_str()),
                        "session changed"
                    );
                    model.session = session;
                    caps.render.render();
                }

                Event::SetLoading { active } => {
                    model.is_loading = active;
                    caps.render.render();
                }

                Event::ShowToast { message, kind } => {
                    model.show_toast(message, kind);
                    caps.render.render();
                }

                Event::DismissToast => {
                    model.clear_toast();
                    caps.render.render();
                }

                Event::TimerTick { now_ms } => {
                    if model.tick(now_ms) {
                        caps.render.render();
                    }
                }

                Event::RequestConfirmation(request) => {
                    model.confirmation.set(*request);
                    caps.render.render();
                }

                Event::ConfirmationConfirmed => {
                    if model.confirmation.is_empty() {
                        debug!("confirm with no pending request");
                        return;
                    }
                    // Clear first: a follow-up request made by the callback must survive.
                    let callback = model.confirmation.confirm();
                    caps.render.render();
                    if let Some(callback) = callback {
                        crux_core::App::update(self, callback, model, caps);
                    }
                }

                Event::ConfirmationCancelled => {
                    if model.confirmation.is_empty() {
                        debug!("cancel with no pending request");
                        return;
                    }
                    let callback = model.confirmation.cancel();
                    caps.render.render();
                    if let Some(callback) = callback {
                        crux_core::App::update(self, callback, model, caps);
                    }
                }

                Event::UploadFieldMounted { field, spec } => {
                    let upload = FileUpload::new(*spec, &model.config.upload);
                    let mounted = MountedUpload {
                        owner: model.current_screen(),
                        upload,
                    };
                    if let Some(previous) = model.uploads.insert(field.clone(), mounted) {
                        debug!(%field, "upload field remounted");
                        Self::revoke(previous.upload.release(), caps);
                    }
                    caps.render.render();
                }

                Event::UploadFieldUnmounted { field } => {
                    if let Some(mounted) = model.uploads.remove(&field) {
                        Self::revoke(mounted.upload.release(), caps);
                        caps.render.render();
                    }
                }

                Event::FileSelected { field, file } => {
                    let Some(upload) = Self::upload_mut(model, &field) else {
                        return;
                    };
                    let outcome = upload.select(file);
                    match upload.error() {
                        Some(error) => info!(%field, %error, "file rejected"),
                        None => info!(%field, accepted = outcome.file_change.is_some(), "file selection"),
                    }
                    Self::apply_preview_effects(&field, outcome.preview, caps);
                    caps.render.render();
                }

                Event::PreviewCreated {
                    field,
                    selection,
                    result,
                } => {
                    let result: FilesResult = *result;
                    match result {
                        Ok(FilesOutput::Preview(handle)) => match model.uploads.get_mut(&field) {
                            Some(mounted) => {
                                let stale = mounted.upload.preview_ready(selection, handle);
                                if stale.is_some() {
                                    debug!(%field, %selection, "preview for superseded selection");
                                }
                                Self::revoke(stale, caps);
                            }
                            None => Self::revoke(Some(handle), caps),
                        },
                        Ok(other) => {
                            warn!(%field, ?other, "unexpected files output for preview");
                            if let Some(upload) = Self::upload_mut(model, &field) {
                                upload.preview_failed(selection);
                            }
                        }
                        Err(e) => {
                            let error = Self::files_error(e);
                            warn!(%field, error = %error, "preview creation failed");
                            if let Some(upload) = Self::upload_mut(model, &field) {
                                upload.preview_failed(selection);
                            }
                        }
                    }
                    caps.render.render();
                }

                Event::CurrentImageUrlChanged { field, url } => {
                    let Some(upload) = Self::upload_mut(model, &field) else {
                        return;
                    };
                    let released = upload.set_current_image_url(url);
                    Self::revoke(released, caps);
                    caps.render.render();
                }

                Event::EncodeUploadRequested { field } => {
                    let Some(upload) = Self::upload_mut(model, &field) else {
                        return;
                    };
                    match upload.begin_encode() {
                        Some(file) => {
                            let event_file = file.clone();
                            caps.files.read_data_url(file, move |result| Event::DataUrlRead {
                                field,
                                file: event_file,
                                result: Box::new(result),
                            });
                        }
                        None => debug!(%field, "nothing to encode"),
                    }
                    caps.render.render();
                }

                Event::DataUrlRead {
                    field,
                    file,
                    result,
                } => {
                    let Some(upload) = Self::upload_mut(model, &field) else {
                        return;
                    };
                    let outcome = match *result {
                        Ok(FilesOutput::DataUrl(data_url)) => Ok(data_url),
                        Ok(other) => {
                            warn!(%field, ?other, "unexpected files output for data url");
                            Err(AppError::new(ErrorKind::InvalidState, "unexpected output")
                                .user_facing_message())
                        }
                        Err(e) => {
                            let error = Self::files_error(e);
                            warn!(%field, error = %error, "reading file failed");
                            Err(error.user_facing_message())
                        }
                    };
                    upload.finish_encode(&file, outcome);
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let view = model.route.view();

            ViewModel {
                screen: model.screens.state_for(&model.route),
                namespace: view.map(View::namespace),
                registration_role: view.and_then(View::registration_role),
                show_spinner: model.is_loading,
                toast: model.toast.as_ref().map(ToastView::from),
                confirmation: model.confirmation.pending().map(ConfirmationView::from),
                uploads: model
                    .uploads
                    .iter()
                    .map(|(id, mounted)| UploadFieldView::new(id, &mounted.upload))
                    .collect(),
                session: model.session.as_ref().map(SessionView::from),
            }
        }
    }
}
