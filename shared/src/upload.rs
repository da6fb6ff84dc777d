//! Single-file upload field: client-side size/format validation and preview
//! handle ownership.
//!
//! The field never uploads anything. It reports the accepted file (or `None`)
//! upward and tells the caller which preview handles to create or release.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::{AppError, ErrorKind};

pub const BYTES_PER_MB: f64 = 1_048_576.0;
pub const DEFAULT_MAX_SIZE_MB: f64 = 5.0;
pub const DEFAULT_ACCEPTED_FORMATS: &[&str] = &[".pdf", ".jpeg", ".jpg", ".png"];

/// Shell-side handle for a picked file. The bytes never enter the core.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

impl FileId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier for one selection event, used to drop stale preview results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionId(pub Uuid);

impl SelectionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Name of an upload field within a screen, e.g. `"kyc.passport"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UploadFieldId(pub String);

impl UploadFieldId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadFieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedFile {
    pub id: FileId,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl SelectedFile {
    #[must_use]
    pub fn size_mb(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let bytes = self.size_bytes as f64;
        bytes / BYTES_PER_MB
    }

    /// Lowercased final dot-segment with a leading `.`. A name without a dot
    /// yields the whole name as its extension.
    #[must_use]
    pub fn extension(&self) -> String {
        let last = self.name.rsplit('.').next().unwrap_or_default();
        format!(".{}", last.to_lowercase())
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.to_ascii_lowercase().starts_with("image/")
    }
}

/// A revocable preview resource created by the shell (object URL or similar).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewHandle(pub String);

impl PreviewHandle {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UploadConfig {
    /// Ordered; compared case-insensitively.
    pub accepted_formats: Vec<String>,
    pub max_size_mb: f64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            accepted_formats: DEFAULT_ACCEPTED_FORMATS
                .iter()
                .map(|f| (*f).to_string())
                .collect(),
            max_size_mb: DEFAULT_MAX_SIZE_MB,
        }
    }
}

impl UploadConfig {
    #[must_use]
    pub fn with_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_max_size_mb(mut self, max_size_mb: f64) -> Self {
        self.max_size_mb = max_size_mb;
        self
    }

    /// A NaN or non-positive limit would let every file through.
    pub fn check(&self) -> Result<(), AppError> {
        if !self.max_size_mb.is_finite() || self.max_size_mb <= 0.0 {
            return Err(AppError::new(
                ErrorKind::Validation,
                "max_size_mb must be a positive number",
            )
            .with_context("max_size_mb", self.max_size_mb.to_string()));
        }
        if self.accepted_formats.iter().all(|f| f.trim().is_empty()) {
            return Err(AppError::new(
                ErrorKind::Validation,
                "accepted_formats cannot be empty",
            ));
        }
        Ok(())
    }

    /// Size first, then format (extension or media-type token).
    pub fn validate(&self, file: &SelectedFile) -> Result<(), UploadError> {
        if file.size_mb() > self.max_size_mb {
            return Err(UploadError::TooLarge {
                max_mb: self.max_size_mb,
            });
        }

        let extension = file.extension();
        let mime = file.mime_type.to_ascii_lowercase();

        let extension_ok = self
            .accepted_formats
            .iter()
            .any(|format| format.eq_ignore_ascii_case(&extension));

        let mime_ok = self.accepted_formats.iter().any(|format| {
            let token = format.trim_start_matches('.').to_ascii_lowercase();
            !token.is_empty() && mime.contains(&token)
        });

        if extension_ok || mime_ok {
            Ok(())
        } else {
            Err(UploadError::UnsupportedFormat {
                accepted: self.accepted_formats.join(", "),
            })
        }
    }
}

/// Advisory validation failures. Rendered inline, never propagated.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
pub enum UploadError {
    #[error("File too large. Max size is {max_mb}MB.")]
    TooLarge { max_mb: f64 },

    #[error("Invalid file type. Accepted formats: {accepted}.")]
    UnsupportedFormat { accepted: String },
}

/// Static presentation options of a field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UploadFieldSpec {
    pub label: String,
    pub is_avatar: bool,
    pub current_image_url: Option<String>,
    #[serde(default)]
    pub config: Option<UploadConfig>,
}

impl UploadFieldSpec {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            is_avatar: false,
            current_image_url: None,
            config: None,
        }
    }

    #[must_use]
    pub fn avatar(mut self) -> Self {
        self.is_avatar = true;
        self
    }

    #[must_use]
    pub fn with_current_image(mut self, url: impl Into<String>) -> Self {
        self.current_image_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: UploadConfig) -> Self {
        self.config = Some(config);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Preview {
    /// Pre-existing remote image supplied by the owner of the field.
    Remote(String),
    /// Waiting for the shell to hand back a handle for this selection.
    Pending(SelectionId),
    /// Handle owned by this field.
    Local(PreviewHandle),
}

/// What the caller must do with preview resources after a state change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreviewEffects {
    pub create: Option<(SelectionId, FileId)>,
    pub release: Option<PreviewHandle>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectionOutcome {
    /// Value reported upward: the accepted file, or `None`.
    pub file_change: Option<SelectedFile>,
    pub preview: PreviewEffects,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EncodeState {
    Idle,
    Reading,
    Ready(String),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct FileUpload {
    spec: UploadFieldSpec,
    config: UploadConfig,
    accepted: Option<SelectedFile>,
    file_name: Option<String>,
    error: Option<UploadError>,
    preview: Option<Preview>,
    encode: EncodeState,
}

impl FileUpload {
    #[must_use]
    pub fn new(spec: UploadFieldSpec, default_config: &UploadConfig) -> Self {
        let config = match &spec.config {
            Some(own) => match own.check() {
                Ok(()) => own.clone(),
                Err(error) => {
                    warn!(label = %spec.label, error = %error, "invalid field upload config, using defaults");
                    default_config.clone()
                }
            },
            None => default_config.clone(),
        };
        let preview = spec.current_image_url.clone().map(Preview::Remote);
        Self {
            spec,
            config,
            accepted: None,
            file_name: None,
            error: None,
            preview,
            encode: EncodeState::Idle,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &UploadFieldSpec {
        &self.spec
    }

    #[must_use]
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    #[must_use]
    pub fn accepted_file(&self) -> Option<&SelectedFile> {
        self.accepted.as_ref()
    }

    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&UploadError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    #[must_use]
    pub fn encode_state(&self) -> &EncodeState {
        &self.encode
    }

    /// URL the shell should display, if any.
    #[must_use]
    pub fn preview_url(&self) -> Option<&str> {
        match &self.preview {
            Some(Preview::Remote(url)) => Some(url.as_str()),
            Some(Preview::Local(handle)) => Some(handle.url()),
            Some(Preview::Pending(_)) | None => None,
        }
    }

    /// Handles one file-picker result. `None` means the picker was cancelled.
    pub fn select(&mut self, file: Option<SelectedFile>) -> SelectionOutcome {
        self.encode = EncodeState::Idle;

        let Some(file) = file else {
            self.accepted = None;
            self.file_name = None;
            self.error = None;
            return SelectionOutcome {
                file_change: None,
                preview: PreviewEffects {
                    create: None,
                    release: self.clear_preview(),
                },
            };
        };

        if let Err(error) = self.config.validate(&file) {
            self.accepted = None;
            self.file_name = None;
            self.error = Some(error);
            return SelectionOutcome {
                file_change: None,
                preview: PreviewEffects::default(),
            };
        }

        self.error = None;
        self.file_name = Some(file.name.clone());
        self.accepted = Some(file.clone());

        let release = self.clear_preview();
        let create = if file.is_image() {
            let selection = SelectionId::generate();
            self.preview = Some(Preview::Pending(selection));
            Some((selection, file.id.clone()))
        } else {
            None
        };

        SelectionOutcome {
            file_change: Some(file),
            preview: PreviewEffects { create, release },
        }
    }

    /// Installs a handle produced by the shell. A handle for a superseded
    /// selection is handed back so the caller can release it.
    pub fn preview_ready(
        &mut self,
        selection: SelectionId,
        handle: PreviewHandle,
    ) -> Option<PreviewHandle> {
        match &self.preview {
            Some(Preview::Pending(pending)) if *pending == selection => {
                self.preview = Some(Preview::Local(handle));
                None
            }
            _ => Some(handle),
        }
    }

    pub fn preview_failed(&mut self, selection: SelectionId) {
        if matches!(&self.preview, Some(Preview::Pending(pending)) if *pending == selection) {
            self.preview = None;
        }
    }

    /// Resynchronizes with a new externally supplied image, replacing any
    /// local preview.
    pub fn set_current_image_url(&mut self, url: Option<String>) -> Option<PreviewHandle> {
        self.spec.current_image_url = url.clone();
        let released = self.clear_preview();
        self.preview = url.map(Preview::Remote);
        released
    }

    pub fn begin_encode(&mut self) -> Option<FileId> {
        let id = self.accepted.as_ref()?.id.clone();
        self.encode = EncodeState::Reading;
        Some(id)
    }

    /// Ignored unless a read for `file` is outstanding.
    pub fn finish_encode(&mut self, file: &FileId, result: Result<String, String>) {
        let current = self.accepted.as_ref().map(|f| &f.id);
        if self.encode != EncodeState::Reading || current != Some(file) {
            return;
        }
        self.encode = match result {
            Ok(data_url) => EncodeState::Ready(data_url),
            Err(reason) => EncodeState::Failed(reason),
        };
    }

    /// Teardown: returns the owned handle, if any.
    #[must_use]
    pub fn release(mut self) -> Option<PreviewHandle> {
        self.clear_preview()
    }

    fn clear_preview(&mut self) -> Option<PreviewHandle> {
        match self.preview.take() {
            Some(Preview::Local(handle)) => Some(handle),
            _ => None,
        }
    }
}
