use serde::{Deserialize, Serialize};

use crate::upload::UploadConfig;
use crate::view::View;
use crate::{AppError, ErrorKind};

/// Shell-supplied settings. Every field has a default so a partial JSON
/// document is enough.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub initial_view: View,
    pub restore_last_view: bool,
    pub upload: UploadConfig,
    /// Overrides the per-kind toast durations when set.
    pub toast_duration_ms: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_view: View::Home,
            restore_last_view: true,
            upload: UploadConfig::default(),
            toast_duration_ms: None,
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| AppError::new(ErrorKind::Deserialization, e.to_string()))?;
        config.validated()
    }

    pub fn validated(self) -> Result<Self, AppError> {
        self.upload
            .check()
            .map_err(|e| e.with_context("section", "upload"))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.upload.max_size_mb, 5.0);
        assert_eq!(
            config.upload.accepted_formats,
            vec![".pdf", ".jpeg", ".jpg", ".png"]
        );
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = AppConfig::from_json(
            r#"{ "initial_view": "catalog", "upload": { "accepted_formats": [".png"], "max_size_mb": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.initial_view, View::Catalog);
        assert!(config.restore_last_view);
        assert_eq!(config.upload.accepted_formats, vec![".png"]);
        assert_eq!(config.upload.max_size_mb, 2.0);
    }

    #[test]
    fn rejects_non_positive_size_limit() {
        let err = AppConfig::from_json(
            r#"{ "upload": { "accepted_formats": [".png"], "max_size_mb": 0 } }"#,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = AppConfig::from_json("{ not json").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deserialization);
    }

    #[test]
    fn unknown_view_is_a_deserialization_error() {
        let err = AppConfig::from_json(r#"{ "initial_view": "warehouse" }"#).unwrap_err();
        assert_eq!(err.code(), "DESERIALIZATION_ERROR");
    }
}
