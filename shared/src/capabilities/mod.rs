mod files;
mod kv;
mod screen_loader;

pub use self::files::{Files, FilesError, FilesOperation, FilesOutput, FilesResult};
pub use self::kv::{decode, encode, KvError, StoredRoute, LAST_ROUTE_KEY};
pub use self::screen_loader::{
    ScreenLoadError, ScreenLoadOperation, ScreenLoadResult, ScreenLoader,
};

pub use crux_core::render::Render;
pub use crux_kv::KeyValue;

use crate::event::Event;
use crate::{AppError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("Screen load error: {0}")]
    ScreenLoad(#[from] ScreenLoadError),

    #[error("File error: {0}")]
    Files(#[from] FilesError),

    #[error("Storage error: {0}")]
    Kv(#[from] KvError),
}

impl From<CapabilityError> for AppError {
    fn from(e: CapabilityError) -> Self {
        let kind = match &e {
            CapabilityError::ScreenLoad(_) => ErrorKind::ScreenLoad,
            CapabilityError::Files(_) => ErrorKind::FileAccess,
            CapabilityError::Kv(KvError::Serialization { .. }) => ErrorKind::Deserialization,
            CapabilityError::Kv(_) => ErrorKind::Storage,
        };
        AppError::new(kind, e.to_string())
    }
}

// Field types are spelled out (no aliases): the Effect derive names its
// variants after them.
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub key_value: KeyValue<Event>,
    pub screen_loader: ScreenLoader<Event>,
    pub files: Files<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_errors_map_to_error_kinds() {
        let storage = AppError::from(CapabilityError::from(KvError::Storage {
            message: "quota exceeded".into(),
        }));
        assert_eq!(storage.kind, ErrorKind::Storage);
        assert!(storage.is_retryable());

        let corrupt = AppError::from(CapabilityError::from(KvError::Serialization {
            message: "eof".into(),
        }));
        assert_eq!(corrupt.code(), "DESERIALIZATION_ERROR");

        let gone = AppError::from(CapabilityError::from(FilesError::FileGone {
            file: "input-0".into(),
        }));
        assert_eq!(gone.kind, ErrorKind::FileAccess);

        let chunk = AppError::from(CapabilityError::from(ScreenLoadError::NotFound {
            bundle: "admin/users".into(),
        }));
        assert_eq!(chunk.kind, ErrorKind::ScreenLoad);
    }
}
