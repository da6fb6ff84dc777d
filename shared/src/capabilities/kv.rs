use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::view::Route;

/// Key under which the last rendered route is stored.
pub const LAST_ROUTE_KEY: &str = "route:last";

pub const MAX_VALUE_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, KvError> {
    let data = serde_json::to_vec(value).map_err(|e| KvError::Serialization {
        message: e.to_string(),
    })?;
    if data.len() > MAX_VALUE_SIZE {
        return Err(KvError::ValueTooLarge {
            size: data.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(data)
}

pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, KvError> {
    serde_json::from_slice(data).map_err(|e| KvError::Serialization {
        message: e.to_string(),
    })
}

/// Persisted form of the current-view slot. Stored as the raw path so an
/// identifier removed from a later build restores to the fallback screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRoute {
    pub path: String,
}

impl StoredRoute {
    #[must_use]
    pub fn from_route(route: &Route) -> Self {
        Self {
            path: route.as_path().to_string(),
        }
    }

    #[must_use]
    pub fn into_route(self) -> Route {
        Route::parse(&self.path)
    }
}
