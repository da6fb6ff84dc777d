use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Buyer,
    Vendor,
    Support,
    Admin,
}

impl AccountRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Vendor => "vendor",
            Self::Support => "support",
            Self::Admin => "admin",
        }
    }
}

/// Signed-in user as supplied by the external data layer. Read-only here.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub display_name: String,
    pub role: AccountRole,
    pub avatar_url: Option<String>,
}

// Redact debug output; display names are user-provided.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("avatar_present", &self.avatar_url.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_debug_hides_display_name() {
        let session = Session {
            user_id: UserId::new("u-1"),
            display_name: "Jane Roe".into(),
            role: AccountRole::Vendor,
            avatar_url: None,
        };
        let rendered = format!("{session:?}");
        assert!(rendered.contains("u-1"));
        assert!(!rendered.contains("Jane Roe"));
    }
}
