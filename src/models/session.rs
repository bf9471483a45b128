use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An already authenticated caller. Every row read or written is scoped to
/// `user_id`; the access token is forwarded to the hosted backend as-is.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user_id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub access_token: String,
}

impl UserSession {
    pub fn new(user_id: Uuid, email: Option<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            email,
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
