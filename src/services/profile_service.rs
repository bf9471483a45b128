use std::sync::Arc;

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::profile::{ProfilePatch, ProfileRecord, ProfileView};
use crate::models::session::UserSession;
use crate::services::backend::CreditBackend;
use crate::utils::format::initials;

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

pub struct ProfileService {
    backend: Arc<dyn CreditBackend>,
}

impl ProfileService {
    pub fn new(backend: Arc<dyn CreditBackend>) -> Self {
        Self { backend }
    }

    /// Form-ready profile. A missing row or missing columns become empty
    /// strings; the email falls back to the session's sign-in address.
    pub async fn load(&self, session: &UserSession) -> AppResult<ProfileView> {
        let record = self.backend.fetch_profile(session).await?;
        Ok(to_view(record.as_ref(), session))
    }

    pub async fn update_details(
        &self,
        session: &UserSession,
        input: ProfileUpdateInput,
    ) -> AppResult<ProfileView> {
        let email = input.email.trim().to_string();
        if !email.is_empty() && !email.contains('@') {
            return Err(AppError::validation_with_details(
                "email address is not valid",
                serde_json::json!({ "field": "email" }),
            ));
        }

        let patch = ProfilePatch {
            first_name: Some(input.first_name.trim().to_string()),
            last_name: Some(input.last_name.trim().to_string()),
            email: Some(email),
            avatar_url: None,
        };
        let record = self.backend.update_profile(session, &patch).await?;
        info!(target: "app::profile", user_id = %session.user_id, "profile details updated");
        Ok(to_view(Some(&record), session))
    }

    pub async fn update_avatar(
        &self,
        session: &UserSession,
        avatar_url: &str,
    ) -> AppResult<ProfileView> {
        let patch = ProfilePatch {
            avatar_url: Some(avatar_url.to_string()),
            ..ProfilePatch::default()
        };
        let record = self.backend.update_profile(session, &patch).await?;
        info!(target: "app::profile", user_id = %session.user_id, "profile avatar updated");
        Ok(to_view(Some(&record), session))
    }
}

pub fn to_view(record: Option<&ProfileRecord>, session: &UserSession) -> ProfileView {
    let text = |value: Option<&String>| value.map(|v| v.trim().to_string()).unwrap_or_default();

    let first_name = text(record.and_then(|r| r.first_name.as_ref()));
    let last_name = text(record.and_then(|r| r.last_name.as_ref()));
    let email = record
        .and_then(|r| r.email.as_ref())
        .filter(|value| !value.trim().is_empty())
        .or(session.email.as_ref())
        .cloned()
        .unwrap_or_default();

    ProfileView {
        initials: initials(&first_name, &last_name),
        avatar_url: text(record.and_then(|r| r.avatar_url.as_ref())),
        first_name,
        last_name,
        email,
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn missing_profile_falls_back_to_session_email() {
        let session = UserSession::new(Uuid::new_v4(), Some("ada@example.com".into()), "t");
        let view = to_view(None, &session);
        assert_eq!(view.email, "ada@example.com");
        assert_eq!(view.first_name, "");
        assert_eq!(view.initials, "");
    }

    #[test]
    fn stored_columns_win_over_session() {
        let session = UserSession::new(Uuid::new_v4(), Some("old@example.com".into()), "t");
        let record = ProfileRecord {
            id: session.user_id,
            first_name: Some("ada".into()),
            last_name: Some("Lovelace".into()),
            email: Some("ada@example.com".into()),
            avatar_url: None,
            updated_at: None,
        };
        let view = to_view(Some(&record), &session);
        assert_eq!(view.email, "ada@example.com");
        assert_eq!(view.initials, "AL");
        assert_eq!(view.avatar_url, "");
    }
}
