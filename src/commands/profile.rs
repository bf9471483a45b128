use serde::Deserialize;

use crate::models::document::UploadFile;
use crate::models::profile::ProfileView;
use crate::services::profile_service::ProfileUpdateInput;

use super::{notify, recover, AppState, CommandResult, Notice, WriteOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdatePayload {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
}

impl ProfileUpdatePayload {
    fn into_input(self) -> ProfileUpdateInput {
        ProfileUpdateInput {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

/// A failed read leaves the form empty.
pub async fn profile_get(state: &AppState) -> CommandResult<ProfileView> {
    let session = state.require_session()?;
    let result = state.profile().load(&session).await;
    Ok(recover("profile_get", result))
}

pub async fn profile_update(
    state: &AppState,
    payload: ProfileUpdatePayload,
) -> CommandResult<WriteOutcome<ProfileView>> {
    let session = state.require_session()?;
    let result = state
        .profile()
        .update_details(&session, payload.into_input())
        .await;
    Ok(notify(
        "profile_update",
        result,
        |_| Notice::success("Success", "Profile updated successfully"),
        "Failed to update profile",
    ))
}

/// Uploads the picked image and points the profile at it.
pub async fn profile_avatar_upload(
    state: &AppState,
    selection: Vec<UploadFile>,
) -> CommandResult<WriteOutcome<ProfileView>> {
    let session = state.require_session()?;
    let stored = match state.documents().upload_avatar(&session, selection).await {
        Ok(stored) => stored,
        Err(error) => {
            return Ok(notify(
                "profile_avatar_upload",
                Err(error),
                |_| Notice::success("Success", "Image uploaded successfully!"),
                "Error uploading image",
            ))
        }
    };

    let result = state
        .profile()
        .update_avatar(&session, &stored.public_url)
        .await;
    Ok(notify(
        "profile_avatar_update",
        result,
        |_| Notice::success("Success", "Image uploaded successfully!"),
        "Failed to update profile image",
    ))
}
