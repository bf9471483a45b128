use uuid::Uuid;

use crate::models::document::{DocumentView, UploadFile};

use super::{notify, recover, AppState, CommandResult, Notice, WriteOutcome};

pub async fn documents_list(state: &AppState) -> CommandResult<Vec<DocumentView>> {
    let session = state.require_session()?;
    let result = state.documents().list(&session).await;
    Ok(recover("documents_list", result))
}

pub async fn documents_upload(
    state: &AppState,
    file: UploadFile,
) -> CommandResult<WriteOutcome<DocumentView>> {
    let session = state.require_session()?;
    let result = state.documents().upload(&session, file).await;
    Ok(notify(
        "documents_upload",
        result,
        |_| Notice::success("Success", "Document uploaded successfully"),
        "Failed to upload document",
    ))
}

pub async fn documents_delete(state: &AppState, id: Uuid) -> CommandResult<WriteOutcome<()>> {
    let session = state.require_session()?;
    let result = state.documents().delete(&session, id).await;
    Ok(notify(
        "documents_delete",
        result,
        |_| Notice::success("Success", "Document deleted successfully"),
        "Failed to delete document",
    ))
}
