use std::time::Duration;

use creditai_app_lib::commands::documents::{documents_delete, documents_list, documents_upload};
use creditai_app_lib::commands::profile::{
    profile_avatar_upload, profile_get, profile_update, ProfileUpdatePayload,
};
use creditai_app_lib::commands::{AppState, NoticeVariant};
use creditai_app_lib::config::AppConfig;
use creditai_app_lib::db::DbPool;
use creditai_app_lib::models::document::UploadFile;
use creditai_app_lib::models::session::UserSession;
use creditai_app_lib::services::local_backend::{LocalBackend, LOCAL_OBJECT_SCHEME};
use serde_json::json;
use tempfile::{tempdir, TempDir};
use uuid::Uuid;

async fn setup() -> (AppState, LocalBackend, TempDir) {
    let dir = tempdir().expect("temp dir");
    let state = AppState::new(&AppConfig::local(dir.path())).expect("app state");
    let local = LocalBackend::new(DbPool::new(dir.path().join("creditai.sqlite")).expect("db pool"));
    let session = UserSession::new(Uuid::new_v4(), Some("ada@example.com".into()), "local");
    state.sign_in(session).await;
    (state, local, dir)
}

fn file(name: &str, size: usize) -> UploadFile {
    UploadFile {
        name: name.to_string(),
        mime_type: None,
        bytes: vec![7u8; size],
    }
}

#[tokio::test]
async fn test_upload_stores_object_then_metadata() {
    let (state, local, _dir) = setup().await;

    let outcome = documents_upload(&state, file("statement.pdf", 1536))
        .await
        .expect("upload command");
    assert!(outcome.is_success());
    assert_eq!(outcome.notice.description, "Document uploaded successfully");
    assert_eq!(outcome.notice.variant, NoticeVariant::Success);

    let view = outcome.value.expect("document view");
    assert_eq!(view.size_label, "1.5 KB");
    assert_eq!(view.record.mime_type, "application/pdf");
    assert!(!view.unsupported_type);

    let path = view
        .record
        .file_url
        .strip_prefix(&format!("{LOCAL_OBJECT_SCHEME}documents/"))
        .expect("local object url");
    assert!(path.ends_with(".pdf"));
    assert!(!path.contains("statement"));

    let bytes = local
        .read_object("documents", path)
        .await
        .expect("read object")
        .expect("object stored");
    assert_eq!(bytes.len(), 1536);
}

#[tokio::test]
async fn test_documents_list_newest_first_and_flags_unknown_types() {
    let (state, _local, _dir) = setup().await;

    documents_upload(&state, file("old.docx", 10)).await.expect("first upload");
    tokio::time::sleep(Duration::from_millis(5)).await;
    documents_upload(&state, file("notes.txt", 0)).await.expect("second upload");

    let documents = documents_list(&state).await.expect("list");
    let names: Vec<&str> = documents.iter().map(|doc| doc.record.name.as_str()).collect();
    assert_eq!(names, vec!["notes.txt", "old.docx"]);
    assert!(documents[0].unsupported_type);
    assert_eq!(documents[0].size_label, "0 Bytes");
}

#[tokio::test]
async fn test_delete_reports_success_then_failure() {
    let (state, _local, _dir) = setup().await;

    let uploaded = documents_upload(&state, file("id.png", 64))
        .await
        .expect("upload")
        .value
        .expect("document view");

    let deleted = documents_delete(&state, uploaded.record.id)
        .await
        .expect("delete command");
    assert!(deleted.is_success());
    assert_eq!(deleted.notice.description, "Document deleted successfully");
    assert!(documents_list(&state).await.expect("list").is_empty());

    let again = documents_delete(&state, uploaded.record.id)
        .await
        .expect("delete command");
    assert!(!again.is_success());
    assert_eq!(again.notice.description, "Failed to delete document");
    assert_eq!(again.error.expect("error").code, "NOT_FOUND");
}

#[tokio::test]
async fn test_avatar_upload_updates_profile() {
    let (state, _local, _dir) = setup().await;

    let empty = profile_avatar_upload(&state, Vec::new())
        .await
        .expect("avatar command");
    assert!(!empty.is_success());
    assert_eq!(empty.notice.description, "You must select an image to upload.");

    let outcome = profile_avatar_upload(&state, vec![file("me.PNG", 32)])
        .await
        .expect("avatar command");
    assert!(outcome.is_success());
    assert_eq!(outcome.notice.description, "Image uploaded successfully!");

    let profile = profile_get(&state).await.expect("profile");
    assert!(profile.avatar_url.starts_with("creditai-local://avatars/"));
    assert!(profile.avatar_url.ends_with(".png"));
    assert_eq!(profile.email, "ada@example.com");
}

#[tokio::test]
async fn test_profile_update_validates_and_persists() {
    let (state, _local, _dir) = setup().await;

    let empty = profile_get(&state).await.expect("profile");
    assert_eq!(empty.first_name, "");
    assert_eq!(empty.email, "ada@example.com");

    let payload: ProfileUpdatePayload = serde_json::from_value(json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "not-an-email"
    }))
    .expect("payload");
    let rejected = profile_update(&state, payload).await.expect("update command");
    assert!(!rejected.is_success());
    assert_eq!(rejected.notice.variant, NoticeVariant::Destructive);

    let payload: ProfileUpdatePayload = serde_json::from_value(json!({
        "firstName": " Ada ",
        "lastName": "Lovelace",
        "email": "ada@lovelace.dev"
    }))
    .expect("payload");
    let saved = profile_update(&state, payload).await.expect("update command");
    assert_eq!(saved.notice.description, "Profile updated successfully");

    let profile = profile_get(&state).await.expect("profile");
    assert_eq!(profile.first_name, "Ada");
    assert_eq!(profile.initials, "AL");
    assert_eq!(profile.email, "ada@lovelace.dev");
}
