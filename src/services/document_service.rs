use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::document::{
    DocumentInsert, DocumentRecord, DocumentView, StoredObject, UploadFile,
};
use crate::models::session::UserSession;
use crate::services::backend::{CreditBackend, AVATAR_BUCKET, DOCUMENT_BUCKET};
use crate::utils::format::human_file_size;

/// Extensions advertised by the file picker. Advisory only: other types are
/// stored and flagged, never rejected.
pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "jpg", "jpeg", "png"];

pub const EMPTY_IMAGE_SELECTION: &str = "You must select an image to upload.";
const EMPTY_DOCUMENT_SELECTION: &str = "You must select a file to upload.";
const FALLBACK_MIME: &str = "application/octet-stream";

pub struct DocumentService {
    backend: Arc<dyn CreditBackend>,
}

impl DocumentService {
    pub fn new(backend: Arc<dyn CreditBackend>) -> Self {
        Self { backend }
    }

    /// Newest first.
    pub async fn list(&self, session: &UserSession) -> AppResult<Vec<DocumentView>> {
        let records = self.backend.list_documents(session).await?;
        Ok(records.into_iter().map(DocumentView::from).collect())
    }

    /// Stores the bytes under a random object path, then records the metadata row.
    pub async fn upload(&self, session: &UserSession, file: UploadFile) -> AppResult<DocumentView> {
        if file.name.trim().is_empty() {
            return Err(AppError::validation(EMPTY_DOCUMENT_SELECTION));
        }

        let mime_type = resolve_mime(&file);
        let file_size = file.bytes.len() as u64;
        let path = object_path(&file.name);
        let stored = self
            .backend
            .upload_object(session, DOCUMENT_BUCKET, &path, file.bytes, &mime_type)
            .await?;

        let record = self
            .backend
            .insert_document(
                session,
                &DocumentInsert {
                    name: file.name,
                    mime_type,
                    file_size,
                    file_url: stored.public_url,
                },
            )
            .await?;

        info!(
            target: "app::documents",
            user_id = %session.user_id,
            document_id = %record.id,
            size = file_size,
            "document uploaded"
        );
        Ok(DocumentView::from(record))
    }

    pub async fn delete(&self, session: &UserSession, id: Uuid) -> AppResult<()> {
        self.backend.delete_document(session, id).await?;
        info!(target: "app::documents", user_id = %session.user_id, document_id = %id, "document deleted");
        Ok(())
    }

    /// Uploads the first selected image to the avatar bucket and returns its
    /// public location. The profile row is not touched here.
    pub async fn upload_avatar(
        &self,
        session: &UserSession,
        selection: Vec<UploadFile>,
    ) -> AppResult<StoredObject> {
        let Some(file) = selection.into_iter().next() else {
            return Err(AppError::validation(EMPTY_IMAGE_SELECTION));
        };
        if file.bytes.is_empty() {
            return Err(AppError::validation(EMPTY_IMAGE_SELECTION));
        }

        let mime_type = resolve_mime(&file);
        let path = object_path(&file.name);
        let stored = self
            .backend
            .upload_object(session, AVATAR_BUCKET, &path, file.bytes, &mime_type)
            .await?;
        info!(target: "app::documents", user_id = %session.user_id, path = %stored.path, "avatar uploaded");
        Ok(stored)
    }
}

impl From<DocumentRecord> for DocumentView {
    fn from(record: DocumentRecord) -> Self {
        let unsupported_type = !is_accepted(&record.name);
        Self {
            size_label: human_file_size(record.file_size),
            unsupported_type,
            record,
        }
    }
}

/// Lowercased extension after the last dot, if any.
pub fn file_extension(name: &str) -> Option<String> {
    let (stem, ext) = name.trim().rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_accepted(name: &str) -> bool {
    file_extension(name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Random object key `<uuid>.<ext>`; the original file name never reaches storage.
pub fn object_path(name: &str) -> String {
    match file_extension(name) {
        Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    }
}

fn resolve_mime(file: &UploadFile) -> String {
    if let Some(mime) = file.mime_type.as_deref().filter(|m| !m.trim().is_empty()) {
        return mime.trim().to_string();
    }
    let guessed = match file_extension(&file.name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => FALLBACK_MIME,
    };
    guessed.to_string()
}
