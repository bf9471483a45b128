pub mod credit_report_repository;
pub mod document_repository;
pub mod object_store_repository;
pub mod profile_repository;
pub mod score_history_repository;
pub mod user_settings_repository;
