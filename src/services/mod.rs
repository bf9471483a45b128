pub mod backend;
pub mod dashboard_service;
pub mod demo_service;
pub mod document_service;
pub mod i18n;
pub mod local_backend;
pub mod period_selector;
pub mod period_view;
pub mod profile_service;
pub mod rest_backend;
pub mod retry;
pub mod routes;
pub mod score_gauge;
pub mod settings_service;
pub mod view_scope;
