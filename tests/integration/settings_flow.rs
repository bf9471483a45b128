use creditai_app_lib::commands::settings::{
    settings_get, settings_set_custom_colors, settings_set_language, settings_set_theme,
    SettingsUpdate, ThemeUpdatePayload,
};
use creditai_app_lib::commands::{AppState, NoticeVariant};
use creditai_app_lib::config::AppConfig;
use creditai_app_lib::models::session::UserSession;
use creditai_app_lib::models::settings::{Language, Theme, ThemeColors};
use creditai_app_lib::services::backend::CreditBackend;
use tempfile::{tempdir, TempDir};
use uuid::Uuid;

async fn setup() -> (AppState, UserSession, TempDir) {
    let dir = tempdir().expect("temp dir");
    let state = AppState::new(&AppConfig::local(dir.path())).expect("app state");
    let session = UserSession::new(Uuid::new_v4(), None, "local");
    state.sign_in(session.clone()).await;
    (state, session, dir)
}

async fn persisted(update: SettingsUpdate) {
    update
        .persist
        .expect("persist handle")
        .await
        .expect("persist task")
        .expect("settings persisted");
}

#[tokio::test]
async fn test_first_session_starts_with_defaults() {
    let (state, _session, _dir) = setup().await;
    let payload = settings_get(&state).expect("settings");
    assert_eq!(payload.settings.theme, Theme::System);
    assert_eq!(payload.settings.language, Language::En);
    assert_eq!(payload.last_custom_colors, ThemeColors::default());
    assert!(payload
        .labels
        .iter()
        .any(|label| label.key == "creditScore" && label.text == "Your Credit Score"));
}

#[tokio::test]
async fn test_theme_change_applies_locally_and_persists() {
    let (state, session, _dir) = setup().await;

    let update = settings_set_theme(&state, ThemeUpdatePayload { theme: Theme::Dark })
        .expect("theme command");
    assert!(update.outcome.is_success());
    assert_eq!(update.outcome.notice.title, "Theme Updated");
    assert_eq!(update.outcome.notice.description, "Theme changed to dark");
    assert_eq!(settings_get(&state).expect("settings").settings.theme, Theme::Dark);
    persisted(update).await;

    let stored = state
        .backend()
        .fetch_settings(&session)
        .await
        .expect("stored settings")
        .expect("row present");
    assert_eq!(stored.theme_mode.as_deref(), Some("dark"));
}

#[tokio::test]
async fn test_language_switch_translates_labels() {
    let (state, _session, _dir) = setup().await;

    let update = settings_set_language(&state, "es").expect("language command");
    assert_eq!(update.outcome.notice.description, "Language changed to Español");
    persisted(update).await;

    let payload = settings_get(&state).expect("settings");
    assert_eq!(payload.settings.language, Language::Es);
    assert!(payload
        .labels
        .iter()
        .any(|label| label.key == "settings" && label.text == "Configuración"));
    assert_eq!(state.settings().expect("context").translate("logout"), "Cerrar Sesión");
}

#[tokio::test]
async fn test_unsupported_language_is_reported_and_ignored() {
    let (state, _session, _dir) = setup().await;

    let update = settings_set_language(&state, "xx").expect("language command");
    assert!(!update.outcome.is_success());
    assert!(update.persist.is_none());
    assert_eq!(update.outcome.notice.variant, NoticeVariant::Destructive);
    assert_eq!(
        update.outcome.error.as_ref().map(|error| error.code.as_str()),
        Some("VALIDATION_ERROR")
    );
    assert_eq!(settings_get(&state).expect("settings").settings.language, Language::En);
}

#[tokio::test]
async fn test_custom_colors_are_validated_normalized_and_remembered() {
    let (state, _session, _dir) = setup().await;

    let invalid = settings_set_custom_colors(
        &state,
        ThemeColors {
            primary: "orange".into(),
            ..ThemeColors::default()
        },
    )
    .expect("colors command");
    assert!(!invalid.outcome.is_success());
    assert_eq!(settings_get(&state).expect("settings").settings.theme, Theme::System);

    let colors = ThemeColors {
        primary: "#AA3300".into(),
        ..ThemeColors::default()
    };
    let update = settings_set_custom_colors(&state, colors).expect("colors command");
    assert_eq!(update.outcome.notice.title, "Custom Colors Saved");
    persisted(update).await;

    let light = settings_set_theme(&state, ThemeUpdatePayload { theme: Theme::Light })
        .expect("theme command");
    persisted(light).await;

    let payload = settings_get(&state).expect("settings");
    assert_eq!(payload.settings.theme, Theme::Light);
    assert_eq!(payload.last_custom_colors.primary, "#aa3300");
}

#[tokio::test]
async fn test_rapid_changes_converge_to_latest_values() {
    let (state, session, _dir) = setup().await;

    let first = settings_set_theme(&state, ThemeUpdatePayload { theme: Theme::Dark })
        .expect("theme command");
    let second = settings_set_language(&state, "fr").expect("language command");
    let third = settings_set_theme(&state, ThemeUpdatePayload { theme: Theme::Light })
        .expect("theme command");
    for update in [first, second, third] {
        persisted(update).await;
    }

    let stored = state
        .backend()
        .fetch_settings(&session)
        .await
        .expect("stored settings")
        .expect("row present")
        .into_settings();
    assert_eq!(stored.theme, Theme::Light);
    assert_eq!(stored.language, Language::Fr);

    // A fresh session reads what was persisted.
    state.sign_out();
    let context = state.sign_in(session).await;
    assert_eq!(context.theme(), Theme::Light);
    assert_eq!(context.language(), Language::Fr);
}

#[tokio::test]
async fn test_settings_require_a_session() {
    let dir = tempdir().expect("temp dir");
    let state = AppState::new(&AppConfig::local(dir.path())).expect("app state");
    let error = settings_get(&state).expect_err("no session");
    assert_eq!(error.code, "UNAUTHENTICATED");
}
