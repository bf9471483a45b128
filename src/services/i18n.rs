//! Dashboard navigation vocabulary in the supported interface languages.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::settings::Language;

type Catalog = HashMap<&'static str, &'static str>;

static CATALOGS: Lazy<HashMap<Language, Catalog>> = Lazy::new(|| {
    let table: [(Language, [(&'static str, &'static str); 9]); 6] = [
        (
            Language::En,
            [
                ("dashboard", "Dashboard"),
                ("profile", "Profile"),
                ("creditReport", "Credit Report"),
                ("scoreHistory", "Score History"),
                ("documents", "Documents"),
                ("settings", "Settings"),
                ("logout", "Logout"),
                ("welcome", "Welcome back"),
                ("creditScore", "Your Credit Score"),
            ],
        ),
        (
            Language::Es,
            [
                ("dashboard", "Panel"),
                ("profile", "Perfil"),
                ("creditReport", "Reporte de Crédito"),
                ("scoreHistory", "Historial de Puntuación"),
                ("documents", "Documentos"),
                ("settings", "Configuración"),
                ("logout", "Cerrar Sesión"),
                ("welcome", "Bienvenido de nuevo"),
                ("creditScore", "Tu Puntuación de Crédito"),
            ],
        ),
        (
            Language::Fr,
            [
                ("dashboard", "Tableau de bord"),
                ("profile", "Profil"),
                ("creditReport", "Rapport de crédit"),
                ("scoreHistory", "Historique des scores"),
                ("documents", "Documents"),
                ("settings", "Paramètres"),
                ("logout", "Déconnexion"),
                ("welcome", "Bon retour"),
                ("creditScore", "Votre score de crédit"),
            ],
        ),
        (
            Language::De,
            [
                ("dashboard", "Dashboard"),
                ("profile", "Profil"),
                ("creditReport", "Kreditbericht"),
                ("scoreHistory", "Score-Verlauf"),
                ("documents", "Dokumente"),
                ("settings", "Einstellungen"),
                ("logout", "Abmelden"),
                ("welcome", "Willkommen zurück"),
                ("creditScore", "Ihr Kredit-Score"),
            ],
        ),
        (
            Language::It,
            [
                ("dashboard", "Dashboard"),
                ("profile", "Profilo"),
                ("creditReport", "Rapporto di credito"),
                ("scoreHistory", "Cronologia punteggio"),
                ("documents", "Documenti"),
                ("settings", "Impostazioni"),
                ("logout", "Disconnetti"),
                ("welcome", "Bentornato"),
                ("creditScore", "Il tuo punteggio di credito"),
            ],
        ),
        (
            Language::Pt,
            [
                ("dashboard", "Painel"),
                ("profile", "Perfil"),
                ("creditReport", "Relatório de Crédito"),
                ("scoreHistory", "Histórico de Pontuação"),
                ("documents", "Documentos"),
                ("settings", "Configurações"),
                ("logout", "Sair"),
                ("welcome", "Bem-vindo de volta"),
                ("creditScore", "Sua pontuação de crédito"),
            ],
        ),
    ];

    table
        .into_iter()
        .map(|(language, entries)| (language, entries.into_iter().collect()))
        .collect()
});

/// Looks `key` up in `language`, then in English, then returns the key itself.
pub fn translate<'a>(language: Language, key: &'a str) -> &'a str {
    lookup(language, key)
        .or_else(|| lookup(Language::En, key))
        .unwrap_or(key)
}

fn lookup(language: Language, key: &str) -> Option<&'static str> {
    CATALOGS
        .get(&language)
        .and_then(|catalog| catalog.get(key))
        .copied()
}

pub fn keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = CATALOGS
        .get(&Language::En)
        .map(|catalog| catalog.keys().copied().collect())
        .unwrap_or_default();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_keys() {
        assert_eq!(translate(Language::Es, "settings"), "Configuración");
        assert_eq!(translate(Language::De, "logout"), "Abmelden");
    }

    #[test]
    fn unknown_key_falls_back_to_itself() {
        assert_eq!(translate(Language::Fr, "nonexistent"), "nonexistent");
    }

    #[test]
    fn every_language_covers_the_english_vocabulary() {
        for language in Language::ALL {
            for key in keys() {
                assert!(lookup(language, key).is_some(), "{language} is missing {key}");
            }
        }
    }
}
