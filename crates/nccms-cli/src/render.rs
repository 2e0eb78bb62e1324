//! Plain-text rendering of views for the terminal

use nccms_client::views::Dashboard;
use nccms_core::{Hero, Session};
use std::fmt::Write as _;

const DASH: &str = "\u{2014}";

fn or_dash(value: Option<&String>) -> &str {
    value.map_or(DASH, String::as_str)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}\u{2026}")
}

/// Hero table, active row marked with `*`
#[must_use]
pub(crate) fn hero_table(heroes: &[Hero]) -> String {
    if heroes.is_empty() {
        return "No hero blocks found. Create a new hero to get started.\n".to_string();
    }

    let mut out = format!(
        "{:<6} {:<2} {:<36} {:<24} {:<8}\n",
        "ID", "", "TITLE", "PRIMARY CTA", "BG"
    );
    for hero in heroes {
        let _ = writeln!(
            out,
            "{:<6} {:<2} {:<36} {:<24} {:<8}",
            hero.id,
            if hero.is_active { "*" } else { "" },
            truncate(hero.display_title(), 36),
            truncate(or_dash(hero.cta_primary_label.as_ref()), 24),
            hero.bg_type,
        );
    }
    out
}

/// Every field of one hero
#[must_use]
pub(crate) fn hero_detail(hero: &Hero) -> String {
    let rows = [
        ("ID", hero.id.to_string()),
        ("Title", hero.display_title().to_string()),
        ("Subtitle", or_dash(hero.subtitle.as_ref()).to_string()),
        ("Primary CTA", or_dash(hero.cta_primary_label.as_ref()).to_string()),
        ("Primary link", or_dash(hero.cta_primary_href.as_ref()).to_string()),
        ("Secondary CTA", or_dash(hero.cta_secondary_label.as_ref()).to_string()),
        ("Secondary link", or_dash(hero.cta_secondary_href.as_ref()).to_string()),
        ("Background", hero.bg_type.to_string()),
        ("Media", hero.bg_media_url.clone().unwrap_or_else(|| "No image".to_string())),
        ("Active", if hero.is_active { "yes" } else { "no" }.to_string()),
    ];

    rows.iter().fold(String::new(), |mut out, (label, value)| {
        let _ = writeln!(out, "{label:<15} {value}");
        out
    })
}

/// One line per dashboard card
#[must_use]
pub(crate) fn dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    for card in &dashboard.cards {
        let _ = writeln!(
            out,
            "{:<18} {:>12}   {}",
            card.title,
            card.record_label(),
            card.meta_label()
        );
    }
    out
}

/// Session summary; token values are never printed
#[must_use]
pub(crate) fn session_status(session: &Session) -> String {
    let state = if session.is_authenticated() {
        "logged in"
    } else if session.refresh_token.is_some() {
        "access token missing, refresh token present"
    } else {
        "logged out (read-only)"
    };

    let mut out = format!("Session: {state}\n");
    if let Some(username) = &session.remembered_username {
        let _ = writeln!(out, "Remembered user: {username}");
    }
    out
}
