//! Inline keyboard builders for every settings window.
//!
//! Pure functions from settings state to markup; all callback data goes
//! through [`CallbackPayload::encode`] so the button wiring and the
//! dispatcher cannot drift apart.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::callbacks::{CallbackPayload, GfAction, NavTarget, ToggleTarget};
use crate::cache::settings::{ChatSettings, GfConfig, GfKind};
use crate::db::types::{LanguageCode, MediaKind};

fn button(text: impl Into<String>, payload: CallbackPayload) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, payload.encode())
}

fn back_button() -> InlineKeyboardButton {
    button("🔙 Back", CallbackPayload::Nav(NavTarget::Back))
}

fn exit_button() -> InlineKeyboardButton {
    button("❌ Exit", CallbackPayload::Nav(NavTarget::Exit))
}

fn enabled_mark(enabled: bool) -> &'static str {
    if enabled {
        "✅"
    } else {
        "❌"
    }
}

pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button(
            "⚙️ General settings",
            CallbackPayload::Nav(NavTarget::General),
        )],
        vec![button(
            "👮 Admin settings",
            CallbackPayload::Nav(NavTarget::Admin),
        )],
        vec![exit_button()],
    ])
}

pub fn general(settings: &ChatSettings) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button(
            format!("🌐 Language: {}", settings.language_code.label()),
            CallbackPayload::Nav(NavTarget::Language),
        )],
        vec![button(
            format!(
                "⏰ Timezone: {}",
                settings.timezone.as_deref().unwrap_or("UTC")
            ),
            CallbackPayload::Nav(NavTarget::Timezone),
        )],
        vec![
            button(
                format!("✋ Greeting: {}", enabled_mark(settings.greeting.enabled)),
                CallbackPayload::Toggle(ToggleTarget::Greeting),
            ),
            button(
                "⚙️ Setup",
                CallbackPayload::Gf(GfKind::Greeting, GfAction::Open),
            ),
        ],
        vec![
            button(
                format!("👋 Farewell: {}", enabled_mark(settings.farewell.enabled)),
                CallbackPayload::Toggle(ToggleTarget::Farewell),
            ),
            button(
                "⚙️ Setup",
                CallbackPayload::Gf(GfKind::Farewell, GfAction::Open),
            ),
        ],
        vec![back_button(), exit_button()],
    ])
}

pub fn admin(settings: &ChatSettings) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button(
                enabled_mark(settings.reports_enabled),
                CallbackPayload::Toggle(ToggleTarget::Reports),
            ),
            button(
                "📕 Reports policy",
                CallbackPayload::Nav(NavTarget::ReportsPolicy),
            ),
        ],
        vec![back_button(), exit_button()],
    ])
}

/// Two languages per row, in the fixed enum order.
pub fn language() -> InlineKeyboardMarkup {
    let rows = LanguageCode::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|code| button(code.label(), CallbackPayload::SelectLanguage(*code)))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub fn timezone() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![back_button()]])
}

pub fn gf_menu(kind: GfKind, gf: &GfConfig) -> InlineKeyboardMarkup {
    let type_label = match kind {
        GfKind::Greeting => format!("⚙️ Greeting type: {}", gf.kind.label()),
        GfKind::Farewell => format!("⚙️ Farewell type: {}", gf.kind.label()),
    };

    InlineKeyboardMarkup::new(vec![
        vec![button(
            type_label,
            CallbackPayload::Gf(kind, GfAction::OpenKind),
        )],
        vec![
            button("📝 Text", CallbackPayload::Gf(kind, GfAction::OpenText)),
            button("♻️ Reset", CallbackPayload::Gf(kind, GfAction::ResetText)),
        ],
        vec![
            button("🖼 Media", CallbackPayload::Gf(kind, GfAction::OpenMedia)),
            button("♻️ Reset", CallbackPayload::Gf(kind, GfAction::ResetMedia)),
        ],
        vec![
            button("🆔 Topic ID", CallbackPayload::Gf(kind, GfAction::OpenTopic)),
            button("♻️ Reset", CallbackPayload::Gf(kind, GfAction::ResetTopic)),
        ],
        vec![
            back_button(),
            button("🗑 Reset all", CallbackPayload::Gf(kind, GfAction::ResetAll)),
        ],
    ])
}

pub fn gf_kind(kind: GfKind) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = MediaKind::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|media| {
                    button(
                        media.label(),
                        CallbackPayload::SelectMediaKind(kind, *media),
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![back_button()]);
    InlineKeyboardMarkup::new(rows)
}

/// Back + reset pair shared by the text, media and topic leaf windows.
pub fn gf_leaf(kind: GfKind, reset: GfAction) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        back_button(),
        button("♻️ Reset", CallbackPayload::Gf(kind, reset)),
    ]])
}

pub fn reports_policy() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button(
            "🔧 Set up a chat for reports",
            CallbackPayload::Nav(NavTarget::ReportsSpecialChat),
        )],
        vec![back_button()],
    ])
}

/// The choose-chat button prompts the owner to pick a chat and prefills
/// an inline query carrying the public token; the inline handler then
/// hands them the confirmation command.
pub fn reports_special_chat(public_token: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::switch_inline_query(
            "🔧 Choose chat",
            crate::bot::inline::assignment_query(public_token),
        )],
        vec![back_button()],
    ])
}

pub fn back_only() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![back_button()]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect()
    }

    #[test]
    fn test_language_keyboard_covers_all_languages() {
        let markup = language();
        let count: usize = markup.inline_keyboard.iter().map(|row| row.len()).sum();
        assert_eq!(count, LanguageCode::ALL.len());
        for row in &markup.inline_keyboard {
            assert!(row.len() <= 2);
        }
    }

    #[test]
    fn test_general_keyboard_reflects_toggles() {
        let mut settings = crate::cache::settings::tests::sample_settings();
        settings.greeting.enabled = false;
        let markup = general(&settings);
        let labels = labels(&markup);
        assert!(labels.iter().any(|l| l == "✋ Greeting: ❌"));
        assert!(labels.iter().any(|l| l == "👋 Farewell: ✅"));
    }

    #[test]
    fn test_gf_menu_shows_selected_type() {
        let mut gf = crate::cache::settings::tests::sample_settings().greeting;
        gf.kind = MediaKind::Gif;
        let markup = gf_menu(GfKind::Greeting, &gf);
        assert_eq!(
            markup.inline_keyboard[0][0].text,
            "⚙️ Greeting type: 🎞 GIF"
        );

        let markup = gf_menu(GfKind::Farewell, &gf);
        assert_eq!(
            markup.inline_keyboard[0][0].text,
            "⚙️ Farewell type: 🎞 GIF"
        );
    }
}
