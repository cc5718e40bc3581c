//! Wire format for the inline-keyboard callbacks.
//!
//! Every button in the settings panel encodes one [`CallbackPayload`].
//! The format is a short prefixed string, small enough to stay well under
//! the platform's 64-byte callback-data limit:
//!
//! ```text
//! cs:<action>          navigation, toggles
//! cs:g:<action>        greeting block actions ("f" for farewell)
//! cs_sl:<code>         language selection
//! cs_gs:<kind>         greeting content-type selection ("cs_fs" for farewell)
//! ```

use crate::cache::settings::GfKind;
use crate::db::types::{LanguageCode, MediaKind};

/// Plain navigation between windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Exit,
    Back,
    General,
    Admin,
    Language,
    Timezone,
    ReportsPolicy,
    ReportsSpecialChat,
}

impl NavTarget {
    const ALL: [NavTarget; 8] = [
        NavTarget::Exit,
        NavTarget::Back,
        NavTarget::General,
        NavTarget::Admin,
        NavTarget::Language,
        NavTarget::Timezone,
        NavTarget::ReportsPolicy,
        NavTarget::ReportsSpecialChat,
    ];

    fn as_str(self) -> &'static str {
        match self {
            NavTarget::Exit => "exit",
            NavTarget::Back => "back",
            NavTarget::General => "general",
            NavTarget::Admin => "admin",
            NavTarget::Language => "language",
            NavTarget::Timezone => "timezone",
            NavTarget::ReportsPolicy => "reports_policy",
            NavTarget::ReportsSpecialChat => "reports_chat",
        }
    }

    fn from_str(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// Feature flags flipped directly from a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    Greeting,
    Farewell,
    Reports,
}

impl ToggleTarget {
    const ALL: [ToggleTarget; 3] = [
        ToggleTarget::Greeting,
        ToggleTarget::Farewell,
        ToggleTarget::Reports,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ToggleTarget::Greeting => "toggle_greeting",
            ToggleTarget::Farewell => "toggle_farewell",
            ToggleTarget::Reports => "toggle_reports",
        }
    }

    fn from_str(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// Actions inside the greeting/farewell configuration windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfAction {
    /// Open the configuration menu for this block.
    Open,
    OpenKind,
    OpenText,
    ResetText,
    OpenMedia,
    ResetMedia,
    OpenTopic,
    ResetTopic,
    ResetAll,
}

impl GfAction {
    const ALL: [GfAction; 9] = [
        GfAction::Open,
        GfAction::OpenKind,
        GfAction::OpenText,
        GfAction::ResetText,
        GfAction::OpenMedia,
        GfAction::ResetMedia,
        GfAction::OpenTopic,
        GfAction::ResetTopic,
        GfAction::ResetAll,
    ];

    fn as_str(self) -> &'static str {
        match self {
            GfAction::Open => "open",
            GfAction::OpenKind => "kind",
            GfAction::OpenText => "text",
            GfAction::ResetText => "text_reset",
            GfAction::OpenMedia => "media",
            GfAction::ResetMedia => "media_reset",
            GfAction::OpenTopic => "topic",
            GfAction::ResetTopic => "topic_reset",
            GfAction::ResetAll => "reset_all",
        }
    }

    fn from_str(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == raw)
    }
}

fn gf_tag(kind: GfKind) -> &'static str {
    match kind {
        GfKind::Greeting => "g",
        GfKind::Farewell => "f",
    }
}

fn gf_from_tag(raw: &str) -> Option<GfKind> {
    match raw {
        "g" => Some(GfKind::Greeting),
        "f" => Some(GfKind::Farewell),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackPayload {
    Nav(NavTarget),
    Toggle(ToggleTarget),
    Gf(GfKind, GfAction),
    SelectLanguage(LanguageCode),
    SelectMediaKind(GfKind, MediaKind),
}

impl CallbackPayload {
    pub fn encode(&self) -> String {
        match self {
            CallbackPayload::Nav(target) => format!("cs:{}", target.as_str()),
            CallbackPayload::Toggle(target) => format!("cs:{}", target.as_str()),
            CallbackPayload::Gf(kind, action) => {
                format!("cs:{}:{}", gf_tag(*kind), action.as_str())
            }
            CallbackPayload::SelectLanguage(code) => format!("cs_sl:{}", code.as_str()),
            CallbackPayload::SelectMediaKind(GfKind::Greeting, media) => {
                format!("cs_gs:{}", media.as_str())
            }
            CallbackPayload::SelectMediaKind(GfKind::Farewell, media) => {
                format!("cs_fs:{}", media.as_str())
            }
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(rest) = raw.strip_prefix("cs_sl:") {
            return LanguageCode::from_str(rest).map(CallbackPayload::SelectLanguage);
        }
        if let Some(rest) = raw.strip_prefix("cs_gs:") {
            return MediaKind::from_str(rest)
                .map(|m| CallbackPayload::SelectMediaKind(GfKind::Greeting, m));
        }
        if let Some(rest) = raw.strip_prefix("cs_fs:") {
            return MediaKind::from_str(rest)
                .map(|m| CallbackPayload::SelectMediaKind(GfKind::Farewell, m));
        }

        let rest = raw.strip_prefix("cs:")?;
        if let Some((tag, action)) = rest.split_once(':') {
            let kind = gf_from_tag(tag)?;
            let action = GfAction::from_str(action)?;
            return Some(CallbackPayload::Gf(kind, action));
        }
        if let Some(target) = NavTarget::from_str(rest) {
            return Some(CallbackPayload::Nav(target));
        }
        ToggleTarget::from_str(rest).map(CallbackPayload::Toggle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_payloads() -> Vec<CallbackPayload> {
        let mut payloads = Vec::new();
        for target in NavTarget::ALL {
            payloads.push(CallbackPayload::Nav(target));
        }
        for target in ToggleTarget::ALL {
            payloads.push(CallbackPayload::Toggle(target));
        }
        for kind in [GfKind::Greeting, GfKind::Farewell] {
            for action in GfAction::ALL {
                payloads.push(CallbackPayload::Gf(kind, action));
            }
            for media in MediaKind::ALL {
                payloads.push(CallbackPayload::SelectMediaKind(kind, media));
            }
        }
        for code in LanguageCode::ALL {
            payloads.push(CallbackPayload::SelectLanguage(code));
        }
        payloads
    }

    #[test]
    fn test_encode_parse_roundtrip() {
        for payload in all_payloads() {
            let raw = payload.encode();
            assert_eq!(
                CallbackPayload::parse(&raw),
                Some(payload),
                "failed for {:?} ({})",
                payload,
                raw
            );
        }
    }

    #[test]
    fn test_encoding_is_unique() {
        let encoded: Vec<String> = all_payloads().iter().map(|p| p.encode()).collect();
        let mut dedup = encoded.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(encoded.len(), dedup.len());
    }

    #[test]
    fn test_encoding_fits_platform_limit() {
        for payload in all_payloads() {
            assert!(payload.encode().len() <= 64);
        }
    }

    #[test]
    fn test_rejects_foreign_data() {
        assert_eq!(CallbackPayload::parse(""), None);
        assert_eq!(CallbackPayload::parse("cs:"), None);
        assert_eq!(CallbackPayload::parse("cs:nonsense"), None);
        assert_eq!(CallbackPayload::parse("cs:g:nonsense"), None);
        assert_eq!(CallbackPayload::parse("cs:x:text"), None);
        assert_eq!(CallbackPayload::parse("cs_sl:xx"), None);
        assert_eq!(CallbackPayload::parse("other_bot:button"), None);
    }
}
