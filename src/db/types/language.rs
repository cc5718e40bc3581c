use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Chat interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[sea_orm(string_value = "en")]
    En,
    #[sea_orm(string_value = "uk")]
    Uk,
    #[sea_orm(string_value = "pl")]
    Pl,
    #[sea_orm(string_value = "de")]
    De,
    #[sea_orm(string_value = "ja")]
    Ja,
    #[sea_orm(string_value = "ru")]
    Ru,
}

impl Default for LanguageCode {
    fn default() -> Self {
        LanguageCode::En
    }
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 6] = [
        LanguageCode::En,
        LanguageCode::Uk,
        LanguageCode::Pl,
        LanguageCode::De,
        LanguageCode::Ja,
        LanguageCode::Ru,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "en" => Some(LanguageCode::En),
            "uk" => Some(LanguageCode::Uk),
            "pl" => Some(LanguageCode::Pl),
            "de" => Some(LanguageCode::De),
            "ja" => Some(LanguageCode::Ja),
            "ru" => Some(LanguageCode::Ru),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Uk => "uk",
            LanguageCode::Pl => "pl",
            LanguageCode::De => "de",
            LanguageCode::Ja => "ja",
            LanguageCode::Ru => "ru",
        }
    }

    /// Button label shown in the language picker.
    pub fn label(&self) -> &'static str {
        match self {
            LanguageCode::En => "🇺🇸 English",
            LanguageCode::Uk => "🇺🇦 Українська",
            LanguageCode::Pl => "🇵🇱 Polski",
            LanguageCode::De => "🇩🇪 Deutsch",
            LanguageCode::Ja => "🇯🇵 日本語",
            LanguageCode::Ru => "🇷🇺 Русский",
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrip() {
        for lang in LanguageCode::ALL {
            assert_eq!(LanguageCode::from_str(lang.as_str()), Some(lang));
        }
    }

    #[test]
    fn test_from_str_unknown() {
        assert_eq!(LanguageCode::from_str("xx"), None);
        assert_eq!(LanguageCode::from_str(""), None);
    }
}
