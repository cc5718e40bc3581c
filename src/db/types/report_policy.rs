use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where report notifications are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[serde(rename_all = "snake_case")]
pub enum ReportPolicy {
    /// Reports go to the chat where the report was filed.
    #[sea_orm(string_value = "main_chat")]
    MainChat,
    /// Reports go to a designated special chat.
    #[sea_orm(string_value = "special_chat")]
    SpecialChat,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        ReportPolicy::MainChat
    }
}
