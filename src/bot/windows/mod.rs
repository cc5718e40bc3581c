//! One module per window in the settings graph.

pub mod admin;
pub mod general;
pub mod gf;
pub mod language;
pub mod main_menu;
pub mod reports_policy;
pub mod reports_special_chat;
pub mod timezone;
