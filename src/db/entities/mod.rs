pub mod chat_settings;
pub mod chats;
