use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "Supported commands:")]
pub enum Command {
    #[command(description = "show this help")]
    Help,
    #[command(description = "open the chat settings window (admins only)")]
    ChatSettings,
    #[command(description = "confirm the chat for reports\n  usage: /set_reports_special_chat <public>:<secret>")]
    SetReportsSpecialChat(String),
    #[command(description = "save the settings and close the window")]
    Exit,
    #[command(description = "close the settings window without the closing summary")]
    Cancel,
}
