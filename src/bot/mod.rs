pub mod callbacks;
pub mod commands;
pub mod fsm;
pub mod inline;
pub mod keyboards;
pub mod preview;
pub mod util;
pub mod windows;

use anyhow::Result;
use sea_orm::ActiveValue::Set;
use std::sync::Arc;
use teloxide::dispatching::{Dispatcher, UpdateFilterExt, UpdateHandler};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::db::types::ReportPolicy;
use fsm::engine::{Deps, Engine};
use util::best_effort;

pub use commands::Command;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const ASSIGNMENT_HELP_TEXT: &str = "💁‍♂️ This command confirms the chat that \
    should receive reports.\n\
    \n\
    1️⃣ Open the settings window in your chat with /chat_settings.\n\
    2️⃣ Go to 👮 Admin settings → 📕 Reports policy → 🔧 Set up a chat for \
    reports.\n\
    3️⃣ Press 🔧 Choose chat and pick the target chat; the bot prepares the \
    full command for you.\n\
    \n\
    ⚠️ The command only works with the token pair the bot hands out; sending \
    it by hand will not set anything up.";

const ASSIGNMENT_FAILED_TEXT: &str = "⚠️ Chat for reports is not set.";

pub async fn run(bot: Bot, deps: Arc<Deps>) -> Result<()> {
    info!("Starting Telegram bot...");

    let engine = Arc::new(Engine::new());

    setup_commands(&bot).await;

    Dispatcher::builder(bot, build_handler_tree())
        .dependencies(dptree::deps![deps, engine])
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn build_handler_tree() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let command_handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command);

    // Anything that is not a command may be input for the active window.
    let input_handler = Update::filter_message().endpoint(handle_input);

    let callback_handler = Update::filter_callback_query().endpoint(handle_callback);
    let inline_handler = Update::filter_inline_query().endpoint(handle_inline_query);

    dptree::entry()
        .branch(command_handler)
        .branch(input_handler)
        .branch(callback_handler)
        .branch(inline_handler)
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    deps: Arc<Deps>,
    engine: Arc<Engine>,
) -> HandlerResult {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::ChatSettings => {
            if !msg.chat.is_group() && !msg.chat.is_supergroup() {
                return Ok(());
            }
            if !sender_is_admin(&bot, &msg).await? {
                return Ok(());
            }
            engine.start(bot, deps, msg).await?;
        }
        Command::SetReportsSpecialChat(args) => {
            confirm_special_chat(bot, deps, msg, &args).await?;
        }
        Command::Exit => {
            engine.handle_exit_command(bot, deps, msg, true).await?;
        }
        Command::Cancel => {
            engine.handle_exit_command(bot, deps, msg, false).await?;
        }
    }
    Ok(())
}

async fn handle_input(
    bot: Bot,
    msg: Message,
    deps: Arc<Deps>,
    engine: Arc<Engine>,
) -> HandlerResult {
    engine.handle_input(bot, deps, msg).await?;
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    deps: Arc<Deps>,
    engine: Arc<Engine>,
) -> HandlerResult {
    engine.handle_callback(bot, deps, q).await?;
    Ok(())
}

async fn handle_inline_query(bot: Bot, q: InlineQuery, deps: Arc<Deps>) -> HandlerResult {
    inline::handle_inline_query(bot, deps, q).await?;
    Ok(())
}

async fn sender_is_admin(bot: &Bot, msg: &Message) -> Result<bool> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(false);
    };
    let member = bot.get_chat_member(msg.chat.id, user.id).await?;
    Ok(member.is_privileged())
}

/// `/set_reports_special_chat <public>:<secret>`, sent from inside the
/// target chat. A valid token pair rewires the origin chat's reports to
/// the chat the command was sent in.
async fn confirm_special_chat(
    bot: Bot,
    deps: Arc<Deps>,
    msg: Message,
    args: &str,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let args = args.trim();
    if args.is_empty() {
        bot.send_message(msg.chat.id, ASSIGNMENT_HELP_TEXT)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let Some((public_token, secret_token)) = args.split_once(':') else {
        bot.send_message(msg.chat.id, ASSIGNMENT_FAILED_TEXT)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    };

    let Some(pending) = deps
        .pending
        .confirm(user.id.0, public_token, secret_token)
        .await?
    else {
        bot.send_message(msg.chat.id, ASSIGNMENT_FAILED_TEXT)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    };

    // Single use: a confirmed pair must not be replayable.
    if let Err(e) = deps.pending.delete_for_user(user.id.0).await {
        warn!("Failed to drop confirmed pending records: {:#}", e);
    }

    let target_chat_id = msg.chat.id.0;
    deps.store
        .update(pending.origin_chat_id, move |row| {
            row.reports_special_chat_id = Set(Some(target_chat_id));
            row.reports_policy = Set(ReportPolicy::SpecialChat);
        })
        .await?;

    bot.send_message(msg.chat.id, "✅ This chat will now receive reports!")
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    // The assignment window in the origin chat still shows the stale
    // state; rewrite it so the admin sees the result without switching
    // back blind.
    best_effort(
        "update assignment window after confirmation",
        bot.edit_message_text(
            ChatId(pending.origin_chat_id),
            teloxide::types::MessageId(pending.origin_message_id),
            format!(
                "✅ Chat for reports has been saved:\n\
                \n\
                <blockquote>CHAT_ID: {}</blockquote>\n\
                \n\
                💁‍♂️ You can now return to the settings window.",
                target_chat_id
            ),
        )
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::back_only()),
    )
    .await;

    Ok(())
}

async fn setup_commands(bot: &Bot) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to set bot commands: {:#}", e);
    } else {
        info!("✅ Registered bot commands");
    }
}
