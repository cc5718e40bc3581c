//! Event handling and transition execution for the window graph.
//!
//! The engine owns the static window registry and the per-chat
//! conversation slots. Every inbound event is funneled through the same
//! shape: acquire the conversation, run the ownership gate, dispatch to
//! the active window's handler, execute the returned transition, write
//! the mutated state back.

use anyhow::{Context as _, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardMarkup, MessageId, ParseMode, ReplyParameters, ThreadId, User,
};
use tracing::{debug, warn};

use super::registry::WindowRegistry;
use super::{cleanup, Conversation, ConversationStore, FsmData, FsmPatch, Transition, WindowId};
use crate::bot::callbacks::{CallbackPayload, NavTarget};
use crate::bot::util::best_effort;
use crate::cache::chat_member::BotMemberCache;
use crate::cache::pending::PendingStore;
use crate::cache::settings::ChatSettings;
use crate::config::MediaConfig;
use crate::db::entities::chat_settings;
use crate::db::repo::Repo;
use crate::store::SettingsStore;

const EXIT_TEXT: &str = "✅ Chat settings saved!";

/// Shared collaborators injected into every handler.
pub struct Deps {
    pub repo: Arc<Repo>,
    pub store: SettingsStore,
    pub pending: PendingStore,
    pub members: BotMemberCache,
    pub media: MediaConfig,
}

/// The inbound event that woke the conversation.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// A command or free-text/media reply from the owner.
    Message(Box<Message>),
    /// A button press on one of our screens.
    Callback {
        query: Box<CallbackQuery>,
        screen: MessageId,
        screen_is_topic: bool,
        payload: CallbackPayload,
    },
}

/// Everything a window handler may touch during one turn.
pub struct Ctx {
    pub bot: Bot,
    pub deps: Arc<Deps>,
    pub chat_id: ChatId,
    pub user: User,
    pub window: WindowId,
    /// Whether the current entry is a fresh user-visible turn.
    pub fresh: bool,
    pub data: FsmData,
    pub trigger: Trigger,
}

impl Ctx {
    pub fn thread_id(&self) -> Option<ThreadId> {
        self.data.current_topic_id.map(|id| ThreadId(MessageId(id)))
    }

    /// The message id of the screen this turn should edit.
    pub fn screen_id(&self) -> Option<MessageId> {
        self.data.current_message_id.map(MessageId).or(match &self.trigger {
            Trigger::Callback { screen, .. } => Some(*screen),
            Trigger::Message(_) => None,
        })
    }

    /// The free-text/media message that triggered this turn, if any.
    pub fn input(&self) -> Option<&Message> {
        match &self.trigger {
            Trigger::Message(msg) => Some(msg),
            Trigger::Callback { .. } => None,
        }
    }

    pub fn screen_is_topic(&self) -> bool {
        matches!(
            self.trigger,
            Trigger::Callback {
                screen_is_topic: true,
                ..
            }
        )
    }

    pub async fn settings(&self) -> Result<ChatSettings> {
        self.deps.store.get(self.chat_id.0).await
    }

    pub async fn update_settings<F>(&self, mutate: F) -> Result<ChatSettings>
    where
        F: FnOnce(&mut chat_settings::ActiveModel) + Send,
    {
        self.deps.store.update(self.chat_id.0, mutate).await
    }

    /// Send a new screen message and record it as the current screen.
    pub async fn send_screen(
        &mut self,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<MessageId> {
        self.send_screen_inner(text, keyboard, None).await
    }

    /// Like [`Ctx::send_screen`], replying to an existing message (used to
    /// anchor a menu under its live preview).
    pub async fn send_screen_replying(
        &mut self,
        text: &str,
        keyboard: InlineKeyboardMarkup,
        reply_to: MessageId,
    ) -> Result<MessageId> {
        self.send_screen_inner(text, keyboard, Some(reply_to)).await
    }

    async fn send_screen_inner(
        &mut self,
        text: &str,
        keyboard: InlineKeyboardMarkup,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId> {
        let mut request = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard);
        if let Some(thread) = self.thread_id() {
            request = request.message_thread_id(thread);
        }
        if let Some(reply_to) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(reply_to));
        }

        let sent = request.await.context("failed to send settings screen")?;
        self.data.current_message_id = Some(sent.id.0);
        Ok(sent.id)
    }

    /// Edit the current screen in place. A failed edit is fatal to the
    /// turn: without it the conversation has no valid screen reference.
    pub async fn edit_screen(
        &mut self,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<MessageId> {
        let target = self
            .screen_id()
            .context("no current screen message to edit")?;
        let sent = self
            .bot
            .edit_message_text(self.chat_id, target, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .context("failed to edit settings screen")?;
        self.data.current_message_id = Some(sent.id.0);
        Ok(sent.id)
    }

    /// Edit the current screen to a bare text, dropping its keyboard.
    pub async fn edit_screen_plain(&self, text: &str) -> Result<()> {
        let target = self
            .screen_id()
            .context("no current screen message to edit")?;
        self.bot
            .edit_message_text(self.chat_id, target, text)
            .parse_mode(ParseMode::Html)
            .await
            .context("failed to edit settings screen")?;
        Ok(())
    }

    /// Answer the pending callback query with an alert popup.
    pub async fn alert(&self, text: &str) {
        if let Trigger::Callback { query, .. } = &self.trigger {
            best_effort(
                "answer callback with alert",
                self.bot
                    .answer_callback_query(query.id.clone())
                    .text(text)
                    .show_alert(true),
            )
            .await;
        }
    }

    /// Acknowledge the pending callback query so the client stops its
    /// progress spinner. Harmless if the handler already answered it.
    pub async fn ack(&self) {
        if let Trigger::Callback { query, .. } = &self.trigger {
            best_effort(
                "acknowledge callback",
                self.bot.answer_callback_query(query.id.clone()),
            )
            .await;
        }
    }

    /// Answer the pending callback query with a small transient notice.
    pub async fn notice(&self, text: &str) {
        if let Trigger::Callback { query, .. } = &self.trigger {
            best_effort(
                "answer callback with notice",
                self.bot
                    .answer_callback_query(query.id.clone())
                    .text(text),
            )
            .await;
        }
    }

    /// Queue the current screen for deletion on the next sweep.
    pub fn queue_screen(&mut self) {
        if let Some(id) = self.screen_id() {
            self.data.bot_messages_to_delete.insert(id.0);
        }
    }

    /// Queue the live preview message for deletion on the next sweep.
    pub fn queue_preview(&mut self) {
        if let Some(id) = self.data.preview_message_id {
            self.data.bot_messages_to_delete.insert(id);
        }
    }

    pub fn queue_user_message(&mut self, id: MessageId) {
        self.data.user_messages_to_delete.insert(id.0);
    }

    /// Run the message sweep against this conversation's queues.
    pub async fn sweep(&mut self, extra_user_messages: &[i32], extend: bool) -> Result<()> {
        cleanup::sweep(
            &self.bot,
            &self.deps.members,
            self.chat_id,
            &mut self.data,
            extra_user_messages,
            extend,
        )
        .await
    }
}

pub type HandlerFuture<'a, T = Transition> =
    Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// The ownership gate applied to every callback before any window handler
/// runs: only the recorded owner may act, and only on the recorded
/// current screen.
pub fn gate_allows(
    owner_id: u64,
    current_message_id: Option<i32>,
    actor_id: u64,
    screen_id: i32,
) -> bool {
    owner_id != 0 && actor_id == owner_id && current_message_id == Some(screen_id)
}

pub struct Engine {
    registry: WindowRegistry,
    conversations: ConversationStore,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            registry: WindowRegistry::new(),
            conversations: ConversationStore::new(),
        }
    }

    /// Open a fresh conversation at the main window. Replaces any
    /// previous conversation in the chat.
    pub async fn start(&self, bot: Bot, deps: Arc<Deps>, msg: Message) -> Result<()> {
        let Some(user) = msg.from.clone() else {
            return Ok(());
        };
        let chat_id = msg.chat.id;

        // First contact with a chat creates its rows.
        let chat_type = if msg.chat.is_supergroup() {
            "supergroup"
        } else {
            "group"
        };
        deps.repo
            .upsert_chat(
                chat_id.0,
                chat_type.to_string(),
                msg.chat.title().map(str::to_string),
            )
            .await?;
        let language_hint = user
            .language_code
            .as_deref()
            .and_then(crate::db::types::LanguageCode::from_str);
        deps.store.ensure(chat_id.0, language_hint).await?;

        let slot = self.conversations.begin(chat_id).await;
        let mut conv = slot.lock().await;
        conv.data.owner_id = user.id.0;
        conv.data.current_topic_id = msg.thread_id.map(|t| t.0 .0);

        let mut ctx = Ctx {
            bot,
            deps,
            chat_id,
            user,
            window: WindowId::Main,
            fresh: true,
            data: conv.data.clone(),
            trigger: Trigger::Message(Box::new(msg)),
        };

        if let Err(e) = self.enter(&mut ctx).await {
            self.abandon(&mut conv, chat_id).await;
            return Err(e);
        }

        conv.window = ctx.window;
        conv.data = ctx.data;
        Ok(())
    }

    /// Dispatch a button press to the active window.
    pub async fn handle_callback(
        &self,
        bot: Bot,
        deps: Arc<Deps>,
        q: CallbackQuery,
    ) -> Result<()> {
        let Some(raw) = q.data.as_deref() else {
            return Ok(());
        };
        let Some(payload) = CallbackPayload::parse(raw) else {
            debug!("Ignoring unrecognized callback data: {}", raw);
            return Ok(());
        };
        let Some(message) = q.message.as_ref() else {
            // Inaccessible message: the gate cannot match it to a screen.
            return Ok(());
        };
        let chat_id = message.chat().id;
        let screen = message.id();
        let screen_is_topic = message
            .regular_message()
            .map(|m| m.is_topic_message)
            .unwrap_or(false);

        let Some(slot) = self.conversations.get(chat_id).await else {
            self.reject(&bot, &q).await;
            return Ok(());
        };
        let mut conv = slot.lock().await;
        if conv.finished {
            self.reject(&bot, &q).await;
            return Ok(());
        }

        if !gate_allows(
            conv.data.owner_id,
            conv.data.current_message_id,
            q.from.id.0,
            screen.0,
        ) {
            self.reject(&bot, &q).await;
            return Ok(());
        }

        let user = q.from.clone();
        let mut ctx = Ctx {
            bot,
            deps,
            chat_id,
            user,
            window: conv.window,
            fresh: true,
            data: conv.data.clone(),
            trigger: Trigger::Callback {
                query: Box::new(q),
                screen,
                screen_is_topic,
                payload,
            },
        };

        // The exit button works identically from every window; no window
        // registers a handler for it.
        let outcome = if payload == CallbackPayload::Nav(NavTarget::Exit) {
            self.run(&mut ctx, Ok(Transition::Exit { finalize: true }))
                .await
        } else {
            let definition = self.registry.get(ctx.window)?;
            let handler = definition
                .actions
                .iter()
                .find(|(predicate, _)| predicate.matches(ctx.window, &payload))
                .map(|(_, handler)| *handler);

            match handler {
                Some(handler) => {
                    let result = handler(&mut ctx).await;
                    self.run(&mut ctx, result).await
                }
                None => {
                    // A window with no handler for this action: tell the
                    // user instead of silently dropping the press.
                    debug!(
                        "Unmatched action {:?} in window {:?} (chat {})",
                        payload, ctx.window, chat_id
                    );
                    ctx.notice("⚠️ This action is not available here").await;
                    Ok(true)
                }
            }
        };

        if outcome.is_ok() {
            ctx.ack().await;
        }
        self.commit(ctx, conv, chat_id, outcome).await
    }

    /// Dispatch a free-text or media message from the conversation owner
    /// to the active window's input handlers. Messages that no handler
    /// claims are ignored (ordinary chat traffic).
    pub async fn handle_input(&self, bot: Bot, deps: Arc<Deps>, msg: Message) -> Result<()> {
        let chat_id = msg.chat.id;
        let Some(slot) = self.conversations.get(chat_id).await else {
            return Ok(());
        };
        let mut conv = slot.lock().await;
        if conv.finished {
            return Ok(());
        }
        let Some(user) = msg.from.clone() else {
            return Ok(());
        };
        if user.id.0 != conv.data.owner_id {
            return Ok(());
        }

        let definition = self.registry.get(conv.window)?;
        let Some(handler) = definition
            .inputs
            .iter()
            .find(|(predicate, _)| predicate.matches(&msg))
            .map(|(_, handler)| *handler)
        else {
            return Ok(());
        };

        let mut ctx = Ctx {
            bot,
            deps,
            chat_id,
            user,
            window: conv.window,
            fresh: true,
            data: conv.data.clone(),
            trigger: Trigger::Message(Box::new(msg)),
        };

        let result = handler(&mut ctx).await;
        let outcome = self.run(&mut ctx, result).await;
        self.commit(ctx, conv, chat_id, outcome).await
    }

    /// `/exit` and `/cancel`: leave the graph from wherever the owner is.
    /// Returns whether an active conversation existed.
    pub async fn handle_exit_command(
        &self,
        bot: Bot,
        deps: Arc<Deps>,
        msg: Message,
        finalize: bool,
    ) -> Result<bool> {
        let chat_id = msg.chat.id;
        let Some(slot) = self.conversations.get(chat_id).await else {
            return Ok(false);
        };
        let mut conv = slot.lock().await;
        if conv.finished {
            return Ok(false);
        }
        let Some(user) = msg.from.clone() else {
            return Ok(false);
        };
        if user.id.0 != conv.data.owner_id {
            return Ok(false);
        }

        let mut ctx = Ctx {
            bot,
            deps,
            chat_id,
            user,
            window: conv.window,
            fresh: true,
            data: conv.data.clone(),
            trigger: Trigger::Message(Box::new(msg)),
        };
        let outcome = self.run(&mut ctx, Ok(Transition::Exit { finalize })).await;
        self.commit(ctx, conv, chat_id, outcome).await?;
        Ok(true)
    }

    /// Execute a handler result: propagate its error or apply the
    /// transition it requested. Returns whether the conversation is still
    /// alive.
    async fn run(
        &self,
        ctx: &mut Ctx,
        result: Result<Transition>,
    ) -> Result<bool> {
        match result? {
            Transition::Stay => Ok(true),
            Transition::Retake { fresh } => {
                ctx.fresh = fresh;
                self.enter(ctx).await?;
                Ok(true)
            }
            Transition::Goto { window, fresh } => {
                self.leave(ctx).await?;
                ctx.window = window;
                ctx.fresh = fresh;
                self.enter(ctx).await?;
                Ok(true)
            }
            Transition::Exit { finalize } => {
                self.finish(ctx, finalize).await?;
                Ok(false)
            }
        }
    }

    async fn enter(&self, ctx: &mut Ctx) -> Result<()> {
        let definition = self.registry.get(ctx.window)?;
        match &ctx.trigger {
            Trigger::Callback { .. } => (definition.enter_callback)(ctx).await,
            Trigger::Message(_) => (definition.enter_message)(ctx).await,
        }
    }

    async fn leave(&self, ctx: &mut Ctx) -> Result<()> {
        let definition = self.registry.get(ctx.window)?;
        if let Some(on_leave) = definition.on_leave {
            on_leave(ctx).await?;
        }
        Ok(())
    }

    /// Leave the graph: run the leave hook, drop the owner's pending
    /// records, optionally render the saved-epilogue, clear all state.
    async fn finish(&self, ctx: &mut Ctx, finalize: bool) -> Result<()> {
        self.leave(ctx).await?;

        // The preview and anything else queued must not outlive the
        // conversation.
        ctx.queue_preview();
        if let Err(e) = ctx.sweep(&[], false).await {
            warn!("Failed to sweep messages on exit: {:#}", e);
        }

        if let Err(e) = ctx.deps.pending.delete_for_user(ctx.user.id.0).await {
            warn!("Failed to drop pending records on exit: {:#}", e);
        }

        if finalize {
            if let Some(screen) = ctx.screen_id() {
                best_effort(
                    "render exit epilogue",
                    ctx.bot.edit_message_text(ctx.chat_id, screen, EXIT_TEXT),
                )
                .await;
            }
        }

        ctx.data = FsmData::default();
        Ok(())
    }

    /// Write the turn's outcome back into the conversation slot.
    async fn commit(
        &self,
        ctx: Ctx,
        mut conv: tokio::sync::MutexGuard<'_, Conversation>,
        chat_id: ChatId,
        outcome: Result<bool>,
    ) -> Result<()> {
        match outcome {
            Ok(true) => {
                conv.window = ctx.window;
                let patch = FsmPatch::diff(&conv.data, &ctx.data);
                conv.data.apply(patch);
                Ok(())
            }
            Ok(false) => {
                self.abandon(&mut conv, chat_id).await;
                Ok(())
            }
            Err(e) => {
                // A failed primary render leaves no valid screen
                // reference; drop the conversation rather than strand it.
                self.abandon(&mut conv, chat_id).await;
                Err(e)
            }
        }
    }

    async fn abandon(
        &self,
        conv: &mut tokio::sync::MutexGuard<'_, Conversation>,
        chat_id: ChatId,
    ) {
        conv.finished = true;
        conv.data = FsmData::default();
        self.conversations.remove(chat_id).await;
    }

    async fn reject(&self, bot: &Bot, q: &CallbackQuery) {
        best_effort(
            "reject foreign callback",
            bot.answer_callback_query(q.id.clone())
                .text("❌")
                .show_alert(true),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_accepts_owner_on_current_screen() {
        assert!(gate_allows(42, Some(100), 42, 100));
    }

    #[test]
    fn test_gate_rejects_other_actor() {
        assert!(!gate_allows(42, Some(100), 43, 100));
    }

    #[test]
    fn test_gate_rejects_stale_screen() {
        assert!(!gate_allows(42, Some(100), 42, 99));
        assert!(!gate_allows(42, None, 42, 100));
    }

    #[test]
    fn test_gate_rejects_unclaimed_conversation() {
        // owner_id 0 means the conversation was never properly started.
        assert!(!gate_allows(0, Some(100), 0, 100));
    }
}
