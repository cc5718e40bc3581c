//! The windowed conversation state machine.
//!
//! A conversation is a walk over a fixed graph of windows, driven by one
//! owner. Window behavior lives in [`registry`], event handling and
//! transition execution in [`engine`], message cleanup in [`cleanup`].

pub mod cleanup;
pub mod engine;
pub mod registry;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::{Mutex, RwLock};

use crate::cache::settings::GfKind;

/// Every window in the settings graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowId {
    Main,
    GeneralSettings,
    AdminSettings,
    Language,
    Timezone,
    GreetingMenu,
    GreetingKind,
    GreetingText,
    GreetingMedia,
    GreetingTopic,
    FarewellMenu,
    FarewellKind,
    FarewellText,
    FarewellMedia,
    FarewellTopic,
    ReportsPolicy,
    ReportsSpecialChat,
}

/// The five stages of a greeting/farewell configuration subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfStage {
    Menu,
    Kind,
    Text,
    Media,
    Topic,
}

impl WindowId {
    pub const ALL: [WindowId; 17] = [
        WindowId::Main,
        WindowId::GeneralSettings,
        WindowId::AdminSettings,
        WindowId::Language,
        WindowId::Timezone,
        WindowId::GreetingMenu,
        WindowId::GreetingKind,
        WindowId::GreetingText,
        WindowId::GreetingMedia,
        WindowId::GreetingTopic,
        WindowId::FarewellMenu,
        WindowId::FarewellKind,
        WindowId::FarewellText,
        WindowId::FarewellMedia,
        WindowId::FarewellTopic,
        WindowId::ReportsPolicy,
        WindowId::ReportsSpecialChat,
    ];

    pub fn gf(kind: GfKind, stage: GfStage) -> WindowId {
        match (kind, stage) {
            (GfKind::Greeting, GfStage::Menu) => WindowId::GreetingMenu,
            (GfKind::Greeting, GfStage::Kind) => WindowId::GreetingKind,
            (GfKind::Greeting, GfStage::Text) => WindowId::GreetingText,
            (GfKind::Greeting, GfStage::Media) => WindowId::GreetingMedia,
            (GfKind::Greeting, GfStage::Topic) => WindowId::GreetingTopic,
            (GfKind::Farewell, GfStage::Menu) => WindowId::FarewellMenu,
            (GfKind::Farewell, GfStage::Kind) => WindowId::FarewellKind,
            (GfKind::Farewell, GfStage::Text) => WindowId::FarewellText,
            (GfKind::Farewell, GfStage::Media) => WindowId::FarewellMedia,
            (GfKind::Farewell, GfStage::Topic) => WindowId::FarewellTopic,
        }
    }

    /// Which message block this window configures, if any.
    pub fn gf_kind(&self) -> Option<GfKind> {
        match self {
            WindowId::GreetingMenu
            | WindowId::GreetingKind
            | WindowId::GreetingText
            | WindowId::GreetingMedia
            | WindowId::GreetingTopic => Some(GfKind::Greeting),
            WindowId::FarewellMenu
            | WindowId::FarewellKind
            | WindowId::FarewellText
            | WindowId::FarewellMedia
            | WindowId::FarewellTopic => Some(GfKind::Farewell),
            _ => None,
        }
    }
}

/// Directive returned by an action or input handler; executed by the
/// engine after the handler completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Leave the current window and enter `window`. `fresh` controls
    /// whether the target re-renders as a new user-visible turn or edits
    /// in place.
    Goto { window: WindowId, fresh: bool },
    /// Re-enter the current window.
    Retake { fresh: bool },
    /// Leave the graph. `finalize` runs the "settings saved" epilogue;
    /// without it the conversation is dropped silently.
    Exit { finalize: bool },
    /// No transition; the handler already did everything it needed.
    Stay,
}

impl Transition {
    pub fn goto(window: WindowId) -> Self {
        Transition::Goto {
            window,
            fresh: true,
        }
    }

    pub fn goto_silent(window: WindowId) -> Self {
        Transition::Goto {
            window,
            fresh: false,
        }
    }

    pub fn retake(fresh: bool) -> Self {
        Transition::Retake { fresh }
    }
}

/// Per-conversation mutable state threaded through window transitions.
///
/// Message ids are stored raw to keep the struct plain data; the engine
/// wraps them back into platform types at the call sites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsmData {
    /// Only this user may drive the conversation.
    pub owner_id: u64,
    /// The currently displayed screen message.
    pub current_message_id: Option<i32>,
    /// Topic the conversation started in, if the chat is a forum.
    pub current_topic_id: Option<i32>,
    /// The live greeting/farewell preview message, if one is shown.
    pub preview_message_id: Option<i32>,
    pub bot_messages_to_delete: BTreeSet<i32>,
    pub user_messages_to_delete: BTreeSet<i32>,
}

/// Partial update to [`FsmData`]: a present field replaces the old value,
/// an absent one keeps it. Every turn's state write-back goes through a
/// patch; the owner never changes mid-conversation and is not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsmPatch {
    pub current_message_id: Option<Option<i32>>,
    pub current_topic_id: Option<Option<i32>>,
    pub preview_message_id: Option<Option<i32>>,
    pub bot_messages_to_delete: Option<BTreeSet<i32>>,
    pub user_messages_to_delete: Option<BTreeSet<i32>>,
}

impl FsmPatch {
    /// The patch that turns `old` into `new`; unchanged fields stay absent.
    pub fn diff(old: &FsmData, new: &FsmData) -> FsmPatch {
        FsmPatch {
            current_message_id: (old.current_message_id != new.current_message_id)
                .then_some(new.current_message_id),
            current_topic_id: (old.current_topic_id != new.current_topic_id)
                .then_some(new.current_topic_id),
            preview_message_id: (old.preview_message_id != new.preview_message_id)
                .then_some(new.preview_message_id),
            bot_messages_to_delete: (old.bot_messages_to_delete != new.bot_messages_to_delete)
                .then(|| new.bot_messages_to_delete.clone()),
            user_messages_to_delete: (old.user_messages_to_delete
                != new.user_messages_to_delete)
                .then(|| new.user_messages_to_delete.clone()),
        }
    }
}

impl FsmData {
    pub fn apply(&mut self, patch: FsmPatch) {
        if let Some(value) = patch.current_message_id {
            self.current_message_id = value;
        }
        if let Some(value) = patch.current_topic_id {
            self.current_topic_id = value;
        }
        if let Some(value) = patch.preview_message_id {
            self.preview_message_id = value;
        }
        if let Some(value) = patch.bot_messages_to_delete {
            self.bot_messages_to_delete = value;
        }
        if let Some(value) = patch.user_messages_to_delete {
            self.user_messages_to_delete = value;
        }
    }
}

/// One live conversation.
#[derive(Debug)]
pub struct Conversation {
    pub window: WindowId,
    pub data: FsmData,
    /// Set when the conversation has exited; a task that still holds the
    /// slot must treat it as gone.
    pub finished: bool,
}

impl Conversation {
    fn new() -> Self {
        Self {
            window: WindowId::Main,
            data: FsmData::default(),
            finished: false,
        }
    }
}

/// In-process conversation storage, one slot per chat.
///
/// The outer map lock is held only to look up or insert a slot; the
/// per-slot mutex serializes event processing within one conversation
/// while leaving other chats fully parallel.
#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<RwLock<HashMap<ChatId, Arc<Mutex<Conversation>>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh conversation for the chat, replacing any previous
    /// one.
    pub async fn begin(&self, chat_id: ChatId) -> Arc<Mutex<Conversation>> {
        let slot = Arc::new(Mutex::new(Conversation::new()));
        self.inner.write().await.insert(chat_id, slot.clone());
        slot
    }

    pub async fn get(&self, chat_id: ChatId) -> Option<Arc<Mutex<Conversation>>> {
        self.inner.read().await.get(&chat_id).cloned()
    }

    pub async fn remove(&self, chat_id: ChatId) {
        self.inner.write().await.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_window_has_unique_id() {
        let mut seen = std::collections::HashSet::new();
        for window in WindowId::ALL {
            assert!(seen.insert(window), "{:?} listed twice", window);
        }
        assert_eq!(seen.len(), 17);
    }

    #[test]
    fn test_gf_lookup_matches_gf_kind() {
        for kind in [GfKind::Greeting, GfKind::Farewell] {
            for stage in [
                GfStage::Menu,
                GfStage::Kind,
                GfStage::Text,
                GfStage::Media,
                GfStage::Topic,
            ] {
                assert_eq!(WindowId::gf(kind, stage).gf_kind(), Some(kind));
            }
        }
        assert_eq!(WindowId::Main.gf_kind(), None);
        assert_eq!(WindowId::ReportsPolicy.gf_kind(), None);
    }

    #[test]
    fn test_patch_present_field_wins() {
        let mut data = FsmData {
            owner_id: 7,
            current_message_id: Some(10),
            current_topic_id: Some(3),
            preview_message_id: None,
            bot_messages_to_delete: BTreeSet::from([1, 2]),
            user_messages_to_delete: BTreeSet::new(),
        };

        data.apply(FsmPatch {
            current_message_id: Some(Some(11)),
            preview_message_id: Some(Some(12)),
            ..Default::default()
        });

        assert_eq!(data.current_message_id, Some(11));
        assert_eq!(data.preview_message_id, Some(12));
        // Untouched fields keep their old values.
        assert_eq!(data.current_topic_id, Some(3));
        assert_eq!(data.bot_messages_to_delete, BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_patch_can_clear_a_field() {
        let mut data = FsmData {
            current_message_id: Some(10),
            ..Default::default()
        };
        data.apply(FsmPatch {
            current_message_id: Some(None),
            ..Default::default()
        });
        assert_eq!(data.current_message_id, None);
    }

    #[test]
    fn test_diff_then_apply_reaches_new_state() {
        let old = FsmData {
            owner_id: 7,
            current_message_id: Some(10),
            current_topic_id: Some(3),
            preview_message_id: Some(8),
            bot_messages_to_delete: BTreeSet::from([1]),
            user_messages_to_delete: BTreeSet::new(),
        };
        let mut new = old.clone();
        new.current_message_id = Some(11);
        new.preview_message_id = None;
        new.bot_messages_to_delete.insert(2);

        let patch = FsmPatch::diff(&old, &new);
        // Only the changed fields are present in the patch.
        assert_eq!(patch.current_topic_id, None);
        assert_eq!(patch.user_messages_to_delete, None);

        let mut applied = old;
        applied.apply(patch);
        assert_eq!(applied, new);
    }

    #[test]
    fn test_diff_of_identical_states_is_empty() {
        let data = FsmData {
            owner_id: 7,
            current_message_id: Some(10),
            ..Default::default()
        };
        assert_eq!(FsmPatch::diff(&data, &data), FsmPatch::default());
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let mut data = FsmData {
            owner_id: 7,
            current_message_id: Some(10),
            ..Default::default()
        };
        let before = data.clone();
        data.apply(FsmPatch::default());
        assert_eq!(data, before);
    }

    #[tokio::test]
    async fn test_begin_replaces_previous_conversation() {
        let store = ConversationStore::new();
        let chat = ChatId(-100);

        let first = store.begin(chat).await;
        first.lock().await.data.owner_id = 1;

        let second = store.begin(chat).await;
        assert_eq!(second.lock().await.data.owner_id, 0);

        store.remove(chat).await;
        assert!(store.get(chat).await.is_none());
    }
}
