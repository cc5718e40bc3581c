//! The static window table.
//!
//! Each window registers two entry handlers (message path and callback
//! path), an optional leave hook, and ordered predicate lists for button
//! actions and free-form inputs. Dispatch is a linear scan for the first
//! matching predicate; there is no reflection and no dynamic
//! registration.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use teloxide::types::Message;

use super::engine::{Ctx, HandlerFuture};
use super::WindowId;
use crate::bot::callbacks::{CallbackPayload, GfAction, NavTarget, ToggleTarget};
use crate::bot::windows;

pub type EnterFn = for<'a> fn(&'a mut Ctx) -> HandlerFuture<'a, ()>;
pub type HandlerFn = for<'a> fn(&'a mut Ctx) -> HandlerFuture<'a>;

/// Matches a structured button action against the window it arrived in.
///
/// Greeting/farewell predicates additionally require the payload's block
/// to be the one this window configures, so a stray farewell button can
/// never drive a greeting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPredicate {
    Nav(NavTarget),
    Toggle(ToggleTarget),
    Gf(GfAction),
    /// A setup button opening either block's menu; lives outside the
    /// subtree, so it matches regardless of the window's own block.
    GfOpen,
    AnyLanguage,
    AnyMediaKind,
}

impl ActionPredicate {
    pub fn matches(&self, window: WindowId, payload: &CallbackPayload) -> bool {
        match (self, payload) {
            (ActionPredicate::Nav(expected), CallbackPayload::Nav(actual)) => {
                expected == actual
            }
            (ActionPredicate::Toggle(expected), CallbackPayload::Toggle(actual)) => {
                expected == actual
            }
            (ActionPredicate::Gf(expected), CallbackPayload::Gf(kind, actual)) => {
                expected == actual && window.gf_kind() == Some(*kind)
            }
            (ActionPredicate::GfOpen, CallbackPayload::Gf(_, action)) => {
                *action == GfAction::Open
            }
            (ActionPredicate::AnyLanguage, CallbackPayload::SelectLanguage(_)) => true,
            (ActionPredicate::AnyMediaKind, CallbackPayload::SelectMediaKind(kind, _)) => {
                window.gf_kind() == Some(*kind)
            }
            _ => false,
        }
    }
}

/// Matches a free-form owner message by its content shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPredicate {
    Text,
    Photo,
    Video,
    Animation,
    Sticker,
}

impl InputPredicate {
    pub fn matches(&self, msg: &Message) -> bool {
        match self {
            InputPredicate::Text => msg.text().is_some(),
            InputPredicate::Photo => msg.photo().is_some(),
            InputPredicate::Video => msg.video().is_some(),
            InputPredicate::Animation => msg.animation().is_some(),
            InputPredicate::Sticker => msg.sticker().is_some(),
        }
    }
}

pub struct WindowDefinition {
    pub enter_message: EnterFn,
    pub enter_callback: EnterFn,
    pub on_leave: Option<EnterFn>,
    pub actions: Vec<(ActionPredicate, HandlerFn)>,
    pub inputs: Vec<(InputPredicate, HandlerFn)>,
}

pub struct WindowRegistry {
    windows: HashMap<WindowId, WindowDefinition>,
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowRegistry {
    pub fn new() -> Self {
        let mut windows = HashMap::new();

        windows.insert(WindowId::Main, windows::main_menu::definition());
        windows.insert(WindowId::GeneralSettings, windows::general::definition());
        windows.insert(WindowId::AdminSettings, windows::admin::definition());
        windows.insert(WindowId::Language, windows::language::definition());
        windows.insert(WindowId::Timezone, windows::timezone::definition());

        // The greeting and farewell subtrees share one implementation;
        // handlers read the block they operate on from the window id.
        for menu in [WindowId::GreetingMenu, WindowId::FarewellMenu] {
            windows.insert(menu, windows::gf::menu::definition());
        }
        for kind in [WindowId::GreetingKind, WindowId::FarewellKind] {
            windows.insert(kind, windows::gf::kind::definition());
        }
        for text in [WindowId::GreetingText, WindowId::FarewellText] {
            windows.insert(text, windows::gf::text::definition());
        }
        for media in [WindowId::GreetingMedia, WindowId::FarewellMedia] {
            windows.insert(media, windows::gf::media::definition());
        }
        for topic in [WindowId::GreetingTopic, WindowId::FarewellTopic] {
            windows.insert(topic, windows::gf::topic::definition());
        }

        windows.insert(
            WindowId::ReportsPolicy,
            windows::reports_policy::definition(),
        );
        windows.insert(
            WindowId::ReportsSpecialChat,
            windows::reports_special_chat::definition(),
        );

        Self { windows }
    }

    pub fn get(&self, id: WindowId) -> Result<&WindowDefinition> {
        self.windows
            .get(&id)
            .ok_or_else(|| anyhow!("window {:?} is not registered", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::settings::GfKind;
    use crate::db::types::{LanguageCode, MediaKind};

    #[test]
    fn test_every_window_is_registered() {
        let registry = WindowRegistry::new();
        for window in WindowId::ALL {
            assert!(registry.get(window).is_ok(), "{:?} missing", window);
        }
    }

    // The exit button is answered and executed by the engine itself, one
    // code path for all windows; a window claiming it would bypass that.
    #[test]
    fn test_no_window_claims_the_exit_button() {
        let registry = WindowRegistry::new();
        let exit = CallbackPayload::Nav(NavTarget::Exit);
        for window in WindowId::ALL {
            let definition = registry.get(window).unwrap();
            assert!(
                definition
                    .actions
                    .iter()
                    .all(|(predicate, _)| !predicate.matches(window, &exit)),
                "{:?} registers an exit handler",
                window
            );
        }
    }

    #[test]
    fn test_gf_predicate_is_block_scoped() {
        let predicate = ActionPredicate::Gf(GfAction::ResetText);
        let greeting = CallbackPayload::Gf(GfKind::Greeting, GfAction::ResetText);
        let farewell = CallbackPayload::Gf(GfKind::Farewell, GfAction::ResetText);

        assert!(predicate.matches(WindowId::GreetingMenu, &greeting));
        assert!(!predicate.matches(WindowId::GreetingMenu, &farewell));
        assert!(predicate.matches(WindowId::FarewellMenu, &farewell));
        // Windows outside the subtree never match block actions.
        assert!(!predicate.matches(WindowId::Main, &greeting));
    }

    #[test]
    fn test_media_kind_predicate_is_block_scoped() {
        let predicate = ActionPredicate::AnyMediaKind;
        let payload = CallbackPayload::SelectMediaKind(GfKind::Farewell, MediaKind::Gif);

        assert!(predicate.matches(WindowId::FarewellKind, &payload));
        assert!(!predicate.matches(WindowId::GreetingKind, &payload));
    }

    #[test]
    fn test_exact_tag_predicates() {
        let nav = ActionPredicate::Nav(NavTarget::Back);
        assert!(nav.matches(WindowId::Main, &CallbackPayload::Nav(NavTarget::Back)));
        assert!(!nav.matches(WindowId::Main, &CallbackPayload::Nav(NavTarget::Exit)));

        let toggle = ActionPredicate::Toggle(ToggleTarget::Reports);
        assert!(toggle.matches(
            WindowId::AdminSettings,
            &CallbackPayload::Toggle(ToggleTarget::Reports)
        ));
        assert!(!toggle.matches(
            WindowId::AdminSettings,
            &CallbackPayload::Toggle(ToggleTarget::Greeting)
        ));

        let language = ActionPredicate::AnyLanguage;
        assert!(language.matches(
            WindowId::Language,
            &CallbackPayload::SelectLanguage(LanguageCode::Uk)
        ));
        assert!(!language.matches(WindowId::Language, &CallbackPayload::Nav(NavTarget::Back)));
    }
}
