//! In-process menu action registry.
//!
//! Registration is declaration-only: the host resolves a triggered id to a
//! [`MenuCommand`] and dispatches it itself.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable id of the empty-decks report action.
pub const EMPTY_DECKS_ACTION_ID: &str = "seendeck.empty_decks";

/// Menu label of the empty-decks report action.
pub const EMPTY_DECKS_ACTION_LABEL: &str = "Empty decks";

/// Host menu an action is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMenu {
    Tools,
}

/// Command a menu action dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    EmptyDecksReport,
}

/// One declared menu action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuAction {
    pub id: String,
    pub label: String,
    pub menu: HostMenu,
    pub command: MenuCommand,
}

impl MenuAction {
    /// The "Empty decks" entry under the Tools menu.
    pub fn empty_decks() -> Self {
        Self {
            id: EMPTY_DECKS_ACTION_ID.to_string(),
            label: EMPTY_DECKS_ACTION_LABEL.to_string(),
            menu: HostMenu::Tools,
            command: MenuCommand::EmptyDecksReport,
        }
    }
}

/// Registered menu actions keyed by id.
#[derive(Debug, Default)]
pub struct MenuRegistry {
    entries: BTreeMap<String, MenuAction>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one action after id/label validation.
    pub fn register(&mut self, action: MenuAction) -> Result<(), MenuError> {
        if action.id.trim().is_empty() {
            return Err(MenuError::EmptyActionId);
        }
        if action.label.trim().is_empty() {
            return Err(MenuError::EmptyLabel(action.id));
        }
        if self.entries.contains_key(action.id.as_str()) {
            return Err(MenuError::DuplicateActionId(action.id));
        }

        self.entries.insert(action.id.clone(), action);
        Ok(())
    }

    /// Registers the empty-decks report action.
    pub fn register_empty_decks(&mut self) -> Result<(), MenuError> {
        self.register(MenuAction::empty_decks())
    }

    /// Resolves a triggered action id to its command.
    pub fn resolve(&self, action_id: &str) -> Result<MenuCommand, MenuError> {
        self.entries
            .get(action_id)
            .map(|action| action.command)
            .ok_or_else(|| MenuError::UnknownAction(action_id.to_string()))
    }

    /// Actions attached to `menu`, ordered by id.
    pub fn actions_in(&self, menu: HostMenu) -> Vec<&MenuAction> {
        self.entries
            .values()
            .filter(|action| action.menu == menu)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Menu registration and dispatch errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    EmptyActionId,
    EmptyLabel(String),
    DuplicateActionId(String),
    UnknownAction(String),
}

impl Display for MenuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyActionId => write!(f, "menu action id must not be blank"),
            Self::EmptyLabel(id) => write!(f, "menu action `{id}` has a blank label"),
            Self::DuplicateActionId(id) => write!(f, "menu action already registered: {id}"),
            Self::UnknownAction(id) => write!(f, "no menu action registered for `{id}`"),
        }
    }
}

impl Error for MenuError {}
