//! Deck model and name-path helpers.
//!
//! # Invariants
//! - A deck's parent is the deck named by its name minus the last segment.
//! - Names have no empty segments and no surrounding whitespace per segment.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Host deck identifier.
pub type DeckId = i64;

/// Reserved deck that always exists in a collection.
pub const DEFAULT_DECK_ID: DeckId = 1;

/// Name of the reserved default deck.
pub const DEFAULT_DECK_NAME: &str = "Default";

/// Separator between deck name segments.
pub const DECK_NAME_SEPARATOR: &str = "::";

/// Deck snapshot as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    /// Full path-like name, e.g. `Languages::Japanese::Kanji`.
    pub name: String,
}

impl Deck {
    pub fn new(id: DeckId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Name of the parent deck, or `None` for a top-level deck.
    pub fn parent_name(&self) -> Option<&str> {
        parent_deck_name(&self.name)
    }
}

/// Returns the parent deck name by removing the last segment.
pub fn parent_deck_name(name: &str) -> Option<&str> {
    name.rsplit_once(DECK_NAME_SEPARATOR)
        .map(|(parent, _)| parent)
}

/// Returns every ancestor name from the root down, excluding `name` itself.
///
/// `a::b::c` yields `a`, `a::b`.
pub fn ancestor_names(name: &str) -> Vec<&str> {
    name.match_indices(DECK_NAME_SEPARATOR)
        .map(|(index, _)| &name[..index])
        .collect()
}

/// Returns whether `candidate` names a direct child of `parent`.
pub fn is_direct_child_name(parent: &str, candidate: &str) -> bool {
    candidate
        .strip_prefix(parent)
        .and_then(|rest| rest.strip_prefix(DECK_NAME_SEPARATOR))
        .is_some_and(|rest| !rest.is_empty() && !rest.contains(DECK_NAME_SEPARATOR))
}

/// Deck name validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckNameError {
    Empty,
    EmptySegment(String),
}

impl Display for DeckNameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "deck name must not be blank"),
            Self::EmptySegment(name) => write!(f, "deck name has an empty segment: `{name}`"),
        }
    }
}

impl Error for DeckNameError {}

/// Trims each segment and rejects blank names or blank segments.
pub fn normalize_deck_name(name: &str) -> Result<String, DeckNameError> {
    if name.trim().is_empty() {
        return Err(DeckNameError::Empty);
    }

    let segments = name
        .split(DECK_NAME_SEPARATOR)
        .map(str::trim)
        .collect::<Vec<_>>();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(DeckNameError::EmptySegment(name.to_string()));
    }

    Ok(segments.join(DECK_NAME_SEPARATOR))
}
