//! Card model and scheduler queue flags.

use crate::model::deck::DeckId;
use serde::{Deserialize, Serialize};

/// Host card identifier.
pub type CardId = i64;

/// Result of a card counting query.
pub type Count = u64;

/// Scheduler queue a card currently sits in.
///
/// Stored as the host's integer `queue` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardQueue {
    UserBuried,
    SchedBuried,
    Suspended,
    /// Never presented to the user.
    New,
    Learning,
    Review,
    DayLearning,
    Preview,
}

impl CardQueue {
    pub fn to_db(self) -> i64 {
        match self {
            Self::UserBuried => -3,
            Self::SchedBuried => -2,
            Self::Suspended => -1,
            Self::New => 0,
            Self::Learning => 1,
            Self::Review => 2,
            Self::DayLearning => 3,
            Self::Preview => 4,
        }
    }

    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            -3 => Some(Self::UserBuried),
            -2 => Some(Self::SchedBuried),
            -1 => Some(Self::Suspended),
            0 => Some(Self::New),
            1 => Some(Self::Learning),
            2 => Some(Self::Review),
            3 => Some(Self::DayLearning),
            4 => Some(Self::Preview),
            _ => None,
        }
    }

    /// Stable lowercase label used in logs and CLI input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserBuried => "user_buried",
            Self::SchedBuried => "sched_buried",
            Self::Suspended => "suspended",
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::DayLearning => "day_learning",
            Self::Preview => "preview",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [
            Self::UserBuried,
            Self::SchedBuried,
            Self::Suspended,
            Self::New,
            Self::Learning,
            Self::Review,
            Self::DayLearning,
            Self::Preview,
        ]
        .into_iter()
        .find(|queue| queue.as_str() == value.trim())
    }
}

/// Card snapshot as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Deck the card currently lives in.
    pub deck_id: DeckId,
    /// Home deck while the card is borrowed by a filtered deck.
    pub original_deck_id: Option<DeckId>,
    pub queue: CardQueue,
}
