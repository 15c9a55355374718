//! Domain records exchanged with the ranking service.
//!
//! Field names are lower snake case, which is also the service's wire
//! convention, so these types serialize directly into request bodies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{ItemId, VoteEventId};
use crate::time::Timestamp;

/// A user identifier in the service's `user_<n>` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Builds the identifier for pool member `n`.
    ///
    /// ```
    /// use ranksim::UserId;
    ///
    /// assert_eq!(UserId::from_pool(7).as_str(), "user_7");
    /// ```
    #[must_use]
    pub fn from_pool(n: u64) -> Self {
        Self(format!("user_{n}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The ranking views a simulated user can be browsing.
///
/// Serialized by variant name, which is how the service encodes pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageId {
    Newest,
    HackerNews,
    QualityNews,
}

impl PageId {
    /// Every page, in sampling order.
    pub const ALL: [Self; 3] = [Self::Newest, Self::HackerNews, Self::QualityNews];

    /// Path of this page's ranking endpoint, relative to the base URL.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Newest => "/rankings/newest",
            Self::HackerNews => "/rankings/hn",
            Self::QualityNews => "/rankings/qn",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Newest => 0,
            Self::HackerNews => 1,
            Self::QualityNews => 2,
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newest => write!(f, "newest"),
            Self::HackerNews => write!(f, "hacker_news"),
            Self::QualityNews => write!(f, "quality_news"),
        }
    }
}

/// A submitted story or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ItemId>,
    pub author_id: UserId,
    pub created_at: Timestamp,
}

impl Item {
    /// Creates a top-level item stamped with the current time.
    #[must_use]
    pub fn new(item_id: ItemId, author_id: UserId) -> Self {
        Self {
            item_id,
            parent_id: None,
            author_id,
            created_at: Timestamp::now(),
        }
    }
}

/// A single vote cast on an item seen on a ranking page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
    pub vote_event_id: VoteEventId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub vote: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageId>,
    pub created_at: Timestamp,
}

impl VoteEvent {
    /// The only vote value the simulator casts.
    pub const UPVOTE: i32 = 1;

    /// Creates an upvote on `item_id`, seen at `rank` on `page`.
    #[must_use]
    pub fn upvote(
        vote_event_id: VoteEventId,
        item_id: ItemId,
        user_id: UserId,
        rank: u32,
        page: PageId,
    ) -> Self {
        Self {
            vote_event_id,
            item_id,
            user_id,
            vote: Self::UPVOTE,
            rank: Some(rank),
            page: Some(page),
            created_at: Timestamp::now(),
        }
    }
}

/// One entry of a ranking snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item_id: ItemId,
    pub rank: u32,
    pub page: PageId,
    pub score: f32,
}
