pub mod post;
pub mod profile;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use post::*;
pub use profile::*;

/// Identity shared by the auth service and the `profiles` table.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PostId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::str::FromStr for PostId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// `[{ "count": n }]` as produced by an aggregate sub-select.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct CountAggregate {
    pub count: u32,
}

/// First element of an aggregate sub-select, zero when absent.
pub fn first_count(aggregate: &[CountAggregate]) -> u32 {
    aggregate.first().map(|c| c.count).unwrap_or_default()
}

/// Like edge: a user may like a given post at most once.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Like {
    pub post_id: PostId,
    pub user_id: UserId,
}

/// Follow edge, `follower_id` follows `following_id`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Follow {
    pub follower_id: UserId,
    pub following_id: UserId,
}
