use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CountAggregate, UserId};

pub const DEFAULT_AVATAR: &str =
    "https://images.pexels.com/photos/1681010/pexels-photo-1681010.jpeg?auto=compress&cs=tinysrgb&w=400";

/// `profiles` row joined with post and follow aggregates.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProfileRow {
    pub id: UserId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub skates: Option<Vec<String>>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub skating_style: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub posts: Vec<CountAggregate>,
    #[serde(default)]
    pub followers: Vec<CountAggregate>,
    #[serde(default)]
    pub following: Vec<CountAggregate>,
}

impl ProfileRow {
    pub const SELECT: &'static str = "id,full_name,avatar_url,bio,city,skates,experience_years,skating_style,created_at,posts:posts(count),followers:follows!follows_following_id_fkey(count),following:follows!follows_follower_id_fkey(count)";
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: UserId,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub skates: Vec<String>,
    pub skating_style: Vec<String>,
    pub experience_years: u32,
    pub created_at: DateTime<Utc>,
    pub followers_count: u32,
    pub following_count: u32,
    pub posts_count: u32,
    pub is_following: bool,
}

impl Profile {
    pub fn avatar(&self) -> &str {
        self.avatar_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_AVATAR)
    }
}
