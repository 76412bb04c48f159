use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CountAggregate, PostId, UserId};

pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeRow {
    pub user_id: UserId,
}

/// `posts` row joined with its author, like edges and comment aggregate.
///
/// select: `*,user:profiles(full_name,avatar_url),likes(user_id),comments:comments(count)`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PostRow {
    pub id: PostId,
    pub user_id: UserId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<Author>,
    #[serde(default)]
    pub likes: Option<Vec<LikeRow>>,
    #[serde(default)]
    pub comments: Option<Vec<CountAggregate>>,
}

/// Feed entry as rendered, with derived engagement fields.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub image_url: Option<String>,
    pub location: Option<Location>,
    pub created_at: DateTime<Utc>,
    pub author: Option<Author>,
    pub like_count: u32,
    pub comment_count: u32,
    pub liked_by_viewer: bool,
}

/// Insert payload for the `posts` table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NewPost {
    pub user_id: UserId,
    pub content: String,
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl NewPost {
    pub fn new(user_id: UserId, content: String) -> Self {
        Self {
            user_id,
            content,
            image_url: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn location(mut self, location: Option<Location>) -> Self {
        self.latitude = location.map(|l| l.latitude);
        self.longitude = location.map(|l| l.longitude);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_with_null_embeds() {
        let row: PostRow = serde_json::from_str(
            r#"{
                "id": "7d0f4f2e-2f8e-4a59-8a3c-0d6a0a4d2c11",
                "user_id": "c3d7a5a4-1a0b-4a5e-9c77-3b1f1f0e9a10",
                "content": "first roll of the season",
                "image_url": null,
                "created_at": "2024-05-01T10:00:00+00:00",
                "user": null,
                "likes": null,
                "comments": null
            }"#,
        )
        .unwrap();

        assert_eq!(row.content, "first roll of the season");
        assert!(row.user.is_none());
        assert!(row.likes.is_none());
        assert!(row.latitude.is_none());
    }

    #[test]
    fn test_insert_payload_skips_missing_location() {
        let user = UserId(uuid::Uuid::nil());
        let post = NewPost::new(user, "hi".to_string());
        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("latitude").is_none());
        assert_eq!(value["image_url"], serde_json::Value::Null);

        let post = post.location(Some(Location {
            latitude: 55.75,
            longitude: 37.61,
        }));
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["latitude"], 55.75);
        assert_eq!(value["longitude"], 37.61);
    }

    #[test]
    fn test_location_bounds() {
        assert!(Location { latitude: 90.0, longitude: -180.0 }.is_valid());
        assert!(!Location { latitude: 91.0, longitude: 0.0 }.is_valid());
        assert!(!Location { latitude: 0.0, longitude: 180.5 }.is_valid());
    }
}
