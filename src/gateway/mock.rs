use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    model::{
        Author, CountAggregate, Follow, Like, LikeRow, NewPost, PostId, PostRow, ProfileRow,
        UserId,
    },
};

use super::Gateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchFeed,
    FetchProfile,
    IsFollowing,
    CreatePost,
    ToggleLike,
    ToggleFollow,
    UploadBlob,
    DeleteBlob,
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: PostId,
    user_id: UserId,
    content: String,
    image_url: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
    comments: u32,
}

#[derive(Debug, Clone)]
struct StoredProfile {
    id: UserId,
    full_name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    posts: Vec<StoredPost>,
    profiles: HashMap<UserId, StoredProfile>,
    likes: HashSet<Like>,
    follows: HashSet<Follow>,
    blobs: HashMap<String, usize>,
    clock: i64,
}

impl Tables {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + Duration::minutes(self.clock)
    }

    fn post_row(&self, post: &StoredPost) -> PostRow {
        let mut likes: Vec<LikeRow> = self
            .likes
            .iter()
            .filter(|like| like.post_id == post.id)
            .map(|like| LikeRow {
                user_id: like.user_id,
            })
            .collect();
        likes.sort_by_key(|like| like.user_id);

        let comments = if post.comments == 0 {
            vec![]
        } else {
            vec![CountAggregate {
                count: post.comments,
            }]
        };

        PostRow {
            id: post.id,
            user_id: post.user_id,
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            latitude: post.latitude,
            longitude: post.longitude,
            created_at: post.created_at,
            user: self.profiles.get(&post.user_id).map(|p| Author {
                full_name: p.full_name.clone(),
                avatar_url: None,
            }),
            likes: Some(likes),
            comments: Some(comments),
        }
    }
}

/// In-memory backend that records every query it answers.
#[derive(Debug, Default)]
pub struct MockGateway {
    identity: Mutex<Option<UserId>>,
    tables: Mutex<Tables>,
    calls: Mutex<Vec<Op>>,
    failing: Mutex<HashSet<Op>>,
}

impl MockGateway {
    pub fn signed_in(name: &str) -> (Self, UserId) {
        let gateway = Self::default();
        let id = gateway.add_profile(name);
        *gateway.identity.lock().unwrap() = Some(id);
        (gateway, id)
    }

    pub fn sign_out(&self) {
        *self.identity.lock().unwrap() = None;
    }

    pub fn add_profile(&self, name: &str) -> UserId {
        let id = UserId(Uuid::new_v4());
        let mut tables = self.tables.lock().unwrap();
        let created_at = tables.tick();
        tables.profiles.insert(
            id,
            StoredProfile {
                id,
                full_name: name.to_string(),
                created_at,
            },
        );
        id
    }

    pub fn add_post(&self, author: UserId, content: &str) -> PostId {
        let id = PostId(Uuid::new_v4());
        let mut tables = self.tables.lock().unwrap();
        let created_at = tables.tick();
        tables.posts.push(StoredPost {
            id,
            user_id: author,
            content: content.to_string(),
            image_url: None,
            latitude: None,
            longitude: None,
            created_at,
            comments: 0,
        });
        id
    }

    pub fn set_comments(&self, post: PostId, comments: u32) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(stored) = tables.posts.iter_mut().find(|p| p.id == post) {
            stored.comments = comments;
        }
    }

    pub fn add_like(&self, post: PostId, user: UserId) {
        self.tables.lock().unwrap().likes.insert(Like {
            post_id: post,
            user_id: user,
        });
    }

    pub fn add_follow(&self, follower: UserId, following: UserId) {
        self.tables.lock().unwrap().follows.insert(Follow {
            follower_id: follower,
            following_id: following,
        });
    }

    /// Make every later call of `op` fail.
    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn calls(&self) -> Vec<Op> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn post_count(&self) -> usize {
        self.tables.lock().unwrap().posts.len()
    }

    pub fn blob_paths(&self) -> Vec<String> {
        self.tables.lock().unwrap().blobs.keys().cloned().collect()
    }

    pub fn latest_post(&self) -> Option<PostRow> {
        let tables = self.tables.lock().unwrap();
        let post = tables.posts.iter().max_by_key(|p| p.created_at)?;
        Some(tables.post_row(post))
    }

    /// Identity check, then record the query, then injected failure.
    fn enter(&self, op: Op) -> Result<UserId> {
        let identity = (*self.identity.lock().unwrap()).ok_or(Error::Unauthenticated)?;
        self.calls.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(&op) {
            return Err(match op {
                Op::UploadBlob | Op::DeleteBlob => Error::Storage("quota exceeded".to_string()),
                _ => Error::Network("connection reset".to_string()),
            });
        }
        Ok(identity)
    }
}

impl Gateway for MockGateway {
    async fn current_identity(&self) -> Option<UserId> {
        *self.identity.lock().unwrap()
    }

    async fn fetch_feed(&self) -> Result<Vec<PostRow>> {
        self.enter(Op::FetchFeed)?;
        let tables = self.tables.lock().unwrap();
        let mut posts: Vec<&StoredPost> = tables.posts.iter().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts.into_iter().map(|p| tables.post_row(p)).collect())
    }

    async fn fetch_profile(&self, id: UserId) -> Result<ProfileRow> {
        self.enter(Op::FetchProfile)?;
        let tables = self.tables.lock().unwrap();
        let profile = tables
            .profiles
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("profile {}", id)))?;

        let count = |n: usize| {
            vec![CountAggregate {
                count: u32::try_from(n).unwrap_or(u32::MAX),
            }]
        };
        Ok(ProfileRow {
            id: profile.id,
            full_name: profile.full_name.clone(),
            avatar_url: None,
            bio: None,
            city: Some("Moscow".to_string()),
            skates: Some(vec!["Seba High Light".to_string()]),
            experience_years: Some(3),
            skating_style: Some(vec!["freestyle".to_string()]),
            created_at: profile.created_at,
            posts: count(tables.posts.iter().filter(|p| p.user_id == id).count()),
            followers: count(tables.follows.iter().filter(|f| f.following_id == id).count()),
            following: count(tables.follows.iter().filter(|f| f.follower_id == id).count()),
        })
    }

    async fn is_following(&self, follower: UserId, following: UserId) -> Result<bool> {
        self.enter(Op::IsFollowing)?;
        Ok(self.tables.lock().unwrap().follows.contains(&Follow {
            follower_id: follower,
            following_id: following,
        }))
    }

    async fn create_post(&self, post: &NewPost) -> Result<()> {
        self.enter(Op::CreatePost)?;
        if post.content.trim().is_empty() && post.image_url.is_none() {
            return Err(Error::Validation("post needs text or an image".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        let created_at = tables.tick();
        tables.posts.push(StoredPost {
            id: PostId(Uuid::new_v4()),
            user_id: post.user_id,
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            latitude: post.latitude,
            longitude: post.longitude,
            created_at,
            comments: 0,
        });
        Ok(())
    }

    async fn toggle_like(&self, post: PostId, user: UserId, currently_liked: bool) -> Result<()> {
        self.enter(Op::ToggleLike)?;
        let edge = Like {
            post_id: post,
            user_id: user,
        };
        let mut tables = self.tables.lock().unwrap();
        let changed = if currently_liked {
            tables.likes.remove(&edge)
        } else {
            tables.likes.insert(edge)
        };
        if !changed {
            return Err(Error::Conflict("like edge out of sync".to_string()));
        }
        Ok(())
    }

    async fn toggle_follow(
        &self,
        follower: UserId,
        following: UserId,
        currently_following: bool,
    ) -> Result<()> {
        self.enter(Op::ToggleFollow)?;
        let edge = Follow {
            follower_id: follower,
            following_id: following,
        };
        let mut tables = self.tables.lock().unwrap();
        let changed = if currently_following {
            tables.follows.remove(&edge)
        } else {
            tables.follows.insert(edge)
        };
        if !changed {
            return Err(Error::Conflict("follow edge out of sync".to_string()));
        }
        Ok(())
    }

    async fn upload_blob(&self, bytes: Vec<u8>, path: &str) -> Result<String> {
        self.enter(Op::UploadBlob)?;
        self.tables
            .lock()
            .unwrap()
            .blobs
            .insert(path.to_string(), bytes.len());
        Ok(format!("mock://post-images/{}", path))
    }

    async fn delete_blob(&self, path: &str) -> Result<()> {
        self.enter(Op::DeleteBlob)?;
        self.tables.lock().unwrap().blobs.remove(path);
        Ok(())
    }
}
