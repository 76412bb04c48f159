use std::sync::Arc;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    api::{
        rest::{Query, RestClient},
        storage::StorageClient,
        ApiClient,
    },
    error::{Error, Result},
    model::{Follow, Like, NewPost, PostId, PostRow, ProfileRow, UserId},
    session::SessionContext,
};

use super::{Gateway, POST_IMAGES_BUCKET};

const FEED_SELECT: &str = "*,user:profiles(full_name,avatar_url),likes(user_id),comments:comments(count)";

#[derive(Deserialize, Debug)]
struct IdRow {
    #[allow(unused)]
    id: serde_json::Value,
}

/// [`Gateway`] backed by the hosted REST and storage services.
#[derive(Clone)]
pub struct RemoteGateway {
    rest: RestClient,
    storage: StorageClient,
    session: Arc<SessionContext>,
    bucket: String,
}

impl RemoteGateway {
    pub fn new(client: ApiClient, session: Arc<SessionContext>) -> Self {
        Self {
            rest: RestClient::new(client.clone()),
            storage: StorageClient::new(client),
            session,
            bucket: POST_IMAGES_BUCKET.to_string(),
        }
    }

    async fn token(&self) -> Result<String> {
        self.session.access_token().await.ok_or(Error::Unauthenticated)
    }

    /// Cheap round trip used at start to surface misconfiguration early.
    ///
    /// Never fails: problems are only logged.
    pub async fn probe(&self) {
        let token = self.session.access_token().await;
        let query = Query::table("profiles").select("id").limit(1);
        let result: Result<Vec<IdRow>> = match token {
            Some(token) => self.rest.select(&token, &query).await,
            None => self.rest.select("", &query).await, // anonymous key only
        };
        match result {
            Ok(_) => info!("Backend connection test successful"),
            Err(e) => warn!("Backend connection test warning: {}", e),
        }
    }
}

impl Gateway for RemoteGateway {
    async fn current_identity(&self) -> Option<UserId> {
        self.session.identity().await
    }

    async fn fetch_feed(&self) -> Result<Vec<PostRow>> {
        let token = self.token().await?;
        let query = Query::table("posts")
            .select(FEED_SELECT)
            .order_desc("created_at");
        let rows: Vec<PostRow> = self.rest.select(&token, &query).await?;
        debug!("{} posts fetched", rows.len());
        Ok(rows)
    }

    async fn fetch_profile(&self, id: UserId) -> Result<ProfileRow> {
        let token = self.token().await?;
        let query = Query::table("profiles")
            .select(ProfileRow::SELECT)
            .eq("id", id);
        self.rest.select_single(&token, &query).await.map_err(|e| match e {
            Error::NotFound(_) => Error::NotFound(format!("profile {}", id)),
            other => other,
        })
    }

    async fn is_following(&self, follower: UserId, following: UserId) -> Result<bool> {
        let token = self.token().await?;
        let query = Query::table("follows")
            .select("id")
            .eq("follower_id", follower)
            .eq("following_id", following);
        let rows: Vec<IdRow> = self.rest.select(&token, &query).await?;
        Ok(!rows.is_empty())
    }

    async fn create_post(&self, post: &NewPost) -> Result<()> {
        if post.content.trim().is_empty() && post.image_url.is_none() {
            return Err(Error::Validation("post needs text or an image".to_string()));
        }
        let token = self.token().await?;
        self.rest
            .insert(&token, "posts", std::slice::from_ref(post))
            .await
    }

    async fn toggle_like(&self, post: PostId, user: UserId, currently_liked: bool) -> Result<()> {
        let token = self.token().await?;
        if !currently_liked {
            let edge = Like {
                post_id: post,
                user_id: user,
            };
            return self.rest.insert(&token, "likes", &[edge]).await;
        }

        let query = Query::table("likes")
            .eq("post_id", post)
            .eq("user_id", user);
        let deleted: Vec<serde_json::Value> = self.rest.delete(&token, &query).await?;
        if deleted.is_empty() {
            return Err(Error::Conflict(format!("{} has no like on {}", user, post)));
        }
        Ok(())
    }

    async fn toggle_follow(
        &self,
        follower: UserId,
        following: UserId,
        currently_following: bool,
    ) -> Result<()> {
        let token = self.token().await?;
        if !currently_following {
            let edge = Follow {
                follower_id: follower,
                following_id: following,
            };
            return self.rest.insert(&token, "follows", &[edge]).await;
        }

        let query = Query::table("follows")
            .eq("follower_id", follower)
            .eq("following_id", following);
        let deleted: Vec<serde_json::Value> = self.rest.delete(&token, &query).await?;
        if deleted.is_empty() {
            return Err(Error::Conflict(format!(
                "{} does not follow {}",
                follower, following
            )));
        }
        Ok(())
    }

    async fn upload_blob(&self, bytes: Vec<u8>, path: &str) -> Result<String> {
        let token = self.token().await?;
        debug!("Uploading {} bytes to {}/{}", bytes.len(), self.bucket, path);
        self.storage.upload(&token, &self.bucket, path, bytes).await?;
        Ok(self.storage.public_url(&self.bucket, path))
    }

    async fn delete_blob(&self, path: &str) -> Result<()> {
        let token = self.token().await?;
        self.storage.remove(&token, &self.bucket, &[path]).await
    }
}
