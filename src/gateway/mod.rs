#[cfg(test)]
pub mod mock;
pub mod remote;

use std::future::Future;

use crate::{
    error::Result,
    model::{NewPost, PostId, PostRow, ProfileRow, UserId},
};

pub use remote::RemoteGateway;

/// Bucket holding post images.
pub const POST_IMAGES_BUCKET: &str = "post-images";

/// Authenticated operations against the remote relational and blob store.
///
/// Every operation either succeeds with a well-formed result or fails as a
/// whole. Reads fail with `Unauthenticated` before any query is sent when
/// there is no session.
pub trait Gateway: Sync {
    fn current_identity(&self) -> impl Future<Output = Option<UserId>> + Send;

    /// Whole feed, newest first.
    fn fetch_feed(&self) -> impl Future<Output = Result<Vec<PostRow>>> + Send;

    fn fetch_profile(&self, id: UserId) -> impl Future<Output = Result<ProfileRow>> + Send;

    fn is_following(
        &self,
        follower: UserId,
        following: UserId,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn create_post(&self, post: &NewPost) -> impl Future<Output = Result<()>> + Send;

    /// Insert the like edge when not liked, delete it when liked.
    fn toggle_like(
        &self,
        post: PostId,
        user: UserId,
        currently_liked: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    fn toggle_follow(
        &self,
        follower: UserId,
        following: UserId,
        currently_following: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Store bytes under `path` and return their public URL.
    fn upload_blob(&self, bytes: Vec<u8>, path: &str) -> impl Future<Output = Result<String>> + Send;

    fn delete_blob(&self, path: &str) -> impl Future<Output = Result<()>> + Send;
}
