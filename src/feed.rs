use std::collections::HashMap;

use log::{debug, error};

use crate::{
    error::{Error, Result},
    gateway::Gateway,
    model::{Post, PostId, UserId},
    optimistic::{Flip, SyncState, Tracked},
    publish::{publish, PostDraft},
    reconcile::reconcile_feed,
};

/// A like toggle whose local flip is applied but whose write is not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PendingLike {
    post: PostId,
    flip: Flip,
}

/// The feed as the viewer sees it.
pub struct Feed<'a, G: Gateway> {
    gateway: &'a G,
    viewer: Option<UserId>,
    posts: Vec<Tracked<Post>>,
}

impl<'a, G: Gateway> Feed<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            viewer: None,
            posts: vec![],
        }
    }

    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().map(|p| p.value())
    }

    pub fn get(&self, post: PostId) -> Option<&Tracked<Post>> {
        self.posts.iter().find(|p| p.value().id == post)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    async fn viewer(&mut self) -> Result<UserId> {
        if let Some(viewer) = self.viewer {
            return Ok(viewer);
        }
        let viewer = self
            .gateway
            .current_identity()
            .await
            .ok_or(Error::Unauthenticated)?;
        self.viewer = Some(viewer);
        Ok(viewer)
    }

    /// Replace the whole list with freshly fetched state.
    ///
    /// Posts still in `PendingWrite` keep their local flip until their own
    /// write is finished. On failure the previous list is kept.
    pub async fn refresh(&mut self) -> Result<()> {
        self.viewer = None;
        let viewer = self.viewer().await?;
        let rows = self.gateway.fetch_feed().await.map_err(|e| {
            error!("Error fetching posts: {}", e);
            e
        })?;

        let mut in_flight: HashMap<PostId, Tracked<Post>> = self
            .posts
            .drain(..)
            .filter(|p| p.state() == SyncState::PendingWrite)
            .map(|p| (p.value().id, p))
            .collect();
        self.posts = reconcile_feed(rows, viewer)
            .into_iter()
            .map(|post| {
                in_flight
                    .remove(&post.id)
                    .unwrap_or_else(|| Tracked::new(post))
            })
            .collect();
        debug!("{} posts in feed", self.posts.len());
        Ok(())
    }

    /// Flip the like locally. `None` when the post is unknown or already
    /// has a write in flight.
    pub fn begin_like(&mut self, post: PostId) -> Option<PendingLike> {
        let tracked = self.posts.iter_mut().find(|p| p.value().id == post)?;
        let flip = tracked.begin()?;
        Some(PendingLike { post, flip })
    }

    /// Send the write, then reconcile with a full re-fetch whatever the
    /// write's outcome.
    ///
    /// Returns the write's error, if any. If the re-fetch fails too the
    /// local flip is rolled back.
    pub async fn finish_like(&mut self, pending: PendingLike) -> Result<()> {
        let written = match self.viewer().await {
            Ok(viewer) => {
                self.gateway
                    .toggle_like(pending.post, viewer, pending.flip.was_on)
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = &written {
            error!("Error toggling like on {}: {}", pending.post, e);
        }

        if let Some(tracked) = self.posts.iter_mut().find(|p| p.value().id == pending.post) {
            tracked.settle();
        }

        if let Err(e) = self.refresh().await {
            if let Some(tracked) = self
                .posts
                .iter_mut()
                .find(|p| p.value().id == pending.post)
            {
                tracked.roll_back(pending.flip);
            }
            return Err(written.err().unwrap_or(e));
        }

        written
    }

    pub async fn toggle_like(&mut self, post: PostId) -> Result<()> {
        match self.begin_like(post) {
            Some(pending) => self.finish_like(pending).await,
            None => Ok(()),
        }
    }

    /// Publish a draft and reload the feed on success.
    pub async fn publish(&mut self, draft: PostDraft) -> Result<()> {
        publish(self.gateway, draft).await?;
        self.refresh().await
    }

    pub fn pending(&self) -> usize {
        self.posts
            .iter()
            .filter(|p| p.state() != SyncState::Synced)
            .count()
    }
}
