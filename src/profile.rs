use log::error;

use crate::{
    error::{Error, Result},
    gateway::Gateway,
    model::{Profile, UserId},
    optimistic::{Flip, Tracked},
    reconcile::reconcile_profile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PendingFollow {
    flip: Flip,
}

/// One profile as seen by the viewer, with its follow edge.
pub struct ProfileView<'a, G: Gateway> {
    gateway: &'a G,
    id: UserId,
    viewer: Option<UserId>,
    profile: Option<Tracked<Profile>>,
}

impl<'a, G: Gateway> ProfileView<'a, G> {
    pub fn new(gateway: &'a G, id: UserId) -> Self {
        Self {
            gateway,
            id,
            viewer: None,
            profile: None,
        }
    }

    pub fn profile(&self) -> Option<&Tracked<Profile>> {
        self.profile.as_ref()
    }

    /// Fetch the profile and whether the viewer follows it.
    pub async fn load(&mut self) -> Result<()> {
        let viewer = self
            .gateway
            .current_identity()
            .await
            .ok_or(Error::Unauthenticated)?;
        self.viewer = Some(viewer);

        let fetched = futures::try_join!(
            self.gateway.fetch_profile(self.id),
            self.gateway.is_following(viewer, self.id)
        );
        let (row, is_following) = fetched.map_err(|e| {
            error!("Error fetching profile {}: {}", self.id, e);
            e
        })?;

        self.profile = Some(Tracked::new(reconcile_profile(row, is_following)));
        Ok(())
    }

    /// Flip the follow edge locally.
    ///
    /// `Ok(None)` while a previous toggle is still in flight. Following
    /// oneself is refused.
    pub fn begin_follow(&mut self) -> Result<Option<PendingFollow>> {
        let viewer = self.viewer.ok_or(Error::Unauthenticated)?;
        if viewer == self.id {
            return Err(Error::Validation("cannot follow yourself".to_string()));
        }
        let profile = self
            .profile
            .as_mut()
            .ok_or_else(|| Error::NotFound(format!("profile {} not loaded", self.id)))?;
        Ok(profile.begin().map(|flip| PendingFollow { flip }))
    }

    /// Send the write, then reload. Same policy as likes in the feed.
    pub async fn finish_follow(&mut self, pending: PendingFollow) -> Result<()> {
        let written = match self.viewer {
            Some(viewer) => {
                self.gateway
                    .toggle_follow(viewer, self.id, pending.flip.was_on)
                    .await
            }
            None => Err(Error::Unauthenticated),
        };
        if let Err(e) = &written {
            error!("Error following user {}: {}", self.id, e);
        }

        if let Some(profile) = self.profile.as_mut() {
            profile.settle();
        }

        if let Err(e) = self.load().await {
            if let Some(profile) = self.profile.as_mut() {
                profile.roll_back(pending.flip);
            }
            return Err(written.err().unwrap_or(e));
        }

        written
    }

    pub async fn toggle_follow(&mut self) -> Result<()> {
        match self.begin_follow()? {
            Some(pending) => self.finish_follow(pending).await,
            None => Ok(()),
        }
    }
}
