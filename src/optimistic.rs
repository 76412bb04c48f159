//! Optimistic engagement state.
//!
//! A toggle flips the local flag and moves the paired count by one before
//! the write is sent. Once the write returns, whatever its outcome, the
//! provisional value is replaced by freshly fetched state.

use log::debug;

use crate::model::{Post, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Matches the last successful fetch
    #[default]
    Synced,
    /// Local flip applied, remote write in flight
    PendingWrite,
    /// Remote write returned, waiting for authoritative state
    Reconciling,
}

/// A boolean edge with a paired count, as seen by the viewer.
pub trait Toggle {
    fn is_on(&self) -> bool;
    fn count(&self) -> u32;
    fn set(&mut self, on: bool, count: u32);
}

impl Toggle for Post {
    fn is_on(&self) -> bool {
        self.liked_by_viewer
    }
    fn count(&self) -> u32 {
        self.like_count
    }
    fn set(&mut self, on: bool, count: u32) {
        self.liked_by_viewer = on;
        self.like_count = count;
    }
}

impl Toggle for Profile {
    fn is_on(&self) -> bool {
        self.is_following
    }
    fn count(&self) -> u32 {
        self.followers_count
    }
    fn set(&mut self, on: bool, count: u32) {
        self.is_following = on;
        self.followers_count = count;
    }
}

/// Proof that a flip was applied; carries the state the write assumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Flip {
    /// Edge state before the flip, i.e. what the remote write expects
    pub was_on: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<T> {
    value: T,
    state: SyncState,
}

impl<T> Tracked<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            state: SyncState::Synced,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// `PendingWrite -> Reconciling`
    pub fn settle(&mut self) {
        if self.state == SyncState::PendingWrite {
            self.state = SyncState::Reconciling;
        }
    }

    /// Replace with authoritative state, back to `Synced`.
    pub fn replace(&mut self, fresh: T) {
        self.value = fresh;
        self.state = SyncState::Synced;
    }
}

impl<T: Toggle> Tracked<T> {
    /// `Synced -> PendingWrite`: flip the flag and move the count by one.
    ///
    /// While a write is outstanding further toggles are ignored and `None`
    /// is returned.
    pub fn begin(&mut self) -> Option<Flip> {
        if self.state != SyncState::Synced {
            debug!("Toggle ignored while {:?}", self.state);
            return None;
        }

        let was_on = self.value.is_on();
        let count = if was_on {
            self.value.count().saturating_sub(1)
        } else {
            self.value.count().saturating_add(1)
        };
        self.value.set(!was_on, count);
        self.state = SyncState::PendingWrite;
        Some(Flip { was_on })
    }

    /// Undo the local flip when no authoritative state can be had.
    pub fn roll_back(&mut self, flip: Flip) {
        if self.state == SyncState::Synced || self.value.is_on() == flip.was_on {
            self.state = SyncState::Synced;
            return;
        }
        let count = if flip.was_on {
            self.value.count().saturating_add(1)
        } else {
            self.value.count().saturating_sub(1)
        };
        self.value.set(flip.was_on, count);
        self.state = SyncState::Synced;
    }
}
