//! Flattening of joined rows into view models.
//!
//! Everything here is pure: the same rows and viewer always give the same
//! output.

use crate::model::{first_count, Location, Post, PostRow, Profile, ProfileRow, UserId};

pub fn reconcile_post(row: PostRow, viewer: UserId) -> Post {
    let likes = row.likes.unwrap_or_default();
    let location = match (row.latitude, row.longitude) {
        (Some(latitude), Some(longitude)) => Some(Location {
            latitude,
            longitude,
        }),
        _ => None,
    };

    Post {
        id: row.id,
        user_id: row.user_id,
        content: row.content,
        image_url: row.image_url,
        location,
        created_at: row.created_at,
        author: row.user,
        like_count: u32::try_from(likes.len()).unwrap_or(u32::MAX),
        comment_count: first_count(row.comments.as_deref().unwrap_or_default()),
        liked_by_viewer: likes.iter().any(|like| like.user_id == viewer),
    }
}

/// Newest first; rows with the same timestamp keep their fetched order.
pub fn reconcile_feed(rows: Vec<PostRow>, viewer: UserId) -> Vec<Post> {
    let mut posts: Vec<Post> = rows
        .into_iter()
        .map(|row| reconcile_post(row, viewer))
        .collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

pub fn reconcile_profile(row: ProfileRow, is_following: bool) -> Profile {
    Profile {
        id: row.id,
        full_name: row.full_name,
        avatar_url: row.avatar_url,
        bio: row.bio.filter(|bio| !bio.is_empty()),
        city: row.city.filter(|city| !city.is_empty()),
        skates: row.skates.unwrap_or_default(),
        skating_style: row.skating_style.unwrap_or_default(),
        experience_years: row.experience_years.unwrap_or_default(),
        created_at: row.created_at,
        followers_count: first_count(&row.followers),
        following_count: first_count(&row.following),
        posts_count: first_count(&row.posts),
        is_following,
    }
}
