use log::info;

use crate::model::{Post, Profile};

fn preview(content: &str, width: usize) -> String {
    let line = content.lines().next().unwrap_or_default();
    if line.chars().count() <= width && !content.contains('\n') {
        return line.to_string();
    }
    let mut text: String = line.chars().take(width.saturating_sub(3)).collect();
    text.push_str("...");
    text
}

fn experience(years: u32) -> String {
    match years {
        1 => "1 year".to_string(),
        n => format!("{} years", n),
    }
}

pub fn display_feed<'a>(posts: impl IntoIterator<Item = &'a Post>) {
    if !log::log_enabled!(log::Level::Info) {
        return;
    }
    let posts: Vec<&Post> = posts.into_iter().collect();
    if posts.is_empty() {
        info!("No posts yet. Be the first to share some news!");
        return;
    }

    let name_width = posts
        .iter()
        .filter_map(|p| p.author.as_ref().map(|a| a.full_name.chars().count()))
        .max()
        .unwrap_or_default()
        .max(6);

    info!(
        "+-{:-<36}-+-{:-<name_width$}-+-{:-<5}-+-{:-<5}-+- - -",
        " Post ", " Author ", " Like", " Comm"
    );
    for post in posts {
        let author = post
            .author
            .as_ref()
            .map(|a| a.full_name.as_str())
            .unwrap_or("?");
        let liked = if post.liked_by_viewer { '*' } else { ' ' };
        let mut extras = String::new();
        if post.image_url.is_some() {
            extras.push_str(" [image]");
        }
        if post.location.is_some() {
            extras.push_str(" [location]");
        }
        info!(
            "| {} | {:name_width$} | {:>4}{} | {:>5} | {}{}",
            post.id,
            author,
            post.like_count,
            liked,
            post.comment_count,
            preview(&post.content, 60),
            extras
        );
    }
    info!("+-{}-+-{}-+-------+-------+- - -", "-".repeat(36), "-".repeat(name_width));
}

pub fn display_profile(profile: &Profile) {
    info!("{} ({})", profile.full_name, profile.id);
    info!("  avatar: {}", profile.avatar());
    info!(
        "  {} followers | {} following | {} posts",
        profile.followers_count, profile.following_count, profile.posts_count
    );
    info!(
        "  {}",
        if profile.is_following {
            "You follow this skater"
        } else {
            "You do not follow this skater"
        }
    );
    if let Some(bio) = &profile.bio {
        info!("  {}", bio);
    }
    if let Some(city) = &profile.city {
        info!("  city: {}", city);
    }
    if profile.experience_years > 0 {
        info!("  skating for {}", experience(profile.experience_years));
    }
    info!("  member since {}", profile.created_at.format("%Y-%m-%d"));
    if !profile.skates.is_empty() {
        info!("  skates: {}", profile.skates.join(", "));
    }
    if !profile.skating_style.is_empty() {
        info!("  style: {}", profile.skating_style.join(", "));
    }
}
