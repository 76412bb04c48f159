use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::model::{Location, PostId, UserId};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long, env = "ROLLERMATE_EMAIL")]
        email: String,
        #[arg(long, env = "ROLLERMATE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Show the feed, newest first
    Feed,
    /// Show a profile
    Profile { id: UserId },
    /// Like or unlike a post
    Like { post: PostId },
    /// Follow or unfollow a user
    Follow { user: UserId },
    /// Publish a post
    Post(PostArgs),
}

#[derive(Debug, Clone, Args)]
pub struct PostArgs {
    /// Text of the post
    #[arg(short, long)]
    pub content: Option<String>,
    /// Image to attach
    #[arg(short, long)]
    pub image: Option<PathBuf>,
    /// Latitude of the attached location
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Longitude of the attached location
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl PostArgs {
    pub fn location(&self) -> Option<Location> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Location { latitude, longitude }),
            _ => None,
        }
    }
}
