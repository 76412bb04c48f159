pub mod command;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dotenv::dotenv;
use std::path::PathBuf;

pub use command::Command;

#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Project URL of the backend
    #[arg(long, env = "SUPABASE_URL", default_value = "")]
    url: String,
    /// Anonymous (public) API key of the backend
    #[arg(long, env = "SUPABASE_ANON_KEY", default_value = "", hide_env_values = true)]
    anon_key: String,
    /// Where the signed-in session is kept between runs
    #[arg(long, env = "SESSION_FILE", default_value = "./.rollermate-session.json")]
    session_file: PathBuf,
    /// Limit request concurrency
    #[arg(long, default_value = "5")]
    limit: usize,
    /// Transport retries for transient failures (0 disables)
    #[arg(long, default_value = "0")]
    retries: u32,
    #[command(subcommand)]
    command: Command,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Config {
    /// Parse the configuration from the environment and command line arguments
    pub fn parse() -> Self {
        dotenv().ok();
        <Self as Parser>::parse()
    }
    /// Create a logger with the configured verbosity level
    pub fn init_logger(&self) {
        env_logger::Builder::new()
            .filter_level(self.verbose.log_level_filter())
            .format_target(false)
            .init();
    }
    /// Base URL without a trailing slash
    pub fn url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }
    /// Both the URL and the key are present
    pub fn has_credentials(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }
    pub const fn session_file(&self) -> &PathBuf {
        &self.session_file
    }
    pub const fn limit(&self) -> usize {
        self.limit
    }
    pub const fn retries(&self) -> u32 {
        self.retries
    }
    pub const fn command(&self) -> &Command {
        &self.command
    }
}
