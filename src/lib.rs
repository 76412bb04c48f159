pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod model;
pub mod optimistic;
pub mod profile;
pub mod publish;
pub mod reconcile;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
