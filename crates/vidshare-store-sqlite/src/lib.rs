//! SQLite backend for the vidshare store traits.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Videos, tweets and comments share one
//! `contents` table keyed by kind; likes and subscriptions share one
//! `relationships` table with a uniqueness constraint per kind, actor and
//! target.

mod catalog;
mod content;
mod encode;
mod identity;
mod relationship;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
