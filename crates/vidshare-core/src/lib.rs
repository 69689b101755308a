//! Core types, trait definitions, and engines for the vidshare backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The two engines, [`toggle`] for relationships and [`mutation`] for
//! ownership-gated writes, are generic over the traits in [`store`] and
//! [`media`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod content;
pub mod error;
pub mod id;
pub mod identity;
pub mod media;
pub mod mutation;
pub mod page;
pub mod patch;
pub mod relationship;
pub mod store;
pub mod toggle;

pub use error::{Error, Result};
