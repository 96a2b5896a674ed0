//! Quire Server Library
//!
//! A self-hosted remote content store: versioned files behind a
//! GitHub-contents-shaped API, the raw catalog document, and a change feed.

pub mod handlers;
pub mod routes;
pub mod state;
