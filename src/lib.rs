//! Session backend for the book recommendation front-end.
//!
//! Holds the reader's ratings, dismissals and wishlist, and keeps a
//! recommendation set fresh by calling the remote recommendation API after
//! every rating, with bounded retries and last-trigger-wins ordering.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod telemetry;
