//! Chatkit - reusable chat-screen components for terminal chat clients.
//!
//! This crate provides the presentation layer of a chat screen: an
//! observable view state for the full-screen attachment, a navigation
//! chrome header, an attachment overlay, and the avatar image loading
//! pipeline behind them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Domain layer containing entities and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing UI components and event handling.
pub mod presentation;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "chatkit";
