//! Presentation layer with UI components and event handling.

/// Event handling.
pub mod events;
/// Observable chat-screen view state.
pub mod state;
/// Theme provider.
pub mod theme;
/// UI screens.
pub mod ui;
/// Reusable widgets.
pub mod widgets;

pub use state::{ChatViewState, ObserverId};
pub use ui::App;
