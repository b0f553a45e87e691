//! UI screens.

mod app;
mod chat_screen;

pub use app::App;
pub use chat_screen::{ChatScreen, ChatScreenState};
