//! Chat screen: navigation chrome over a message transcript, with the
//! full-screen attachment overlay on top.

use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::StatefulWidget,
};

use crate::domain::entities::{ImageId, Message};
use crate::infrastructure::config::ConversationConfig;
use crate::presentation::events::{EventHandler, EventResult};
use crate::presentation::state::ChatViewState;
use crate::presentation::theme::Theme;
use crate::presentation::widgets::{
    AttachmentOverlay, AttachmentOverlayState, ChromeConfig, ImageManager, MessageList,
    MessageListState, NavigationChrome, NavigationChromeState,
};

pub struct ChatScreenState {
    theme: Theme,
    conversation: ConversationConfig,
    timestamp_format: String,
    messages: Vec<Message>,
    view_state: ChatViewState,
    chrome: NavigationChromeState,
    overlay: AttachmentOverlayState,
    list: MessageListState,
    images: ImageManager,
}

impl ChatScreenState {
    /// Creates the screen state with explicit theme and action callbacks.
    #[must_use]
    pub fn new(
        theme: Theme,
        conversation: ConversationConfig,
        images: ImageManager,
        on_back: impl FnMut() + 'static,
        on_call: impl FnMut() + 'static,
    ) -> Self {
        Self {
            theme,
            conversation,
            timestamp_format: "%H:%M".to_string(),
            messages: Vec::new(),
            view_state: ChatViewState::new(),
            chrome: NavigationChromeState::new(theme, on_back, on_call),
            overlay: AttachmentOverlayState::new(),
            list: MessageListState::new(),
            images,
        }
    }

    /// Sets the timestamp format used by the transcript.
    pub fn set_timestamp_format(&mut self, format: impl Into<String>) {
        self.timestamp_format = format.into();
    }

    /// Replaces the transcript.
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.list = MessageListState::new();
    }

    /// Appends a message to the transcript.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Builds the header configuration for this render pass.
    #[must_use]
    pub fn chrome_config(&self) -> ChromeConfig {
        let mut config = ChromeConfig::new(self.conversation.title.clone());
        if let Some(status) = &self.conversation.status {
            config = config.with_status(status.clone());
        }
        if let Some(cover_url) = &self.conversation.cover_url {
            config = config.with_cover_url(cover_url.clone());
        }
        config
    }

    #[must_use]
    pub const fn view_state(&self) -> &ChatViewState {
        &self.view_state
    }

    #[must_use]
    pub const fn view_state_mut(&mut self) -> &mut ChatViewState {
        &mut self.view_state
    }

    #[must_use]
    pub const fn chrome(&self) -> &NavigationChromeState {
        &self.chrome
    }

    #[must_use]
    pub const fn chrome_mut(&mut self) -> &mut NavigationChromeState {
        &mut self.chrome
    }

    #[must_use]
    pub const fn overlay(&self) -> &AttachmentOverlayState {
        &self.overlay
    }

    /// Collects the image loads this screen currently needs: the avatar
    /// slot and the full-screen attachment, each requested at most once.
    pub fn pending_image_requests(&mut self) -> Vec<(ImageId, String)> {
        let config = self.chrome_config();
        self.chrome.sync_config(&config);
        self.overlay
            .sync_attachment(self.view_state.fullscreen_attachment());

        let mut requests = Vec::new();
        if let Some(request) = self.chrome.take_avatar_request() {
            requests.push(request);
        }
        if let Some(request) = self.overlay.take_image_request() {
            requests.push(request);
        }
        requests
    }

    /// Folds a loader success into whichever slot is waiting for it.
    pub fn image_loaded(&mut self, id: &ImageId, image: std::sync::Arc<image::DynamicImage>) {
        self.chrome.avatar_loaded(id, image.clone());
        self.overlay.image_loaded(id, image);
    }

    /// Folds a loader failure; both slots degrade to placeholders.
    pub fn image_failed(&mut self, id: &ImageId, error: &str) {
        self.chrome.avatar_failed(id, error.to_string());
        self.overlay.image_failed(id, error.to_string());
    }

    /// Handles a key event. The overlay sees dismiss keys first; the
    /// chrome sees back/call keys last, after transcript navigation.
    pub fn handle_key(&mut self, key: &KeyEvent) -> EventResult {
        if self.view_state.has_fullscreen() && EventHandler::is_back_event(key) {
            self.view_state.dismiss_fullscreen();
            self.overlay.sync_attachment(None);
            return EventResult::Consumed;
        }

        if EventHandler::is_quit_event(key) {
            return EventResult::Exit;
        }

        if EventHandler::is_submit_event(key) {
            if let Some(attachment) = self.list.selected_attachment(&self.messages) {
                let attachment = attachment.clone();
                self.view_state.show_fullscreen(attachment);
                self.overlay
                    .sync_attachment(self.view_state.fullscreen_attachment());
            }
            return EventResult::Consumed;
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.select_next(&self.messages);
                EventResult::Consumed
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.select_previous(&self.messages);
                EventResult::Consumed
            }
            _ => {
                if self.chrome.handle_key(key) {
                    EventResult::Consumed
                } else {
                    EventResult::Continue
                }
            }
        }
    }

    /// Handles a mouse event; only the chrome's hit areas react.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent) -> EventResult {
        if self.chrome.handle_mouse(mouse) {
            EventResult::Consumed
        } else {
            EventResult::Continue
        }
    }

    fn update_protocols(&mut self) {
        let picker = self.images.picker();
        if let Some(avatar) = self.chrome.avatar_mut() {
            avatar.update_protocol_if_needed(picker);
        }
        self.overlay.update_protocol(picker);
    }
}

impl std::fmt::Debug for ChatScreenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatScreenState")
            .field("conversation", &self.conversation)
            .field("messages", &self.messages.len())
            .field("view_state", &self.view_state)
            .finish_non_exhaustive()
    }
}

/// Render-pass side of the chat screen.
#[derive(Debug, Default)]
pub struct ChatScreen;

impl ChatScreen {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl StatefulWidget for ChatScreen {
    type State = ChatScreenState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let config = state.chrome_config();
        state.chrome.sync_config(&config);
        state
            .overlay
            .sync_attachment(state.view_state.fullscreen_attachment());
        state.update_protocols();

        let chrome_height = NavigationChrome::height(&config).min(area.height);
        let chrome_area = Rect::new(area.x, area.y, area.width, chrome_height);
        NavigationChrome::new(&config).render(chrome_area, buf, &mut state.chrome);

        let list_area = Rect::new(
            area.x,
            area.y + chrome_height,
            area.width,
            area.height.saturating_sub(chrome_height),
        );
        let theme = state.theme;
        MessageList::new(&state.messages, &theme)
            .timestamp_format(&state.timestamp_format)
            .render(list_area, buf, &mut state.list);

        if let Some(attachment) = state.view_state.fullscreen_attachment() {
            let attachment = attachment.clone();
            AttachmentOverlay::new(&attachment, &theme).render(area, buf, &mut state.overlay);
        }
    }
}
