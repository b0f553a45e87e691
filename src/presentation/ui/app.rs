//! Main application orchestrator for the demo chat screen.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::entities::{Attachment, AttachmentKind, Message, MessageId};
use crate::domain::ports::ImageLoaderPort;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::image::ImageLoadedEvent;
use crate::presentation::events::EventResult;
use crate::presentation::theme::Theme;
use crate::presentation::ui::{ChatScreen, ChatScreenState};
use crate::presentation::widgets::ImageManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppState {
    Chat,
    Exiting,
}

pub struct App {
    state: AppState,
    screen: ChatScreenState,
    loader: Arc<dyn ImageLoaderPort>,
    image_events: mpsc::UnboundedReceiver<ImageLoadedEvent>,
    back_requested: Rc<Cell<bool>>,
}

impl App {
    /// Wires the chat screen to the image loader and its event channel.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        loader: Arc<dyn ImageLoaderPort>,
        image_events: mpsc::UnboundedReceiver<ImageLoadedEvent>,
        images: ImageManager,
    ) -> Self {
        let theme = Theme::new(
            &config.theme.accent_color,
            config.theme.status_color.as_deref(),
        );

        let back_requested = Rc::new(Cell::new(false));
        let back_flag = back_requested.clone();
        let title = config.conversation.title.clone();

        let mut screen = ChatScreenState::new(
            theme,
            config.conversation.clone(),
            images,
            move || back_flag.set(true),
            move || info!(callee = %title, "Call requested"),
        );
        screen.set_timestamp_format(config.ui.timestamp_format.clone());
        screen.set_messages(sample_transcript(&config.conversation.title));

        Self {
            state: AppState::Chat,
            screen,
            loader,
            image_events,
            back_requested,
        }
    }

    #[must_use]
    pub const fn screen(&self) -> &ChatScreenState {
        &self.screen
    }

    #[must_use]
    pub const fn screen_mut(&mut self) -> &mut ChatScreenState {
        &mut self.screen
    }

    /// Forwards the screen's pending image loads to the loader.
    pub fn dispatch_image_requests(&mut self) {
        for (id, url) in self.screen.pending_image_requests() {
            debug!(id = %id, url = %url, "Requesting image");
            self.loader.request(id, url);
        }
    }

    fn handle_image_event(&mut self, event: ImageLoadedEvent) {
        match event.result {
            Ok(loaded) => self.screen.image_loaded(&event.id, loaded.image),
            Err(error) => {
                // Cosmetic failure: the placeholder stays up
                warn!(id = %event.id, error = %error, "Image load failed");
                self.screen.image_failed(&event.id, &error);
            }
        }
    }

    /// Runs the event loop until the user quits or navigates back.
    ///
    /// # Errors
    /// Returns error if terminal drawing fails.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let mut terminal_events = EventStream::new();

        self.dispatch_image_requests();
        terminal.draw(|frame| self.render(frame))?;

        while self.state != AppState::Exiting {
            tokio::select! {
                Some(event) = self.image_events.recv() => {
                    self.handle_image_event(event);
                }

                Some(Ok(event)) = terminal_events.next() => {
                    match event {
                        Event::Key(key) => {
                            if self.screen.handle_key(&key) == EventResult::Exit {
                                self.state = AppState::Exiting;
                            }
                        }
                        Event::Mouse(mouse) => {
                            let _ = self.screen.handle_mouse(&mouse);
                        }
                        _ => {}
                    }
                }
            }

            if self.back_requested.get() {
                info!("Back requested, leaving chat screen");
                self.state = AppState::Exiting;
            }

            self.dispatch_image_requests();
            terminal.draw(|frame| self.render(frame))?;
        }

        info!("Application exiting normally");
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        frame.render_stateful_widget(ChatScreen::new(), frame.area(), &mut self.screen);
    }
}

/// Canned conversation used by the demo binary.
fn sample_transcript(title: &str) -> Vec<Message> {
    vec![
        Message::new(MessageId(1), title, "hey! back from the trip"),
        Message::new(MessageId(2), "me", "welcome back, how was it?").outgoing(),
        Message::new(MessageId(3), title, "amazing, here are a few shots")
            .with_attachment(
                Attachment::new(
                    "https://picsum.photos/seed/harbor/800/600",
                    "harbor.png",
                    AttachmentKind::Image,
                )
                .with_thumbnail("https://picsum.photos/seed/harbor/160/120"),
            )
            .with_attachment(
                Attachment::new(
                    "https://picsum.photos/seed/ridge/800/600",
                    "ridge.png",
                    AttachmentKind::Image,
                )
                .with_thumbnail("https://picsum.photos/seed/ridge/160/120"),
            ),
        Message::new(MessageId(4), title, "itinerary if you ever go").with_attachment(
            Attachment::new(
                "https://example.com/files/itinerary.pdf",
                "itinerary.pdf",
                AttachmentKind::File,
            ),
        ),
        Message::new(MessageId(5), "me", "these look great").outgoing(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ImageId;
    use crate::domain::ports::CacheResult;
    use crate::domain::entities::LoadedImage;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use mockall::predicate;

    mockall::mock! {
        Loader {}

        #[async_trait::async_trait]
        impl ImageLoaderPort for Loader {
            async fn load(&self, id: &ImageId, url: &str) -> CacheResult<LoadedImage>;
            fn request(&self, id: ImageId, url: String);
            fn cancel(&self, id: &ImageId);
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.conversation.title = "Alice".to_string();
        config.conversation.status = Some("online".to_string());
        config.conversation.cover_url = Some("https://example.com/alice.png".to_string());
        config
    }

    fn app_with(loader: MockLoader) -> App {
        let (_tx, rx) = mpsc::unbounded_channel();
        App::new(&config(), Arc::new(loader), rx, ImageManager::halfblocks())
    }

    #[tokio::test]
    async fn test_dispatch_requests_avatar_once() {
        let mut loader = MockLoader::new();
        let avatar_id = ImageId::from_url("https://example.com/alice.png");
        loader
            .expect_request()
            .with(predicate::eq(avatar_id), predicate::always())
            .times(1)
            .return_const(());

        let mut app = app_with(loader);
        app.dispatch_image_requests();
        // Second pass requests nothing new
        app.dispatch_image_requests();
    }

    #[tokio::test]
    async fn test_image_event_reaches_avatar_slot() {
        let mut loader = MockLoader::new();
        loader.expect_request().return_const(());

        let mut app = app_with(loader);
        app.dispatch_image_requests();

        let id = ImageId::from_url("https://example.com/alice.png");
        let image = std::sync::Arc::new(image::DynamicImage::new_rgb8(8, 8));
        app.handle_image_event(ImageLoadedEvent {
            id: id.clone(),
            result: Ok(LoadedImage {
                id: id.clone(),
                image,
                source: crate::domain::entities::ImageSource::Network,
            }),
        });

        assert!(app.screen().chrome().avatar().unwrap().is_ready());
    }

    #[tokio::test]
    async fn test_failed_load_degrades_silently() {
        let mut loader = MockLoader::new();
        loader.expect_request().return_const(());

        let mut app = app_with(loader);
        app.dispatch_image_requests();

        let id = ImageId::from_url("https://example.com/alice.png");
        app.handle_image_event(ImageLoadedEvent {
            id,
            result: Err("HTTP 404".to_string()),
        });

        let avatar = app.screen().chrome().avatar().unwrap();
        assert!(avatar.status().is_failed());
        assert!(!avatar.is_ready());
    }

    #[tokio::test]
    async fn test_back_key_sets_back_flag() {
        let loader = MockLoader::new();
        let mut app = app_with(loader);

        let esc = KeyEvent::new_with_kind(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press);
        app.screen_mut().handle_key(&esc);

        assert!(app.back_requested.get());
    }

    #[test]
    fn test_sample_transcript_has_attachments() {
        let transcript = sample_transcript("Alice");
        let attachments: usize = transcript.iter().map(|m| m.attachments().len()).sum();
        assert!(attachments >= 2);
    }
}
