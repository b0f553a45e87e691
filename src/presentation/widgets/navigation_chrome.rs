//! Navigation chrome: the chat screen's header bar.
//!
//! Fixed left-to-right layout: back button, avatar (only when a cover URL
//! is configured), title block, flexible spacer, call button. The back and
//! call actions are supplied by the caller at construction; the chrome
//! performs no navigation or call logic itself.

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::domain::entities::ImageId;
use crate::presentation::events::EventHandler;
use crate::presentation::theme::Theme;
use crate::presentation::widgets::image_slot::ImageSlot;

const BACK_WIDTH: u16 = 3;
const CALL_WIDTH: u16 = 3;
const AVATAR_WIDTH: u16 = 4;

/// Per-render header configuration, constructed fresh by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeConfig {
    /// Conversation title, always shown.
    pub title: String,
    /// Presence line under the title; empty means no second line.
    pub status: Option<String>,
    /// Avatar URL; empty means the avatar slot is omitted entirely.
    pub cover_url: Option<String>,
}

impl ChromeConfig {
    /// Creates a config with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: None,
            cover_url: None,
        }
    }

    /// Sets the presence line.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_cover_url(mut self, url: impl Into<String>) -> Self {
        self.cover_url = Some(url.into());
        self
    }

    /// True when a non-empty status line is configured.
    #[must_use]
    pub fn has_status(&self) -> bool {
        self.status.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// True when a non-empty cover URL is configured.
    #[must_use]
    pub fn has_cover(&self) -> bool {
        self.cover_url.as_deref().is_some_and(|s| !s.is_empty())
    }
}

pub struct NavigationChromeStyle {
    pub back: Style,
    pub title: Style,
    pub status: Style,
    pub call: Style,
    pub placeholder: Style,
}

impl NavigationChromeStyle {
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            back: theme.title_style,
            title: theme.title_style,
            status: theme.status_style,
            call: Style::default().fg(theme.accent),
            placeholder: theme.placeholder_style,
        }
    }
}

/// Event-pass side of the chrome: callbacks, avatar state, hit areas.
pub struct NavigationChromeState {
    theme: Theme,
    on_back: Box<dyn FnMut()>,
    on_call: Box<dyn FnMut()>,
    avatar: Option<ImageSlot>,
    back_area: Option<Rect>,
    call_area: Option<Rect>,
}

impl NavigationChromeState {
    /// Creates chrome state with explicit theme and action callbacks.
    #[must_use]
    pub fn new(
        theme: Theme,
        on_back: impl FnMut() + 'static,
        on_call: impl FnMut() + 'static,
    ) -> Self {
        Self {
            theme,
            on_back: Box::new(on_back),
            on_call: Box::new(on_call),
            avatar: None,
            back_area: None,
            call_area: None,
        }
    }

    #[must_use]
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    #[must_use]
    pub const fn has_avatar(&self) -> bool {
        self.avatar.is_some()
    }

    #[must_use]
    pub const fn avatar(&self) -> Option<&ImageSlot> {
        self.avatar.as_ref()
    }

    #[must_use]
    pub const fn avatar_mut(&mut self) -> Option<&mut ImageSlot> {
        self.avatar.as_mut()
    }

    /// Invokes the back action.
    pub fn activate_back(&mut self) {
        (self.on_back)();
    }

    /// Invokes the call action.
    pub fn activate_call(&mut self) {
        (self.on_call)();
    }

    /// Maps a key press to an activation. Returns true when consumed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if EventHandler::is_back_event(key) {
            self.activate_back();
            true
        } else if EventHandler::is_call_event(key) {
            self.activate_call();
            true
        } else {
            false
        }
    }

    /// Maps a left click on a recorded hit area to an activation.
    /// Returns true when consumed.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent) -> bool {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return false;
        }

        let position = Position::new(mouse.column, mouse.row);
        if self.back_area.is_some_and(|area| area.contains(position)) {
            self.activate_back();
            true
        } else if self.call_area.is_some_and(|area| area.contains(position)) {
            self.activate_call();
            true
        } else {
            false
        }
    }

    /// Reconciles the avatar slot with the configured cover URL.
    /// Dropping or changing the URL resets the slot.
    pub fn sync_config(&mut self, config: &ChromeConfig) {
        if !config.has_cover() {
            self.avatar = None;
            return;
        }

        let url = config.cover_url.as_deref().unwrap_or_default();
        let stale = self.avatar.as_ref().is_none_or(|a| a.url() != url);
        if stale {
            self.avatar = Some(ImageSlot::new(url));
        }
    }

    /// Takes the pending avatar load request, marking it in flight.
    /// Returns None when nothing needs loading.
    pub fn take_avatar_request(&mut self) -> Option<(ImageId, String)> {
        let avatar = self.avatar.as_mut()?;
        if !avatar.needs_load() {
            return None;
        }
        avatar.set_downloading();
        Some((avatar.id().clone(), avatar.url().to_string()))
    }

    /// Folds a successful avatar load into the slot.
    /// Events for other images are ignored.
    pub fn avatar_loaded(&mut self, id: &ImageId, image: std::sync::Arc<image::DynamicImage>) {
        if let Some(avatar) = self.avatar.as_mut()
            && avatar.id() == id
        {
            avatar.set_loaded(image);
        }
    }

    /// Folds a failed avatar load into the slot; the placeholder stays.
    pub fn avatar_failed(&mut self, id: &ImageId, error: String) {
        if let Some(avatar) = self.avatar.as_mut()
            && avatar.id() == id
        {
            avatar.set_failed(error);
        }
    }

    #[must_use]
    pub const fn back_area(&self) -> Option<Rect> {
        self.back_area
    }

    #[must_use]
    pub const fn call_area(&self) -> Option<Rect> {
        self.call_area
    }
}

impl std::fmt::Debug for NavigationChromeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationChromeState")
            .field("avatar", &self.avatar)
            .field("back_area", &self.back_area)
            .field("call_area", &self.call_area)
            .finish_non_exhaustive()
    }
}

/// Render-pass side of the chrome.
pub struct NavigationChrome<'a> {
    config: &'a ChromeConfig,
    style: Option<NavigationChromeStyle>,
}

impl<'a> NavigationChrome<'a> {
    #[must_use]
    pub const fn new(config: &'a ChromeConfig) -> Self {
        Self {
            config,
            style: None,
        }
    }

    /// Overrides the theme-derived style.
    #[must_use]
    pub fn style(mut self, style: NavigationChromeStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Rows the chrome occupies: two with a status line, one without.
    #[must_use]
    pub fn height(config: &ChromeConfig) -> u16 {
        if config.has_status() { 2 } else { 1 }
    }
}

impl StatefulWidget for NavigationChrome<'_> {
    type State = NavigationChromeState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.back_area = None;
        state.call_area = None;

        let height = Self::height(self.config).min(area.height);
        if area.width == 0 || height == 0 {
            return;
        }

        let style = self
            .style
            .unwrap_or_else(|| NavigationChromeStyle::from_theme(&state.theme));
        let icons = state.theme.icons;

        let mut x = area.x;

        // Back button
        let back_rect = Rect::new(x, area.y, BACK_WIDTH.min(area.width), height);
        Paragraph::new(Line::from(Span::styled(
            format!(" {} ", icons.back),
            style.back,
        )))
        .render(Rect { height: 1, ..back_rect }, buf);
        state.back_area = Some(back_rect);
        x = x.saturating_add(BACK_WIDTH);

        // Avatar slot, only reserved when a cover URL is configured
        if self.config.has_cover() && x + AVATAR_WIDTH < area.right() {
            let avatar_rect = Rect::new(x, area.y, AVATAR_WIDTH, height);
            render_avatar(avatar_rect, buf, state, style.placeholder);
            x = x.saturating_add(AVATAR_WIDTH + 1);
        } else {
            x = x.saturating_add(1);
        }

        // Call button, right-aligned
        let call_x = area.right().saturating_sub(CALL_WIDTH);
        if call_x > x {
            let call_rect = Rect::new(call_x, area.y, CALL_WIDTH, height);
            Paragraph::new(Line::from(Span::styled(
                format!(" {} ", icons.call),
                style.call,
            )))
            .render(Rect { height: 1, ..call_rect }, buf);
            state.call_area = Some(call_rect);
        }

        // Title block fills the gap up to the spacer
        let title_width = call_x.saturating_sub(x + 1);
        if title_width == 0 {
            return;
        }

        let title = truncate_to_width(&self.config.title, title_width as usize);
        Paragraph::new(Line::from(Span::styled(title, style.title))).render(
            Rect::new(x, area.y, title_width, 1),
            buf,
        );

        if height > 1
            && self.config.has_status()
            && let Some(status) = self.config.status.as_deref()
        {
            let status = truncate_to_width(status, title_width as usize);
            Paragraph::new(Line::from(Span::styled(status, style.status))).render(
                Rect::new(x, area.y + 1, title_width, 1),
                buf,
            );
        }
    }
}

fn render_avatar(area: Rect, buf: &mut Buffer, state: &mut NavigationChromeState, placeholder: Style) {
    let ready = state
        .avatar
        .as_mut()
        .map(|avatar| avatar.is_ready())
        .unwrap_or(false);

    if ready && let Some(avatar) = state.avatar.as_mut()
        && let Some(protocol) = avatar.protocol_mut()
    {
        StatefulWidget::render(ratatui_image::StatefulImage::default(), area, buf, protocol);
        return;
    }

    // Loading, failed, or not yet synced: flat placeholder fill
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            buf[(x, y)].set_char(' ').set_style(placeholder);
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut out = String::new();
    let mut used = 0usize;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counters() -> (Rc<RefCell<u32>>, Rc<RefCell<u32>>, NavigationChromeState) {
        let backs = Rc::new(RefCell::new(0u32));
        let calls = Rc::new(RefCell::new(0u32));
        let b = backs.clone();
        let c = calls.clone();
        let state = NavigationChromeState::new(
            Theme::default(),
            move || *b.borrow_mut() += 1,
            move || *c.borrow_mut() += 1,
        );
        (backs, calls, state)
    }

    fn render(config: &ChromeConfig, state: &mut NavigationChromeState, width: u16) -> Buffer {
        let height = NavigationChrome::height(config);
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        NavigationChrome::new(config).render(area, &mut buf, state);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        let area = *buf.area();
        (area.left()..area.right())
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    /// Column (not byte offset) where `needle` starts.
    fn column_of(text: &str, needle: &str) -> Option<usize> {
        text.find(needle)
            .map(|byte| text[..byte].chars().count())
    }

    #[test]
    fn test_height_collapses_without_status() {
        let with_status = ChromeConfig::new("Alice").with_status("online");
        let without = ChromeConfig::new("Alice");
        let blank = ChromeConfig::new("Alice").with_status("");

        assert_eq!(NavigationChrome::height(&with_status), 2);
        assert_eq!(NavigationChrome::height(&without), 1);
        assert_eq!(NavigationChrome::height(&blank), 1);
    }

    #[test]
    fn test_render_order_back_title_call() {
        let (_, _, mut state) = counters();
        let config = ChromeConfig::new("Alice").with_status("online");
        let buf = render(&config, &mut state, 40);

        let top = row_text(&buf, 0);
        assert!(top.contains('‹'));
        assert!(top.contains("Alice"));
        assert!(top.contains('✆'));
        assert!(top.find('‹').unwrap() < top.find("Alice").unwrap());
        assert!(top.find("Alice").unwrap() < top.find('✆').unwrap());

        let second = row_text(&buf, 1);
        assert!(second.contains("online"));
    }

    #[test]
    fn test_no_cover_means_no_avatar_slot() {
        let (_, _, mut state) = counters();
        let config = ChromeConfig::new("Alice");
        state.sync_config(&config);

        assert!(!state.has_avatar());

        let buf = render(&config, &mut state, 40);
        // Title starts directly after the back button and a single gap
        let top = row_text(&buf, 0);
        assert_eq!(column_of(&top, "Alice"), Some(4));
    }

    #[test]
    fn test_cover_reserves_placeholder_slot() {
        let (_, _, mut state) = counters();
        let config = ChromeConfig::new("Alice").with_cover_url("https://example.com/a.png");
        state.sync_config(&config);

        assert!(state.has_avatar());

        let buf = render(&config, &mut state, 40);
        let top = row_text(&buf, 0);
        // Back (3) + avatar (4) + gap pushes the title to column 8
        assert_eq!(column_of(&top, "Alice"), Some(8));
    }

    #[test]
    fn test_sync_config_requests_load_once() {
        let (_, _, mut state) = counters();
        let config = ChromeConfig::new("Alice").with_cover_url("https://example.com/a.png");

        state.sync_config(&config);
        let first = state.take_avatar_request();
        assert!(first.is_some());

        // Same URL again: nothing new to load
        state.sync_config(&config);
        assert!(state.take_avatar_request().is_none());

        // Changed URL: a fresh request
        let changed = ChromeConfig::new("Alice").with_cover_url("https://example.com/b.png");
        state.sync_config(&changed);
        let second = state.take_avatar_request();
        assert!(second.is_some());
        assert_ne!(first.unwrap().0, second.unwrap().0);
    }

    #[test]
    fn test_dropping_cover_drops_avatar() {
        let (_, _, mut state) = counters();
        state.sync_config(&ChromeConfig::new("Alice").with_cover_url("https://example.com/a.png"));
        assert!(state.has_avatar());

        state.sync_config(&ChromeConfig::new("Alice"));
        assert!(!state.has_avatar());
    }

    #[test]
    fn test_failed_load_keeps_placeholder() {
        let (_, _, mut state) = counters();
        let config = ChromeConfig::new("Alice").with_cover_url("https://example.com/a.png");
        state.sync_config(&config);
        let (id, _) = state.take_avatar_request().unwrap();

        state.avatar_failed(&id, "HTTP 404".to_string());

        assert!(state.avatar().unwrap().status().is_failed());
        // Still renders (as a placeholder), no panic, no error surfaced
        let _ = render(&config, &mut state, 40);
    }

    #[test]
    fn test_loaded_event_for_other_image_is_ignored() {
        let (_, _, mut state) = counters();
        let config = ChromeConfig::new("Alice").with_cover_url("https://example.com/a.png");
        state.sync_config(&config);
        let _ = state.take_avatar_request();

        let other = ImageId::new("unrelated");
        let img = std::sync::Arc::new(image::DynamicImage::new_rgb8(8, 8));
        state.avatar_loaded(&other, img);

        assert!(!state.avatar().unwrap().is_ready());
    }

    #[test]
    fn test_key_activation_invokes_callbacks_once() {
        let (backs, calls, mut state) = counters();

        let esc = KeyEvent::new_with_kind(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press);
        assert!(state.handle_key(&esc));
        assert_eq!(*backs.borrow(), 1);
        assert_eq!(*calls.borrow(), 0);

        let c = KeyEvent::new_with_kind(
            KeyCode::Char('c'),
            KeyModifiers::NONE,
            KeyEventKind::Press,
        );
        assert!(state.handle_key(&c));
        assert_eq!(*calls.borrow(), 1);

        let other = KeyEvent::new_with_kind(
            KeyCode::Char('x'),
            KeyModifiers::NONE,
            KeyEventKind::Press,
        );
        assert!(!state.handle_key(&other));
        assert_eq!(*backs.borrow(), 1);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_mouse_activation_uses_hit_areas() {
        let (backs, calls, mut state) = counters();
        let config = ChromeConfig::new("Alice").with_status("online");
        let _ = render(&config, &mut state, 40);

        let back_area = state.back_area().unwrap();
        let call_area = state.call_area().unwrap();

        let click = |x: u16, y: u16| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        };

        assert!(state.handle_mouse(&click(back_area.x, back_area.y)));
        assert_eq!(*backs.borrow(), 1);

        assert!(state.handle_mouse(&click(call_area.x + 1, call_area.y)));
        assert_eq!(*calls.borrow(), 1);

        // A click in the spacer hits nothing
        assert!(!state.handle_mouse(&click(20, 0)));
        assert_eq!(*backs.borrow(), 1);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Alice", 10), "Alice");
        assert_eq!(truncate_to_width("A very long conversation title", 10), "A very lo…");
    }
}
