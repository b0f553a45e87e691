//! Full-screen attachment overlay.
//!
//! Drawn over the host content whenever the chat view state holds a
//! full-screen attachment. Image attachments render through the terminal
//! graphics protocol once loaded; everything else gets a filename card.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, StatefulWidget, Widget},
};

use crate::domain::entities::{Attachment, ImageId};
use crate::presentation::theme::Theme;
use crate::presentation::widgets::image_slot::ImageSlot;

pub struct AttachmentOverlayStyle {
    pub border: Style,
    pub filename: Style,
    pub hint: Style,
    pub notice: Style,
}

impl AttachmentOverlayStyle {
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            border: Style::default().fg(theme.accent),
            filename: theme.title_style,
            hint: theme.dimmed_style,
            notice: theme.status_style,
        }
    }
}

/// Event-pass side of the overlay: the image slot for the shown attachment.
#[derive(Debug, Default)]
pub struct AttachmentOverlayState {
    slot: Option<ImageSlot>,
}

impl AttachmentOverlayState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the image slot with the currently shown attachment.
    /// Non-image attachments and an empty state clear the slot.
    pub fn sync_attachment(&mut self, attachment: Option<&Attachment>) {
        let Some(attachment) = attachment.filter(|a| a.is_image()) else {
            self.slot = None;
            return;
        };

        let stale = self
            .slot
            .as_ref()
            .is_none_or(|slot| slot.url() != attachment.url());
        if stale {
            self.slot = Some(ImageSlot::new(attachment.url()));
        }
    }

    /// Takes the pending image load request, marking it in flight.
    pub fn take_image_request(&mut self) -> Option<(ImageId, String)> {
        let slot = self.slot.as_mut()?;
        if !slot.needs_load() {
            return None;
        }
        slot.set_downloading();
        Some((slot.id().clone(), slot.url().to_string()))
    }

    /// Folds a successful load into the slot; other images are ignored.
    pub fn image_loaded(&mut self, id: &ImageId, image: std::sync::Arc<image::DynamicImage>) {
        if let Some(slot) = self.slot.as_mut()
            && slot.id() == id
        {
            slot.set_loaded(image);
        }
    }

    /// Folds a failed load into the slot; the failure notice is cosmetic.
    pub fn image_failed(&mut self, id: &ImageId, error: String) {
        if let Some(slot) = self.slot.as_mut()
            && slot.id() == id
        {
            slot.set_failed(error);
        }
    }

    /// Builds the terminal protocol for a freshly loaded image.
    pub fn update_protocol(&mut self, picker: &ratatui_image::picker::Picker) {
        if let Some(slot) = self.slot.as_mut() {
            slot.update_protocol_if_needed(picker);
        }
    }

    #[must_use]
    pub const fn slot(&self) -> Option<&ImageSlot> {
        self.slot.as_ref()
    }
}

/// Render-pass side of the overlay.
pub struct AttachmentOverlay<'a> {
    attachment: &'a Attachment,
    theme: &'a Theme,
}

impl<'a> AttachmentOverlay<'a> {
    #[must_use]
    pub const fn new(attachment: &'a Attachment, theme: &'a Theme) -> Self {
        Self { attachment, theme }
    }
}

impl StatefulWidget for AttachmentOverlay<'_> {
    type State = AttachmentOverlayState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width < 4 || area.height < 4 {
            return;
        }

        let style = AttachmentOverlayStyle::from_theme(self.theme);

        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style.border)
            .title(Span::styled(
                format!(" {} ", self.attachment.filename()),
                style.filename,
            ));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let hint_area = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);
        Paragraph::new(Line::from(Span::styled("Esc to close", style.hint)))
            .alignment(Alignment::Center)
            .render(hint_area, buf);

        let body = Rect {
            height: inner.height - 1,
            ..inner
        };
        if body.height == 0 {
            return;
        }

        let notice = |text: &str, buf: &mut Buffer| {
            let y = body.y + body.height / 2;
            Paragraph::new(Line::from(Span::styled(text.to_string(), style.notice)))
                .alignment(Alignment::Center)
                .render(Rect::new(body.x, y, body.width, 1), buf);
        };

        if !self.attachment.is_image() {
            notice(self.attachment.filename(), buf);
            return;
        }

        match state.slot.as_mut() {
            Some(slot) if slot.is_ready() => {
                if let Some(protocol) = slot.protocol_mut() {
                    StatefulWidget::render(
                        ratatui_image::StatefulImage::default(),
                        body,
                        buf,
                        protocol,
                    );
                } else {
                    notice("Loading…", buf);
                }
            }
            Some(slot) if slot.status().is_failed() => {
                notice("Preview unavailable", buf);
            }
            _ => {
                notice("Loading…", buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AttachmentKind;

    fn image_attachment() -> Attachment {
        Attachment::new(
            "https://example.com/photo.png",
            "photo.png",
            AttachmentKind::Image,
        )
    }

    fn render(attachment: &Attachment, state: &mut AttachmentOverlayState) -> Buffer {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        AttachmentOverlay::new(attachment, &theme).render(area, &mut buf, state);
        buf
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = *buf.area();
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_sync_creates_slot_for_image() {
        let mut state = AttachmentOverlayState::new();
        let attachment = image_attachment();

        state.sync_attachment(Some(&attachment));
        assert!(state.slot().is_some());

        state.sync_attachment(None);
        assert!(state.slot().is_none());
    }

    #[test]
    fn test_non_image_attachment_has_no_slot() {
        let mut state = AttachmentOverlayState::new();
        let file = Attachment::new("https://example.com/notes.pdf", "notes.pdf", AttachmentKind::File);

        state.sync_attachment(Some(&file));
        assert!(state.slot().is_none());
        assert!(state.take_image_request().is_none());
    }

    #[test]
    fn test_request_taken_once() {
        let mut state = AttachmentOverlayState::new();
        let attachment = image_attachment();

        state.sync_attachment(Some(&attachment));
        assert!(state.take_image_request().is_some());
        assert!(state.take_image_request().is_none());
    }

    #[test]
    fn test_render_shows_filename_and_hint() {
        let mut state = AttachmentOverlayState::new();
        let attachment = image_attachment();
        state.sync_attachment(Some(&attachment));

        let buf = render(&attachment, &mut state);
        let text = buffer_text(&buf);

        assert!(text.contains("photo.png"));
        assert!(text.contains("Esc to close"));
        assert!(text.contains("Loading…"));
    }

    #[test]
    fn test_render_failed_load_shows_notice() {
        let mut state = AttachmentOverlayState::new();
        let attachment = image_attachment();
        state.sync_attachment(Some(&attachment));
        let (id, _) = state.take_image_request().unwrap();
        state.image_failed(&id, "HTTP 500".to_string());

        let buf = render(&attachment, &mut state);
        assert!(buffer_text(&buf).contains("Preview unavailable"));
    }

    #[test]
    fn test_render_file_card() {
        let mut state = AttachmentOverlayState::new();
        let file = Attachment::new("https://example.com/notes.pdf", "notes.pdf", AttachmentKind::File);
        state.sync_attachment(Some(&file));

        let buf = render(&file, &mut state);
        assert!(buffer_text(&buf).contains("notes.pdf"));
    }
}
