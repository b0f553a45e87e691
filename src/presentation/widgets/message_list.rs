//! Message list: the chat screen's host content.
//!
//! Renders the conversation transcript with one row per message and one
//! indented row per attachment. Attachment rows are selectable; activating
//! the selected row is how the caller shows an attachment full-screen.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};

use crate::domain::entities::{Attachment, Message};
use crate::presentation::theme::Theme;

pub struct MessageListStyle {
    pub author: Style,
    pub own_author: Style,
    pub content: Style,
    pub timestamp: Style,
    pub attachment: Style,
    pub selection: Style,
}

impl MessageListStyle {
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            author: theme.title_style,
            own_author: Style::default().fg(theme.accent),
            content: theme.base_style,
            timestamp: theme.dimmed_style,
            attachment: theme.status_style,
            selection: theme.selection_style,
        }
    }
}

/// Selection state over the transcript's attachment rows.
#[derive(Debug, Default)]
pub struct MessageListState {
    selected: Option<usize>,
}

impl MessageListState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Moves the selection to the next attachment row, clamping at the end.
    pub fn select_next(&mut self, messages: &[Message]) {
        let count = attachment_count(messages);
        if count == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1).min(count - 1),
            None => 0,
        });
    }

    /// Moves the selection to the previous attachment row, clamping at zero.
    pub fn select_previous(&mut self, messages: &[Message]) {
        if attachment_count(messages) == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    /// Resolves the selected row to its attachment.
    #[must_use]
    pub fn selected_attachment<'a>(&self, messages: &'a [Message]) -> Option<&'a Attachment> {
        let index = self.selected?;
        messages
            .iter()
            .flat_map(Message::attachments)
            .nth(index)
    }
}

fn attachment_count(messages: &[Message]) -> usize {
    messages.iter().map(|m| m.attachments().len()).sum()
}

/// Render-pass side of the message list.
pub struct MessageList<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
    timestamp_format: &'a str,
}

impl<'a> MessageList<'a> {
    #[must_use]
    pub const fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            timestamp_format: "%H:%M",
        }
    }

    /// Overrides the timestamp format (chrono syntax).
    #[must_use]
    pub const fn timestamp_format(mut self, format: &'a str) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl StatefulWidget for MessageList<'_> {
    type State = MessageListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let style = MessageListStyle::from_theme(self.theme);
        let mut y = area.y;
        let mut attachment_index = 0usize;

        for message in self.messages {
            if y >= area.bottom() {
                break;
            }

            let author_style = if message.is_outgoing() {
                style.own_author
            } else {
                style.author
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("[{}] ", message.timestamp().format(self.timestamp_format)),
                    style.timestamp,
                ),
                Span::styled(format!("{}: ", message.author()), author_style),
                Span::styled(message.content().to_string(), style.content),
            ]);
            Paragraph::new(line).render(Rect::new(area.x, y, area.width, 1), buf);
            y += 1;

            for attachment in message.attachments() {
                if y >= area.bottom() {
                    break;
                }

                let row_style = if state.selected == Some(attachment_index) {
                    style.selection
                } else {
                    style.attachment
                };
                let line = Line::from(Span::styled(
                    format!(
                        "  {} {}",
                        self.theme.icons.attachment,
                        attachment.filename()
                    ),
                    row_style,
                ));
                Paragraph::new(line).render(Rect::new(area.x, y, area.width, 1), buf);
                y += 1;
                attachment_index += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AttachmentKind, MessageId};

    fn transcript() -> Vec<Message> {
        vec![
            Message::new(MessageId(1), "alice", "look at this").with_attachment(
                Attachment::new("https://example.com/a.png", "a.png", AttachmentKind::Image),
            ),
            Message::new(MessageId(2), "bob", "nice").outgoing(),
            Message::new(MessageId(3), "alice", "and these").with_attachment(
                Attachment::new("https://example.com/b.png", "b.png", AttachmentKind::Image),
            ).with_attachment(
                Attachment::new("https://example.com/c.pdf", "c.pdf", AttachmentKind::File),
            ),
        ]
    }

    #[test]
    fn test_selection_walks_attachment_rows() {
        let messages = transcript();
        let mut state = MessageListState::new();

        assert!(state.selected().is_none());

        state.select_next(&messages);
        assert_eq!(state.selected(), Some(0));
        assert_eq!(
            state.selected_attachment(&messages).map(Attachment::filename),
            Some("a.png")
        );

        state.select_next(&messages);
        state.select_next(&messages);
        assert_eq!(
            state.selected_attachment(&messages).map(Attachment::filename),
            Some("c.pdf")
        );

        // Clamped at the last row
        state.select_next(&messages);
        assert_eq!(state.selected(), Some(2));

        state.select_previous(&messages);
        assert_eq!(
            state.selected_attachment(&messages).map(Attachment::filename),
            Some("b.png")
        );
    }

    #[test]
    fn test_selection_empty_transcript() {
        let mut state = MessageListState::new();
        state.select_next(&[]);
        assert!(state.selected().is_none());
        assert!(state.selected_attachment(&[]).is_none());
    }

    #[test]
    fn test_render_shows_messages_and_attachments() {
        let messages = transcript();
        let mut state = MessageListState::new();
        let theme = Theme::default();

        let area = Rect::new(0, 0, 50, 10);
        let mut buf = Buffer::empty(area);
        MessageList::new(&messages, &theme).render(area, &mut buf, &mut state);

        let mut text = String::new();
        for y in 0..10 {
            for x in 0..50 {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }

        assert!(text.contains("alice: look at this"));
        assert!(text.contains("a.png"));
        assert!(text.contains("bob: nice"));
        assert!(text.contains("c.pdf"));
    }
}
