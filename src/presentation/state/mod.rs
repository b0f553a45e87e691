//! Observable chat-screen view state.
//!
//! A chat screen has exactly one piece of mutable presentation state: the
//! attachment, if any, currently shown full-screen over the conversation.
//! [`ChatViewState`] is its single source of truth. Observers are plain
//! callbacks invoked synchronously on every change; everything runs on the
//! UI event loop, so there is no locking and no channel.

use crate::domain::entities::Attachment;

/// Handle returned by [`ChatViewState::observe`], used to unsubscribe.
pub type ObserverId = usize;

type Observer = Box<dyn FnMut(Option<&Attachment>)>;

/// Single source of truth for the full-screen attachment.
///
/// Holds at most one attachment at a time; showing a new one replaces the
/// previous reference without warning (last-write-wins, no queue).
#[derive(Default)]
pub struct ChatViewState {
    fullscreen_attachment: Option<Attachment>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: ObserverId,
}

impl ChatViewState {
    /// Creates an empty state with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The attachment currently shown full-screen, if any. No side effect.
    #[must_use]
    pub fn fullscreen_attachment(&self) -> Option<&Attachment> {
        self.fullscreen_attachment.as_ref()
    }

    /// Returns true when an attachment is showing.
    #[must_use]
    pub const fn has_fullscreen(&self) -> bool {
        self.fullscreen_attachment.is_some()
    }

    /// Shows an attachment full-screen, replacing any previous one, and
    /// notifies observers synchronously.
    pub fn show_fullscreen(&mut self, attachment: Attachment) {
        self.fullscreen_attachment = Some(attachment);
        self.notify();
    }

    /// Clears the full-screen attachment and notifies observers.
    /// Calling this when nothing is showing is a no-op.
    pub fn dismiss_fullscreen(&mut self) {
        if self.fullscreen_attachment.is_none() {
            return;
        }
        self.fullscreen_attachment = None;
        self.notify();
    }

    /// Registers an observer called on every change with the new value.
    pub fn observe(&mut self, observer: impl FnMut(Option<&Attachment>) + 'static) -> ObserverId {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Unknown ids are ignored.
    pub fn unobserve(&mut self, id: ObserverId) {
        self.observers.retain(|(oid, _)| *oid != id);
    }

    fn notify(&mut self) {
        let current = self.fullscreen_attachment.as_ref();
        for (_, observer) in &mut self.observers {
            observer(current);
        }
    }
}

impl std::fmt::Debug for ChatViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatViewState")
            .field("fullscreen_attachment", &self.fullscreen_attachment)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AttachmentKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn attachment(name: &str) -> Attachment {
        Attachment::new(
            format!("https://example.com/{name}"),
            name,
            AttachmentKind::Image,
        )
    }

    #[test]
    fn test_starts_empty() {
        let state = ChatViewState::new();
        assert!(state.fullscreen_attachment().is_none());
        assert!(!state.has_fullscreen());
    }

    #[test]
    fn test_show_sets_current() {
        let mut state = ChatViewState::new();
        let a = attachment("a.png");
        let id = a.id();

        state.show_fullscreen(a);

        assert_eq!(state.fullscreen_attachment().map(Attachment::id), Some(id));
    }

    #[test]
    fn test_last_write_wins() {
        let mut state = ChatViewState::new();
        let a = attachment("a.png");
        let b = attachment("b.png");
        let b_id = b.id();

        state.show_fullscreen(a);
        state.show_fullscreen(b);

        assert_eq!(
            state.fullscreen_attachment().map(Attachment::id),
            Some(b_id)
        );
    }

    #[test]
    fn test_show_show_dismiss_ends_empty() {
        let mut state = ChatViewState::new();

        state.show_fullscreen(attachment("a.png"));
        state.show_fullscreen(attachment("b.png"));
        state.dismiss_fullscreen();

        assert!(state.fullscreen_attachment().is_none());
    }

    #[test]
    fn test_dismiss_when_empty_is_noop() {
        let mut state = ChatViewState::new();
        let notified = Rc::new(RefCell::new(0u32));
        let counter = notified.clone();
        state.observe(move |_| *counter.borrow_mut() += 1);

        state.dismiss_fullscreen();

        assert!(state.fullscreen_attachment().is_none());
        assert_eq!(*notified.borrow(), 0);
    }

    #[test]
    fn test_observers_see_every_change() {
        let mut state = ChatViewState::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        state.observe(move |current| {
            sink.borrow_mut().push(current.map(|a| a.filename().to_string()));
        });

        state.show_fullscreen(attachment("a.png"));
        state.show_fullscreen(attachment("b.png"));
        state.dismiss_fullscreen();

        assert_eq!(
            *seen.borrow(),
            vec![
                Some("a.png".to_string()),
                Some("b.png".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_unobserve_stops_notifications() {
        let mut state = ChatViewState::new();
        let notified = Rc::new(RefCell::new(0u32));
        let counter = notified.clone();
        let id = state.observe(move |_| *counter.borrow_mut() += 1);

        state.show_fullscreen(attachment("a.png"));
        state.unobserve(id);
        state.dismiss_fullscreen();

        assert_eq!(*notified.borrow(), 1);
    }
}
