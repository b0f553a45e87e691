//! Single-image load state shared by the avatar slot and the overlay.

use std::sync::Arc;

use ratatui_image::picker::{Picker, ProtocolType};
use ratatui_image::protocol::StatefulProtocol;

use crate::domain::entities::{ImageId, ImageStatus};

/// Load state of one displayed image.
///
/// Tracks one image keyed by its source URL. The owning widget renders the
/// image once ready and a placeholder otherwise; a failed fetch stays on
/// the placeholder, it is never surfaced.
pub struct ImageSlot {
    id: ImageId,
    url: String,
    image: Option<Arc<image::DynamicImage>>,
    protocol: Option<StatefulProtocol>,
    status: ImageStatus,
}

impl ImageSlot {
    /// Creates state for the given image URL, not yet loading.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: ImageId::from_url(&url),
            url,
            image: None,
            protocol: None,
            status: ImageStatus::NotStarted,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &ImageId {
        &self.id
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn status(&self) -> &ImageStatus {
        &self.status
    }

    pub fn set_downloading(&mut self) {
        self.status = ImageStatus::Downloading;
    }

    pub fn set_loaded(&mut self, image: Arc<image::DynamicImage>) {
        self.image = Some(image);
        self.status = ImageStatus::Ready;
        self.protocol = None;
    }

    pub fn set_failed(&mut self, error: String) {
        self.status = ImageStatus::Failed(error);
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.image.is_some() && self.status.is_ready()
    }

    #[must_use]
    pub const fn needs_load(&self) -> bool {
        self.status.is_not_started()
    }

    /// Builds the terminal protocol for the loaded image if missing.
    pub fn update_protocol_if_needed(&mut self, picker: &Picker) {
        if self.protocol.is_some() {
            return;
        }

        if let Some(ref image) = self.image {
            self.protocol = Some(picker.new_resize_protocol((**image).clone()));
        }
    }

    #[must_use]
    pub const fn protocol_mut(&mut self) -> Option<&mut StatefulProtocol> {
        self.protocol.as_mut()
    }
}

impl std::fmt::Debug for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSlot")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("has_image", &self.image.is_some())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Owns the terminal graphics picker shared by every image-bearing widget.
pub struct ImageManager {
    picker: Picker,
}

impl ImageManager {
    /// Queries the terminal for its best graphics protocol.
    #[must_use]
    pub fn new() -> Self {
        let mut picker = Picker::from_query_stdio().unwrap_or_else(|_| Picker::halfblocks());

        let caps = picker.capabilities();
        let has_sixel = caps
            .iter()
            .any(|c| matches!(c, ratatui_image::picker::Capability::Sixel));
        let has_kitty = caps
            .iter()
            .any(|c| matches!(c, ratatui_image::picker::Capability::Kitty));

        if has_sixel && !has_kitty && picker.protocol_type() == ProtocolType::Halfblocks {
            picker.set_protocol_type(ProtocolType::Sixel);
        }

        Self { picker }
    }

    /// Plain half-block renderer, no terminal query. Used in tests.
    #[must_use]
    pub fn halfblocks() -> Self {
        Self {
            picker: Picker::halfblocks(),
        }
    }

    #[must_use]
    pub fn protocol_type(&self) -> ProtocolType {
        self.picker.protocol_type()
    }

    #[must_use]
    pub const fn picker(&self) -> &Picker {
        &self.picker
    }
}

impl Default for ImageManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_creation() {
        let slot = ImageSlot::new("https://example.com/cover.png");

        assert_eq!(slot.id(), &ImageId::from_url("https://example.com/cover.png"));
        assert!(!slot.is_ready());
        assert!(slot.needs_load());
    }

    #[test]
    fn test_slot_loading_flow() {
        let mut slot = ImageSlot::new("https://example.com/cover.png");

        assert!(slot.needs_load());

        slot.set_downloading();
        assert!(slot.status().is_loading());
        assert!(!slot.needs_load());

        let img = Arc::new(image::DynamicImage::new_rgb8(64, 64));
        slot.set_loaded(img);
        assert!(slot.is_ready());
    }

    #[test]
    fn test_slot_failure_keeps_placeholder() {
        let mut slot = ImageSlot::new("https://example.com/cover.png");

        slot.set_failed("Network error".to_string());
        assert!(slot.status().is_failed());
        assert!(!slot.is_ready());
        assert!(!slot.needs_load());
    }

    #[test]
    fn test_protocol_built_once_ready() {
        let manager = ImageManager::halfblocks();
        let mut slot = ImageSlot::new("https://example.com/cover.png");

        slot.update_protocol_if_needed(manager.picker());
        assert!(slot.protocol_mut().is_none());

        slot.set_loaded(Arc::new(image::DynamicImage::new_rgb8(64, 64)));
        slot.update_protocol_if_needed(manager.picker());
        assert!(slot.protocol_mut().is_some());
    }
}
