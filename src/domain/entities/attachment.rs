//! Chat attachment entities.

use uuid::Uuid;

/// Unique identifier for an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of media an attachment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentKind {
    /// Still image.
    #[default]
    Image,
    /// Video clip.
    Video,
    /// Anything else, shown by filename only.
    File,
}

impl AttachmentKind {
    /// Guesses the kind from a content type such as `image/png`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Image
        } else if content_type.starts_with("video/") {
            Self::Video
        } else {
            Self::File
        }
    }
}

/// A media item that can be shown full-screen over the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    id: AttachmentId,
    url: String,
    thumbnail_url: Option<String>,
    kind: AttachmentKind,
    filename: String,
}

impl Attachment {
    /// Creates an attachment with a fresh identifier.
    #[must_use]
    pub fn new(url: impl Into<String>, filename: impl Into<String>, kind: AttachmentKind) -> Self {
        Self {
            id: AttachmentId::new(),
            url: url.into(),
            thumbnail_url: None,
            kind,
            filename: filename.into(),
        }
    }

    /// Sets a reduced-size preview URL.
    #[must_use]
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    #[must_use]
    pub const fn id(&self) -> AttachmentId {
        self.id
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Preview URL, falling back to the full URL.
    #[must_use]
    pub fn thumbnail_url(&self) -> &str {
        self.thumbnail_url.as_deref().unwrap_or(&self.url)
    }

    #[must_use]
    pub const fn kind(&self) -> AttachmentKind {
        self.kind
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns true if the attachment renders as a picture.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self.kind, AttachmentKind::Image)
    }
}
