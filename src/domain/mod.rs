//! Domain layer with core entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Port definitions.
pub mod ports;

pub use entities::{Attachment, AttachmentId, AttachmentKind, Message, MessageId};
pub use ports::{CacheError, CacheResult, ImageCachePort, ImageLoaderPort};
