//! Embeddable content model for live inline attachments.
//!
//! A [`ContentVariant`] is the typed payload of one attachment. The
//! [`EnvelopeCodec`] turns it into a named, portable [`Envelope`] for the
//! pasteboard or disk and back. The [`AttachmentRegistry`] maps each tag to its
//! decode rule and live view factory, and a view reports edits to its owning
//! binding over a [`change_channel`].

pub mod binding;
pub mod channel;
pub mod config;
pub mod content;
pub mod envelope;
pub mod error;
pub mod pasteboard;
pub mod registry;
pub mod view;
pub mod wrapper;

pub use binding::{AttachmentBinding, BindingId, BindingTable, ContentUpdate, DocumentPosition};
pub use channel::{change_channel, ChangeReceiver, ChangeSender, ChannelClosed};
pub use config::AttachConfig;
pub use content::{ContentTag, ContentVariant, SquareContent};
pub use envelope::{generate_uuid, Envelope, EnvelopeCodec, NameGenerator};
pub use error::{AttachError, DecodeError, Result};
pub use pasteboard::{read_selection, write_selection, MemoryPasteboard, Pasteboard};
pub use registry::{AttachmentRegistry, DecodeRule, ViewFactory};
pub use view::{CounterView, LiveView, ViewAction};
pub use wrapper::FileWrapper;
