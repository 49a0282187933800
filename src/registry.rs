//! Tag-keyed dispatch to decode rules and live view factories.
//!
//! Populated once at startup from the closed set of content kinds. Adding a
//! kind means adding one `register` call pairing its tag with both paths.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::channel::{change_channel, ChangeReceiver, ChangeSender};
use crate::content::{split_wire, ContentTag, ContentVariant, SquareContent};
use crate::envelope::Envelope;
use crate::error::DecodeError;
use crate::view::{CounterView, LiveView};

/// Turns the `data` member of an envelope into content.
pub type DecodeRule = fn(Value) -> Result<ContentVariant, DecodeError>;

/// Builds the live view for a piece of content, wired to its change sender.
pub type ViewFactory =
    Box<dyn Fn(ContentVariant, ChangeSender) -> Box<dyn LiveView> + Send + Sync>;

struct RegistryEntry {
    decode: DecodeRule,
    factory: ViewFactory,
}

pub struct AttachmentRegistry {
    entries: BTreeMap<ContentTag, RegistryEntry>,
}

impl fmt::Debug for AttachmentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

impl Default for AttachmentRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AttachmentRegistry {
    /// An empty registry. Most callers want [`AttachmentRegistry::with_defaults`].
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry covering every built-in content kind.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            ContentTag::Square,
            SquareContent::from_data,
            Box::new(
                |content: ContentVariant, changes: ChangeSender| -> Box<dyn LiveView> {
                    Box::new(CounterView::new(content, changes))
                },
            ),
        );
        registry
    }

    /// Register both paths for `tag`, replacing any previous entry.
    pub fn register(&mut self, tag: ContentTag, decode: DecodeRule, factory: ViewFactory) {
        if self
            .entries
            .insert(tag, RegistryEntry { decode, factory })
            .is_some()
        {
            tracing::debug!(%tag, "replaced attachment registry entry");
        }
    }

    pub fn contains(&self, tag: ContentTag) -> bool {
        self.entries.contains_key(&tag)
    }

    pub fn tags(&self) -> Vec<ContentTag> {
        self.entries.keys().copied().collect()
    }

    /// Build the live view for `content` and the receiver its edits arrive on.
    ///
    /// # Panics
    /// If the content's tag was never registered. The set of producible tags is
    /// fixed at startup, so a miss is a wiring defect rather than bad input.
    pub fn create_view(&self, content: &ContentVariant) -> (Box<dyn LiveView>, ChangeReceiver) {
        let tag = content.tag();
        let entry = match self.entries.get(&tag) {
            Some(entry) => entry,
            None => panic!("no view factory registered for attachment tag \"{tag}\""),
        };
        let (tx, rx) = change_channel();
        let view = (entry.factory)(content.clone(), tx);
        tracing::debug!(%tag, "created live attachment view");
        (view, rx)
    }

    /// Decode an envelope through the registered rule for its tag.
    pub fn decode(&self, envelope: &Envelope) -> Result<ContentVariant, DecodeError> {
        let unknown = || DecodeError::UnknownTypeTag(envelope.type_tag.clone());
        let tag = ContentTag::parse(&envelope.type_tag).ok_or_else(unknown)?;
        let entry = self.entries.get(&tag).ok_or_else(unknown)?;

        let (payload_tag, data) = split_wire(&envelope.payload)?;
        if payload_tag != tag {
            return Err(DecodeError::malformed(
                Some(tag.as_str()),
                format!("payload is tagged \"{payload_tag}\""),
            ));
        }
        (entry.decode)(data)
    }
}
