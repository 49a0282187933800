//! Document-owned table of live attachment bindings.
//!
//! Each binding pairs one content value with its live view, the receiver that
//! view reports on, and the envelope cached for copy/persist. Positions are
//! plain character offsets handed in by the host; the table never holds a
//! reference to the host document. Every attachment occupies one character.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use crate::channel::ChangeReceiver;
use crate::content::ContentVariant;
use crate::envelope::{Envelope, EnvelopeCodec};
use crate::error::Result;
use crate::registry::AttachmentRegistry;
use crate::view::{LiveView, ViewAction};
use crate::wrapper::FileWrapper;

/// Character offset of an attachment in the host document.
pub type DocumentPosition = usize;

/// Handle to a binding. Never reused within one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding-{}", self.0)
    }
}

// ============================================================================
// AttachmentBinding
// ============================================================================

#[derive(Debug)]
pub struct AttachmentBinding {
    id: BindingId,
    content: ContentVariant,
    view: Box<dyn LiveView>,
    changes: ChangeReceiver,
    envelope: Envelope,
    position: DocumentPosition,
}

impl AttachmentBinding {
    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn content(&self) -> &ContentVariant {
        &self.content
    }

    pub fn view(&self) -> &dyn LiveView {
        self.view.as_ref()
    }

    /// Serialized form of the current content.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn position(&self) -> DocumentPosition {
        self.position
    }
}

/// A binding whose content changed, for the host to splice back in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUpdate {
    pub id: BindingId,
    pub position: DocumentPosition,
    pub content: ContentVariant,
    pub envelope: Envelope,
}

// ============================================================================
// BindingTable
// ============================================================================

#[derive(Debug)]
pub struct BindingTable {
    registry: AttachmentRegistry,
    codec: EnvelopeCodec,
    bindings: BTreeMap<BindingId, AttachmentBinding>,
    next_id: u64,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new(AttachmentRegistry::with_defaults(), EnvelopeCodec::default())
    }
}

impl BindingTable {
    pub fn new(registry: AttachmentRegistry, codec: EnvelopeCodec) -> Self {
        Self {
            registry,
            codec,
            bindings: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn codec(&self) -> &EnvelopeCodec {
        &self.codec
    }

    pub fn registry(&self) -> &AttachmentRegistry {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, id: BindingId) -> Option<&AttachmentBinding> {
        self.bindings.get(&id)
    }

    pub fn content(&self, id: BindingId) -> Option<&ContentVariant> {
        self.get(id).map(AttachmentBinding::content)
    }

    pub fn envelope(&self, id: BindingId) -> Option<&Envelope> {
        self.get(id).map(AttachmentBinding::envelope)
    }

    pub fn position(&self, id: BindingId) -> Option<DocumentPosition> {
        self.get(id).map(AttachmentBinding::position)
    }

    /// Binding ids in document order.
    pub fn ids(&self) -> Vec<BindingId> {
        let mut ids: Vec<(DocumentPosition, BindingId)> =
            self.bindings.values().map(|b| (b.position, b.id)).collect();
        ids.sort_unstable();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    fn ids_in(&self, range: &Range<DocumentPosition>) -> Vec<BindingId> {
        self.ids()
            .into_iter()
            .filter(|id| range.contains(&self.bindings[id].position))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------------

    /// Bind `content` at `position`. Later attachments move one character right.
    ///
    /// # Panics
    /// If the registry has no view factory for the content's tag.
    pub fn insert(&mut self, content: ContentVariant, position: DocumentPosition) -> BindingId {
        self.shift_from(position, 1, 0);

        let (view, changes) = self.registry.create_view(&content);
        let envelope = self.codec.to_envelope(&content);
        let id = BindingId(self.next_id);
        self.next_id += 1;

        tracing::debug!(%id, position, tag = %content.tag(), "bound attachment");
        self.bindings.insert(
            id,
            AttachmentBinding {
                id,
                content,
                view,
                changes,
                envelope,
                position,
            },
        );
        id
    }

    /// Decode a pasted envelope and bind it. Nothing is inserted on failure.
    pub fn paste(&mut self, envelope: &Envelope, position: DocumentPosition) -> Result<BindingId> {
        match self.registry.decode(envelope) {
            Ok(content) => Ok(self.insert(content, position)),
            Err(e) => {
                tracing::warn!(
                    name = %envelope.suggested_name,
                    error = %e,
                    "refusing to insert attachment"
                );
                Err(e.into())
            }
        }
    }

    /// Reconstitute an attachment found in document storage.
    ///
    /// Wrappers not named with the attachment extension are left to the host
    /// and yield `Ok(None)`.
    pub fn rehydrate(
        &mut self,
        wrapper: &FileWrapper,
        position: DocumentPosition,
    ) -> Result<Option<BindingId>> {
        if !self.codec.is_attachment_name(&wrapper.preferred_filename) {
            return Ok(None);
        }
        let envelope = match self.codec.envelope_from_wrapper(wrapper) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    name = %wrapper.preferred_filename,
                    error = %e,
                    "refusing to rehydrate attachment"
                );
                return Err(e.into());
            }
        };
        self.paste(&envelope, position).map(Some)
    }

    // ------------------------------------------------------------------------
    // Interaction and change propagation
    // ------------------------------------------------------------------------

    /// Forward an action to a binding's view. `false` when the id is unknown or
    /// the view reported no content change.
    ///
    /// `SetContent` is never announced by the view, so the binding takes the
    /// new value and re-encodes here before the view sees it. Emissions still
    /// queued from before the replacement are discarded.
    pub fn apply(&mut self, id: BindingId, action: ViewAction) -> bool {
        let Some(binding) = self.bindings.get_mut(&id) else {
            return false;
        };
        if let ViewAction::SetContent(content) = &action {
            binding.changes.drain();
            if *content != binding.content {
                binding.content = content.clone();
                binding.envelope = self.codec.to_envelope(&binding.content);
                tracing::debug!(%id, "attachment content replaced by host");
            }
        }
        binding.view.apply(action)
    }

    /// Replace a binding's content from the host side. `false` when the id is
    /// unknown.
    pub fn set_content(&mut self, id: BindingId, content: ContentVariant) -> bool {
        if !self.bindings.contains_key(&id) {
            return false;
        }
        self.apply(id, ViewAction::SetContent(content));
        true
    }

    /// Drain every binding's receiver. Each value fully replaces the stored
    /// content; the envelope is re-encoded once per changed binding.
    pub fn process_changes(&mut self) -> Vec<ContentUpdate> {
        let mut updates = Vec::new();
        for id in self.ids() {
            let Some(binding) = self.bindings.get_mut(&id) else {
                continue;
            };
            let emitted = binding.changes.drain();
            let Some(latest) = emitted.into_iter().last() else {
                continue;
            };
            binding.content = latest;
            binding.envelope = self.codec.to_envelope(&binding.content);
            tracing::debug!(%id, position = binding.position, "attachment content changed");
            updates.push(ContentUpdate {
                id,
                position: binding.position,
                content: binding.content.clone(),
                envelope: binding.envelope.clone(),
            });
        }
        updates
    }

    // ------------------------------------------------------------------------
    // Removal and edits
    // ------------------------------------------------------------------------

    /// Remove one binding. Later attachments move one character left.
    pub fn remove(&mut self, id: BindingId) -> Option<ContentVariant> {
        let binding = self.bindings.remove(&id)?;
        self.shift_from(binding.position + 1, 0, 1);
        tracing::debug!(%id, "removed attachment");
        Some(binding.content)
    }

    /// Drop every binding inside `range` without moving the others.
    pub fn remove_range(&mut self, range: Range<DocumentPosition>) -> Vec<BindingId> {
        let removed = self.ids_in(&range);
        for id in &removed {
            self.bindings.remove(id);
            tracing::debug!(%id, "removed attachment in deleted range");
        }
        removed
    }

    /// Track a host text edit: `range` was replaced by `replacement_len`
    /// characters. Bindings inside the range are dropped, later ones shift.
    pub fn apply_edit(
        &mut self,
        range: Range<DocumentPosition>,
        replacement_len: usize,
    ) -> Vec<BindingId> {
        let removed = self.remove_range(range.clone());
        let deleted = range.end.saturating_sub(range.start);
        self.shift_from(range.end.max(range.start), replacement_len, deleted);
        removed
    }

    fn shift_from(&mut self, from: DocumentPosition, add: usize, sub: usize) {
        for binding in self.bindings.values_mut() {
            if binding.position >= from {
                binding.position = (binding.position + add).saturating_sub(sub);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Copy
    // ------------------------------------------------------------------------

    /// Fresh envelopes, in document order, for every binding in `range`.
    pub fn copy_range(&self, range: Range<DocumentPosition>) -> Vec<Envelope> {
        self.ids_in(&range)
            .into_iter()
            .map(|id| self.codec.to_envelope(&self.bindings[&id].content))
            .collect()
    }
}
