//! Pasteboard seam: the host owns the real clipboard, this crate only
//! produces and consumes file wrappers under a custom content type.

use std::ops::Range;

use crate::binding::{BindingId, BindingTable, DocumentPosition};
use crate::error::Result;
use crate::wrapper::FileWrapper;

/// Clipboard access provided by the host.
pub trait Pasteboard {
    /// Content-type identifier the wrappers are published under.
    fn content_type(&self) -> &str;

    /// Replace the pasteboard contents. `false` when the host could not write.
    fn write(&mut self, wrappers: &[FileWrapper]) -> bool;

    fn read(&self) -> Vec<FileWrapper>;
}

/// In-process pasteboard, used in tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryPasteboard {
    content_type: String,
    items: Vec<FileWrapper>,
}

impl MemoryPasteboard {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            items: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Pasteboard for MemoryPasteboard {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn write(&mut self, wrappers: &[FileWrapper]) -> bool {
        self.items = wrappers.to_vec();
        true
    }

    fn read(&self) -> Vec<FileWrapper> {
        self.items.clone()
    }
}

/// Copy every attachment in `range` to the pasteboard.
///
/// Returns `false` when the range holds no attachments, the pasteboard uses a
/// different content type, or the host refused the write.
pub fn write_selection(
    table: &BindingTable,
    range: Range<DocumentPosition>,
    pasteboard: &mut dyn Pasteboard,
) -> bool {
    if pasteboard.content_type() != table.codec().config().content_type {
        tracing::warn!(
            expected = %table.codec().config().content_type,
            got = %pasteboard.content_type(),
            "pasteboard content type mismatch"
        );
        return false;
    }
    let wrappers: Vec<FileWrapper> = table
        .copy_range(range)
        .into_iter()
        .map(|envelope| envelope.into_wrapper())
        .collect();
    if wrappers.is_empty() {
        return false;
    }
    let written = pasteboard.write(&wrappers);
    tracing::debug!(count = wrappers.len(), written, "wrote attachments to pasteboard");
    written
}

/// Paste every attachment on the pasteboard, starting at `position`.
///
/// All wrappers are decoded before anything is inserted, so a single bad item
/// refuses the whole paste. Wrappers without the attachment extension are
/// skipped.
pub fn read_selection(
    table: &mut BindingTable,
    pasteboard: &dyn Pasteboard,
    position: DocumentPosition,
) -> Result<Vec<BindingId>> {
    let mut envelopes = Vec::new();
    for wrapper in pasteboard.read() {
        if !table.codec().is_attachment_name(&wrapper.preferred_filename) {
            tracing::debug!(name = %wrapper.preferred_filename, "skipping non-attachment item");
            continue;
        }
        let envelope = table.codec().envelope_from_wrapper(&wrapper)?;
        table.registry().decode(&envelope)?;
        envelopes.push(envelope);
    }

    let mut ids = Vec::with_capacity(envelopes.len());
    for (offset, envelope) in envelopes.iter().enumerate() {
        ids.push(table.paste(envelope, position + offset)?);
    }
    Ok(ids)
}
