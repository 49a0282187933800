//! Headless live views: the interactive state of an embedded control.
//!
//! A view knows its own content and the sender it reports edits on. It knows
//! nothing about documents, files, or pasteboards.

use std::fmt;

use crate::channel::ChangeSender;
use crate::content::{ContentTag, ContentVariant};

/// User or host input delivered to a live view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    Increment,
    /// Saturates at zero.
    Decrement,
    /// Edit the text field's draft. Not announced until committed.
    EditText(String),
    CommitText,
    /// Host-driven replacement, e.g. after undo. Not announced.
    SetContent(ContentVariant),
}

/// An interactive representation of one attachment.
pub trait LiveView: fmt::Debug {
    fn tag(&self) -> ContentTag;

    /// Last announced logical content.
    fn content(&self) -> &ContentVariant;

    /// Handle an action. Returns `true` when the logical content changed and
    /// the new value was announced.
    fn apply(&mut self, action: ViewAction) -> bool;

    /// Text the control currently displays.
    fn label(&self) -> String;
}

// ============================================================================
// CounterView
// ============================================================================

/// Counter with a text field, the live control for `square` content.
#[derive(Debug)]
pub struct CounterView {
    content: ContentVariant,
    draft: String,
    changes: ChangeSender,
}

impl CounterView {
    pub fn new(content: ContentVariant, changes: ChangeSender) -> Self {
        let draft = content.text().to_string();
        Self {
            content,
            draft,
            changes,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    fn announce(&mut self, next: ContentVariant) -> bool {
        if next == self.content {
            return false;
        }
        self.content = next.clone();
        if let Err(closed) = self.changes.send(next) {
            tracing::debug!(error = %closed, "counter view has no listener");
        }
        true
    }
}

impl LiveView for CounterView {
    fn tag(&self) -> ContentTag {
        self.content.tag()
    }

    fn content(&self) -> &ContentVariant {
        &self.content
    }

    fn apply(&mut self, action: ViewAction) -> bool {
        match action {
            ViewAction::Increment => {
                let next = self.content.incremented();
                self.announce(next)
            }
            ViewAction::Decrement => {
                let next = self.content.with_count(self.content.count().saturating_sub(1));
                self.announce(next)
            }
            ViewAction::EditText(text) => {
                self.draft = text;
                false
            }
            ViewAction::CommitText => {
                let next = self.content.with_text(self.draft.clone());
                self.announce(next)
            }
            ViewAction::SetContent(content) => {
                self.draft = content.text().to_string();
                self.content = content;
                false
            }
        }
    }

    fn label(&self) -> String {
        format!("{} {}", self.content.count(), self.draft)
    }
}
