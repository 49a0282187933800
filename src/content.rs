//! The closed set of embeddable payload kinds.
//!
//! Wire form: `{"type": "<tag>", "data": <tag-specific payload>}` as compact JSON.
//! The tag alone determines the payload shape, so every encode and decode site
//! is an exhaustive match over [`ContentVariant`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::DecodeError;

const TYPE_KEY: &str = "type";
const DATA_KEY: &str = "data";

// ============================================================================
// ContentTag
// ============================================================================

/// Type discriminator of a [`ContentVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentTag {
    Square,
}

impl ContentTag {
    /// Every tag the crate can produce.
    pub const ALL: &'static [ContentTag] = &[ContentTag::Square];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentTag::Square => "square",
        }
    }

    /// Look up a tag by its wire name. `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<ContentTag> {
        Self::ALL.iter().copied().find(|tag| tag.as_str() == s)
    }
}

impl fmt::Display for ContentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Payload of the `square` attachment: a counter paired with a text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareContent {
    pub count: u64,
    pub text: String,
}

impl SquareContent {
    pub fn new(count: u64, text: impl Into<String>) -> Self {
        Self {
            count,
            text: text.into(),
        }
    }

    /// Decode rule for the `data` member of a `square` envelope.
    pub fn from_data(data: Value) -> Result<ContentVariant, DecodeError> {
        serde_json::from_value::<SquareContent>(data)
            .map(ContentVariant::Square)
            .map_err(|e| {
                DecodeError::malformed(Some(ContentTag::Square.as_str()), e.to_string())
            })
    }
}

// ============================================================================
// ContentVariant
// ============================================================================

/// Logical content of one embedded attachment.
///
/// Values are immutable: the update helpers return a new variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentVariant {
    Square(SquareContent),
}

impl ContentVariant {
    pub fn square(count: u64, text: impl Into<String>) -> Self {
        ContentVariant::Square(SquareContent::new(count, text))
    }

    pub fn tag(&self) -> ContentTag {
        match self {
            ContentVariant::Square(_) => ContentTag::Square,
        }
    }

    /// Serialize to the tagged wire form. Same variant, same bytes.
    pub fn encode(&self) -> Vec<u8> {
        let data = match self {
            ContentVariant::Square(square) => {
                json!({ "count": square.count, "text": square.text })
            }
        };
        // Keys keep insertion order (`preserve_order`), so `type` leads.
        let mut wire = Map::new();
        wire.insert(TYPE_KEY.to_string(), Value::from(self.tag().as_str()));
        wire.insert(DATA_KEY.to_string(), data);
        Value::Object(wire).to_string().into_bytes()
    }

    /// Parse the tagged wire form.
    pub fn decode(bytes: &[u8]) -> Result<ContentVariant, DecodeError> {
        let (tag, data) = split_wire(bytes)?;
        Self::decode_data(tag, data)
    }

    /// Decode a `data` member whose tag is already known.
    pub fn decode_data(tag: ContentTag, data: Value) -> Result<ContentVariant, DecodeError> {
        match tag {
            ContentTag::Square => SquareContent::from_data(data),
        }
    }

    // ------------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------------

    pub fn count(&self) -> u64 {
        match self {
            ContentVariant::Square(s) => s.count,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ContentVariant::Square(s) => &s.text,
        }
    }

    pub fn with_count(&self, count: u64) -> Self {
        match self {
            ContentVariant::Square(s) => ContentVariant::square(count, s.text.clone()),
        }
    }

    pub fn with_text(&self, text: impl Into<String>) -> Self {
        match self {
            ContentVariant::Square(s) => ContentVariant::square(s.count, text),
        }
    }

    pub fn incremented(&self) -> Self {
        self.with_count(self.count().saturating_add(1))
    }
}

/// Split raw wire bytes into their tag and the uninterpreted `data` value.
pub(crate) fn split_wire(bytes: &[u8]) -> Result<(ContentTag, Value), DecodeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::malformed(None, e.to_string()))?;
    let mut obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(DecodeError::malformed(
                None,
                format!("expected a JSON object, got {}", json_kind(&other)),
            ))
        }
    };

    let tag = match obj.remove(TYPE_KEY) {
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(DecodeError::malformed(
                None,
                format!("`type` must be a string, got {}", json_kind(&other)),
            ))
        }
        None => return Err(DecodeError::malformed(None, "missing field `type`")),
    };

    // An unknown tag wins over a missing payload.
    let known = match ContentTag::parse(&tag) {
        Some(known) => known,
        None => return Err(DecodeError::UnknownTypeTag(tag)),
    };

    let data = obj
        .remove(DATA_KEY)
        .ok_or_else(|| DecodeError::malformed(Some(known.as_str()), "missing field `data`"))?;
    Ok((known, data))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
