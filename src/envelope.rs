//! Envelope codec: tagged payload bytes plus a fresh transport name.
//!
//! Payload identity (what the content is) and transport identity (the file
//! name of one copy) are kept apart, so the same content can be pasted any
//! number of times without name collisions.

use std::fmt;
use std::sync::Arc;

use crate::config::AttachConfig;
use crate::content::{split_wire, ContentTag, ContentVariant};
use crate::error::{self, DecodeError};
use crate::wrapper::FileWrapper;

// ============================================================================
// Envelope
// ============================================================================

/// Serialized, named, transportable form of a [`ContentVariant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub type_tag: String,
    pub payload: Vec<u8>,
    /// `<unique id>.<extension>`, never reused across envelopes.
    pub suggested_name: String,
}

impl Envelope {
    pub fn into_wrapper(self) -> FileWrapper {
        FileWrapper::new(self.suggested_name, self.payload)
    }
}

// ============================================================================
// Name generation
// ============================================================================

/// Produces the unique part of a suggested name.
pub type NameGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Generate a random UUID (v4).
pub fn generate_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// EnvelopeCodec
// ============================================================================

/// Converts content to and from envelopes under one [`AttachConfig`].
#[derive(Clone)]
pub struct EnvelopeCodec {
    config: AttachConfig,
    /// Defaults to `generate_uuid()`.
    generate_name: Option<NameGenerator>,
}

impl fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeCodec")
            .field("config", &self.config)
            .field("custom_names", &self.generate_name.is_some())
            .finish()
    }
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self {
            config: AttachConfig::default(),
            generate_name: None,
        }
    }
}

impl EnvelopeCodec {
    /// Build a codec over `config`, rejecting extensions that would make
    /// suggested names unsafe as file names.
    pub fn new(config: AttachConfig) -> error::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            generate_name: None,
        })
    }

    /// Replace the random id source. The generator must never repeat itself.
    pub fn with_name_generator(mut self, generate: NameGenerator) -> Self {
        self.generate_name = Some(generate);
        self
    }

    pub fn config(&self) -> &AttachConfig {
        &self.config
    }

    fn fresh_name(&self) -> String {
        let id = self
            .generate_name
            .as_ref()
            .map(|f| f())
            .unwrap_or_else(generate_uuid);
        format!("{}{}", id, self.config.dotted_extension())
    }

    /// Encode `variant` under a newly generated name.
    pub fn to_envelope(&self, variant: &ContentVariant) -> Envelope {
        let envelope = Envelope {
            type_tag: variant.tag().as_str().to_string(),
            payload: variant.encode(),
            suggested_name: self.fresh_name(),
        };
        tracing::debug!(
            tag = %envelope.type_tag,
            name = %envelope.suggested_name,
            bytes = envelope.payload.len(),
            "encoded attachment envelope"
        );
        envelope
    }

    /// Decode an envelope. The outer tag is checked before the payload is read.
    pub fn from_envelope(&self, envelope: &Envelope) -> Result<ContentVariant, DecodeError> {
        let expected = ContentTag::parse(&envelope.type_tag)
            .ok_or_else(|| DecodeError::UnknownTypeTag(envelope.type_tag.clone()))?;
        let (tag, data) = split_wire(&envelope.payload)?;
        if tag != expected {
            return Err(DecodeError::malformed(
                Some(expected.as_str()),
                format!("payload is tagged \"{tag}\""),
            ));
        }
        ContentVariant::decode_data(tag, data)
    }

    /// Whether `name` carries this codec's attachment extension.
    pub fn is_attachment_name(&self, name: &str) -> bool {
        let suffix = self.config.dotted_extension();
        name.len() > suffix.len() && name.ends_with(&suffix)
    }

    pub fn to_wrapper(&self, variant: &ContentVariant) -> FileWrapper {
        self.to_envelope(variant).into_wrapper()
    }

    /// Rebuild an envelope from a file-like unit, reading the tag from its payload.
    pub fn envelope_from_wrapper(&self, wrapper: &FileWrapper) -> Result<Envelope, DecodeError> {
        let (tag, _) = split_wire(&wrapper.contents)?;
        Ok(Envelope {
            type_tag: tag.as_str().to_string(),
            payload: wrapper.contents.clone(),
            suggested_name: wrapper.preferred_filename.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttachError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_codec() -> EnvelopeCodec {
        let next = Arc::new(AtomicUsize::new(0));
        EnvelopeCodec::default().with_name_generator(Arc::new(move || {
            format!("id-{}", next.fetch_add(1, Ordering::SeqCst))
        }))
    }

    #[test]
    fn round_trip_scenario() {
        let codec = EnvelopeCodec::default();
        let v = ContentVariant::square(5, "Nested Text Field");
        let envelope = codec.to_envelope(&v);
        assert_eq!(envelope.type_tag, "square");
        assert_eq!(codec.from_envelope(&envelope).unwrap(), v);
    }

    #[test]
    fn two_encodes_share_payload_but_not_name() {
        let codec = EnvelopeCodec::default();
        let v = ContentVariant::square(1, "x");
        let a = codec.to_envelope(&v);
        let b = codec.to_envelope(&v);
        assert_eq!(a.payload, b.payload);
        assert_ne!(a.suggested_name, b.suggested_name);
    }

    #[test]
    fn suggested_name_is_uuid_plus_extension() {
        let envelope = EnvelopeCodec::default().to_envelope(&ContentVariant::square(0, ""));
        let stem = envelope
            .suggested_name
            .strip_suffix(".fluencyattachment")
            .expect("extension");
        assert!(uuid::Uuid::parse_str(stem).is_ok(), "not a uuid: {stem}");
    }

    #[test]
    fn custom_generator_and_extension() {
        let config = AttachConfig {
            file_extension: "widget".into(),
            ..AttachConfig::default()
        };
        let next = Arc::new(AtomicUsize::new(7));
        let generate: NameGenerator =
            Arc::new(move || format!("n{}", next.fetch_add(1, Ordering::SeqCst)));
        let codec = EnvelopeCodec::new(config).unwrap().with_name_generator(generate);
        let v = ContentVariant::square(0, "");
        assert_eq!(codec.to_envelope(&v).suggested_name, "n7.widget");
        assert_eq!(codec.to_envelope(&v).suggested_name, "n8.widget");
    }

    #[test]
    fn new_rejects_unsafe_extension() {
        for ext in ["a/b", "", "tar.gz", "..\\x"] {
            let config = AttachConfig {
                file_extension: ext.into(),
                ..AttachConfig::default()
            };
            assert!(
                matches!(EnvelopeCodec::new(config), Err(AttachError::Config(_))),
                "extension {ext:?} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_outer_tag_is_rejected_before_payload() {
        let codec = counting_codec();
        let envelope = Envelope {
            type_tag: "not-a-real-tag".into(),
            payload: b"garbage".to_vec(),
            suggested_name: "x.fluencyattachment".into(),
        };
        assert_eq!(
            codec.from_envelope(&envelope).unwrap_err(),
            DecodeError::UnknownTypeTag("not-a-real-tag".into())
        );
    }

    #[test]
    fn unknown_inner_tag_is_rejected() {
        let codec = counting_codec();
        let envelope = Envelope {
            type_tag: "square".into(),
            payload: br#"{"type":"triangle","data":{}}"#.to_vec(),
            suggested_name: "x.fluencyattachment".into(),
        };
        assert_eq!(
            codec.from_envelope(&envelope).unwrap_err(),
            DecodeError::UnknownTypeTag("triangle".into())
        );
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let codec = counting_codec();
        let envelope = Envelope {
            type_tag: "square".into(),
            payload: br#"{"type":"square","data":{"count":"five"}}"#.to_vec(),
            suggested_name: "x.fluencyattachment".into(),
        };
        assert!(matches!(
            codec.from_envelope(&envelope).unwrap_err(),
            DecodeError::MalformedPayload { .. }
        ));
    }

    #[test]
    fn recognizes_attachment_names() {
        let codec = EnvelopeCodec::default();
        assert!(codec.is_attachment_name("abc.fluencyattachment"));
        assert!(!codec.is_attachment_name(".fluencyattachment"));
        assert!(!codec.is_attachment_name("abc.fluencytextstorage"));
        assert!(!codec.is_attachment_name("abc.tiff"));
    }

    #[test]
    fn wrapper_round_trip_keeps_name() {
        let codec = counting_codec();
        let v = ContentVariant::square(2, "two");
        let wrapper = codec.to_wrapper(&v);
        assert_eq!(wrapper.preferred_filename, "id-0.fluencyattachment");
        let envelope = codec.envelope_from_wrapper(&wrapper).unwrap();
        assert_eq!(envelope.suggested_name, wrapper.preferred_filename);
        assert_eq!(envelope.type_tag, "square");
        assert_eq!(codec.from_envelope(&envelope).unwrap(), v);
    }
}
