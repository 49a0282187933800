//! Integration tests for the embeddable content model: codec laws, registry
//! dispatch, change propagation, and persistence of attachment files.

use std::collections::HashSet;

use inline_attach::{
    AttachConfig, AttachError, BindingTable, ContentVariant, DecodeError, Envelope, EnvelopeCodec,
    FileWrapper, ViewAction,
};
use serde_json::{json, Value};

// ============================================================================
// Helpers
// ============================================================================

fn samples() -> Vec<ContentVariant> {
    vec![
        ContentVariant::square(0, ""),
        ContentVariant::square(5, "Nested Text Field"),
        ContentVariant::square(42, "emoji 🎉 and \"quotes\""),
        ContentVariant::square(u64::MAX, "max"),
    ]
}

fn envelope_with(tag: &str, payload: Value) -> Envelope {
    Envelope {
        type_tag: tag.to_string(),
        payload: serde_json::to_vec(&payload).expect("serialize fixture"),
        suggested_name: "fixture.fluencyattachment".to_string(),
    }
}

// ============================================================================
// Codec laws
// ============================================================================

#[test]
fn decode_of_encode_is_identity() {
    for v in samples() {
        assert_eq!(ContentVariant::decode(&v.encode()).unwrap(), v);
    }
}

#[test]
fn repeated_encodes_differ_only_in_name() {
    let codec = EnvelopeCodec::default();
    for v in samples() {
        let names: HashSet<String> = (0..50)
            .map(|_| codec.to_envelope(&v))
            .inspect(|e| assert_eq!(e.payload, v.encode()))
            .map(|e| e.suggested_name)
            .collect();
        assert_eq!(names.len(), 50, "suggested names must be unique");
    }
}

#[test]
fn unknown_tag_always_reports_unknown_tag() {
    let codec = EnvelopeCodec::default();
    for payload in [
        json!({"type": "not-a-real-tag", "data": {"count": 1, "text": "x"}}),
        json!({"type": "not-a-real-tag"}),
        json!("not even an object"),
    ] {
        let err = codec
            .from_envelope(&envelope_with("not-a-real-tag", payload))
            .unwrap_err();
        assert_eq!(err, DecodeError::UnknownTypeTag("not-a-real-tag".into()));
    }
}

#[test]
fn missing_fields_report_malformed_payload() {
    let codec = EnvelopeCodec::default();
    for data in [
        json!({"count": 1}),
        json!({"text": "x"}),
        json!({}),
        json!({"count": "five"}),
        json!({"count": 1.5, "text": "x"}),
        json!({"count": 1, "text": 7}),
    ] {
        let err = codec
            .from_envelope(&envelope_with("square", json!({"type": "square", "data": data})))
            .unwrap_err();
        assert!(
            matches!(err, DecodeError::MalformedPayload { .. }),
            "expected MalformedPayload for {data}, got {err:?}"
        );
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_encode_then_decode_square() {
    let codec = EnvelopeCodec::default();
    let v = ContentVariant::square(5, "Nested Text Field");
    let decoded = codec.from_envelope(&codec.to_envelope(&v)).unwrap();
    assert_eq!(decoded, v);
    assert_eq!(decoded.count(), 5);
    assert_eq!(decoded.text(), "Nested Text Field");
}

#[test]
fn scenario_triangle_is_unknown() {
    let raw = json!({"type": "triangle", "data": {"sides": 3}});
    let err = ContentVariant::decode(&serde_json::to_vec(&raw).unwrap()).unwrap_err();
    assert_eq!(err, DecodeError::UnknownTypeTag("triangle".into()));
}

#[test]
fn scenario_wrong_count_type_is_malformed() {
    let raw = json!({"type": "square", "data": {"count": "five"}});
    let err = ContentVariant::decode(&serde_json::to_vec(&raw).unwrap()).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedPayload { .. }));
}

// ============================================================================
// Change propagation
// ============================================================================

#[test]
fn consumer_sees_emissions_in_order_and_ends_on_last() {
    let mut table = BindingTable::default();
    let id = table.insert(ContentVariant::square(0, "a"), 0);

    table.apply(id, ViewAction::Increment);
    let first = table.process_changes();
    table.apply(id, ViewAction::EditText("b".into()));
    table.apply(id, ViewAction::CommitText);
    let second = table.process_changes();

    assert_eq!(first[0].content, ContentVariant::square(1, "a"));
    assert_eq!(second[0].content, ContentVariant::square(1, "b"));
    assert_eq!(table.content(id), Some(&ContentVariant::square(1, "b")));

    let cached = table.envelope(id).unwrap();
    assert_eq!(
        table.codec().from_envelope(cached).unwrap(),
        ContentVariant::square(1, "b")
    );
}

#[test]
fn bindings_do_not_share_state() {
    let mut table = BindingTable::default();
    let content = ContentVariant::square(1, "same");
    let a = table.insert(content.clone(), 0);
    let b = table.insert(content.clone(), 1);

    table.apply(a, ViewAction::Increment);
    let updates = table.process_changes();

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].id, a);
    assert_eq!(table.content(b), Some(&content));
}

#[test]
fn rejected_paste_leaves_document_untouched() {
    let mut table = BindingTable::default();
    table.insert(ContentVariant::square(1, ""), 0);
    let bad = envelope_with("square", json!({"type": "square", "data": {"count": "five"}}));

    let err = table.paste(&bad, 1).unwrap_err();
    assert!(matches!(
        err,
        AttachError::Decode(DecodeError::MalformedPayload { .. })
    ));
    assert_eq!(table.len(), 1);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn attachment_files_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = BindingTable::default();
    let id = table.insert(ContentVariant::square(5, "Nested Text Field"), 0);

    let wrapper = table.envelope(id).unwrap().clone().into_wrapper();
    let path = wrapper.write_to_dir(dir.path()).unwrap();
    let loaded = FileWrapper::read_from_path(&path).unwrap();

    let mut reopened = BindingTable::default();
    let restored = reopened.rehydrate(&loaded, 0).unwrap().expect("attachment file");
    assert_eq!(reopened.content(restored), table.content(id));
}

#[test]
fn foreign_files_are_not_rehydrated() {
    let mut table = BindingTable::default();
    let wrapper = FileWrapper::new("image.tiff", vec![0x49, 0x49, 0x2a, 0x00]);
    assert!(table.rehydrate(&wrapper, 0).unwrap().is_none());
    assert!(table.is_empty());
}

#[test]
fn corrupt_attachment_file_is_refused() {
    let mut table = BindingTable::default();
    let wrapper = FileWrapper::new("x.fluencyattachment", b"{truncated".to_vec());
    let err = table.rehydrate(&wrapper, 0).unwrap_err();
    assert!(matches!(
        err,
        AttachError::Decode(DecodeError::MalformedPayload { .. })
    ));
}

#[test]
fn configured_extension_controls_recognition() {
    let config = AttachConfig::from_json_str(r#"{"fileExtension":"widget"}"#).unwrap();
    let codec = EnvelopeCodec::new(config).unwrap();
    let envelope = codec.to_envelope(&ContentVariant::square(1, ""));
    assert!(envelope.suggested_name.ends_with(".widget"));
    assert!(codec.is_attachment_name(&envelope.suggested_name));
    assert!(!codec.is_attachment_name("abc.fluencyattachment"));
}
