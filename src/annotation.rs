use serde_json::Value;

use crate::error::Error;
use crate::manifest::SchemaVersion;

/// Normalized view of one annotation. `raw` keeps the untouched source
/// document so round-trips never reconstruct annotation bodies.
#[derive(Debug, Clone)]
pub struct AnnotationRecord {
    pub version: SchemaVersion,
    pub id: String,
    pub target_uri: String,
    pub motivation: Option<String>,
    pub raw: Value,
}

/// Parses a V2 or V3 annotation, sniffing the version from its type field.
pub fn parse_annotation(doc: &Value) -> Result<AnnotationRecord, Error> {
    if doc.get("type").and_then(Value::as_str) == Some("Annotation") {
        parse_versioned(doc, SchemaVersion::V3)
    } else if doc.get("@type").and_then(Value::as_str) == Some("oa:Annotation") {
        parse_versioned(doc, SchemaVersion::V2)
    } else {
        Err(Error::UnknownAnnotationType)
    }
}

fn parse_versioned(doc: &Value, version: SchemaVersion) -> Result<AnnotationRecord, Error> {
    let (id_field, target_field, target_fallback) = match version {
        SchemaVersion::V2 => ("@id", "on", "full"),
        SchemaVersion::V3 => ("id", "target", "source"),
    };

    let id = non_empty_str(doc.get(id_field))
        .ok_or(Error::MissingId {
            object: "annotation",
        })?
        .to_owned();

    let target = doc.get(target_field).ok_or_else(|| Error::MissingTarget {
        id: id.clone(),
    })?;
    let target_uri = normalize_target(target, &id, target_fallback)?;

    let motivation = doc.get("motivation").map(scalar_tag);

    Ok(AnnotationRecord {
        version,
        id,
        target_uri,
        motivation,
        raw: doc.clone(),
    })
}

/// Reduces a target reference to its bare URI: string targets lose their
/// fragment selector, object targets use `id` or the version-specific
/// fallback field (`full` for V2, `source` for V3).
fn normalize_target(target: &Value, anno_id: &str, fallback: &'static str) -> Result<String, Error> {
    match target {
        Value::String(uri) => {
            let bare = uri.split_once('#').map_or(uri.as_str(), |(prefix, _)| prefix);
            Ok(bare.to_owned())
        }
        Value::Object(fields) => fields
            .get("id")
            .or_else(|| fields.get(fallback))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::TargetWithoutId {
                id: anno_id.to_owned(),
                fallback,
            }),
        _ => Err(Error::InvalidTarget {
            id: anno_id.to_owned(),
        }),
    }
}

/// Flattens a value to a display tag: strings pass through, single-element
/// arrays unwrap, anything else becomes its compact JSON text (deterministic
/// for identical inputs, used only for display and dedup).
pub(crate) fn scalar_tag(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) if items.len() == 1 => scalar_tag(&items[0]),
        other => other.to_string(),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_v2_annotation_with_fragment_target() -> Result<(), Error> {
        let doc = json!({
            "@type": "oa:Annotation",
            "@id": "http://ex/anno/1",
            "on": "http://ex/c1#xywh=0,0,1,1",
            "motivation": "sc:painting"
        });

        let record = parse_annotation(&doc)?;
        assert_eq!(record.version, SchemaVersion::V2);
        assert_eq!(record.id, "http://ex/anno/1");
        assert_eq!(record.target_uri, "http://ex/c1");
        assert_eq!(record.motivation.as_deref(), Some("sc:painting"));
        assert_eq!(record.raw, doc);

        Ok(())
    }

    #[test]
    fn parses_v3_annotation_with_selector_object_target() -> Result<(), Error> {
        let doc = json!({
            "type": "Annotation",
            "id": "http://ex/anno/2",
            "target": {"id": "http://ex/c1", "selector": {"type": "FragmentSelector"}},
        });

        let record = parse_annotation(&doc)?;
        assert_eq!(record.version, SchemaVersion::V3);
        assert_eq!(record.target_uri, "http://ex/c1");
        assert_eq!(record.motivation, None);

        Ok(())
    }

    #[test]
    fn v2_object_target_falls_back_to_full() -> Result<(), Error> {
        let doc = json!({
            "@type": "oa:Annotation",
            "@id": "http://ex/anno/3",
            "on": {"full": "http://ex/c2", "selector": {}},
        });

        assert_eq!(parse_annotation(&doc)?.target_uri, "http://ex/c2");
        Ok(())
    }

    #[test]
    fn v3_object_target_falls_back_to_source() -> Result<(), Error> {
        let doc = json!({
            "type": "Annotation",
            "id": "http://ex/anno/4",
            "target": {"source": "http://ex/c3"},
        });

        assert_eq!(parse_annotation(&doc)?.target_uri, "http://ex/c3");
        Ok(())
    }

    #[test]
    fn unknown_type_is_rejected() {
        let doc = json!({"id": "http://ex/anno/5", "target": "http://ex/c1"});
        assert!(matches!(
            parse_annotation(&doc),
            Err(Error::UnknownAnnotationType)
        ));
    }

    #[test]
    fn missing_id_is_fatal() {
        let doc = json!({"type": "Annotation", "target": "http://ex/c1"});
        assert!(matches!(
            parse_annotation(&doc),
            Err(Error::MissingId { object: "annotation" })
        ));
    }

    #[test]
    fn missing_target_is_fatal() {
        let doc = json!({"type": "Annotation", "id": "http://ex/anno/6"});
        assert!(matches!(parse_annotation(&doc), Err(Error::MissingTarget { id }) if id == "http://ex/anno/6"));
    }

    #[test]
    fn object_target_without_id_or_fallback_is_fatal() {
        let doc = json!({
            "type": "Annotation",
            "id": "http://ex/anno/7",
            "target": {"selector": {}},
        });
        assert!(matches!(
            parse_annotation(&doc),
            Err(Error::TargetWithoutId { fallback: "source", .. })
        ));
    }

    #[test]
    fn numeric_target_is_fatal() {
        let doc = json!({"type": "Annotation", "id": "http://ex/anno/8", "target": 42});
        assert!(matches!(
            parse_annotation(&doc),
            Err(Error::InvalidTarget { .. })
        ));
    }

    #[test]
    fn motivation_unwraps_single_element_lists() -> Result<(), Error> {
        let doc = json!({
            "type": "Annotation",
            "id": "http://ex/anno/9",
            "target": "http://ex/c1",
            "motivation": ["painting"]
        });

        assert_eq!(parse_annotation(&doc)?.motivation.as_deref(), Some("painting"));
        Ok(())
    }

    #[test]
    fn multi_valued_motivation_becomes_a_stable_tag() -> Result<(), Error> {
        let doc = json!({
            "type": "Annotation",
            "id": "http://ex/anno/10",
            "target": "http://ex/c1",
            "motivation": ["a", "b"]
        });

        let first = parse_annotation(&doc)?.motivation;
        let second = parse_annotation(&doc)?.motivation;
        assert_eq!(first.as_deref(), Some(r#"["a","b"]"#));
        assert_eq!(first, second);
        Ok(())
    }
}
