use std::collections::{BTreeSet, HashMap};

use serde_json::{Value, json};

use crate::annotation::{AnnotationRecord, parse_annotation};
use crate::error::Error;
use crate::loader::{ResourceLoader, load_json};
use crate::manifest::SchemaVersion;

/// Annotations accumulated across one or more containers, in document order.
///
/// The index owns its records; `by_target` buckets hold positions into
/// `records`, so every record lives in exactly one bucket. One index is
/// owned by exactly one parse or insert pass at a time.
#[derive(Debug, Default)]
pub struct AnnotationIndex {
    records: Vec<AnnotationRecord>,
    by_target: HashMap<String, Vec<usize>>,
    motivations: BTreeSet<String>,
}

impl AnnotationIndex {
    pub fn push(&mut self, record: AnnotationRecord) {
        if let Some(motivation) = &record.motivation {
            self.motivations.insert(motivation.clone());
        }
        self.by_target
            .entry(record.target_uri.clone())
            .or_default()
            .push(self.records.len());
        self.records.push(record);
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records targeting `target_uri`, in insertion order. `None` when the
    /// target has no annotations at all.
    pub fn records_for_target(&self, target_uri: &str) -> Option<Vec<&AnnotationRecord>> {
        let bucket = self.by_target.get(target_uri)?;
        Some(bucket.iter().map(|&idx| &self.records[idx]).collect())
    }

    /// Number of distinct target URIs.
    pub fn target_count(&self) -> usize {
        self.by_target.len()
    }

    pub fn motivations(&self) -> &BTreeSet<String> {
        &self.motivations
    }
}

/// Parses a V2 AnnotationList or V3 AnnotationPage into `index`.
///
/// A container without its item list is an external reference: the document
/// at the container's own id is fetched and parsed in its place. Exactly one
/// hop is allowed; a fetched container that is again external fails with
/// `ExternalHopExceeded`.
pub fn parse_container(
    doc: &Value,
    version: SchemaVersion,
    index: &mut AnnotationIndex,
    loader: &dyn ResourceLoader,
) -> Result<(), Error> {
    parse_container_at(doc, version, index, loader, 0)
}

fn parse_container_at(
    doc: &Value,
    version: SchemaVersion,
    index: &mut AnnotationIndex,
    loader: &dyn ResourceLoader,
    depth: u32,
) -> Result<(), Error> {
    let (object, id_field, type_field, expected_type, items_field) = match version {
        SchemaVersion::V2 => ("AnnotationList", "@id", "@type", "sc:AnnotationList", "resources"),
        SchemaVersion::V3 => ("AnnotationPage", "id", "type", "AnnotationPage", "items"),
    };

    let id = doc
        .get(id_field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(Error::MissingId { object })?
        .to_owned();

    if doc.get(type_field).and_then(Value::as_str) != Some(expected_type) {
        return Err(Error::WrongType {
            object,
            id,
            expected: expected_type,
        });
    }

    let Some(items) = doc.get(items_field) else {
        // External container: the id doubles as the locator of the real list.
        if depth >= 1 {
            return Err(Error::ExternalHopExceeded { id });
        }
        let fetched = load_json(loader, &id)?;
        return parse_container_at(&fetched, version, index, loader, depth + 1);
    };

    let items = items.as_array().ok_or(Error::MissingItems {
        object,
        id: id.clone(),
        field: items_field,
    })?;

    for item in items {
        index.push(parse_annotation(item)?);
    }

    Ok(())
}

/// Builds a V2 AnnotationList or V3 AnnotationPage holding `records`.
///
/// Annotations are emitted via their untouched `raw` payloads, never
/// reconstructed from the normalized fields.
pub fn build_container(
    version: SchemaVersion,
    manifest_id: &str,
    container_id: &str,
    records: &[&AnnotationRecord],
    include_context: bool,
) -> Value {
    let items: Vec<Value> = records.iter().map(|r| r.raw.clone()).collect();

    let mut container = match version {
        SchemaVersion::V2 => json!({
            "@type": "sc:AnnotationList",
            "@id": container_id,
            "within": manifest_id,
            "resources": items,
        }),
        SchemaVersion::V3 => json!({
            "type": "AnnotationPage",
            "id": container_id,
            "partOf": manifest_id,
            "items": items,
        }),
    };

    if include_context {
        container["@context"] = Value::String(version.context_uri().to_owned());
    }

    container
}
