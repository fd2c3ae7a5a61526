use std::collections::HashSet;

use serde_json::{Value, json};

use crate::annotation::scalar_tag;
use crate::cli::{NamingScheme, ReferenceMode};
use crate::container::{AnnotationIndex, build_container, parse_container};
use crate::error::Error;
use crate::loader::{ResourceLoader, load_json};
use crate::naming;

pub const V2_CONTEXT: &str = "http://iiif.io/api/presentation/2/context.json";
pub const V3_CONTEXT: &str = "http://iiif.io/api/presentation/3/context.json";

/// IIIF Presentation API schema version, decided once per document. All
/// later traversal dispatches on this tag instead of re-probing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    V2,
    V3,
}

impl SchemaVersion {
    pub fn number(self) -> u8 {
        match self {
            SchemaVersion::V2 => 2,
            SchemaVersion::V3 => 3,
        }
    }

    pub fn context_uri(self) -> &'static str {
        match self {
            SchemaVersion::V2 => V2_CONTEXT,
            SchemaVersion::V3 => V3_CONTEXT,
        }
    }

    /// Detects the manifest version from its JSON-LD context, falling back
    /// to the manifest type fields for context-less documents.
    pub fn detect(doc: &Value) -> Result<Self, Error> {
        match doc.get("@context").and_then(Value::as_str) {
            Some(V2_CONTEXT) => return Ok(SchemaVersion::V2),
            Some(V3_CONTEXT) => return Ok(SchemaVersion::V3),
            _ => {}
        }
        if doc.get("type").and_then(Value::as_str) == Some("Manifest") {
            return Ok(SchemaVersion::V3);
        }
        if doc.get("@type").and_then(Value::as_str) == Some("sc:Manifest") {
            return Ok(SchemaVersion::V2);
        }
        Err(Error::UnsupportedSchema)
    }
}

/// Parse/build context for one manifest. Created at the start of a read or
/// insert pass and discarded once the caller has what it needs.
#[derive(Debug)]
pub struct ManifestInfo {
    pub version: SchemaVersion,
    pub id: String,
    pub label: String,
    pub canvas_ids: HashSet<String>,
    pub annotations: AnnotationIndex,
    pub document: Value,
}

/// Walks a V2 or V3 manifest, validating its canvas structure and collecting
/// every canvas's annotation containers into a fresh index. External
/// containers are fetched through `loader` as they are encountered.
pub fn parse_manifest(document: Value, loader: &dyn ResourceLoader) -> Result<ManifestInfo, Error> {
    let version = SchemaVersion::detect(&document)?;

    let (id, label, canvas_ids, annotations) = match version {
        SchemaVersion::V2 => read_v2(&document, loader)?,
        SchemaVersion::V3 => read_v3(&document, loader)?,
    };

    Ok(ManifestInfo {
        version,
        id,
        label,
        canvas_ids,
        annotations,
        document,
    })
}

/// Loads the document at `locator` and parses it as a manifest.
pub fn read_manifest(locator: &str, loader: &dyn ResourceLoader) -> Result<ManifestInfo, Error> {
    let document = load_json(loader, locator)?;
    parse_manifest(document, loader)
}

type ReadResult = (String, String, HashSet<String>, AnnotationIndex);

fn read_v2(doc: &Value, loader: &dyn ResourceLoader) -> Result<ReadResult, Error> {
    let id = required_id(doc, "@id", "manifest")?;
    check_type(doc, "@type", "sc:Manifest", "manifest", &id)?;
    let label = required_label(doc, "manifest", &id)?;

    let sequences = doc
        .get("sequences")
        .and_then(Value::as_array)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MissingItems {
            object: "manifest",
            id: id.clone(),
            field: "sequences",
        })?;

    let mut canvas_ids = HashSet::new();
    let mut index = AnnotationIndex::default();

    for sequence in sequences {
        check_type(sequence, "@type", "sc:Sequence", "sequence", &id)?;
        let canvases = sequence
            .get("canvases")
            .and_then(Value::as_array)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::MissingItems {
                object: "sequence",
                id: id.clone(),
                field: "canvases",
            })?;

        for canvas in canvases {
            let canvas_id = validate_canvas_v2(canvas)?;
            canvas_ids.insert(canvas_id);

            if let Some(containers) = canvas.get("otherContent").and_then(Value::as_array) {
                for container in containers {
                    parse_container(container, SchemaVersion::V2, &mut index, loader)?;
                }
            }
        }
    }

    Ok((id, label, canvas_ids, index))
}

fn read_v3(doc: &Value, loader: &dyn ResourceLoader) -> Result<ReadResult, Error> {
    let id = required_id(doc, "id", "manifest")?;
    check_type(doc, "type", "Manifest", "manifest", &id)?;
    let label = required_label(doc, "manifest", &id)?;

    let canvases = doc
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::MissingItems {
            object: "manifest",
            id: id.clone(),
            field: "items",
        })?;

    let mut canvas_ids = HashSet::new();
    let mut index = AnnotationIndex::default();

    for canvas in canvases {
        let canvas_id = validate_canvas_v3(canvas)?;
        canvas_ids.insert(canvas_id);

        if let Some(containers) = canvas.get("annotations").and_then(Value::as_array) {
            for container in containers {
                parse_container(container, SchemaVersion::V3, &mut index, loader)?;
            }
        }
    }

    Ok((id, label, canvas_ids, index))
}

fn validate_canvas_v2(canvas: &Value) -> Result<String, Error> {
    let canvas_id = required_id(canvas, "@id", "canvas")?;
    check_type(canvas, "@type", "sc:Canvas", "canvas", &canvas_id)?;
    required_label(canvas, "canvas", &canvas_id)?;

    if canvas.get("images").and_then(Value::as_array).is_none() {
        return Err(Error::MissingItems {
            object: "canvas",
            id: canvas_id,
            field: "images",
        });
    }

    Ok(canvas_id)
}

fn validate_canvas_v3(canvas: &Value) -> Result<String, Error> {
    let canvas_id = required_id(canvas, "id", "canvas")?;
    check_type(canvas, "type", "Canvas", "canvas", &canvas_id)?;
    required_label(canvas, "canvas", &canvas_id)?;

    if canvas.get("items").and_then(Value::as_array).is_none() {
        return Err(Error::MissingItems {
            object: "canvas",
            id: canvas_id,
            field: "items",
        });
    }

    Ok(canvas_id)
}

fn required_id(doc: &Value, field: &'static str, object: &'static str) -> Result<String, Error> {
    doc.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or(Error::MissingId { object })
}

fn check_type(
    doc: &Value,
    field: &'static str,
    expected: &'static str,
    object: &'static str,
    id: &str,
) -> Result<(), Error> {
    if doc.get(field).and_then(Value::as_str) == Some(expected) {
        Ok(())
    } else {
        Err(Error::WrongType {
            object,
            id: id.to_owned(),
            expected,
        })
    }
}

/// A label may be a plain string (V2) or a language map (V3); it only has to
/// be present and non-empty. Flattened to text for reporting.
fn required_label(doc: &Value, object: &'static str, id: &str) -> Result<String, Error> {
    let label = doc
        .get("label")
        .filter(|v| is_non_empty(v))
        .ok_or_else(|| Error::MissingField {
            object,
            id: id.to_owned(),
            field: "label",
        })?;
    Ok(scalar_tag(label))
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// How generated containers are attached to canvases.
#[derive(Debug, Clone)]
pub struct InsertOptions {
    pub reference_mode: ReferenceMode,
    pub naming_scheme: NamingScheme,
    pub url_prefix: Option<String>,
}

/// A container document to be persisted by the caller under `filename`.
#[derive(Debug)]
pub struct ContainerFile {
    pub filename: String,
    pub document: Value,
}

/// Policy deviations observed during insert. The traversal performs the
/// requested operation anyway; the caller decides how to report these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Inline annotation lists are not allowed by the IIIF V2 presentation API.
    InlineContainerInV2 { canvas_id: String },
}

#[derive(Debug, Default)]
pub struct InsertOutcome {
    pub files: Vec<ContainerFile>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Re-walks `info.document` in place, attaching a newly built annotation
/// container to every canvas that has matching records in `info.annotations`.
/// Canvases without a match are left untouched. The manifest's own id field
/// is re-stamped from `info.id`.
///
/// Referenced containers are returned in the outcome for the caller to
/// persist; inline containers are embedded directly.
pub fn insert_annotations(
    info: &mut ManifestInfo,
    options: &InsertOptions,
) -> Result<InsertOutcome, Error> {
    let version = info.version;
    let ManifestInfo {
        id,
        annotations,
        document,
        ..
    } = info;

    match version {
        SchemaVersion::V2 => insert_v2(document, id, annotations, options),
        SchemaVersion::V3 => insert_v3(document, id, annotations, options),
    }
}

fn insert_v2(
    document: &mut Value,
    manifest_id: &str,
    annotations: &AnnotationIndex,
    options: &InsertOptions,
) -> Result<InsertOutcome, Error> {
    let mut outcome = InsertOutcome::default();
    let mut container_idx = 0usize;

    let sequences = document
        .get_mut("sequences")
        .and_then(Value::as_array_mut)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MissingItems {
            object: "manifest",
            id: manifest_id.to_owned(),
            field: "sequences",
        })?;

    for sequence in sequences.iter_mut() {
        check_type(sequence, "@type", "sc:Sequence", "sequence", manifest_id)?;
        let canvases = sequence
            .get_mut("canvases")
            .and_then(Value::as_array_mut)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::MissingItems {
                object: "sequence",
                id: manifest_id.to_owned(),
                field: "canvases",
            })?;

        for canvas in canvases.iter_mut() {
            let canvas_id = validate_canvas_v2(canvas)?;
            let Some(records) = annotations.records_for_target(&canvas_id) else {
                continue;
            };

            container_idx += 1;
            let (uri, filename) = naming::container_identifier(
                manifest_id,
                &canvas_id,
                container_idx,
                options.naming_scheme,
                options.url_prefix.as_deref(),
            );

            match options.reference_mode {
                ReferenceMode::Inline => {
                    outcome.diagnostics.push(Diagnostic::InlineContainerInV2 {
                        canvas_id: canvas_id.clone(),
                    });
                    let container =
                        build_container(SchemaVersion::V2, manifest_id, &uri, &records, false);
                    canvas["otherContent"] = json!([container]);
                }
                ReferenceMode::Reference => {
                    let container =
                        build_container(SchemaVersion::V2, manifest_id, &uri, &records, true);
                    outcome.files.push(ContainerFile {
                        filename,
                        document: container,
                    });
                    canvas["otherContent"] = json!([{
                        "@id": uri,
                        "@type": "sc:AnnotationList",
                    }]);
                }
            }
        }
    }

    document["@id"] = Value::String(manifest_id.to_owned());
    Ok(outcome)
}

fn insert_v3(
    document: &mut Value,
    manifest_id: &str,
    annotations: &AnnotationIndex,
    options: &InsertOptions,
) -> Result<InsertOutcome, Error> {
    let mut outcome = InsertOutcome::default();
    let mut container_idx = 0usize;

    let canvases = document
        .get_mut("items")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| Error::MissingItems {
            object: "manifest",
            id: manifest_id.to_owned(),
            field: "items",
        })?;

    for canvas in canvases.iter_mut() {
        let canvas_id = validate_canvas_v3(canvas)?;
        let Some(records) = annotations.records_for_target(&canvas_id) else {
            continue;
        };

        container_idx += 1;
        let (uri, filename) = naming::container_identifier(
            manifest_id,
            &canvas_id,
            container_idx,
            options.naming_scheme,
            options.url_prefix.as_deref(),
        );

        match options.reference_mode {
            ReferenceMode::Inline => {
                let container =
                    build_container(SchemaVersion::V3, manifest_id, &uri, &records, false);
                canvas["annotations"] = json!([container]);
            }
            ReferenceMode::Reference => {
                let container =
                    build_container(SchemaVersion::V3, manifest_id, &uri, &records, true);
                outcome.files.push(ContainerFile {
                    filename,
                    document: container,
                });
                canvas["annotations"] = json!([{
                    "id": uri,
                    "type": "AnnotationPage",
                }]);
            }
        }
    }

    document["id"] = Value::String(manifest_id.to_owned());
    Ok(outcome)
}
