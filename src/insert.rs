use anyhow::Context as _;

use crate::cli::InsertArgs;
use crate::container::{AnnotationIndex, parse_container};
use crate::loader::{FileOrUrlLoader, load_json, save_json};
use crate::manifest::{Diagnostic, InsertOptions, insert_annotations, read_manifest};
use crate::naming;

pub fn run(args: InsertArgs) -> anyhow::Result<()> {
    let loader = FileOrUrlLoader;

    tracing::info!(manifest = %args.input_manifest, "reading manifest");
    let mut info = read_manifest(&args.input_manifest, &loader).context("read manifest")?;
    tracing::info!(
        version = info.version.number(),
        id = %info.id,
        annotations = info.annotations.len(),
        "manifest read"
    );

    tracing::info!(file = %args.input_file, "reading annotation container");
    let container = load_json(&loader, &args.input_file).context("load annotation container")?;
    let mut index = AnnotationIndex::default();
    parse_container(&container, info.version, &mut index, &loader)
        .context("parse annotation container")?;

    // The new manifest gets its own identity; containers reference it.
    let (manifest_uri, manifest_filename) = naming::manifest_identifier(
        &info.id,
        &args.output_manifest,
        args.url_prefix.as_deref(),
    );
    info.id = manifest_uri;
    info.annotations = index;

    let options = InsertOptions {
        reference_mode: args.reference_mode,
        naming_scheme: args.annolist_name_scheme,
        url_prefix: args.url_prefix.clone(),
    };

    tracing::info!(manifest = %info.id, "creating new manifest");
    let outcome = insert_annotations(&mut info, &options).context("insert annotations")?;

    for diagnostic in &outcome.diagnostics {
        match diagnostic {
            Diagnostic::InlineContainerInV2 { canvas_id } => tracing::warn!(
                canvas = %canvas_id,
                "inline AnnotationLists are not allowed in the IIIF V2 presentation API"
            ),
        }
    }

    for file in &outcome.files {
        save_json(&file.document, &file.filename, args.output_directory.as_deref())
            .with_context(|| format!("save annotation container {}", file.filename))?;
    }

    save_json(
        &info.document,
        &manifest_filename,
        args.output_directory.as_deref(),
    )
    .context("save manifest")?;

    Ok(())
}
