use anyhow::Context as _;
use serde::Serialize;

use crate::cli::CheckArgs;
use crate::loader::FileOrUrlLoader;
use crate::manifest::{ManifestInfo, read_manifest};

/// Read-only report on a manifest's annotations, printed as JSON.
#[derive(Debug, Serialize)]
pub struct CheckSummary {
    pub version: u8,
    pub id: String,
    pub label: String,
    pub canvases: usize,
    pub annotations: usize,
    pub target_canvases: usize,
    pub motivations: Vec<String>,
}

impl CheckSummary {
    pub fn from_info(info: &ManifestInfo) -> Self {
        CheckSummary {
            version: info.version.number(),
            id: info.id.clone(),
            label: info.label.clone(),
            canvases: info.canvas_ids.len(),
            annotations: info.annotations.len(),
            target_canvases: info.annotations.target_count(),
            motivations: info.annotations.motivations().iter().cloned().collect(),
        }
    }
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let loader = FileOrUrlLoader;

    tracing::info!(manifest = %args.input_manifest, "reading manifest");
    let info = read_manifest(&args.input_manifest, &loader).context("read manifest")?;

    let summary = CheckSummary::from_info(&info);
    tracing::info!(
        version = summary.version,
        id = %summary.id,
        label = %summary.label,
        canvases = summary.canvases,
        annotations = summary.annotations,
        "manifest summary"
    );
    if summary.annotations > 0 {
        tracing::info!(
            target_canvases = summary.target_canvases,
            motivations = ?summary.motivations,
            "annotation summary"
        );
    }

    let json = serde_json::to_string_pretty(&summary).context("serialize check summary")?;
    println!("{json}");

    Ok(())
}
