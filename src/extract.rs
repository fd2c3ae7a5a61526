use anyhow::Context as _;
use serde_json::Value;

use crate::cli::{ExtractArgs, NamingScheme};
use crate::container::build_container;
use crate::loader::{FileOrUrlLoader, save_json};
use crate::manifest::{ManifestInfo, read_manifest};
use crate::naming;

pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let loader = FileOrUrlLoader;

    tracing::info!(manifest = %args.input_manifest, "reading manifest");
    let info = read_manifest(&args.input_manifest, &loader).context("read manifest")?;
    tracing::info!(
        version = info.version.number(),
        id = %info.id,
        annotations = info.annotations.len(),
        "manifest read"
    );

    let container = extract_container(&info, args.url_prefix.as_deref());
    tracing::info!(file = %args.output_file, "writing annotation container");
    save_json(&container, &args.output_file, args.output_directory.as_deref())
        .context("save annotation container")?;

    Ok(())
}

/// Builds one standalone container holding every annotation of the manifest,
/// with the version's canonical context attached.
pub fn extract_container(info: &ManifestInfo, url_prefix: Option<&str>) -> Value {
    let (container_id, _) =
        naming::container_identifier(&info.id, "", 1, NamingScheme::Sequence, url_prefix);
    let records: Vec<_> = info.annotations.records().iter().collect();
    build_container(info.version, &info.id, &container_id, &records, true)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::loader::ResourceLoader;
    use crate::manifest::{V3_CONTEXT, parse_manifest};

    struct NoLoader;

    impl ResourceLoader for NoLoader {
        fn open(&self, locator: &str) -> Result<String, Error> {
            Err(Error::Resource {
                locator: locator.to_owned(),
                reason: "no loader in this test".to_owned(),
            })
        }
    }

    #[test]
    fn extracted_container_collects_all_annotations() -> anyhow::Result<()> {
        let manifest = json!({
            "@context": V3_CONTEXT,
            "id": "http://ex/manifest",
            "type": "Manifest",
            "label": {"en": ["Test object"]},
            "items": [{
                "id": "http://ex/canvas/p1",
                "type": "Canvas",
                "label": {"en": ["page 1"]},
                "items": [],
                "annotations": [{
                    "id": "http://ex/page/1",
                    "type": "AnnotationPage",
                    "items": [
                        {"id": "http://ex/a1", "type": "Annotation", "target": "http://ex/canvas/p1"},
                        {"id": "http://ex/a2", "type": "Annotation", "target": "http://ex/canvas/p1#xywh=1,1,2,2"},
                    ],
                }],
            }],
        });

        let info = parse_manifest(manifest, &NoLoader)?;
        let container = extract_container(&info, Some("http://pub.ex"));

        assert_eq!(container["id"], json!("http://pub.ex/annolist-1.json"));
        assert_eq!(container["partOf"], json!("http://ex/manifest"));
        assert_eq!(container["@context"], json!(V3_CONTEXT));
        assert_eq!(container["items"].as_array().map(Vec::len), Some(2));
        assert_eq!(container["items"][0]["id"], json!("http://ex/a1"));

        Ok(())
    }
}
