use crate::cli::NamingScheme;

/// Derives the URI and filename for a generated annotation container.
///
/// `index` is a 1-based counter incremented once per canvas that receives a
/// container, in traversal order; the `canvas` scheme names the file after
/// the canvas id's last path segment instead.
pub fn container_identifier(
    manifest_id: &str,
    canvas_id: &str,
    index: usize,
    scheme: NamingScheme,
    url_prefix: Option<&str>,
) -> (String, String) {
    let prefix = url_prefix.unwrap_or(manifest_id);

    let filename = match scheme {
        NamingScheme::Canvas => {
            let canvas_part = canvas_id.rsplit('/').next().unwrap_or(canvas_id);
            format!("{canvas_part}-annolist.json")
        }
        NamingScheme::Sequence => format!("annolist-{index}.json"),
    };

    let uri = format!("{prefix}/{filename}");
    (uri, filename)
}

/// Derives the URI and filename for a rewritten manifest.
pub fn manifest_identifier(
    manifest_id: &str,
    output_manifest: &str,
    url_prefix: Option<&str>,
) -> (String, String) {
    let prefix = url_prefix.unwrap_or(manifest_id);
    let uri = format!("{prefix}/{output_manifest}");
    (uri, output_manifest.to_owned())
}
