use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde_json::Value;
use url::Url;

use crate::error::Error;

/// Supplies document text for a locator (local path or http/https URL).
/// One full read per call; nothing is cached across calls.
pub trait ResourceLoader {
    fn open(&self, locator: &str) -> Result<String, Error>;
}

/// Default loader: http/https locators go over the network, everything else
/// is treated as a filesystem path.
pub struct FileOrUrlLoader;

impl ResourceLoader for FileOrUrlLoader {
    fn open(&self, locator: &str) -> Result<String, Error> {
        if is_url(locator) {
            tracing::info!(url = locator, "loading resource from URL");
            let response = reqwest::blocking::get(locator).map_err(|err| Error::Resource {
                locator: locator.to_owned(),
                reason: err.to_string(),
            })?;
            let response = response.error_for_status().map_err(|err| Error::Resource {
                locator: locator.to_owned(),
                reason: err.to_string(),
            })?;
            response.text().map_err(|err| Error::Resource {
                locator: locator.to_owned(),
                reason: err.to_string(),
            })
        } else {
            tracing::info!(path = locator, "loading resource from file");
            std::fs::read_to_string(locator).map_err(|err| Error::Resource {
                locator: locator.to_owned(),
                reason: err.to_string(),
            })
        }
    }
}

fn is_url(locator: &str) -> bool {
    match Url::parse(locator) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Reads and decodes one JSON document.
pub fn load_json(loader: &dyn ResourceLoader, locator: &str) -> Result<Value, Error> {
    let text = loader.open(locator)?;
    serde_json::from_str(&text).map_err(|err| Error::Resource {
        locator: locator.to_owned(),
        reason: format!("invalid JSON: {err}"),
    })
}

/// Writes a JSON document under `output_directory` (or the working directory).
/// Overwriting an existing file is allowed but flagged.
pub fn save_json(
    document: &Value,
    filename: &str,
    output_directory: Option<&str>,
) -> anyhow::Result<PathBuf> {
    let path = match output_directory {
        Some(dir) => Path::new(dir).join(filename),
        None => PathBuf::from(filename),
    };

    tracing::info!(path = %path.display(), "writing file");
    if path.is_file() {
        tracing::warn!(path = %path.display(), "file will be overwritten");
    }

    let text = serde_json::to_string(document).context("serialize json document")?;
    std::fs::write(&path, text).with_context(|| format!("write json: {}", path.display()))?;

    Ok(path)
}
