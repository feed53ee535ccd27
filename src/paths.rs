// src/paths.rs

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use url::Url;

/// Resolve a CLI path argument into a local filesystem path.
///
/// Accepts:
/// - plain paths (`data/owid.csv`, `/tmp/out`, `C:\data\owid.csv`)
/// - `file://` URIs (`file:///tmp/out`)
///
/// Any other scheme (`hdfs://`, `s3://`, ...) is rejected.
pub fn resolve(raw: &str) -> Result<PathBuf> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        // relative paths and bare names are not URLs
        Err(_) => return Ok(PathBuf::from(raw)),
    };

    // "C:\data" parses as scheme "c"
    if url.scheme().len() == 1 {
        return Ok(PathBuf::from(raw));
    }

    match url.scheme() {
        "file" => url
            .to_file_path()
            .map_err(|_| anyhow::anyhow!("invalid file URI"))
            .with_context(|| format!("resolving {}", raw)),
        other => bail!(
            "unsupported filesystem scheme '{}' in {}; only local paths and file:// are supported",
            other,
            raw
        ),
    }
}
