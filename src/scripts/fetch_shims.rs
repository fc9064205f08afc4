//! Shim bundle fetching
//!
//! Downloads the real runtime shim builds to replace the bundled
//! stand-ins. Network access lives here, outside the conversion core.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

use crate::transformer::shims::{FETCHED_SHIMS, SHIM_DIR, SHIM_FETCH_BASE};

/// Fetch every shim build into `<target_dir>/oex_shim/`.
pub async fn run(target_dir: &Path) -> Result<()> {
    let shim_dir = target_dir.join(SHIM_DIR);
    fs::create_dir_all(&shim_dir)
        .with_context(|| format!("failed to create {}", shim_dir.display()))?;

    let progress = ProgressBar::new(FETCHED_SHIMS.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let client = reqwest::Client::new();
    for name in FETCHED_SHIMS {
        progress.set_message(name.to_string());
        let url = format!("{}{}", SHIM_FETCH_BASE, name);
        let body = client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("failed to fetch {}", url))?
            .text()
            .await
            .with_context(|| format!("failed to read body of {}", url))?;

        fs::write(shim_dir.join(name), body)
            .with_context(|| format!("failed to write {}", name))?;
        progress.inc(1);
    }
    progress.finish_with_message("done");

    Ok(())
}
