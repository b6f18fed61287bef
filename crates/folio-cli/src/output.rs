//! Writing the rendered site to disk

use anyhow::{Context, Result};
use folio_core::html::assets;
use folio_core::unit::INDEX_PAGE;
use folio_core::{Project, Renderer};
use rayon::prelude::*;
use std::path::Path;

/// Render every page and write it, with the assets, under `out_dir`.
///
/// Returns the number of pages written.
pub fn write_site<R: Renderer>(project: &Project, renderer: &R, out_dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory '{}'", out_dir.display()))?;

    // The index source is rendered as the front page below.
    let pages = project
        .units()
        .par_iter()
        .filter(|unit| unit.output_path != INDEX_PAGE)
        .map(|unit| {
            let html = renderer
                .render_file(project, unit)
                .with_context(|| format!("Failed to render '{}'", unit.source_path))?;
            write_file(&out_dir.join(&unit.output_path), &html)
        })
        .collect::<Result<Vec<()>>>()?
        .len();

    let index = renderer
        .render_index(project)
        .context("Failed to render the front page")?;
    write_file(&out_dir.join(INDEX_PAGE), &index)?;

    for asset in assets(project)? {
        write_file(&out_dir.join(asset.path), &asset.contents)?;
    }

    tracing::info!(pages = pages + 1, dir = %out_dir.display(), "site written");
    Ok(pages + 1)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write '{}'", path.display()))
}
