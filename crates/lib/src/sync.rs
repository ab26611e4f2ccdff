//! One end-to-end sync: fetch into a temp dir, flatten primary then plugin skills, write
//! attribution and license.
//!
//! The checkout lives in a `TempDir` owned by this function, so it is removed on every exit path.
//! Target contents written before a failure are left in place.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::attribution::{copy_license, write_attribution, AttributionManifest};
use crate::config::{resolve_docs_dir, resolve_skills_dir, SyncConfig};
use crate::fetch::SourceFetcher;
use crate::skills::{directory_names, find_plugin_skills, find_source_skills, Flattener, SkillRecord};

/// Outcome of a successful sync, for the final report.
#[derive(Debug, Clone)]
pub struct SyncSummary {
    /// Total skills written (primary + plugin); equals the manifest's `synced_skills`.
    pub synced: usize,
    pub primary: usize,
    pub plugins: usize,
    /// Distinct first path segments of primary skills (e.g. languages), sorted.
    pub categories: BTreeSet<String>,
    pub target_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub license_path: Option<PathBuf>,
}

/// Run a full sync with outputs resolved against `repo_root`.
pub fn run_sync(
    config: &SyncConfig,
    repo_root: &Path,
    fetcher: &dyn SourceFetcher,
) -> Result<SyncSummary> {
    let workdir = tempfile::Builder::new()
        .prefix("skill-sync-")
        .tempdir()
        .context("creating temporary checkout directory")?;
    let checkout = workdir.path().join("source");

    log::info!("cloning {}", fetcher.describe());
    fetcher
        .fetch(&checkout)
        .with_context(|| format!("fetching {}", fetcher.describe()))?;

    let summary = sync_checkout(config, repo_root, &checkout)?;

    if let Err(e) = workdir.close() {
        log::warn!("failed to remove temporary checkout: {}", e);
    }
    Ok(summary)
}

/// Flatten an already fetched checkout into the configured outputs.
pub fn sync_checkout(config: &SyncConfig, repo_root: &Path, checkout: &Path) -> Result<SyncSummary> {
    let target_dir = resolve_skills_dir(config, repo_root);
    std::fs::create_dir_all(&target_dir)
        .with_context(|| format!("creating target directory {}", target_dir.display()))?;

    log::info!("resolving symlinks and flattening into {}/<name>/", target_dir.display());
    let primary = find_source_skills(checkout);
    log::info!("found {} skills in skills/ directory", primary.len());

    let mut flattener = Flattener::new(&target_dir, &config.naming, config.source.label.as_str());
    for entry in &primary {
        flattener.flatten(entry)?;
    }

    let plugins = find_plugin_skills(checkout, &directory_names(&primary));
    if !plugins.is_empty() {
        log::info!("found {} additional plugin skills", plugins.len());
    }
    for entry in &plugins {
        flattener.flatten(entry)?;
    }

    let records = flattener.into_records();
    let categories = categories(&records);
    let docs_dir = resolve_docs_dir(config, repo_root);
    log::info!("saving attribution to {}", docs_dir.display());
    let manifest = AttributionManifest::new(&config.source, records);
    let manifest_path = write_attribution(&docs_dir, &config.output.attribution_file, &manifest)?;
    let license_path = copy_license(checkout, &docs_dir, &config.output.license_file)?;

    Ok(SyncSummary {
        synced: manifest.synced_skills,
        primary: primary.len(),
        plugins: plugins.len(),
        categories,
        target_dir,
        manifest_path,
        license_path,
    })
}

fn categories(records: &[SkillRecord]) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(|r| r.original_path.split('/').next())
        .filter(|first| !first.is_empty() && *first != "plugins")
        .map(str::to_string)
        .collect()
}
