//! Attribution manifest and upstream license copy, written to the docs directory after each sync.
//!
//! The manifest is rebuilt from scratch every run; records keep the order skills were processed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::SourceConfig;
use crate::skills::{copy_preserving_times, SkillRecord};

/// Layout description recorded in every manifest.
pub const STRUCTURE: &str = "flat (frontmatter name as directory name)";

/// Provenance document listing every synchronized skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionManifest {
    pub source: String,
    pub repository: String,
    pub license: String,
    pub synced_skills: usize,
    pub structure: String,
    pub skills: Vec<SkillRecord>,
}

impl AttributionManifest {
    pub fn new(source: &SourceConfig, skills: Vec<SkillRecord>) -> Self {
        Self {
            source: source.label.clone(),
            repository: source.homepage.clone(),
            license: source.license.clone(),
            synced_skills: skills.len(),
            structure: STRUCTURE.to_string(),
            skills,
        }
    }
}

/// Write `manifest` as pretty JSON to `docs_dir/file_name`, replacing any previous manifest.
pub fn write_attribution(
    docs_dir: &Path,
    file_name: &str,
    manifest: &AttributionManifest,
) -> Result<PathBuf> {
    std::fs::create_dir_all(docs_dir)
        .with_context(|| format!("creating docs directory {}", docs_dir.display()))?;
    let path = docs_dir.join(file_name);
    let json = serde_json::to_string_pretty(manifest).context("serializing attribution manifest")?;
    std::fs::write(&path, json)
        .with_context(|| format!("writing attribution to {}", path.display()))?;
    Ok(path)
}

/// Read a previously written manifest.
pub fn read_attribution(path: &Path) -> Result<AttributionManifest> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading attribution from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing attribution from {}", path.display()))
}

/// Copy `<source_root>/LICENSE` to `docs_dir/file_name`. Returns `None` when upstream has no LICENSE.
pub fn copy_license(source_root: &Path, docs_dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let license = source_root.join("LICENSE");
    if !license.exists() {
        log::warn!("no LICENSE in {}, skipping license copy", source_root.display());
        return Ok(None);
    }
    std::fs::create_dir_all(docs_dir)
        .with_context(|| format!("creating docs directory {}", docs_dir.display()))?;
    let dest = docs_dir.join(file_name);
    copy_preserving_times(&license, &dest)?;
    Ok(Some(dest))
}
