//! Discover skill directories in a cloned source tree.
//!
//! Primary skills live under `skills/` and are often symlinks into the real content; those are
//! canonicalized here so nothing downstream sees the indirection. Plugin skills live under
//! `.github/plugins/` and are deduplicated against primary skills by directory name only.
//! Walks are sorted by file name so collision outcomes are reproducible between runs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::descriptor::DESCRIPTOR_FILE;

/// Which tree of the source repo a skill was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillSource {
    /// From the `skills/` tree.
    Primary,
    /// From `.github/plugins/`, only when no primary skill has the same directory name.
    Plugin,
}

/// A discovered skill, prior to flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillEntry {
    /// Path relative to `skills/` (primary) or synthesized as `plugins/<dir>` (plugin).
    pub relative_path: PathBuf,
    /// The SKILL.md to copy; for symlinked skills this is inside the resolved directory.
    pub descriptor_path: PathBuf,
    /// Directory that actually holds the content (never a symlink).
    pub source_directory: PathBuf,
    pub source: SkillSource,
}

impl SkillEntry {
    /// Directory name of the real content, used for plugin dedup.
    pub fn directory_name(&self) -> Option<String> {
        self.source_directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Walk `<root>/skills` and return every directory (or symlink to one) holding a SKILL.md.
pub fn find_source_skills(root: &Path) -> Vec<SkillEntry> {
    let skills_root = root.join("skills");
    let mut out = Vec::new();
    if !skills_root.exists() {
        log::debug!("no skills directory at {}", skills_root.display());
        return out;
    }

    let walker = WalkDir::new(&skills_root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    for item in walker {
        let item = match item {
            Ok(i) => i,
            Err(e) => {
                log::debug!("skipping unreadable entry under {}: {}", skills_root.display(), e);
                continue;
            }
        };
        let path = item.path();
        // Follows symlinks, so broken links and links to files drop out here.
        if !path.is_dir() {
            continue;
        }

        let source_directory = if item.path_is_symlink() {
            match path.canonicalize() {
                Ok(resolved) if resolved.join(DESCRIPTOR_FILE).exists() => resolved,
                Ok(_) => continue,
                Err(e) => {
                    log::debug!("cannot resolve {}: {}", path.display(), e);
                    continue;
                }
            }
        } else if path.join(DESCRIPTOR_FILE).exists() {
            path.to_path_buf()
        } else {
            continue;
        };

        let Ok(relative_path) = path.strip_prefix(&skills_root) else {
            continue;
        };
        out.push(SkillEntry {
            relative_path: relative_path.to_path_buf(),
            descriptor_path: source_directory.join(DESCRIPTOR_FILE),
            source_directory,
            source: SkillSource::Primary,
        });
    }
    out
}

/// Walk `<root>/.github/plugins` for SKILL.md files whose parent directory name is not in
/// `already_synced`.
pub fn find_plugin_skills(root: &Path, already_synced: &HashSet<String>) -> Vec<SkillEntry> {
    let plugins_root = root.join(".github").join("plugins");
    let mut out = Vec::new();
    if !plugins_root.exists() {
        return out;
    }

    for item in WalkDir::new(&plugins_root).sort_by_file_name() {
        let item = match item {
            Ok(i) => i,
            Err(e) => {
                log::debug!("skipping unreadable entry under {}: {}", plugins_root.display(), e);
                continue;
            }
        };
        if item.file_name() != DESCRIPTOR_FILE || !item.path().is_file() {
            continue;
        }
        let Some(skill_dir) = item.path().parent() else {
            continue;
        };
        let Some(dir_name) = skill_dir.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };
        if already_synced.contains(&dir_name) {
            log::debug!("plugin skill {} already synced from skills/", dir_name);
            continue;
        }
        out.push(SkillEntry {
            relative_path: Path::new("plugins").join(&dir_name),
            descriptor_path: item.path().to_path_buf(),
            source_directory: skill_dir.to_path_buf(),
            source: SkillSource::Plugin,
        });
    }
    out
}

/// Directory names of the given entries' real content, for [`find_plugin_skills`].
pub fn directory_names(entries: &[SkillEntry]) -> HashSet<String> {
    entries.iter().filter_map(SkillEntry::directory_name).collect()
}
