//! Flatten discovered skills into `<target>/<flat_name>/`.
//!
//! The flat name is the descriptor's declared name, or one synthesized from the relative path.
//! Names are claimed first-come-first-served in a per-run registry; a later claimant is
//! suffixed with its own first path segment (primary) or the plugin suffix (plugin).
//! Only files directly inside a skill directory are copied; subdirectories are not.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use super::descriptor::{extract_skill_name, DESCRIPTOR_FILE};
use super::walker::{SkillEntry, SkillSource};
use crate::config::NamingConfig;

/// One synchronized skill as recorded in the attribution manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub flat_name: String,
    pub original_path: String,
    pub source: String,
}

/// Flat names claimed in this run, mapped to the relative path that claimed them.
#[derive(Debug, Default)]
pub struct NameRegistry {
    claimed: HashMap<String, String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claimed.contains_key(name)
    }

    /// Relative path of the skill that holds `name`, if any.
    pub fn claimant(&self, name: &str) -> Option<&str> {
        self.claimed.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    fn claim(&mut self, name: String, relative_path: String) {
        self.claimed.insert(name, relative_path);
    }
}

/// Assigns flat names and copies skill content into the target root.
pub struct Flattener {
    target_dir: PathBuf,
    naming: NamingConfig,
    source_label: String,
    registry: NameRegistry,
    records: Vec<SkillRecord>,
}

impl Flattener {
    pub fn new(
        target_dir: impl Into<PathBuf>,
        naming: &NamingConfig,
        source_label: impl Into<String>,
    ) -> Self {
        Self {
            target_dir: target_dir.into(),
            naming: naming.clone(),
            source_label: source_label.into(),
            registry: NameRegistry::new(),
            records: Vec::new(),
        }
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    pub fn records(&self) -> &[SkillRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<SkillRecord> {
        self.records
    }

    /// Name, register, copy and record one skill. Copy errors abort with path context.
    pub fn flatten(&mut self, entry: &SkillEntry) -> Result<&SkillRecord> {
        let original_path = display_relative(&entry.relative_path);
        let make_fallback = || fallback_name(&self.naming.fallback_prefix, &entry.relative_path);
        let candidate = match extract_skill_name(&entry.descriptor_path) {
            Some(name) if is_flat_name(&name) => name,
            Some(name) => {
                let fallback = make_fallback();
                log::warn!(
                    "frontmatter name {:?} for {} is not a single path segment, using fallback: {}",
                    name,
                    original_path,
                    fallback
                );
                fallback
            }
            None => {
                let fallback = make_fallback();
                log::warn!(
                    "no frontmatter name for {}, using fallback: {}",
                    original_path,
                    fallback
                );
                fallback
            }
        };
        let flat_name = self.resolve_collision(candidate, entry, &original_path);
        if !is_flat_name(&flat_name) {
            anyhow::bail!(
                "no usable directory name for {} (got {:?})",
                original_path,
                flat_name
            );
        }
        self.registry.claim(flat_name.clone(), original_path.clone());

        let dest = self.target_dir.join(&flat_name);
        copy_skill_files(entry, &dest)?;

        let source = match entry.source {
            SkillSource::Primary => self.source_label.clone(),
            SkillSource::Plugin => format!("{} (plugin)", self.source_label),
        };
        log::info!("{} -> {}/", original_path, dest.display());
        self.records.push(SkillRecord {
            flat_name,
            original_path,
            source,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    fn resolve_collision(
        &self,
        candidate: String,
        entry: &SkillEntry,
        original_path: &str,
    ) -> String {
        let Some(holder) = self.registry.claimant(&candidate) else {
            return candidate;
        };
        let suffixed = match entry.source {
            SkillSource::Primary => {
                format!("{}-{}", candidate, first_component(&entry.relative_path))
            }
            SkillSource::Plugin => format!("{}{}", candidate, self.naming.plugin_suffix),
        };
        let resolved = self.first_free(suffixed);
        log::warn!(
            "name collision '{}': {} vs {}, resolved to {}",
            candidate,
            original_path,
            holder,
            resolved
        );
        resolved
    }

    /// `name` if unclaimed, else `name-2`, `name-3`, ...
    fn first_free(&self, name: String) -> String {
        if !self.registry.contains(&name) {
            return name;
        }
        let mut n = 2u32;
        loop {
            let numbered = format!("{name}-{n}");
            if !self.registry.contains(&numbered) {
                return numbered;
            }
            n += 1;
        }
    }
}

/// True when `name` is exactly one normal path component, so `target.join(name)` stays a
/// direct child of `target`.
pub fn is_flat_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// `prefix` followed by the relative path's components joined with `-`
/// (`dotnet/compute/botservice` -> `ms-dotnet-compute-botservice`).
pub fn fallback_name(prefix: &str, relative_path: &Path) -> String {
    format!("{}{}", prefix, path_components(relative_path).join("-"))
}

fn path_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_component(path: &Path) -> String {
    path_components(path)
        .into_iter()
        .next()
        .unwrap_or_else(|| "unknown".to_string())
}

/// Relative path with `/` separators regardless of platform.
fn display_relative(path: &Path) -> String {
    path_components(path).join("/")
}

fn copy_skill_files(entry: &SkillEntry, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("creating skill directory {}", dest.display()))?;
    copy_preserving_times(&entry.descriptor_path, &dest.join(DESCRIPTOR_FILE))?;

    let mut siblings = Vec::new();
    let read_dir = std::fs::read_dir(&entry.source_directory)
        .with_context(|| format!("listing {}", entry.source_directory.display()))?;
    for item in read_dir {
        let item =
            item.with_context(|| format!("listing {}", entry.source_directory.display()))?;
        let path = item.path();
        if item.file_name() == DESCRIPTOR_FILE || !path.is_file() {
            continue;
        }
        siblings.push((item.file_name(), path));
    }
    siblings.sort();
    for (name, path) in siblings {
        copy_preserving_times(&path, &dest.join(name))?;
    }
    Ok(())
}

/// Copy contents and permissions, then carry over access/modification times.
pub(crate) fn copy_preserving_times(from: &Path, to: &Path) -> Result<()> {
    std::fs::copy(from, to)
        .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;
    let meta = std::fs::metadata(from)
        .with_context(|| format!("reading metadata of {}", from.display()))?;
    let atime = filetime::FileTime::from_last_access_time(&meta);
    let mtime = filetime::FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(to, atime, mtime)
        .with_context(|| format!("setting times on {}", to.display()))?;
    Ok(())
}
