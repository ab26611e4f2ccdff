//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `skill-sync.json` at the repo root) and environment.
//! Every field has a default, so a missing file or `{}` reproduces the stock Microsoft skills sync.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the repo root when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "skill-sync.json";

/// Top-level sync config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Upstream repository and provenance fields written to the manifest.
    #[serde(default)]
    pub source: SourceConfig,

    /// Where flattened skills, the manifest and the license land.
    #[serde(default)]
    pub output: OutputConfig,

    /// Fallback name prefix and collision suffixes.
    #[serde(default)]
    pub naming: NamingConfig,
}

/// Upstream repository settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// Git URL to clone (shallow). Overridden by SKILL_SYNC_REPOSITORY env.
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Canonical human-facing URL recorded as `repository` in the manifest.
    #[serde(default = "default_homepage")]
    pub homepage: String,

    /// Source identity recorded on every skill (e.g. "microsoft/skills").
    #[serde(default = "default_label")]
    pub label: String,

    /// License identifier of the upstream content.
    #[serde(default = "default_license")]
    pub license: String,
}

/// Output layout. Relative paths are resolved against the repo root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    #[serde(default = "default_skills_dir")]
    pub skills_dir: PathBuf,

    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    /// Manifest file name inside `docs_dir`.
    #[serde(default = "default_attribution_file")]
    pub attribution_file: String,

    /// Name the upstream LICENSE is copied to inside `docs_dir`.
    #[serde(default = "default_license_file")]
    pub license_file: String,
}

/// Flat naming policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingConfig {
    /// Prefix for names synthesized from the relative path when SKILL.md declares none.
    #[serde(default = "default_fallback_prefix")]
    pub fallback_prefix: String,

    /// Appended to a plugin skill whose name is already taken.
    #[serde(default = "default_plugin_suffix")]
    pub plugin_suffix: String,
}

fn default_repository() -> String {
    "https://github.com/microsoft/skills.git".to_string()
}

fn default_homepage() -> String {
    "https://github.com/microsoft/skills".to_string()
}

fn default_label() -> String {
    "microsoft/skills".to_string()
}

fn default_license() -> String {
    "MIT".to_string()
}

fn default_skills_dir() -> PathBuf {
    PathBuf::from("skills")
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_attribution_file() -> String {
    "microsoft-skills-attribution.json".to_string()
}

fn default_license_file() -> String {
    "LICENSE-MICROSOFT".to_string()
}

fn default_fallback_prefix() -> String {
    "ms-".to_string()
}

fn default_plugin_suffix() -> String {
    "-plugin".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            homepage: default_homepage(),
            label: default_label(),
            license: default_license(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            skills_dir: default_skills_dir(),
            docs_dir: default_docs_dir(),
            attribution_file: default_attribution_file(),
            license_file: default_license_file(),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            fallback_prefix: default_fallback_prefix(),
            plugin_suffix: default_plugin_suffix(),
        }
    }
}

/// Resolve the clone URL: env SKILL_SYNC_REPOSITORY overrides config.
pub fn resolve_repository(config: &SyncConfig) -> String {
    std::env::var("SKILL_SYNC_REPOSITORY")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.source.repository.trim().to_string())
}

/// Resolve config path from env or default (`skill-sync.json` under `repo_root`).
pub fn default_config_path(repo_root: &Path) -> PathBuf {
    std::env::var("SKILL_SYNC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| repo_root.join(DEFAULT_CONFIG_FILE))
}

/// Load config from `path` (or the default for `repo_root`). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>, repo_root: &Path) -> Result<(SyncConfig, PathBuf)> {
    let path = path.unwrap_or_else(|| default_config_path(repo_root));
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        SyncConfig::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

fn resolve_against(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Resolve the flat skills target: absolute paths are used as-is, relative ones join `repo_root`.
pub fn resolve_skills_dir(config: &SyncConfig, repo_root: &Path) -> PathBuf {
    resolve_against(repo_root, &config.output.skills_dir)
}

/// Resolve the docs directory holding the manifest and license copy.
pub fn resolve_docs_dir(config: &SyncConfig, repo_root: &Path) -> PathBuf {
    resolve_against(repo_root, &config.output.docs_dir)
}
