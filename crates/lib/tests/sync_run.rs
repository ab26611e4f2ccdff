//! Integration test: run a full sync against a fixture checkout (no git, no network) and
//! check the flattened layout, the attribution manifest and temp-dir cleanup.

use skill_sync::attribution::read_attribution;
use skill_sync::config::SyncConfig;
use skill_sync::fetch::{CloneError, SourceFetcher};
use skill_sync::sync::run_sync;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Lays out a small upstream tree shaped like the Microsoft skills repo.
struct FixtureFetcher {
    fetched_into: RefCell<Option<PathBuf>>,
}

impl FixtureFetcher {
    fn new() -> Self {
        Self {
            fetched_into: RefCell::new(None),
        }
    }
}

fn write_skill(dir: &Path, frontmatter_name: Option<&str>) {
    fs::create_dir_all(dir).expect("create skill dir");
    let body = match frontmatter_name {
        Some(n) => format!("---\nname: {n}\ndescription: fixture\n---\n# Skill\n"),
        None => "# Skill without frontmatter\n".to_string(),
    };
    fs::write(dir.join("SKILL.md"), body).expect("write SKILL.md");
}

impl SourceFetcher for FixtureFetcher {
    fn fetch(&self, dest: &Path) -> Result<(), CloneError> {
        *self.fetched_into.borrow_mut() = Some(dest.to_path_buf());
        let skills = dest.join("skills");

        write_skill(&skills.join("dotnet/a/skillx"), Some("skillx"));
        write_skill(&skills.join("dotnet/b/skillx"), Some("skillx"));
        write_skill(&skills.join("dotnet/compute/botservice"), None);

        let blob = skills.join("python/storage/blob");
        write_skill(&blob, Some("\"azure-storage-blob-py\""));
        fs::write(blob.join("example.py"), "print('hi')")?;
        fs::create_dir_all(blob.join("references"))?;
        fs::write(blob.join("references/api.md"), "nested")?;

        let plugins = dest.join(".github/plugins");
        // Shares a directory name with a primary skill: excluded.
        write_skill(&plugins.join("deploy/skills/blob"), Some("plugin-blob"));
        // Declares a name already taken by a primary skill.
        write_skill(&plugins.join("deploy/skills/skillx-extra"), Some("skillx"));
        write_skill(&plugins.join("observe/skills/kql"), None);

        fs::write(dest.join("LICENSE"), "MIT License\n")?;

        #[cfg(unix)]
        {
            let real = dest.join(".github/skills/azure-ai-projects");
            write_skill(&real, Some("azure-ai-projects-py"));
            fs::write(real.join("notes.txt"), "linked content")?;
            fs::create_dir_all(skills.join("python/ai"))?;
            std::os::unix::fs::symlink(&real, skills.join("python/ai/projects"))?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "fixture".to_string()
    }
}

struct FailingFetcher;

impl SourceFetcher for FailingFetcher {
    fn fetch(&self, _dest: &Path) -> Result<(), CloneError> {
        Err(CloneError::Failed {
            url: "https://example.invalid/skills.git".to_string(),
            status: "exit status: 128".to_string(),
            stderr: "repository not found".to_string(),
        })
    }

    fn describe(&self) -> String {
        "https://example.invalid/skills.git".to_string()
    }
}

/// Upstream whose descriptors declare names that are not single path segments.
struct PathNameFetcher;

impl SourceFetcher for PathNameFetcher {
    fn fetch(&self, dest: &Path) -> Result<(), CloneError> {
        let skills = dest.join("skills");
        write_skill(&skills.join("go/a/up"), Some("../escaped"));
        write_skill(&skills.join("go/b/here"), Some("."));
        write_skill(&skills.join("go/c/plain"), Some("plain"));
        Ok(())
    }

    fn describe(&self) -> String {
        "path-names".to_string()
    }
}

fn target_dirs(target: &Path) -> BTreeSet<String> {
    fs::read_dir(target)
        .expect("read target")
        .map(|e| e.expect("dir entry"))
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn full_sync_flattens_and_attributes() {
    let repo = tempfile::tempdir().expect("tempdir");
    let config = SyncConfig::default();
    let fetcher = FixtureFetcher::new();

    let summary = run_sync(&config, repo.path(), &fetcher).expect("sync");

    let target = repo.path().join("skills");
    let dirs = target_dirs(&target);
    let mut expected: BTreeSet<String> = [
        "skillx",
        "skillx-dotnet",
        "ms-dotnet-compute-botservice",
        "azure-storage-blob-py",
        "skillx-plugin",
        "ms-plugins-kql",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    if cfg!(unix) {
        expected.insert("azure-ai-projects-py".to_string());
    }
    assert_eq!(dirs, expected);

    let manifest = read_attribution(&summary.manifest_path).expect("manifest");
    assert_eq!(summary.manifest_path, repo.path().join("docs/microsoft-skills-attribution.json"));
    assert_eq!(manifest.synced_skills, manifest.skills.len());
    assert_eq!(manifest.synced_skills, dirs.len());
    assert_eq!(summary.synced, dirs.len());
    assert_eq!(summary.plugins, 2);
    assert_eq!(manifest.source, "microsoft/skills");
    assert_eq!(manifest.license, "MIT");

    // Primary skills come first, in sorted walk order, then plugins.
    let order: Vec<&str> = manifest.skills.iter().map(|s| s.flat_name.as_str()).collect();
    assert_eq!(&order[..3], &["skillx", "skillx-dotnet", "ms-dotnet-compute-botservice"]);
    assert_eq!(&order[order.len() - 2..], &["skillx-plugin", "ms-plugins-kql"]);

    let plugin = manifest
        .skills
        .iter()
        .find(|s| s.flat_name == "skillx-plugin")
        .expect("plugin record");
    assert_eq!(plugin.original_path, "plugins/skillx-extra");
    assert_eq!(plugin.source, "microsoft/skills (plugin)");
    assert!(!manifest.skills.iter().any(|s| s.original_path == "plugins/blob"));

    let blob = target.join("azure-storage-blob-py");
    assert!(blob.join("SKILL.md").is_file());
    assert!(blob.join("example.py").is_file());
    assert!(!blob.join("references").exists());
    assert!(!blob.join("api.md").exists());

    let cats: Vec<&str> = summary.categories.iter().map(String::as_str).collect();
    assert_eq!(cats, vec!["dotnet", "python"]);

    assert_eq!(
        fs::read_to_string(repo.path().join("docs/LICENSE-MICROSOFT")).expect("license"),
        "MIT License\n"
    );

    #[cfg(unix)]
    {
        let linked = target.join("azure-ai-projects-py");
        assert_eq!(
            fs::read_to_string(linked.join("notes.txt")).expect("notes"),
            "linked content"
        );
        let record = manifest
            .skills
            .iter()
            .find(|s| s.flat_name == "azure-ai-projects-py")
            .expect("symlinked record");
        assert_eq!(record.original_path, "python/ai/projects");
    }

    let checkout = fetcher.fetched_into.borrow().clone().expect("fetch called");
    assert!(!checkout.exists(), "temporary checkout removed");
}

#[test]
fn rerun_on_same_source_is_stable() {
    let repo = tempfile::tempdir().expect("tempdir");
    let config = SyncConfig::default();

    let first = run_sync(&config, repo.path(), &FixtureFetcher::new()).expect("first sync");
    let first_manifest = read_attribution(&first.manifest_path).expect("first manifest");
    let second = run_sync(&config, repo.path(), &FixtureFetcher::new()).expect("second sync");
    let second_manifest = read_attribution(&second.manifest_path).expect("second manifest");

    assert_eq!(first_manifest, second_manifest);
    assert_eq!(first.synced, second.synced);
    assert_eq!(target_dirs(&repo.path().join("skills")).len(), second.synced);
}

#[test]
fn clone_failure_aborts_before_touching_target() {
    let repo = tempfile::tempdir().expect("tempdir");
    let err = run_sync(&SyncConfig::default(), repo.path(), &FailingFetcher).unwrap_err();

    assert!(format!("{err:#}").contains("repository not found"));
    assert!(err.root_cause().downcast_ref::<CloneError>().is_some());
    assert!(!repo.path().join("skills").exists());
    assert!(!repo.path().join("docs").exists());
}

#[test]
fn configured_layout_and_naming_are_honored() {
    let repo = tempfile::tempdir().expect("tempdir");
    let mut config: SyncConfig = serde_json::from_str(
        r#"{
            "source": { "label": "acme/skills", "homepage": "https://example.com/acme" },
            "output": { "skillsDir": "vendor/skills", "docsDir": "vendor/docs",
                        "attributionFile": "acme.json", "licenseFile": "LICENSE-ACME" },
            "naming": { "fallbackPrefix": "acme-", "pluginSuffix": "-ext" }
        }"#,
    )
    .expect("config");
    config.source.license = "Apache-2.0".to_string();

    let summary = run_sync(&config, repo.path(), &FixtureFetcher::new()).expect("sync");

    let dirs = target_dirs(&repo.path().join("vendor/skills"));
    assert!(dirs.contains("acme-dotnet-compute-botservice"));
    assert!(dirs.contains("skillx-ext"));
    assert!(dirs.contains("acme-plugins-kql"));
    assert!(repo.path().join("vendor/docs/LICENSE-ACME").is_file());

    let manifest = read_attribution(&summary.manifest_path).expect("manifest");
    assert_eq!(summary.manifest_path, repo.path().join("vendor/docs/acme.json"));
    assert_eq!(manifest.repository, "https://example.com/acme");
    assert_eq!(manifest.license, "Apache-2.0");
    assert!(manifest.skills.iter().any(|s| s.source == "acme/skills (plugin)"));
}

#[test]
fn path_like_names_stay_inside_target() {
    let repo = tempfile::tempdir().expect("tempdir");
    let summary = run_sync(&SyncConfig::default(), repo.path(), &PathNameFetcher).expect("sync");

    let target = repo.path().join("skills");
    let dirs = target_dirs(&target);
    let expected: BTreeSet<String> = ["ms-go-a-up", "ms-go-b-here", "plain"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(dirs, expected);
    assert_eq!(summary.synced, dirs.len());
    assert!(!target.join("SKILL.md").exists());
    assert!(!repo.path().join("escaped").exists());
}
