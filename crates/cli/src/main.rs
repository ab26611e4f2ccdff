use clap::Parser;
use std::path::PathBuf;

use skill_sync::config;
use skill_sync::fetch::GitFetcher;

#[derive(Parser)]
#[command(name = "sync-skills")]
#[command(version, about = "Mirror a remote skills repository into a flat skills/<name>/ layout", long_about = None)]
struct Cli {
    /// Config file path (default: SKILL_SYNC_CONFIG or <repo-root>/skill-sync.json)
    #[arg(long, short, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory that output paths in the config are relative to (default: current directory)
    #[arg(long, value_name = "PATH")]
    repo_root: Option<PathBuf>,

    /// Git URL to clone instead of the configured repository
    #[arg(long, value_name = "URL")]
    repository: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("sync failed: {:?}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let repo_root = match cli.repo_root {
        Some(p) => p,
        None => std::env::current_dir()?,
    };
    let (config, path) = config::load_config(cli.config, &repo_root)?;
    log::debug!("using config {}", path.display());

    let url = cli
        .repository
        .unwrap_or_else(|| config::resolve_repository(&config));
    let fetcher = GitFetcher::new(url);

    let summary = skill_sync::sync::run_sync(&config, &repo_root, &fetcher)?;

    println!("synced {} skills from {}", summary.synced, config.source.label);
    println!("  primary: {}, plugins: {}", summary.primary, summary.plugins);
    println!("  location: {}/", summary.target_dir.display());
    println!("  attribution: {}", summary.manifest_path.display());
    if let Some(license) = &summary.license_path {
        println!("  license: {}", license.display());
    }
    let categories: Vec<&str> = summary.categories.iter().map(String::as_str).collect();
    println!("  categories: {}", categories.join(", "));
    Ok(())
}
