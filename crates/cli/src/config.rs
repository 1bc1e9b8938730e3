use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pathseek_indexer::ArenaConfig;
use pathseek_search::AdmissionPolicy;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "pathseek.toml";
pub const LIMIT_ENV: &str = "PATHSEEK_LIMIT";
pub const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 1000;

/// On-disk `pathseek.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    limit: Option<usize>,
    include: Vec<String>,
    exclude: Vec<String>,
    admission: Option<AdmissionPolicy>,
    arena: ArenaSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ArenaSection {
    initial_mib: Option<usize>,
    max_mib: Option<usize>,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub limit: Option<usize>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub all_matches: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub limit: usize,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub admission: AdmissionPolicy,
    pub arena: ArenaConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            include: Vec::new(),
            exclude: Vec::new(),
            admission: AdmissionPolicy::default(),
            arena: ArenaConfig::default(),
        }
    }
}

impl Settings {
    /// Flags > environment > config file > defaults.
    pub fn resolve(root: &Path, overrides: &Overrides) -> Result<Self> {
        let env_limit = std::env::var(LIMIT_ENV).ok();
        Self::resolve_with_env(root, overrides, env_limit.as_deref())
    }

    fn resolve_with_env(root: &Path, overrides: &Overrides, env_limit: Option<&str>) -> Result<Self> {
        let file = load_file_config(root, overrides.config.as_deref())?;
        let mut settings = Settings::default();

        if let Some(limit) = file.limit {
            settings.limit = limit;
        }
        settings.include = file.include;
        settings.exclude = file.exclude;
        if let Some(admission) = file.admission {
            settings.admission = admission;
        }
        let defaults = ArenaConfig::default();
        settings.arena = ArenaConfig::from_mib(
            file.arena
                .initial_mib
                .unwrap_or(defaults.initial_capacity / pathseek_indexer::MIB),
            file.arena
                .max_mib
                .unwrap_or(defaults.max_capacity / pathseek_indexer::MIB),
        );

        settings.limit = parse_limit(env_limit, settings.limit);

        if let Some(limit) = overrides.limit {
            settings.limit = limit;
        }
        if !overrides.include.is_empty() {
            settings.include = overrides.include.clone();
        }
        if !overrides.exclude.is_empty() {
            settings.exclude = overrides.exclude.clone();
        }
        if overrides.all_matches {
            settings.admission = AdmissionPolicy::All;
        }
        Ok(settings)
    }
}

fn load_file_config(root: &Path, explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = root.join(CONFIG_FILE_NAME);
            if !candidate.is_file() {
                return Ok(FileConfig::default());
            }
            candidate
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Cannot read config {}", path.display()))?;
    let config = toml::from_str(&raw)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    log::debug!("Loaded config {}", path.display());
    Ok(config)
}

fn parse_limit(raw: Option<&str>, default_value: usize) -> usize {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return default_value;
    };
    match raw.parse::<usize>() {
        Ok(limit) => limit.clamp(1, MAX_LIMIT),
        Err(_) => {
            log::warn!("Ignoring {LIMIT_ENV}={raw:?}: not a number");
            default_value
        }
    }
}
