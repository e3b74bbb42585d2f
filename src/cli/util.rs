use std::path::{Path, PathBuf};

use crate::config::{ConverterConfig, MergePolicy, ScalarEncoding};
use crate::errors::CriteriaError;

/// `@path` reads the argument from a file, anything else is taken as is.
pub fn read_arg(arg: &str) -> Result<String, CriteriaError> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(arg.to_string()),
    }
}

/// Command-line inputs to configuration loading.
#[derive(Debug, Default, Clone)]
pub struct ConfigSources<'a> {
    pub config: Option<&'a Path>,
    pub merge: Option<MergePolicy>,
    pub encoding: Option<ScalarEncoding>,
    /// Directory searched for `criteria.toml` when no file is named.
    pub cwd: Option<&'a Path>,
}

/// Precedence: CLI > env > config file > defaults.
///
/// The file is `--config`, else `CRITERIA_CONFIG`, else `./criteria.toml`.
/// A file named explicitly (flag or env) must exist.
pub fn load_config<F>(sources: &ConfigSources<'_>, lookup: F) -> Result<ConverterConfig, CriteriaError>
where
    F: Fn(&str) -> Option<String>,
{
    let named = sources.config.map(Path::to_path_buf).or_else(|| lookup("CRITERIA_CONFIG").map(PathBuf::from));
    let cfg = match named {
        Some(p) if p.exists() => ConverterConfig::from_file(&p)?,
        Some(p) => return Err(CriteriaError::Config(format!("config file not found: {}", p.display()))),
        None => match sources.cwd.map(|d| d.join("criteria.toml")) {
            Some(p) if p.exists() => ConverterConfig::from_file(&p)?,
            _ => ConverterConfig::default(),
        },
    };
    let mut cfg = cfg.with_overrides_from(&lookup)?;
    if let Some(m) = sources.merge {
        cfg.merge_policy = m;
    }
    if let Some(e) = sources.encoding {
        cfg.scalar_encoding = e;
    }
    Ok(cfg)
}
