//! Converter configuration.
//!
//! Precedence: explicit values (CLI) > environment > config file > defaults.
//! Environment keys:
//! - CRITERIA_IDENTIFIER_FIELD
//! - CRITERIA_NATIVE_IDENTIFIER_FIELD
//! - CRITERIA_MERGE_POLICY (`last_write_wins` | `conjunction`)
//! - CRITERIA_SCALAR_ENCODING (`canonical` | `typed`)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::criteria::OrderType;
use crate::errors::CriteriaError;

/// How per-filter fragments are combined into one predicate document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Shallow merge; a later fragment's top-level key replaces an earlier one.
    #[default]
    LastWriteWins,
    /// Every fragment kept under `$and`.
    Conjunction,
}

/// How scalar filter values are emitted into the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarEncoding {
    /// The canonical string form (`18` becomes `"18"`).
    #[default]
    Canonical,
    /// The value with its original BSON type.
    Typed,
}

impl std::str::FromStr for MergePolicy {
    type Err = CriteriaError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "last_write_wins" => Ok(Self::LastWriteWins),
            "conjunction" | "and" => Ok(Self::Conjunction),
            _ => Err(CriteriaError::Config(format!("unknown merge policy: {s}"))),
        }
    }
}

impl std::str::FromStr for ScalarEncoding {
    type Err = CriteriaError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "canonical" => Ok(Self::Canonical),
            "typed" => Ok(Self::Typed),
            _ => Err(CriteriaError::Config(format!("unknown scalar encoding: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Logical identifier field callers sort by.
    pub identifier_field: String,
    /// Identifier key the document store actually uses.
    pub native_identifier_field: String,
    pub merge_policy: MergePolicy,
    pub scalar_encoding: ScalarEncoding,
    /// Direction of the implicit sort on the native identifier.
    pub default_sort: OrderType,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            identifier_field: "id".to_string(),
            native_identifier_field: "_id".to_string(),
            merge_policy: MergePolicy::LastWriteWins,
            scalar_encoding: ScalarEncoding::Canonical,
            default_sort: OrderType::Desc,
        }
    }
}

impl ConverterConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, CriteriaError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()
    }

    pub fn from_file(path: &Path) -> Result<Self, CriteriaError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| CriteriaError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// Apply `CRITERIA_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, CriteriaError> {
        self.with_overrides_from(|k| std::env::var(k).ok())
    }

    /// Apply `CRITERIA_*` overrides from an arbitrary lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, CriteriaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CRITERIA_IDENTIFIER_FIELD") {
            self.identifier_field = v;
        }
        if let Some(v) = lookup("CRITERIA_NATIVE_IDENTIFIER_FIELD") {
            self.native_identifier_field = v;
        }
        if let Some(v) = lookup("CRITERIA_MERGE_POLICY") {
            self.merge_policy = v.parse()?;
        }
        if let Some(v) = lookup("CRITERIA_SCALAR_ENCODING") {
            self.scalar_encoding = v.parse()?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, CriteriaError> {
        if self.identifier_field.is_empty() || self.native_identifier_field.is_empty() {
            return Err(CriteriaError::Config("identifier fields must not be empty".into()));
        }
        Ok(self)
    }
}
