//! Configuration file schema and discovery.
//!
//! Every key is optional; a missing file means all defaults.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::parent::{FallbackOptions, SpliceMode};

/// File names looked for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["migrascope.yaml", ".migrascope.yaml"];

/// Default similarity threshold, in percent.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// Generated Java members with no C++ counterpart.
pub const DEFAULT_IGNORED_JAVA_FIELDS: &[&str] = &[
    "CODEGEN_VERSION",
    "TYPE_SIGNATURE",
    "FAST_DEFAULT_FIELD_VALIDATION_MESSAGE",
    "FIELDQUALIFIER",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Root searched for parent class headers.
    pub search_root: PathBuf,
    /// Which parent collections are spliced into a child with no variables.
    pub parent_splice: SpliceMode,
    /// Minimum name similarity (0-100) for a field pair to count as a match.
    pub threshold: f64,
    /// Java field names dropped before scoring.
    pub ignored_java_fields: Vec<String>,
    /// Glob patterns for Java candidates `rank` skips (e.g. "**/generated/**").
    pub excluded_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_root: PathBuf::from("."),
            parent_splice: SpliceMode::default(),
            threshold: DEFAULT_THRESHOLD,
            ignored_java_fields: DEFAULT_IGNORED_JAVA_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file and validate it.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        let config: Config = serde_yaml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate().map_err(|e| match e {
            Error::Config { message, .. } => Error::Config {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Load `explicit` if given, else the first discovered config file in
    /// the working directory, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::parse_file(path);
        }
        match discover() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using discovered config");
                Self::parse_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges and that glob patterns compile.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(Error::InvalidThreshold(self.threshold));
        }
        self.excluded_set().map(|_| ())
    }

    fn excluded_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|e| Error::Config {
                path: PathBuf::new(),
                message: format!("invalid excluded_paths pattern {:?}: {}", pattern, e),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| Error::Config {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }

    /// Build a matcher for `excluded_paths`.
    pub fn exclusions(&self) -> Result<Exclusions> {
        Ok(Exclusions {
            set: self.excluded_set()?,
        })
    }

    /// Options for the parent fallback.
    pub fn fallback_options(&self) -> FallbackOptions {
        FallbackOptions {
            search_root: self.search_root.clone(),
            splice: self.parent_splice,
        }
    }
}

/// Compiled `excluded_paths` patterns.
#[derive(Debug, Clone)]
pub struct Exclusions {
    set: GlobSet,
}

impl Exclusions {
    /// Uses globset matching, so `**` spans directories.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }
}

/// Find a config file in the current directory.
pub fn discover() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}
