//! Conversion options, loadable from a TOML file.
//!
//! Options cover the knobs the orchestration layer tunes per run: where the
//! markdown tree is written, whether the remote fallback collaborator may be
//! consulted, and whether the container cache is cleared between batches.
//! Everything defaults sensibly; a missing config file is not an error.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Options for one conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConvertOptions {
    /// Root directory the markdown tree is written under.
    pub output_dir: PathBuf,
    /// Whether a registered remote fallback may be consulted for entries
    /// missing from the local archive.
    pub remote_fallback: bool,
    /// Whether the container cache is cleared between batches.
    pub clear_cache_between_batches: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("docs"),
            remote_fallback: false,
            clear_cache_between_batches: true,
        }
    }
}

impl ConvertOptions {
    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// I/O errors reading the file, or [`Error::Serialization`] for
    /// malformed TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse options from a TOML string.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`] for malformed TOML.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load options from the platform config directory, falling back to
    /// defaults when no config file exists.
    ///
    /// # Errors
    ///
    /// Only for a config file that exists but cannot be read or parsed.
    pub fn load_default() -> Result<Self> {
        let Some(path) = Self::default_config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Platform-specific default config file location.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "mdset", "mdset")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Validate option invariants.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the output directory is empty.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::Config("output-dir must not be empty".to_string()));
        }
        Ok(())
    }
}
