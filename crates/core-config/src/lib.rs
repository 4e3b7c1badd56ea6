//! Configuration loading and parsing.
//!
//! Parses `continuity.toml` (or an override path provided by the binary). Only
//! the `[files]` table is understood:
//!
//! ```toml
//! [files]
//! eol = "\n"                  # "\n" | "\r\n" | "auto" (also "lf" / "crlf")
//! max_memory_for_closed_files_undo_stack_mb = 20
//!
//! [files.languages]
//! markdown = "\r\n"
//!
//! [[files.scope]]
//! root = "/myroot"
//! eol = "\r\n"
//! ```
//!
//! EOL resolution walks the longest `files.scope` root containing the path,
//! then the global table; inside each, a language entry beats the plain `eol`.
//! The first value found wins. `auto` (or nothing at all) resolves to the
//! platform default. Unknown fields are ignored so the file can grow without
//! breaking older builds.

use anyhow::{Context, Result};
use core_text::Eol;
use serde::Deserialize;
use std::collections::HashMap;
use std::{fs, path::Path, path::PathBuf};
use tracing::{debug, warn};

/// Default budget for histories of closed files, in megabytes.
pub const DEFAULT_MAX_MEMORY_FOR_CLOSED_FILES_UNDO_STACK_MB: u64 = 20;

/// A configured EOL preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum EolSetting {
    Lf,
    Crlf,
    Auto,
}

impl TryFrom<String> for EolSetting {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "\n" | "lf" | "LF" => Ok(EolSetting::Lf),
            "\r\n" | "crlf" | "CRLF" => Ok(EolSetting::Crlf),
            "auto" => Ok(EolSetting::Auto),
            other => Err(format!("unsupported eol value {other:?}")),
        }
    }
}

impl EolSetting {
    pub fn resolve(self) -> Eol {
        match self {
            EolSetting::Lf => Eol::Lf,
            EolSetting::Crlf => Eol::Crlf,
            EolSetting::Auto => Eol::platform_default(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScopedFilesConfig {
    pub root: PathBuf,
    #[serde(default)]
    pub eol: Option<EolSetting>,
    #[serde(default)]
    pub languages: HashMap<String, EolSetting>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    #[serde(default)]
    pub eol: Option<EolSetting>,
    #[serde(default)]
    pub languages: HashMap<String, EolSetting>,
    #[serde(default = "FilesConfig::default_max_memory_mb")]
    pub max_memory_for_closed_files_undo_stack_mb: u64,
    #[serde(default, rename = "scope")]
    pub scopes: Vec<ScopedFilesConfig>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            eol: None,
            languages: HashMap::new(),
            max_memory_for_closed_files_undo_stack_mb: Self::default_max_memory_mb(),
            scopes: Vec::new(),
        }
    }
}

impl FilesConfig {
    const fn default_max_memory_mb() -> u64 {
        DEFAULT_MAX_MEMORY_FOR_CLOSED_FILES_UNDO_STACK_MB
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("continuity.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("continuity").join("continuity.toml");
    }
    PathBuf::from("continuity.toml")
}

/// Load configuration. A missing file yields defaults; a malformed one is logged and
/// also yields defaults.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        debug!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match Config::from_toml_str(&content) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %format!("{e:#}"), "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Config> {
        let file = toml::from_str::<ConfigFile>(content).context("parsing configuration")?;
        Ok(Config {
            raw: Some(content.to_string()),
            file,
        })
    }

    /// Longest configured root that contains `path`.
    fn scope_for(&self, path: &Path) -> Option<&ScopedFilesConfig> {
        self.file
            .files
            .scopes
            .iter()
            .filter(|scope| path.starts_with(&scope.root))
            .max_by_key(|scope| scope.root.components().count())
    }

    /// EOL preference for a file at `path` (if any) written in `language_id` (if any).
    pub fn resolve_eol(&self, path: Option<&Path>, language_id: Option<&str>) -> Eol {
        let files = &self.file.files;
        let scoped = path.and_then(|p| self.scope_for(p));
        let pick = |eol: Option<EolSetting>, languages: &HashMap<String, EolSetting>| {
            language_id
                .and_then(|lang| languages.get(lang).copied())
                .or(eol)
        };
        let setting = scoped
            .and_then(|scope| pick(scope.eol, &scope.languages))
            .or_else(|| pick(files.eol, &files.languages));
        let eol = setting.map_or(Eol::platform_default(), EolSetting::resolve);
        debug!(
            target: "config",
            path = path.map(|p| p.display().to_string()).as_deref(),
            language_id,
            scope = scoped.map(|s| s.root.display().to_string()).as_deref(),
            eol = %eol,
            "eol_resolved"
        );
        eol
    }

    /// Budget for retained histories of closed models, in bytes.
    pub fn max_memory_for_closed_files_undo_stack(&self) -> usize {
        let mb = self.file.files.max_memory_for_closed_files_undo_stack_mb;
        usize::try_from(mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}
