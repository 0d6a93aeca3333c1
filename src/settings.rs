//! Settings and persisted preferences for retagls.
//!
//! Settings come from a `retagls.toml` discovered from the workspace root.
//! The only persisted state is whether the user dismissed the advisory
//! prompt, kept in `preferences.toml` under the per-user data directory.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Url;

use crate::document::{RegionScanner, DEFAULT_CLOSE_DELIMITER, DEFAULT_OPEN_DELIMITER};
use crate::error::{RetagError, RetagResult};
use crate::lsp::LanguageTag;

/// File name searched for during settings discovery.
pub const SETTINGS_FILE: &str = "retagls.toml";

/// Root settings structure loaded from `retagls.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub retag: Option<RetagSettings>,
}

/// The `[retag]` table. Every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct RetagSettings {
    /// Documents whose path ends with this suffix are retagged.
    pub file_suffix: Option<String>,

    pub open_delimiter: Option<String>,
    pub close_delimiter: Option<String>,

    /// Language id sent for embedded script regions.
    pub script_language: Option<String>,
    /// Language id sent for everything else.
    pub template_language: Option<String>,

    /// Upper bound on cached documents. Unbounded when absent.
    pub max_documents: Option<usize>,

    /// Whether to show the one-time advisory prompt (default: true).
    pub advisory: Option<bool>,
}

/// Settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetagConfig {
    pub file_suffix: String,
    pub open_delimiter: String,
    pub close_delimiter: String,
    pub script_language: String,
    pub template_language: String,
    pub max_documents: Option<usize>,
    pub advisory: bool,
}

impl Default for RetagConfig {
    fn default() -> Self {
        Self {
            file_suffix: ".blade.php".to_string(),
            open_delimiter: DEFAULT_OPEN_DELIMITER.to_string(),
            close_delimiter: DEFAULT_CLOSE_DELIMITER.to_string(),
            script_language: "php".to_string(),
            template_language: "blade".to_string(),
            max_documents: None,
            advisory: true,
        }
    }
}

impl RetagConfig {
    /// Apply `settings` over the defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();
        let Some(retag) = settings.retag.as_ref() else {
            return defaults;
        };

        Self {
            file_suffix: retag.file_suffix.clone().unwrap_or(defaults.file_suffix),
            open_delimiter: retag
                .open_delimiter
                .clone()
                .unwrap_or(defaults.open_delimiter),
            close_delimiter: retag
                .close_delimiter
                .clone()
                .unwrap_or(defaults.close_delimiter),
            script_language: retag
                .script_language
                .clone()
                .unwrap_or(defaults.script_language),
            template_language: retag
                .template_language
                .clone()
                .unwrap_or(defaults.template_language),
            max_documents: retag.max_documents,
            advisory: retag.advisory.unwrap_or(defaults.advisory),
        }
    }

    /// Scanner for the configured delimiters.
    pub fn scanner(&self) -> RetagResult<RegionScanner> {
        RegionScanner::new(&self.open_delimiter, &self.close_delimiter)
    }

    /// Scanner for the configured delimiters, or the default one if they are
    /// unusable.
    pub fn scanner_or_default(&self) -> RegionScanner {
        self.scanner().unwrap_or_else(|e| {
            log::warn!("{}; falling back to default delimiters", e);
            RegionScanner::default()
        })
    }

    /// Whether `uri` names a hybrid document.
    pub fn matches(&self, uri: &Url) -> bool {
        uri.path().ends_with(&self.file_suffix)
    }

    /// Host language id for `tag`.
    pub fn language_id(&self, tag: LanguageTag) -> &str {
        match tag {
            LanguageTag::Script => &self.script_language,
            LanguageTag::Template => &self.template_language,
        }
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> RetagResult<T> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| RetagError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings from a `retagls.toml` file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match read_toml(path) {
        Ok(settings) => settings,
        Err(RetagError::Io(_)) => Settings::default(),
        Err(e) => {
            log::warn!("{}", e);
            Settings::default()
        }
    }
}

/// Discover `retagls.toml` by searching up the directory tree, then direct children.
///
/// Returns `(settings, settings_dir)`. If nothing is found, returns
/// `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join(SETTINGS_FILE);
                if candidate.is_file() {
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}

/// Durable per-user preferences.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub advisory_dismissed: bool,
}

/// Default location of `preferences.toml`, if the platform has a data dir.
pub fn preferences_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("retagls").join("preferences.toml"))
}

/// Load preferences, treating a missing or broken file as defaults.
pub fn load_preferences(path: &Path) -> Preferences {
    match read_toml(path) {
        Ok(prefs) => prefs,
        Err(RetagError::Io(_)) => Preferences::default(),
        Err(e) => {
            log::warn!("{}", e);
            Preferences::default()
        }
    }
}

pub fn save_preferences(path: &Path, prefs: &Preferences) -> RetagResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string(prefs)?)?;
    Ok(())
}
