//! Theme discovery and loading.
//!
//! A theme is a directory under the themes root:
//!
//! ```text
//! themes/
//! └── minimal/
//!     ├── theme.toml           # Optional: display name and description
//!     ├── templates/
//!     │   ├── base.html        # Page shell (required)
//!     │   └── post.html        # Post body, wrapped in base.html (required)
//!     └── static/              # Copied verbatim to <output>/static/
//!         └── css/style.css
//! ```
//!
//! Both templates are required; a missing one is a [`TemplateError`] and the
//! build stops before the output directory is touched. `static/` is
//! optional.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BASE_TEMPLATE: &str = "templates/base.html";
pub const POST_TEMPLATE: &str = "templates/post.html";
pub const STATIC_DIR: &str = "static";
const THEME_INFO_FILE: &str = "theme.toml";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Theme '{name}' not found in {dir}")]
    UnknownTheme { name: String, dir: PathBuf },
    #[error("Missing template file: {0}")]
    Missing(PathBuf),
    #[error("Could not read template {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid {path}: {source}")]
    Info {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Optional display metadata from `theme.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeInfo {
    /// Human-readable name; defaults to the directory name.
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A loaded theme: template texts plus the location of its static assets.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Directory name, as passed to `--theme`.
    pub name: String,
    pub dir: PathBuf,
    pub info: ThemeInfo,
    pub base_template: String,
    pub post_template: String,
}

impl Theme {
    /// Load the theme `name` from `themes_dir`.
    pub fn load(themes_dir: &Path, name: &str) -> Result<Self, TemplateError> {
        let dir = themes_dir.join(name);
        if !is_theme_name(name) || !dir.is_dir() {
            return Err(TemplateError::UnknownTheme {
                name: name.to_string(),
                dir: themes_dir.to_path_buf(),
            });
        }

        let base_template = read_template(&dir.join(BASE_TEMPLATE))?;
        let post_template = read_template(&dir.join(POST_TEMPLATE))?;
        let info = load_info(&dir)?;
        tracing::debug!(theme = name, dir = %dir.display(), "loaded theme");

        Ok(Self {
            name: name.to_string(),
            dir,
            info,
            base_template,
            post_template,
        })
    }

    /// The theme's `static/` directory, if it has one.
    pub fn static_dir(&self) -> Option<PathBuf> {
        let dir = self.dir.join(STATIC_DIR);
        dir.is_dir().then_some(dir)
    }

    pub fn display_name(&self) -> &str {
        self.info.name.as_deref().unwrap_or(&self.name)
    }
}

/// A single plain directory name.
fn is_theme_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

fn read_template(path: &Path) -> Result<String, TemplateError> {
    if !path.is_file() {
        return Err(TemplateError::Missing(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_info(dir: &Path) -> Result<ThemeInfo, TemplateError> {
    let path = dir.join(THEME_INFO_FILE);
    if !path.exists() {
        return Ok(ThemeInfo::default());
    }
    let content = fs::read_to_string(&path).map_err(|source| TemplateError::Io {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| TemplateError::Info { path, source })
}

/// A theme directory found under the themes root.
#[derive(Debug, Clone)]
pub struct ThemeEntry {
    pub name: String,
    pub info: ThemeInfo,
    /// Both required templates are present.
    pub complete: bool,
}

/// List theme directories under `themes_dir`, sorted by name.
///
/// A missing themes directory yields an empty list. Unreadable `theme.toml`
/// files are reported as default info rather than failing the listing.
pub fn list_themes(themes_dir: &Path) -> std::io::Result<Vec<ThemeEntry>> {
    if !themes_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<ThemeEntry> = fs::read_dir(themes_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter_map(|p| {
            let name = p.file_name()?.to_string_lossy().to_string();
            if name.starts_with('.') {
                return None;
            }
            let complete = p.join(BASE_TEMPLATE).is_file() && p.join(POST_TEMPLATE).is_file();
            let info = load_info(&p).unwrap_or_default();
            Some(ThemeEntry {
                name,
                info,
                complete,
            })
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
