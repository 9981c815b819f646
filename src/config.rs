//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives at
//! the project root (next to `content/` and `themes/`); stock defaults are
//! overridden by whatever keys it sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "My Blog"                  # Site title (listing pages, RSS)
//! description = "A simple blog"      # RSS channel description
//! site_url = "https://example.com"   # Absolute URL of the output root (RSS links)
//! language = "en"                    # RSS channel language
//!
//! posts_per_page = 10                # Posts per listing page
//! summary_length = 140               # Characters of body shown in listings
//! rss_items = 10                     # Posts included in rss.xml
//! date_format = "%Y-%m-%d %H:%M:%S"  # strftime-style display format
//!
//! content_dir = "content"            # Source .txt/.md files
//! output_dir = "docs"                # Generated site (deleted on every build)
//! themes_dir = "themes"              # Theme directories
//! theme = "minimal"                  # Theme used when --theme is not given
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! title = "Notes from the shed"
//! posts_per_page = 5
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, used for listing pages and the RSS channel.
    pub title: String,
    /// Short description for the RSS channel.
    pub description: String,
    /// Absolute URL of the published output root, without trailing slash.
    pub site_url: String,
    /// Language code for the RSS channel.
    pub language: String,
    /// Number of posts per listing page.
    pub posts_per_page: usize,
    /// Characters of plain body text shown as a listing summary.
    pub summary_length: usize,
    /// Number of newest posts included in `rss.xml`.
    pub rss_items: usize,
    /// Display format for post dates (chrono strftime syntax).
    pub date_format: String,
    /// Directory holding the content files, relative to the project root.
    pub content_dir: String,
    /// Directory the site is generated into, relative to the project root.
    pub output_dir: String,
    /// Directory holding themes, relative to the project root.
    pub themes_dir: String,
    /// Theme used when none is given on the command line.
    pub theme: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: "A simple blog".to_string(),
            site_url: "https://example.com".to_string(),
            language: "en".to_string(),
            posts_per_page: 10,
            summary_length: 140,
            rss_items: 10,
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
            content_dir: "content".to_string(),
            output_dir: "docs".to_string(),
            themes_dir: "themes".to_string(),
            theme: "minimal".to_string(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.posts_per_page == 0 {
            return Err(ConfigError::Validation(
                "posts_per_page must be at least 1".into(),
            ));
        }
        if self.summary_length == 0 {
            return Err(ConfigError::Validation(
                "summary_length must be at least 1".into(),
            ));
        }
        if self.rss_items == 0 {
            return Err(ConfigError::Validation(
                "rss_items must be at least 1".into(),
            ));
        }
        if self.date_format.trim().is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(ConfigError::Validation(format!(
                "date_format '{}' is not a valid strftime format",
                self.date_format
            )));
        }
        if self.theme.trim().is_empty() {
            return Err(ConfigError::Validation("theme must not be empty".into()));
        }
        for (key, value) in [
            ("content_dir", &self.content_dir),
            ("output_dir", &self.output_dir),
            ("themes_dir", &self.themes_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# plainblog configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
# Site title, shown on listing pages and in the RSS channel.
title = "My Blog"

# Short description for the RSS channel.
description = "A simple blog"

# Absolute URL where the output directory is published (no trailing slash).
# Only used for links inside rss.xml; pages link to each other relatively.
site_url = "https://example.com"

# Language code for the RSS channel.
language = "en"

# ---------------------------------------------------------------------------
# Listings
# ---------------------------------------------------------------------------
# Posts per listing page (index.html, page2.html, ...).
posts_per_page = 10

# Characters of plain body text shown under each listed post.
summary_length = 140

# Newest posts included in rss.xml.
rss_items = 10

# Display format for post dates, derived from file modification time.
date_format = "%Y-%m-%d %H:%M:%S"

# ---------------------------------------------------------------------------
# Directories (relative to the project root)
# ---------------------------------------------------------------------------
content_dir = "content"

# Deleted and regenerated on every build.
output_dir = "docs"

themes_dir = "themes"

# Theme used when --theme / BLOG_THEME is not given.
theme = "minimal"
"##
}
