//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each post is shown
//! by its position and title, with the source file and output path as
//! indented context lines. The listing reads as a content inventory while
//! still tracing every entry back to a file.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Theme: Minimal
//!
//! Posts
//! 001 Second → posts/02.second.html
//! 002 First → posts/01.first.html
//!
//! Listings
//!     index.html
//!     posts/index.html
//!
//! Static: 1 file, search script bundled
//! Search index: 2 documents → search-index.json
//! Feed: 2 items → rss.xml
//!
//! Built 2 posts, 2 listing pages into docs
//! ```
//!
//! ## Check
//!
//! ```text
//! Theme: Minimal (themes/minimal)
//!
//! Posts
//! 001 Second
//!     Source: 02.second.txt
//!     Date: 2024-05-01 10:00:00 · 212 words · 1 min read
//!
//! Links
//! 001 Word list → https://example.com/words/
//!
//! 1 post, 1 link, ready to build into docs
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::build::{BuildReport, SearchIndexStatus, SiteInventory};
use crate::feed::FEED_FILE;
use crate::search::SEARCH_INDEX_FILE;
use crate::theme::ThemeEntry;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 post`, `2 posts`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn display_dir(path: &Path) -> String {
    path.display().to_string()
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![format!("Theme: {}", report.theme), String::new()];

    lines.push("Posts".to_string());
    if report.posts.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, (title, path)) in report.posts.iter().enumerate() {
        lines.push(format!("{} {} \u{2192} {}", format_index(i + 1), title, path));
    }

    lines.push(String::new());
    lines.push("Listings".to_string());
    for page in &report.listing_pages {
        lines.push(format!("{}{}", indent(1), page));
    }

    lines.push(String::new());
    let mut static_line = format!("Static: {}", plural(report.static_files, "file"));
    if report.bundled_search_script {
        static_line.push_str(", search script bundled");
    }
    lines.push(static_line);
    lines.push(match &report.search_index {
        SearchIndexStatus::Written { documents } => format!(
            "Search index: {} \u{2192} {}",
            plural(*documents, "document"),
            SEARCH_INDEX_FILE
        ),
        SearchIndexStatus::Failed(reason) => {
            format!("Search index: not written ({reason}); search disabled")
        }
    });
    lines.push(format!(
        "Feed: {} \u{2192} {}",
        plural(report.feed_items, "item"),
        FEED_FILE
    ));

    lines.push(String::new());
    lines.push(format!(
        "Built {}, {} into {}",
        plural(report.posts.len(), "post"),
        plural(report.listing_pages.len(), "listing page"),
        display_dir(&report.output_dir)
    ));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(inventory: &SiteInventory) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Theme: {} ({})",
            inventory.theme.display_name(),
            display_dir(&inventory.theme.dir)
        ),
        String::new(),
        "Posts".to_string(),
    ];

    if inventory.posts.is_empty() {
        lines.push(format!(
            "{}(none in {})",
            indent(1),
            display_dir(&inventory.content_dir)
        ));
    }
    for (i, post) in inventory.posts.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), post.title));
        lines.push(format!("{}Source: {}", indent(1), post.file_name));
        lines.push(format!(
            "{}Date: {} \u{b7} {} \u{b7} {}",
            indent(1),
            post.date,
            plural(post.word_count, "word"),
            post.reading_time
        ));
    }

    if !inventory.links.is_empty() {
        lines.push(String::new());
        lines.push("Links".to_string());
        for (i, link) in inventory.links.iter().enumerate() {
            lines.push(format!(
                "{} {} \u{2192} {}",
                format_index(i + 1),
                link.name,
                link.url
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{}, {}, ready to build into {}",
        plural(inventory.posts.len(), "post"),
        plural(inventory.links.len(), "link"),
        display_dir(&inventory.output_dir)
    ));
    lines
}

pub fn print_check_output(inventory: &SiteInventory) {
    for line in format_check_output(inventory) {
        println!("{}", line);
    }
}

// ============================================================================
// Themes
// ============================================================================

/// One line per theme; the active one is starred.
///
/// ```text
/// * minimal  Minimal: Plain black on white
///   pixel
///   broken   (incomplete: needs templates/base.html and templates/post.html)
/// ```
pub fn format_themes(themes: &[ThemeEntry], active: &str) -> Vec<String> {
    if themes.is_empty() {
        return vec!["No themes found".to_string()];
    }

    let width = themes.iter().map(|t| t.name.chars().count()).max().unwrap_or(0);
    themes
        .iter()
        .map(|theme| {
            let marker = if theme.name == active { '*' } else { ' ' };
            let detail = if !theme.complete {
                "(incomplete: needs templates/base.html and templates/post.html)".to_string()
            } else {
                match (&theme.info.name, &theme.info.description) {
                    (Some(name), Some(desc)) => format!("{name}: {desc}"),
                    (Some(name), None) => name.clone(),
                    (None, Some(desc)) => desc.clone(),
                    (None, None) => String::new(),
                }
            };
            format!("{marker} {:<width$}  {detail}", theme.name)
                .trim_end()
                .to_string()
        })
        .collect()
}

pub fn print_themes(themes: &[ThemeEntry], active: &str) {
    for line in format_themes(themes, active) {
        println!("{}", line);
    }
}

// ============================================================================
// New post
// ============================================================================

pub fn format_new_post(path: &Path) -> Vec<String> {
    vec![format!("Created {}", path.display())]
}

pub fn print_new_post(path: &Path) {
    for line in format_new_post(path) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
