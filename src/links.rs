//! External navigation links from `content/navi.txt`.
//!
//! One link per line, fields separated by `|`:
//!
//! ```text
//! # name | url | date
//! Exchange rates | https://example.com/rates/ | 2025.06.15
//! Word list | https://example.com/words/ | 2025.04.08
//! ```
//!
//! Blank lines and `#` comments are ignored. Lines without all three fields
//! are skipped with a warning. A missing file means no links.

use crate::content::NAVIGATION_FILE;
use maud::{Markup, html};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub name: String,
    pub url: String,
    pub date: String,
}

/// Parse the contents of a navigation file.
pub fn parse_links(text: &str) -> Vec<NavLink> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let link = parse_line(line);
            if link.is_none() {
                tracing::warn!(line = i + 1, text = line, "skipping malformed navigation line");
            }
            link
        })
        .collect()
}

fn parse_line(line: &str) -> Option<NavLink> {
    let mut parts = line.split('|').map(str::trim);
    let name = parts.next().filter(|s| !s.is_empty())?;
    let url = parts.next().filter(|s| !s.is_empty())?;
    let date = parts.next()?;
    Some(NavLink {
        name: name.to_string(),
        url: url.to_string(),
        date: date.to_string(),
    })
}

/// Read `navi.txt` from the content directory, if present.
pub fn load_links(content_dir: &Path) -> std::io::Result<Vec<NavLink>> {
    let path = content_dir.join(NAVIGATION_FILE);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path)?;
    Ok(parse_links(&text))
}

/// Render links for the `{{ navigation }}` placeholder.
///
/// Renders nothing at all when there are no links, so themes can place the
/// placeholder unconditionally.
pub fn render_links(links: &[NavLink]) -> Markup {
    html! {
        @if !links.is_empty() {
            div.external-nav {
                @for link in links {
                    a href=(link.url) target="_blank" rel="noopener" {
                        (link.name)
                        @if !link.date.is_empty() {
                            " (" (link.date) ")"
                        }
                    }
                }
            }
        }
    }
}
