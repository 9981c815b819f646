//! Content discovery and parsing.
//!
//! Reads the flat content directory and turns every `.txt` and `.md` file
//! into a [`Post`]. Nothing is cached between builds: posts are recomputed
//! from the files each time.
//!
//! ## File Format
//!
//! ```text
//! title: Hello World          ← title line ("title:" prefix optional)
//!                             ← blank separator
//! First paragraph of body.    ← body
//! date: 2024-01-01            ← metadata line, dropped
//! More body text.
//! ```
//!
//! - The title is the first non-empty line; a leading `title:` prefix is
//!   stripped case-insensitively.
//! - Every `date:` line is dropped wherever it appears. The post date always
//!   comes from the file's modification time.
//! - If no title line is found, the title falls back to the file name
//!   (`03.hello-world.txt` → "hello world").
//!
//! ## Ordering
//!
//! Posts are returned newest first by modification time. Equal timestamps
//! are ordered by file name ascending, so the result never depends on
//! directory enumeration order.
//!
//! ## Body Rendering
//!
//! - `.txt`: HTML-escaped and wrapped in `<pre class="post-body">` so line
//!   breaks and spacing survive.
//! - `.md`: rendered with pulldown-cmark. Inline HTML passes through.

use crate::naming::parse_entry_name;
use chrono::{DateTime, Local};
use maud::html;
use pulldown_cmark::{Event, Options, Parser, TagEnd, html as md_html};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output subdirectory holding post pages.
pub const POSTS_DIR: &str = "posts";

/// Content-directory file holding navigation links, never a post.
pub const NAVIGATION_FILE: &str = "navi.txt";

const WORDS_PER_MINUTE: usize = 200;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} is not valid UTF-8")]
    Decode(PathBuf),
    #[error("{first} and {second} would both be published as posts/{slug}.html")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("{path} would be published as posts/{slug}.html, which is a listing page; rename it")]
    ReservedSlug { slug: String, path: PathBuf },
}

/// Source format, from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFormat {
    Text,
    Markdown,
}

impl PostFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "md" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Settings that shape how posts are derived from their files.
#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub summary_length: usize,
    pub date_format: String,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            summary_length: 140,
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

/// One blog entry, derived from one content file.
#[derive(Debug, Clone)]
pub struct Post {
    /// Source file name, e.g. `03.hello-world.txt`
    pub file_name: String,
    /// File stem; unique across the content directory
    pub slug: String,
    /// Output-relative page path, e.g. `posts/03.hello-world.html`
    pub output_path: String,
    pub title: String,
    /// Modification time of the source file; the sort key
    pub modified: DateTime<Local>,
    /// `modified` formatted for display
    pub date: String,
    pub format: PostFormat,
    /// Body text after metadata stripping, as written
    pub body: String,
    /// Body rendered to HTML
    pub html: String,
    /// Body with markup removed
    pub plain_text: String,
    /// First `summary_length` characters of the plain text
    pub summary: String,
    pub word_count: usize,
    /// e.g. `3 min read`
    pub reading_time: String,
}

/// Title and body extracted from a content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSource {
    pub title: Option<String>,
    pub body: String,
}

/// Load every post in `dir`, newest first.
pub fn load_posts(dir: &Path, options: &ContentOptions) -> Result<Vec<Post>, ContentError> {
    if !dir.is_dir() {
        return Err(ContentError::MissingDirectory(dir.to_path_buf()));
    }

    let mut posts = Vec::new();
    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in content_files(dir)? {
        let post = load_post(&path, options)?;
        if is_listing_slug(&post.slug) {
            return Err(ContentError::ReservedSlug {
                slug: post.slug,
                path,
            });
        }
        if let Some(first) = seen.insert(post.slug.clone(), path.clone()) {
            return Err(ContentError::DuplicateSlug {
                slug: post.slug,
                first,
                second: path,
            });
        }
        tracing::debug!(file = %post.file_name, title = %post.title, "loaded post");
        posts.push(post);
    }

    // Files arrive sorted by name; the stable sort keeps that as the tie-break.
    posts.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(posts)
}

/// Stems the `posts/` listing writes to: `index`, `page2`, `page3`, ...
/// Compared case-insensitively since some filesystems are.
fn is_listing_slug(slug: &str) -> bool {
    let slug = slug.to_ascii_lowercase();
    slug == "index"
        || slug
            .strip_prefix("page")
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Content files directly in `dir`, sorted by file name.
fn content_files(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let read_err = |source| ContentError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        if name.starts_with('.') || name == NAVIGATION_FILE || !path.is_file() {
            continue;
        }
        if PostFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn load_post(path: &Path, options: &ContentOptions) -> Result<Post, ContentError> {
    let read_err = |source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    };
    let bytes = fs::read(path).map_err(read_err)?;
    let text = String::from_utf8(bytes).map_err(|_| ContentError::Decode(path.to_path_buf()))?;
    let modified: DateTime<Local> = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(read_err)?
        .into();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let slug = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let format = PostFormat::from_path(path).unwrap_or(PostFormat::Text);

    let parsed = parse_source(&text);
    let title = parsed
        .title
        .or_else(|| {
            let display = parse_entry_name(&slug).display_title;
            (!display.trim().is_empty()).then_some(display)
        })
        .unwrap_or_else(|| slug.clone());

    let (html, plain_text) = match format {
        PostFormat::Text => (render_text(&parsed.body), parsed.body.clone()),
        PostFormat::Markdown => (render_markdown(&parsed.body), markdown_plain_text(&parsed.body)),
    };
    let word_count = plain_text.split_whitespace().count();

    Ok(Post {
        output_path: format!("{POSTS_DIR}/{slug}.html"),
        file_name,
        slug,
        title,
        date: format_date(&modified, &options.date_format),
        modified,
        format,
        summary: summarize(&plain_text, options.summary_length),
        reading_time: reading_time(word_count),
        word_count,
        body: parsed.body,
        html,
        plain_text,
    })
}

/// Split raw file text into title and body, dropping metadata lines.
pub fn parse_source(text: &str) -> ParsedSource {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| strip_prefix_ci(line.trim_start(), "date:").is_none())
        .collect();

    let mut title = None;
    let mut body_start = lines.len();
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        let candidate = strip_prefix_ci(trimmed, "title:").unwrap_or(trimmed).trim();
        if !candidate.is_empty() {
            title = Some(candidate.to_string());
            body_start = i + 1;
            break;
        }
    }

    let body_lines: Vec<&str> = lines[body_start..]
        .iter()
        .copied()
        .skip_while(|line| line.trim().is_empty())
        .collect();

    ParsedSource {
        title,
        body: body_lines.join("\n").trim_end().to_string(),
    }
}

/// `Some(rest)` if `line` starts with `prefix`, ignoring ASCII case.
fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}

fn render_text(body: &str) -> String {
    html! { pre.post-body { (body) } }.into_string()
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES
}

fn render_markdown(body: &str) -> String {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new_ext(body, markdown_options()));
    out
}

/// Text content of a markdown document, one line per block.
pub fn markdown_plain_text(body: &str) -> String {
    let mut out = String::new();
    for event in Parser::new_ext(body, markdown_options()) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
    out.trim().to_string()
}

/// First `max` characters of `text` with whitespace collapsed.
pub fn summarize(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

pub fn reading_time(word_count: usize) -> String {
    let minutes = ((word_count + WORDS_PER_MINUTE / 2) / WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

/// Format with a strftime pattern, falling back to RFC 3339 if the pattern
/// is invalid.
pub fn format_date(date: &DateTime<Local>, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.to_rfc3339();
    }
    out
}
