//! Shared test utilities for the plainblog test suite.
//!
//! Provides fixture setup, content and theme writers with controlled
//! modification times, and lookup helpers over loaded posts.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_post(tmp.path(), "01.first.txt", "First\n\nbody", 100);
//! write_post(tmp.path(), "02.second.txt", "Second\n\nbody", 200);
//!
//! let posts = load_posts(tmp.path(), &ContentOptions::default()).unwrap();
//! assert_eq!(titles(&posts), vec!["Second", "First"]);
//! ```

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use crate::content::{Post, PostFormat, format_date, reading_time};
use chrono::{Local, TimeZone};

/// Modification times written by [`write_post`] are offsets from this.
pub const BASE_MTIME: u64 = 1_700_000_000;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Writers
// =========================================================================

/// Write a content file and set its modification time to
/// `BASE_MTIME + offset` seconds. Larger offsets are newer posts.
pub fn write_post(dir: &Path, name: &str, text: &str, offset: u64) {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    set_mtime(&path, offset);
}

/// Set a file's modification time to `BASE_MTIME + offset` seconds.
pub fn set_mtime(path: &Path, offset: u64) {
    let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(BASE_MTIME + offset);
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

/// Write a complete theme `name` under `themes_dir`.
///
/// `base.html` uses every shared placeholder; `post.html` shows date and
/// reading time; `static/` holds a single stylesheet.
pub fn write_theme(themes_dir: &Path, name: &str) {
    let dir = themes_dir.join(name);
    fs::create_dir_all(dir.join("templates")).unwrap();
    fs::create_dir_all(dir.join("static/css")).unwrap();
    fs::write(
        dir.join("templates/base.html"),
        concat!(
            "<!DOCTYPE html>\n",
            "<html>\n<head>\n",
            "<title>{{ title }}</title>\n",
            "<link rel=\"stylesheet\" href=\"{{ base_path }}static/css/style.css\">\n",
            "</head>\n<body>\n",
            "<header><a href=\"{{ base_path }}index.html\">{{ site_title }}</a>{{ navigation }}</header>\n",
            "<main>{{ content }}</main>\n",
            "<script src=\"{{ base_path }}static/js/search.js\" data-base=\"{{ base_path }}\"></script>\n",
            "</body>\n</html>\n",
        ),
    )
    .unwrap();
    fs::write(
        dir.join("templates/post.html"),
        concat!(
            "<article>\n<h1>{{ title }}</h1>\n",
            "<p class=\"meta\">{{ date }} · {{ reading_time }} · {{ word_count }} words</p>\n",
            "{{ content }}\n</article>\n",
        ),
    )
    .unwrap();
    fs::write(dir.join("static/css/style.css"), "body { margin: 0; }\n").unwrap();
}

/// A text post built in memory, dated `timestamp` (Unix seconds).
pub fn sample_post(slug: &str, title: &str, timestamp: i64) -> Post {
    let modified = Local.timestamp_opt(timestamp, 0).unwrap();
    let body = format!("Body of {title}.");
    let word_count = body.split_whitespace().count();
    Post {
        file_name: format!("{slug}.txt"),
        slug: slug.to_string(),
        output_path: format!("posts/{slug}.html"),
        title: title.to_string(),
        date: format_date(&modified, "%Y-%m-%d %H:%M:%S"),
        modified,
        format: PostFormat::Text,
        html: format!("<pre class=\"post-body\">{body}</pre>"),
        plain_text: body.clone(),
        summary: body.clone(),
        word_count,
        reading_time: reading_time(word_count),
        body,
    }
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a post by title. Panics if not found.
pub fn find_post<'a>(posts: &'a [Post], title: &str) -> &'a Post {
    posts.iter().find(|p| p.title == title).unwrap_or_else(|| {
        panic!("post '{title}' not found. Available: {:?}", titles(posts))
    })
}

/// All post titles in order.
pub fn titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}
