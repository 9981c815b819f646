//! Scaffolding for new content files.
//!
//! `plainblog new "Hello World"` writes `content/NN.hello-world.txt`, where
//! `NN` is one more than the highest number prefix already in the content
//! directory (zero-padded to two digits). The file starts with the title
//! line and a blank separator, ready for the body.

use crate::content::PostFormat;
use crate::naming::{next_number, slugify_title};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewPostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Post title cannot be empty")]
    EmptyTitle,
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
}

const TEXT_BODY: &str = "Write your post here.\n";

const MARKDOWN_BODY: &str = "\
Write your post here.

## A section

- a list item
- **bold** and *italic*
- [a link](https://example.com)
";

/// File name for the next post: `NN.slug.ext`.
pub fn new_post_file_name(number: u32, title: &str, format: PostFormat) -> String {
    let ext = match format {
        PostFormat::Text => "txt",
        PostFormat::Markdown => "md",
    };
    let slug = slugify_title(title);
    if slug.is_empty() {
        format!("{number:02}.{ext}")
    } else {
        format!("{number:02}.{slug}.{ext}")
    }
}

/// Create a new post file in `content_dir`; returns its path.
///
/// The content directory is created if missing. An existing file is never
/// overwritten.
pub fn create_post(
    content_dir: &Path,
    title: &str,
    format: PostFormat,
) -> Result<PathBuf, NewPostError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(NewPostError::EmptyTitle);
    }
    fs::create_dir_all(content_dir)?;

    let stems: Vec<String> = fs::read_dir(content_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("txt" | "md")))
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
        .collect();
    let number = next_number(stems.iter().map(String::as_str));

    let path = content_dir.join(new_post_file_name(number, title, format));
    let body = match format {
        PostFormat::Text => TEXT_BODY,
        PostFormat::Markdown => MARKDOWN_BODY,
    };

    let mut file = fs::File::options()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => NewPostError::AlreadyExists(path.clone()),
            _ => NewPostError::Io(e),
        })?;
    write!(file, "{title}\n\n{body}")?;

    tracing::debug!(path = %path.display(), "created post");
    Ok(path)
}
