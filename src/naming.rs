//! File-name conventions for content files.
//!
//! Content files are conventionally named `NN.name.txt` (the form `new`
//! produces), although any stem works. The stem is the post's slug and
//! therefore its URL: `03.hello-world.txt` is published as
//! `posts/03.hello-world.html`. The number prefix carries no ordering
//! meaning (posts are ordered by modification time); it only keeps the
//! content directory tidy and slugs unique.
//!
//! ## Display titles
//!
//! When a file has no usable title line, the display title falls back to
//! the name part with dashes converted to spaces:
//! - `03.hello-world` → "hello world"
//! - `010-Notes` → "Notes"
//! - `draft` → "draft"

/// Result of parsing a content file stem like `03.hello-world`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `3` from `03.hello-world`)
    pub number: Option<u32>,
    /// Raw name part after the prefix, dashes preserved. Empty if number-only.
    /// For unnumbered stems, this is the full input.
    pub name: String,
    /// Display title: name with dashes converted to spaces.
    pub display_title: String,
}

/// Parse a file stem following the `NN.name` (or `NN-name`) convention.
///
/// - `"03.hello-world"` → number=Some(3), name="hello-world", display_title="hello world"
/// - `"010-Notes"` → number=Some(10), name="Notes", display_title="Notes"
/// - `"07"` → number=Some(7), name="", display_title=""
/// - `"draft-ideas"` → number=None, name="draft-ideas", display_title="draft ideas"
pub fn parse_entry_name(stem: &str) -> ParsedName {
    if let Some(sep) = stem.find(['.', '-']) {
        let prefix = &stem[..sep];
        if let Ok(num) = prefix.parse::<u32>() {
            let raw = &stem[sep + 1..];
            return ParsedName {
                number: Some(num),
                name: raw.to_string(),
                display_title: raw.replace('-', " "),
            };
        }
    }
    if let Ok(num) = stem.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
            display_title: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: stem.to_string(),
        display_title: stem.replace('-', " "),
    }
}

const MAX_SLUG_LEN: usize = 80;

/// Turn a post title into the name part of a new content file.
///
/// - Lowercases
/// - Replaces runs of anything that isn't alphanumeric with a single dash
/// - Strips leading and trailing dashes
/// - Truncates to `MAX_SLUG_LEN` characters (breaks at last dash before limit)
///
/// Non-ASCII letters are kept, so CJK titles still produce readable slugs.
pub fn slugify_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut prev_dash = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }

    let trimmed = slug.trim_matches('-');
    if trimmed.chars().count() <= MAX_SLUG_LEN {
        return trimmed.to_string();
    }
    let truncated: String = trimmed.chars().take(MAX_SLUG_LEN).collect();
    match truncated.rfind('-') {
        Some(pos) => truncated[..pos].to_string(),
        None => truncated,
    }
}

/// Next free number prefix given the stems already in the content directory.
pub fn next_number<'a>(stems: impl IntoIterator<Item = &'a str>) -> u32 {
    stems
        .into_iter()
        .filter_map(|stem| parse_entry_name(stem).number)
        .max()
        .map_or(1, |n| n + 1)
}
