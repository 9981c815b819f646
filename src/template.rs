//! Placeholder substitution for theme templates.
//!
//! Theme templates are opaque HTML files containing `{{ name }}`
//! placeholders. The builder supplies a [`Bindings`] map per page and
//! [`render`] substitutes each bound placeholder with its value.
//!
//! ## Rules
//!
//! - Placeholder syntax is `{{ name }}`; whitespace inside the braces is
//!   optional (`{{name}}` works too).
//! - Placeholders without a binding are left in the output verbatim. Themes
//!   can therefore carry placeholders a given page type doesn't fill.
//! - Rendering is single-pass: substituted values are never scanned again,
//!   so post content that happens to contain `{{ title }}` stays literal.
//! - No HTML escaping happens here. Values are inserted as-is; content is
//!   trusted operator input, and anything that needs escaping is escaped by
//!   whoever produced the value.

use std::collections::BTreeMap;

/// Placeholder names the builder binds.
pub mod keys {
    /// Page or post title.
    pub const TITLE: &str = "title";
    /// Main HTML body.
    pub const CONTENT: &str = "content";
    /// Display date of a post.
    pub const DATE: &str = "date";
    /// Relative prefix back to the output root (`""`, `"../"`, ...).
    pub const BASE_PATH: &str = "base_path";
    /// Site title from `config.toml`.
    pub const SITE_TITLE: &str = "site_title";
    /// External navigation links from `navi.txt`.
    pub const NAVIGATION: &str = "navigation";
    /// Estimated reading time of a post, e.g. `3 min read`.
    pub const READING_TIME: &str = "reading_time";
    /// Word count of a post.
    pub const WORD_COUNT: &str = "word_count";
}

/// Mapping from placeholder name to replacement text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Builder-style [`Bindings::set`].
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Substitute every bound `{{ name }}` placeholder in `template`.
pub fn render(template: &str, bindings: &Bindings) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            // Unterminated; emit the remainder untouched.
            out.push_str(&rest[start..]);
            return out;
        };

        let name = after_open[..end].trim();
        if name.contains(OPEN) {
            // `{{ {{ title }}`: the outer braces are literal text.
            out.push_str(OPEN);
            rest = after_open;
            continue;
        }
        let placeholder_len = OPEN.len() + end + CLOSE.len();
        match bindings.get(name) {
            Some(value) if is_placeholder_name(name) => out.push_str(value),
            _ => out.push_str(&rest[start..start + placeholder_len]),
        }
        rest = &rest[start + placeholder_len..];
    }

    out.push_str(rest);
    out
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_placeholders_pass_through() {
        let bindings = Bindings::new().with(keys::TITLE, "Hi");
        assert_eq!(render("{{ title }}{{ unknown }}", &bindings), "Hi{{ unknown }}");
    }

    #[test]
    fn substitutes_all_occurrences() {
        let bindings = Bindings::new().with(keys::TITLE, "T");
        assert_eq!(
            render("<title>{{ title }}</title><h1>{{ title }}</h1>", &bindings),
            "<title>T</title><h1>T</h1>"
        );
    }

    #[test]
    fn whitespace_inside_braces_is_optional() {
        let bindings = Bindings::new().with(keys::BASE_PATH, "../");
        assert_eq!(
            render("{{base_path}}a {{  base_path  }}b", &bindings),
            "../a ../b"
        );
    }

    #[test]
    fn values_are_not_rescanned() {
        let bindings = Bindings::new()
            .with(keys::CONTENT, "literal {{ title }}")
            .with(keys::TITLE, "X");
        assert_eq!(
            render("{{ content }}", &bindings),
            "literal {{ title }}"
        );
    }

    #[test]
    fn values_are_not_escaped() {
        let bindings = Bindings::new().with(keys::CONTENT, "<p>a & b</p>");
        assert_eq!(render("{{ content }}", &bindings), "<p>a & b</p>");
    }

    #[test]
    fn unterminated_placeholder_is_left_alone() {
        let bindings = Bindings::new().with(keys::TITLE, "T");
        assert_eq!(render("{{ title }} and {{ title", &bindings), "T and {{ title");
    }

    #[test]
    fn stray_open_braces_before_placeholder() {
        let bindings = Bindings::new().with(keys::TITLE, "T");
        assert_eq!(render("{{ {{ title }}", &bindings), "{{ T");
    }

    #[test]
    fn plain_braces_survive() {
        let bindings = Bindings::new().with(keys::TITLE, "T");
        let css = "body { color: red; } {{ title }}";
        assert_eq!(render(css, &bindings), "body { color: red; } T");
    }

    #[test]
    fn empty_binding_removes_placeholder() {
        let bindings = Bindings::new().with(keys::BASE_PATH, "");
        assert_eq!(
            render(r#"<link href="{{ base_path }}static/style.css">"#, &bindings),
            r#"<link href="static/style.css">"#
        );
    }

    #[test]
    fn set_overrides_previous_value() {
        let mut bindings = Bindings::new();
        bindings.set(keys::TITLE, "old").set(keys::TITLE, "new");
        assert_eq!(bindings.get(keys::TITLE), Some("new"));
    }
}
