//! Relative path prefixes for generated pages.
//!
//! Every page links to assets and other pages relative to itself, so the
//! site works from any mount point (a project subpath on a static host, a
//! local `file://` checkout). A page nested `depth` directories under the
//! output root prefixes its links with `base_path(depth)`:
//!
//! ```text
//! index.html          depth 0   ""
//! posts/hello.html    depth 1   "../"
//! a/b/page.html       depth 2   "../../"
//! ```

use std::path::{Component, Path};

/// Link prefix for a page `depth` directories below the output root.
pub fn base_path(depth: usize) -> String {
    "../".repeat(depth)
}

/// Nesting depth of an output-relative file path.
///
/// Counts the directory components in front of the file name. Only normal
/// components count, so `./index.html` is still at depth 0.
pub fn depth_of(relative_path: &Path) -> usize {
    relative_path
        .parent()
        .map(|dir| {
            dir.components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0)
}

/// `base_path` for an output-relative file path.
pub fn base_path_for(relative_path: &Path) -> String {
    base_path(depth_of(relative_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_empty_prefix() {
        assert_eq!(base_path(0), "");
    }

    #[test]
    fn one_level_deep() {
        assert_eq!(base_path(1), "../");
    }

    #[test]
    fn two_levels_deep() {
        assert_eq!(base_path(2), "../../");
    }

    #[test]
    fn depth_of_root_file() {
        assert_eq!(depth_of(Path::new("index.html")), 0);
        assert_eq!(depth_of(Path::new("./index.html")), 0);
    }

    #[test]
    fn depth_of_nested_files() {
        assert_eq!(depth_of(Path::new("posts/hello.html")), 1);
        assert_eq!(depth_of(Path::new("posts/2024/hello.html")), 2);
    }

    #[test]
    fn base_path_for_matches_depth() {
        assert_eq!(base_path_for(Path::new("page2.html")), "");
        assert_eq!(base_path_for(Path::new("posts/page2.html")), "../");
    }
}
