//! # plainblog
//!
//! A minimal static blog generator. Posts are plain-text (or markdown) files
//! in one flat directory; a theme supplies two HTML templates with
//! `{{ name }}` placeholders; the output is a directory of static pages that
//! works from any mount point.
//!
//! # Architecture
//!
//! A build is a single synchronous pass, recomputed from scratch every time:
//!
//! ```text
//! content/*.txt|md ──▶ content::load_posts ──▶ Vec<Post> (newest first)
//!                                                   │
//! themes/<name>/   ──▶ theme::Theme::load ──────────┤
//!                                                   ▼
//!                                           build::build_site
//!                                                   │
//!         ┌──────────────┬──────────────┬───────────┴──┬─────────────┐
//!         ▼              ▼              ▼              ▼             ▼
//!    posts/*.html   listing pages   static/     search-index.json  rss.xml
//! ```
//!
//! Reading happens before the output directory is touched; a bad theme or
//! post fails the build with the previous output still in place.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Discovers content files, extracts title and body, orders posts |
//! | [`template`] | Single-pass `{{ name }}` placeholder substitution |
//! | [`theme`] | Theme discovery, template loading, `theme.toml` metadata |
//! | [`paths`] | Relative `base_path` prefixes from output depth |
//! | [`build`] | Orchestrates a full build: pages, listings, assets, index, feed |
//! | [`search`] | Search index file, tantivy-backed query index, reader-side search session |
//! | [`feed`] | RSS 2.0 feed of the newest posts |
//! | [`links`] | External navigation links from `navi.txt` |
//! | [`config`] | `config.toml` loading, stock defaults, validation |
//! | [`naming`] | `NN.name` file-name convention and title slugs |
//! | [`new_post`] | Scaffolds numbered content files |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Modification Time Is the Date
//!
//! A post's date is its file's modification time; there is no front matter
//! to keep in sync. `date:` lines left over in a file are dropped from the
//! body and never parsed. Equal timestamps are ordered by file name so the
//! order never depends on how the filesystem enumerates entries.
//!
//! ## Opaque Templates
//!
//! Themes are plain HTML with placeholders, not a template language. Unbound
//! placeholders pass through untouched and substituted values are never
//! rescanned, so post text can't inject template syntax. Fragments the
//! builder generates itself (listings, pagination, navigation) are written
//! with [Maud](https://maud.lambda.xyz/) and escaped there.
//!
//! ## Relative Links Everywhere
//!
//! Every page links through its own `{{ base_path }}` (`""` at the root,
//! `"../"` one level down), so a site can be served from a subpath or opened
//! straight from disk.

pub mod build;
pub mod config;
pub mod content;
pub mod feed;
pub mod links;
pub mod naming;
pub mod new_post;
pub mod output;
pub mod paths;
pub mod search;
pub mod template;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_helpers;
