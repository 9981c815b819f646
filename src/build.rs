//! Full site build.
//!
//! Every build starts from scratch: the output directory is deleted and
//! regenerated from the content directory and the theme. There is no cache
//! and no incremental mode; unchanged inputs (including file timestamps)
//! produce byte-identical output.
//!
//! ## Output Structure
//!
//! ```text
//! docs/
//! ├── index.html            # Listing, page 1 (base_path "")
//! ├── page2.html            # Listing, page 2 ...
//! ├── posts/
//! │   ├── index.html        # Listing of all posts, page 1 (base_path "../")
//! │   ├── page2.html
//! │   └── 03.hello.html     # One page per post (base_path "../")
//! ├── static/               # Theme static/ copied verbatim
//! │   └── js/search.js      # Built-in search script unless the theme ships one
//! ├── search-index.json
//! └── rss.xml
//! ```
//!
//! ## Page Assembly
//!
//! A post page renders `post.html` first, then wraps the result in
//! `base.html` as `{{ content }}`. Listing pages render `base.html`
//! directly. Each page's `{{ base_path }}` comes from its own depth in the
//! output tree, and every link to a post is `base_path + output_path`.
//!
//! ## Failure
//!
//! The theme, posts and navigation links are loaded before the output
//! directory is touched, so a broken theme or unreadable post leaves the
//! previous site in place. Any write failure after that aborts the build.
//! The search index is the exception: failing to write it is logged and
//! reported, and the build carries on without search.

use crate::config::{self, ConfigError, SiteConfig};
use crate::content::{self, ContentError, ContentOptions, POSTS_DIR, Post};
use crate::feed::{self, FeedError};
use crate::links::{self, NavLink};
use crate::paths;
use crate::search;
use crate::template::{self, Bindings, keys};
use crate::theme::{TemplateError, Theme};
use maud::{Markup, PreEscaped, html};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Could not write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not clean output directory {path}: {source}")]
    Clean {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not read navigation links in {path}: {source}")]
    Links {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("Theme error: {0}")]
    Template(#[from] TemplateError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("Output directory {output} would delete {protected}; choose a separate output directory")]
    OutputOverlap { output: PathBuf, protected: PathBuf },
}

/// Command-line overrides for directories and theme.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub content_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub themes_dir: Option<PathBuf>,
    pub theme: Option<String>,
}

/// Everything a build needs, with directories fully resolved.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub config: SiteConfig,
    /// Project root holding `config.toml`
    pub root: PathBuf,
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
    pub themes_dir: PathBuf,
    pub theme: String,
}

impl BuildOptions {
    /// Load `config.toml` from `root` and apply `overrides`.
    pub fn load(root: &Path, overrides: &Overrides) -> Result<Self, BuildError> {
        let config = config::load_config(root)?;
        Ok(Self::resolve(root, config, overrides))
    }

    /// Config directories are relative to `root`; overrides are used as given.
    pub fn resolve(root: &Path, config: SiteConfig, overrides: &Overrides) -> Self {
        let pick = |over: &Option<PathBuf>, configured: &str| {
            over.clone().unwrap_or_else(|| root.join(configured))
        };
        Self {
            content_dir: pick(&overrides.content_dir, &config.content_dir),
            output_dir: pick(&overrides.output_dir, &config.output_dir),
            themes_dir: pick(&overrides.themes_dir, &config.themes_dir),
            theme: overrides.theme.clone().unwrap_or_else(|| config.theme.clone()),
            root: root.to_path_buf(),
            config,
        }
    }

    /// The output directory is wiped on every build, so it must not be, or
    /// contain, the project root or a source directory.
    pub fn check_output_dir(&self) -> Result<(), BuildError> {
        let output = absolute_path(&self.output_dir);
        for protected in [&self.root, &self.content_dir, &self.themes_dir] {
            if absolute_path(protected).starts_with(&output) {
                return Err(BuildError::OutputOverlap {
                    output: self.output_dir.clone(),
                    protected: protected.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn content_options(&self) -> ContentOptions {
        ContentOptions {
            summary_length: self.config.summary_length,
            date_format: self.config.date_format.clone(),
        }
    }
}

/// Outcome of writing `search-index.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIndexStatus {
    Written { documents: usize },
    Failed(String),
}

/// What a build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub theme: String,
    pub output_dir: PathBuf,
    /// Post titles and their output paths, newest first.
    pub posts: Vec<(String, String)>,
    /// Output-relative paths of every listing page.
    pub listing_pages: Vec<String>,
    /// Files copied from the theme's `static/` directory.
    pub static_files: usize,
    /// The built-in search script was written because the theme lacks one.
    pub bundled_search_script: bool,
    pub search_index: SearchIndexStatus,
    pub feed_items: usize,
}

/// Values shared by every page of a build.
struct Site<'a> {
    config: &'a SiteConfig,
    theme: &'a Theme,
    navigation: String,
    output_dir: &'a Path,
}

/// Inputs of a build, loaded and validated without writing anything.
#[derive(Debug, Clone)]
pub struct SiteInventory {
    pub theme: Theme,
    pub posts: Vec<Post>,
    pub links: Vec<NavLink>,
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Load everything a build would read and report it.
pub fn check_site(options: &BuildOptions) -> Result<SiteInventory, BuildError> {
    options.check_output_dir()?;

    let theme = Theme::load(&options.themes_dir, &options.theme)?;
    tracing::info!(theme = theme.display_name(), "theme loaded");

    let posts = content::load_posts(&options.content_dir, &options.content_options())?;
    tracing::info!(count = posts.len(), dir = %options.content_dir.display(), "posts loaded");

    let links = load_nav_links(&options.content_dir)?;
    Ok(SiteInventory {
        theme,
        posts,
        links,
        content_dir: options.content_dir.clone(),
        output_dir: options.output_dir.clone(),
    })
}

/// Build the whole site described by `options`.
pub fn build_site(options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let SiteInventory {
        theme,
        posts,
        links: nav_links,
        ..
    } = check_site(options)?;

    clean_output(&options.output_dir)?;

    let (static_files, bundled_search_script) = copy_static(&theme, &options.output_dir)?;
    tracing::info!(files = static_files, "static assets copied");

    let site = Site {
        config: &options.config,
        theme: &theme,
        navigation: links::render_links(&nav_links).into_string(),
        output_dir: &options.output_dir,
    };

    for (i, post) in posts.iter().enumerate() {
        let newer = i.checked_sub(1).and_then(|j| posts.get(j));
        let older = posts.get(i + 1);
        site.write_post(post, newer, older)?;
    }
    tracing::info!(count = posts.len(), "post pages written");

    let mut listing_pages = site.write_listing(&posts, "", &options.config.title)?;
    listing_pages.extend(site.write_listing(&posts, POSTS_DIR, "All posts")?);
    tracing::info!(count = listing_pages.len(), "listing pages written");

    let search_index = write_search_index(&options.output_dir, &posts);

    let channel = feed::Channel {
        title: &options.config.title,
        link: &options.config.site_url,
        description: &options.config.description,
        language: &options.config.language,
    };
    let rss = channel.render(&posts, options.config.rss_items)?;
    write_output(&options.output_dir, feed::FEED_FILE, &rss)?;
    let feed_items = posts.len().min(options.config.rss_items);
    tracing::info!(items = feed_items, "feed written");

    Ok(BuildReport {
        theme: theme.display_name().to_string(),
        output_dir: options.output_dir.clone(),
        posts: posts
            .iter()
            .map(|p| (p.title.clone(), p.output_path.clone()))
            .collect(),
        listing_pages,
        static_files,
        bundled_search_script,
        search_index,
        feed_items,
    })
}

impl Site<'_> {
    fn bindings(&self, title: &str, base_path: &str) -> Bindings {
        Bindings::new()
            .with(keys::TITLE, title)
            .with(keys::BASE_PATH, base_path)
            .with(keys::SITE_TITLE, self.config.title.as_str())
            .with(keys::NAVIGATION, self.navigation.as_str())
    }

    fn write_post(
        &self,
        post: &Post,
        newer: Option<&Post>,
        older: Option<&Post>,
    ) -> Result<(), BuildError> {
        let base_path = paths::base_path_for(Path::new(&post.output_path));
        let body = html! {
            (PreEscaped(&post.html))
            (render_post_nav(newer, older, &base_path))
        };

        let mut bindings = self
            .bindings(&post.title, &base_path)
            .with(keys::DATE, post.date.as_str())
            .with(keys::READING_TIME, post.reading_time.as_str())
            .with(keys::WORD_COUNT, post.word_count.to_string())
            .with(keys::CONTENT, body.into_string());
        let inner = template::render(&self.theme.post_template, &bindings);
        bindings.set(keys::CONTENT, inner);
        let page = template::render(&self.theme.base_template, &bindings);

        tracing::debug!(path = %post.output_path, "writing post");
        write_output(self.output_dir, &post.output_path, &page)
    }

    /// Write every page of one listing; returns the paths written.
    fn write_listing(
        &self,
        posts: &[Post],
        dir: &str,
        title: &str,
    ) -> Result<Vec<String>, BuildError> {
        let per_page = self.config.posts_per_page.max(1);
        let pages: Vec<&[Post]> = if posts.is_empty() {
            vec![posts]
        } else {
            posts.chunks(per_page).collect()
        };
        let total = pages.len();

        let mut written = Vec::with_capacity(total);
        for (i, page_posts) in pages.into_iter().enumerate() {
            let number = i + 1;
            let path = match dir {
                "" => listing_file_name(number),
                dir => format!("{dir}/{}", listing_file_name(number)),
            };
            let base_path = paths::base_path_for(Path::new(&path));
            let page_title = if number == 1 {
                title.to_string()
            } else {
                format!("{title} - Page {number}")
            };

            let content = html! {
                (render_listing(page_posts, &base_path))
                (render_pagination(number, total))
            };
            let bindings = self
                .bindings(&page_title, &base_path)
                .with(keys::CONTENT, content.into_string());
            let page = template::render(&self.theme.base_template, &bindings);

            tracing::debug!(%path, posts = page_posts.len(), "writing listing page");
            write_output(self.output_dir, &path, &page)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// `index.html` for the first page, `pageN.html` after that.
pub fn listing_file_name(page: usize) -> String {
    if page <= 1 {
        "index.html".to_string()
    } else {
        format!("page{page}.html")
    }
}

fn render_listing(posts: &[Post], base_path: &str) -> Markup {
    html! {
        @if posts.is_empty() {
            p.no-posts { "No posts yet." }
        } @else {
            ul.post-list {
                @for post in posts {
                    li {
                        div.post-header {
                            a href={ (base_path) (post.output_path) } { (post.title) }
                            div.post-meta {
                                time { (post.date) }
                                " · "
                                span.reading-time { (post.reading_time) }
                            }
                        }
                        div.post-summary { (post.summary) }
                    }
                }
            }
        }
    }
}

/// Page links between siblings of one listing. Empty for a single page.
fn render_pagination(current: usize, total: usize) -> Markup {
    html! {
        @if total > 1 {
            nav.pagination {
                @if current > 1 {
                    a.page-link href=(listing_file_name(current - 1)) rel="prev" { "← Newer" }
                } @else {
                    span.page-link.disabled { "← Newer" }
                }
                span.page-numbers {
                    @for page in 1..=total {
                        @if page == current {
                            span.current-page { (page) }
                        } @else {
                            a.page-number href=(listing_file_name(page)) { (page) }
                        }
                    }
                }
                @if current < total {
                    a.page-link href=(listing_file_name(current + 1)) rel="next" { "Older →" }
                } @else {
                    span.page-link.disabled { "Older →" }
                }
            }
        }
    }
}

/// Links to the neighbouring posts in listing order.
fn render_post_nav(newer: Option<&Post>, older: Option<&Post>, base_path: &str) -> Markup {
    html! {
        nav.post-navigation {
            div.nav-previous {
                @if let Some(post) = newer {
                    a href={ (base_path) (post.output_path) } rel="prev" { "← " (post.title) }
                }
            }
            div.nav-next {
                @if let Some(post) = older {
                    a href={ (base_path) (post.output_path) } rel="next" { (post.title) " →" }
                }
            }
        }
    }
}

fn load_nav_links(content_dir: &Path) -> Result<Vec<NavLink>, BuildError> {
    let links = links::load_links(content_dir).map_err(|source| BuildError::Links {
        path: content_dir.join(content::NAVIGATION_FILE),
        source,
    })?;
    tracing::debug!(count = links.len(), "navigation links loaded");
    Ok(links)
}

/// `path` made absolute with `.` and `..` folded away. The longest existing
/// ancestor is canonicalized so symlinked spellings compare equal.
fn absolute_path(path: &Path) -> PathBuf {
    let joined = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut lexical = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    let mut rest = Vec::new();
    let mut existing = lexical.as_path();
    loop {
        if let Ok(real) = fs::canonicalize(existing) {
            return rest.iter().rev().fold(real, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return lexical,
        }
    }
}

/// Delete and recreate the output directory.
fn clean_output(dir: &Path) -> Result<(), BuildError> {
    let clean_err = |source| BuildError::Clean {
        path: dir.to_path_buf(),
        source,
    };
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(clean_err(e)),
    }
    fs::create_dir_all(dir).map_err(clean_err)
}

/// Copy the theme's `static/` tree into the output, then add the built-in
/// search script if the theme has none. Returns the number of files copied
/// and whether the script was added.
fn copy_static(theme: &Theme, output_dir: &Path) -> Result<(usize, bool), BuildError> {
    let mut copied = 0;
    match theme.static_dir() {
        Some(src) => {
            let dst = output_dir.join(crate::theme::STATIC_DIR);
            for entry in WalkDir::new(&src).sort_by_file_name() {
                let entry = entry.map_err(|e| BuildError::OutputWrite {
                    path: e.path().unwrap_or(&src).to_path_buf(),
                    source: e.into(),
                })?;
                let Ok(rel) = entry.path().strip_prefix(&src) else {
                    continue;
                };
                let target = dst.join(rel);
                let write_err = |source| BuildError::OutputWrite {
                    path: target.clone(),
                    source,
                };
                if entry.file_type().is_dir() {
                    fs::create_dir_all(&target).map_err(write_err)?;
                } else {
                    fs::copy(entry.path(), &target).map_err(write_err)?;
                    copied += 1;
                }
            }
        }
        None => tracing::warn!(theme = %theme.name, "theme has no static directory"),
    }

    let bundled = !output_dir.join(search::SEARCH_SCRIPT_PATH).exists();
    if bundled {
        write_output(output_dir, search::SEARCH_SCRIPT_PATH, search::SEARCH_SCRIPT)?;
    }
    Ok((copied, bundled))
}

fn write_search_index(output_dir: &Path, posts: &[Post]) -> SearchIndexStatus {
    let docs = search::build_documents(posts);
    let path = output_dir.join(search::SEARCH_INDEX_FILE);
    match search::write_search_index(&path, &docs) {
        Ok(()) => {
            tracing::info!(documents = docs.len(), "search index written");
            SearchIndexStatus::Written {
                documents: docs.len(),
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "search index not written; search will be unavailable");
            SearchIndexStatus::Failed(e.to_string())
        }
    }
}

/// Write `contents` to `output_dir/relative`, creating parent directories.
fn write_output(output_dir: &Path, relative: &str, contents: &str) -> Result<(), BuildError> {
    let path = output_dir.join(relative);
    let write_err = |source| BuildError::OutputWrite {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(&path, contents).map_err(write_err)
}
