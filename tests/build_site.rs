//! End-to-end builds through the public API.

use plainblog::build::{BuildError, BuildOptions, Overrides, build_site};
use plainblog::content::ContentError;
use plainblog::search::{self, SearchDocument};
use plainblog::theme::TemplateError;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn copy_dir(src: &Path, dst: &Path) {
    fs::create_dir_all(dst).unwrap();
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// A project with the fixture theme and an empty content directory.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir(&fixtures.join("themes"), &tmp.path().join("themes"));
    fs::create_dir_all(tmp.path().join("content")).unwrap();
    tmp
}

fn post(root: &Path, name: &str, text: &str, secs: u64) {
    let path = root.join("content").join(name);
    fs::write(&path, text).unwrap();
    fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs))
        .unwrap();
}

fn options(root: &Path) -> BuildOptions {
    BuildOptions::load(root, &Overrides::default()).unwrap()
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join("docs").join(rel)).unwrap()
}

/// Every file under `dir` with its contents, sorted by path.
fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = walkdir::WalkDir::new(dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().display().to_string();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}

#[test]
fn newest_post_listed_first() {
    let tmp = project();
    post(tmp.path(), "a.txt", "First\n\nolder post", 100);
    post(tmp.path(), "b.txt", "Second\n\nnewer post", 200);

    build_site(&options(tmp.path())).unwrap();

    let index = read(tmp.path(), "index.html");
    let second = index.find(">Second<").unwrap();
    let first = index.find(">First<").unwrap();
    assert!(second < first, "newer post must come first");
}

#[test]
fn base_path_matches_page_depth() {
    let tmp = project();
    post(tmp.path(), "a.txt", "A\n\nbody", 100);

    build_site(&options(tmp.path())).unwrap();

    let index = read(tmp.path(), "index.html");
    assert!(index.contains(r#"href="static/css/style.css""#));
    assert!(index.contains(r#"href="posts/a.html""#));

    let page = read(tmp.path(), "posts/a.html");
    assert!(page.contains(r#"href="../static/css/style.css""#));
    assert!(page.contains(r#"data-base="../""#));

    let all = read(tmp.path(), "posts/index.html");
    assert!(all.contains(r#"href="../posts/a.html""#));
}

#[test]
fn rebuild_is_byte_identical() {
    let tmp = project();
    post(tmp.path(), "a.txt", "A\n\nalpha", 100);
    post(tmp.path(), "b.md", "B\n\n*beta*", 200);
    fs::write(tmp.path().join("content/navi.txt"), "Home | https://x.test | 2024\n").unwrap();

    let opts = options(tmp.path());
    build_site(&opts).unwrap();
    let before = snapshot(&opts.output_dir);
    build_site(&opts).unwrap();
    let after = snapshot(&opts.output_dir);

    assert_eq!(before, after);
}

#[test]
fn search_index_mirrors_posts() {
    let tmp = project();
    post(tmp.path(), "a.txt", "Cats\n\nabout cats", 100);
    post(tmp.path(), "b.md", "Dogs\n\nabout **dogs**", 200);

    build_site(&options(tmp.path())).unwrap();

    let docs = search::from_json(&read(tmp.path(), search::SEARCH_INDEX_FILE)).unwrap();
    assert_eq!(
        docs,
        vec![
            SearchDocument {
                id: "posts/b.html".into(),
                title: "Dogs".into(),
                content: "about dogs".into(),
            },
            SearchDocument {
                id: "posts/a.html".into(),
                title: "Cats".into(),
                content: "about cats".into(),
            },
        ]
    );
}

#[test]
fn listings_paginate() {
    let tmp = project();
    fs::write(tmp.path().join("config.toml"), "posts_per_page = 2\n").unwrap();
    for i in 0..3 {
        post(tmp.path(), &format!("p{i}.txt"), &format!("Post {i}"), 100 + i);
    }

    let report = build_site(&options(tmp.path())).unwrap();

    assert_eq!(
        report.listing_pages,
        vec!["index.html", "page2.html", "posts/index.html", "posts/page2.html"]
    );
    let index = read(tmp.path(), "index.html");
    assert!(index.contains(r#"href="page2.html""#));
    assert!(!index.contains("posts/p0.html"));
    assert!(read(tmp.path(), "page2.html").contains(r#"href="posts/p0.html""#));
    assert!(read(tmp.path(), "posts/page2.html").contains(r#"href="../posts/p0.html""#));
}

#[test]
fn empty_content_builds_empty_index() {
    let tmp = project();

    let report = build_site(&options(tmp.path())).unwrap();

    assert!(report.posts.is_empty());
    assert!(read(tmp.path(), "index.html").contains("No posts yet."));
    assert_eq!(read(tmp.path(), search::SEARCH_INDEX_FILE), "[]");
    assert!(!read(tmp.path(), "rss.xml").contains("<item>"));
}

#[test]
fn missing_template_fails_before_output() {
    let tmp = project();
    post(tmp.path(), "a.txt", "A", 100);
    fs::remove_file(tmp.path().join("themes/minimal/templates/post.html")).unwrap();

    let result = build_site(&options(tmp.path()));

    assert!(matches!(
        result,
        Err(BuildError::Template(TemplateError::Missing(_)))
    ));
    assert!(!tmp.path().join("docs").exists());
}

#[test]
fn post_named_like_a_listing_page_fails_the_build() {
    for name in ["index.txt", "page2.txt"] {
        let tmp = project();
        post(tmp.path(), "a.txt", "A\n\nbody", 100);
        post(tmp.path(), name, "My Index Post\n\nonly in this post", 200);

        let result = build_site(&options(tmp.path()));

        assert!(
            matches!(
                result,
                Err(BuildError::Content(ContentError::ReservedSlug { .. }))
            ),
            "{name} must not be overwritten by a listing page"
        );
        assert!(!tmp.path().join("docs").exists());
    }
}

#[test]
fn output_dir_over_content_keeps_sources() {
    let tmp = project();
    post(tmp.path(), "a.txt", "A\n\nbody", 100);
    fs::write(tmp.path().join("config.toml"), "output_dir = \"content\"\n").unwrap();

    let result = build_site(&options(tmp.path()));

    assert!(matches!(result, Err(BuildError::OutputOverlap { .. })));
    assert!(tmp.path().join("content/a.txt").is_file());
}

#[test]
fn theme_override_selects_theme() {
    let tmp = project();
    copy_dir(
        &tmp.path().join("themes/minimal"),
        &tmp.path().join("themes/other"),
    );
    fs::write(
        tmp.path().join("themes/other/templates/base.html"),
        "OTHER {{ content }}",
    )
    .unwrap();

    let overrides = Overrides {
        theme: Some("other".into()),
        ..Default::default()
    };
    let opts = BuildOptions::load(tmp.path(), &overrides).unwrap();
    build_site(&opts).unwrap();

    assert!(read(tmp.path(), "index.html").starts_with("OTHER "));
}

#[test]
fn sources_are_not_modified() {
    let tmp = project();
    let text = "title: Kept\n\nbody\ndate: 2024-01-01\n";
    post(tmp.path(), "a.txt", text, 100);

    build_site(&options(tmp.path())).unwrap();

    assert_eq!(fs::read_to_string(tmp.path().join("content/a.txt")).unwrap(), text);
}
