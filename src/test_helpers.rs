//! Shared helpers for tests that need a content tree on disk.

use crate::config::BlogConfig;
use std::fs;
use std::path::Path;

/// A config with every path rooted under `root`, typically a tempdir.
pub fn test_config(root: &Path) -> BlogConfig {
    BlogConfig {
        base_url: "http://example.test".to_string(),
        content_dir: root.join("content/posts"),
        links_dir: root.join("content/links"),
        output_dir: root.join("public"),
        data_dir: root.join("data"),
        template: root.join("theme/main.html"),
        ..BlogConfig::default()
    }
}

/// Write a post with front matter into `dir`, creating it if needed.
pub fn write_post(
    dir: &Path,
    filename: &str,
    title: &str,
    date: &str,
    status: Option<&str>,
    body: &str,
) {
    fs::create_dir_all(dir).unwrap();
    let status_line = status.map(|s| format!("status: {s}\n")).unwrap_or_default();
    let content = format!("---\ntitle: {title}\ndate: {date}\n{status_line}---\n{body}");
    fs::write(dir.join(filename), content).unwrap();
}

/// Write a two-line external-link stub into `dir`.
pub fn write_link(dir: &Path, filename: &str, title: &str, url: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(filename), format!("# {title}\n{url}\n")).unwrap();
}
