//! Static site generation.
//!
//! Turns the content tree into a publishable site:
//!
//! ```text
//! content/posts/001--hello.md   ->  public/posts/hello.html
//! content/links/002--talk.txt   ->  public/talk.html (meta-refresh stub)
//!                                   public/index.html
//!                                   public/sitemap.xml
//! ```
//!
//! Pages are rendered through a user-editable template file with
//! `<!-- #PLACEHOLDER# -->` markers; a missing template is provisioned once
//! from the built-in default and is the user's to edit afterwards. Inner
//! fragments (article wrapper, index list, navigation) are built with
//! [maud](https://maud.lambda.xyz/) so titles and dates are escaped.
//!
//! Generation is incremental: a post whose output is newer than its source
//! is left untouched, byte for byte. The index and sitemap are always
//! rebuilt from the full content scan, so a skipped post still appears in
//! both. Only one generation run may touch an output directory at a time; a
//! second runner fails fast with [`GenerateError::InProgress`].
//!
//! All page writes go through a temp-file-then-rename so a crash mid-write
//! never leaves a truncated page being served.

use crate::config::BlogConfig;
use crate::frontmatter;
use crate::markdown;
use crate::naming;
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use maud::{Markup, PreEscaped, html};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Built-in page template, written next to the config on first run.
const DEFAULT_TEMPLATE: &str = include_str!("../static/default-template.html");

/// Lock file guarding an output directory against concurrent runs.
const LOCK_FILENAME: &str = ".penpress.lock";

/// A run lock older than this is presumed left over from a crash.
const LOCK_STALE_AFTER: Duration = Duration::from_secs(15 * 60);

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Template not found: {0}")]
    TemplateMissing(PathBuf),
    #[error("Another generation run is in progress (lock: {0})")]
    InProgress(PathBuf),
}

/// Counts for one generation run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Articles published (rendered or already fresh).
    pub articles: u32,
    /// Link stubs published.
    pub links: u32,
    /// Entries whose output was already up to date.
    pub skipped: u32,
    /// Draft posts held back.
    pub drafts: u32,
    /// Entries that failed to render or write.
    pub failed: u32,
}

impl fmt::Display for GenerateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} articles, {} links", self.articles, self.links)?;
        if self.skipped > 0 {
            write!(f, ", {} unchanged", self.skipped)?;
        }
        if self.drafts > 0 {
            write!(f, ", {} drafts", self.drafts)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}

/// One row of the published index, articles and links alike.
#[derive(Debug)]
struct IndexEntry {
    title: String,
    href: String,
    date_text: Option<String>,
    teaser_html: Option<String>,
    has_more: bool,
    order: u64,
    /// Sitemap location; differs from `href` for external links, whose
    /// index row points at the target but whose sitemap row points at the
    /// local redirect stub.
    sitemap_url: String,
}

/// Generate the whole site. With `force` every page is rewritten even when
/// its output is newer than the source.
pub fn generate(config: &BlogConfig, force: bool) -> Result<GenerateSummary, GenerateError> {
    fs::create_dir_all(&config.output_dir)?;
    let _lock = RunLock::acquire(config.output_dir.join(LOCK_FILENAME))?;

    let template = load_template(config)?;
    let mut summary = GenerateSummary::default();
    let mut entries: Vec<IndexEntry> = Vec::new();

    for path in list_sources(&config.content_dir, "md")? {
        if let Some(entry) = publish_article(config, &template, &path, force, &mut summary) {
            entries.push(entry);
        }
    }

    for path in list_sources(&config.links_dir, "txt")? {
        if let Some(entry) = publish_link(config, &template, &path, force, &mut summary) {
            entries.push(entry);
        }
    }

    entries.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.title.cmp(&b.title)));

    let index = render_page(
        config,
        &template,
        &config.site_name,
        &render_index(&entries).into_string(),
        "",
    );
    write_atomic(&config.output_dir.join("index.html"), index.as_bytes())?;

    let sitemap = render_sitemap(config, &entries);
    write_atomic(&config.output_dir.join("sitemap.xml"), sitemap.as_bytes())?;

    info!("generated site at {}: {}", config.output_dir.display(), summary);
    Ok(summary)
}

/// Source files of one extension, sorted by name for a stable run order.
fn list_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, GenerateError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().map(|e| e == extension).unwrap_or(false)
                && !path
                    .file_name()
                    .map(|n| n.to_string_lossy().starts_with('.'))
                    .unwrap_or(true)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Render one article, or skip it when its output is fresh. Returns its
/// index entry, or `None` when the post must not appear (draft or failed).
fn publish_article(
    config: &BlogConfig,
    template: &str,
    path: &Path,
    force: bool,
    summary: &mut GenerateSummary,
) -> Option<IndexEntry> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("skipping {}: {e}", path.display());
            summary.failed += 1;
            return None;
        }
    };
    let (metadata, body) = frontmatter::parse(&raw);
    let parsed = naming::parse_entry_name(&file_stem(path));
    let out_path = config
        .output_dir
        .join("posts")
        .join(format!("{}.html", parsed.base));

    if frontmatter::is_draft(&metadata) {
        // A post pulled back to draft loses its published page.
        if out_path.exists() {
            if let Err(e) = fs::remove_file(&out_path) {
                warn!("could not remove stale {}: {e}", out_path.display());
            }
        }
        summary.drafts += 1;
        return None;
    }

    let title = metadata
        .get("title")
        .cloned()
        .or_else(|| markdown::first_heading(&body))
        .unwrap_or_else(|| parsed.base.clone());
    let date_text = metadata.get("date").map(|d| format_date(config, d));
    let (teaser, has_more) = markdown::split_teaser(&body);

    if force || needs_regen(path, &out_path) {
        let content = render_article(&title, date_text.as_deref(), &markdown::render(&body));
        let nav = render_nav(config).into_string();
        let page = render_page(config, template, &title, &content.into_string(), &nav);
        if let Err(e) = write_atomic(&out_path, page.as_bytes()) {
            warn!("failed to write {}: {e}", out_path.display());
            summary.failed += 1;
            return None;
        }
        info!("published {}", out_path.display());
    } else {
        summary.skipped += 1;
    }

    summary.articles += 1;
    let href = format!("posts/{}.html", parsed.base);
    Some(IndexEntry {
        title,
        sitemap_url: format!("{}/{}", config.base_url_trimmed(), href),
        href,
        date_text,
        teaser_html: Some(markdown::render(teaser)),
        has_more,
        order: parsed.sort_key(),
    })
}

/// Publish one external-link stub: a local meta-refresh page plus an index
/// row pointing straight at the target.
fn publish_link(
    config: &BlogConfig,
    template: &str,
    path: &Path,
    force: bool,
    summary: &mut GenerateSummary,
) -> Option<IndexEntry> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("skipping {}: {e}", path.display());
            summary.failed += 1;
            return None;
        }
    };
    let Some((title, url)) = parse_link_stub(&raw) else {
        warn!("skipping malformed link stub {}", path.display());
        summary.failed += 1;
        return None;
    };

    let parsed = naming::parse_entry_name(&file_stem(path));
    let out_path = config.output_dir.join(format!("{}.html", parsed.base));

    if force || needs_regen(path, &out_path) {
        let content = render_redirect_body(&title, &url).into_string();
        let nav = render_nav(config).into_string();
        let mut page = render_page(config, template, &title, &content, &nav);
        page = inject_into_head(
            &page,
            &format!(
                "    <meta http-equiv=\"refresh\" content=\"0;url={}\">\n",
                html_escape(&url)
            ),
        );
        if let Err(e) = write_atomic(&out_path, page.as_bytes()) {
            warn!("failed to write {}: {e}", out_path.display());
            summary.failed += 1;
            return None;
        }
        info!("published {}", out_path.display());
    } else {
        summary.skipped += 1;
    }

    summary.links += 1;
    Some(IndexEntry {
        title,
        href: url,
        date_text: None,
        teaser_html: None,
        has_more: false,
        order: parsed.sort_key(),
        sitemap_url: format!("{}/{}.html", config.base_url_trimmed(), parsed.base),
    })
}

/// A link stub is two lines: `# Title` then an absolute http(s) URL.
fn parse_link_stub(raw: &str) -> Option<(String, String)> {
    let mut lines = raw.lines();
    let title = lines.next()?.strip_prefix("# ")?.trim();
    let url = lines.next()?.trim();
    if title.is_empty() || !(url.starts_with("http://") || url.starts_with("https://")) {
        return None;
    }
    Some((title.to_string(), url.to_string()))
}

/// Output must be rebuilt when absent or older than its source.
fn needs_regen(source: &Path, output: &Path) -> bool {
    let Some(out_mtime) = mtime(output) else {
        return true;
    };
    match mtime(source) {
        Some(src_mtime) => out_mtime < src_mtime,
        None => true,
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reformat a `YYYY-MM-DD` front matter date per config; anything else is
/// shown as written.
fn format_date(config: &BlogConfig, date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format(&config.date_format).to_string(),
        Err(_) => date.to_string(),
    }
}

/// Load the page template, provisioning the built-in default on first run.
/// A template path whose parent cannot be created surfaces as IO; a path
/// that exists but is unreadable surfaces as missing.
fn load_template(config: &BlogConfig) -> Result<String, GenerateError> {
    if !config.template.exists() {
        if let Some(parent) = config.template.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config.template, DEFAULT_TEMPLATE)?;
        info!("provisioned default template at {}", config.template.display());
    }
    fs::read_to_string(&config.template)
        .map_err(|_| GenerateError::TemplateMissing(config.template.clone()))
}

/// Fill the template placeholders and inject the head metadata.
fn render_page(
    config: &BlogConfig,
    template: &str,
    title: &str,
    content_html: &str,
    nav_html: &str,
) -> String {
    let now = Utc::now();
    let mut page = template
        .replace("<!-- #TITLE# -->", &html_escape(title))
        .replace("<!-- #SITE_NAME# -->", &html_escape(&config.site_name))
        .replace("<!-- #BASE_URL# -->", config.base_url_trimmed())
        .replace("<!-- #CONTENT# -->", content_html)
        .replace("<!-- #NAVIGATION# -->", nav_html)
        .replace("<!-- #YEAR# -->", &now.format("%Y").to_string());

    if !config.language.is_empty() {
        page = page.replacen(
            "<html>",
            &format!("<html lang=\"{}\">", html_escape(&config.language)),
            1,
        );
    }
    inject_into_head(
        &page,
        &format!(
            "    <meta name=\"generator\" content=\"penpress\">\n    <meta name=\"last-updated\" content=\"{}\">\n",
            now.format("%Y-%m-%d %H:%M:%S")
        ),
    )
}

/// Insert a fragment just before `</head>`; templates without a head get
/// the page back unchanged.
fn inject_into_head(page: &str, fragment: &str) -> String {
    match page.find("</head>") {
        Some(pos) => {
            let mut out = String::with_capacity(page.len() + fragment.len());
            out.push_str(&page[..pos]);
            out.push_str(fragment);
            out.push_str(&page[pos..]);
            out
        }
        None => page.to_string(),
    }
}

fn html_escape(s: &str) -> String {
    html! { (s) }.into_string()
}

fn render_article(title: &str, date_text: Option<&str>, body_html: &str) -> Markup {
    html! {
        article {
            h1 { (title) }
            @if let Some(date) = date_text {
                p class="post-date" { (date) }
            }
            (PreEscaped(body_html))
        }
    }
}

fn render_redirect_body(title: &str, url: &str) -> Markup {
    html! {
        article {
            h1 { (title) }
            p {
                "Redirecting to "
                a href=(url) { (url) }
            }
        }
    }
}

fn render_nav(config: &BlogConfig) -> Markup {
    html! {
        nav {
            a href=(format!("{}/", config.base_url_trimmed())) { "Return to Homepage" }
        }
    }
}

fn render_index(entries: &[IndexEntry]) -> Markup {
    html! {
        ul class="post-list" {
            @for entry in entries {
                li {
                    h2 {
                        a href=(entry.href) { (entry.title) }
                        @if entry.teaser_html.is_none() {
                            " ↗"
                        }
                    }
                    @if let Some(date) = &entry.date_text {
                        p class="post-date" { (date) }
                    }
                    @if let Some(teaser) = &entry.teaser_html {
                        div class="teaser" {
                            (PreEscaped(teaser.as_str()))
                            @if entry.has_more {
                                p { a href=(entry.href) { "Continue reading" } }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_sitemap(config: &BlogConfig, entries: &[IndexEntry]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    out.push_str(&format!(
        "  <url><loc>{}/</loc></url>\n",
        xml_escape(config.base_url_trimmed())
    ));
    for entry in entries {
        out.push_str(&format!(
            "  <url><loc>{}</loc></url>\n",
            xml_escape(&entry.sitemap_url)
        ));
    }
    out.push_str("</urlset>\n");
    out
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Atomic page write: sibling temp file, then rename over the target.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!("{name}.tmp"));
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

/// Mutual exclusion between generation runs on one output directory.
/// Unlike the data-file lock this does not wait: a held lock is an
/// immediate [`GenerateError::InProgress`].
struct RunLock {
    path: PathBuf,
}

impl RunLock {
    fn acquire(path: PathBuf) -> Result<Self, GenerateError> {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if lock_is_stale(&path) {
                    warn!("removing stale run lock {}", path.display());
                    let _ = fs::remove_file(&path);
                    match OpenOptions::new().write(true).create_new(true).open(&path) {
                        Ok(_) => Ok(Self { path }),
                        Err(_) => Err(GenerateError::InProgress(path)),
                    }
                } else {
                    Err(GenerateError::InProgress(path))
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_is_stale(path: &Path) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = meta.modified() else {
        return false;
    };
    SystemTime::now()
        .duration_since(modified)
        .map(|age| age > LOCK_STALE_AFTER)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{test_config, write_link, write_post};
    use sha2::{Digest, Sha256};
    use tempfile::TempDir;

    fn read_out(config: &BlogConfig, rel: &str) -> String {
        fs::read_to_string(config.output_dir.join(rel)).unwrap()
    }

    #[test]
    fn publishes_article_index_and_sitemap() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_post(
            &config.content_dir,
            "001--hello.md",
            "Hello World",
            "2024-01-15",
            None,
            "First paragraph.\n\n<!--more-->\n\nThe rest of the post.",
        );

        let summary = generate(&config, false).unwrap();
        assert_eq!(summary.articles, 1);
        assert_eq!(summary.failed, 0);

        let post = read_out(&config, "posts/hello.html");
        assert!(post.contains("<h1>Hello World</h1>"));
        assert!(post.contains("The rest of the post."));
        assert!(post.contains("name=\"generator\" content=\"penpress\""));
        assert!(post.contains("name=\"last-updated\""));
        assert!(post.contains("<html lang=\"en\">"));
        assert!(post.contains("Return to Homepage"));

        let index = read_out(&config, "index.html");
        assert!(index.contains("posts/hello.html"));
        assert!(index.contains("First paragraph."));
        // Teaser cut: the body after the marker stays off the index.
        assert!(!index.contains("The rest of the post."));

        let sitemap = read_out(&config, "sitemap.xml");
        assert!(sitemap.contains("<loc>http://example.test/posts/hello.html</loc>"));
        assert!(sitemap.contains("<loc>http://example.test/</loc>"));
    }

    #[test]
    fn draft_is_held_back_and_stale_output_removed() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_post(&config.content_dir, "a.md", "Was Public", "2024-01-01", None, "body");
        generate(&config, false).unwrap();
        assert!(config.output_dir.join("posts/a.html").exists());

        write_post(
            &config.content_dir,
            "a.md",
            "Was Public",
            "2024-01-01",
            Some("draft"),
            "body",
        );
        let summary = generate(&config, true).unwrap();
        assert_eq!(summary.drafts, 1);
        assert_eq!(summary.articles, 0);
        assert!(!config.output_dir.join("posts/a.html").exists());
        assert!(!read_out(&config, "index.html").contains("Was Public"));
        assert!(!read_out(&config, "sitemap.xml").contains("posts/a.html"));
    }

    #[test]
    fn index_orders_by_prefix_then_title() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_post(&config.content_dir, "020--beta.md", "Beta", "2024-01-01", None, "b");
        write_post(&config.content_dir, "010--alpha.md", "Alpha", "2024-01-01", None, "a");
        write_post(&config.content_dir, "zulu.md", "Zulu", "2024-01-01", None, "z");
        write_post(&config.content_dir, "mike.md", "Mike", "2024-01-01", None, "m");

        generate(&config, false).unwrap();
        let index = read_out(&config, "index.html");
        let pos = |needle: &str| index.find(needle).unwrap();
        assert!(pos("Alpha") < pos("Beta"));
        assert!(pos("Beta") < pos("Mike"));
        // Unprefixed entries sort after all prefixed ones, by title.
        assert!(pos("Mike") < pos("Zulu"));
    }

    #[test]
    fn fresh_output_is_skipped_byte_for_byte() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_post(&config.content_dir, "a.md", "A", "2024-01-01", None, "body");
        generate(&config, false).unwrap();
        let first = Sha256::digest(fs::read(config.output_dir.join("posts/a.html")).unwrap());

        let summary = generate(&config, false).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.articles, 1);
        let second = Sha256::digest(fs::read(config.output_dir.join("posts/a.html")).unwrap());
        assert_eq!(first, second);
        // The skipped post still appears everywhere.
        assert!(read_out(&config, "index.html").contains("posts/a.html"));
        assert!(read_out(&config, "sitemap.xml").contains("posts/a.html"));
    }

    #[test]
    fn force_rewrites_fresh_output() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_post(&config.content_dir, "a.md", "A", "2024-01-01", None, "body");
        generate(&config, false).unwrap();
        let summary = generate(&config, true).unwrap();
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.articles, 1);
    }

    #[test]
    fn link_stub_becomes_redirect_and_index_row() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_link(&config.links_dir, "005--talk.txt", "A Talk", "https://example.org/talk");

        let summary = generate(&config, false).unwrap();
        assert_eq!(summary.links, 1);

        let stub = read_out(&config, "talk.html");
        assert!(stub.contains("http-equiv=\"refresh\""));
        assert!(stub.contains("0;url=https://example.org/talk"));

        // Index points at the target, sitemap at the local stub.
        let index = read_out(&config, "index.html");
        assert!(index.contains("href=\"https://example.org/talk\""));
        let sitemap = read_out(&config, "sitemap.xml");
        assert!(sitemap.contains("<loc>http://example.test/talk.html</loc>"));
    }

    #[test]
    fn malformed_link_stub_is_counted_failed() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        fs::create_dir_all(&config.links_dir).unwrap();
        fs::write(config.links_dir.join("bad.txt"), "no title line\nftp://x\n").unwrap();

        let summary = generate(&config, false).unwrap();
        assert_eq!(summary.links, 0);
        assert_eq!(summary.failed, 1);
        assert!(!config.output_dir.join("bad.html").exists());
    }

    #[test]
    fn template_is_provisioned_once() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_post(&config.content_dir, "a.md", "A", "2024-01-01", None, "body");
        generate(&config, false).unwrap();
        assert_eq!(fs::read_to_string(&config.template).unwrap(), DEFAULT_TEMPLATE);

        // A user edit survives the next run.
        fs::write(&config.template, "<html><head></head><body><!-- #CONTENT# --></body></html>")
            .unwrap();
        generate(&config, true).unwrap();
        let post = read_out(&config, "posts/a.html");
        assert!(!post.contains("site-header"));
        assert!(post.contains("<h1>A</h1>"));
    }

    #[test]
    fn concurrent_run_fails_fast() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        fs::create_dir_all(&config.output_dir).unwrap();
        fs::write(config.output_dir.join(LOCK_FILENAME), "").unwrap();

        assert!(matches!(
            generate(&config, false),
            Err(GenerateError::InProgress(_))
        ));
    }

    #[test]
    fn lock_released_after_run() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        generate(&config, false).unwrap();
        assert!(!config.output_dir.join(LOCK_FILENAME).exists());
    }

    #[test]
    fn title_falls_back_to_first_heading_then_slug() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::write(
            config.content_dir.join("heading-only.md"),
            "---\ndate: 2024-01-01\n---\n# From The Body\n\ntext",
        )
        .unwrap();
        fs::write(config.content_dir.join("bare.md"), "just text").unwrap();

        generate(&config, false).unwrap();
        let index = read_out(&config, "index.html");
        assert!(index.contains("From The Body"));
        assert!(index.contains("bare"));
    }

    #[test]
    fn titles_are_escaped_in_pages() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path());
        write_post(
            &config.content_dir,
            "x.md",
            "Tags & <scripts>",
            "2024-01-01",
            None,
            "body",
        );
        generate(&config, false).unwrap();
        let post = read_out(&config, "posts/x.html");
        assert!(post.contains("Tags &amp; &lt;scripts&gt;"));
        assert!(!post.contains("<scripts>"));
    }

    #[test]
    fn date_is_reformatted_per_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = test_config(tmp.path());
        config.date_format = "%d.%m.%Y".to_string();
        write_post(&config.content_dir, "a.md", "A", "2024-01-15", None, "body");
        generate(&config, false).unwrap();
        assert!(read_out(&config, "posts/a.html").contains("15.01.2024"));
    }

    #[test]
    fn parse_link_stub_shapes() {
        assert_eq!(
            parse_link_stub("# Title\nhttps://example.org\n"),
            Some(("Title".to_string(), "https://example.org".to_string()))
        );
        assert!(parse_link_stub("Title without hash\nhttps://example.org").is_none());
        assert!(parse_link_stub("# Title\nnot-a-url").is_none());
        assert!(parse_link_stub("# Title").is_none());
        assert!(parse_link_stub("").is_none());
    }

    #[test]
    fn xml_escaping() {
        assert_eq!(
            xml_escape("a&b<c>\"d'"),
            "a&amp;b&lt;c&gt;&quot;d&apos;"
        );
    }

    #[test]
    fn summary_display() {
        let summary = GenerateSummary {
            articles: 4,
            links: 2,
            skipped: 3,
            drafts: 1,
            failed: 0,
        };
        assert_eq!(summary.to_string(), "4 articles, 2 links, 3 unchanged, 1 drafts");
    }
}
