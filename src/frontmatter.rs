//! Front matter parsing and serialization.
//!
//! Posts start with an optional metadata block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Hello World
//! date: 2024-01-01
//! status: draft
//! ---
//! Body in Markdown...
//! ```
//!
//! A line that is exactly `---` (after trimming) toggles metadata mode.
//! Inside the block, `key: value` pairs split on the first colon with both
//! sides trimmed; later colons stay in the value. Lines that don't look like
//! a pair are ignored. If an opening `---` is never closed, the whole input
//! is treated as body with no metadata rather than swallowing the rest of
//! the file.
//!
//! Parsing is pure: which keys are required (`title`, `date`) is enforced by
//! callers, not here.

use std::collections::BTreeMap;

/// Metadata key whose value `draft` keeps a post out of the published site.
pub const STATUS_KEY: &str = "status";

/// Value of [`STATUS_KEY`] marking an unpublished post.
pub const STATUS_DRAFT: &str = "draft";

/// Split raw post text into its metadata map and Markdown body.
pub fn parse(raw: &str) -> (BTreeMap<String, String>, String) {
    let mut metadata = BTreeMap::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_metadata = false;

    for line in raw.lines() {
        if line.trim() == "---" {
            in_metadata = !in_metadata;
            continue;
        }
        if in_metadata {
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim();
                if !key.is_empty() {
                    metadata.insert(key.to_string(), value.trim().to_string());
                }
            }
        } else {
            body_lines.push(line);
        }
    }

    // Unterminated block: fall back to treating everything as body.
    if in_metadata {
        return (BTreeMap::new(), raw.to_string());
    }

    (metadata, body_lines.join("\n"))
}

/// Re-emit a canonical post: metadata block (keys in sorted order) followed
/// by the body. `parse(serialize(m, b))` yields the same metadata map.
pub fn serialize(metadata: &BTreeMap<String, String>, body: &str) -> String {
    if metadata.is_empty() {
        return body.to_string();
    }
    let mut out = String::from("---\n");
    for (key, value) in metadata {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(body);
    out
}

/// Whether a parsed metadata map marks the post as a draft.
pub fn is_draft(metadata: &BTreeMap<String, String>) -> bool {
    metadata.get(STATUS_KEY).map(String::as_str) == Some(STATUS_DRAFT)
}
