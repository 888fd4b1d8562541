//! # Penpress
//!
//! A minimal file-based blog publishing tool. Your filesystem is the data
//! source: Markdown files with a small front matter block become posts,
//! two-line text stubs become external links, and a numeric filename prefix
//! controls homepage order. There is no database anywhere — posts, login
//! tokens, sessions, and rate-limit records are all plain files.
//!
//! # Two Halves
//!
//! ```text
//! 1. Generate   content/  →  public/      (Markdown → static HTML site)
//! 2. Admin      edit, publish, magic-link login over the same files
//! ```
//!
//! The generator is a pure consumer of the content tree and can always be
//! run from the CLI; the admin layer is what an HTTP front end (or the CLI
//! `login` command) drives, and every admin mutation ends with a
//! regeneration so the published site never lags the content.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frontmatter`] | `---` delimited `key: value` metadata block parser |
//! | [`naming`] | `NN--name` filename convention: order prefix + slug |
//! | [`markdown`] | pulldown-cmark rendering, teaser split, heading fallback |
//! | [`generate`] | renders posts, link stubs, index, and sitemap into the output directory |
//! | [`store`] | content file operations, sandboxed to the content directory |
//! | [`datafile`] | locked JSON documents backing all persisted auth state |
//! | [`token`] | single-use login tokens, hashed at rest |
//! | [`session`] | sliding admin sessions |
//! | [`ratelimit`] | sliding-window login throttling and proxy-aware client addresses |
//! | [`admin`] | the orchestration layer tying store, auth, and generation together |
//! | [`config`] | `penpress.toml` loading, defaults, and validation |
//!
//! # Design Decisions
//!
//! ## Files Under an Advisory Lock, Not a Database
//!
//! Auth state is three tiny JSON documents. Each mutation is a locked
//! read-modify-write followed by an atomic rename ([`datafile`]), which is
//! all the transactional behavior single-admin blogging needs. Crucially it
//! keeps the deployment story at "a binary and a directory".
//!
//! ## A Template File, Not a Template Engine
//!
//! Pages go through a plain HTML file with `<!-- #PLACEHOLDER# -->`
//! markers that the owner can edit with any editor, no template language to
//! learn. The structured fragments inside the placeholders (article bodies,
//! the index list, navigation) are built with
//! [Maud](https://maud.lambda.xyz/) so interpolated titles and dates are
//! escaped at compile-time-checked call sites.
//!
//! ## Magic Links Over Passwords
//!
//! The single admin authenticates by clicking a mailed one-time link. There
//! is no password to store or forget; the mailbox is the credential. Tokens
//! are single use, expire after an hour, and only their SHA-256 digests
//! touch disk, so a leaked data directory does not leak live links.

pub mod admin;
pub mod config;
pub mod datafile;
pub mod frontmatter;
pub mod generate;
pub mod markdown;
pub mod naming;
pub mod ratelimit;
pub mod session;
pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod test_helpers;
