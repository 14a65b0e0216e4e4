//! Content-hash version tokens for cache busting.
//!
//! Every local asset a page references gets a `?v=<token>` query, where the
//! token is the first [`TOKEN_LEN`] hex characters of the SHA-256 of the
//! file's bytes. Tokens are content-based rather than mtime-based so they
//! survive `git checkout` and only change when the bytes change.
//!
//! The table is computed once per build by walking the project root and is
//! shared read-only by every page rewrite.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Number of hex characters kept from the digest.
pub const TOKEN_LEN: usize = 10;

/// Extensions of files that receive a version token.
pub const VERSIONED_EXTENSIONS: &[&str] = &[
    "css", "js", "mjs", "png", "jpg", "jpeg", "webp", "avif", "gif", "svg", "ico", "woff", "woff2",
];

/// Directory names never scanned for assets.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target"];

/// Version token of a byte string.
pub fn content_token(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    digest[..TOKEN_LEN].to_string()
}

/// Version token of a file's contents.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(content_token(&bytes))
}

/// True when the URL path ends in a versioned extension.
pub fn is_versioned(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| !ext.contains('/') && VERSIONED_EXTENSIONS.contains(&ext.as_str()))
}

/// Set the `v` query parameter of `url`, replacing any previous value and
/// keeping other parameters and the fragment.
pub fn with_version(url: &str, token: &str) -> String {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (url, None),
    };
    let (path, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let mut params: Vec<&str> = query
        .split('&')
        .filter(|p| !p.is_empty() && *p != "v" && !p.starts_with("v="))
        .collect();
    let version = format!("v={token}");
    params.push(&version);

    let mut out = format!("{path}?{}", params.join("&"));
    if let Some(frag) = fragment {
        out.push('#');
        out.push_str(frag);
    }
    out
}

/// Map from root-relative URL path (`/style.css`) to version token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionTable {
    tokens: BTreeMap<String, String>,
}

impl VersionTable {
    /// Hash every versioned file under `root`.
    ///
    /// Hidden directories, `node_modules`, `target` and any directory listed
    /// in `skip` (typically the output and temp directories) are not entered.
    pub fn scan(root: &Path, skip: &[PathBuf]) -> io::Result<Self> {
        let mut table = Self::default();
        let walker = WalkDir::new(root).follow_links(false).into_iter();
        let entries = walker.filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir()
                && (name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()))
            {
                return false;
            }
            !skip.iter().any(|s| s == entry.path())
        });

        for entry in entries {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let url_path = url_path_of(relative);
            if is_versioned(&url_path) {
                table.insert(url_path, hash_file(entry.path())?);
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, url_path: impl Into<String>, token: impl Into<String>) {
        self.tokens.insert(url_path.into(), token.into());
    }

    /// Token for a root-relative URL path without query or fragment.
    pub fn token_for(&self, url_path: &str) -> Option<&str> {
        self.tokens.get(url_path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn url_path_of(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn token_is_stable_for_same_content() {
        assert_eq!(content_token(b"body{}"), content_token(b"body{}"));
        assert_eq!(content_token(b"body{}").len(), TOKEN_LEN);
    }

    #[test]
    fn token_changes_with_one_byte() {
        assert_ne!(content_token(b"body{}"), content_token(b"body{ }"));
    }

    #[test]
    fn token_is_lowercase_hex() {
        assert!(
            content_token(b"x")
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        );
    }

    #[test]
    fn versioned_extensions() {
        assert!(is_versioned("/style.css"));
        assert!(is_versioned("/img/Logo.PNG"));
        assert!(is_versioned("/fonts/a.woff2"));
        assert!(!is_versioned("/about/"));
        assert!(!is_versioned("/sitemap.xml"));
        assert!(!is_versioned("/dir.css/file"));
    }

    #[test]
    fn with_version_appends_query() {
        assert_eq!(with_version("/style.css", "abc"), "/style.css?v=abc");
    }

    #[test]
    fn with_version_replaces_existing_token() {
        assert_eq!(with_version("/style.css?v=old", "new"), "/style.css?v=new");
        assert_eq!(
            with_version("/app.js?lang=uk&v=old#top", "new"),
            "/app.js?lang=uk&v=new#top"
        );
    }

    #[test]
    fn with_version_is_idempotent() {
        let once = with_version("/a.js?x=1", "t");
        assert_eq!(with_version(&once, "t"), once);
    }

    #[test]
    fn scan_hashes_assets_and_skips_excluded_dirs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::write(root.join("style.css"), "body{}").unwrap();
        std::fs::write(root.join("index.html"), "<html>").unwrap();
        std::fs::create_dir_all(root.join("img")).unwrap();
        std::fs::write(root.join("img/logo.png"), [1u8, 2, 3]).unwrap();
        std::fs::create_dir_all(root.join("dist")).unwrap();
        std::fs::write(root.join("dist/style.css"), "stale").unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join(".git/x.js"), "x").unwrap();

        let table = VersionTable::scan(root, &[root.join("dist")]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.token_for("/style.css"), Some(content_token(b"body{}").as_str()));
        assert!(table.token_for("/img/logo.png").is_some());
        assert_eq!(table.token_for("/index.html"), None);
        assert_eq!(table.token_for("/dist/style.css"), None);
    }
}
