//! Output minification.
//!
//! Optional stage 4, enabled by `SITE_MINIFY`. Rewrites the assembled tree in
//! place:
//!
//! | Extension | Minifier |
//! |---|---|
//! | `.html` | `minify-html`, comments kept so region markers survive |
//! | `.css` | `minifier::css` |
//! | `.js`, `.mjs` | `minifier::js` |
//!
//! A file that cannot be minified (not UTF-8, CSS parse error) is left as it
//! is and reported with a warning; it never fails the build.

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum MinifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the minify stage did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinifyReport {
    pub files: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
    /// Files left untouched because they could not be minified.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Html,
    Css,
    Js,
}

impl Kind {
    fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(Kind::Html),
            "css" => Some(Kind::Css),
            "js" | "mjs" => Some(Kind::Js),
            _ => None,
        }
    }
}

fn html_config() -> minify_html::Cfg {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = true;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg
}

pub fn minify_html(source: &str) -> Result<String, String> {
    let bytes = minify_html::minify(source.as_bytes(), &html_config());
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

pub fn minify_css(source: &str) -> Result<String, String> {
    minifier::css::minify(source)
        .map(|m| m.to_string())
        .map_err(|e| e.to_string())
}

pub fn minify_js(source: &str) -> String {
    minifier::js::minify(source).to_string()
}

fn minify_source(kind: Kind, source: &str) -> Result<String, String> {
    match kind {
        Kind::Html => minify_html(source),
        Kind::Css => minify_css(source),
        Kind::Js => Ok(minify_js(source)),
    }
}

/// Minify every HTML, CSS and JS file under `output`.
pub fn minify_tree(output: &Path) -> Result<MinifyReport, MinifyError> {
    let mut report = MinifyReport::default();
    for entry in WalkDir::new(output) {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(kind) = Kind::of(path) else {
            continue;
        };
        let relative = path.strip_prefix(output).unwrap_or(path).display().to_string();

        let bytes = fs::read(path)?;
        let minified = String::from_utf8(bytes.clone())
            .map_err(|e| e.to_string())
            .and_then(|source| minify_source(kind, &source));
        match minified {
            Ok(min) => {
                report.files += 1;
                report.bytes_before += bytes.len() as u64;
                report.bytes_after += min.len() as u64;
                fs::write(path, min)?;
            }
            Err(reason) => {
                warn!(file = %relative, %reason, "minification failed, file left as-is");
                report.skipped.push(relative);
            }
        }
    }
    Ok(report)
}
