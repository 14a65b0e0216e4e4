//! English mirror generation.
//!
//! Stage 2 of the build. Every Ukrainian page in the project root is turned
//! into its English counterpart under `en/` by plain substitution, driven
//! entirely by the `[translate]` tables in `site.toml`:
//!
//! 1. `<html lang="uk">` becomes `lang="en"`
//! 2. `translate.common` pairs, first to last
//! 3. `translate.pages."<file>"` pairs
//! 4. `translate.elements."<file>"` inner-HTML replacements
//!
//! Pairs are literal substrings, so longer phrases must come before the
//! shorter ones they contain. A mirror page is only written when its content
//! changes, which keeps file timestamps stable across repeated builds.

use crate::config::{ElementRewrite, TranslateConfig};
use crate::html::find_element_inner;
use crate::naming::list_pages;
use crate::route::SECONDARY_PREFIX;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static HTML_LANG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<html\b[^>]*?\blang\s*=\s*["']?)uk(["'\s>/])"#).unwrap()
});

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the translate stage did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateReport {
    /// Mirror pages created or rewritten, by file name.
    pub written: Vec<String>,
    /// Mirror pages already up to date.
    pub unchanged: Vec<String>,
}

/// Translate a single Ukrainian page.
pub fn translate_page(html: &str, file_name: &str, config: &TranslateConfig) -> String {
    let mut out = HTML_LANG_RE.replace(html, "${1}en${2}").into_owned();

    let page_pairs = config.pages.get(file_name).into_iter().flatten();
    for [from, to] in config.common.iter().chain(page_pairs) {
        if !from.is_empty() {
            out = out.replace(from.as_str(), to);
        }
    }

    for rewrite in config.elements.get(file_name).into_iter().flatten() {
        out = rewrite_element(&out, rewrite);
    }
    out
}

fn rewrite_element(html: &str, rewrite: &ElementRewrite) -> String {
    match find_element_inner(html, &rewrite.tag, rewrite.class.as_deref()) {
        Some(range) => {
            let mut out = String::with_capacity(html.len());
            out.push_str(&html[..range.start]);
            out.push_str(&rewrite.html);
            out.push_str(&html[range.end..]);
            out
        }
        None => {
            debug!(tag = %rewrite.tag, class = ?rewrite.class, "element not found, rewrite skipped");
            html.to_string()
        }
    }
}

/// Write `root/en/<name>` for every page in `root`.
pub fn translate_site(root: &Path, config: &TranslateConfig) -> Result<TranslateReport, TranslateError> {
    let mirror = root.join(SECONDARY_PREFIX);
    fs::create_dir_all(&mirror)?;
    let mut report = TranslateReport::default();

    for page in list_pages(root)? {
        let source = fs::read_to_string(root.join(&page.file_name))?;
        let translated = translate_page(&source, &page.file_name, config);
        let target = mirror.join(&page.file_name);

        let current = fs::read_to_string(&target).ok();
        if current.as_deref() == Some(translated.as_str()) {
            report.unchanged.push(page.file_name);
            continue;
        }
        fs::write(&target, translated)?;
        report.written.push(page.file_name);
    }
    Ok(report)
}
