//! Link normalization for pretty URLs.
//!
//! Source pages link to each other as `about.html` and to assets relative to
//! the project root. Once a page is served from `/about/` those relative
//! references break, so every `href` and `src` is made root-relative:
//!
//! | Page | Before | After |
//! |---|---|---|
//! | any | `style.css`, `./img/a.png`, `../tracking.js` | `/style.css`, `/img/a.png`, `/tracking.js` |
//! | uk | `about.html#team` | `/about/#team` |
//! | uk | `index.html` | `/` |
//! | en | `about.html` | `/en/about/` |
//! | en | `/`, `/contacts`, `/contacts/` | `/en/`, `/en/contacts/`, `/en/contacts/` |
//!
//! External references (`https:`, `//cdn…`, `mailto:`, `tel:`, `#top`, …)
//! are never touched. English pages only redirect root links that name a
//! known page slug, so `/img/…` and `/en/…` pass through.

use super::{PageContext, Transform};
use crate::html::rewrite_start_tags;
use crate::route::Lang;
use crate::versions::is_versioned;
use std::collections::BTreeSet;

pub struct Paths;

impl Transform for Paths {
    fn name(&self) -> &'static str {
        "paths"
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        rewrite_start_tags(doc, |tag, _| {
            let mut rewritten = tag.clone();
            let mut changed = false;
            for attr in ["href", "src"] {
                let Some(value) = tag.attr(attr) else {
                    continue;
                };
                if let Some(new) = rewrite_url(value, attr == "href", ctx.lang, ctx.page_slugs) {
                    rewritten.set_attr(attr, &new);
                    changed = true;
                }
            }
            changed.then(|| rewritten.render())
        })
    }
}

/// Schemes and prefixes that point outside the site.
fn is_external(url: &str) -> bool {
    if url.starts_with("//") || url.starts_with('#') {
        return true;
    }
    // A scheme is a colon before any path separator.
    match (url.find(':'), url.find(['/', '?', '#'])) {
        (Some(colon), Some(sep)) => colon < sep,
        (Some(_), None) => true,
        _ => false,
    }
}

fn split_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(i) => url.split_at(i),
        None => (url, ""),
    }
}

fn strip_relative_prefix(mut path: &str) -> &str {
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else {
            return path;
        }
    }
}

/// Pretty URL for a same-directory page link, e.g. `about.html` or
/// `/about.html`.
fn page_link(path: &str, lang: Lang) -> Option<String> {
    let file = strip_relative_prefix(path).trim_start_matches('/');
    if file.contains('/') {
        return None;
    }
    let stem_len = file.to_ascii_lowercase().strip_suffix(".html")?.len();
    let slug = &file[..stem_len];
    if slug.is_empty() {
        return None;
    }
    Some(if slug.eq_ignore_ascii_case("index") {
        format!("{}/", lang.url_prefix())
    } else {
        format!("{}/{slug}/", lang.url_prefix())
    })
}

fn rewrite_url(value: &str, is_href: bool, lang: Lang, slugs: &BTreeSet<String>) -> Option<String> {
    let url = value.trim();
    if url.is_empty() || is_external(url) {
        return None;
    }
    let (path, suffix) = split_suffix(url);
    if path.is_empty() {
        return None;
    }

    if is_href && let Some(pretty) = page_link(path, lang) {
        return Some(format!("{pretty}{suffix}"));
    }

    if !path.starts_with('/') {
        let relative = strip_relative_prefix(path);
        if relative.starts_with("img/") || is_versioned(relative) {
            return Some(format!("/{relative}{suffix}"));
        }
        return None;
    }

    if is_href && lang == Lang::En {
        if path == "/" {
            return Some(format!("{}/{suffix}", lang.url_prefix()));
        }
        let slug = path.trim_matches('/');
        if !slug.contains('/') && slugs.contains(slug) {
            return Some(format!("{}/{slug}/{suffix}", lang.url_prefix()));
        }
    }
    None
}
