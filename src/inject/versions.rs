//! Cache-busting `?v=` tokens on local asset URLs.

use super::{PageContext, Transform};
use crate::html::rewrite_start_tags;
use crate::versions::{VersionTable, is_versioned, with_version};
use tracing::debug;

/// Stamps `href`, `src` and every `srcset` candidate that points at a
/// root-relative file with a versioned extension. An existing `v` parameter
/// is replaced. References to files the table does not know are left as
/// they are.
pub struct AssetVersions;

impl Transform for AssetVersions {
    fn name(&self) -> &'static str {
        "versions"
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        rewrite_start_tags(doc, |tag, _| {
            let mut stamped = tag.clone();
            let mut changed = false;
            for attr in ["href", "src"] {
                if let Some(value) = tag.attr(attr)
                    && let Some(new) = stamp(value, ctx.versions)
                    && new != value
                {
                    stamped.set_attr(attr, &new);
                    changed = true;
                }
            }
            if let Some(srcset) = tag.attr("srcset") {
                let new = stamp_srcset(srcset, ctx.versions);
                if new != srcset {
                    stamped.set_attr("srcset", &new);
                    changed = true;
                }
            }
            changed.then(|| stamped.render())
        })
    }
}

fn stamp(url: &str, table: &VersionTable) -> Option<String> {
    let url = url.trim();
    if !url.starts_with('/') || url.starts_with("//") {
        return None;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if !is_versioned(path) {
        return None;
    }
    match table.token_for(path) {
        Some(token) => Some(with_version(url, token)),
        None => {
            debug!(url = path, "no version token, reference left untouched");
            None
        }
    }
}

fn stamp_srcset(srcset: &str, table: &VersionTable) -> String {
    let mut changed = false;
    let candidates: Vec<String> = srcset
        .split(',')
        .map(|candidate| {
            let candidate = candidate.trim();
            let (url, descriptor) = match candidate.split_once(char::is_whitespace) {
                Some((url, descriptor)) => (url, Some(descriptor.trim())),
                None => (candidate, None),
            };
            let url = match stamp(url, table) {
                Some(stamped) => {
                    changed |= stamped != url;
                    stamped
                }
                None => url.to_string(),
            };
            match descriptor {
                Some(d) if !d.is_empty() => format!("{url} {d}"),
                _ => url,
            }
        })
        .collect();
    if changed {
        candidates.join(", ")
    } else {
        srcset.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::fixtures::{Ctx, apply_stable};

    fn ctx() -> Ctx {
        let mut ctx = Ctx::page("/", "index.html");
        ctx.versions.insert("/style.css", "aaaaaaaaaa");
        ctx.versions.insert("/img/a.webp", "bbbbbbbbbb");
        ctx.versions.insert("/img/a.png", "cccccccccc");
        ctx
    }

    #[test]
    fn stamps_known_assets() {
        let doc = r#"<link rel="stylesheet" href="/style.css"><img src="/img/a.png" alt="">"#;
        assert_eq!(
            apply_stable(&AssetVersions, doc, &ctx()),
            r#"<link rel="stylesheet" href="/style.css?v=aaaaaaaaaa"><img src="/img/a.png?v=cccccccccc" alt="">"#
        );
    }

    #[test]
    fn replaces_stale_token() {
        let doc = r#"<link href="/style.css?v=old&media=x#top">"#;
        assert_eq!(
            apply_stable(&AssetVersions, doc, &ctx()),
            r#"<link href="/style.css?media=x&v=aaaaaaaaaa#top">"#
        );
    }

    #[test]
    fn stamps_srcset_candidates() {
        let doc = r#"<source type="image/webp" srcset="/img/a.webp 1x, /img/missing.webp 2x">"#;
        assert_eq!(
            apply_stable(&AssetVersions, doc, &ctx()),
            r#"<source type="image/webp" srcset="/img/a.webp?v=bbbbbbbbbb 1x, /img/missing.webp 2x">"#
        );
    }

    #[test]
    fn unstamped_srcset_keeps_its_spacing() {
        let doc = r#"<source srcset="/img/missing.webp 1x,/img/other.webp   2x">"#;
        assert_eq!(apply_stable(&AssetVersions, doc, &ctx()), doc);
    }

    #[test]
    fn leaves_unknown_and_external_urls() {
        let doc = r#"<script src="/missing.js"></script><script src="https://cdn.test/x.js"></script><a href="/about/">a</a>"#;
        assert_eq!(apply_stable(&AssetVersions, doc, &ctx()), doc);
    }
}
