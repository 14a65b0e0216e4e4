//! `<img>` upgrades from the image manifest.
//!
//! - `src` pointing at a source with a `replace` variant is switched to the
//!   variant.
//! - Missing `decoding="async"` is added, and `loading="lazy"` unless the
//!   image sets `fetchpriority`.
//! - An image with an `alternate` variant (WebP) is wrapped in
//!   `<picture>` with a matching `<source>`, unless it already sits inside a
//!   `<picture>`.

use super::{PageContext, Transform};
use crate::config::VariantRole;
use crate::html::rewrite_start_tags;
use crate::types::{ImageManifest, ImageVariant};
use maud::html;
use std::collections::HashMap;

pub struct ImageUpgrades;

impl Transform for ImageUpgrades {
    fn name(&self) -> &'static str {
        "images"
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let lookup = VariantLookup::new(ctx.images);
        rewrite_start_tags(doc, |tag, scope| {
            if tag.name != "img" {
                return None;
            }
            let src = tag.attr("src")?;
            let mut img = tag.clone();
            let mut changed = false;

            let mut current = url_path(src).to_string();
            if let Some(variant) = lookup.replace.get(current.as_str()) {
                let url = variant.url();
                img.set_attr("src", &url);
                current = url;
                changed = true;
            }
            if !img.has_attr("decoding") {
                img.set_attr("decoding", "async");
                changed = true;
            }
            if !img.has_attr("loading") && !img.has_attr("fetchpriority") {
                img.set_attr("loading", "lazy");
                changed = true;
            }

            let markup = img.render();
            match lookup.alternate.get(current.as_str()) {
                Some(alt) if !scope.inside("picture") => Some(picture(alt, &markup)),
                _ => changed.then_some(markup),
            }
        })
    }
}

/// Variants keyed by the root-relative URL an `<img>` may reference.
struct VariantLookup<'a> {
    replace: HashMap<String, &'a ImageVariant>,
    alternate: HashMap<String, &'a ImageVariant>,
}

impl<'a> VariantLookup<'a> {
    fn new(manifest: &'a ImageManifest) -> Self {
        let mut replace = HashMap::new();
        let mut alternate = HashMap::new();
        for variant in &manifest.variants {
            match variant.role {
                VariantRole::Replace => {
                    replace.entry(variant.source_url()).or_insert(variant);
                }
                VariantRole::Alternate => {
                    alternate.entry(variant.source_url()).or_insert(variant);
                }
                _ => {}
            }
        }
        // An image already switched to its replacement still gets the
        // alternate of the original source.
        for variant in manifest.variants.iter().filter(|v| v.role == VariantRole::Replace) {
            if let Some(alt) = alternate.get(&variant.source_url()).copied() {
                alternate.entry(variant.url()).or_insert(alt);
            }
        }
        Self { replace, alternate }
    }
}

fn url_path(src: &str) -> &str {
    let src = src.trim();
    match src.find(['?', '#']) {
        Some(i) => &src[..i],
        None => src,
    }
}

fn picture(alt: &ImageVariant, img: &str) -> String {
    let source = html! { source type=(alt.mime()) srcset=(alt.url()); }.into_string();
    format!("<picture>{source}{img}</picture>")
}
