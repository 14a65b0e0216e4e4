//! Head metadata regions: description, canonical links and favicons.

use super::{PageContext, Transform};
use crate::config::VariantRole;
use crate::html::text::{clamp_words, collapse_whitespace, plain_text};
use crate::html::{Anchor, Region, StartTag, Token, find_element_inner, line_break, remove_start_tags, tokens};
use maud::html;

pub const SEO_META: Region = Region::new("seo-meta");
pub const I18N_SEO: Region = Region::new("i18n-seo");
pub const FAVICON: Region = Region::new("favicon");

// ============================================================================
// seo-meta
// ============================================================================

/// One `<meta name="description">` (and keywords, when known) right after
/// `<title>`.
///
/// The description is taken from, in order: the per-page `site.toml`
/// override, the first description already in the document, the text of
/// the first `<p>`. It is clamped to `seo.description_max` characters. Any
/// other description or keywords tag in the document is removed.
pub struct SeoMeta;

impl Transform for SeoMeta {
    fn name(&self) -> &'static str {
        "seo-meta"
    }

    fn produces(&self) -> Vec<Region> {
        vec![SEO_META]
    }

    fn anchors(&self) -> Vec<Anchor> {
        vec![Anchor::AfterTitle]
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let overrides = ctx.site.seo.page(ctx.lang, ctx.file_name);

        let description = overrides
            .and_then(|o| o.description.clone())
            .or_else(|| first_meta_content(doc, "description"))
            .or_else(|| first_paragraph(doc))
            .map(|text| clamp_words(&plain_text(&text), ctx.site.seo.description_max))
            .filter(|text| !text.is_empty());
        let keywords = overrides
            .and_then(|o| o.keywords.clone())
            .or_else(|| first_meta_content(doc, "keywords"))
            .map(|text| collapse_whitespace(&plain_text(&text)))
            .filter(|text| !text.is_empty());

        let Some(description) = description else {
            // Hand-written tags stay when there is nothing to replace them with.
            return SEO_META.replace(doc, Anchor::AfterTitle, None);
        };
        let mut lines = vec![html! { meta name="description" content=(description); }.into_string()];
        if let Some(keywords) = keywords {
            lines.push(html! { meta name="keywords" content=(keywords); }.into_string());
        }
        let cleaned = remove_start_tags(doc, |tag| {
            is_named_meta(tag, "description") || is_named_meta(tag, "keywords")
        });
        SEO_META.replace(&cleaned, Anchor::AfterTitle, Some(&lines.join(line_break(doc))))
    }
}

fn is_named_meta(tag: &StartTag, name: &str) -> bool {
    tag.name == "meta" && tag.attr("name").is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
}

fn first_meta_content(doc: &str, name: &str) -> Option<String> {
    tokens(doc).find_map(|token| match token {
        Token::Start { tag, .. } if is_named_meta(&tag, name) => {
            tag.attr("content").map(str::to_string)
        }
        _ => None,
    })
}

/// Elements that end an unclosed `<p>`.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "aside", "header", "footer", "main", "nav", "ul", "ol",
    "li", "table", "blockquote", "form", "h1", "h2", "h3", "h4", "h5", "h6", "body", "html",
];

fn first_paragraph(doc: &str) -> Option<String> {
    if let Some(range) = find_element_inner(doc, "p", None) {
        return Some(doc[range].to_string());
    }
    let mut iter = tokens(doc);
    let start = iter.by_ref().find_map(|token| match token {
        Token::Start { tag, span } if tag.name == "p" => Some(span.end),
        _ => None,
    })?;
    let end = iter
        .find_map(|token| match token {
            Token::Start { tag, span } if BLOCK_TAGS.contains(&tag.name.as_str()) => Some(span.start),
            Token::End { name, span } if BLOCK_TAGS.contains(&name.as_str()) => Some(span.start),
            _ => None,
        })
        .unwrap_or(doc.len());
    Some(doc[start..end].to_string())
}

// ============================================================================
// i18n-seo
// ============================================================================

/// Canonical link plus `uk`, `en` and `x-default` alternates before
/// `</head>`. Pages without a route (never the case for assembled pages)
/// only lose their stale region. Stray canonical and hreflang links
/// elsewhere in the head are removed.
pub struct I18nSeo;

impl Transform for I18nSeo {
    fn name(&self) -> &'static str {
        "i18n-seo"
    }

    fn produces(&self) -> Vec<Region> {
        vec![I18N_SEO]
    }

    fn anchors(&self) -> Vec<Anchor> {
        vec![Anchor::BeforeHeadClose]
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let cleaned = remove_start_tags(doc, |tag| {
            tag.name == "link"
                && tag.attr("rel").is_some_and(|rel| {
                    let rel = rel.trim();
                    rel.eq_ignore_ascii_case("canonical")
                        || (rel.eq_ignore_ascii_case("alternate") && tag.has_attr("hreflang"))
                })
        });
        let body = ctx.route.map(|route| {
            let base = &ctx.env.base_url;
            let alternates = route.alternates(base);
            [
                html! { link rel="canonical" href=(route.canonical_url(base)); },
                html! { link rel="alternate" hreflang="uk" href=(alternates.uk); },
                html! { link rel="alternate" hreflang="en" href=(alternates.en); },
                html! { link rel="alternate" hreflang="x-default" href=(alternates.x_default); },
            ]
            .map(|m| m.into_string())
            .join(line_break(doc))
        });
        I18N_SEO.replace(&cleaned, Anchor::BeforeHeadClose, body.as_deref())
    }
}

// ============================================================================
// favicon
// ============================================================================

/// `icon` and `apple-touch-icon` links for the generated favicon variants.
/// When at least one exists, hand-written icon links are dropped.
pub struct Favicon;

impl Transform for Favicon {
    fn name(&self) -> &'static str {
        "favicon"
    }

    fn produces(&self) -> Vec<Region> {
        vec![FAVICON]
    }

    fn anchors(&self) -> Vec<Anchor> {
        vec![Anchor::BeforeHeadClose]
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let mut lines = Vec::new();
        if let Some(icon) = ctx.images.by_role(VariantRole::Favicon) {
            let sizes = format!("{}x{}", icon.width, icon.height);
            lines.push(html! { link rel="icon" type=(icon.mime()) sizes=(sizes) href=(icon.url()); });
        }
        if let Some(touch) = ctx.images.by_role(VariantRole::AppleTouchIcon) {
            let sizes = format!("{}x{}", touch.width, touch.height);
            lines.push(html! { link rel="apple-touch-icon" sizes=(sizes) href=(touch.url()); });
        }
        if lines.is_empty() {
            return FAVICON.strip(doc);
        }

        let cleaned = remove_start_tags(doc, |tag| {
            tag.name == "link"
                && tag.attr("rel").is_some_and(|rel| {
                    rel.split_ascii_whitespace().any(|r| {
                        r.eq_ignore_ascii_case("icon") || r.eq_ignore_ascii_case("apple-touch-icon")
                    })
                })
        });
        let body = lines
            .into_iter()
            .map(|m| m.into_string())
            .collect::<Vec<_>>()
            .join(line_break(doc));
        FAVICON.replace(&cleaned, Anchor::BeforeHeadClose, Some(&body))
    }
}
