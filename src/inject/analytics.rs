//! Tag Manager, gtag.js and Ads conversion snippets.
//!
//! All three are driven by [`BuildEnv`](crate::env::BuildEnv). An unset or
//! invalid identifier disables the snippet, and the next build strips
//! whatever an earlier build injected.

use super::{PageContext, Transform};
use crate::html::{Anchor, Region, line_break};
use maud::html;

pub const GTM: Region = Region::new("gtm");
pub const GTM_NOSCRIPT: Region = Region::new("gtm-noscript");
pub const GTAG: Region = Region::new("gtag");
pub const ADS_CONVERSION: Region = Region::new("ads-conversion");
/// Older separate GA4 block, superseded by [`GTAG`].
pub const GA4_LEGACY: Region = Region::new("ga4");
/// Older separate Ads block, superseded by [`GTAG`].
pub const GOOGLE_ADS_LEGACY: Region = Region::new("google-ads");

const GTAG_SRC: &str = "https://www.googletagmanager.com/gtag/js";

// ============================================================================
// Tag Manager
// ============================================================================

/// Container loader before `</head>` and the `<noscript>` frame right after
/// `<body>`.
pub struct Gtm;

impl Transform for Gtm {
    fn name(&self) -> &'static str {
        "gtm"
    }

    fn produces(&self) -> Vec<Region> {
        vec![GTM, GTM_NOSCRIPT]
    }

    fn anchors(&self) -> Vec<Anchor> {
        vec![Anchor::BeforeHeadClose, Anchor::AfterBodyOpen]
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let id = ctx.env.gtm_id.as_deref();
        let head = id.map(gtm_loader);
        let noscript = id.map(|id| {
            let src = format!("https://www.googletagmanager.com/ns.html?id={id}");
            html! {
                noscript {
                    iframe src=(src) height="0" width="0" style="display:none;visibility:hidden" {}
                }
            }
            .into_string()
        });
        let out = GTM.replace(doc, Anchor::BeforeHeadClose, head.as_deref());
        GTM_NOSCRIPT.replace(&out, Anchor::AfterBodyOpen, noscript.as_deref())
    }
}

fn gtm_loader(id: &str) -> String {
    format!(
        "<script>(function(w,d,s,l,i){{w[l]=w[l]||[];w[l].push({{'gtm.start':new Date().getTime(),event:'gtm.js'}});\
var f=d.getElementsByTagName(s)[0],j=d.createElement(s),dl=l!='dataLayer'?'&l='+l:'';j.async=true;\
j.src='https://www.googletagmanager.com/gtm.js?id='+i+dl;f.parentNode.insertBefore(j,f);\
}})(window,document,'script','dataLayer','{id}');</script>"
    )
}

// ============================================================================
// gtag.js
// ============================================================================

/// One gtag.js loader configured for GA4 and/or Google Ads, first thing in
/// `<head>`. Also removes the separate `ga4` and `google-ads` blocks older
/// builds wrote.
pub struct Gtag;

impl Transform for Gtag {
    fn name(&self) -> &'static str {
        "gtag"
    }

    fn produces(&self) -> Vec<Region> {
        vec![GTAG]
    }

    fn anchors(&self) -> Vec<Anchor> {
        vec![Anchor::AfterHeadOpen]
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let stripped = GOOGLE_ADS_LEGACY.strip(&GA4_LEGACY.strip(doc));
        let ids: Vec<&str> = [ctx.env.ga4_id.as_deref(), ctx.env.ads_id.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        let body = ids.first().map(|first| {
            let nl = line_break(doc);
            let loader = html! {
                script async src=(format!("{GTAG_SRC}?id={first}")) {}
            }
            .into_string();
            let mut config = vec![
                "<script>".to_string(),
                "window.dataLayer = window.dataLayer || [];".to_string(),
                "function gtag(){dataLayer.push(arguments);}".to_string(),
                "gtag('js', new Date());".to_string(),
            ];
            config.extend(ids.iter().map(|id| format!("gtag('config', '{id}');")));
            config.push("</script>".to_string());
            format!("{loader}{nl}{}", config.join(nl))
        });
        GTAG.replace(&stripped, Anchor::AfterHeadOpen, body.as_deref())
    }
}

// ============================================================================
// Ads conversion
// ============================================================================

/// Reports a Google Ads conversion when a visitor clicks a phone or e-mail
/// link. Sits directly after the gtag block it relies on.
pub struct AdsConversion;

impl Transform for AdsConversion {
    fn name(&self) -> &'static str {
        "ads-conversion"
    }

    fn produces(&self) -> Vec<Region> {
        vec![ADS_CONVERSION]
    }

    fn anchors(&self) -> Vec<Anchor> {
        vec![Anchor::AfterRegion(GTAG)]
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let body = ctx.env.ads_conversion().map(|(id, label)| {
            let report = format!("  gtag('event', 'conversion', {{'send_to': '{id}/{label}'}});");
            [
                "<script>",
                "document.addEventListener('click', function (e) {",
                "  var link = e.target.closest && e.target.closest('a[href^=\"tel:\"], a[href^=\"mailto:\"]');",
                "  if (!link || typeof gtag !== 'function') return;",
                report.as_str(),
                "});",
                "</script>",
            ]
            .join(line_break(doc))
        });
        ADS_CONVERSION.replace(doc, Anchor::AfterRegion(GTAG), body.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::fixtures::{Ctx, PAGE, apply_stable};

    fn ctx() -> Ctx {
        let mut ctx = Ctx::page("/", "index.html");
        ctx.env.gtm_id = Some("GTM-ABC123".into());
        ctx.env.ga4_id = Some("G-XYZ789".into());
        ctx.env.ads_id = Some("AW-123456".into());
        ctx.env.ads_conversion_label = Some("lbl_1".into());
        ctx
    }

    // =========================================================================
    // gtm
    // =========================================================================

    #[test]
    fn gtm_blocks_in_head_and_body() {
        let out = apply_stable(&Gtm, PAGE, &ctx());
        assert!(out.contains("'dataLayer','GTM-ABC123');</script>\n<!-- gtm:end -->\n</head>"));
        assert!(out.contains(
            "<body>\n<!-- gtm-noscript:start -->\n<noscript><iframe src=\"https://www.googletagmanager.com/ns.html?id=GTM-ABC123\" height=\"0\" width=\"0\" style=\"display:none;visibility:hidden\"></iframe></noscript>\n<!-- gtm-noscript:end -->\n<header>"
        ));
    }

    #[test]
    fn gtm_off_strips_both_blocks() {
        let with = Gtm.apply(PAGE, &ctx().get());
        let plain = Ctx::page("/", "index.html");
        let out = apply_stable(&Gtm, &with, &plain);
        assert_eq!(GTM.count(&out), 0);
        assert_eq!(GTM_NOSCRIPT.count(&out), 0);
        assert!(!out.contains("googletagmanager"));
    }

    // =========================================================================
    // gtag
    // =========================================================================

    #[test]
    fn gtag_configures_both_ids() {
        let out = apply_stable(&Gtag, PAGE, &ctx());
        assert!(out.contains(
            "<head>\n<!-- gtag:start -->\n<script async src=\"https://www.googletagmanager.com/gtag/js?id=G-XYZ789\"></script>\n<script>"
        ));
        assert!(out.contains("gtag('config', 'G-XYZ789');\ngtag('config', 'AW-123456');\n</script>\n<!-- gtag:end -->"));
    }

    #[test]
    fn gtag_with_ads_only_loads_ads_id() {
        let mut ctx = Ctx::page("/", "index.html");
        ctx.env.ads_id = Some("AW-42".into());
        let out = apply_stable(&Gtag, PAGE, &ctx);
        assert!(out.contains("gtag/js?id=AW-42"));
        assert!(!out.contains("G-"));
    }

    #[test]
    fn gtag_removes_legacy_blocks() {
        let doc = "<head>\n<!-- ga4:start -->\n<script>ga4</script>\n<!-- ga4:end -->\n<!-- google-ads:start -->\n<script>ads</script>\n<!-- google-ads:end -->\n<title>T</title>\n</head>";
        let out = apply_stable(&Gtag, doc, &ctx());
        assert_eq!(GA4_LEGACY.count(&out), 0);
        assert_eq!(GOOGLE_ADS_LEGACY.count(&out), 0);
        assert_eq!(GTAG.count(&out), 1);
    }

    // =========================================================================
    // ads-conversion
    // =========================================================================

    #[test]
    fn conversion_follows_gtag() {
        let ctx = ctx();
        let out = AdsConversion.apply(&Gtag.apply(PAGE, &ctx.get()), &ctx.get());
        let gtag_end = out.find("<!-- gtag:end -->").unwrap();
        let conversion = out.find("<!-- ads-conversion:start -->").unwrap();
        assert_eq!(&out[gtag_end..conversion], "<!-- gtag:end -->\n");
        assert!(out.contains("'send_to': 'AW-123456/lbl_1'"));
    }

    #[test]
    fn conversion_without_gtag_goes_after_head() {
        let out = apply_stable(&AdsConversion, PAGE, &ctx());
        assert!(out.contains("<head>\n<!-- ads-conversion:start -->"));
    }

    #[test]
    fn conversion_needs_label() {
        let mut ctx = ctx();
        ctx.env.ads_conversion_label = None;
        let doc = "<head>\n<!-- ads-conversion:start -->\nold\n<!-- ads-conversion:end -->\n</head>";
        assert_eq!(apply_stable(&AdsConversion, doc, &ctx), "<head>\n</head>");
    }
}
