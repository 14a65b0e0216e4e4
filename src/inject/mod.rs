//! Page rewriting.
//!
//! Every source page passes through a [`Pipeline`] of [`Transform`]s on its
//! way into the output tree. There are two kinds of transform:
//!
//! - **Region transforms** own one or more marker-delimited
//!   [`Region`](crate::html::Region)s. They strip every existing copy and
//!   insert at most one fresh copy at a declared [`Anchor`]. With their
//!   setting absent they still strip, so switching a feature off removes
//!   its markup on the next build.
//! - **Attribute transforms** rewrite individual start tags (`href`, `src`,
//!   `srcset`, `<img>` attributes) and recognise their own earlier output.
//!
//! Each transform is idempotent on its own and the standard pipeline is
//! idempotent as a whole: running a page through it twice yields the bytes of
//! the first run.
//!
//! ## Standard order
//!
//! | # | Transform | Kind | Anchor |
//! |---|---|---|---|
//! | 1 | [`Cleanup`] | text | |
//! | 2 | [`Paths`] | attribute | |
//! | 3 | [`ImageUpgrades`] | attribute | |
//! | 4 | [`SeoMeta`] | region `seo-meta` | after `</title>` |
//! | 5 | [`I18nSeo`] | region `i18n-seo` | before `</head>` |
//! | 6 | [`Favicon`] | region `favicon` | before `</head>` |
//! | 7 | [`SiteScripts`] | region `site-scripts` | before `</body>` |
//! | 8 | [`Gtm`] | regions `gtm`, `gtm-noscript` | before `</head>`, after `<body>` |
//! | 9 | [`Gtag`] | region `gtag` | after `<head>` |
//! | 10 | [`AdsConversion`] | region `ads-conversion` | after `gtag` |
//! | 11 | [`AssetVersions`] | attribute | |

mod analytics;
mod cleanup;
mod images;
mod paths;
mod pipeline;
mod scripts;
mod seo;
mod versions;

pub use analytics::{ADS_CONVERSION, AdsConversion, GA4_LEGACY, GOOGLE_ADS_LEGACY, GTAG, GTM, GTM_NOSCRIPT, Gtag, Gtm};
pub use cleanup::Cleanup;
pub use images::ImageUpgrades;
pub use paths::Paths;
pub use pipeline::{Pipeline, PipelineError};
pub use scripts::{SITE_SCRIPTS, SiteScripts};
pub use seo::{FAVICON, Favicon, I18N_SEO, I18nSeo, SEO_META, SeoMeta};
pub use versions::AssetVersions;

use crate::config::SiteConfig;
use crate::env::BuildEnv;
use crate::html::{Anchor, Region};
use crate::route::{Lang, Route};
use crate::types::ImageManifest;
use crate::versions::VersionTable;
use std::collections::BTreeSet;

/// Everything a transform may consult about the page being written.
///
/// All fields are shared read-only state computed once per build, except
/// the route, language and file name which describe the current document.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Route of the destination, when the destination is a page.
    pub route: Option<&'a Route>,
    pub lang: Lang,
    /// Source file name, e.g. `about.html`. Keys per-page settings.
    pub file_name: &'a str,
    pub env: &'a BuildEnv,
    pub site: &'a SiteConfig,
    pub versions: &'a VersionTable,
    pub images: &'a ImageManifest,
    /// Slugs of every page in the site (`about`, `service-01`, …).
    pub page_slugs: &'a BTreeSet<String>,
}

/// A single idempotent rewrite step.
pub trait Transform {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Regions this transform writes. Attribute transforms write none.
    fn produces(&self) -> Vec<Region> {
        Vec::new()
    }

    /// Insertion points this transform uses.
    fn anchors(&self) -> Vec<Anchor> {
        Vec::new()
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String;
}
