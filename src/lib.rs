//! # Sitekit
//!
//! A static site builder for a bilingual (Ukrainian/English) marketing site.
//! Pages are hand-written HTML in the project root; the build derives the
//! English mirror, rewrites every page for deployment and lays out pretty
//! URLs. Nothing is templated: the source HTML is the design.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! ```text
//! 1. Images     img/*          →  img/* variants + images.json  (image manifest)
//! 2. Translate  *.html         →  en/*.html                     (ordered substitution)
//! 3. Assemble   *.html, en/*   →  dist/                         (rewrite + pretty URLs)
//! 4. Minify     dist/          →  dist/                         (optional, SITE_MINIFY)
//! ```
//!
//! Stages talk to each other through the filesystem only, so each one can be
//! rerun from the CLI on its own.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`prepare`] | Stage 1: runs the `[images]` jobs and persists the image manifest |
//! | [`translate`] | Stage 2: writes `en/` from the `[translate]` tables |
//! | [`assemble`] | Stage 3: erases `dist/`, writes every page to each pretty-URL destination, copies assets |
//! | [`minify`] | Stage 4: HTML/CSS/JS minification in place |
//! | [`site`] | Stage orchestration and [`site::BuildError`] |
//! | [`inject`] | Page rewrites: the transform [`inject::Pipeline`] and its regions |
//! | [`html`] | Marker regions, a start-tag tokenizer and text extraction |
//! | [`route`] | Public URL and language of an output document |
//! | [`naming`] | Source page discovery and pretty-URL destinations |
//! | [`versions`] | `?v=` content-hash tokens for assets |
//! | [`env`] | Validated build environment ([`env::BuildEnv`]) |
//! | [`config`] | `site.toml` loading, validation and merging over stock defaults |
//! | [`imaging`] | Pure-Rust resize and encode operations |
//! | [`types`] | The image manifest shared by stages 1 and 3 |
//! | [`output`] | CLI output formatting for each stage |
//!
//! # Design Decisions
//!
//! ## Marker Regions
//!
//! Everything the build injects into a page sits between
//! `<!-- name:start -->` and `<!-- name:end -->` comments. A transform strips
//! its region and inserts a fresh copy, so running the build over its own
//! output changes nothing, and turning a feature off (unsetting
//! `SITE_GTM_ID`, say) removes what an earlier build injected.
//!
//! ## Routes From Destinations
//!
//! Canonical and hreflang links depend on where a document is served, not on
//! where its source lives. `about.html` is written twice, flat and as
//! `about/index.html`; both copies derive the route `/about/` from their
//! output path and end up byte-identical.
//!
//! ## Configuration Split
//!
//! Per-deployment values (base URL, analytics IDs) come from the environment
//! and are validated once into [`env::BuildEnv`]; an invalid value disables
//! its feature instead of failing the build. Site content settings
//! (translations, SEO overrides, image jobs) live in `site.toml` and an
//! invalid file is fatal.

pub mod assemble;
pub mod config;
pub mod env;
pub mod html;
pub mod imaging;
pub mod inject;
pub mod minify;
pub mod naming;
pub mod output;
pub mod prepare;
pub mod route;
pub mod site;
pub mod translate;
pub mod types;
pub mod versions;

#[cfg(test)]
pub(crate) mod test_helpers;
