//! Stage orchestration.
//!
//! Each CLI subcommand maps to one `run_*` function here; [`build`] runs them
//! all in order. Stages hand data to each other through the filesystem
//! (the `en/` mirror, the image manifest in the temp directory), so any
//! stage can be rerun on its own.

use crate::assemble::{AssembleError, AssembleOptions, AssembleReport, assemble};
use crate::config::{self, ConfigError, SiteConfig};
use crate::env::BuildEnv;
use crate::minify::{MinifyError, MinifyReport, minify_tree};
use crate::prepare::{self, PrepareError, PrepareReport};
use crate::translate::{TranslateError, TranslateReport, translate_site};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Image stage failed: {0}")]
    Prepare(#[from] PrepareError),
    #[error("Translate stage failed: {0}")]
    Translate(#[from] TranslateError),
    #[error("Assemble stage failed: {0}")]
    Assemble(#[from] AssembleError),
    #[error("Minify stage failed: {0}")]
    Minify(#[from] MinifyError),
}

/// Directories every stage works with.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Project root holding the source pages and `site.toml`.
    pub root: PathBuf,
    pub output: PathBuf,
    pub temp_dir: PathBuf,
}

/// Results of a full build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub images: PrepareReport,
    pub translate: TranslateReport,
    pub assemble: AssembleReport,
    /// Present when minification was enabled.
    pub minify: Option<MinifyReport>,
}

pub fn load_site_config(options: &BuildOptions) -> Result<SiteConfig, BuildError> {
    Ok(config::load_config(&options.root)?)
}

/// Stage 1: generate image variants and persist their manifest.
pub fn run_images(options: &BuildOptions, site: &SiteConfig) -> Result<PrepareReport, BuildError> {
    let report = prepare::prepare_images(&options.root, &site.images)?;
    prepare::save_manifest(&report.manifest, &options.temp_dir)?;
    info!(
        variants = report.manifest.variants.len(),
        skipped = report.skipped.len(),
        "images prepared"
    );
    Ok(report)
}

/// Stage 2: refresh the `en/` mirror.
pub fn run_translate(options: &BuildOptions, site: &SiteConfig) -> Result<TranslateReport, BuildError> {
    let report = translate_site(&options.root, &site.translate)?;
    info!(written = report.written.len(), "english mirror updated");
    Ok(report)
}

/// Stage 3: write the output tree, using the image manifest of the last
/// image stage run (none at all is fine).
pub fn run_assemble(
    options: &BuildOptions,
    site: &SiteConfig,
    env: &BuildEnv,
) -> Result<AssembleReport, BuildError> {
    let images = prepare::load_manifest(&options.temp_dir)?;
    let report = assemble(
        AssembleOptions {
            root: &options.root,
            output: &options.output,
            temp_dir: &options.temp_dir,
        },
        site,
        env,
        &images,
    )?;
    info!(pages = report.pages.len(), "site assembled");
    Ok(report)
}

/// Stage 4: minify the output tree when `SITE_MINIFY` asks for it.
pub fn run_minify(options: &BuildOptions, env: &BuildEnv) -> Result<Option<MinifyReport>, BuildError> {
    if !env.minify {
        return Ok(None);
    }
    Ok(Some(minify_tree(&options.output)?))
}

/// Run every stage in order.
pub fn build(options: &BuildOptions, env: &BuildEnv) -> Result<BuildReport, BuildError> {
    let site = load_site_config(options)?;
    let images = run_images(options, &site)?;
    let translate = run_translate(options, &site)?;
    let assemble = run_assemble(options, &site, env)?;
    let minify = run_minify(options, env)?;
    Ok(BuildReport {
        images,
        translate,
        assemble,
        minify,
    })
}
