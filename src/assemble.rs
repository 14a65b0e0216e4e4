//! Output tree assembly.
//!
//! Stage 3 of the build. Erases the output directory, then writes every
//! source page through the rewrite [`Pipeline`] to each of its pretty-URL
//! destinations and copies the static assets next to them.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                # home page, root only
//! ├── about.html                # flat copy
//! ├── about/index.html          # pretty-URL copy, same bytes
//! ├── style.css, robots.txt, …  # [assets].files
//! ├── img/                      # [assets].dirs
//! └── en/
//!     ├── index.html
//!     ├── about.html
//!     └── about/index.html
//! ```
//!
//! Each destination gets its own route, derived from where it is written,
//! and is rewritten independently. Both copies of a page resolve to the same
//! route and so end up identical.

use crate::config::SiteConfig;
use crate::env::BuildEnv;
use crate::inject::{PageContext, Pipeline, PipelineError};
use crate::naming::list_pages;
use crate::route::{Lang, Route, SECONDARY_PREFIX};
use crate::types::ImageManifest;
use crate::versions::VersionTable;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Refusing to use {} as output: it contains the project root", .0.display())]
    UnsafeOutput(PathBuf),
}

/// Where the assembler reads from and writes to.
#[derive(Debug, Clone, Copy)]
pub struct AssembleOptions<'a> {
    pub root: &'a Path,
    pub output: &'a Path,
    /// Working directory of earlier stages, excluded from version hashing.
    pub temp_dir: &'a Path,
}

/// A page written to the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPage {
    /// Path relative to the output root, `/`-separated.
    pub path: String,
    pub route: String,
}

/// What the assemble stage did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleReport {
    pub pages: Vec<WrittenPage>,
    pub assets_copied: usize,
    /// Configured asset files and directories that do not exist.
    pub missing_assets: Vec<String>,
    /// Number of files with a version token.
    pub versioned: usize,
}

pub fn assemble(
    options: AssembleOptions<'_>,
    site: &SiteConfig,
    env: &BuildEnv,
    images: &ImageManifest,
) -> Result<AssembleReport, AssembleError> {
    let AssembleOptions {
        root,
        output,
        temp_dir,
    } = options;
    let pipeline = Pipeline::standard()?;

    reset_output(root, output)?;
    let mut skip = vec![fs::canonicalize(output)?];
    skip.extend(fs::canonicalize(temp_dir).ok());
    let versions = VersionTable::scan(&fs::canonicalize(root)?, &skip)?;

    let page_slugs: BTreeSet<String> = list_pages(root)?
        .into_iter()
        .filter(|p| !p.is_home)
        .map(|p| p.slug)
        .collect();

    let mut report = AssembleReport {
        versioned: versions.len(),
        ..Default::default()
    };

    let sources = [
        (Lang::Uk, root.to_path_buf(), output.to_path_buf()),
        (
            Lang::En,
            root.join(SECONDARY_PREFIX),
            output.join(SECONDARY_PREFIX),
        ),
    ];
    for (lang, source_dir, output_dir) in &sources {
        for page in list_pages(source_dir)? {
            let source = fs::read_to_string(source_dir.join(&page.file_name))?;
            for destination in page.destinations() {
                let path = output_dir.join(&destination);
                let route = Route::from_destination(output, &path);
                let ctx = PageContext {
                    route: route.as_ref(),
                    lang: *lang,
                    file_name: &page.file_name,
                    env,
                    site,
                    versions: &versions,
                    images,
                    page_slugs: &page_slugs,
                };
                let html = pipeline.run(&source, &ctx);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, html)?;

                let relative = relative_url(output, &path);
                debug!(path = %relative, route = ?route, "page written");
                report.pages.push(WrittenPage {
                    path: relative,
                    route: route.map(|r| r.to_string()).unwrap_or_default(),
                });
            }
        }
    }

    report.assets_copied += copy_mirror_files(&root.join(SECONDARY_PREFIX), &output.join(SECONDARY_PREFIX))?;
    copy_assets(root, output, site, &mut report)?;
    Ok(report)
}

/// Erase and recreate `output`, refusing any output that would take the
/// sources with it.
fn reset_output(root: &Path, output: &Path) -> Result<(), AssembleError> {
    let root_abs = fs::canonicalize(root)?;
    if output.exists() {
        let output_abs = fs::canonicalize(output)?;
        if root_abs.starts_with(&output_abs) {
            return Err(AssembleError::UnsafeOutput(output.to_path_buf()));
        }
        fs::remove_dir_all(output)?;
    }
    fs::create_dir_all(output)?;
    Ok(())
}

fn copy_assets(
    root: &Path,
    output: &Path,
    site: &SiteConfig,
    report: &mut AssembleReport,
) -> Result<(), AssembleError> {
    for file in &site.assets.files {
        let src = root.join(file);
        if !src.is_file() {
            debug!(file = %file, "asset missing, skipped");
            report.missing_assets.push(file.clone());
            continue;
        }
        let dst = output.join(file);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&src, &dst)?;
        report.assets_copied += 1;
    }

    for dir in &site.assets.dirs {
        let src = root.join(dir);
        if !src.is_dir() {
            debug!(dir = %dir, "asset directory missing, skipped");
            report.missing_assets.push(format!("{dir}/"));
            continue;
        }
        report.assets_copied += copy_dir_recursive(&src, &output.join(dir))?;
    }
    Ok(())
}

/// Copy everything under the `en/` mirror except its pages, which were
/// already written through the pipeline.
fn copy_mirror_files(src: &Path, dst: &Path) -> Result<usize, AssembleError> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() || is_html(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        debug!(file = %relative.display(), "mirror file copied");
        copied += 1;
    }
    Ok(copied)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html"))
}

/// Copy a directory tree, returning the number of files copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(std::io::Error::other)?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn relative_url(output: &Path, path: &Path) -> String {
    path.strip_prefix(output)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
