//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. The file lives in the
//! project root next to the source pages and is optional: stock defaults
//! describe the stock site layout, and a user file overrides only the keys
//! it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! [assets]
//! files = ["style.css", "robots.txt"]  # Copied verbatim to the output root
//! dirs = ["img"]                       # Copied recursively
//!
//! [scripts]
//! body = ["/lang-switcher.js", "/tracking.js"]  # Ensured before </body>
//!
//! [seo]
//! description_max = 160
//!
//! [seo.en."about.html"]
//! description = "Rope access works across Ukraine."
//! keywords = "rope access, facade repair"
//!
//! [translate]
//! common = [["Головна", "Home"], ["Контакти", "Contacts"]]
//!
//! [translate.pages]
//! "about.html" = [["Про нас", "About us"]]
//!
//! [[translate.elements."service-01.html"]]
//! tag = "h1"
//! class = "hero-title"
//! html = "Facade repair"
//!
//! [images]
//! dir = "img"
//!
//! [[images.jobs]]
//! source = "logo1.png"
//! output = "logo1-optimized.png"
//! mode = "fit"
//! height = 256
//! role = "replace"
//! ```
//!
//! ## Merging
//!
//! Tables merge key by key; arrays (including `[[images.jobs]]`) replace the
//! stock value wholesale. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the site configuration inside the project root.
pub const CONFIG_FILENAME: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Static files and directories copied into the output tree.
    pub assets: AssetsConfig,
    /// Scripts every page must reference.
    pub scripts: ScriptsConfig,
    /// Meta description/keywords settings and per-page overrides.
    pub seo: SeoConfig,
    /// Substitution tables for deriving English pages.
    pub translate: TranslateConfig,
    /// Image variants generated before pages are assembled.
    pub images: ImagesConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seo.description_max < 20 {
            return Err(ConfigError::Validation(
                "seo.description_max must be at least 20".into(),
            ));
        }
        for script in &self.scripts.body {
            if !script.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "scripts.body entry '{script}' must be root-relative"
                )));
            }
        }
        for (page, pairs) in std::iter::once(("common", &self.translate.common))
            .chain(self.translate.pages.iter().map(|(k, v)| (k.as_str(), v)))
        {
            if pairs.iter().any(|[from, _]| from.is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "translate table '{page}' has an empty source string"
                )));
            }
        }
        for (page, rewrites) in &self.translate.elements {
            if rewrites.iter().any(|r| r.tag.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "translate.elements.\"{page}\" has a rewrite without a tag"
                )));
            }
        }
        self.images.validate()
    }
}

/// Static files copied verbatim to the output root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Files in the project root. Missing files are skipped.
    pub files: Vec<String>,
    /// Directories copied recursively. Missing directories are skipped.
    pub dirs: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            files: [
                "style.css",
                "sitemap.xml",
                "robots.txt",
                "lang-switcher.js",
                "tracking.js",
                "protect-media.js",
                "_redirects",
                "_headers",
            ]
            .map(String::from)
            .to_vec(),
            dirs: vec!["img".to_string()],
        }
    }
}

/// Scripts injected before `</body>` unless the page already references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptsConfig {
    pub body: Vec<String>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            body: vec!["/lang-switcher.js".to_string(), "/tracking.js".to_string()],
        }
    }
}

/// Meta description and keyword settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeoConfig {
    /// Maximum description length in characters, ellipsis included.
    pub description_max: usize,
    /// Overrides for Ukrainian pages, keyed by source file name.
    pub uk: BTreeMap<String, PageSeo>,
    /// Overrides for English pages, keyed by source file name.
    pub en: BTreeMap<String, PageSeo>,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            description_max: 160,
            uk: BTreeMap::new(),
            en: BTreeMap::new(),
        }
    }
}

impl SeoConfig {
    pub fn page(&self, lang: crate::route::Lang, file_name: &str) -> Option<&PageSeo> {
        match lang {
            crate::route::Lang::Uk => self.uk.get(file_name),
            crate::route::Lang::En => self.en.get(file_name),
        }
    }
}

/// Per-page SEO override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageSeo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

/// Ordered substitution tables. Pairs are `[ukrainian, english]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslateConfig {
    /// Applied to every page, first to last.
    pub common: Vec<[String; 2]>,
    /// Applied after `common`, keyed by source file name.
    pub pages: BTreeMap<String, Vec<[String; 2]>>,
    /// Inner-HTML replacements applied after all pairs.
    pub elements: BTreeMap<String, Vec<ElementRewrite>>,
}

/// Replace the inner HTML of the first element matching `tag` (and `class`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementRewrite {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub html: String,
}

/// How a job fits the source into its target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMode {
    /// Scale down within the bounding box, preserving aspect ratio. Never enlarges.
    Fit,
    /// Scale into an exact canvas, padding with transparency.
    Contain,
}

/// What a generated variant is used for when pages are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantRole {
    /// `<img src>` pointing at the source is rewritten to the variant.
    Replace,
    /// Offered as a `<picture>` WebP `<source>` next to the source image.
    Alternate,
    /// Linked as the page favicon.
    Favicon,
    /// Linked as the Apple touch icon.
    AppleTouchIcon,
    /// Generated only; pages are not rewritten.
    Asset,
}

/// A single image derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageJob {
    /// Source file, relative to `images.dir`.
    pub source: String,
    /// Output file, relative to `images.dir`. The extension picks the format.
    pub output: String,
    pub mode: FitMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Lossy encoding quality (1-100). Lossless formats ignore it.
    #[serde(default = "default_quality")]
    pub quality: u32,
    pub role: VariantRole,
}

fn default_quality() -> u32 {
    80
}

impl ImageJob {
    fn new(source: &str, output: &str, mode: FitMode, role: VariantRole) -> Self {
        Self {
            source: source.to_string(),
            output: output.to_string(),
            mode,
            width: None,
            height: None,
            quality: default_quality(),
            role,
        }
    }

    fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    fn quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }
}

/// Output extensions the image stage can encode.
pub const OUTPUT_EXTENSIONS: &[&str] = &["png", "webp", "jpg", "jpeg"];

/// Image derivation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Image directory relative to the project root.
    pub dir: String,
    pub jobs: Vec<ImageJob>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        use FitMode::{Contain, Fit};
        use VariantRole::{Alternate, AppleTouchIcon, Favicon, Replace};

        let mut jobs = vec![
            ImageJob::new("logo1.png", "logo1-optimized.png", Fit, Replace).height(256),
            ImageJob::new("logo1.png", "logo1-optimized.webp", Fit, Alternate).height(256),
            ImageJob::new("logo1.png", "favicon-32.png", Contain, Favicon)
                .width(32)
                .height(32),
            ImageJob::new("logo1.png", "apple-touch-icon-180.png", Contain, AppleTouchIcon)
                .width(180)
                .height(180),
        ];
        for bg in ["hero-bg", "about-bg", "flat-roof-bg", "contact-bg"] {
            jobs.push(
                ImageJob::new(&format!("{bg}.jpg"), &format!("{bg}.webp"), Fit, Alternate)
                    .width(1600)
                    .quality(78),
            );
        }

        Self {
            dir: "img".to_string(),
            jobs,
        }
    }
}

impl ImagesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut outputs = HashSet::new();
        for job in &self.jobs {
            let label = format!("images.jobs '{}'", job.output);
            if job.width.is_none() && job.height.is_none() {
                return Err(ConfigError::Validation(format!(
                    "{label} needs a width or a height"
                )));
            }
            if job.mode == FitMode::Contain && (job.width.is_none() || job.height.is_none()) {
                return Err(ConfigError::Validation(format!(
                    "{label} uses mode = \"contain\" and needs both width and height"
                )));
            }
            if job.width == Some(0) || job.height == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "{label} has a zero dimension"
                )));
            }
            if !(1..=100).contains(&job.quality) {
                return Err(ConfigError::Validation(format!(
                    "{label} quality must be 1-100"
                )));
            }
            let ext = Path::new(&job.output)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            if !OUTPUT_EXTENSIONS.contains(&ext.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "{label} has unsupported output format '{ext}'"
                )));
            }
            if job.output == job.source {
                return Err(ConfigError::Validation(format!(
                    "{label} would overwrite its source"
                )));
            }
            if !outputs.insert(job.output.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "{label} is produced by more than one job"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `site.toml` from the project root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `site.toml` in the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sitekit configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Tables merge key by key with the defaults; arrays replace them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Static assets
# ---------------------------------------------------------------------------
[assets]
# Files in the project root copied verbatim to the output root.
# Missing files are skipped.
files = [
    "style.css",
    "sitemap.xml",
    "robots.txt",
    "lang-switcher.js",
    "tracking.js",
    "protect-media.js",
    "_redirects",
    "_headers",
]
# Directories copied recursively.
dirs = ["img"]

# ---------------------------------------------------------------------------
# Site scripts
# ---------------------------------------------------------------------------
[scripts]
# Added before </body> on every page that does not already load them.
body = ["/lang-switcher.js", "/tracking.js"]

# ---------------------------------------------------------------------------
# SEO
# ---------------------------------------------------------------------------
[seo]
# Meta descriptions are clamped to this many characters at a word boundary.
description_max = 160

# Per-page overrides, keyed by source file name:
# [seo.uk."about.html"]
# description = "..."
# keywords = "..."
#
# [seo.en."about.html"]
# description = "..."

# ---------------------------------------------------------------------------
# Translation tables (uk -> en)
# ---------------------------------------------------------------------------
[translate]
# Literal substring pairs applied to every page, first to last.
common = []

# Per-page pairs, applied after the common table:
# [translate.pages]
# "about.html" = [["Про нас", "About us"]]

# Inner-HTML rewrites for long structured content:
# [[translate.elements."service-01.html"]]
# tag = "div"
# class = "service-prose"
# html = "<p>...</p>"

# ---------------------------------------------------------------------------
# Image variants
# ---------------------------------------------------------------------------
[images]
dir = "img"

# mode = "fit"     scale down within width/height, never enlarge
# mode = "contain" exact width x height canvas with transparent padding
# role = "replace" | "alternate" | "favicon" | "apple-touch-icon" | "asset"
[[images.jobs]]
source = "logo1.png"
output = "logo1-optimized.png"
mode = "fit"
height = 256
role = "replace"

[[images.jobs]]
source = "logo1.png"
output = "logo1-optimized.webp"
mode = "fit"
height = 256
role = "alternate"

[[images.jobs]]
source = "logo1.png"
output = "favicon-32.png"
mode = "contain"
width = 32
height = 32
role = "favicon"

[[images.jobs]]
source = "logo1.png"
output = "apple-touch-icon-180.png"
mode = "contain"
width = 180
height = 180
role = "apple-touch-icon"

[[images.jobs]]
source = "hero-bg.jpg"
output = "hero-bg.webp"
mode = "fit"
width = 1600
quality = 78
role = "alternate"

[[images.jobs]]
source = "about-bg.jpg"
output = "about-bg.webp"
mode = "fit"
width = 1600
quality = 78
role = "alternate"

[[images.jobs]]
source = "flat-roof-bg.jpg"
output = "flat-roof-bg.webp"
mode = "fit"
width = 1600
quality = 78
role = "alternate"

[[images.jobs]]
source = "contact-bg.jpg"
output = "contact-bg.webp"
mode = "fit"
width = 1600
quality = 78
role = "alternate"
"##
}
