//! CLI output formatting for all build stages.
//!
//! # Output Format
//!
//! ## Images
//!
//! ```text
//! Images (3 variants)
//!     img/logo1.png
//!         logo1-optimized.png  512x256  replace
//!         logo1-optimized.webp  512x256  alternate
//!         favicon-32.png  32x32  favicon
//!     Skipped: img/hero.jpg → hero-bg.webp (source missing)
//! ```
//!
//! ## Translate
//!
//! ```text
//! English mirror
//!     about.html: written
//!     index.html: unchanged
//! ```
//!
//! ## Assemble
//!
//! ```text
//! Pages
//!     about.html → /about/
//!     about/index.html → /about/
//!     index.html → /
//!
//! Assets: 12 copied
//!     Missing: sitemap.xml
//! Versioned: 9 files
//! ```
//!
//! ## Minify
//!
//! ```text
//! Minified 14 files: 48.2 KB → 31.0 KB
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure,
//! with no I/O.

use crate::assemble::AssembleReport;
use crate::minify::MinifyReport;
use crate::prepare::PrepareReport;
use crate::translate::TranslateReport;
use crate::types::ImageVariant;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn role_label(variant: &ImageVariant) -> String {
    serde_json::to_value(variant.role)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Human-readable byte count with one decimal above 1 KB.
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// Images
// ============================================================================

pub fn format_images_output(report: &PrepareReport) -> Vec<String> {
    let variants = &report.manifest.variants;
    let mut lines = vec![format!("Images ({})", plural(variants.len(), "variant"))];

    let mut current_source: Option<&str> = None;
    for variant in variants {
        if current_source != Some(variant.source.as_str()) {
            lines.push(format!("{}{}", indent(1), variant.source));
            current_source = Some(&variant.source);
        }
        let file = variant
            .output
            .rsplit('/')
            .next()
            .unwrap_or(&variant.output);
        lines.push(format!(
            "{}{}  {}x{}  {}",
            indent(2),
            file,
            variant.width,
            variant.height,
            role_label(variant)
        ));
    }

    for skipped in &report.skipped {
        lines.push(format!(
            "{}Skipped: {} → {} (source missing)",
            indent(1),
            skipped.source,
            skipped.output
        ));
    }
    lines
}

pub fn print_images_output(report: &PrepareReport) {
    for line in format_images_output(report) {
        println!("{line}");
    }
}

// ============================================================================
// Translate
// ============================================================================

pub fn format_translate_output(report: &TranslateReport) -> Vec<String> {
    let mut entries: Vec<(&str, &str)> = report
        .written
        .iter()
        .map(|f| (f.as_str(), "written"))
        .chain(report.unchanged.iter().map(|f| (f.as_str(), "unchanged")))
        .collect();
    entries.sort();

    let mut lines = vec!["English mirror".to_string()];
    if entries.is_empty() {
        lines.push(format!("{}(no pages)", indent(1)));
    }
    lines.extend(
        entries
            .into_iter()
            .map(|(file, status)| format!("{}{file}: {status}", indent(1))),
    );
    lines
}

pub fn print_translate_output(report: &TranslateReport) {
    for line in format_translate_output(report) {
        println!("{line}");
    }
}

// ============================================================================
// Assemble
// ============================================================================

pub fn format_assemble_output(report: &AssembleReport) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for page in &report.pages {
        if page.route.is_empty() {
            lines.push(format!("{}{}", indent(1), page.path));
        } else {
            lines.push(format!("{}{} → {}", indent(1), page.path, page.route));
        }
    }

    lines.push(String::new());
    lines.push(format!("Assets: {} copied", report.assets_copied));
    for missing in &report.missing_assets {
        lines.push(format!("{}Missing: {missing}", indent(1)));
    }
    lines.push(format!("Versioned: {}", plural(report.versioned, "file")));
    lines
}

pub fn print_assemble_output(report: &AssembleReport) {
    for line in format_assemble_output(report) {
        println!("{line}");
    }
}

// ============================================================================
// Minify
// ============================================================================

pub fn format_minify_output(report: &MinifyReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Minified {}: {} → {}",
        plural(report.files, "file"),
        format_bytes(report.bytes_before),
        format_bytes(report.bytes_after)
    )];
    for skipped in &report.skipped {
        lines.push(format!("{}Left as-is: {skipped}", indent(1)));
    }
    lines
}

pub fn print_minify_output(report: &MinifyReport) {
    for line in format_minify_output(report) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::WrittenPage;
    use crate::config::VariantRole;
    use crate::prepare::SkippedJob;
    use crate::types::ImageManifest;

    fn variant(output: &str, width: u32, height: u32, role: VariantRole) -> ImageVariant {
        ImageVariant {
            source: "img/logo1.png".into(),
            output: output.into(),
            width,
            height,
            format: output.rsplit('.').next().unwrap().into(),
            role,
        }
    }

    #[test]
    fn images_grouped_by_source() {
        let report = PrepareReport {
            manifest: ImageManifest {
                variants: vec![
                    variant("img/logo1-optimized.png", 512, 256, VariantRole::Replace),
                    variant("img/favicon-32.png", 32, 32, VariantRole::Favicon),
                ],
            },
            skipped: vec![SkippedJob {
                source: "img/hero.jpg".into(),
                output: "img/hero-bg.webp".into(),
            }],
        };
        assert_eq!(
            format_images_output(&report),
            vec![
                "Images (2 variants)",
                "    img/logo1.png",
                "        logo1-optimized.png  512x256  replace",
                "        favicon-32.png  32x32  favicon",
                "    Skipped: img/hero.jpg → img/hero-bg.webp (source missing)",
            ]
        );
    }

    #[test]
    fn translate_lists_pages_alphabetically() {
        let report = TranslateReport {
            written: vec!["index.html".into()],
            unchanged: vec!["about.html".into()],
        };
        assert_eq!(
            format_translate_output(&report),
            vec![
                "English mirror",
                "    about.html: unchanged",
                "    index.html: written"
            ]
        );
    }

    #[test]
    fn translate_without_pages() {
        let lines = format_translate_output(&TranslateReport::default());
        assert_eq!(lines, vec!["English mirror", "    (no pages)"]);
    }

    #[test]
    fn assemble_shows_routes_and_missing_assets() {
        let report = AssembleReport {
            pages: vec![
                WrittenPage {
                    path: "about.html".into(),
                    route: "/about/".into(),
                },
                WrittenPage {
                    path: "index.html".into(),
                    route: "/".into(),
                },
            ],
            assets_copied: 3,
            missing_assets: vec!["sitemap.xml".into()],
            versioned: 1,
        };
        assert_eq!(
            format_assemble_output(&report),
            vec![
                "Pages",
                "    about.html → /about/",
                "    index.html → /",
                "",
                "Assets: 3 copied",
                "    Missing: sitemap.xml",
                "Versioned: 1 file",
            ]
        );
    }

    #[test]
    fn minify_sizes() {
        let report = MinifyReport {
            files: 2,
            bytes_before: 2048,
            bytes_after: 900,
            skipped: vec!["bad.js".into()],
        };
        assert_eq!(
            format_minify_output(&report),
            vec!["Minified 2 files: 2.0 KB → 900 B", "    Left as-is: bad.js"]
        );
    }
}
