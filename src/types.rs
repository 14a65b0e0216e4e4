//! Shared types used across pipeline stages.
//!
//! The image manifest is written by the image stage as `images.json` in the
//! temp directory and read back by the assembler, so the two can run as
//! separate CLI invocations.

use crate::config::VariantRole;
use serde::{Deserialize, Serialize};

/// An image derived from a source image by the image stage.
///
/// Paths are relative to the project root with `/` separators
/// (`img/logo1-optimized.png`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    pub source: String,
    pub output: String,
    pub width: u32,
    pub height: u32,
    /// Lowercase output extension (`png`, `webp`, …).
    pub format: String,
    pub role: VariantRole,
}

impl ImageVariant {
    /// Root-relative URL of the generated file.
    pub fn url(&self) -> String {
        format!("/{}", self.output)
    }

    /// Root-relative URL of the source file.
    pub fn source_url(&self) -> String {
        format!("/{}", self.source)
    }

    /// MIME type for `<source type>` and `<link type>`.
    pub fn mime(&self) -> &'static str {
        match self.format.as_str() {
            "webp" => "image/webp",
            "png" => "image/png",
            "avif" => "image/avif",
            _ => "image/jpeg",
        }
    }
}

/// Everything the image stage produced in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageManifest {
    pub variants: Vec<ImageVariant>,
}

impl ImageManifest {
    /// First variant with the given role.
    pub fn by_role(&self, role: VariantRole) -> Option<&ImageVariant> {
        self.variants.iter().find(|v| v.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(source: &str, output: &str, role: VariantRole) -> ImageVariant {
        ImageVariant {
            source: source.into(),
            output: output.into(),
            width: 10,
            height: 10,
            format: output.rsplit('.').next().unwrap().into(),
            role,
        }
    }

    #[test]
    fn urls_are_root_relative() {
        let v = variant("img/a.png", "img/a.webp", VariantRole::Alternate);
        assert_eq!(v.url(), "/img/a.webp");
        assert_eq!(v.source_url(), "/img/a.png");
        assert_eq!(v.mime(), "image/webp");
    }

    #[test]
    fn lookup_by_role() {
        let manifest = ImageManifest {
            variants: vec![
                variant("img/a.png", "img/a-small.png", VariantRole::Replace),
                variant("img/a.png", "img/a.webp", VariantRole::Alternate),
                variant("img/b.png", "img/b.webp", VariantRole::Alternate),
            ],
        };
        let alt = manifest.by_role(VariantRole::Alternate).unwrap();
        assert_eq!(alt.output, "img/a.webp");
        assert!(manifest.by_role(VariantRole::Favicon).is_none());
    }

    #[test]
    fn manifest_json_uses_kebab_case_roles() {
        let manifest = ImageManifest {
            variants: vec![variant("img/l.png", "img/t.png", VariantRole::AppleTouchIcon)],
        };
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains("\"apple-touch-icon\""));
        let back: ImageManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, manifest);
    }
}
