//! Ordered transform composition.

use super::{
    AdsConversion, AssetVersions, Cleanup, Favicon, Gtag, Gtm, I18nSeo, ImageUpgrades,
    PageContext, Paths, SeoMeta, SiteScripts, Transform,
};
use crate::html::Region;
use std::collections::HashSet;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PipelineError {
    #[error("transform '{transform}' anchors after region '{region}', which no earlier transform produces")]
    MissingAnchorRegion {
        transform: &'static str,
        region: &'static str,
    },
    #[error("region '{region}' is produced by both '{first}' and '{second}'")]
    DuplicateRegion {
        region: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

/// Transforms applied in a fixed order.
pub struct Pipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.transforms.iter().map(|t| t.name()))
            .finish()
    }
}

impl Pipeline {
    /// Build a pipeline, checking that every region-relative anchor refers
    /// to a region written by an earlier transform and that no region has
    /// two owners.
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Result<Self, PipelineError> {
        let mut owners: Vec<(Region, &'static str)> = Vec::new();
        for transform in &transforms {
            for anchor in transform.anchors() {
                if let Some(region) = anchor.depends_on()
                    && !owners.iter().any(|(r, _)| *r == region)
                {
                    return Err(PipelineError::MissingAnchorRegion {
                        transform: transform.name(),
                        region: region.name(),
                    });
                }
            }
            let mut seen = HashSet::new();
            for region in transform.produces() {
                if !seen.insert(region) {
                    continue;
                }
                if let Some((_, first)) = owners.iter().find(|(r, _)| *r == region) {
                    return Err(PipelineError::DuplicateRegion {
                        region: region.name(),
                        first: *first,
                        second: transform.name(),
                    });
                }
                owners.push((region, transform.name()));
            }
        }
        Ok(Self { transforms })
    }

    /// The full page pipeline in build order.
    pub fn standard() -> Result<Self, PipelineError> {
        Self::new(vec![
            Box::new(Cleanup),
            Box::new(Paths),
            Box::new(ImageUpgrades),
            Box::new(SeoMeta),
            Box::new(I18nSeo),
            Box::new(Favicon),
            Box::new(SiteScripts),
            Box::new(Gtm),
            Box::new(Gtag),
            Box::new(AdsConversion),
            Box::new(AssetVersions),
        ])
    }

    /// Names of the transforms, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    pub fn run(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let mut out = doc.to_string();
        for transform in &self.transforms {
            let next = transform.apply(&out, ctx);
            if next != out {
                trace!(transform = transform.name(), file = ctx.file_name, "changed");
            }
            out = next;
        }
        out
    }
}
