//! Routes and canonical URLs.
//!
//! A route is the public URL path a written document is served at. It is
//! derived purely from the destination path inside the output root, never
//! from the source file:
//!
//! | Destination (relative to output root) | Route |
//! |---|---|
//! | `index.html` | `/` |
//! | `about/index.html` | `/about/` |
//! | `about.html` | `/about/` |
//! | `en/index.html` | `/en/` |
//! | `en/about/index.html` | `/en/about/` |
//! | `style.css` | none |
//!
//! The primary language (`uk`) owns the root; the secondary language (`en`)
//! lives under the fixed `/en/` prefix. Alternates are formed by adding or
//! stripping that prefix.

use std::fmt;
use std::path::{Component, Path};

/// Path prefix (without slashes) under which the secondary language lives.
pub const SECONDARY_PREFIX: &str = "en";

/// Site language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    Uk,
    En,
}

impl Lang {
    /// BCP 47 code used in `lang` and `hreflang` attributes.
    pub fn code(self) -> &'static str {
        match self {
            Lang::Uk => "uk",
            Lang::En => "en",
        }
    }

    pub fn is_primary(self) -> bool {
        self == Lang::Uk
    }

    /// Prefix prepended to root-relative links on pages of this language.
    pub fn url_prefix(self) -> &'static str {
        match self {
            Lang::Uk => "",
            Lang::En => "/en",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A URL path that always starts and ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route(String);

/// The three alternate URLs emitted for every route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternates {
    pub uk: String,
    pub en: String,
    pub x_default: String,
}

impl Route {
    /// The site root, `/`.
    pub fn root() -> Self {
        Route("/".to_string())
    }

    /// Derive the route of `destination`, which must live under `output_root`.
    pub fn from_destination(output_root: &Path, destination: &Path) -> Option<Self> {
        let relative = destination.strip_prefix(output_root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Self::from_relative(&parts.join("/"))
    }

    /// Derive a route from a `/`-separated path relative to the output root.
    pub fn from_relative(relative: &str) -> Option<Self> {
        let relative = relative.trim_start_matches('/');
        let (dir, file) = match relative.rsplit_once('/') {
            Some((dir, file)) => (dir, file),
            None => ("", relative),
        };
        let lower = file.to_ascii_lowercase();
        let stem_len = lower.strip_suffix(".html")?.len();
        if stem_len == 0 {
            return None;
        }
        let stem = &file[..stem_len];

        let mut path = String::from("/");
        if !dir.is_empty() {
            path.push_str(dir);
            path.push('/');
        }
        if stem != "index" {
            path.push_str(stem);
            path.push('/');
        }
        Some(Route(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language implied by the route prefix.
    pub fn lang(&self) -> Lang {
        let prefix = format!("/{SECONDARY_PREFIX}/");
        if self.0.starts_with(&prefix) {
            Lang::En
        } else {
            Lang::Uk
        }
    }

    /// The same page in the primary language.
    pub fn primary(&self) -> Route {
        let prefix = format!("/{SECONDARY_PREFIX}");
        match self.0.strip_prefix(&prefix) {
            Some(rest) if rest.starts_with('/') => Route(rest.to_string()),
            _ => self.clone(),
        }
    }

    /// The same page in the secondary language.
    pub fn secondary(&self) -> Route {
        let primary = self.primary();
        Route(format!("/{SECONDARY_PREFIX}{}", primary.0))
    }

    /// Absolute URL of this route. `base_url` carries no trailing slash.
    pub fn canonical_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.0)
    }

    pub fn alternates(&self, base_url: &str) -> Alternates {
        let uk = self.primary().canonical_url(base_url);
        Alternates {
            en: self.secondary().canonical_url(base_url),
            x_default: uk.clone(),
            uk,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
