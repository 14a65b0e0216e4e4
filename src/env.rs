//! Build environment read from process environment variables.
//!
//! Every option is independently optional. A value that is empty or fails
//! its validator is treated as absent: the feature it drives is disabled and
//! the matching regions are still stripped from every page. Invalid values
//! are reported once at `warn` level when the environment is read.
//!
//! | Variable | Accepted shape | Default |
//! |---|---|---|
//! | `SITE_BASE_URL` | `http://…` or `https://…` | `https://alpik.com.ua` |
//! | `SITE_GTM_ID` | `GTM-XXXX` (case-insensitive) | none |
//! | `SITE_GA4_ID` | `G-XXXX` (case-insensitive) | none |
//! | `SITE_ADS_ID` | `AW-1234` | none |
//! | `SITE_ADS_CONVERSION_LABEL` | `[A-Za-z0-9_-]+` | none |
//! | `SITE_MINIFY` | `1`, `true`, `yes`, `on` | off |
//!
//! The struct is built once in `main` and passed by reference to every
//! stage; nothing below this module reads `std::env` directly.

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Base URL used for canonical and alternate links when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://alpik.com.ua";

pub const BASE_URL_VAR: &str = "SITE_BASE_URL";
pub const GTM_ID_VAR: &str = "SITE_GTM_ID";
pub const GA4_ID_VAR: &str = "SITE_GA4_ID";
pub const ADS_ID_VAR: &str = "SITE_ADS_ID";
pub const ADS_LABEL_VAR: &str = "SITE_ADS_CONVERSION_LABEL";
pub const MINIFY_VAR: &str = "SITE_MINIFY";

static BASE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/]+(/\S*)?$").unwrap());
static GTM_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^GTM-[A-Z0-9]+$").unwrap());
static GA4_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^G-[A-Z0-9]+$").unwrap());
static ADS_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^AW-[0-9]+$").unwrap());
static ADS_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Validated build-time settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnv {
    /// Scheme and host without a trailing slash, e.g. `https://example.com`.
    pub base_url: String,
    pub gtm_id: Option<String>,
    pub ga4_id: Option<String>,
    pub ads_id: Option<String>,
    pub ads_conversion_label: Option<String>,
    pub minify: bool,
}

impl Default for BuildEnv {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            gtm_id: None,
            ga4_id: None,
            ads_id: None,
            ads_conversion_label: None,
            minify: false,
        }
    }
}

impl BuildEnv {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Tests pass a closure over a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, re: &Regex| validated(key, lookup(key), |v| re.is_match(v));

        let base_url = validated(BASE_URL_VAR, lookup(BASE_URL_VAR), |v| {
            BASE_URL_RE.is_match(v)
        })
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            gtm_id: read(GTM_ID_VAR, &GTM_ID_RE),
            ga4_id: read(GA4_ID_VAR, &GA4_ID_RE),
            ads_id: read(ADS_ID_VAR, &ADS_ID_RE),
            ads_conversion_label: read(ADS_LABEL_VAR, &ADS_LABEL_RE),
            minify: lookup(MINIFY_VAR).is_some_and(|v| is_truthy(&v)),
        }
    }

    /// The Ads account and conversion label, only when both are present.
    pub fn ads_conversion(&self) -> Option<(&str, &str)> {
        match (&self.ads_id, &self.ads_conversion_label) {
            (Some(id), Some(label)) => Some((id.as_str(), label.as_str())),
            _ => None,
        }
    }
}

fn validated(key: &str, raw: Option<String>, valid: impl Fn(&str) -> bool) -> Option<String> {
    let value = raw?.trim().to_string();
    if value.is_empty() {
        return None;
    }
    if valid(&value) {
        Some(value)
    } else {
        warn!(variable = key, value = %value, "ignoring invalid value");
        None
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> BuildEnv {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BuildEnv::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let env = env_of(&[]);
        assert_eq!(env, BuildEnv::default());
        assert_eq!(env.base_url, "https://alpik.com.ua");
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let env = env_of(&[("SITE_BASE_URL", "https://example.com/")]);
        assert_eq!(env.base_url, "https://example.com");
    }

    #[test]
    fn base_url_without_scheme_falls_back_to_default() {
        let env = env_of(&[("SITE_BASE_URL", "example.com")]);
        assert_eq!(env.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn analytics_ids_are_validated() {
        let env = env_of(&[
            ("SITE_GTM_ID", "gtm-ab12"),
            ("SITE_GA4_ID", "G-XYZ9"),
            ("SITE_ADS_ID", "AW-12345"),
            ("SITE_ADS_CONVERSION_LABEL", "abc_DEF-1"),
        ]);
        assert_eq!(env.gtm_id.as_deref(), Some("gtm-ab12"));
        assert_eq!(env.ga4_id.as_deref(), Some("G-XYZ9"));
        assert_eq!(env.ads_conversion(), Some(("AW-12345", "abc_DEF-1")));
    }

    #[test]
    fn malformed_ids_are_treated_as_absent() {
        let env = env_of(&[
            ("SITE_GTM_ID", "UA-1234"),
            ("SITE_GA4_ID", "G-"),
            ("SITE_ADS_ID", "AW-12a"),
            ("SITE_ADS_CONVERSION_LABEL", "has space"),
        ]);
        assert_eq!(env.gtm_id, None);
        assert_eq!(env.ga4_id, None);
        assert_eq!(env.ads_id, None);
        assert_eq!(env.ads_conversion_label, None);
    }

    #[test]
    fn whitespace_around_values_is_trimmed() {
        let env = env_of(&[("SITE_GTM_ID", "  GTM-ABC \n")]);
        assert_eq!(env.gtm_id.as_deref(), Some("GTM-ABC"));
    }

    #[test]
    fn conversion_requires_both_parts() {
        let env = env_of(&[("SITE_ADS_ID", "AW-1")]);
        assert_eq!(env.ads_conversion(), None);
    }

    #[test]
    fn minify_flag_accepts_common_truthy_spellings() {
        for value in ["1", "true", "YES", "on"] {
            assert!(env_of(&[("SITE_MINIFY", value)]).minify, "{value}");
        }
        for value in ["0", "false", "off", ""] {
            assert!(!env_of(&[("SITE_MINIFY", value)]).minify, "{value}");
        }
    }
}
