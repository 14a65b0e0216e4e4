//! Page filename conventions.
//!
//! Source pages are flat `*.html` files in the project root (and the `en/`
//! mirror). The file stem is the page slug, which becomes the pretty URL:
//!
//! - `index.html` → home page, served at `/` (case-insensitive match)
//! - `about.html` → slug `about`, served at `/about/`
//! - `service-01.html` → slug `service-01`, served at `/service-01/`
//!
//! Anything that is not an `.html` file is not a page.

use std::io;
use std::path::Path;

/// A source page recognized by its file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageName {
    /// File name as found on disk, e.g. `about.html`.
    pub file_name: String,
    /// File stem, e.g. `about`. For the home page this is `index`.
    pub slug: String,
    pub is_home: bool,
}

impl PageName {
    /// Output paths (relative to an output root) this page is written to.
    ///
    /// The home page lands only at `index.html`; every other page gets a
    /// flat copy and a pretty-URL directory copy.
    pub fn destinations(&self) -> Vec<String> {
        if self.is_home {
            vec!["index.html".to_string()]
        } else {
            vec![
                format!("{}.html", self.slug),
                format!("{}/index.html", self.slug),
            ]
        }
    }
}

/// Parse a file name into a page, or `None` when it is not an HTML page.
///
/// - `"index.html"` / `"INDEX.HTML"` → home page
/// - `"about.html"` → slug `about`
/// - `"style.css"`, `".html"`, `"notes.htm"` → `None`
pub fn parse_page_name(file_name: &str) -> Option<PageName> {
    let lower = file_name.to_ascii_lowercase();
    let stem_len = lower.strip_suffix(".html")?.len();
    if stem_len == 0 {
        return None;
    }
    let slug = &file_name[..stem_len];
    Some(PageName {
        file_name: file_name.to_string(),
        slug: slug.to_string(),
        is_home: slug.eq_ignore_ascii_case("index"),
    })
}

/// List the pages directly inside `dir`, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn list_pages(dir: &Path) -> io::Result<Vec<PageName>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(page) = entry.file_name().to_str().and_then(parse_page_name) {
            pages.push(page);
        }
    }
    pages.sort();
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn plain_page() {
        let p = parse_page_name("about.html").unwrap();
        assert_eq!(p.slug, "about");
        assert!(!p.is_home);
    }

    #[test]
    fn home_page_is_case_insensitive() {
        assert!(parse_page_name("index.html").unwrap().is_home);
        assert!(parse_page_name("Index.HTML").unwrap().is_home);
    }

    #[test]
    fn non_pages_are_rejected() {
        assert_eq!(parse_page_name("style.css"), None);
        assert_eq!(parse_page_name(".html"), None);
        assert_eq!(parse_page_name("notes.htm"), None);
    }

    #[test]
    fn home_page_has_single_destination() {
        let home = parse_page_name("index.html").unwrap();
        assert_eq!(home.destinations(), vec!["index.html"]);
    }

    #[test]
    fn other_pages_get_flat_and_pretty_copies() {
        let page = parse_page_name("service-01.html").unwrap();
        assert_eq!(
            page.destinations(),
            vec!["service-01.html", "service-01/index.html"]
        );
    }

    #[test]
    fn list_pages_skips_assets_and_directories() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("index.html"), "").unwrap();
        std::fs::write(tmp.path().join("about.html"), "").unwrap();
        std::fs::write(tmp.path().join("style.css"), "").unwrap();
        std::fs::create_dir(tmp.path().join("en.html")).unwrap();

        let names: Vec<String> = list_pages(tmp.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name)
            .collect();
        assert_eq!(names, vec!["about.html", "index.html"]);
    }

    #[test]
    fn list_pages_of_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(list_pages(&tmp.path().join("nope")).unwrap().is_empty());
    }
}
