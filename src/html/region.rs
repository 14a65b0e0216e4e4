//! Marker-delimited regions and insertion anchors.
//!
//! A region is a block of generated markup wrapped in a pair of comments:
//!
//! ```html
//! <!-- gtm:start -->
//! <script>…</script>
//! <!-- gtm:end -->
//! ```
//!
//! Replacing a region always happens in two steps. [`Region::strip`] deletes
//! every existing copy together with the whitespace around it, leaving a
//! single line break. [`Region::insert`] then splices one fresh copy at an
//! [`Anchor`], trimming the whitespace on both sides of the insertion point
//! and surrounding the block with single line breaks. Because the inserted
//! block is bounded by exactly the whitespace the strip step leaves behind,
//! `strip` followed by `insert` reproduces its own output byte for byte.
//!
//! Line breaks follow the document: `\r\n` when it contains one, `\n`
//! otherwise.

use regex::Regex;
use std::sync::LazyLock;

static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").unwrap());
static HEAD_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head\s*>").unwrap());
static BODY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body(?:\s[^>]*)?>").unwrap());
static BODY_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").unwrap());
static TITLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</title\s*>").unwrap());

/// Line break used by `doc`.
pub fn line_break(doc: &str) -> &'static str {
    if doc.contains("\r\n") { "\r\n" } else { "\n" }
}

/// A named, marker-delimited region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region(&'static str);

impl Region {
    pub const fn new(name: &'static str) -> Self {
        Region(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }

    pub fn start_marker(&self) -> String {
        format!("<!-- {}:start -->", self.0)
    }

    pub fn end_marker(&self) -> String {
        format!("<!-- {}:end -->", self.0)
    }

    /// Byte offset just past the end marker of the first complete copy.
    pub fn end_of(&self, doc: &str) -> Option<usize> {
        let start = doc.find(&self.start_marker())?;
        let end_marker = self.end_marker();
        let end = doc[start..].find(&end_marker)?;
        Some(start + end + end_marker.len())
    }

    /// Number of complete copies in `doc`.
    pub fn count(&self, doc: &str) -> usize {
        let (start_marker, end_marker) = (self.start_marker(), self.end_marker());
        let mut count = 0;
        let mut pos = 0;
        while let Some(s) = doc[pos..].find(&start_marker) {
            let after_start = pos + s + start_marker.len();
            match doc[after_start..].find(&end_marker) {
                Some(e) => {
                    count += 1;
                    pos = after_start + e + end_marker.len();
                }
                None => break,
            }
        }
        count
    }

    /// Remove every complete copy and the whitespace around it.
    ///
    /// Each removed copy leaves one line break behind. A start marker with no
    /// matching end marker is left in place.
    pub fn strip(&self, doc: &str) -> String {
        let nl = line_break(doc);
        let (start_marker, end_marker) = (self.start_marker(), self.end_marker());
        let mut out = String::with_capacity(doc.len());
        let mut rest = doc;
        while let Some(s) = rest.find(&start_marker) {
            let after_start = s + start_marker.len();
            let Some(e) = rest[after_start..].find(&end_marker) else {
                break;
            };
            let after_end = after_start + e + end_marker.len();
            out.push_str(rest[..s].trim_end());
            out.push_str(nl);
            rest = rest[after_end..].trim_start();
        }
        out.push_str(rest);
        out
    }

    /// Wrap `body` in this region's markers.
    pub fn wrap(&self, body: &str, nl: &str) -> String {
        format!("{}{nl}{body}{nl}{}", self.start_marker(), self.end_marker())
    }

    /// Strip existing copies, then insert `body` at `anchor` when both are
    /// present. With no body the result is the stripped document.
    pub fn replace(&self, doc: &str, anchor: Anchor, body: Option<&str>) -> String {
        let stripped = self.strip(doc);
        match body {
            Some(body) => self.insert(&stripped, anchor, body),
            None => stripped,
        }
    }

    /// Insert one copy of the region at `anchor`. When the anchor cannot be
    /// located the document is returned unchanged.
    pub fn insert(&self, doc: &str, anchor: Anchor, body: &str) -> String {
        let Some(at) = anchor.locate(doc) else {
            return doc.to_string();
        };
        let nl = line_break(doc);
        let (before, after) = doc.split_at(at);
        format!(
            "{}{nl}{}{nl}{}",
            before.trim_end(),
            self.wrap(body, nl),
            after.trim_start()
        )
    }
}

/// Fixed insertion points inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Just after the opening `<head…>` tag.
    AfterHeadOpen,
    /// Just before `</head>`.
    BeforeHeadClose,
    /// Just after `</title>`, else before `</head>`.
    AfterTitle,
    /// Just after the opening `<body…>` tag.
    AfterBodyOpen,
    /// Just before `</body>`.
    BeforeBodyClose,
    /// Just after another region's end marker, else after `<head…>`.
    AfterRegion(Region),
}

impl Anchor {
    /// Byte offset of the insertion point in `doc`.
    pub fn locate(&self, doc: &str) -> Option<usize> {
        match self {
            Anchor::AfterHeadOpen => HEAD_OPEN_RE.find(doc).map(|m| m.end()),
            Anchor::BeforeHeadClose => HEAD_CLOSE_RE.find(doc).map(|m| m.start()),
            Anchor::AfterTitle => TITLE_CLOSE_RE
                .find(doc)
                .map(|m| m.end())
                .or_else(|| Anchor::BeforeHeadClose.locate(doc)),
            Anchor::AfterBodyOpen => BODY_OPEN_RE.find(doc).map(|m| m.end()),
            Anchor::BeforeBodyClose => BODY_CLOSE_RE.find(doc).map(|m| m.start()),
            Anchor::AfterRegion(region) => region
                .end_of(doc)
                .or_else(|| Anchor::AfterHeadOpen.locate(doc)),
        }
    }

    /// The region this anchor depends on, if any.
    pub fn depends_on(&self) -> Option<Region> {
        match self {
            Anchor::AfterRegion(region) => Some(*region),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: Region = Region::new("demo");
    const OTHER: Region = Region::new("other");

    const PAGE: &str = "<!DOCTYPE html>\n<html>\n<head>\n  <title>T</title>\n</head>\n<body>\n  <header>h</header>\n</body>\n</html>\n";

    #[test]
    fn markers_use_region_name() {
        assert_eq!(DEMO.start_marker(), "<!-- demo:start -->");
        assert_eq!(DEMO.end_marker(), "<!-- demo:end -->");
    }

    #[test]
    fn insert_before_head_close() {
        let out = DEMO.insert(PAGE, Anchor::BeforeHeadClose, "<meta x>");
        assert!(out.contains(
            "<title>T</title>\n<!-- demo:start -->\n<meta x>\n<!-- demo:end -->\n</head>"
        ));
    }

    #[test]
    fn head_open_does_not_match_header() {
        let doc = "<header>x</header><head lang=\"uk\"><title>t</title></head>";
        let at = Anchor::AfterHeadOpen.locate(doc).unwrap();
        assert_eq!(&doc[..at], "<header>x</header><head lang=\"uk\">");
    }

    #[test]
    fn replace_is_idempotent_for_every_anchor() {
        for anchor in [
            Anchor::AfterHeadOpen,
            Anchor::BeforeHeadClose,
            Anchor::AfterTitle,
            Anchor::AfterBodyOpen,
            Anchor::BeforeBodyClose,
            Anchor::AfterRegion(OTHER),
        ] {
            let once = DEMO.replace(PAGE, anchor, Some("<x>"));
            let twice = DEMO.replace(&once, anchor, Some("<x>"));
            assert_eq!(once, twice, "{anchor:?}");
            assert_eq!(DEMO.count(&twice), 1);
        }
    }

    #[test]
    fn replace_preserves_crlf() {
        let crlf = PAGE.replace('\n', "\r\n");
        let once = DEMO.replace(&crlf, Anchor::BeforeBodyClose, Some("<x>"));
        assert!(once.contains("\r\n<!-- demo:start -->\r\n<x>\r\n<!-- demo:end -->\r\n</body>"));
        assert!(!once.replace("\r\n", "").contains('\n'));
        assert_eq!(DEMO.replace(&once, Anchor::BeforeBodyClose, Some("<x>")), once);
    }

    #[test]
    fn strip_removes_all_copies() {
        let doc = "<head>\n<!-- demo:start -->\na\n<!-- demo:end -->\n<title>t</title>\n  <!-- demo:start -->b<!-- demo:end -->  \n</head>";
        let out = DEMO.strip(doc);
        assert_eq!(out, "<head>\n<title>t</title>\n</head>");
        assert_eq!(DEMO.count(doc), 2);
        assert_eq!(DEMO.count(&out), 0);
    }

    #[test]
    fn replace_collapses_duplicates_to_one() {
        let doc = format!(
            "{}{}",
            DEMO.insert(PAGE, Anchor::BeforeHeadClose, "old"),
            DEMO.wrap("older", "\n")
        );
        let out = DEMO.replace(&doc, Anchor::BeforeHeadClose, Some("new"));
        assert_eq!(DEMO.count(&out), 1);
        assert!(out.contains("new"));
        assert!(!out.contains("old"));
    }

    #[test]
    fn unterminated_region_is_left_alone() {
        let doc = "<head><!-- demo:start -->dangling</head>";
        assert_eq!(DEMO.strip(doc), doc);
    }

    #[test]
    fn replace_without_body_only_strips() {
        let with = DEMO.replace(PAGE, Anchor::AfterBodyOpen, Some("<x>"));
        let without = DEMO.replace(&with, Anchor::AfterBodyOpen, None);
        assert_eq!(DEMO.count(&without), 0);
        assert!(!without.contains("<x>"));
    }

    #[test]
    fn missing_anchor_leaves_document_unchanged() {
        let doc = "<p>fragment</p>";
        assert_eq!(DEMO.replace(doc, Anchor::BeforeHeadClose, Some("<x>")), doc);
    }

    #[test]
    fn after_title_falls_back_to_head_close() {
        let doc = "<head></head>";
        let out = DEMO.insert(doc, Anchor::AfterTitle, "<x>");
        assert_eq!(out, "<head>\n<!-- demo:start -->\n<x>\n<!-- demo:end -->\n</head>");
    }

    #[test]
    fn after_region_follows_dependency_when_present() {
        let with_other = OTHER.insert(PAGE, Anchor::AfterHeadOpen, "<o>");
        let out = DEMO.insert(&with_other, Anchor::AfterRegion(OTHER), "<d>");
        assert!(out.contains("<!-- other:end -->\n<!-- demo:start -->"));
    }

    #[test]
    fn after_region_falls_back_to_head_open() {
        let out = DEMO.insert(PAGE, Anchor::AfterRegion(OTHER), "<d>");
        assert!(out.contains("<head>\n<!-- demo:start -->"));
    }
}
