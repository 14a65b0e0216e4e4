//! Minimal HTML tag tokenizer.
//!
//! Just enough of HTML to rewrite attributes in place: start tags with
//! double-quoted, single-quoted, bare and valueless attributes, self-closing
//! `/>`, end tags, and comments. Text between tags is never materialized.
//! Contents of `<script>` and `<style>` are skipped as raw text so markup
//! inside JavaScript strings is left alone.
//!
//! Rewrites preserve every byte of the document except the tags a caller
//! chooses to replace; untouched tags keep their original spelling.

use std::collections::HashMap;
use std::ops::Range;

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is raw text.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
    Bare,
}

/// A single attribute. The value is kept as written (entities not decoded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: Option<String>,
    quote: Quote,
}

/// A parsed start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    raw_name: String,
    /// Lowercased tag name.
    pub name: String,
    pub attrs: Vec<Attr>,
    pub self_closing: bool,
}

impl StartTag {
    /// Look up an attribute value by case-insensitive name.
    ///
    /// A valueless attribute (`<script async>`) yields `Some("")`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Set an attribute, keeping its position and quoting when it exists.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(attr) => attr.value = Some(value.to_string()),
            None => self.attrs.push(Attr {
                name: name.to_string(),
                value: Some(value.to_string()),
                quote: Quote::Double,
            }),
        }
    }

    /// True when the whitespace-separated `class` list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Serialize back to markup.
    pub fn render(&self) -> String {
        let mut out = format!("<{}", self.raw_name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            let Some(value) = &attr.value else { continue };
            let quote = match attr.quote {
                Quote::Bare if is_bare_safe(value) => "",
                Quote::Single if !value.contains('\'') => "'",
                _ => "\"",
            };
            out.push('=');
            out.push_str(quote);
            if quote == "\"" {
                out.push_str(&value.replace('"', "&quot;"));
            } else {
                out.push_str(value);
            }
            out.push_str(quote);
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
        out
    }
}

fn is_bare_safe(value: &str) -> bool {
    !value.is_empty()
        && !value
            .bytes()
            .any(|b| b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b'=' | b'<' | b'>' | b'`'))
}

/// A markup token with its byte span in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start { tag: StartTag, span: Range<usize> },
    End { name: String, span: Range<usize> },
    Comment { span: Range<usize> },
}

/// Iterator over the markup tokens of a document.
pub struct Tokens<'a> {
    doc: &'a str,
    pos: usize,
    raw_text: Option<String>,
}

/// Tokenize `doc`.
pub fn tokens(doc: &str) -> Tokens<'_> {
    Tokens {
        doc,
        pos: 0,
        raw_text: None,
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let doc = self.doc;
        let bytes = doc.as_bytes();
        loop {
            if let Some(name) = self.raw_text.take() {
                let closing = format!("</{name}");
                let rest = doc[self.pos..].to_ascii_lowercase();
                match rest.find(&closing) {
                    Some(offset) => self.pos += offset,
                    None => {
                        self.pos = doc.len();
                        return None;
                    }
                }
            }

            let start = self.pos + doc[self.pos..].find('<')?;
            let rest = &doc[start..];

            if rest.starts_with("<!--") {
                let end = rest[4..]
                    .find("-->")
                    .map_or(doc.len(), |i| start + 4 + i + 3);
                self.pos = end;
                return Some(Token::Comment { span: start..end });
            }

            if rest.starts_with("</") {
                let name_start = start + 2;
                let name_end = scan_name(bytes, name_start);
                if name_end == name_start {
                    self.pos = name_start;
                    continue;
                }
                let end = doc[name_end..].find('>').map_or(doc.len(), |i| name_end + i + 1);
                self.pos = end;
                return Some(Token::End {
                    name: doc[name_start..name_end].to_ascii_lowercase(),
                    span: start..end,
                });
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos = doc[start..].find('>').map_or(doc.len(), |i| start + i + 1);
                continue;
            }

            if bytes.get(start + 1).is_some_and(u8::is_ascii_alphabetic) {
                if let Some((tag, end)) = parse_start_tag(doc, start) {
                    self.pos = end;
                    if !tag.self_closing && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                        self.raw_text = Some(tag.name.clone());
                    }
                    return Some(Token::Start {
                        tag,
                        span: start..end,
                    });
                }
            }

            self.pos = start + 1;
        }
    }
}

fn scan_name(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b':'))
    {
        i += 1;
    }
    i
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Parse the start tag whose `<` is at `start`. Returns the tag and the
/// offset just past its `>`, or `None` when the tag never closes.
fn parse_start_tag(doc: &str, start: usize) -> Option<(StartTag, usize)> {
    let bytes = doc.as_bytes();
    let name_end = scan_name(bytes, start + 1);
    let raw_name = doc[start + 1..name_end].to_string();
    let mut attrs = Vec::new();
    let mut self_closing = false;
    let mut i = name_end;

    loop {
        i = skip_ws(bytes, i);
        match bytes.get(i)? {
            b'>' => {
                i += 1;
                break;
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                self_closing = true;
                i += 2;
                break;
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'>'
            && !(bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>'))
        {
            i += 1;
        }
        if i == attr_start {
            // Stray `=` with no name.
            i += 1;
            continue;
        }
        let name = doc[attr_start..i].to_string();

        let after_name = skip_ws(bytes, i);
        if bytes.get(after_name) != Some(&b'=') {
            attrs.push(Attr {
                name,
                value: None,
                quote: Quote::Bare,
            });
            continue;
        }

        i = skip_ws(bytes, after_name + 1);
        let (value, quote) = match bytes.get(i)? {
            q @ (b'"' | b'\'') => {
                let close = doc[i + 1..].find(*q as char)? + i + 1;
                let value = doc[i + 1..close].to_string();
                let quote = if *q == b'"' {
                    Quote::Double
                } else {
                    Quote::Single
                };
                i = close + 1;
                (value, quote)
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                (doc[value_start..i].to_string(), Quote::Bare)
            }
        };
        attrs.push(Attr {
            name,
            value: Some(value),
            quote,
        });
    }

    let name = raw_name.to_ascii_lowercase();
    Some((
        StartTag {
            raw_name,
            name,
            attrs,
            self_closing,
        },
        i,
    ))
}

/// Open-element bookkeeping handed to rewrite callbacks.
#[derive(Debug, Default)]
pub struct Scope {
    open: HashMap<String, usize>,
}

impl Scope {
    /// True while an element named `name` is open.
    pub fn inside(&self, name: &str) -> bool {
        self.open.get(name).is_some_and(|&n| n > 0)
    }

    fn enter(&mut self, tag: &StartTag) {
        if !tag.self_closing && !tag.is_void() {
            *self.open.entry(tag.name.clone()).or_default() += 1;
        }
    }

    fn leave(&mut self, name: &str) {
        if let Some(n) = self.open.get_mut(name) {
            *n = n.saturating_sub(1);
        }
    }
}

/// Offer every start tag to `f`; a returned string replaces the tag's markup.
///
/// The scope passed to `f` reflects elements opened before the tag.
pub fn rewrite_start_tags<F>(doc: &str, mut f: F) -> String
where
    F: FnMut(&StartTag, &Scope) -> Option<String>,
{
    let mut out = String::with_capacity(doc.len());
    let mut copied = 0;
    let mut scope = Scope::default();
    for token in tokens(doc) {
        match token {
            Token::Start { tag, span } => {
                if let Some(replacement) = f(&tag, &scope) {
                    out.push_str(&doc[copied..span.start]);
                    out.push_str(&replacement);
                    copied = span.end;
                }
                scope.enter(&tag);
            }
            Token::End { name, .. } => scope.leave(&name),
            Token::Comment { .. } => {}
        }
    }
    out.push_str(&doc[copied..]);
    out
}

/// Remove every start tag matching `pred`.
///
/// A tag alone on its line takes its indentation and line break with it.
pub fn remove_start_tags<F>(doc: &str, mut pred: F) -> String
where
    F: FnMut(&StartTag) -> bool,
{
    let bytes = doc.as_bytes();
    let mut out = String::with_capacity(doc.len());
    let mut copied = 0;
    for token in tokens(doc) {
        let Token::Start { tag, span } = token else {
            continue;
        };
        if !pred(&tag) {
            continue;
        }
        let mut start = span.start;
        while start > copied && matches!(bytes[start - 1], b' ' | b'\t') {
            start -= 1;
        }
        let mut end = span.end;
        let line_start = start == 0 || bytes[start - 1] == b'\n';
        if line_start {
            let mut probe = end;
            while probe < bytes.len() && matches!(bytes[probe], b' ' | b'\t') {
                probe += 1;
            }
            if bytes.get(probe) == Some(&b'\r') {
                probe += 1;
            }
            if bytes.get(probe) == Some(&b'\n') {
                end = probe + 1;
            } else {
                start = span.start;
            }
        } else {
            start = span.start;
        }
        out.push_str(&doc[copied..start]);
        copied = end;
    }
    out.push_str(&doc[copied..]);
    out
}

/// Byte range of the inner HTML of the first element named `tag` carrying
/// `class` (any class when `None`). Nested elements of the same name are
/// balanced. Void and unterminated elements have no inner HTML.
pub fn find_element_inner(doc: &str, tag: &str, class: Option<&str>) -> Option<Range<usize>> {
    let tag = tag.to_ascii_lowercase();
    let mut iter = tokens(doc);
    let inner_start = iter.by_ref().find_map(|token| match token {
        Token::Start { tag: t, span }
            if t.name == tag
                && !t.self_closing
                && !t.is_void()
                && class.is_none_or(|c| t.has_class(c)) =>
        {
            Some(span.end)
        }
        _ => None,
    })?;

    let mut depth = 1usize;
    for token in iter {
        match token {
            Token::Start { tag: t, .. } if t.name == tag && !t.self_closing => depth += 1,
            Token::End { name, span } if name == tag => {
                depth -= 1;
                if depth == 0 {
                    return Some(inner_start..span.start);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_tags(doc: &str) -> Vec<StartTag> {
        tokens(doc)
            .filter_map(|t| match t {
                Token::Start { tag, .. } => Some(tag),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parses_all_quoting_styles() {
        let tags = start_tags(r#"<img src="a.png" alt='it"s' width=10 hidden>"#);
        assert_eq!(tags.len(), 1);
        let img = &tags[0];
        assert_eq!(img.attr("src"), Some("a.png"));
        assert_eq!(img.attr("alt"), Some("it\"s"));
        assert_eq!(img.attr("width"), Some("10"));
        assert_eq!(img.attr("hidden"), Some(""));
        assert_eq!(img.attr("title"), None);
    }

    #[test]
    fn self_closing_and_case() {
        let tags = start_tags(r#"<IMG SRC="a.png"/><br />"#);
        assert_eq!(tags[0].name, "img");
        assert!(tags[0].self_closing);
        assert_eq!(tags[0].attr("src"), Some("a.png"));
        assert!(tags[1].self_closing);
    }

    #[test]
    fn script_contents_are_skipped() {
        let doc = r#"<script>var s = "<img src='x.png'>";</script><img src="y.png">"#;
        let srcs: Vec<String> = start_tags(doc)
            .iter()
            .filter(|t| t.name == "img")
            .map(|t| t.attr("src").unwrap().to_string())
            .collect();
        assert_eq!(srcs, vec!["y.png"]);
    }

    #[test]
    fn comments_are_skipped() {
        let tags = start_tags("<!-- <img src=\"x.png\"> --><p>");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "p");
    }

    #[test]
    fn greater_than_inside_quotes_does_not_end_tag() {
        let tags = start_tags(r#"<a title="1 > 0" href="/x">"#);
        assert_eq!(tags[0].attr("href"), Some("/x"));
    }

    #[test]
    fn render_round_trips_unchanged_tag() {
        let doc = r#"<img src="a.png" alt='x' width=10 hidden>"#;
        assert_eq!(start_tags(doc)[0].render(), doc);
    }

    #[test]
    fn set_attr_keeps_position_and_appends_new() {
        let mut tag = start_tags(r#"<img src="a.png" alt="x">"#).remove(0);
        tag.set_attr("src", "b.png");
        tag.set_attr("loading", "lazy");
        assert_eq!(tag.render(), r#"<img src="b.png" alt="x" loading="lazy">"#);
    }

    #[test]
    fn has_class_matches_tokens() {
        let tag = start_tags(r#"<div class="hero  hero-title">"#).remove(0);
        assert!(tag.has_class("hero-title"));
        assert!(!tag.has_class("title"));
    }

    #[test]
    fn rewrite_only_touches_returned_tags() {
        let doc = "<p>\n  <a href=\"x.html\">x</a>\n  <a href=\"/y/\">y</a>\n</p>";
        let out = rewrite_start_tags(doc, |tag, _| {
            (tag.attr("href") == Some("x.html")).then(|| "<a href=\"/x/\">".to_string())
        });
        assert_eq!(out, "<p>\n  <a href=\"/x/\">x</a>\n  <a href=\"/y/\">y</a>\n</p>");
    }

    #[test]
    fn scope_tracks_open_elements() {
        let doc = "<picture><img src=a></picture><img src=b>";
        let mut seen = Vec::new();
        rewrite_start_tags(doc, |tag, scope| {
            if tag.name == "img" {
                seen.push((tag.attr("src").unwrap().to_string(), scope.inside("picture")));
            }
            None
        });
        assert_eq!(seen, vec![("a".into(), true), ("b".into(), false)]);
    }

    #[test]
    fn remove_takes_whole_line() {
        let doc = "<head>\n    <meta name=\"description\" content=\"x\">\n    <title>t</title>\n</head>";
        let out = remove_start_tags(doc, |t| t.attr("name") == Some("description"));
        assert_eq!(out, "<head>\n    <title>t</title>\n</head>");
    }

    #[test]
    fn remove_inline_tag_keeps_neighbours() {
        let doc = "<head><meta name=\"keywords\" content=\"x\"><title>t</title></head>";
        let out = remove_start_tags(doc, |t| t.attr("name") == Some("keywords"));
        assert_eq!(out, "<head><title>t</title></head>");
    }

    #[test]
    fn find_element_is_nesting_aware() {
        let doc = r#"<div class="service-prose"><div>a</div><p>b</p></div><div>c</div>"#;
        let range = find_element_inner(doc, "div", Some("service-prose")).unwrap();
        assert_eq!(&doc[range], "<div>a</div><p>b</p>");
    }

    #[test]
    fn find_element_without_class_takes_first() {
        let doc = "<title>Головна — alpiK</title>";
        let range = find_element_inner(doc, "title", None).unwrap();
        assert_eq!(&doc[range], "Головна — alpiK");
    }

    #[test]
    fn unterminated_element_has_no_inner() {
        assert_eq!(find_element_inner("<p>open", "p", None), None);
    }
}
