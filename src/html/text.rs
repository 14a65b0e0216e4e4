//! Text helpers: entity decoding, whitespace and length clamping.

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Decode HTML character references, named (the full HTML5 set) and
/// numeric. Malformed or unknown references are left as written.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Remove markup tags, leaving their text content.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, " ").into_owned()
}

/// Collapse runs of whitespace (including non-breaking spaces) to one space
/// and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain text of an HTML fragment: tags removed, entities decoded,
/// whitespace collapsed.
pub fn plain_text(html: &str) -> String {
    collapse_whitespace(&decode_entities(&strip_tags(html)))
}

/// Clamp `text` to at most `max` characters, cutting at a word boundary and
/// ending with `…`. Text that already fits is returned unchanged.
pub fn clamp_words(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let head: String = text.chars().take(budget).collect();
    let next_is_break = text.chars().nth(budget).is_none_or(char::is_whitespace);
    let cut = if next_is_break {
        head.as_str()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(i) if i > 0 => &head[..i],
            _ => head.as_str(),
        }
    };
    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '—'));
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("A &amp; B &#8212; &#x41;"), "A & B — A");
        assert_eq!(decode_entities("&laquo;alpiK&raquo;"), "«alpiK»");
    }

    #[test]
    fn decodes_entities_outside_the_common_set() {
        assert_eq!(
            decode_entities("100&nbsp;&euro; за м&sup2;, caf&eacute;"),
            "100\u{a0}€ за м², café"
        );
    }

    #[test]
    fn unknown_entities_are_kept() {
        assert_eq!(decode_entities("&bogus; &"), "&bogus; &");
    }

    #[test]
    fn collapse_handles_newlines_and_nbsp() {
        assert_eq!(collapse_whitespace("  a\r\n\t b\u{a0}c  "), "a b c");
    }

    #[test]
    fn plain_text_strips_nested_markup() {
        assert_eq!(
            plain_text("Ми <strong>працюємо</strong>\n  на&nbsp;висоті"),
            "Ми працюємо на висоті"
        );
    }

    #[test]
    fn clamp_leaves_short_text_alone() {
        assert_eq!(clamp_words("short text", 160), "short text");
    }

    #[test]
    fn clamp_cuts_at_word_boundary() {
        let clamped = clamp_words("one two three four", 12);
        assert_eq!(clamped, "one two…");
        assert!(clamped.chars().count() <= 12);
    }

    #[test]
    fn clamp_counts_characters_not_bytes() {
        let text = "Промисловий альпінізм у Києві та по всій Україні";
        let clamped = clamp_words(text, 20);
        assert!(clamped.chars().count() <= 20);
        assert!(clamped.ends_with('…'));
        assert!(text.starts_with(clamped.trim_end_matches('…')));
    }

    #[test]
    fn clamp_is_stable_on_its_own_output() {
        let once = clamp_words("alpha beta gamma delta epsilon", 15);
        assert_eq!(clamp_words(&once, 15), once);
    }
}
