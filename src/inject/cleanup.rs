//! Comment repairs.
//!
//! Hand-edited footers carry two recurring typos: `</li><--` where a comment
//! closer was meant, and `-->>` with a stray bracket. Both are fixed on every
//! page. Translated pages additionally lose any comment still written in
//! Cyrillic, which would otherwise leak Ukrainian into the English source.

use super::{PageContext, Transform};
use crate::html::{Token, tokens};
use crate::route::Lang;
use regex::Regex;
use std::sync::LazyLock;

static BROKEN_LI_CLOSER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</li><--").unwrap());
static DOUBLE_BRACKET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-->>+").unwrap());

pub struct Cleanup;

impl Transform for Cleanup {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let out = BROKEN_LI_CLOSER_RE.replace_all(doc, "</li>-->");
        let out = DOUBLE_BRACKET_RE.replace_all(&out, "-->").into_owned();
        if ctx.lang == Lang::En {
            remove_cyrillic_comments(&out)
        } else {
            out
        }
    }
}

fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

fn is_marker(comment: &str) -> bool {
    let inner = comment
        .trim_start_matches("<!--")
        .trim_end_matches("-->")
        .trim();
    inner.ends_with(":start") || inner.ends_with(":end")
}

fn remove_cyrillic_comments(doc: &str) -> String {
    let mut out = String::with_capacity(doc.len());
    let mut copied = 0;
    for token in tokens(doc) {
        let Token::Comment { span } = token else {
            continue;
        };
        let comment = &doc[span.clone()];
        if comment.chars().any(is_cyrillic) && !is_marker(comment) {
            out.push_str(&doc[copied..span.start]);
            copied = span.end;
        }
    }
    out.push_str(&doc[copied..]);
    out
}
