//! Site-wide body scripts (`lang-switcher.js`, `tracking.js`).

use super::{PageContext, Transform};
use crate::html::{Anchor, Region, Token, line_break, tokens};
use maud::html;

pub const SITE_SCRIPTS: Region = Region::new("site-scripts");

/// `<script src=… defer>` before `</body>` for each `scripts.body` entry
/// the page does not already load itself.
pub struct SiteScripts;

impl Transform for SiteScripts {
    fn name(&self) -> &'static str {
        "site-scripts"
    }

    fn produces(&self) -> Vec<Region> {
        vec![SITE_SCRIPTS]
    }

    fn anchors(&self) -> Vec<Anchor> {
        vec![Anchor::BeforeBodyClose]
    }

    fn apply(&self, doc: &str, ctx: &PageContext<'_>) -> String {
        let stripped = SITE_SCRIPTS.strip(doc);
        let loaded = loaded_scripts(&stripped);
        let missing: Vec<&str> = ctx
            .site
            .scripts
            .body
            .iter()
            .map(String::as_str)
            .filter(|src| !loaded.iter().any(|l| l == script_key(src)))
            .collect();
        if missing.is_empty() {
            return stripped;
        }
        let body = missing
            .iter()
            .map(|src| html! { script src=(src) defer {} }.into_string())
            .collect::<Vec<_>>()
            .join(line_break(doc));
        SITE_SCRIPTS.insert(&stripped, Anchor::BeforeBodyClose, &body)
    }
}

/// Comparable form of a script URL: no query, no fragment, no leading
/// `./`, `../` or `/`.
fn script_key(src: &str) -> &str {
    let src = src.trim();
    let path = match src.find(['?', '#']) {
        Some(i) => &src[..i],
        None => src,
    };
    path.trim_start_matches("./")
        .trim_start_matches("../")
        .trim_start_matches('/')
}

fn loaded_scripts(doc: &str) -> Vec<String> {
    tokens(doc)
        .filter_map(|token| match token {
            Token::Start { tag, .. } if tag.name == "script" => {
                tag.attr("src").map(|src| script_key(src).to_string())
            }
            _ => None,
        })
        .collect()
}
