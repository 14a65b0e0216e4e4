//! Text-level HTML utilities shared by the translator and the page rewriter.
//!
//! - **Region**: marker-delimited blocks and their insertion [`Anchor`]s
//! - **Tags**: a minimal start-tag tokenizer for attribute rewrites
//! - **Text**: entity decoding, escaping, whitespace and length clamping
//!
//! Nothing here builds a DOM. Documents stay strings from disk to disk and
//! every operation rewrites only the bytes it targets.

pub mod region;
pub mod tags;
pub mod text;

pub use region::{Anchor, Region, line_break};
pub use tags::{Scope, StartTag, Token, find_element_inner, remove_start_tags, rewrite_start_tags, tokens};
