//! Read-only accessors for the bibliographic content of a parsed SPS document.
//!
//! Every accessor holds an [`Element`] handle and never mutates the tree. Paths are relative to the
//! element handed in, so the same accessor serves an `article` root and an embedded
//! `sub-article` alike. Absent values are `None`, never empty strings.
//!
//! - [`authors`] - contributors, their roles, ORCIDs and cross-references
//! - [`aff`] - affiliation records keyed by id
//! - [`journal_meta`] - ISSNs, acronym, titles and publisher names

pub mod aff;
pub mod authors;
pub mod journal_meta;

use std::thread::LocalKey;

use super::*;

/// Text of the first match of the path in `slot`, or `None`.
fn text_of(slot: &'static LocalKey<XPath>, node: Element<'_>) -> Option<String> {
  slot.with(|path| path.text(node))
}
