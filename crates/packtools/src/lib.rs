//! A library for introspecting SciELO Publishing Schema (SPS) packages and extracting and
//! validating the bibliographic metadata of the article they carry.
//!
//! An SPS package is a zip archive holding exactly one JATS-flavoured XML document plus its
//! assets. The library is organised in the order data flows through it:
//!
//! - [`xray`] classifies archive members and checksums the archive
//! - [`package`] resolves the single XML member, parses it once and extracts issue metadata
//! - [`xml`] decodes and parses the document and evaluates path queries over it
//! - [`models`] reads authors, affiliations and journal metadata from a tree
//! - [`validation`] compares extracted journal metadata against expected values
//!
//! # Example
//! ```rust,no_run
//! use packtools::{
//!   package::SpsPackage,
//!   validation::journal_meta::{ExpectedJournalMeta, JournalMetaValidation},
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!   let package = SpsPackage::open("0103-5053-jbchs-35-01.zip")?;
//!   println!("{package}");
//!   println!("Journal: {:?}", package.meta()?.journal_title);
//!
//!   let expected: ExpectedJournalMeta =
//!     serde_json::from_str(r#"{"issn_epub": "1678-4790", "acronym": "jbchs"}"#)?;
//!   let doc = package.document()?;
//!   for result in JournalMetaValidation::new(doc.root()).validate(&expected) {
//!     println!("{}: {}", result.object, result.is_match);
//!   }
//!   Ok(())
//! }
//! ```

#![warn(missing_docs, clippy::missing_docs_in_private_items)]
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod errors;
pub mod models;
pub mod package;
pub mod validation;
pub mod xml;
pub mod xray;
#[cfg(test)] mod tests;

use errors::PacktoolsError;
use xml::{
  path::{static_path, XPath},
  Document, Element,
};

/// Convenience alias used throughout the crate.
pub type Result<T, E = PacktoolsError> = std::result::Result<T, E>;
