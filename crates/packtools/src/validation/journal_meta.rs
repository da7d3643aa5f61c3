//! Journal metadata validation.
//!
//! One comparator per field plus [`JournalMetaValidation`], which runs all of them against a
//! single set of expectations and always reports in the same order: ISSN epub, ISSN ppub,
//! acronym, journal title, abbreviated title, publisher names.
//!
//! # Examples
//!
//! ```
//! use packtools::{validation::journal_meta::ISSNValidation, xml::Document};
//!
//! let doc: Document = r#"<article><front><journal-meta>
//!   <issn pub-type="epub">1678-4790</issn>
//! </journal-meta></front></article>"#
//!   .parse()
//!   .unwrap();
//!
//! let issns = ISSNValidation::new(doc.root());
//! assert!(issns.validate_epub("1678-4790").is_match);
//! assert!(!issns.validate_epub("1678-4791").is_match);
//! ```

use super::*;
use crate::models::journal_meta::{Acronym, Issn, Publisher, Title};

/// Expected journal metadata, typically loaded from a JSON file.
///
/// Keys follow the names used in journal registration records:
/// `issn_epub`, `issn_ppub`, `acronym`, `journal-title`, `abbrev-journal-title` and
/// `publisher-name`. A missing key means the value is expected to be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedJournalMeta {
  /// Electronic ISSN
  #[serde(default)]
  pub issn_epub:            Option<String>,
  /// Print ISSN
  #[serde(default)]
  pub issn_ppub:            Option<String>,
  /// Journal acronym (`publisher-id`)
  #[serde(default)]
  pub acronym:              Option<String>,
  /// Full journal title
  #[serde(default, rename = "journal-title")]
  pub journal_title:        Option<String>,
  /// Abbreviated journal title
  #[serde(default, rename = "abbrev-journal-title")]
  pub abbrev_journal_title: Option<String>,
  /// Publisher names, in order
  #[serde(default, rename = "publisher-name")]
  pub publisher_name:       Vec<String>,
}

/// Pins the target of a caller's `Into<Option<&str>>`.
fn expected_value<'e>(value: impl Into<Option<&'e str>>) -> Option<&'e str> { value.into() }

/// Compares ISSNs.
#[derive(Debug, Clone, Copy)]
pub struct ISSNValidation<'a> {
  /// Accessor over the document
  issn: Issn<'a>,
}

impl<'a> ISSNValidation<'a> {
  /// Wraps the article root.
  pub fn new(root: Element<'a>) -> Self { Self { issn: Issn::new(root) } }

  /// Compares against the ISSN typed `epub`.
  pub fn validate_epub<'e>(&self, expected: impl Into<Option<&'e str>>) -> ValidationResult {
    ValidationResult::compare("issn epub", expected_value(expected), self.issn.epub())
  }

  /// Compares against the ISSN typed `ppub`.
  pub fn validate_ppub<'e>(&self, expected: impl Into<Option<&'e str>>) -> ValidationResult {
    ValidationResult::compare("issn ppub", expected_value(expected), self.issn.ppub())
  }
}

/// Compares the journal acronym.
#[derive(Debug, Clone, Copy)]
pub struct AcronymValidation<'a> {
  /// Accessor over the document
  acronym: Acronym<'a>,
}

impl<'a> AcronymValidation<'a> {
  /// Wraps the article root.
  pub fn new(root: Element<'a>) -> Self { Self { acronym: Acronym::new(root) } }

  /// Compares against the `publisher-id` journal id.
  pub fn validate_text<'e>(&self, expected: impl Into<Option<&'e str>>) -> ValidationResult {
    ValidationResult::compare("journal acronym", expected_value(expected), self.acronym.text())
  }
}

/// Compares journal titles.
#[derive(Debug, Clone, Copy)]
pub struct TitleValidation<'a> {
  /// Accessor over the document
  title: Title<'a>,
}

impl<'a> TitleValidation<'a> {
  /// Wraps the article root.
  pub fn new(root: Element<'a>) -> Self { Self { title: Title::new(root) } }

  /// Compares against `journal-title`.
  pub fn validate_journal_title<'e>(
    &self,
    expected: impl Into<Option<&'e str>>,
  ) -> ValidationResult {
    ValidationResult::compare(
      "journal title",
      expected_value(expected),
      self.title.journal_title(),
    )
  }

  /// Compares against `abbrev-journal-title`.
  pub fn validate_abbreviated_journal_title<'e>(
    &self,
    expected: impl Into<Option<&'e str>>,
  ) -> ValidationResult {
    ValidationResult::compare(
      "abbreviated journal title",
      expected_value(expected),
      self.title.abbreviated_journal_title(),
    )
  }
}

/// Compares publisher names.
#[derive(Debug, Clone, Copy)]
pub struct PublisherValidation<'a> {
  /// Accessor over the document
  publisher: Publisher<'a>,
}

impl<'a> PublisherValidation<'a> {
  /// Wraps the article root.
  pub fn new(root: Element<'a>) -> Self { Self { publisher: Publisher::new(root) } }

  /// Matches only when both lists have the same names in the same order. A
  /// `publisher-name` without text is observed as `null` and matches no expected name.
  pub fn validate_publishers_names<S: AsRef<str>>(&self, expected: &[S]) -> ValidationResult {
    ValidationResult::compare(
      "publishers names",
      expected,
      self.publisher.publishers_names(),
    )
  }
}

/// Runs every journal metadata comparator.
#[derive(Debug, Clone, Copy)]
pub struct JournalMetaValidation<'a> {
  /// The article root
  root: Element<'a>,
}

impl<'a> JournalMetaValidation<'a> {
  /// Wraps the article root.
  pub fn new(root: Element<'a>) -> Self { Self { root } }

  /// Six results in fixed order: ISSN epub, ISSN ppub, acronym, journal title, abbreviated
  /// journal title, publisher names.
  pub fn validate(&self, expected: &ExpectedJournalMeta) -> Vec<ValidationResult> {
    let issn = ISSNValidation::new(self.root);
    let title = TitleValidation::new(self.root);
    let publisher = PublisherValidation::new(self.root);
    let results = vec![
      issn.validate_epub(expected.issn_epub.as_deref()),
      issn.validate_ppub(expected.issn_ppub.as_deref()),
      AcronymValidation::new(self.root).validate_text(expected.acronym.as_deref()),
      title.validate_journal_title(expected.journal_title.as_deref()),
      title.validate_abbreviated_journal_title(expected.abbrev_journal_title.as_deref()),
      publisher.validate_publishers_names(expected.publisher_name.as_slice()),
    ];
    let mismatches = results.iter().filter(|result| !result.is_match).count();
    debug!("Journal meta validation: {mismatches} of {} mismatched", results.len());
    results
  }
}
