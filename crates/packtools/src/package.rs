//! The SPS package facade.
//!
//! [`SpsPackage`] wraps one [`Xray`] and layers the package rules on top of it: the archive
//! must hold exactly one XML member, that member is parsed at most once, and derived values
//! (the [`PackageMeta`] record, the SHA-1 checksum) are computed on first use and cached for
//! the lifetime of the value.

use std::{
  cell::{OnceCell, RefCell},
  io::Read,
  path::{Path, PathBuf},
  thread::LocalKey,
};

use sha1::Sha1;

use super::*;
use crate::{
  validation::DocumentValidator,
  xray::{ClassifiedMembers, Xray},
};

thread_local! {
  static JOURNAL_TITLE: XPath =
    static_path("front/journal-meta/journal-title-group/journal-title");
  static JOURNAL_EISSN: XPath = static_path("front/journal-meta/issn[@pub-type='epub']");
  static JOURNAL_PISSN: XPath = static_path("front/journal-meta/issn[@pub-type='ppub']");
  static ARTICLE_TITLE: XPath = static_path("front/article-meta/title-group/article-title");
  static ISSUE_YEAR: XPath = static_path("front/article-meta/pub-date/year");
  static ISSUE_VOLUME: XPath = static_path("front/article-meta/volume");
  static ISSUE_NUMBER: XPath = static_path("front/article-meta/issue");
}

/// Bibliographic data identifying the package's article and issue.
///
/// Each field is the direct text of the first node matching a fixed path, or `None` when the
/// node is absent or starts with markup instead of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMeta {
  /// `front/journal-meta/journal-title-group/journal-title`
  pub journal_title: Option<String>,
  /// `front/journal-meta/issn[@pub-type='epub']`
  pub journal_eissn: Option<String>,
  /// `front/journal-meta/issn[@pub-type='ppub']`
  pub journal_pissn: Option<String>,
  /// `front/article-meta/title-group/article-title`
  pub article_title: Option<String>,
  /// `front/article-meta/pub-date/year`
  pub issue_year:    Option<String>,
  /// `front/article-meta/volume`
  pub issue_volume:  Option<String>,
  /// `front/article-meta/issue`
  pub issue_number:  Option<String>,
}

impl PackageMeta {
  /// Reads every field from the article root.
  pub fn from_root(root: Element<'_>) -> Self {
    let read = |slot: &'static LocalKey<XPath>| slot.with(|path| path.text(root));
    Self {
      journal_title: read(&JOURNAL_TITLE),
      journal_eissn: read(&JOURNAL_EISSN),
      journal_pissn: read(&JOURNAL_PISSN),
      article_title: read(&ARTICLE_TITLE),
      issue_year:    read(&ISSUE_YEAR),
      issue_volume:  read(&ISSUE_VOLUME),
      issue_number:  read(&ISSUE_NUMBER),
    }
  }
}

/// A SciELO Publishing Schema package.
///
/// Parsing needs mutable access to the archive while callers only hold `&self`, so the
/// [`Xray`] sits in a [`RefCell`]. Nothing here is `Sync`.
#[derive(Debug)]
pub struct SpsPackage {
  /// Path the package was opened from
  path:     PathBuf,
  /// The underlying archive
  xray:     RefCell<Xray>,
  /// Parsed XML member
  document: OnceCell<Document>,
  /// Extracted metadata record
  meta:     OnceCell<PackageMeta>,
  /// Hex SHA-1 of the archive file
  sha1:     OnceCell<String>,
}

impl SpsPackage {
  /// Opens the archive at `path`.
  ///
  /// # Errors
  ///
  /// Returns [`PacktoolsError::NotAZipFile`] when `path` is not a zip archive. The XML member
  /// count is not checked until the document is needed.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let xray = Xray::open(path.as_ref())?;
    Ok(Self {
      path:     path.as_ref().to_path_buf(),
      xray:     RefCell::new(xray),
      document: OnceCell::new(),
      meta:     OnceCell::new(),
      sha1:     OnceCell::new(),
    })
  }

  /// The filesystem path of the package.
  pub fn path(&self) -> &Path { &self.path }

  /// Name of the single XML member.
  ///
  /// # Errors
  ///
  /// Returns [`PacktoolsError::XmlCount`] when the package has no XML member or more than one.
  pub fn xml_member(&self) -> Result<String> {
    let xray = self.xray.borrow();
    match xray.get_ext("xml") {
      [member] => Ok(member.clone()),
      members => {
        warn!("Package {} has {} xml member(s), expected 1", self.path.display(), members.len());
        Err(PacktoolsError::XmlCount(members.len()))
      },
    }
  }

  /// A reader over the single XML member.
  pub fn xml_fp(&mut self) -> Result<impl Read + '_> {
    let member = self.xml_member()?;
    self.xray.get_mut().get_fp(&member)
  }

  /// The parsed XML member. Parsed on the first call; later calls return the same tree.
  pub fn document(&self) -> Result<&Document> {
    if let Some(document) = self.document.get() {
      return Ok(document);
    }
    let member = self.xml_member()?;
    let document = {
      let mut xray = self.xray.borrow_mut();
      let fp = xray.get_fp(&member)?;
      Document::from_reader(fp)?
    };
    debug!("Parsed {member} from {}", self.path.display());
    Ok(self.document.get_or_init(|| document))
  }

  /// Journal and issue metadata, extracted once.
  pub fn meta(&self) -> Result<&PackageMeta> {
    if let Some(meta) = self.meta.get() {
      return Ok(meta);
    }
    let meta = PackageMeta::from_root(self.document()?.root());
    trace!("Extracted package meta: {meta:?}");
    Ok(self.meta.get_or_init(|| meta))
  }

  /// Runs `validator` over the document and reports its overall verdict.
  ///
  /// A validator that returns no statuses at all is treated as a failure.
  pub fn is_valid(&self, validator: &dyn DocumentValidator) -> Result<bool> {
    let statuses = validator.validate_all(self.document()?);
    Ok(statuses.first().is_some_and(|status| status.is_valid))
  }

  /// Members classified by extension.
  pub fn list_members_by_type(&self) -> ClassifiedMembers {
    self.xray.borrow().classified_members().clone()
  }

  /// A reader over any member of the package.
  pub fn get_member(&mut self, name: &str) -> Result<impl Read + '_> {
    self.xray.get_mut().get_fp(name)
  }

  /// Hex SHA-1 of the package file, computed once.
  pub fn sha1_checksum(&self) -> Result<&str> {
    if let Some(sha1) = self.sha1.get() {
      return Ok(sha1);
    }
    let sha1 = self.xray.borrow().checksum::<Sha1>()?;
    Ok(self.sha1.get_or_init(|| sha1))
  }
}

impl std::fmt::Display for SpsPackage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "<SpsPackage path={} sha1={}>",
      self.path.display(),
      self.sha1_checksum().unwrap_or("unavailable")
    )
  }
}
