//! Error types for the packtools library.
//!
//! Only fatal conditions are modelled here. A path lookup that matches no node is not an
//! error: it is reported as `None` and flows into metadata records and validation results
//! as an ordinary value.
//!
//! # Examples
//!
//! ```no_run
//! use packtools::{errors::PacktoolsError, package::SpsPackage};
//!
//! # fn example() -> Result<(), PacktoolsError> {
//! let package = SpsPackage::open("0103-5053-jbchs-35-01.zip")?;
//! match package.document() {
//!   Ok(doc) => println!("root element: {}", doc.root().name()),
//!   Err(PacktoolsError::XmlCount(n)) => println!("expected one XML member, found {n}"),
//!   Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when inspecting or analysing an SPS package.
#[derive(Error, Debug)]
pub enum PacktoolsError {
  /// The given path is not a readable zip archive.
  ///
  /// Raised by [`Xray::open`](crate::xray::Xray::open) before any member is classified.
  #[error("{} is not a valid zipfile", .0.display())]
  NotAZipFile(PathBuf),

  /// The package does not contain exactly one XML member.
  ///
  /// Every operation that needs the parsed document requires a single XML file; the count
  /// found is carried for diagnostics.
  #[error("there must be exactly one xml file inside a package, found {0}")]
  XmlCount(usize),

  /// A member was requested by name and the archive has no such member.
  #[error("missing member {0}")]
  MissingMember(String),

  /// A path query could not be parsed.
  #[error("invalid path expression: {0}")]
  InvalidPath(String),

  /// The XML bytes could not be decoded: the declared encoding is unknown, or the bytes are
  /// not valid in the encoding the document declares (UTF-8 when it declares none).
  #[error("xml encoding error: {0}")]
  Encoding(String),

  /// The XML member is not well formed (no root element, unbalanced tags, undefined
  /// entities).
  #[error("malformed xml: {0}")]
  MalformedXml(String),

  /// Reading the archive failed after it was opened.
  #[error(transparent)]
  Zip(#[from] zip::result::ZipError),

  /// The XML declaration could not be read.
  #[error(transparent)]
  Xml(#[from] quick_xml::Error),

  /// A pseudo-attribute of the XML declaration could not be parsed.
  #[error(transparent)]
  Attribute(#[from] quick_xml::events::attributes::AttrError),

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Serializing a record to JSON failed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl PacktoolsError {
  /// Whether this error means the package itself is unusable, as opposed to an I/O or
  /// decoding failure while reading it.
  ///
  /// ```
  /// use packtools::errors::PacktoolsError;
  ///
  /// assert!(PacktoolsError::XmlCount(2).is_package_error());
  /// assert!(!PacktoolsError::InvalidPath("[".into()).is_package_error());
  /// ```
  pub fn is_package_error(&self) -> bool {
    matches!(
      self,
      PacktoolsError::NotAZipFile(_)
        | PacktoolsError::XmlCount(_)
        | PacktoolsError::MissingMember(_)
    )
  }
}
