//! Introspection of SPS package archives.
//!
//! [`Xray`] opens a zip archive once, classifies its members by extension and hands out
//! readers for individual members. Classification ignores directories and empty entries and
//! lower-cases extensions, so `Figure1.TIF` and `figure2.tif` both land under `tif`.
//!
//! # Examples
//!
//! ```no_run
//! use packtools::xray::Xray;
//! use sha2::Sha256;
//!
//! # fn example() -> Result<(), packtools::errors::PacktoolsError> {
//! let mut xray = Xray::open("0103-5053-jbchs-35-01.zip")?;
//! for (ext, names) in xray.classified_members() {
//!   println!("{ext}: {}", names.join(", "));
//! }
//! let pdfs = xray.get_ext("pdf");
//! println!("{} PDFs, sha256 {}", pdfs.len(), xray.checksum::<Sha256>()?);
//!
//! let mut xml = xray.get_fp("0103-5053-jbchs-35-01.xml")?;
//! let mut content = String::new();
//! std::io::Read::read_to_string(&mut xml, &mut content)?;
//! # Ok(())
//! # }
//! ```

use std::{
  fs::File,
  io::{self, Read},
  path::{Path, PathBuf},
};

use sha2::Digest;
use zip::ZipArchive;

use super::*;

/// Members grouped by lower-cased extension. Extensions keep first-seen order through the
/// separate `order` list; names keep archive order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedMembers {
  /// Extension to member names, in archive order
  by_ext: BTreeMap<String, Vec<String>>,
  /// Extensions in the order they were first seen in the archive
  order:  Vec<String>,
}

impl ClassifiedMembers {
  /// Records `name` under the lower-cased extension of `name`.
  fn push(&mut self, name: &str) {
    let ext = extension_of(name);
    if !self.by_ext.contains_key(&ext) {
      self.order.push(ext.clone());
    }
    self.by_ext.entry(ext).or_default().push(name.to_string());
  }

  /// Names with the given extension, compared case-insensitively.
  pub fn get(&self, ext: &str) -> &[String] {
    self.by_ext.get(&ext.to_lowercase()).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Iterates `(extension, names)` in first-seen extension order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
    self.order.iter().map(|ext| (ext.as_str(), self.get(ext)))
  }

  /// Every classified name, grouped by extension.
  pub fn names(&self) -> Vec<String> {
    self.iter().flat_map(|(_, names)| names.iter().cloned()).collect()
  }

  /// The extension-to-names mapping.
  pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> { &self.by_ext }

  /// Number of distinct extensions.
  pub fn len(&self) -> usize { self.order.len() }

  /// Whether no member was classified.
  pub fn is_empty(&self) -> bool { self.order.is_empty() }
}

impl<'a> IntoIterator for &'a ClassifiedMembers {
  type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a [String])> + 'a>;
  type Item = (&'a str, &'a [String]);

  fn into_iter(self) -> Self::IntoIter { Box::new(self.iter()) }
}

/// Introspects SPS packages.
///
/// The archive handle lives as long as the `Xray` and is closed when it is dropped.
pub struct Xray {
  /// Path the archive was opened from; checksums re-read the raw file
  path:    PathBuf,
  /// The open archive
  archive: ZipArchive<File>,
  /// Non-empty members by extension
  members: ClassifiedMembers,
}

impl std::fmt::Debug for Xray {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Xray").field("path", &self.path).field("members", &self.members).finish()
  }
}

impl Xray {
  /// Opens the archive at `path` and classifies its members.
  ///
  /// # Errors
  ///
  /// Returns [`PacktoolsError::NotAZipFile`] when the file cannot be opened or read as a zip
  /// archive, and [`PacktoolsError::Zip`] when a member's header is unreadable.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let not_a_zip = |e: &dyn std::fmt::Display| {
      debug!("Rejecting {}: {e}", path.display());
      PacktoolsError::NotAZipFile(path.clone())
    };

    let file = File::open(&path).map_err(|e| not_a_zip(&e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| not_a_zip(&e))?;
    let members = classify(&mut archive)?;
    debug!("Opened package {} with {} member type(s)", path.display(), members.len());

    Ok(Self { path, archive, members })
  }

  /// The filesystem path of the archive.
  pub fn path(&self) -> &Path { &self.path }

  /// Every classified member name.
  pub fn members(&self) -> Vec<String> { self.members.names() }

  /// Members classified by extension.
  pub fn classified_members(&self) -> &ClassifiedMembers { &self.members }

  /// Members whose extension is `ext` (case-insensitive). Empty when there are none.
  pub fn get_ext(&self, ext: &str) -> &[String] { self.members.get(ext) }

  /// Reads every member with extension `ext` into memory, in archive order.
  ///
  /// Zip members borrow the archive mutably, so several cannot be streamed at once; this
  /// returns their names together with their bytes instead.
  pub fn get_fps(&mut self, ext: &str) -> Result<Vec<(String, Vec<u8>)>> {
    let names = self.get_ext(ext).to_vec();
    let mut contents = Vec::with_capacity(names.len());
    for name in names {
      let mut bytes = Vec::new();
      self.get_fp(&name)?.read_to_end(&mut bytes)?;
      contents.push((name, bytes));
    }
    Ok(contents)
  }

  /// A reader over one member.
  ///
  /// # Errors
  ///
  /// Returns [`PacktoolsError::MissingMember`] when the archive has no member named `member`.
  pub fn get_fp(&mut self, member: &str) -> Result<impl Read + '_> {
    trace!("Opening member {member}");
    self.archive.by_name(member).map_err(|e| match e {
      zip::result::ZipError::FileNotFound => PacktoolsError::MissingMember(member.to_string()),
      e => PacktoolsError::Zip(e),
    })
  }

  /// Hex digest of the raw archive file using the digest algorithm `D`.
  ///
  /// ```no_run
  /// # use packtools::xray::Xray;
  /// # fn example() -> Result<(), packtools::errors::PacktoolsError> {
  /// let xray = Xray::open("package.zip")?;
  /// let sha1 = xray.checksum::<sha1::Sha1>()?;
  /// assert_eq!(sha1.len(), 40);
  /// # Ok(())
  /// # }
  /// ```
  pub fn checksum<D: Digest + io::Write>(&self) -> Result<String> {
    let mut file = File::open(&self.path)?;
    let mut hasher = D::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
  }
}

/// Lower-cased text after the last dot of the member's file name, or `""` when it has none.
fn extension_of(name: &str) -> String {
  let file_name = name.rsplit('/').next().unwrap_or(name);
  file_name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()).unwrap_or_default()
}

/// Walks the central directory, skipping directories and empty files.
fn classify(archive: &mut ZipArchive<File>) -> Result<ClassifiedMembers> {
  let mut members = ClassifiedMembers::default();
  for index in 0..archive.len() {
    let entry = archive.by_index_raw(index)?;
    if entry.is_dir() || entry.size() == 0 {
      trace!("Ignoring empty member {}", entry.name());
      continue;
    }
    members.push(entry.name());
  }
  Ok(members)
}
