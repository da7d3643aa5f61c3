//! Parsed XML documents and read-only element handles.
//!
//! Parsing is delegated to `sxd-document`; [`Document`] owns the parsed package and hands out
//! [`Element`] handles that borrow it. Element names are matched on their local part, which
//! is how JATS documents address them (the article itself lives in no namespace).
//!
//! Bytes are decoded before parsing: a byte order mark wins, then the `encoding` of the XML
//! declaration, then UTF-8. Bytes that are not valid in the chosen encoding are an error.
//!
//! Text follows the usual element-tree conventions:
//! - [`Element::text`] is the text before the first child element, or `None`
//! - [`Element::plain_text`] is all descendant text with whitespace collapsed
//!
//! # Examples
//!
//! ```
//! use packtools::xml::Document;
//!
//! let doc: Document = r#"<article><front><journal-meta>
//!   <issn pub-type="epub">1678-4790</issn>
//! </journal-meta></front></article>"#
//!   .parse()
//!   .unwrap();
//!
//! let issn = doc.root().find_text("front/journal-meta/issn[@pub-type='epub']").unwrap();
//! assert_eq!(issn.as_deref(), Some("1678-4790"));
//! ```

use std::{borrow::Cow, io::Read, str::FromStr};

use encoding_rs::{Encoding, UTF_8};
use quick_xml::{events::Event, Reader};
use sxd_document::{
  dom::{self, ChildOfElement, ChildOfRoot},
  Package,
};
use sxd_xpath::nodeset::Node;

use super::*;

pub mod path;

/// A parsed XML document. Comments, processing instructions and the prolog are kept by the
/// parser but never surfaced.
pub struct Document {
  /// Storage every [`Element`] handle points into
  package: Package,
}

impl Document {
  /// Reads the whole of `reader` and parses it, e.g. a zip member.
  pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Self::from_bytes(&bytes)
  }

  /// Decodes `bytes` according to their byte order mark or XML declaration and parses them.
  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    let text = decode(bytes)?;
    text.parse()
  }

  /// The root element (`article` for SPS documents).
  pub fn root(&self) -> Element<'_> {
    let root = self
      .package
      .as_document()
      .root()
      .children()
      .into_iter()
      .find_map(|child| match child {
        ChildOfRoot::Element(element) => Some(element),
        _ => None,
      })
      .expect("parsed documents always have a root element");
    Element(root)
  }
}

impl FromStr for Document {
  type Err = PacktoolsError;

  fn from_str(s: &str) -> Result<Self> {
    let package = sxd_document::parser::parse(s)
      .map_err(|e| PacktoolsError::MalformedXml(format!("{e:?}")))?;
    let document = Self { package };
    debug!("Parsed XML document with root <{}>", document.root().name());
    Ok(document)
  }
}

impl std::fmt::Debug for Document {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Document").field("root", &self.root()).finish()
  }
}

/// Picks the encoding of `bytes` and decodes them without replacement characters.
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
  let (encoding, body) = match Encoding::for_bom(bytes) {
    Some((encoding, bom_length)) => (encoding, &bytes[bom_length..]),
    None => (declared_encoding(bytes)?.unwrap_or(UTF_8), bytes),
  };
  trace!("Decoding XML as {}", encoding.name());
  encoding.decode_without_bom_handling_and_without_replacement(body).ok_or_else(|| {
    PacktoolsError::Encoding(format!("bytes are not valid {}", encoding.name()))
  })
}

/// The encoding named by the XML declaration, if the document starts with one.
fn declared_encoding(bytes: &[u8]) -> Result<Option<&'static Encoding>> {
  let mut reader = Reader::from_reader(bytes);
  let mut buf = Vec::new();
  let Event::Decl(decl) = reader.read_event_into(&mut buf)? else {
    return Ok(None);
  };
  let Some(label) = decl.encoding().transpose()? else {
    return Ok(None);
  };
  Encoding::for_label(label.trim_ascii()).map(Some).ok_or_else(|| {
    PacktoolsError::Encoding(format!("unsupported encoding {}", String::from_utf8_lossy(&label)))
  })
}

/// A handle to an element of a [`Document`].
#[derive(Clone, Copy)]
pub struct Element<'d>(dom::Element<'d>);

impl<'d> Element<'d> {
  /// Local element name, without any namespace prefix.
  pub fn name(&self) -> &'d str { self.0.name().local_part() }

  /// Value of the attribute `key`, if present.
  pub fn attr(&self, key: &str) -> Option<&'d str> { self.0.attribute_value(key) }

  /// Child elements in document order.
  pub fn children(&self) -> impl Iterator<Item = Element<'d>> {
    self.0.children().into_iter().filter_map(|child| match child {
      ChildOfElement::Element(element) => Some(Element(element)),
      _ => None,
    })
  }

  /// The text that precedes the first child element.
  ///
  /// Returns `None` when the element starts with a child element or is empty, which is the
  /// distinction the metadata extractors rely on: a missing value is never an empty string.
  pub fn text(&self) -> Option<String> {
    let mut text = String::new();
    for child in self.0.children() {
      match child {
        ChildOfElement::Text(run) => text.push_str(run.text()),
        ChildOfElement::Element(_) => break,
        _ => (),
      }
    }
    (!text.is_empty()).then_some(text)
  }

  /// Every text run in the subtree, concatenated, with whitespace collapsed to single spaces.
  pub fn plain_text(&self) -> String {
    Node::from(self.0).string_value().split_whitespace().collect::<Vec<_>>().join(" ")
  }

  /// Evaluates `path` relative to this element and returns every match in document order.
  pub fn find_all(&self, path: &str) -> Result<Vec<Element<'d>>> {
    Ok(XPath::new(path)?.select(*self))
  }

  /// Evaluates `path` relative to this element and returns the first match.
  pub fn find(&self, path: &str) -> Result<Option<Element<'d>>> {
    Ok(XPath::new(path)?.first(*self))
  }

  /// [`Element::text`] of the first match of `path`.
  pub fn find_text(&self, path: &str) -> Result<Option<String>> {
    Ok(XPath::new(path)?.text(*self))
  }
}

impl std::fmt::Debug for Element<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "<{}>", self.name())
  }
}
