//! Compiled XPath expressions evaluated against [`Element`] handles.
//!
//! The publishing schema's contract is written as element paths such as
//! `front/journal-meta/issn[@pub-type='epub']` or `.//article-meta//contrib`. Expressions are
//! compiled once by `sxd-xpath` and evaluated relative to the element they are given; node
//! sets come back in document order.
//!
//! Compiled expressions are not `Sync`, so the extractors keep theirs in `thread_local!`
//! slots rather than process-wide statics.

use sxd_xpath::{nodeset::Node, Context, Factory, Value};

use super::*;

/// A compiled path expression.
///
/// ```
/// use packtools::xml::{path::XPath, Document};
///
/// let doc: Document = "<article><front><journal-meta><publisher>\
///   <publisher-name>A</publisher-name><publisher-name>B</publisher-name>\
///   </publisher></journal-meta></front></article>"
///   .parse()
///   .unwrap();
/// let names = XPath::new(".//publisher/publisher-name").unwrap();
/// assert_eq!(names.texts(doc.root()), vec![Some("A".to_string()), Some("B".to_string())]);
/// ```
pub struct XPath {
  /// The expression as written, kept for display and diagnostics
  source:   String,
  /// The compiled expression
  compiled: sxd_xpath::XPath,
}

impl XPath {
  /// Compiles `expr`, failing with [`PacktoolsError::InvalidPath`] on invalid syntax.
  pub fn new(expr: &str) -> Result<Self> {
    match Factory::new().build(expr) {
      Ok(Some(compiled)) => Ok(Self { source: expr.to_string(), compiled }),
      Ok(None) => Err(PacktoolsError::InvalidPath(expr.to_string())),
      Err(e) => {
        trace!("Rejected path {expr}: {e:?}");
        Err(PacktoolsError::InvalidPath(expr.to_string()))
      },
    }
  }

  /// Every element matched from `context`, in document order.
  ///
  /// Expressions that evaluate to something other than a node set, or fail at evaluation
  /// time, select nothing.
  pub fn select<'d>(&self, context: Element<'d>) -> Vec<Element<'d>> {
    let nodes = match self.compiled.evaluate(&Context::new(), context.0) {
      Ok(Value::Nodeset(nodes)) => nodes,
      Ok(other) => {
        warn!("Path {} evaluated to {other:?} instead of a node set", self.source);
        return Vec::new();
      },
      Err(e) => {
        warn!("Path {} failed to evaluate: {e:?}", self.source);
        return Vec::new();
      },
    };

    let selected: Vec<Element<'d>> = nodes
      .document_order()
      .into_iter()
      .filter_map(|node| match node {
        Node::Element(element) => Some(Element(element)),
        _ => None,
      })
      .collect();
    if selected.is_empty() {
      trace!("Path {} matched nothing", self.source);
    }
    selected
  }

  /// The first element matched from `context`.
  pub fn first<'d>(&self, context: Element<'d>) -> Option<Element<'d>> {
    self.select(context).into_iter().next()
  }

  /// [`Element::text`] of the first match.
  pub fn text(&self, context: Element<'_>) -> Option<String> {
    self.first(context).and_then(|element| element.text())
  }

  /// [`Element::text`] of every match, `None` for matches without text.
  pub fn texts(&self, context: Element<'_>) -> Vec<Option<String>> {
    self.select(context).into_iter().map(|element| element.text()).collect()
  }

  /// The expression as written.
  pub fn as_str(&self) -> &str { &self.source }
}

/// Compiles a path written into the source. Only used to fill `thread_local!` slots, where a
/// path that does not compile is a programming error.
pub(crate) fn static_path(expr: &str) -> XPath {
  XPath::new(expr).unwrap_or_else(|e| panic!("static path {expr} does not compile: {e}"))
}

impl std::fmt::Debug for XPath {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("XPath").field(&self.source).finish()
  }
}

impl std::fmt::Display for XPath {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.source) }
}

impl std::str::FromStr for XPath {
  type Err = PacktoolsError;

  fn from_str(s: &str) -> Result<Self> { Self::new(s) }
}
