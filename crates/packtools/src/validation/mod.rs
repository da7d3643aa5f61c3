//! Comparison of extracted metadata against expected values.
//!
//! Every comparator returns a [`ValidationResult`]: what was checked, what was expected,
//! what the document actually holds and whether the two are equal. A missing node is not an
//! error; it is observed as `null` and simply fails to match a non-null expectation.
//!
//! This module also defines [`DocumentValidator`], the seam through which
//! [`SpsPackage::is_valid`](crate::package::SpsPackage::is_valid) runs whole-document checks,
//! and [`StructureValidator`], a validator for the paths the metadata accessors depend on.

pub mod journal_meta;

use super::*;

/// An expected or observed value: a single (possibly absent) string, or a list of possibly
/// absent strings.
///
/// Serialized untagged, so it reads as `"1678-4790"`, `null` or `["a", null, "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Output {
  /// A single value; `None` when the node is absent
  Text(Option<String>),
  /// An ordered list of values; `None` for a node without text
  List(Vec<Option<String>>),
}

impl From<Option<&str>> for Output {
  fn from(value: Option<&str>) -> Self { Output::Text(value.map(str::to_string)) }
}

impl From<Option<String>> for Output {
  fn from(value: Option<String>) -> Self { Output::Text(value) }
}

impl From<&str> for Output {
  fn from(value: &str) -> Self { Output::Text(Some(value.to_string())) }
}

impl<S: AsRef<str>> From<&[S]> for Output {
  fn from(values: &[S]) -> Self {
    Output::List(values.iter().map(|value| Some(value.as_ref().to_string())).collect())
  }
}

impl From<Vec<String>> for Output {
  fn from(values: Vec<String>) -> Self { Output::List(values.into_iter().map(Some).collect()) }
}

impl From<Vec<Option<String>>> for Output {
  fn from(values: Vec<Option<String>>) -> Self { Output::List(values) }
}

impl std::fmt::Display for Output {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Output::Text(Some(text)) => write!(f, "{text}"),
      Output::Text(None) => write!(f, "null"),
      Output::List(values) => {
        let values: Vec<&str> =
          values.iter().map(|value| value.as_deref().unwrap_or("null")).collect();
        write!(f, "[{}]", values.join(", "))
      },
    }
  }
}

/// The outcome of one comparison. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
  /// What was compared, e.g. `issn epub`
  pub object:          String,
  /// The value the caller expected
  pub output_expected: Output,
  /// The value found in the document
  pub output_obteined: Output,
  /// Whether both values are equal
  #[serde(rename = "match")]
  pub is_match:        bool,
}

impl ValidationResult {
  /// Compares `expected` with `obtained` by plain equality.
  pub fn compare(object: &str, expected: impl Into<Output>, obtained: impl Into<Output>) -> Self {
    let output_expected = expected.into();
    let output_obteined = obtained.into();
    let is_match = output_expected == output_obteined;
    trace!("{object}: expected {output_expected}, obtained {output_obteined}, match {is_match}");
    Self { object: object.to_string(), output_expected, output_obteined, is_match }
  }
}

/// Status of one whole-document check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStatus {
  /// Name of the check
  pub check:    String,
  /// Whether it passed
  pub is_valid: bool,
  /// Human-readable reasons for a failure
  pub errors:   Vec<String>,
}

/// Whole-document validation consumed by
/// [`SpsPackage::is_valid`](crate::package::SpsPackage::is_valid).
///
/// The first status returned by [`DocumentValidator::validate_all`] is the overall verdict;
/// any further entries detail individual checks.
pub trait DocumentValidator {
  /// Runs every check against `document`.
  fn validate_all(&self, document: &Document) -> Vec<ValidationStatus>;
}

/// Checks that the document is an `article` and has the elements the metadata accessors read.
///
/// This is a structural sanity check, not a schema validator.
#[derive(Debug)]
pub struct StructureValidator {
  /// Paths that must match at least one element, relative to the root
  required: Vec<XPath>,
}

impl StructureValidator {
  /// Validator with a custom set of required paths.
  pub fn with_required_paths<'p>(paths: impl IntoIterator<Item = &'p str>) -> Result<Self> {
    let required = paths.into_iter().map(XPath::new).collect::<Result<Vec<_>>>()?;
    Ok(Self { required })
  }
}

/// What [`StructureValidator::default`] requires.
const REQUIRED_PATHS: [&str; 6] = [
  "front",
  "front/journal-meta",
  "front/journal-meta/journal-title-group/journal-title",
  "front/journal-meta/issn",
  "front/article-meta",
  "front/article-meta/title-group/article-title",
];

impl Default for StructureValidator {
  fn default() -> Self { Self { required: REQUIRED_PATHS.into_iter().map(static_path).collect() } }
}

impl DocumentValidator for StructureValidator {
  fn validate_all(&self, document: &Document) -> Vec<ValidationStatus> {
    let root = document.root();
    let mut details = vec![ValidationStatus {
      check:    "root element".to_string(),
      is_valid: root.name() == "article",
      errors:   match root.name() {
        "article" => Vec::new(),
        other => vec![format!("root element is <{other}>, expected <article>")],
      },
    }];
    for path in &self.required {
      let found = path.first(root).is_some();
      details.push(ValidationStatus {
        check:    path.to_string(),
        is_valid: found,
        errors:   if found { Vec::new() } else { vec![format!("missing {path}")] },
      });
    }

    let errors: Vec<String> = details.iter().flat_map(|status| status.errors.clone()).collect();
    debug!("Structure validation found {} problem(s)", errors.len());
    let overall =
      ValidationStatus { check: "structure".to_string(), is_valid: errors.is_empty(), errors };

    let mut statuses = Vec::with_capacity(details.len() + 1);
    statuses.push(overall);
    statuses.extend(details);
    statuses
  }
}
