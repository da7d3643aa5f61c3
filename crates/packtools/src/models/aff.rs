//! Affiliation records.
//!
//! Contributors point at affiliations through `<xref ref-type="aff" rid="...">`. This module
//! reads every `<aff>` under a node and indexes the ones that carry an `id`, which is what the
//! author extractor joins against.

use super::*;

thread_local! {
  static AFF: XPath = static_path(".//aff");
  static LABEL: XPath = static_path("label");
  static ORIGINAL: XPath = static_path("institution[@content-type='original']");
  static ORGNAME: XPath = static_path("institution[@content-type='orgname']");
  static ORGDIV1: XPath = static_path("institution[@content-type='orgdiv1']");
  static ORGDIV2: XPath = static_path("institution[@content-type='orgdiv2']");
  static CITY: XPath = static_path("addr-line/named-content[@content-type='city']");
  static PLAIN_CITY: XPath = static_path("addr-line/city");
  static STATE: XPath = static_path("addr-line/named-content[@content-type='state']");
  static PLAIN_STATE: XPath = static_path("addr-line/state");
  static COUNTRY: XPath = static_path("country");
  static EMAIL: XPath = static_path(".//email");
}

/// Institutional and address data of one `<aff>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliationRecord {
  /// The `id` attribute contributors refer to
  pub id:           Option<String>,
  /// Display label, e.g. `1` or `a`
  pub label:        Option<String>,
  /// The affiliation as originally written by the authors
  pub original:     Option<String>,
  /// Institution name
  pub orgname:      Option<String>,
  /// First-level division
  pub orgdiv1:      Option<String>,
  /// Second-level division
  pub orgdiv2:      Option<String>,
  /// Country as written
  pub country_name: Option<String>,
  /// ISO 3166 code from `country/@country`
  pub country_code: Option<String>,
  /// State or province
  pub state:        Option<String>,
  /// City
  pub city:         Option<String>,
  /// Contact email
  pub email:        Option<String>,
}

/// Affiliation records keyed by their `id`.
pub type AffiliationIndex = BTreeMap<String, AffiliationRecord>;

/// Reads the affiliations under a node.
#[derive(Debug, Clone, Copy)]
pub struct Affiliation<'a> {
  /// `article`, `sub-article` or any other scope
  node: Element<'a>,
}

impl<'a> Affiliation<'a> {
  /// Wraps the scope node.
  pub fn new(node: Element<'a>) -> Self { Self { node } }

  /// Every `<aff>` under the node in document order, with or without an id.
  pub fn affiliation_list(&self) -> Vec<AffiliationRecord> {
    AFF.with(|path| path.select(self.node)).into_iter().map(read_aff).collect()
  }

  /// Affiliations that carry an id, keyed by it. When ids repeat, the first one wins.
  pub fn affiliation_by_id(&self) -> AffiliationIndex {
    let mut index = AffiliationIndex::new();
    for record in self.affiliation_list() {
      if let Some(id) = record.id.clone() {
        index.entry(id).or_insert(record);
      }
    }
    debug!("Indexed {} affiliation(s)", index.len());
    index
  }
}

/// Extracts one record.
fn read_aff(aff: Element<'_>) -> AffiliationRecord {
  let country = COUNTRY.with(|path| path.first(aff));
  AffiliationRecord {
    id:           aff.attr("id").map(str::to_string),
    label:        text_of(&LABEL, aff),
    original:     ORIGINAL
      .with(|path| path.first(aff))
      .map(|institution| institution.plain_text())
      .filter(|text| !text.is_empty()),
    orgname:      text_of(&ORGNAME, aff),
    orgdiv1:      text_of(&ORGDIV1, aff),
    orgdiv2:      text_of(&ORGDIV2, aff),
    country_name: country.and_then(|country| country.text()),
    country_code: country.and_then(|country| country.attr("country")).map(str::to_string),
    state:        text_of(&STATE, aff).or_else(|| text_of(&PLAIN_STATE, aff)),
    city:         text_of(&CITY, aff).or_else(|| text_of(&PLAIN_CITY, aff)),
    email:        text_of(&EMAIL, aff),
  }
}
