//! Contributor extraction.
//!
//! [`Authors`] walks the `<contrib>` elements under a node and produces one [`Contrib`] per
//! element. The node may be a whole `article`, or a `sub-article` (translations, reviews):
//! every path here is relative, so the same extractor serves both.
//!
//! # Examples
//!
//! ```
//! use packtools::{models::authors::Authors, xml::Document};
//!
//! let doc: Document = r#"<article><front><article-meta><contrib-group>
//!   <contrib contrib-type="author">
//!     <name><surname>Silva</surname><given-names>Ana</given-names></name>
//!     <xref ref-type="aff" rid="aff1">1</xref>
//!   </contrib>
//! </contrib-group></article-meta></front></article>"#
//!   .parse()
//!   .unwrap();
//!
//! let contribs = Authors::new(doc.root()).contribs();
//! assert_eq!(contribs[0].surname.as_deref(), Some("Silva"));
//! assert_eq!(contribs[0].aff_rid_list(), ["aff1"]);
//! assert!(contribs[0].role.is_none());
//! ```

use std::{borrow::Cow, thread::LocalKey};

use super::{
  aff::{Affiliation, AffiliationIndex, AffiliationRecord},
  *,
};

thread_local! {
  static CONTRIB: XPath = static_path(".//contrib");
  static ARTICLE_META_CONTRIB: XPath = static_path(".//article-meta//contrib");
  static SUB_ARTICLE_CONTRIB: XPath = static_path(".//sub-article//contrib");
  static COLLAB: XPath = static_path(".//collab");
  static SURNAME: XPath = static_path(".//surname");
  static PREFIX: XPath = static_path(".//prefix");
  static SUFFIX: XPath = static_path(".//suffix");
  static GIVEN_NAMES: XPath = static_path(".//given-names");
  static ORCID: XPath = static_path("contrib-id[@contrib-id-type='orcid']");
  static ROLE: XPath = static_path(".//role");
  static XREF: XPath = static_path(".//xref");
}

/// `ref-type` of cross-references that point at affiliations.
const AFF_REF_TYPE: &str = "aff";

/// Which `<contrib>` elements under the node an extraction covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContribScope {
  /// Every contributor
  #[default]
  All,
  /// Contributors inside `article-meta`
  ArticleMeta,
  /// Contributors inside `sub-article` elements, nested ones included, each listed once
  SubArticle,
}

impl ContribScope {
  /// The path selecting the scope's contributors.
  fn path(self) -> &'static LocalKey<XPath> {
    match self {
      ContribScope::All => &CONTRIB,
      ContribScope::ArticleMeta => &ARTICLE_META_CONTRIB,
      ContribScope::SubArticle => &SUB_ARTICLE_CONTRIB,
    }
  }
}

/// A `<role>` of a contributor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  /// Role as written, e.g. `Writing – original draft`
  pub text:         Option<String>,
  /// Usually a CRediT taxonomy URI
  #[serde(rename = "content-type")]
  pub content_type: Option<String>,
  /// e.g. `reviewer`, `editor`
  #[serde(rename = "specific-use")]
  pub specific_use: Option<String>,
}

/// Everything extracted from one `<contrib>` element.
///
/// Optional fields are left out of the serialized form when absent: a contributor without
/// roles has no `role` key at all, rather than an empty list. `contrib-type` and `aff_rids` are
/// always present and `null` when there is nothing to report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contrib {
  /// Organizational author name (`<collab>`), whitespace-normalized
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub collab:       Option<String>,
  /// Family name
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub surname:      Option<String>,
  /// Name prefix, e.g. `Dr.`
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prefix:       Option<String>,
  /// Name suffix, e.g. `Jr.`
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub suffix:       Option<String>,
  /// Given names
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub given_names:  Option<String>,
  /// ORCID iD from `contrib-id[@contrib-id-type='orcid']`
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub orcid:        Option<String>,
  /// Roles in document order; `None` when the contributor has none
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:         Option<Vec<Role>>,
  /// Every cross-reference id, in document order
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rid:          Option<Vec<String>>,
  /// The subset of [`Contrib::rid`] that points at affiliations
  #[serde(default, rename = "rid-aff", skip_serializing_if = "Option::is_none")]
  pub rid_aff:      Option<Vec<String>>,
  /// Same ids as [`Contrib::rid_aff`], under the key downstream consumers read
  #[serde(default)]
  pub aff_rids:     Option<Vec<String>>,
  /// The element's own `contrib-type` attribute
  #[serde(rename = "contrib-type")]
  pub contrib_type: Option<String>,
  /// Affiliations resolved from [`Contrib::rid_aff`]; `None` entries are ids that matched
  /// no affiliation. Only set by [`Authors::contribs_with_affs`] and friends.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub affs:         Option<Vec<Option<AffiliationRecord>>>,
}

impl Contrib {
  /// Affiliation reference ids, empty when there are none.
  pub fn aff_rid_list(&self) -> &[String] { self.aff_rids.as_deref().unwrap_or(&[]) }

  /// Resolves [`Contrib::aff_rid_list`] against `index`. Ids without a record resolve to `None`
  /// so broken cross-references stay visible.
  fn attach_affs(mut self, index: &AffiliationIndex) -> Self {
    if !self.aff_rid_list().is_empty() {
      let affs = self.aff_rid_list().iter().map(|rid| index.get(rid).cloned()).collect();
      self.affs = Some(affs);
    }
    self
  }
}

/// Contributor extractor over an `article` or `sub-article` node.
#[derive(Debug, Clone, Copy)]
pub struct Authors<'a> {
  /// Scope of every query
  node: Element<'a>,
}

impl<'a> Authors<'a> {
  /// Wraps the scope node.
  pub fn new(node: Element<'a>) -> Self { Self { node } }

  /// Direct text of the first `<collab>` under the node.
  pub fn collab(&self) -> Option<String> { text_of(&COLLAB, self.node) }

  /// Every contributor under the node.
  pub fn contribs(&self) -> Vec<Contrib> { self.contribs_in(ContribScope::All) }

  /// Contributors inside `article-meta` only.
  pub fn contribs_in_article_meta(&self) -> Vec<Contrib> {
    self.contribs_in(ContribScope::ArticleMeta)
  }

  /// Contributors inside `sub-article` elements only.
  pub fn contribs_in_sub_article(&self) -> Vec<Contrib> {
    self.contribs_in(ContribScope::SubArticle)
  }

  /// Contributors in `scope`, in document order.
  pub fn contribs_in(&self, scope: ContribScope) -> Vec<Contrib> {
    let contribs: Vec<Contrib> = self.select(scope).into_iter().map(read_contrib).collect();
    debug!("Extracted {} contributor(s) for {scope:?}", contribs.len());
    contribs
  }

  /// Every contributor with its affiliations resolved against the affiliations found under
  /// the same node.
  ///
  /// The iterator is lazy and single-pass: each contributor is extracted when it is yielded.
  pub fn contribs_with_affs(&self) -> ContribsWithAffs<'a, 'static> {
    let index = Affiliation::new(self.node).affiliation_by_id();
    ContribsWithAffs {
      contribs: self.select(ContribScope::All).into_iter(),
      index:    Cow::Owned(index),
    }
  }

  /// Like [`Authors::contribs_with_affs`], joining against an index built elsewhere, e.g. from
  /// the top-level article when extracting a sub-article's contributors.
  pub fn contribs_with_affs_from<'i>(
    &self,
    index: &'i AffiliationIndex,
  ) -> ContribsWithAffs<'a, 'i> {
    self.contribs_with_affs_in(ContribScope::All, index)
  }

  /// The contributors of [`Authors::contribs_in`] joined against `index`.
  pub fn contribs_with_affs_in<'i>(
    &self,
    scope: ContribScope,
    index: &'i AffiliationIndex,
  ) -> ContribsWithAffs<'a, 'i> {
    ContribsWithAffs { contribs: self.select(scope).into_iter(), index: Cow::Borrowed(index) }
  }

  /// The `<contrib>` elements of `scope`.
  fn select(&self, scope: ContribScope) -> Vec<Element<'a>> {
    scope.path().with(|path| path.select(self.node))
  }
}

/// Lazy sequence of contributors with resolved affiliations.
///
/// Returned by [`Authors::contribs_with_affs`]; finite, and not restartable without asking the
/// extractor again.
pub struct ContribsWithAffs<'a, 'i> {
  /// Remaining `<contrib>` elements
  contribs: std::vec::IntoIter<Element<'a>>,
  /// Affiliations to join against
  index:    Cow<'i, AffiliationIndex>,
}

impl Iterator for ContribsWithAffs<'_, '_> {
  type Item = Contrib;

  fn next(&mut self) -> Option<Self::Item> {
    let contrib = self.contribs.next()?;
    Some(read_contrib(contrib).attach_affs(&self.index))
  }

  fn size_hint(&self) -> (usize, Option<usize>) { self.contribs.size_hint() }
}

/// Builds the record for one `<contrib>`.
fn read_contrib(node: Element<'_>) -> Contrib {
  let roles: Vec<Role> = ROLE
    .with(|path| path.select(node))
    .into_iter()
    .map(|role| Role {
      text:         role.text(),
      content_type: role.attr("content-type").map(str::to_string),
      specific_use: role.attr("specific-use").map(str::to_string),
    })
    .collect();

  let mut rid = Vec::new();
  let mut rid_aff = Vec::new();
  for xref in XREF.with(|path| path.select(node)) {
    let Some(id) = xref.attr("rid").filter(|id| !id.is_empty()) else {
      continue;
    };
    rid.push(id.to_string());
    if xref.attr("ref-type") == Some(AFF_REF_TYPE) {
      rid_aff.push(id.to_string());
    }
  }
  let rid_aff = (!rid_aff.is_empty()).then_some(rid_aff);

  Contrib {
    collab: COLLAB.with(|path| path.first(node)).map(|collab| collab.plain_text()),
    surname: text_of(&SURNAME, node),
    prefix: text_of(&PREFIX, node),
    suffix: text_of(&SUFFIX, node),
    given_names: text_of(&GIVEN_NAMES, node),
    orcid: text_of(&ORCID, node),
    role: (!roles.is_empty()).then_some(roles),
    rid: (!rid.is_empty()).then_some(rid),
    aff_rids: rid_aff.clone(),
    rid_aff,
    contrib_type: node.attr("contrib-type").map(str::to_string),
    affs: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ARTICLE: &str = r#"<article article-type="research-article">
    <front>
      <article-meta>
        <contrib-group>
          <contrib contrib-type="author">
            <contrib-id contrib-id-type="orcid">0000-0001-8528-2091</contrib-id>
            <name>
              <surname>Einstein</surname>
              <given-names>Albert</given-names>
              <prefix>Prof.</prefix>
              <suffix>Nieto</suffix>
            </name>
            <role content-type="https://credit.niso.org/contributor-roles/conceptualization/">Conceptualização</role>
            <role specific-use="reviewer">Revisor</role>
            <xref ref-type="aff" rid="aff1">1</xref>
            <xref ref-type="fn" rid="fn1">*</xref>
            <xref ref-type="aff" rid="aff9">9</xref>
          </contrib>
          <contrib contrib-type="author">
            <collab>The MARS
              Consortium</collab>
            <xref ref-type="aff" rid="">?</xref>
          </contrib>
          <contrib>
            <name><surname></surname><given-names>Ana</given-names></name>
          </contrib>
        </contrib-group>
        <aff id="aff1"><institution content-type="orgname">Fiocruz</institution></aff>
      </article-meta>
    </front>
    <sub-article article-type="translation" id="s1">
      <front-stub>
        <contrib-group>
          <contrib contrib-type="author">
            <name><surname>Meitner</surname><given-names>Lise</given-names></name>
            <xref ref-type="aff" rid="aff1">1</xref>
          </contrib>
        </contrib-group>
      </front-stub>
    </sub-article>
  </article>"#;

  fn article() -> Document { ARTICLE.parse().unwrap() }

  #[traced_test]
  #[test]
  fn test_contrib_with_every_field() {
    let doc = article();
    let contribs = Authors::new(doc.root()).contribs();
    assert_eq!(contribs.len(), 4);

    let einstein = &contribs[0];
    assert_eq!(einstein.surname.as_deref(), Some("Einstein"));
    assert_eq!(einstein.given_names.as_deref(), Some("Albert"));
    assert_eq!(einstein.prefix.as_deref(), Some("Prof."));
    assert_eq!(einstein.suffix.as_deref(), Some("Nieto"));
    assert_eq!(einstein.orcid.as_deref(), Some("0000-0001-8528-2091"));
    assert_eq!(einstein.contrib_type.as_deref(), Some("author"));
    assert_eq!(einstein.collab, None);
    assert_eq!(
      einstein.role,
      Some(vec![
        Role {
          text:         Some("Conceptualização".to_string()),
          content_type: Some(
            "https://credit.niso.org/contributor-roles/conceptualization/".to_string()
          ),
          specific_use: None,
        },
        Role {
          text:         Some("Revisor".to_string()),
          content_type: None,
          specific_use: Some("reviewer".to_string()),
        },
      ])
    );
    assert_eq!(einstein.rid, Some(vec!["aff1".into(), "fn1".into(), "aff9".into()]));
    assert_eq!(einstein.aff_rid_list(), ["aff1", "aff9"]);
  }

  #[test]
  fn test_collab_and_empty_rids() {
    let doc = article();
    let contribs = Authors::new(doc.root()).contribs();

    let consortium = &contribs[1];
    assert_eq!(consortium.collab.as_deref(), Some("The MARS Consortium"));
    assert_eq!(consortium.surname, None);
    assert_eq!(consortium.rid, None);
    assert_eq!(consortium.rid_aff, None);
    assert_eq!(consortium.aff_rids, None);
    assert!(consortium.aff_rid_list().is_empty());

    let anonymous = &contribs[2];
    assert_eq!(anonymous.surname, None);
    assert_eq!(anonymous.given_names.as_deref(), Some("Ana"));
    assert_eq!(anonymous.contrib_type, None);
  }

  #[test]
  fn test_collab_accessor_uses_direct_text() {
    let doc = article();
    assert_eq!(
      Authors::new(doc.root()).collab().as_deref(),
      Some("The MARS\n              Consortium")
    );
  }

  #[test]
  fn test_scoped_contribs() {
    let doc = article();
    let authors = Authors::new(doc.root());

    let in_article_meta = authors.contribs_in_article_meta();
    assert_eq!(in_article_meta.len(), 3);

    let in_sub_article = authors.contribs_in_sub_article();
    assert_eq!(in_sub_article.len(), 1);
    assert_eq!(in_sub_article[0].surname.as_deref(), Some("Meitner"));
  }

  #[test]
  fn test_sub_article_node_as_scope() -> anyhow::Result<()> {
    let doc = article();
    let sub_article = doc.root().find("sub-article")?.unwrap();
    let contribs = Authors::new(sub_article).contribs();
    assert_eq!(contribs.len(), 1);
    assert_eq!(contribs[0].given_names.as_deref(), Some("Lise"));
    Ok(())
  }

  #[test]
  fn test_contribs_with_affs_keeps_unmatched_ids() {
    let doc = article();
    let mut contribs = Authors::new(doc.root()).contribs_with_affs();
    assert_eq!(contribs.size_hint(), (4, Some(4)));

    let einstein = contribs.next().unwrap();
    let affs = einstein.affs.unwrap();
    assert_eq!(affs.len(), 2);
    assert_eq!(affs[0].as_ref().and_then(|aff| aff.orgname.as_deref()), Some("Fiocruz"));
    assert_eq!(affs[1], None);

    let consortium = contribs.next().unwrap();
    assert_eq!(consortium.affs, None);

    assert_eq!(contribs.count(), 2);
  }

  #[test]
  fn test_contribs_with_affs_from_external_index() {
    let doc = article();
    let index = Affiliation::new(doc.root()).affiliation_by_id();
    let sub_article = doc.root().find("sub-article").unwrap().unwrap();

    let contribs: Vec<Contrib> = Authors::new(sub_article).contribs_with_affs_from(&index).collect();
    let affs = contribs[0].affs.as_ref().unwrap();
    assert_eq!(affs[0].as_ref().and_then(|aff| aff.id.as_deref()), Some("aff1"));
  }

  #[test]
  fn test_serialized_record_omits_absent_keys() -> anyhow::Result<()> {
    let doc = article();
    let contribs = Authors::new(doc.root()).contribs();

    let consortium = serde_json::to_value(&contribs[1])?;
    assert_eq!(
      consortium,
      serde_json::json!({
        "collab": "The MARS Consortium",
        "aff_rids": null,
        "contrib-type": "author"
      })
    );

    let einstein = serde_json::to_value(&contribs[0])?;
    assert_eq!(einstein["rid-aff"], serde_json::json!(["aff1", "aff9"]));
    assert_eq!(einstein["aff_rids"], einstein["rid-aff"]);
    assert_eq!(einstein["role"][1]["specific-use"], "reviewer");
    assert!(einstein.get("affs").is_none());
    Ok(())
  }

  #[test]
  fn test_nested_sub_articles_list_each_contrib_once() -> anyhow::Result<()> {
    let doc: Document = r#"<article>
      <front><article-meta>
        <aff id="aff1"><institution content-type="orgname">Fiocruz</institution></aff>
      </article-meta></front>
      <sub-article id="s1">
        <front-stub><contrib><name><surname>Lutz</surname></name></contrib></front-stub>
        <sub-article id="s2">
          <front-stub>
            <contrib>
              <name><surname>Chagas</surname></name>
              <xref ref-type="aff" rid="aff1">1</xref>
            </contrib>
          </front-stub>
        </sub-article>
      </sub-article>
    </article>"#
      .parse()?;
    let authors = Authors::new(doc.root());
    let index = Affiliation::new(doc.root()).affiliation_by_id();

    let plain = authors.contribs_in(ContribScope::SubArticle);
    let joined: Vec<Contrib> =
      authors.contribs_with_affs_in(ContribScope::SubArticle, &index).collect();
    assert_eq!(plain.len(), 2);
    assert_eq!(joined.len(), 2);

    let surnames: Vec<_> = joined.iter().map(|contrib| contrib.surname.as_deref()).collect();
    assert_eq!(surnames, vec![Some("Lutz"), Some("Chagas")]);
    let chagas_affs = joined[1].affs.as_ref().unwrap();
    assert_eq!(chagas_affs[0].as_ref().and_then(|aff| aff.orgname.as_deref()), Some("Fiocruz"));

    assert!(authors.contribs_with_affs_in(ContribScope::ArticleMeta, &index).next().is_none());
    Ok(())
  }
}
