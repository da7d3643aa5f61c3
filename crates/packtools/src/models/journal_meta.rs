//! Journal identification read from `journal-meta`.

use super::*;

thread_local! {
  static ISSN_EPUB: XPath = static_path(".//journal-meta/issn[@pub-type='epub']");
  static ISSN_PPUB: XPath = static_path(".//journal-meta/issn[@pub-type='ppub']");
  static ACRONYM: XPath =
    static_path(".//journal-meta/journal-id[@journal-id-type='publisher-id']");
  static NLM_TA: XPath = static_path(".//journal-meta/journal-id[@journal-id-type='nlm-ta']");
  static JOURNAL_TITLE: XPath = static_path(".//journal-meta/journal-title-group/journal-title");
  static ABBREV_JOURNAL_TITLE: XPath = static_path(
    ".//journal-meta/journal-title-group/abbrev-journal-title[@abbrev-type='publisher']",
  );
  static PUBLISHER_NAME: XPath = static_path(".//journal-meta/publisher/publisher-name");
}

/// Print and electronic ISSNs.
#[derive(Debug, Clone, Copy)]
pub struct Issn<'a> {
  /// The `article` root
  root: Element<'a>,
}

impl<'a> Issn<'a> {
  /// Wraps the article root.
  pub fn new(root: Element<'a>) -> Self { Self { root } }

  /// ISSN typed `epub`.
  pub fn epub(&self) -> Option<String> { text_of(&ISSN_EPUB, self.root) }

  /// ISSN typed `ppub`.
  pub fn ppub(&self) -> Option<String> { text_of(&ISSN_PPUB, self.root) }
}

/// Journal identifiers.
#[derive(Debug, Clone, Copy)]
pub struct Acronym<'a> {
  /// The `article` root
  root: Element<'a>,
}

impl<'a> Acronym<'a> {
  /// Wraps the article root.
  pub fn new(root: Element<'a>) -> Self { Self { root } }

  /// The first `journal-id` typed `publisher-id`, which SciELO uses for the acronym.
  pub fn text(&self) -> Option<String> { text_of(&ACRONYM, self.root) }

  /// The NLM title abbreviation, when present.
  pub fn nlm_ta(&self) -> Option<String> { text_of(&NLM_TA, self.root) }
}

/// Full and abbreviated journal titles.
#[derive(Debug, Clone, Copy)]
pub struct Title<'a> {
  /// The `article` root
  root: Element<'a>,
}

impl<'a> Title<'a> {
  /// Wraps the article root.
  pub fn new(root: Element<'a>) -> Self { Self { root } }

  /// `journal-title`.
  pub fn journal_title(&self) -> Option<String> { text_of(&JOURNAL_TITLE, self.root) }

  /// `abbrev-journal-title` typed `publisher`.
  pub fn abbreviated_journal_title(&self) -> Option<String> {
    text_of(&ABBREV_JOURNAL_TITLE, self.root)
  }
}

/// Publisher names.
#[derive(Debug, Clone, Copy)]
pub struct Publisher<'a> {
  /// The `article` root
  root: Element<'a>,
}

impl<'a> Publisher<'a> {
  /// Wraps the article root.
  pub fn new(root: Element<'a>) -> Self { Self { root } }

  /// Every `publisher-name` in document order; `None` for an element without text.
  pub fn publishers_names(&self) -> Vec<Option<String>> {
    PUBLISHER_NAME.with(|path| path.texts(self.root))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const JOURNAL_META: &str = r#"<article>
    <front>
      <journal-meta>
        <journal-id journal-id-type="nlm-ta">Hist Cienc Saude Manguinhos</journal-id>
        <journal-id journal-id-type="publisher-id">hcsm</journal-id>
        <journal-title-group>
          <journal-title>História, Ciências, Saúde-Manguinhos</journal-title>
          <abbrev-journal-title abbrev-type="publisher">Hist. cienc. saude-Manguinhos</abbrev-journal-title>
        </journal-title-group>
        <issn pub-type="ppub">0104-5970</issn>
        <issn pub-type="epub">1678-4758</issn>
        <publisher>
          <publisher-name>Casa de Oswaldo Cruz, Fundação Oswaldo Cruz</publisher-name>
          <publisher-name/>
          <publisher-name>Fiocruz</publisher-name>
        </publisher>
      </journal-meta>
    </front>
  </article>"#;

  #[test]
  fn test_accessors() -> anyhow::Result<()> {
    let doc: Document = JOURNAL_META.parse()?;
    let root = doc.root();

    assert_eq!(Issn::new(root).epub().as_deref(), Some("1678-4758"));
    assert_eq!(Issn::new(root).ppub().as_deref(), Some("0104-5970"));
    assert_eq!(Acronym::new(root).text().as_deref(), Some("hcsm"));
    assert_eq!(Acronym::new(root).nlm_ta().as_deref(), Some("Hist Cienc Saude Manguinhos"));
    assert_eq!(
      Title::new(root).journal_title().as_deref(),
      Some("História, Ciências, Saúde-Manguinhos")
    );
    assert_eq!(
      Title::new(root).abbreviated_journal_title().as_deref(),
      Some("Hist. cienc. saude-Manguinhos")
    );
    assert_eq!(
      Publisher::new(root).publishers_names(),
      vec![
        Some("Casa de Oswaldo Cruz, Fundação Oswaldo Cruz".to_string()),
        None,
        Some("Fiocruz".to_string())
      ]
    );
    Ok(())
  }

  #[test]
  fn test_journal_meta_found_at_any_depth() -> anyhow::Result<()> {
    let doc: Document = r#"<article><journal-meta>
      <issn pub-type="epub">1678-4758</issn>
      <journal-id journal-id-type="publisher-id">hcsm</journal-id>
    </journal-meta></article>"#
      .parse()?;
    assert_eq!(Issn::new(doc.root()).epub().as_deref(), Some("1678-4758"));
    assert_eq!(Acronym::new(doc.root()).text().as_deref(), Some("hcsm"));
    Ok(())
  }

  #[test]
  fn test_absent_journal_meta() -> anyhow::Result<()> {
    let doc: Document = "<article><front/></article>".parse()?;
    let root = doc.root();
    assert_eq!(Issn::new(root).epub(), None);
    assert_eq!(Acronym::new(root).text(), None);
    assert_eq!(Title::new(root).journal_title(), None);
    assert!(Publisher::new(root).publishers_names().is_empty());
    Ok(())
  }
}
