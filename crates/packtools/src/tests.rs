use std::{fs::File, io::Write, path::PathBuf};

use tempfile::{tempdir, TempDir};
use zip::write::{SimpleFileOptions, ZipWriter};

use super::*;
use crate::{
  models::{aff::Affiliation, authors::Authors},
  package::SpsPackage,
  validation::{
    journal_meta::{ExpectedJournalMeta, JournalMetaValidation},
    StructureValidator,
  },
};

const PACKAGE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE article PUBLIC "-//NLM//DTD JATS (Z39.96) Journal Publishing DTD v1.1 20151215//EN" "https://jats.nlm.nih.gov/publishing/1.1/JATS-journalpublishing1.dtd">
<article xmlns:xlink="http://www.w3.org/1999/xlink" article-type="research-article" xml:lang="pt">
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
      </publisher>
    </journal-meta>
    <article-meta>
      <title-group>
        <article-title>Uma história da saúde pública</article-title>
      </title-group>
      <contrib-group>
        <contrib contrib-type="author">
          <contrib-id contrib-id-type="orcid">0000-0002-1825-0097</contrib-id>
          <name><surname>Cruz</surname><given-names>Oswaldo</given-names></name>
          <xref ref-type="aff" rid="aff1">I</xref>
        </contrib>
        <contrib contrib-type="author">
          <name><surname>Chagas</surname><given-names>Carlos</given-names></name>
          <xref ref-type="aff" rid="aff2">II</xref>
        </contrib>
      </contrib-group>
      <aff id="aff1">
        <label>I</label>
        <institution content-type="orgname">Fundação Oswaldo Cruz</institution>
        <addr-line><named-content content-type="city">Rio de Janeiro</named-content></addr-line>
        <country country="BR">Brasil</country>
      </aff>
      <pub-date pub-type="epub-ppub"><year>2023</year></pub-date>
      <volume>30</volume>
      <issue>1</issue>
    </article-meta>
  </front>
  <sub-article article-type="translation" xml:lang="en" id="s1">
    <front-stub>
      <contrib-group>
        <contrib contrib-type="translator">
          <name><surname>Lutz</surname><given-names>Bertha</given-names></name>
        </contrib>
      </contrib-group>
    </front-stub>
  </sub-article>
</article>"#;

/// Writes a package holding the article, a PDF rendition and two figures.
fn write_package() -> anyhow::Result<(TempDir, PathBuf)> {
  let dir = tempdir()?;
  let path = dir.path().join("0104-5970-hcsm-30-01.zip");
  let mut writer = ZipWriter::new(File::create(&path)?);
  for (name, content) in [
    ("0104-5970-hcsm-30-01.xml", PACKAGE_XML.as_bytes()),
    ("0104-5970-hcsm-30-01.pdf", b"%PDF-1.4".as_slice()),
    ("0104-5970-hcsm-30-01-gf01.jpg", b"\xff\xd8\xff".as_slice()),
    ("0104-5970-hcsm-30-01-gf02.JPG", b"\xff\xd8\xff".as_slice()),
  ] {
    writer.start_file(name, SimpleFileOptions::default())?;
    writer.write_all(content)?;
  }
  writer.finish()?;
  Ok((dir, path))
}

#[traced_test]
#[test]
fn test_package_end_to_end() -> anyhow::Result<()> {
  let (_dir, path) = write_package()?;
  let package = SpsPackage::open(&path)?;

  let members = package.list_members_by_type();
  assert_eq!(members.get("xml"), ["0104-5970-hcsm-30-01.xml"]);
  assert_eq!(members.get("jpg").len(), 2);

  let meta = package.meta()?;
  assert_eq!(meta.journal_pissn.as_deref(), Some("0104-5970"));
  assert_eq!(meta.issue_year.as_deref(), Some("2023"));
  assert_eq!(meta.issue_number.as_deref(), Some("1"));
  assert!(package.is_valid(&StructureValidator::default())?);
  Ok(())
}

#[test]
fn test_authors_resolved_from_package() -> anyhow::Result<()> {
  let (_dir, path) = write_package()?;
  let package = SpsPackage::open(&path)?;
  let root = package.document()?.root();

  let contribs: Vec<_> = Authors::new(root).contribs_with_affs().collect();
  assert_eq!(contribs.len(), 3);
  assert_eq!(contribs[0].orcid.as_deref(), Some("0000-0002-1825-0097"));
  let cruz_affs = contribs[0].affs.as_ref().expect("cruz has an affiliation reference");
  assert_eq!(cruz_affs[0].as_ref().and_then(|aff| aff.country_code.as_deref()), Some("BR"));

  let chagas_affs = contribs[1].affs.as_ref().expect("chagas has an affiliation reference");
  assert_eq!(chagas_affs.len(), 1);
  assert!(chagas_affs[0].is_none());

  assert_eq!(contribs[2].contrib_type.as_deref(), Some("translator"));
  assert_eq!(contribs[2].affs, None);

  assert_eq!(Affiliation::new(root).affiliation_by_id().len(), 1);
  Ok(())
}

#[test]
fn test_journal_meta_validation_from_package() -> anyhow::Result<()> {
  let (_dir, path) = write_package()?;
  let package = SpsPackage::open(&path)?;
  let root = package.document()?.root();

  let expected: ExpectedJournalMeta = serde_json::from_str(
    r#"{
      "issn_epub": "1678-4758",
      "issn_ppub": "0104-5970",
      "acronym": "hcsm",
      "journal-title": "História, Ciências, Saúde-Manguinhos",
      "abbrev-journal-title": "Hist. cienc. saude-Manguinhos",
      "publisher-name": ["Casa de Oswaldo Cruz, Fundação Oswaldo Cruz"]
    }"#,
  )?;
  let results = JournalMetaValidation::new(root).validate(&expected);
  assert_eq!(results.len(), 6);
  assert!(results.iter().all(|result| result.is_match));

  let stale = ExpectedJournalMeta { issn_epub: Some("1678-4790".to_string()), ..expected };
  let results = JournalMetaValidation::new(root).validate(&stale);
  let mismatched: Vec<&str> =
    results.iter().filter(|result| !result.is_match).map(|result| result.object.as_str()).collect();
  assert_eq!(mismatched, vec!["issn epub"]);
  Ok(())
}

#[test]
fn test_not_a_zip() -> anyhow::Result<()> {
  let dir = tempdir()?;
  let path = dir.path().join("article.xml");
  std::fs::write(&path, PACKAGE_XML)?;
  assert!(matches!(SpsPackage::open(&path), Err(PacktoolsError::NotAZipFile(p)) if p == path));
  Ok(())
}
