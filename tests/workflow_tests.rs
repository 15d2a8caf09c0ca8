//! End-to-end workflow tests
//!
//! Provision a scratch cache with miniature codelist and schema
//! fixtures, then run the full pipeline over an embedded metadata
//! record: parse, extract, cross-check coded values and validate.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::fs;
use wcmp::codelists::AUTHORITY_ISO;
use wcmp::extract::{keyword_info, string_or_anchor_values_many};
use wcmp::temporal::parse_time_position_at;
use wcmp::{parse_wcmp, resolve_path, CacheLayout, CodelistStore, Error, ProfileSchema};

const RECORD: &str = r##"<gmd:MD_Metadata
    xmlns:gmd="http://www.isotc211.org/2005/gmd"
    xmlns:gco="http://www.isotc211.org/2005/gco"
    xmlns:gmx="http://www.isotc211.org/2005/gmx"
    xmlns:gml="http://www.opengis.net/gml/3.2"
    xmlns:xlink="http://www.w3.org/1999/xlink">
  <gmd:hierarchyLevel>
    <gmd:MD_ScopeCode codeList="#MD_ScopeCode" codeListValue="dataset">dataset</gmd:MD_ScopeCode>
  </gmd:hierarchyLevel>
  <gmd:identificationInfo>
    <gmd:MD_DataIdentification>
      <gmd:descriptiveKeywords>
        <gmd:MD_Keywords>
          <gmd:keyword>
            <gco:CharacterString>precipitation</gco:CharacterString>
          </gmd:keyword>
          <gmd:keyword>
            <gmx:Anchor xlink:href="https://codes.example.org/temperature">temperature</gmx:Anchor>
          </gmd:keyword>
          <gmd:type>
            <gmd:MD_KeywordTypeCode codeList="#MD_KeywordTypeCode" codeListValue="theme"/>
          </gmd:type>
          <gmd:thesaurusName>
            <gmd:CI_Citation>
              <gmd:title>
                <gco:CharacterString>WMO Category Codes</gco:CharacterString>
              </gmd:title>
            </gmd:CI_Citation>
          </gmd:thesaurusName>
        </gmd:MD_Keywords>
      </gmd:descriptiveKeywords>
      <gmd:extent>
        <gmd:EX_Extent>
          <gmd:temporalElement>
            <gmd:EX_TemporalExtent>
              <gmd:extent>
                <gml:TimePeriod gml:id="tp1">
                  <gml:beginPosition>2020-01-01T00:00:00Z</gml:beginPosition>
                  <gml:endPosition indeterminatePosition="now"/>
                </gml:TimePeriod>
              </gmd:extent>
            </gmd:EX_TemporalExtent>
          </gmd:temporalElement>
        </gmd:EX_Extent>
      </gmd:extent>
    </gmd:MD_DataIdentification>
  </gmd:identificationInfo>
</gmd:MD_Metadata>"##;

const COMPOSED_SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:import namespace="http://www.isotc211.org/2005/gmd" schemaLocation="schema/gmd.xsd"/>
  <xs:import namespace="http://www.isotc211.org/2005/gco" schemaLocation="schema/gco.xsd"/>
  <xs:import namespace="http://www.isotc211.org/2005/gmx" schemaLocation="schema/gmx.xsd"/>
  <xs:import namespace="http://www.opengis.net/gml/3.2" schemaLocation="schema/gml.xsd"/>
</xs:schema>"#;

const GMD_SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    targetNamespace="http://www.isotc211.org/2005/gmd"
    elementFormDefault="qualified">
  <xs:element name="MD_Metadata"/>
  <xs:element name="hierarchyLevel"/>
  <xs:element name="MD_ScopeCode"/>
  <xs:element name="identificationInfo"/>
  <xs:element name="MD_DataIdentification"/>
  <xs:element name="descriptiveKeywords"/>
  <xs:element name="MD_Keywords"/>
  <xs:element name="keyword"/>
  <xs:element name="type"/>
  <xs:element name="MD_KeywordTypeCode"/>
  <xs:element name="thesaurusName"/>
  <xs:element name="CI_Citation"/>
  <xs:element name="title"/>
  <xs:element name="extent"/>
  <xs:element name="EX_Extent"/>
  <xs:element name="temporalElement"/>
  <xs:element name="EX_TemporalExtent"/>
</xs:schema>"#;

const GCO_SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    targetNamespace="http://www.isotc211.org/2005/gco"
    elementFormDefault="qualified">
  <xs:element name="CharacterString"/>
</xs:schema>"#;

const GMX_SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    targetNamespace="http://www.isotc211.org/2005/gmx"
    elementFormDefault="qualified">
  <xs:element name="Anchor"/>
</xs:schema>"#;

const GML_SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    targetNamespace="http://www.opengis.net/gml/3.2"
    elementFormDefault="qualified">
  <xs:element name="TimePeriod"/>
  <xs:element name="beginPosition"/>
  <xs:element name="endPosition"/>
</xs:schema>"#;

const ISO_CODELISTS: &str = r#"<gmx:CT_CodelistCatalogue
    xmlns:gmx="http://www.isotc211.org/2005/gmx"
    xmlns:gml="http://www.opengis.net/gml/3.2">
  <gmx:codelistItem>
    <gmx:CodeListDictionary gml:id="MD_KeywordTypeCode">
      <gmx:codeEntry><gmx:CodeDefinition>
        <gml:identifier>discipline</gml:identifier>
      </gmx:CodeDefinition></gmx:codeEntry>
      <gmx:codeEntry><gmx:CodeDefinition>
        <gml:identifier>theme</gml:identifier>
      </gmx:CodeDefinition></gmx:codeEntry>
    </gmx:CodeListDictionary>
  </gmx:codelistItem>
  <gmx:codelistItem>
    <gmx:CodeListDictionary gml:id="MD_ScopeCode">
      <gmx:codeEntry><gmx:CodeDefinition>
        <gml:identifier>dataset</gml:identifier>
      </gmx:CodeDefinition></gmx:codeEntry>
      <gmx:codeEntry><gmx:CodeDefinition>
        <gml:identifier>series</gml:identifier>
      </gmx:CodeDefinition></gmx:codeEntry>
    </gmx:CodeListDictionary>
  </gmx:codelistItem>
</gmx:CT_CodelistCatalogue>"#;

const WMO_CODELISTS: &str = r#"<gmx:CT_CodelistCatalogue
    xmlns:gmx="http://www.isotc211.org/2005/gmx"
    xmlns:gml="http://www.opengis.net/gml/3.2">
  <gmx:codelistItem>
    <gmx:CodeListDictionary gml:id="WMO_CategoryCode">
      <gmx:codeEntry><gmx:CodeDefinition>
        <gml:identifier>weatherObservations</gml:identifier>
      </gmx:CodeDefinition></gmx:codeEntry>
    </gmx:CodeListDictionary>
  </gmx:codelistItem>
</gmx:CT_CodelistCatalogue>"#;

/// Lay out codelists and the composed schema under a scratch cache root
fn provision_cache() -> (tempfile::TempDir, CacheLayout) {
    let dir = tempfile::tempdir().unwrap();
    let layout = CacheLayout::new(dir.path());

    let profile = layout.profile_dir();
    fs::create_dir_all(profile.join("schema")).unwrap();
    fs::write(layout.profile_schema(), COMPOSED_SCHEMA).unwrap();
    fs::write(profile.join("schema/gmd.xsd"), GMD_SCHEMA).unwrap();
    fs::write(profile.join("schema/gco.xsd"), GCO_SCHEMA).unwrap();
    fs::write(profile.join("schema/gmx.xsd"), GMX_SCHEMA).unwrap();
    fs::write(profile.join("schema/gml.xsd"), GML_SCHEMA).unwrap();

    let iso = layout.iso_codelists();
    fs::create_dir_all(iso.parent().unwrap()).unwrap();
    fs::write(&iso, ISO_CODELISTS).unwrap();
    fs::write(layout.wmo_codelists(), WMO_CODELISTS).unwrap();

    (dir, layout)
}

#[test]
fn test_parse_extract_and_cross_check() {
    let (_dir, layout) = provision_cache();
    let store = CodelistStore::load(&layout).unwrap();

    let record = parse_wcmp(RECORD).unwrap();

    // Keyword group extraction
    let keywords_path = resolve_path(
        "gmd:identificationInfo/gmd:MD_DataIdentification/\
         gmd:descriptiveKeywords/gmd:MD_Keywords",
    )
    .unwrap();
    let groups = record.root().findall(&keywords_path);
    assert_eq!(groups.len(), 1);

    let info = keyword_info(groups[0]);
    assert_eq!(
        string_or_anchor_values_many(&info.keywords),
        vec!["precipitation", "temperature"]
    );
    assert_eq!(info.type_codes, vec!["theme"]);
    assert_eq!(
        string_or_anchor_values_many(&info.thesauruses),
        vec!["WMO Category Codes"]
    );

    // Every decoded keyword type is a permitted ISO code
    for code in &info.type_codes {
        assert!(store.contains(AUTHORITY_ISO, "MD_KeywordTypeCode", code));
    }

    // Scope code comes from the attribute, and is permitted
    let scope_path = resolve_path("gmd:hierarchyLevel/gmd:MD_ScopeCode").unwrap();
    let scopes = record.root().findall(&scope_path);
    let codes = wcmp::codelist_values(&scopes);
    assert_eq!(codes, vec!["dataset"]);
    assert!(store.contains(AUTHORITY_ISO, "MD_ScopeCode", "dataset"));
}

#[test]
fn test_temporal_extent_parsing() {
    let record = parse_wcmp(RECORD).unwrap();
    let now = Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap();

    let begin_path = resolve_path(
        "gmd:identificationInfo/gmd:MD_DataIdentification/gmd:extent/gmd:EX_Extent/\
         gmd:temporalElement/gmd:EX_TemporalExtent/gmd:extent/gml:TimePeriod/gml:beginPosition",
    )
    .unwrap();
    let end_path = begin_path.replace("beginPosition", "endPosition");

    let begin = record.root().find(&begin_path).unwrap();
    assert_eq!(
        parse_time_position_at(begin, now),
        Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
    );

    let end = record.root().find(&end_path).unwrap();
    assert_eq!(parse_time_position_at(end, now), Some(now));
}

#[test]
fn test_schema_validation_of_record() {
    let (_dir, layout) = provision_cache();
    let schema = ProfileSchema::load(&layout).unwrap();

    let record = parse_wcmp(RECORD).unwrap();
    schema.validate(&record).unwrap();
    assert!(schema.is_valid(&record));

    // A record with an element the profile never declared fails
    let broken = RECORD.replace("<gmd:keyword>", "<gmd:keyword><gmd:madeUp/>");
    let record = parse_wcmp(&broken).unwrap();
    assert!(matches!(
        schema.validate(&record),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_rejects_non_wcmp_inputs() {
    assert!(matches!(
        parse_wcmp("<dataset><title>t</title></dataset>"),
        Err(Error::NotRecognized(_))
    ));
    assert!(matches!(
        parse_wcmp("name,value\na,1\n"),
        Err(Error::Parse(_))
    ));
}
