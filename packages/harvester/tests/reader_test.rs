//! Reads recorded repository responses end to end.
//!
//! Fixtures are modelled on responses from the DataCite OAI-PMH endpoint.

use std::fs;
use std::path::Path;

use oai_harvester::{
    read_response, Datestamp, ErrorKind, Header, Identify, MetadataFormat, Record, Set, Verb,
};
use pretty_assertions::assert_eq;

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("oai")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Parse passed-through markup on its own and return the root element's
/// local name and namespace.
fn reparse(markup: &str) -> (String, Option<String>) {
    let doc = roxmltree::Document::parse(markup)
        .unwrap_or_else(|e| panic!("Passthrough markup does not parse: {e}\n{markup}"));
    let root = doc.root_element().tag_name();
    (root.name().to_string(), root.namespace().map(String::from))
}

#[test]
fn test_list_records_first_page() {
    let response =
        read_response::<Record>(&load_fixture("list_records_1.xml"), Verb::ListRecords).unwrap();

    assert_eq!(
        response.response_date,
        Datestamp::parse("2017-05-05T14:48:37Z").unwrap()
    );
    assert!(response.errors.is_empty());
    assert_eq!(
        response.resumption_token.as_deref(),
        Some("eyJzZXQiOiJUSUIiLCJwYWdlIjoyfQ")
    );
    assert_eq!(response.items.len(), 2);

    let record = &response.items[0];
    assert_eq!(record.identifier(), "oai:oai.datacite.org:32355");
    assert_eq!(
        record.datestamp(),
        Some(&Datestamp::parse("2011-07-07T11:19:03Z").unwrap())
    );
    assert_eq!(record.sets(), ["TIB", "TIB.DAGST"]);
    assert!(!record.is_deleted());
    assert_eq!(record.response_date(), Some(&response.response_date));

    let metadata = record.metadata.as_deref().unwrap();
    assert!(metadata.starts_with("<oai_dc:dc "));
    assert!(metadata.ends_with("</oai_dc:dc>"));
    assert!(metadata.contains("Schloss Dagstuhl &amp; Leibniz-Zentrum"));
    assert_eq!(
        reparse(metadata),
        (
            "dc".to_string(),
            Some("http://www.openarchives.org/OAI/2.0/oai_dc/".to_string())
        )
    );

    assert_eq!(record.about.len(), 1);
    assert_eq!(reparse(&record.about[0]).0, "provenance");

    let deleted = &response.items[1];
    assert!(deleted.is_deleted());
    assert_eq!(deleted.status(), Some("deleted"));
    assert_eq!(
        deleted.datestamp(),
        Some(&Datestamp::parse("2011-07-08").unwrap())
    );
    assert!(deleted.datestamp().unwrap().is_date());
    assert_eq!(deleted.metadata, None);
    assert!(deleted.about.is_empty());
}

#[test]
fn test_list_records_last_page() {
    let response =
        read_response::<Record>(&load_fixture("list_records_2.xml"), Verb::ListRecords).unwrap();

    // Self-closing token with list size attributes marks the end of the list
    assert_eq!(response.resumption_token, None);
    assert_eq!(response.items.len(), 1);

    let metadata = response.items[0].metadata.as_deref().unwrap();
    assert!(metadata.contains("<![CDATA[Bounds <and> limits]]>"));

    let doc = roxmltree::Document::parse(metadata).unwrap();
    let title = doc
        .descendants()
        .find(|n| n.tag_name().name() == "title")
        .and_then(|n| n.text());
    assert_eq!(title, Some("Bounds <and> limits"));
}

#[test]
fn test_identify() {
    let response = read_response::<Identify>(&load_fixture("identify.xml"), Verb::Identify).unwrap();
    assert_eq!(response.items.len(), 1);

    let identify = &response.items[0];
    assert_eq!(identify.repository_name, "DataCite MDS");
    assert_eq!(identify.base_url, "https://oai.datacite.org/oai");
    assert_eq!(identify.protocol_version, "2.0");
    assert_eq!(
        identify.admin_emails,
        vec!["admin@datacite.org", "support@datacite.org"]
    );
    assert_eq!(
        identify.earliest_datestamp,
        Some(Datestamp::parse("2011-01-01T00:00:00Z").unwrap())
    );
    assert_eq!(identify.deleted_record, "persistent");
    assert_eq!(identify.granularity, "YYYY-MM-DDThh:mm:ssZ");
    assert_eq!(identify.compression, vec!["gzip", "deflate"]);
    assert_eq!(identify.descriptions.len(), 1);
    assert_eq!(reparse(&identify.descriptions[0]).0, "oai-identifier");
}

#[test]
fn test_list_metadata_formats() {
    let response = read_response::<MetadataFormat>(
        &load_fixture("list_metadata_formats.xml"),
        Verb::ListMetadataFormats,
    )
    .unwrap();

    let prefixes: Vec<&str> = response.items.iter().map(|f| f.prefix.as_str()).collect();
    assert_eq!(prefixes, vec!["oai_dc", "oai_datacite"]);
    assert_eq!(
        response.items[1].namespace,
        "http://schema.datacite.org/oai/oai-1.1/"
    );
    assert_eq!(
        response.items[0].schema,
        "http://www.openarchives.org/OAI/2.0/oai_dc.xsd"
    );
}

#[test]
fn test_list_identifiers() {
    let response =
        read_response::<Header>(&load_fixture("list_identifiers.xml"), Verb::ListIdentifiers)
            .unwrap();

    assert_eq!(response.resumption_token, None);
    assert_eq!(response.items.len(), 2);
    assert_eq!(response.items[0].identifier, "oai:oai.datacite.org:32355");
    assert_eq!(response.items[0].sets, vec!["TIB"]);
    assert!(!response.items[0].is_deleted());
    assert!(response.items[1].is_deleted());
    assert!(response.items[1].sets.is_empty());
}

#[test]
fn test_list_sets_with_descriptions() {
    let response = read_response::<Set>(&load_fixture("list_sets_1.xml"), Verb::ListSets).unwrap();

    assert_eq!(response.resumption_token.as_deref(), Some("sets-page-2"));
    assert_eq!(response.items.len(), 2);

    let tib = &response.items[0];
    assert_eq!(tib.spec, "TIB");
    assert_eq!(tib.name, "German National Library of Science and Technology");
    assert_eq!(tib.descriptions.len(), 1);
    assert_eq!(reparse(&tib.descriptions[0]).0, "dc");

    let dagstuhl = &response.items[1];
    assert_eq!(dagstuhl.spec, "TIB.DAGST");
    assert!(dagstuhl.descriptions.is_empty());
}

#[test]
fn test_error_responses() {
    let response = read_response::<Record>(
        &load_fixture("error_bad_resumption_token.xml"),
        Verb::ListRecords,
    )
    .unwrap();
    assert!(response.items.is_empty());
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].kind, ErrorKind::BadResumptionToken);
    assert!(response.errors[0].message.starts_with("The value of the resumptionToken"));

    let err = read_response::<Record>(
        &load_fixture("error_no_records_match.xml"),
        Verb::ListRecords,
    )
    .unwrap()
    .into_items()
    .unwrap_err();
    assert_eq!(err.protocol_kind(), Some(ErrorKind::NoRecordsMatch));
}

#[test]
fn test_reading_with_wrong_verb_yields_nothing() {
    let response = read_response::<Set>(&load_fixture("list_records_1.xml"), Verb::ListSets).unwrap();
    assert!(response.items.is_empty());
    assert_eq!(response.resumption_token, None);
}
