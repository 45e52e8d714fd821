//! Tests for SchemaService: loading ifcXML schema files into entity trees

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use ifc_schema_tree::application::services::SchemaService;
use ifc_schema_tree::application::ApplicationError;
use ifc_schema_tree::config::Settings;
use ifc_schema_tree::domain::{DomainError, SchemaEntityTree};
use ifc_schema_tree::infrastructure::traits::RealFileSystem;
use ifc_schema_tree::infrastructure::XsdSchemaParser;

/// `(name, supertype, abstract)` triples as ifcXML complexTypes
fn xsd(types: &[(&str, &str, bool)]) -> String {
    let mut body = String::new();
    for (name, base, is_abstract) in types {
        body.push_str(&format!(
            r#"  <xs:complexType name="{name}" abstract="{is_abstract}">
    <xs:complexContent>
      <xs:extension base="ifc:{base}"/>
    </xs:complexContent>
  </xs:complexType>
"#
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:ifc="urn:ifc">
{body}</xs:schema>
"#
    )
}

fn create_schema_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write schema file");
    path
}

fn service() -> SchemaService {
    SchemaService::new(Arc::new(RealFileSystem), Arc::new(XsdSchemaParser))
}

#[test]
fn given_schema_file_when_loading_then_tree_and_version_are_returned() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = create_schema_file(
        &temp,
        "IFC4.xsd",
        &xsd(&[
            ("IfcRoot", "Entity", true),
            ("IfcProduct", "IfcRoot", true),
            ("IfcWall", "IfcProduct", false),
        ]),
    );

    // Act
    let loaded = service().load(&path).unwrap();

    // Assert
    assert_eq!(loaded.version, "IFC4");
    assert_eq!(loaded.path, path);
    assert_eq!(loaded.tree.len(), 3);
    assert_eq!(loaded.tree.ancestors("IfcWall").unwrap(), vec!["IfcProduct", "IfcRoot"]);
    assert!(loaded.tree.lookup("IfcProduct").unwrap().is_abstract);
}

#[test]
fn given_two_schemas_when_loading_into_same_tree_then_only_second_remains() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let first = create_schema_file(
        &temp,
        "IFC2X3.xsd",
        &xsd(&[("IfcRoot", "Entity", true), ("IfcWallStandardCase", "IfcRoot", false)]),
    );
    let second = create_schema_file(
        &temp,
        "IFC4.xsd",
        &xsd(&[("IfcRoot", "Entity", true), ("IfcChimney", "IfcRoot", false)]),
    );
    let service = service();
    let mut tree = SchemaEntityTree::new();

    // Act
    service.load_into(&mut tree, &first).unwrap();
    let version = service.load_into(&mut tree, &second).unwrap();

    // Assert
    assert_eq!(version, "IFC4");
    let names: Vec<_> = tree.names().collect();
    assert_eq!(names, vec!["IfcRoot", "IfcChimney"]);
    assert!(!tree.contains("IfcWallStandardCase"));
}

#[test]
fn given_missing_file_when_loading_then_schema_not_found() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("IFC4.xsd");

    let err = service().load(&missing).unwrap_err();

    assert!(matches!(err, ApplicationError::SchemaNotFound(p) if p == missing));
}

#[test]
fn given_failed_load_when_tree_was_populated_then_tree_is_left_empty() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let good = create_schema_file(&temp, "IFC4.xsd", &xsd(&[("IfcRoot", "Entity", true)]));
    let service = service();
    let mut tree = SchemaEntityTree::new();
    service.load_into(&mut tree, &good).unwrap();

    // Act
    let result = service.load_into(&mut tree, &temp.path().join("missing.xsd"));

    // Assert
    assert!(result.is_err());
    assert!(tree.is_empty());
}

#[test]
fn given_malformed_xml_when_loading_then_parse_error_names_file() {
    let temp = TempDir::new().unwrap();
    let path = create_schema_file(&temp, "IFC4.xsd", "<xs:schema><xs:complexType name=\"A\"></xs:schema>");

    let err = service().load(&path).unwrap_err();

    match err {
        ApplicationError::SchemaParse { path: p, message } => {
            assert_eq!(p, path);
            assert!(message.starts_with("invalid schema XML"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn given_supertype_cycle_when_loading_then_cycle_detected() {
    let temp = TempDir::new().unwrap();
    let path = create_schema_file(
        &temp,
        "IFC4.xsd",
        &xsd(&[("IfcA", "IfcB", false), ("IfcB", "IfcA", false)]),
    );

    let err = service().load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(DomainError::CycleDetected(_))));
}

#[test]
fn given_duplicate_entity_when_loading_then_duplicate_error() {
    let temp = TempDir::new().unwrap();
    let path = create_schema_file(
        &temp,
        "IFC4.xsd",
        &xsd(&[("IfcRoot", "Entity", true), ("IfcRoot", "Entity", true)]),
    );

    let err = service().load(&path).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::DuplicateEntity(name)) if name == "IfcRoot"
    ));
}

#[test]
fn given_schema_folder_when_listing_then_only_matching_files_sorted() {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_schema_file(&temp, "IFC4.xsd", "");
    create_schema_file(&temp, "IFC2X3.xsd", "");
    create_schema_file(&temp, "ifc4x3.XSD", "");
    create_schema_file(&temp, "readme.txt", "");
    std::fs::create_dir(temp.path().join("IFC_nested.xsd")).unwrap();
    let pattern = Settings::default().schema_regex().unwrap();

    // Act
    let schemas = service().list_schemas(temp.path(), &pattern).unwrap();

    // Assert
    let names: Vec<_> = schemas
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["IFC2X3.xsd", "IFC4.xsd", "ifc4x3.XSD"]);
}

#[test]
fn given_missing_folder_when_listing_then_schema_not_found() {
    let temp = TempDir::new().unwrap();
    let pattern = Settings::default().schema_regex().unwrap();

    let result = service().list_schemas(&temp.path().join("nope"), &pattern);

    assert!(matches!(result, Err(ApplicationError::SchemaNotFound(_))));
}
