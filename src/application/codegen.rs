//! Text templating for generated artifacts
//!
//! Enumeration sources are C# because their consumers are the exporter's
//! C# code base.

use serde::Serialize;

use crate::domain::SchemaEntityTree;

pub const AGGREGATE_ENUM_NAME: &str = "IFCEntityType";
const ENUM_NAMESPACE: &str = "Revit.IFC.Common.Enums";
const USINGS: [&str; 4] = [
    "System",
    "System.Collections.Generic",
    "System.Linq",
    "System.Text",
];

/// Enumeration of all entity names of one schema version.
pub fn render_schema_enum<'a>(
    schema_version: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> String {
    let summary = [format!("IFC entity types of schema {}.", schema_version)];
    render_enum(
        &format!("{}EntityType", schema_version),
        &summary,
        names,
        &[],
    )
}

/// Aggregate enumeration across schema versions, closed by the
/// `Unknown` and `DontExport` members.
pub fn render_aggregate_enum<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let summary = [
        "IFC entity types. Combining IFC2x3 and IFC4 (Add2) entities.".to_string(),
        "List of Entities for IFC2x is found in IFC2xEntityType.cs".to_string(),
        "List of Entities for IFC4 is found in IFC4EntityType.cs".to_string(),
    ];
    render_enum(
        AGGREGATE_ENUM_NAME,
        &summary,
        names,
        &["Unknown", "DontExport"],
    )
}

fn render_enum<'a>(
    enum_name: &str,
    summary: &[String],
    names: impl IntoIterator<Item = &'a str>,
    trailing: &[&str],
) -> String {
    let mut out = String::new();
    for (i, using) in USINGS.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("using {};", using));
    }
    out.push_str(&format!("\n\nnamespace {}\n{{\n\t/// <summary>", ENUM_NAMESPACE));
    for line in summary {
        out.push_str(&format!("\n\t/// {}", line));
    }
    out.push_str(&format!("\n\t/// </summary>\n\tpublic enum {}\n\t{{", enum_name));

    for name in names {
        out.push_str(&format!(
            "\n\t\t/// <summary>\n\t\t/// IFC Entity {} enumeration\n\t\t/// </summary>\n\t\t{},\n",
            name, name
        ));
    }

    for (i, member) in trailing.iter().enumerate() {
        let separator = if i + 1 < trailing.len() { "," } else { "" };
        out.push_str(&format!("\n\t\t{}{}", member, separator));
    }
    out.push_str("\n\t}\n}");
    out
}

#[derive(Debug, Serialize)]
struct EntityCatalog<'a> {
    schema: &'a str,
    entities: Vec<CatalogEntry<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CatalogEntry<'a> {
    entity: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    predefined_type: Option<&'a str>,
}

/// JSON entity list; predefined types are resolved through the tree's
/// enumeration registry and omitted when unregistered.
pub fn render_catalog(
    schema_version: &str,
    tree: &SchemaEntityTree,
) -> Result<String, serde_json::Error> {
    let entities = tree
        .iter()
        .map(|(_, node)| CatalogEntry {
            entity: &node.name,
            predefined_type: node
                .predefined_type
                .as_deref()
                .and_then(|pdt| tree.predefined_type_enum(pdt)),
        })
        .collect();
    serde_json::to_string_pretty(&EntityCatalog {
        schema: schema_version,
        entities,
    })
}
