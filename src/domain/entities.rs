//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;

/// Relational table that receives object hierarchy records.
pub const HIERARCHY_TABLE: &str = "bimrl_objecthierarchy";

/// One entity declaration as read from a schema file, before tree wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDecl {
    pub name: String,
    pub is_abstract: bool,
    /// Predefined-type name, e.g. `IfcWallTypeEnum`
    pub predefined_type: Option<String>,
    /// Declared supertype; may name something that is not itself an entity
    pub supertype: Option<String>,
}

impl EntityDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            predefined_type: None,
            supertype: None,
        }
    }

    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn with_predefined_type(mut self, predefined_type: impl Into<String>) -> Self {
        self.predefined_type = Some(predefined_type.into());
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}

/// Parser output: entity declarations in document order plus the
/// predefined-type registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSchema {
    pub entities: Vec<EntityDecl>,
    /// Predefined-type name -> canonical enumeration name
    pub predefined_type_enums: BTreeMap<String, String>,
}

/// Error parsing a schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaParseError {
    pub message: String,
}

impl fmt::Display for SchemaParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SchemaParseError {}

/// One derived ancestor/descendant relationship.
///
/// Immutable once created by the hierarchy derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHierarchyRecord {
    schema_version: String,
    descendant_name: String,
    ancestor_name: String,
    is_ancestor_abstract: bool,
    levels_removed: usize,
}

impl ObjectHierarchyRecord {
    pub fn new(
        schema_version: impl Into<String>,
        descendant_name: impl Into<String>,
        ancestor_name: impl Into<String>,
        is_ancestor_abstract: bool,
        levels_removed: usize,
    ) -> Self {
        Self {
            schema_version: schema_version.into(),
            descendant_name: descendant_name.into(),
            ancestor_name: ancestor_name.into(),
            is_ancestor_abstract,
            levels_removed,
        }
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn descendant_name(&self) -> &str {
        &self.descendant_name
    }

    pub fn ancestor_name(&self) -> &str {
        &self.ancestor_name
    }

    pub fn is_ancestor_abstract(&self) -> bool {
        self.is_ancestor_abstract
    }

    pub fn levels_removed(&self) -> usize {
        self.levels_removed
    }

    /// Insert statement for the hierarchy table.
    ///
    /// Columns: (schema_version, element_type, element_subtype, is_abstract,
    /// levels_removed). `element_type` is the ancestor, `element_subtype` the
    /// descendant. String fields are upper-cased, the flag renders as
    /// `True`/`False` and the level is quoted.
    pub fn to_insert_statement(&self) -> String {
        format!(
            "insert into {} values ('{}', '{}', '{}', {}, '{}');",
            HIERARCHY_TABLE,
            self.schema_version.to_uppercase(),
            self.ancestor_name.to_uppercase(),
            self.descendant_name.to_uppercase(),
            if self.is_ancestor_abstract { "True" } else { "False" },
            self.levels_removed
        )
    }
}

impl fmt::Display for ObjectHierarchyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_insert_statement())
    }
}
