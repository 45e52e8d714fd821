//! Object hierarchy derivation
//!
//! Walks every subtree below the configured root categories and emits one
//! [`ObjectHierarchyRecord`] per (descendant, ancestor, levels-removed) pair.
//! Only leaves trigger the upward walk; internal nodes show up as ancestors
//! of their leaves. The climb stops at the root category the branch started
//! from.

use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::domain::arena::{SchemaEntityTree, TreeResult};
use crate::domain::entities::ObjectHierarchyRecord;
use crate::domain::error::DomainError;

/// How a root category name is compared with entity names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    Exact,
    Prefix,
    /// Substring match; `IfcProduct` also selects `IfcProductRepresentation`
    #[default]
    Contains,
}

/// One configured root category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCategory {
    pub name: String,
    #[serde(rename = "match", default)]
    pub policy: MatchPolicy,
}

impl RootCategory {
    pub fn new(name: impl Into<String>, policy: MatchPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
        }
    }

    pub fn exact(name: impl Into<String>) -> Self {
        Self::new(name, MatchPolicy::Exact)
    }

    pub fn prefix(name: impl Into<String>) -> Self {
        Self::new(name, MatchPolicy::Prefix)
    }

    pub fn contains(name: impl Into<String>) -> Self {
        Self::new(name, MatchPolicy::Contains)
    }

    pub fn matches(&self, entity_name: &str) -> bool {
        match self.policy {
            MatchPolicy::Exact => entity_name == self.name,
            MatchPolicy::Prefix => entity_name.starts_with(&self.name),
            MatchPolicy::Contains => entity_name.contains(&self.name),
        }
    }
}

/// Product, type-product and group categories with substring matching.
pub fn default_root_categories() -> Vec<RootCategory> {
    vec![
        RootCategory::contains("IfcProduct"),
        RootCategory::contains("IfcTypeProduct"),
        RootCategory::contains("IfcGroup"),
    ]
}

/// A leaf whose supertype chain ended before reaching its root category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralAnomaly {
    pub descendant: String,
    pub boundary: String,
    /// Last entity on the chain (a taxonomy root)
    pub reached: String,
}

impl fmt::Display for StructuralAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: supertype chain ended at {} without reaching {}",
            self.descendant, self.reached, self.boundary
        )
    }
}

/// Derivation result: records in traversal order plus soft warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyReport {
    pub records: Vec<ObjectHierarchyRecord>,
    pub anomalies: Vec<StructuralAnomaly>,
}

/// Derive all object hierarchy records below the matching root categories.
///
/// Root categories are visited in tree insertion order, subtrees depth-first
/// with children in insertion order. An entity reachable from several root
/// categories is reported once per root.
#[instrument(level = "debug", skip(tree, roots), fields(entities = tree.len()))]
pub fn derive_hierarchy(
    tree: &SchemaEntityTree,
    schema_version: &str,
    roots: &[RootCategory],
) -> TreeResult<HierarchyReport> {
    if tree.is_empty() {
        return Err(DomainError::EmptyTree);
    }

    let mut report = HierarchyReport::default();
    for (_, root) in tree.iter() {
        if !roots.iter().any(|r| r.matches(&root.name)) {
            continue;
        }
        debug!("root category: {}", root.name);

        if root.is_leaf() {
            report.records.push(ObjectHierarchyRecord::new(
                schema_version,
                &root.name,
                &root.name,
                root.is_abstract,
                0,
            ));
            continue;
        }
        for &child in &root.children {
            collect_from_descendant(tree, child, schema_version, &root.name, &mut report);
        }
    }

    info!(
        "derived {} hierarchy records for {} ({} anomalies)",
        report.records.len(),
        schema_version,
        report.anomalies.len()
    );
    Ok(report)
}

fn collect_from_descendant(
    tree: &SchemaEntityTree,
    node_idx: Index,
    schema_version: &str,
    boundary: &str,
    report: &mut HierarchyReport,
) {
    let Some(node) = tree.get_node(node_idx) else {
        return;
    };

    if node.is_leaf() {
        report.records.push(ObjectHierarchyRecord::new(
            schema_version,
            &node.name,
            &node.name,
            node.is_abstract,
            0,
        ));

        let mut level = 0;
        let mut reached = node.name.as_str();
        let mut current = node.parent;
        let mut found_boundary = false;
        while let Some(parent) = current.and_then(|idx| tree.get_node(idx)) {
            level += 1;
            report.records.push(ObjectHierarchyRecord::new(
                schema_version,
                &node.name,
                &parent.name,
                parent.is_abstract,
                level,
            ));
            if parent.name == boundary {
                found_boundary = true;
                break;
            }
            reached = parent.name.as_str();
            current = parent.parent;
        }

        if !found_boundary {
            let anomaly = StructuralAnomaly {
                descendant: node.name.clone(),
                boundary: boundary.to_string(),
                reached: reached.to_string(),
            };
            warn!("{}", anomaly);
            report.anomalies.push(anomaly);
        }
    }

    for &child in &node.children {
        collect_from_descendant(tree, child, schema_version, boundary, report);
    }
}
