use std::collections::{BTreeMap, HashMap};
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::DomainError;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// One taxonomy entry.
#[derive(Debug, Clone)]
pub struct EntityNode {
    /// Unique within one schema version
    pub name: String,
    pub is_abstract: bool,
    /// Associated enumeration type name, absent for most entities
    pub predefined_type: Option<String>,
    /// Index of the supertype in the arena, None for taxonomy roots
    pub parent: Option<Index>,
    /// Indices of direct subtypes, in insertion order
    pub children: Vec<Index>,
}

impl EntityNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for EntityNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_abstract {
            write!(f, " (abstract)")?;
        }
        if let Some(pdt) = &self.predefined_type {
            write!(f, " [PredefinedType: {}]", pdt)?;
        }
        Ok(())
    }
}

/// Arena-based entity taxonomy for one schema version.
///
/// Nodes live in a generational arena; parent and child links are arena
/// indices, so upward and downward traversal are O(1) without ownership
/// cycles. All name lookups go through `nodes_by_name`.
#[derive(Debug, Default)]
pub struct SchemaEntityTree {
    arena: Arena<EntityNode>,
    nodes_by_name: HashMap<String, Index>,
    /// Insertion order, drives every whole-tree iteration
    order: Vec<Index>,
    predefined_type_enums: BTreeMap<String, String>,
}

impl SchemaEntityTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, wiring it under `parent_name` when given.
    ///
    /// The parent must already be present.
    #[instrument(level = "trace", skip(self))]
    pub fn add_node(
        &mut self,
        name: &str,
        is_abstract: bool,
        predefined_type: Option<&str>,
        parent_name: Option<&str>,
    ) -> TreeResult<Index> {
        if self.nodes_by_name.contains_key(name) {
            return Err(DomainError::DuplicateEntity(name.to_string()));
        }
        let parent = parent_name.map(|p| self.index_of(p)).transpose()?;

        let node = EntityNode {
            name: name.to_string(),
            is_abstract,
            predefined_type: predefined_type.map(str::to_string),
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        }
        self.nodes_by_name.insert(name.to_string(), node_idx);
        self.order.push(node_idx);

        Ok(node_idx)
    }

    /// Stable-sort whole-tree iteration and every child list by `key` of the
    /// entity name.
    pub fn reorder_by_key<K: Ord>(&mut self, mut key: impl FnMut(&str) -> K) {
        let keys: HashMap<Index, K> = self
            .order
            .iter()
            .filter_map(|&idx| self.arena.get(idx).map(|n| (idx, key(&n.name))))
            .collect();
        self.order.sort_by_key(|idx| keys.get(idx));
        for (_, node) in self.arena.iter_mut() {
            node.children.sort_by_key(|idx| keys.get(idx));
        }
    }

    /// Drop every node and registry entry.
    ///
    /// Must run before loading another schema into the same container.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) {
        self.arena.clear();
        self.nodes_by_name.clear();
        self.order.clear();
        self.predefined_type_enums.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes_by_name.contains_key(name)
    }

    pub fn index_of(&self, name: &str) -> TreeResult<Index> {
        self.nodes_by_name
            .get(name)
            .copied()
            .ok_or_else(|| DomainError::EntityNotFound(name.to_string()))
    }

    pub fn get_node(&self, idx: Index) -> Option<&EntityNode> {
        self.arena.get(idx)
    }

    pub fn lookup(&self, name: &str) -> TreeResult<&EntityNode> {
        let idx = self.index_of(name)?;
        self.get_node(idx)
            .ok_or_else(|| DomainError::EntityNotFound(name.to_string()))
    }

    /// Direct subtypes of `name` in insertion order; empty for leaves.
    pub fn get_children(&self, name: &str) -> TreeResult<Vec<&EntityNode>> {
        let node = self.lookup(name)?;
        Ok(node
            .children
            .iter()
            .filter_map(|&child| self.get_node(child))
            .collect())
    }

    pub fn get_parent(&self, name: &str) -> TreeResult<Option<&EntityNode>> {
        let node = self.lookup(name)?;
        Ok(node.parent.and_then(|p| self.get_node(p)))
    }

    /// Nodes without a supertype, in insertion order.
    pub fn roots(&self) -> Vec<Index> {
        self.order
            .iter()
            .copied()
            .filter(|&idx| self.get_node(idx).is_some_and(|n| n.parent.is_none()))
            .collect()
    }

    /// All nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &EntityNode)> + '_ {
        self.order
            .iter()
            .filter_map(move |&idx| self.get_node(idx).map(|node| (idx, node)))
    }

    /// Depth-first pre-order walk over every root's subtree.
    pub fn iter_preorder(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(_, node)| node.name.as_str())
    }

    pub fn register_predefined_type_enum(
        &mut self,
        predefined_type: impl Into<String>,
        enum_name: impl Into<String>,
    ) {
        self.predefined_type_enums
            .insert(predefined_type.into(), enum_name.into());
    }

    /// Canonical enumeration name for a predefined-type name, if registered.
    pub fn predefined_type_enum(&self, predefined_type: &str) -> Option<&str> {
        self.predefined_type_enums
            .get(predefined_type)
            .map(String::as_str)
    }

    pub fn predefined_type_enums(&self) -> &BTreeMap<String, String> {
        &self.predefined_type_enums
    }

    /// Names of all entities without subtypes, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter_preorder()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.name.clone())
            .collect()
    }
}

pub struct PreOrderIterator<'a> {
    tree: &'a SchemaEntityTree,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(tree: &'a SchemaEntityTree) -> Self {
        let mut stack = tree.roots();
        stack.reverse();
        Self { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a EntityNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchemaEntityTree {
        let mut tree = SchemaEntityTree::new();
        tree.add_node("IfcRoot", true, None, None).unwrap();
        tree.add_node("IfcProduct", true, None, Some("IfcRoot"))
            .unwrap();
        tree.add_node("IfcWall", false, Some("IfcWallTypeEnum"), Some("IfcProduct"))
            .unwrap();
        tree.add_node("IfcSlab", false, None, Some("IfcProduct"))
            .unwrap();
        tree
    }

    #[test]
    fn add_node_links_parent_and_child() {
        let tree = sample();
        let product = tree.lookup("IfcProduct").unwrap();
        let wall_idx = tree.index_of("IfcWall").unwrap();
        assert!(product.children.contains(&wall_idx));
        assert_eq!(
            tree.get_parent("IfcWall").unwrap().map(|p| p.name.as_str()),
            Some("IfcProduct")
        );
    }

    #[test]
    fn children_keep_insertion_order() {
        let tree = sample();
        let names: Vec<_> = tree
            .get_children("IfcProduct")
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(names, vec!["IfcWall", "IfcSlab"]);
    }

    #[test]
    fn leaf_has_empty_children() {
        let tree = sample();
        assert!(tree.get_children("IfcSlab").unwrap().is_empty());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut tree = sample();
        let err = tree.add_node("IfcWall", false, None, None).unwrap_err();
        assert_eq!(err, DomainError::DuplicateEntity("IfcWall".into()));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn unknown_parent_is_not_found() {
        let mut tree = SchemaEntityTree::new();
        let err = tree
            .add_node("IfcWall", false, None, Some("IfcElement"))
            .unwrap_err();
        assert_eq!(err, DomainError::EntityNotFound("IfcElement".into()));
        assert!(tree.is_empty());
    }

    #[test]
    fn lookup_of_missing_name_fails() {
        let tree = sample();
        assert!(matches!(
            tree.lookup("IfcBeam"),
            Err(DomainError::EntityNotFound(_))
        ));
        assert!(tree.get_children("IfcBeam").is_err());
        assert!(tree.get_parent("IfcBeam").is_err());
    }

    #[test]
    fn reset_clears_nodes_and_registry() {
        let mut tree = sample();
        tree.register_predefined_type_enum("IfcWallTypeEnum", "IfcWallTypeEnum");
        tree.reset();
        assert!(tree.is_empty());
        assert!(!tree.contains("IfcWall"));
        assert!(tree.predefined_type_enums().is_empty());
        assert!(tree.roots().is_empty());
    }

    #[test]
    fn leaves_in_preorder() {
        let tree = sample();
        assert_eq!(tree.leaf_nodes(), vec!["IfcWall", "IfcSlab"]);
    }

    #[test]
    fn reorder_by_key_sorts_iteration_and_children() {
        let mut tree = sample();
        let rank = |name: &str| match name {
            "IfcSlab" => 0,
            "IfcWall" => 1,
            _ => 2,
        };
        tree.reorder_by_key(rank);

        let children: Vec<_> = tree
            .get_children("IfcProduct")
            .unwrap()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(children, vec!["IfcSlab", "IfcWall"]);
        assert_eq!(
            tree.names().collect::<Vec<_>>(),
            vec!["IfcSlab", "IfcWall", "IfcRoot", "IfcProduct"]
        );
    }

    #[test]
    fn preorder_visits_children_left_to_right() {
        let tree = sample();
        let names: Vec<_> = tree.iter_preorder().map(|(_, n)| n.name.clone()).collect();
        assert_eq!(names, vec!["IfcRoot", "IfcProduct", "IfcWall", "IfcSlab"]);
    }
}
