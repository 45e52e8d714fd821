//! Entity name union across schema versions

use std::collections::BTreeSet;

use crate::domain::arena::SchemaEntityTree;

/// Deduplicated entity names ordered by exact (case-sensitive, byte-wise)
/// string comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityNameAggregate {
    names: BTreeSet<String>,
}

impl EntityNameAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb every entity name of `tree`; the tree is only read.
    pub fn add_tree(&mut self, tree: &SchemaEntityTree) {
        self.names.extend(tree.names().map(str::to_string));
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn into_names(self) -> BTreeSet<String> {
        self.names
    }
}

pub fn aggregate_entity_names<'a, I>(trees: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a SchemaEntityTree>,
{
    let mut aggregate = EntityNameAggregate::new();
    for tree in trees {
        aggregate.add_tree(tree);
    }
    aggregate.into_names()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(names: &[&str]) -> SchemaEntityTree {
        let mut tree = SchemaEntityTree::new();
        for name in names {
            tree.add_node(name, false, None, None).unwrap();
        }
        tree
    }

    #[test]
    fn shared_entity_is_listed_once() {
        let a = tree_of(&["IfcWall", "IfcWallStandardCase"]);
        let b = tree_of(&["IfcWall", "IfcChimney"]);

        let names: Vec<_> = aggregate_entity_names([&a, &b]).into_iter().collect();

        assert_eq!(names, vec!["IfcChimney", "IfcWall", "IfcWallStandardCase"]);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn ordering_is_case_sensitive() {
        let tree = tree_of(&["ifcLower", "IfcUpper"]);
        let names: Vec<_> = aggregate_entity_names([&tree]).into_iter().collect();
        assert_eq!(names, vec!["IfcUpper", "ifcLower"]);
    }

    #[test]
    fn no_trees_yield_empty_set() {
        assert!(aggregate_entity_names(std::iter::empty::<&SchemaEntityTree>()).is_empty());
    }
}
