//! Tree builder wiring parsed entity declarations into a taxonomy.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::arena::{SchemaEntityTree, TreeResult};
use crate::domain::entities::{EntityDecl, ParsedSchema};
use crate::domain::error::DomainError;

/// Constructs a [`SchemaEntityTree`] from parser output.
///
/// Supertypes are inserted into the arena before their subtypes. Once every
/// declaration is in, iteration and child order are put back into document
/// order.
pub struct SchemaTreeBuilder {
    declarations: HashMap<String, usize>,
    visiting: HashSet<String>,
}

impl Default for SchemaTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaTreeBuilder {
    pub fn new() -> Self {
        Self {
            declarations: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    pub fn build(&mut self, parsed: &ParsedSchema) -> TreeResult<SchemaEntityTree> {
        let mut tree = SchemaEntityTree::new();
        self.build_into(&mut tree, parsed)?;
        Ok(tree)
    }

    /// Reset `tree`, then fill it from `parsed`.
    ///
    /// On error the tree is left reset, never half-populated with a previous
    /// schema's entities.
    #[instrument(level = "debug", skip_all, fields(entities = parsed.entities.len()))]
    pub fn build_into(&mut self, tree: &mut SchemaEntityTree, parsed: &ParsedSchema) -> TreeResult<()> {
        tree.reset();
        self.declarations.clear();

        for (pos, decl) in parsed.entities.iter().enumerate() {
            if decl.name.is_empty() {
                return Err(DomainError::InvalidSchema {
                    message: format!("entity declaration {} has no name", pos),
                });
            }
            if self.declarations.insert(decl.name.clone(), pos).is_some() {
                return Err(DomainError::DuplicateEntity(decl.name.clone()));
            }
        }

        let result = parsed
            .entities
            .iter()
            .try_for_each(|decl| self.insert_with_supertypes(tree, parsed, decl));
        if let Err(e) = result {
            tree.reset();
            return Err(e);
        }

        let declarations = &self.declarations;
        tree.reorder_by_key(|name| declarations.get(name).copied());

        for (predefined_type, enum_name) in &parsed.predefined_type_enums {
            tree.register_predefined_type_enum(predefined_type, enum_name);
        }
        debug!("built tree with {} entities", tree.len());
        Ok(())
    }

    fn insert_with_supertypes(
        &mut self,
        tree: &mut SchemaEntityTree,
        parsed: &ParsedSchema,
        decl: &EntityDecl,
    ) -> TreeResult<()> {
        // Collect the not-yet-inserted part of the supertype chain
        let mut chain = Vec::new();
        self.visiting.clear();
        let mut current = Some(decl);
        while let Some(d) = current {
            if tree.contains(&d.name) {
                break;
            }
            if !self.visiting.insert(d.name.clone()) {
                return Err(DomainError::CycleDetected(d.name.clone()));
            }
            chain.push(d);
            current = self.declared_supertype(parsed, d);
        }

        for d in chain.into_iter().rev() {
            let parent = self.declared_supertype(parsed, d).map(|p| p.name.as_str());
            if parent.is_none() {
                if let Some(undeclared) = &d.supertype {
                    debug!("{} extends undeclared {}, treating as root", d.name, undeclared);
                }
            }
            tree.add_node(&d.name, d.is_abstract, d.predefined_type.as_deref(), parent)?;
        }
        Ok(())
    }

    fn declared_supertype<'p>(&self, parsed: &'p ParsedSchema, decl: &EntityDecl) -> Option<&'p EntityDecl> {
        decl.supertype
            .as_deref()
            .and_then(|s| self.declarations.get(s))
            .map(|&pos| &parsed.entities[pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(entities: Vec<EntityDecl>) -> ParsedSchema {
        ParsedSchema {
            entities,
            ..Default::default()
        }
    }

    #[test]
    fn subtype_declared_before_supertype_is_wired() {
        let schema = parsed(vec![
            EntityDecl::new("IfcWall").with_supertype("IfcElement"),
            EntityDecl::new("IfcElement").with_supertype("IfcProduct").as_abstract(),
            EntityDecl::new("IfcProduct").with_supertype("Entity").as_abstract(),
        ]);

        let tree = SchemaTreeBuilder::new().build(&schema).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.ancestors("IfcWall").unwrap(), vec!["IfcElement", "IfcProduct"]);
        assert!(tree.get_parent("IfcProduct").unwrap().is_none());
        assert!(tree.lookup("IfcElement").unwrap().is_abstract);
    }

    #[test]
    fn document_order_is_child_order() {
        let schema = parsed(vec![
            EntityDecl::new("IfcRoot"),
            EntityDecl::new("B").with_supertype("IfcRoot"),
            EntityDecl::new("A").with_supertype("IfcRoot"),
        ]);

        let tree = SchemaTreeBuilder::new().build(&schema).unwrap();
        let names: Vec<_> = tree
            .get_children("IfcRoot")
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();

        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn subtype_declared_first_keeps_sibling_document_order() {
        let schema = parsed(vec![
            EntityDecl::new("IfcColumn").with_supertype("IfcElement"),
            EntityDecl::new("IfcProduct").with_supertype("Entity"),
            EntityDecl::new("IfcWall").with_supertype("IfcProduct"),
            EntityDecl::new("IfcElement").with_supertype("IfcProduct").as_abstract(),
        ]);

        let tree = SchemaTreeBuilder::new().build(&schema).unwrap();

        let children: Vec<_> = tree
            .get_children("IfcProduct")
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(children, vec!["IfcWall", "IfcElement"]);
        let names: Vec<_> = tree.names().collect();
        assert_eq!(names, vec!["IfcColumn", "IfcProduct", "IfcWall", "IfcElement"]);
    }

    #[test]
    fn duplicate_declaration_fails() {
        let schema = parsed(vec![EntityDecl::new("IfcWall"), EntityDecl::new("IfcWall")]);
        assert_eq!(
            SchemaTreeBuilder::new().build(&schema).unwrap_err(),
            DomainError::DuplicateEntity("IfcWall".into())
        );
    }

    #[test]
    fn supertype_cycle_fails_and_leaves_tree_empty() {
        let schema = parsed(vec![
            EntityDecl::new("IfcRoot"),
            EntityDecl::new("A").with_supertype("B"),
            EntityDecl::new("B").with_supertype("A"),
        ]);
        let mut tree = SchemaEntityTree::new();

        let err = SchemaTreeBuilder::new().build_into(&mut tree, &schema).unwrap_err();

        assert!(matches!(err, DomainError::CycleDetected(_)));
        assert!(tree.is_empty());
    }

    #[test]
    fn unnamed_declaration_is_invalid() {
        let schema = parsed(vec![EntityDecl::new("IfcRoot"), EntityDecl::new("")]);
        assert!(matches!(
            SchemaTreeBuilder::new().build(&schema).unwrap_err(),
            DomainError::InvalidSchema { .. }
        ));
    }

    #[test]
    fn self_supertype_is_a_cycle() {
        let schema = parsed(vec![EntityDecl::new("A").with_supertype("A")]);
        assert_eq!(
            SchemaTreeBuilder::new().build(&schema).unwrap_err(),
            DomainError::CycleDetected("A".into())
        );
    }

    #[test]
    fn build_into_replaces_previous_schema() {
        let mut builder = SchemaTreeBuilder::new();
        let mut tree = SchemaEntityTree::new();
        builder
            .build_into(&mut tree, &parsed(vec![EntityDecl::new("Ifc2x3Only")]))
            .unwrap();
        builder
            .build_into(&mut tree, &parsed(vec![EntityDecl::new("Ifc4Only")]))
            .unwrap();

        let names: Vec<_> = tree.names().collect();
        assert_eq!(names, vec!["Ifc4Only"]);
    }

    #[test]
    fn registry_is_copied_into_tree() {
        let mut schema = parsed(vec![EntityDecl::new("IfcWall").with_predefined_type("IfcWallTypeEnum")]);
        schema
            .predefined_type_enums
            .insert("IfcWallTypeEnum".into(), "IfcWallTypeEnum".into());

        let tree = SchemaTreeBuilder::new().build(&schema).unwrap();

        assert_eq!(tree.predefined_type_enum("IfcWallTypeEnum"), Some("IfcWallTypeEnum"));
        assert_eq!(
            tree.lookup("IfcWall").unwrap().predefined_type.as_deref(),
            Some("IfcWallTypeEnum")
        );
    }
}
