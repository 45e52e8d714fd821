//! Subtype/supertype queries over a loaded taxonomy
//!
//! Both queries are strict: an entity is neither its own subtype nor its own
//! supertype. Unknown names are an error, never "no relationship".

use tracing::{instrument, trace};

use crate::domain::arena::{SchemaEntityTree, TreeResult};

impl SchemaEntityTree {
    /// True iff `ancestor` appears on `candidate`'s supertype chain.
    #[instrument(level = "debug", skip(self))]
    pub fn is_subtype_of(&self, candidate: &str, ancestor: &str) -> TreeResult<bool> {
        let candidate_idx = self.index_of(candidate)?;
        let ancestor_idx = self.index_of(ancestor)?;

        let mut current = self.get_node(candidate_idx).and_then(|n| n.parent);
        while let Some(idx) = current {
            if idx == ancestor_idx {
                return Ok(true);
            }
            current = self.get_node(idx).and_then(|n| n.parent);
        }
        trace!("{} is not a subtype of {}", candidate, ancestor);
        Ok(false)
    }

    /// True iff `b` is a subtype of `a`.
    pub fn is_supertype_of(&self, a: &str, b: &str) -> TreeResult<bool> {
        self.is_subtype_of(b, a)
    }

    /// Supertype chain of `name`, nearest first, excluding `name` itself.
    pub fn ancestors(&self, name: &str) -> TreeResult<Vec<&str>> {
        let mut chain = Vec::new();
        let mut current = self.lookup(name)?.parent;
        while let Some(idx) = current {
            match self.get_node(idx) {
                Some(node) => {
                    chain.push(node.name.as_str());
                    current = node.parent;
                }
                None => break,
            }
        }
        Ok(chain)
    }
}

/// Free-function form of [`SchemaEntityTree::is_subtype_of`].
pub fn is_subtype_of(tree: &SchemaEntityTree, a: &str, b: &str) -> TreeResult<bool> {
    tree.is_subtype_of(a, b)
}

/// Free-function form of [`SchemaEntityTree::is_supertype_of`].
pub fn is_supertype_of(tree: &SchemaEntityTree, a: &str, b: &str) -> TreeResult<bool> {
    tree.is_supertype_of(a, b)
}
