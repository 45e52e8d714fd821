use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::SchemaEntityTree;

pub trait TreeNodeConvert {
    /// Render under a synthetic root labelled `label`.
    fn to_tree_string(&self, label: &str) -> Tree<String>;
}

impl TreeNodeConvert for SchemaEntityTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, label: &str) -> Tree<String> {
        fn build_tree(tree: &SchemaEntityTree, node_idx: Index) -> Tree<String> {
            match tree.get_node(node_idx) {
                Some(node) => {
                    let leaves: Vec<_> = node
                        .children
                        .iter()
                        .map(|&child| build_tree(tree, child))
                        .collect();
                    Tree::new(node.to_string()).with_leaves(leaves)
                }
                None => Tree::new(String::new()),
            }
        }

        let leaves: Vec<_> = self
            .roots()
            .into_iter()
            .map(|root| build_tree(self, root))
            .collect();
        Tree::new(label.to_string()).with_leaves(leaves)
    }
}
