//! Domain layer: entity taxonomy and hierarchy logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod query;
pub mod tree_traits;

pub use aggregate::{aggregate_entity_names, EntityNameAggregate};
pub use arena::{EntityNode, SchemaEntityTree, TreeResult};
pub use builder::SchemaTreeBuilder;
pub use entities::*;
pub use error::DomainError;
pub use hierarchy::{
    default_root_categories, derive_hierarchy, HierarchyReport, MatchPolicy, RootCategory,
    StructuralAnomaly,
};
pub use query::{is_subtype_of, is_supertype_of};
pub use tree_traits::TreeNodeConvert;
