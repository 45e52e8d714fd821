//! IFC schema entity taxonomy
//!
//! Reads ifcXML schema files into an arena-backed entity tree, answers
//! subtype queries, derives the object hierarchy relation and exports
//! generated artifacts.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
