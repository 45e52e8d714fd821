//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, SchemaParser)
//! but are themselves concrete structs, not traits.

mod export;
mod process;
mod schema;

pub use export::ExportService;
pub use process::{ExportOptions, ProcessService, ProcessSummary};
pub use schema::{LoadedSchema, SchemaService};
