pub mod catalog;
pub mod disk;
pub mod engine;
pub mod mem;
pub mod schema;

// Re-export main types for convenience
pub use catalog::{CatalogRecord, SchemaCatalog, SchemaObject, SchemaView, StagedSchema};
pub use disk::DiskStore;
pub use engine::SchemaStore;
pub use mem::MemStore;
pub use schema::{ColumnDef, IndexDef, TableConstraint, TableDef};
