//! The analyzed-input model for resin.
//!
//! Everything in this crate is produced by upstream collaborators (the
//! source scanner supplies ASTs, the schema analyzer the knowledge base)
//! and is read-only for the lifetime of an inference run:
//! - Expression and statement ASTs (`Expr`, `Stmt`) as closed tagged enums
//! - Entity descriptors (`EntityDescriptor`): declared properties,
//!   relationship accessors, methods, and composed method sources
//! - The schema knowledge base (`SchemaKb`): columns, casts, relationships,
//!   and enum definitions per entity

// Expression and statement ASTs
pub mod expr;
pub use expr::{CastTarget, Chain, ChainBase, Expr, Link, MapEntry, MethodCall, Stmt};

// Entity descriptors
pub mod entity;
pub use entity::{EntityDescriptor, Method, MethodSource, Multiplicity, RelationAccessor};

// Schema knowledge base
pub mod schema;
pub use schema::{Column, EntitySchema, Relation, SchemaKb};
