//! The schema knowledge base: persisted-schema metadata per entity.
//!
//! Built once by the upstream schema analyzer from persistence-schema
//! definitions and entity-class metadata, then treated as read-only for the
//! lifetime of an inference run. One [`EntitySchema`] per entity carries
//! its columns, declared casts, and relationships; a workspace-wide enum
//! registry maps enum type identifiers to their literal case sets.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use resin_common::EnumShape;

use crate::entity::Multiplicity;

/// Persisted-schema metadata for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Database-level type name (`bigint`, `varchar`, `timestamp`, ...).
    pub db_type: String,
    #[serde(default)]
    pub nullable: bool,
    /// Declared default value, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Column {
    pub fn new(db_type: impl Into<String>) -> Self {
        Self { db_type: db_type.into(), nullable: false, default: None }
    }

    pub fn nullable(db_type: impl Into<String>) -> Self {
        Self { nullable: true, ..Self::new(db_type) }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Schema-level relationship metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub multiplicity: Multiplicity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Aggregated schema metadata for one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Column name → column metadata, in declaration order.
    #[serde(default)]
    pub columns: IndexMap<String, Column>,
    /// Property name → declared cast target.
    #[serde(default)]
    pub casts: IndexMap<String, String>,
    /// Relationship name → relation metadata.
    #[serde(default)]
    pub relations: IndexMap<String, Relation>,
}

impl EntitySchema {
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Self {
        self.columns.insert(name.into(), column);
        self
    }

    pub fn with_cast(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.casts.insert(name.into(), target.into());
        self
    }

    pub fn with_relation(
        mut self,
        name: impl Into<String>,
        multiplicity: Multiplicity,
        target: Option<&str>,
    ) -> Self {
        self.relations.insert(
            name.into(),
            Relation { multiplicity, target: target.map(str::to_owned) },
        );
        self
    }
}

/// The full knowledge base handed to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaKb {
    entities: FxHashMap<String, EntitySchema>,
    enums: FxHashMap<String, EnumShape>,
}

impl SchemaKb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, name: impl Into<String>, schema: EntitySchema) -> &mut Self {
        self.entities.insert(name.into(), schema);
        self
    }

    pub fn add_enum(&mut self, name: impl Into<String>, cases: EnumShape) -> &mut Self {
        self.enums.insert(name.into(), cases);
        self
    }

    pub fn entity(&self, name: &str) -> Option<&EntitySchema> {
        self.entities.get(name)
    }

    pub fn enum_cases(&self, name: &str) -> Option<&EnumShape> {
        self.enums.get(name)
    }
}
