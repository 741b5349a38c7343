//! Entity descriptors: structural metadata about a domain class.
//!
//! An [`EntityDescriptor`] carries everything the engine may ask about the
//! class that owns a transform method: its declared scalar properties, its
//! relationship accessors, its own methods, and the ordered list of
//! composed method sources (trait-like mixins). Method lookup searches the
//! class's own methods first, then each source in declaration order;
//! first match wins.

use serde::{Deserialize, Serialize};

use crate::expr::Stmt;

/// How many related records a relationship accessor yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    Single,
    Collection,
}

/// A declared relationship accessor on an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationAccessor {
    pub name: String,
    pub multiplicity: Multiplicity,
    /// Name of the related entity, when statically known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// A declared method with its parsed body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub body: Vec<Stmt>,
}

impl Method {
    pub fn new(name: impl Into<String>, body: Vec<Stmt>) -> Self {
        Self { name: name.into(), body }
    }
}

/// A composed trait-like method source, searched after the entity's own
/// methods in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSource {
    pub name: String,
    pub methods: Vec<Method>,
}

/// Structural metadata about a domain class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Class identity; also the key into the schema knowledge base.
    pub name: String,
    /// Declared scalar properties.
    #[serde(default)]
    pub properties: Vec<String>,
    /// Declared relationship accessors.
    #[serde(default)]
    pub relations: Vec<RelationAccessor>,
    /// The entity's own methods.
    #[serde(default)]
    pub methods: Vec<Method>,
    /// Composed method sources, in declaration order.
    #[serde(default)]
    pub sources: Vec<MethodSource>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            relations: Vec::new(),
            methods: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(name.into());
        self
    }

    pub fn with_relation(
        mut self,
        name: impl Into<String>,
        multiplicity: Multiplicity,
        target: Option<&str>,
    ) -> Self {
        self.relations.push(RelationAccessor {
            name: name.into(),
            multiplicity,
            target: target.map(str::to_owned),
        });
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_source(mut self, source: MethodSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Find a method by name: own methods first, then each composed source
    /// in declaration order. First match wins.
    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .or_else(|| {
                self.sources
                    .iter()
                    .find_map(|source| source.methods.iter().find(|m| m.name == name))
            })
    }

    /// Look up a declared relationship accessor.
    pub fn relation(&self, name: &str) -> Option<&RelationAccessor> {
        self.relations.iter().find(|r| r.name == name)
    }
}
