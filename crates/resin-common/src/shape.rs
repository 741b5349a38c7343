//! The shape IR: the structural type tree produced by inference.
//!
//! A [`Shape`] describes the runtime structure of a value produced by a
//! transform method: primitives, arrays, keyed objects, unions of
//! alternatives, enum literal sets, or `Unknown` when analysis was
//! inconclusive. A [`Field`] wraps a shape with the two independent
//! presence flags (`nullable`, `optional`) and an optional human-readable
//! description.
//!
//! The IR is immutable once built and serde-serializable so downstream
//! consumers (interface renderers, cross-entity aggregators) can take it
//! as plain data. `Object` fields preserve insertion order; field order is
//! part of the contract.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Null,
}

impl Primitive {
    /// Render-facing name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

/// Backing primitive of an enum literal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumBacking {
    String,
    Number,
}

/// A single literal value an enum case can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Str(String),
    Int(i64),
}

/// An enum literal set: the backing kind plus every case value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumShape {
    pub backing: EnumBacking,
    pub values: Vec<EnumValue>,
}

impl EnumShape {
    pub fn string<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            backing: EnumBacking::String,
            values: values.into_iter().map(|v| EnumValue::Str(v.into())).collect(),
        }
    }

    pub fn number(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            backing: EnumBacking::Number,
            values: values.into_iter().map(EnumValue::Int).collect(),
        }
    }
}

/// The inferred structural shape of a value.
///
/// `Unknown` is a legitimate terminal: it means analysis was inconclusive,
/// not that analysis failed. Consumers apply their own policy to it
/// (typically rendering an untyped field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    /// A primitive value.
    Primitive { primitive: Primitive },
    /// A homogeneous list.
    Array { element: Box<Shape> },
    /// A keyed record; field order is insertion order and is preserved.
    Object { fields: IndexMap<String, Field> },
    /// One of several alternative shapes.
    Union { members: Vec<Shape> },
    /// A closed literal set with a known backing primitive.
    Enum { cases: EnumShape },
    /// Analysis was inconclusive.
    Unknown,
}

impl Shape {
    pub fn string() -> Self {
        Self::Primitive { primitive: Primitive::String }
    }

    pub fn number() -> Self {
        Self::Primitive { primitive: Primitive::Number }
    }

    pub fn boolean() -> Self {
        Self::Primitive { primitive: Primitive::Boolean }
    }

    pub fn null() -> Self {
        Self::Primitive { primitive: Primitive::Null }
    }

    pub fn array(element: Shape) -> Self {
        Self::Array { element: Box::new(element) }
    }

    /// An object with no known fields.
    pub fn empty_object() -> Self {
        Self::Object { fields: IndexMap::new() }
    }

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Field)>,
        K: Into<String>,
    {
        Self::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object { .. })
    }
}

/// A shape plus its presence flags, as it appears in an object field or as
/// the result of classifying one expression.
///
/// `nullable` and `optional` are independent: `nullable` means the value may
/// be `null` even though the field is always present; `optional` means the
/// field may be absent from the record regardless of its nullability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub shape: Shape,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    /// A required, non-nullable field of the given shape.
    pub fn new(shape: Shape) -> Self {
        Self { shape, nullable: false, optional: false, description: None }
    }

    /// A nullable (but present) field of the given shape.
    pub fn nullable(shape: Shape) -> Self {
        Self { nullable: true, ..Self::new(shape) }
    }

    /// An inconclusive field.
    pub fn unknown() -> Self {
        Self::new(Shape::Unknown)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

/// Combine the shapes of a method's return statements into one shape.
///
/// Duplicates collapse in first-seen order: no returns yields `Unknown`,
/// one distinct shape yields that shape, several distinct shapes yield a
/// `Union` over them.
pub fn unify_returns(shapes: impl IntoIterator<Item = Shape>) -> Shape {
    let mut distinct: Vec<Shape> = Vec::new();
    for shape in shapes {
        if !distinct.contains(&shape) {
            distinct.push(shape);
        }
    }
    match distinct.len() {
        0 => Shape::Unknown,
        1 => distinct.pop().unwrap_or(Shape::Unknown),
        _ => Shape::Union { members: distinct },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===================================================================
    // Constructors and queries
    // ===================================================================

    #[test]
    fn primitive_names() {
        assert_eq!(Primitive::String.name(), "string");
        assert_eq!(Primitive::Number.name(), "number");
        assert_eq!(Primitive::Boolean.name(), "boolean");
        assert_eq!(Primitive::Null.name(), "null");
    }

    #[test]
    fn object_preserves_field_order() {
        let shape = Shape::object([
            ("zulu", Field::new(Shape::string())),
            ("alpha", Field::new(Shape::number())),
            ("mike", Field::new(Shape::boolean())),
        ]);
        let Shape::Object { fields } = shape else {
            panic!("expected object");
        };
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zulu", "alpha", "mike"]);
    }

    #[test]
    fn field_flags_are_independent() {
        let nullable = Field::nullable(Shape::string());
        assert!(nullable.nullable);
        assert!(!nullable.optional);

        let optional = Field::new(Shape::string()).with_optional(true);
        assert!(!optional.nullable);
        assert!(optional.optional);
    }

    #[test]
    fn enum_shape_builders() {
        let e = EnumShape::string(["ACTIVE", "INACTIVE"]);
        assert_eq!(e.backing, EnumBacking::String);
        assert_eq!(
            e.values,
            vec![EnumValue::Str("ACTIVE".into()), EnumValue::Str("INACTIVE".into())]
        );

        let n = EnumShape::number([1, 2, 3]);
        assert_eq!(n.backing, EnumBacking::Number);
        assert_eq!(n.values.len(), 3);
    }

    // ===================================================================
    // unify_returns
    // ===================================================================

    #[test]
    fn unify_no_returns_is_unknown() {
        assert_eq!(unify_returns([]), Shape::Unknown);
    }

    #[test]
    fn unify_single_return() {
        assert_eq!(unify_returns([Shape::string()]), Shape::string());
    }

    #[test]
    fn unify_collapses_duplicates() {
        assert_eq!(
            unify_returns([Shape::string(), Shape::string(), Shape::string()]),
            Shape::string()
        );
    }

    #[test]
    fn unify_divergent_returns_union_in_first_seen_order() {
        let unified = unify_returns([Shape::string(), Shape::number(), Shape::string()]);
        assert_eq!(
            unified,
            Shape::Union { members: vec![Shape::string(), Shape::number()] }
        );
    }

    // ===================================================================
    // Serialization
    // ===================================================================

    #[test]
    fn shape_tree_serializes_with_kind_tags_and_field_order() {
        let shape = Shape::object([
            ("id", Field::new(Shape::string())),
            (
                "tags",
                Field::new(Shape::array(Shape::object([(
                    "id",
                    Field::new(Shape::string()),
                )]))),
            ),
            (
                "status",
                Field::nullable(Shape::Enum { cases: EnumShape::string(["ACTIVE"]) })
                    .with_description("enum backing value"),
            ),
        ]);
        let json = serde_json::to_value(&shape).expect("serialize");
        assert_eq!(json["kind"], "object");
        assert_eq!(json["fields"]["id"]["shape"]["kind"], "primitive");
        assert_eq!(json["fields"]["tags"]["shape"]["kind"], "array");
        assert_eq!(json["fields"]["status"]["nullable"], true);
        assert_eq!(json["fields"]["status"]["description"], "enum backing value");

        // preserve_order keeps the declared field order in the rendered JSON
        let keys: Vec<&String> = json["fields"]
            .as_object()
            .expect("fields object")
            .keys()
            .collect();
        assert_eq!(keys, ["id", "tags", "status"]);
    }
}
