//! Schema knowledge adapter: property, relationship, and enum resolution.
//!
//! Turns names referenced by a transform method into shapes, using the
//! read-only knowledge base. Property resolution runs a fixed precedence
//! chain (declared cast, then persisted-column metadata, then naming
//! conventions, then a permissive default), so an explicit declaration
//! always beats a guess. Names declared as relationship accessors resolve
//! through relationship resolution instead; property precedence has no
//! rule for them.

use indexmap::IndexMap;

use resin_ast::{EntityDescriptor, Multiplicity, SchemaKb};
use resin_common::{Field, Shape, limits};

/// Human-readable note attached to date/time-shaped fields.
pub(crate) const DATE_DESCRIPTION: &str = "date-time string";

/// Resolve a member access on the receiver (`this.prop`).
///
/// Precedence: relationship accessor → declared cast → column metadata →
/// naming convention → nullable string.
pub(crate) fn property_field(kb: &SchemaKb, entity: &EntityDescriptor, name: &str) -> Field {
    if let Some(field) = relation_field(kb, entity, name) {
        return field;
    }

    let schema = kb.entity(&entity.name);
    let column = schema.and_then(|s| s.columns.get(name));

    // (a) declared cast; an enum cast target diverts to enum resolution.
    // An unrecognized cast target falls through to the column metadata.
    if let Some(cast) = schema.and_then(|s| s.casts.get(name)) {
        let base = cast_base(cast);
        if let Some(cases) = kb.enum_cases(base) {
            let mut field = Field::new(Shape::Enum { cases: cases.clone() });
            apply_column_flags(&mut field, column);
            return field;
        }
        if let Some((shape, description)) = cast_shape(base) {
            let mut field = Field::new(shape);
            if let Some(description) = description {
                field = field.with_description(description);
            }
            apply_column_flags(&mut field, column);
            return field;
        }
        tracing::debug!(cast = %cast, property = %name, "unrecognized cast target");
    }

    // (b) persisted-column metadata, propagating nullable/default flags.
    if let Some(column) = column {
        let (shape, description) = column_shape(&column.db_type);
        let mut field = Field::new(shape);
        if let Some(description) = description {
            field = field.with_description(description);
        }
        apply_column_flags(&mut field, Some(column));
        return field;
    }

    // (c) naming conventions.
    if let Some(field) = convention_field(name) {
        return field;
    }

    // (d) a declared-but-otherwise-unknown scalar property defaults to a
    // permissive nullable string. Undeclared names stay unknown so the
    // per-field name heuristics get a say at the public boundary.
    if entity.properties.iter().any(|p| p == name) {
        return Field::nullable(Shape::string());
    }
    Field::unknown()
}

/// Resolve a relationship accessor by name, from the entity descriptor
/// first and the knowledge base second.
///
/// `Single` always yields a nullable `Object`; `Collection` always yields a
/// non-nullable `Array<Object>`. The inner shape is the target entity's
/// minimal projection when the target is resolvable, else `{id}`.
pub(crate) fn relation_field(
    kb: &SchemaKb,
    entity: &EntityDescriptor,
    name: &str,
) -> Option<Field> {
    let (multiplicity, target) = entity
        .relation(name)
        .map(|r| (r.multiplicity, r.target.clone()))
        .or_else(|| {
            kb.entity(&entity.name)?
                .relations
                .get(name)
                .map(|r| (r.multiplicity, r.target.clone()))
        })?;

    let inner = minimal_projection(kb, target.as_deref());
    Some(match multiplicity {
        Multiplicity::Single => Field::nullable(inner),
        Multiplicity::Collection => Field::new(Shape::array(inner)),
    })
}

/// Resolve `.value` read off a property: the backing value of its enum
/// cast when the cast target is a known enum, else a plain string.
/// Nullability is the caller's concern, not the enum's.
pub(crate) fn enum_unwrap_field(kb: &SchemaKb, entity: &EntityDescriptor, name: &str) -> Field {
    if let Some(cast) = kb.entity(&entity.name).and_then(|s| s.casts.get(name)) {
        if let Some(cases) = kb.enum_cases(cast_base(cast)) {
            return Field::new(Shape::Enum { cases: cases.clone() });
        }
    }
    Field::new(Shape::string())
}

/// Strip cast arguments: `decimal:2` → `decimal`.
fn cast_base(cast: &str) -> &str {
    cast.split(':').next().unwrap_or(cast)
}

fn apply_column_flags(field: &mut Field, column: Option<&resin_ast::Column>) {
    if let Some(column) = column {
        field.nullable = column.nullable;
        field.optional = column.default.is_some();
    }
}

/// Fixed mapping from declared cast targets to shapes.
fn cast_shape(base: &str) -> Option<(Shape, Option<&'static str>)> {
    let mapped = match base {
        "int" | "integer" | "real" | "float" | "double" | "decimal" => (Shape::number(), None),
        "string" => (Shape::string(), None),
        "bool" | "boolean" => (Shape::boolean(), None),
        "array" | "json" | "object" | "collection" => (Shape::empty_object(), None),
        "date" | "datetime" | "immutable_date" | "immutable_datetime" | "timestamp" => {
            (Shape::string(), Some(DATE_DESCRIPTION))
        }
        _ => return None,
    };
    Some(mapped)
}

/// Fixed mapping from persisted-column types to shapes.
fn column_shape(db_type: &str) -> (Shape, Option<&'static str>) {
    // MySQL convention: tinyint(1) is a boolean column.
    if db_type.eq_ignore_ascii_case("tinyint(1)") {
        return (Shape::boolean(), None);
    }
    let base = db_type
        .split('(')
        .next()
        .unwrap_or(db_type)
        .trim()
        .to_ascii_lowercase();
    match base.as_str() {
        "bigint" | "int" | "integer" | "smallint" | "tinyint" | "mediumint" | "decimal"
        | "numeric" | "float" | "double" | "real" => (Shape::number(), None),
        "boolean" | "bool" => (Shape::boolean(), None),
        "date" | "datetime" | "time" | "timestamp" | "timestamptz" => {
            (Shape::string(), Some(DATE_DESCRIPTION))
        }
        "json" | "jsonb" => (Shape::empty_object(), None),
        // varchar, char, text, uuid, and anything else stringy.
        _ => (Shape::string(), None),
    }
}

/// Generic naming-convention table: exact names and prefixes/suffixes that
/// reliably signal a shape when neither cast nor column metadata exists.
fn convention_field(name: &str) -> Option<Field> {
    if name == "id" || name == "uuid" || name == "ulid" || name.ends_with("_id") {
        return Some(Field::new(Shape::string()));
    }
    if name.starts_with("is_") || name.starts_with("has_") || name.starts_with("can_") {
        return Some(Field::new(Shape::boolean()));
    }
    if name.ends_with("_at") || name == "created_at" || name == "updated_at" {
        return Some(Field::new(Shape::string()).with_description(DATE_DESCRIPTION));
    }
    if name.contains("url") || name.contains("uri") || name.contains("link") {
        return Some(Field::new(Shape::string()));
    }
    if name.contains("image")
        || name.contains("photo")
        || name.contains("avatar")
        || name.contains("icon")
        || name.contains("thumbnail")
    {
        return Some(Field::nullable(Shape::string()));
    }
    None
}

/// The target entity's identifier plus a few leading non-relational scalar
/// columns; `{id}` when the target is unknown to the knowledge base.
fn minimal_projection(kb: &SchemaKb, target: Option<&str>) -> Shape {
    let generic = || Shape::object([("id", Field::new(Shape::string()))]);

    let Some(schema) = target.and_then(|t| kb.entity(t)) else {
        return generic();
    };

    let mut fields: IndexMap<String, Field> = IndexMap::new();
    let id_field = schema
        .columns
        .get("id")
        .map(|column| {
            let (shape, _) = column_shape(&column.db_type);
            Field::new(shape)
        })
        .unwrap_or_else(|| Field::new(Shape::string()));
    fields.insert("id".to_owned(), id_field);

    for (name, column) in &schema.columns {
        if fields.len() > limits::MINIMAL_PROJECTION_FIELDS {
            break;
        }
        if name == "id" || schema.relations.contains_key(name) {
            continue;
        }
        let (shape, description) = column_shape(&column.db_type);
        let mut field = Field::new(shape);
        if let Some(description) = description {
            field = field.with_description(description);
        }
        field.nullable = column.nullable;
        fields.insert(name.clone(), field);
    }

    Shape::Object { fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resin_ast::{Column, EntitySchema};
    use resin_common::EnumShape;

    fn kb_with_post() -> SchemaKb {
        let mut kb = SchemaKb::new();
        kb.add_entity(
            "Post",
            EntitySchema::default()
                .with_column("id", Column::new("bigint"))
                .with_column("title", Column::new("varchar(255)"))
                .with_column("summary", Column::nullable("text"))
                .with_column("views", Column::new("integer").with_default("0"))
                .with_column("price", Column::new("decimal(8,2)"))
                .with_cast("price", "decimal:2")
                .with_cast("status", "PostStatus")
                .with_relation("category", Multiplicity::Single, Some("Category"))
                .with_relation("tags", Multiplicity::Collection, Some("Tag")),
        );
        kb.add_entity(
            "Category",
            EntitySchema::default()
                .with_column("id", Column::new("bigint"))
                .with_column("name", Column::new("varchar(120)"))
                .with_column("slug", Column::new("varchar(120)"))
                .with_column("description", Column::nullable("text"))
                .with_column("position", Column::new("integer")),
        );
        kb.add_enum("PostStatus", EnumShape::string(["DRAFT", "LIVE"]));
        kb
    }

    fn post() -> EntityDescriptor {
        EntityDescriptor::new("Post")
    }

    // ===================================================================
    // Property precedence
    // ===================================================================

    #[test]
    fn cast_beats_column_metadata() {
        let kb = kb_with_post();
        let field = property_field(&kb, &post(), "price");
        assert_eq!(field.shape, Shape::number());
    }

    #[test]
    fn enum_cast_diverts_to_enum_resolution() {
        let kb = kb_with_post();
        let field = property_field(&kb, &post(), "status");
        assert_eq!(
            field.shape,
            Shape::Enum { cases: EnumShape::string(["DRAFT", "LIVE"]) }
        );
    }

    #[test]
    fn nullable_column_sets_nullable_not_optional() {
        let kb = kb_with_post();
        let field = property_field(&kb, &post(), "summary");
        assert_eq!(field.shape, Shape::string());
        assert!(field.nullable);
        assert!(!field.optional);
    }

    #[test]
    fn defaulted_column_sets_optional_not_nullable() {
        let kb = kb_with_post();
        let field = property_field(&kb, &post(), "views");
        assert_eq!(field.shape, Shape::number());
        assert!(field.optional);
        assert!(!field.nullable);
    }

    #[test]
    fn convention_applies_without_schema_entry() {
        let kb = kb_with_post();
        assert_eq!(property_field(&kb, &post(), "is_visible").shape, Shape::boolean());
        assert_eq!(
            property_field(&kb, &post(), "published_at")
                .description
                .as_deref(),
            Some(DATE_DESCRIPTION)
        );
        assert_eq!(property_field(&kb, &post(), "share_url").shape, Shape::string());
        assert!(property_field(&kb, &post(), "cover_image").nullable);
    }

    #[test]
    fn declared_property_defaults_to_nullable_string() {
        let kb = kb_with_post();
        let entity = post().with_property("mystery");
        let field = property_field(&kb, &entity, "mystery");
        assert_eq!(field.shape, Shape::string());
        assert!(field.nullable);
    }

    #[test]
    fn undeclared_property_stays_unknown() {
        let kb = kb_with_post();
        assert!(property_field(&kb, &post(), "mystery").shape.is_unknown());
    }

    // ===================================================================
    // Relationships
    // ===================================================================

    #[test]
    fn single_relation_is_nullable_object() {
        let kb = kb_with_post();
        let field = relation_field(&kb, &post(), "category").expect("relation");
        assert!(field.nullable);
        let Shape::Object { fields } = &field.shape else {
            panic!("expected object");
        };
        // Identifier plus up to three scalar columns of the target.
        assert_eq!(fields.len(), 1 + limits::MINIMAL_PROJECTION_FIELDS);
        assert!(fields.contains_key("id"));
        assert!(fields.contains_key("name"));
        assert_eq!(fields["id"].shape, Shape::number());
    }

    #[test]
    fn collection_relation_is_non_nullable_array() {
        let kb = kb_with_post();
        let field = relation_field(&kb, &post(), "tags").expect("relation");
        assert!(!field.nullable);
        let Shape::Array { element } = &field.shape else {
            panic!("expected array");
        };
        // Tag has no KB entry beyond its name, so inner shape degrades to {id}.
        assert_eq!(**element, Shape::object([("id", Field::new(Shape::string()))]));
    }

    #[test]
    fn descriptor_relation_wins_over_kb() {
        let kb = kb_with_post();
        let entity = post().with_relation("category", Multiplicity::Collection, None);
        let field = relation_field(&kb, &entity, "category").expect("relation");
        assert!(matches!(field.shape, Shape::Array { .. }));
    }

    // ===================================================================
    // Enum unwrap
    // ===================================================================

    #[test]
    fn enum_unwrap_resolves_cases() {
        let kb = kb_with_post();
        let field = enum_unwrap_field(&kb, &post(), "status");
        assert_eq!(
            field.shape,
            Shape::Enum { cases: EnumShape::string(["DRAFT", "LIVE"]) }
        );
        assert!(!field.nullable);
    }

    #[test]
    fn enum_unwrap_on_scalar_cast_degrades_to_string() {
        let kb = kb_with_post();
        assert_eq!(enum_unwrap_field(&kb, &post(), "price").shape, Shape::string());
        assert_eq!(enum_unwrap_field(&kb, &post(), "missing").shape, Shape::string());
    }

    // ===================================================================
    // Mapping tables
    // ===================================================================

    #[test]
    fn tinyint_width_one_is_boolean() {
        assert_eq!(column_shape("tinyint(1)").0, Shape::boolean());
        assert_eq!(column_shape("tinyint(4)").0, Shape::number());
    }

    #[test]
    fn date_columns_carry_description() {
        let (shape, description) = column_shape("timestamp");
        assert_eq!(shape, Shape::string());
        assert_eq!(description, Some(DATE_DESCRIPTION));
    }
}
