//! Fallback heuristic resolver: best-guess shapes from field names alone.
//!
//! Invoked per field, only when the structural pipeline produced `Unknown`
//! for a field of the top-level transform's output. The rules are one
//! explicit ordered list, evaluated top to bottom, first match wins. The
//! relationship-name rules are broad by nature (a plural scalar like
//! `settings` will match), so their reach is tunable through
//! [`HeuristicConfig`] rather than hard-coded.

use resin_common::{Field, Shape};
use serde::{Deserialize, Serialize};

const DATE_DESCRIPTION: &str = "date-time string";

/// Tunable thresholds for the name-based relationship heuristics.
///
/// The defaults encode the standard rules; callers with domains full of
/// plural scalars can narrow or disable the relationship guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Treat pluralized names (`tags`, not `address`) as collections of
    /// related records.
    pub plural_relations: bool,
    /// Treat compound multi-segment names without a boolean prefix
    /// (`featured_article`) as single related records.
    pub compound_relations: bool,
    /// Name suffixes that mark a collection regardless of pluralization.
    pub collection_suffixes: Vec<String>,
    /// Tokens naming entities that conventionally carry a `name` field;
    /// matched against the singularized field name.
    pub titled_tokens: Vec<String>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            plural_relations: true,
            compound_relations: true,
            collection_suffixes: vec!["_list".into(), "_items".into(), "_collection".into()],
            titled_tokens: [
                "category", "group", "type", "role", "user", "author", "owner", "brand",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Best-guess field for a name the structural pipeline could not resolve.
///
/// Pure function of the field name and config; no state survives between
/// invocations.
pub fn fallback_field(name: &str, config: &HeuristicConfig) -> Field {
    // Formatted/display values are presentation strings and frequently null.
    if name.starts_with("formatted_")
        || name.starts_with("display_")
        || name.ends_with("_display")
        || name.ends_with("_formatted")
    {
        return Field::nullable(Shape::string());
    }

    if has_boolean_prefix(name) {
        return Field::new(Shape::boolean());
    }

    if name.contains("date")
        || name.contains("time")
        || name.ends_with("_at")
        || name == "created_at"
        || name == "updated_at"
        || name == "deleted_at"
    {
        return Field::new(Shape::string()).with_description(DATE_DESCRIPTION);
    }

    if name == "id" || name == "uuid" || name == "ulid" || name.ends_with("_id") {
        return Field::new(Shape::string());
    }

    if name.contains("url") || name.contains("path") || name.contains("link") {
        return Field::new(Shape::string());
    }

    if let Some(field) = relationship_guess(name, config) {
        return field;
    }

    Field::nullable(Shape::string())
}

fn has_boolean_prefix(name: &str) -> bool {
    name.starts_with("is_") || name.starts_with("has_") || name.starts_with("can_")
}

/// The "looks like a relationship" heuristic: pluralized, collection
/// suffixed, or compound names produce a generic relationship shape.
fn relationship_guess(name: &str, config: &HeuristicConfig) -> Option<Field> {
    let plural = config.plural_relations && name.ends_with('s') && !name.ends_with("ss");
    let suffixed = config
        .collection_suffixes
        .iter()
        .any(|suffix| name.ends_with(suffix.as_str()));
    let compound =
        config.compound_relations && name.contains('_') && !has_boolean_prefix(name);

    if !(plural || suffixed || compound) {
        return None;
    }

    let inner = related_record_shape(name, config);
    if plural || suffixed {
        Some(Field::new(Shape::array(inner)))
    } else {
        Some(Field::nullable(inner))
    }
}

/// `{id}` plus a `name` field when the singularized name looks like an
/// entity that conventionally has one.
fn related_record_shape(name: &str, config: &HeuristicConfig) -> Shape {
    let singular = match name.strip_suffix("ies") {
        Some(stem) => format!("{stem}y"),
        None => name.strip_suffix('s').unwrap_or(name).to_owned(),
    };
    let titled = config
        .titled_tokens
        .iter()
        .any(|token| singular == *token || singular.ends_with(&format!("_{token}")));

    let mut fields = vec![("id", Field::new(Shape::string()))];
    if titled {
        fields.push(("name", Field::new(Shape::string())));
    }
    Shape::object(fields)
}
