//! Name-heuristic fallback behavior observed through the public entry
//! point: fields whose structural analysis is inconclusive get a
//! best-guess shape from their name alone.

use resin_ast::{EntityDescriptor, Expr, SchemaKb, Stmt};
use resin_common::{Field, Shape};
use resin_infer::{HeuristicConfig, Inference, infer};

/// A transform whose every field value is a call to a method that does not
/// exist; each classifies to `Unknown`, so each lands in the fallback.
fn body_with_fields(names: &[&str]) -> Vec<Stmt> {
    let entries = names
        .iter()
        .map(|name| (*name, Expr::call("definedNowhere", [])));
    vec![Stmt::ret(Expr::map(entries))]
}

fn inferred_fields(names: &[&str]) -> indexmap::IndexMap<String, Field> {
    let kb = SchemaKb::new();
    let entity = EntityDescriptor::new("Thing");
    let Shape::Object { fields } = infer(&body_with_fields(names), &entity, &kb) else {
        panic!("expected object result");
    };
    fields
}

#[test]
fn formatted_names_become_nullable_strings() {
    let fields = inferred_fields(&["formatted_total", "price_display"]);
    for field in fields.values() {
        assert_eq!(field.shape, Shape::string());
        assert!(field.nullable);
    }
}

#[test]
fn boolean_prefixes_become_booleans() {
    let fields = inferred_fields(&["is_admin", "has_avatar", "can_publish"]);
    for field in fields.values() {
        assert_eq!(field.shape, Shape::boolean());
    }
}

#[test]
fn date_names_become_described_strings() {
    let fields = inferred_fields(&["published_at", "expiry_date"]);
    for field in fields.values() {
        assert_eq!(field.shape, Shape::string());
        assert!(field.description.is_some());
    }
}

#[test]
fn identifier_and_url_names_become_strings() {
    let fields = inferred_fields(&["owner_id", "share_url", "storage_path"]);
    for field in fields.values() {
        assert_eq!(field.shape, Shape::string());
        assert!(!field.nullable);
    }
}

#[test]
fn plural_names_become_record_lists() {
    let fields = inferred_fields(&["attachments"]);
    assert_eq!(
        fields["attachments"].shape,
        Shape::array(Shape::object([("id", Field::new(Shape::string()))]))
    );
}

#[test]
fn compound_names_become_nullable_records() {
    let fields = inferred_fields(&["featured_article"]);
    assert!(fields["featured_article"].nullable);
    assert!(fields["featured_article"].shape.is_object());
}

#[test]
fn titled_plural_names_gain_a_name_field() {
    let fields = inferred_fields(&["categories"]);
    let Shape::Array { element } = &fields["categories"].shape else {
        panic!("expected array");
    };
    let Shape::Object { fields: inner } = element.as_ref() else {
        panic!("expected object element");
    };
    assert!(inner.contains_key("id"));
    assert!(inner.contains_key("name"));
}

#[test]
fn unmatched_names_default_to_nullable_strings() {
    let fields = inferred_fields(&["body"]);
    assert_eq!(fields["body"].shape, Shape::string());
    assert!(fields["body"].nullable);
}

#[test]
fn structurally_resolved_fields_are_never_patched() {
    let kb = SchemaKb::new();
    let entity = EntityDescriptor::new("Thing");
    // `tags` resolves structurally to a number here; the pluralization
    // heuristic must not rewrite it.
    let body = vec![Stmt::ret(Expr::map([("tags", Expr::int(3))]))];
    let Shape::Object { fields } = infer(&body, &entity, &kb) else {
        panic!("expected object");
    };
    assert_eq!(fields["tags"].shape, Shape::number());
}

#[test]
fn relationship_guessing_honors_config() {
    let kb = SchemaKb::new();
    let entity = EntityDescriptor::new("Thing");
    let config = HeuristicConfig {
        plural_relations: false,
        compound_relations: false,
        ..Default::default()
    };
    let engine = Inference::with_config(&kb, config);
    let Shape::Object { fields } = engine.infer(&body_with_fields(&["settings"]), &entity)
    else {
        panic!("expected object");
    };
    // With pluralization off, a plural scalar stays a plain string.
    assert_eq!(fields["settings"].shape, Shape::string());
    assert!(fields["settings"].nullable);
}
