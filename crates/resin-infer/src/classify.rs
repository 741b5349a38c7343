//! Expression classifier: the recursive evaluator over expression nodes.
//!
//! `classify` is a pure function of the expression, the owning entity, and
//! the variable binding context. It never fails (every unmatched shape
//! resolves to `Unknown`), performs no I/O, and executes no target code.
//! Each node kind is an explicit match arm; adding a node kind is a
//! compile-time-checked change.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

use indexmap::IndexMap;
use resin_ast::{CastTarget, Chain, ChainBase, EntityDescriptor, Expr, Link, MethodCall};
use resin_common::{Field, Shape};

use crate::recursion::RecursionGuard;
use crate::schema::{self, DATE_DESCRIPTION};
use crate::{BindingContext, Inference, MethodKey};

/// Reserved receiver-invocation name for the conditional relationship
/// accessor: yields the relation's value only when it was eagerly loaded,
/// so whatever it produces is forced nullable.
const LOADED_ACCESSOR: &str = "whenLoaded";

/// Free functions that test the runtime type of their argument; the
/// condition half of the canonical enum-unwrap ternary.
static TYPE_TEST_FNS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    ["is_string", "is_int", "is_float", "is_bool", "is_numeric", "is_scalar"]
        .into_iter()
        .collect()
});

/// Free functions that build URL-ish strings.
static STRING_BUILDER_FNS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    ["asset", "secure_asset", "url", "secure_url", "route", "action", "mix"]
        .into_iter()
        .collect()
});

const NUMBER_FNS: &[&str] = &["count", "round", "ceil", "floor"];

/// Chain calls that format a date-like value into a string.
const DATE_FORMAT_OPS: &[&str] = &[
    "format",
    "toDateString",
    "toDateTimeString",
    "toIso8601String",
    "toFormattedDateString",
    "diffForHumans",
];

/// Chain calls that stringify the receiver.
const STRINGIFY_OPS: &[&str] = &["toString", "__toString", "toJson"];

/// Chain calls that coerce the receiver to an array.
const ARRAY_COERCE_OPS: &[&str] = &["toArray"];

/// Chain calls that materialize a query-like builder into a record list.
const MATERIALIZE_OPS: &[&str] = &["get", "all"];

impl Inference<'_> {
    /// Classify one expression into a field (shape plus presence flags).
    pub(crate) fn classify(
        &self,
        expr: &Expr,
        entity: &EntityDescriptor,
        vars: &BindingContext,
        guard: &mut RecursionGuard<MethodKey>,
    ) -> Field {
        match expr {
            Expr::Str { .. } => Field::new(Shape::string()),
            Expr::Int { .. } | Expr::Float { .. } => Field::new(Shape::number()),
            Expr::Bool { .. } => Field::new(Shape::boolean()),
            Expr::Null => Field::new(Shape::null()),

            Expr::Map { entries } => self.classify_map(entries, entity, vars, guard),

            Expr::Var { name } => vars.get(name).cloned().unwrap_or_else(Field::unknown),

            Expr::Prop { name } => schema::property_field(self.kb, entity, name),

            Expr::Call(call) => self.classify_call(call, entity, guard),

            Expr::Chain(chain) => self.classify_chain(chain, entity),

            Expr::Ternary { cond, then_branch, else_branch } => {
                self.classify_ternary(cond, then_branch, else_branch, entity, vars, guard)
            }

            // A replacement value is always substituted for null, so the
            // result cannot be null regardless of the left side.
            Expr::Coalesce { value, .. } => {
                let mut field = self.classify(value, entity, vars, guard);
                field.nullable = false;
                field
            }

            Expr::Cast { target, .. } => cast_field(*target),

            Expr::FnCall { name, .. } => helper_fn_field(name),

            Expr::Closure { .. } => Field::unknown(),
        }
    }

    /// Keyed literal to object. Entries without an explicit key are
    /// skipped, with a note in the log.
    fn classify_map(
        &self,
        entries: &[resin_ast::MapEntry],
        entity: &EntityDescriptor,
        vars: &BindingContext,
        guard: &mut RecursionGuard<MethodKey>,
    ) -> Field {
        let mut fields: IndexMap<String, Field> = IndexMap::new();
        for entry in entries {
            let Some(key) = &entry.key else {
                tracing::debug!(entity = %entity.name, "skipping literal entry without a key");
                continue;
            };
            let field = self.classify(&entry.value, entity, vars, guard);
            fields.insert(key.clone(), field);
        }
        Field::new(Shape::Object { fields })
    }

    fn classify_call(
        &self,
        call: &MethodCall,
        entity: &EntityDescriptor,
        guard: &mut RecursionGuard<MethodKey>,
    ) -> Field {
        if call.name == LOADED_ACCESSOR {
            return self.classify_loaded_accessor(call, entity, guard);
        }
        Field::new(self.resolve_method(&call.name, entity, guard))
    }

    /// The conditional relationship accessor. An inline closure argument is
    /// analyzed like a transform body; otherwise the named relation
    /// resolves through the schema adapter. Either way the result is
    /// forced nullable: the relation may simply not have been loaded.
    fn classify_loaded_accessor(
        &self,
        call: &MethodCall,
        entity: &EntityDescriptor,
        guard: &mut RecursionGuard<MethodKey>,
    ) -> Field {
        let closure = call.args.iter().find_map(|arg| match arg {
            Expr::Closure { body } => Some(body),
            _ => None,
        });
        if let Some(body) = closure {
            let shape = self.infer_body(body, entity, guard);
            return Field::nullable(shape);
        }

        let Some(Expr::Str { value: relation }) = call.args.first() else {
            tracing::trace!(entity = %entity.name, "conditional accessor without a relation name");
            return Field::unknown();
        };
        match schema::relation_field(self.kb, entity, relation) {
            Some(mut field) => {
                field.nullable = true;
                field
            }
            None => Field::unknown(),
        }
    }

    /// Pattern-match a member/call chain hung off a property or variable.
    fn classify_chain(&self, chain: &Chain, entity: &EntityDescriptor) -> Field {
        // `.value` immediately following a property access reads the
        // backing value of an enum cast.
        if let ChainBase::Prop { name } = &chain.base {
            if let [Link::Member { name: member }] = chain.links.as_slice() {
                if member == "value" {
                    return schema::enum_unwrap_field(self.kb, entity, name);
                }
            }
        }

        let Some(last) = chain.links.last() else {
            return Field::unknown();
        };
        match last {
            Link::Call { name, .. } => {
                let name = name.as_str();
                if DATE_FORMAT_OPS.contains(&name) {
                    Field::new(Shape::string()).with_description(DATE_DESCRIPTION)
                } else if STRINGIFY_OPS.contains(&name) {
                    Field::new(Shape::string())
                } else if ARRAY_COERCE_OPS.contains(&name) {
                    Field::new(Shape::array(Shape::Unknown))
                } else if MATERIALIZE_OPS.contains(&name) {
                    Field::new(Shape::array(Shape::empty_object()))
                } else {
                    Field::unknown()
                }
            }
            Link::Member { .. } => Field::unknown(),
        }
    }

    /// Ternaries: the canonical enum-unwrap shape short-circuits to a
    /// string; anything else classifies both branches and unifies.
    fn classify_ternary(
        &self,
        cond: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
        entity: &EntityDescriptor,
        vars: &BindingContext,
        guard: &mut RecursionGuard<MethodKey>,
    ) -> Field {
        if is_enum_unwrap_ternary(cond, else_branch) {
            return Field::new(Shape::string()).with_description("enum backing value");
        }

        let then_field = self.classify(then_branch, entity, vars, guard);
        let else_field = self.classify(else_branch, entity, vars, guard);
        if then_field == else_field {
            then_field
        } else {
            Field::new(Shape::string())
        }
    }
}

/// The canonical "is-scalar ? raw : raw.value" pattern: the condition is a
/// type-test call and the negative branch unwraps a backing value.
fn is_enum_unwrap_ternary(cond: &Expr, else_branch: &Expr) -> bool {
    let cond_is_type_test =
        matches!(cond, Expr::FnCall { name, .. } if TYPE_TEST_FNS.contains(name.as_str()));
    let unwraps_backing = matches!(
        else_branch,
        Expr::Chain(chain)
            if matches!(chain.links.last(), Some(Link::Member { name }) if name == "value")
    );
    cond_is_type_test && unwraps_backing
}

/// Direct mapping for explicit casts.
fn cast_field(target: CastTarget) -> Field {
    Field::new(match target {
        CastTarget::Int | CastTarget::Float => Shape::number(),
        CastTarget::String => Shape::string(),
        CastTarget::Bool => Shape::boolean(),
        CastTarget::Array => Shape::array(Shape::Unknown),
        CastTarget::Object => Shape::empty_object(),
    })
}

/// The closed table of recognized free-function helpers.
fn helper_fn_field(name: &str) -> Field {
    if STRING_BUILDER_FNS.contains(name) || name == "json_encode" {
        return Field::new(Shape::string());
    }
    if NUMBER_FNS.contains(&name) {
        return Field::new(Shape::number());
    }
    if name == "json_decode" {
        return Field::new(Shape::empty_object());
    }
    Field::unknown()
}
