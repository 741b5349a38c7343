//! Static shape inference over transform-method ASTs.
//!
//! Given a transform method's statement list and its owning entity
//! descriptor, the engine infers the structural shape of the value the
//! method produces, without executing anything. The walk is a single
//! depth-first pass: bind local variables, find the return statements,
//! classify each return expression (recursing through sibling methods
//! under a cycle guard), unify, and patch any remaining unknown fields
//! with name heuristics.
//!
//! The engine never fails: unrecognized input degrades to
//! [`Shape::Unknown`] or a permissive default, and consumers treat
//! `Unknown` as a legitimate terminal value.
//!
//! Components:
//! - `classify`: recursive expression evaluator
//! - `bind`: flow-insensitive local-variable pre-pass
//! - `resolve`: cross-method resolution with cycle protection
//! - `schema`: knowledge-base adapter (casts, columns, relationships, enums)
//! - `fallback`: name-based heuristics for inconclusive fields
//! - `recursion`: the guard bounding cross-method recursion

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use resin_ast::{EntityDescriptor, Expr, SchemaKb, Stmt};
use resin_common::{Field, Shape, unify_returns};

mod bind;
mod classify;
pub mod fallback;
pub mod recursion;
mod resolve;
mod schema;

pub use fallback::{HeuristicConfig, fallback_field};
pub use recursion::{RecursionGuard, RecursionResult};

/// Local variable bindings for one method body: name → classified field,
/// last write wins.
pub(crate) type BindingContext = FxHashMap<String, Field>;

/// Identity of a method under analysis: `(entity, method)`.
pub(crate) type MethodKey = (String, String);

/// The inference engine.
///
/// Holds the read-only knowledge base, the heuristic configuration, and a
/// method-level result cache. All per-call state (variable bindings, the
/// recursion guard) is created fresh inside [`infer`](Self::infer), so
/// independent calls may run concurrently; the cache tolerates racing
/// recomputation because results are idempotent.
pub struct Inference<'kb> {
    kb: &'kb SchemaKb,
    config: HeuristicConfig,
    cache: DashMap<MethodKey, Shape>,
}

impl<'kb> Inference<'kb> {
    pub fn new(kb: &'kb SchemaKb) -> Self {
        Self::with_config(kb, HeuristicConfig::default())
    }

    pub fn with_config(kb: &'kb SchemaKb, config: HeuristicConfig) -> Self {
        Self { kb, config, cache: DashMap::new() }
    }

    /// Infer the shape of the value produced by a transform method.
    ///
    /// The sole entry point. Never fails; an inconclusive analysis yields
    /// [`Shape::Unknown`] (or unknown leaves patched by name heuristics).
    pub fn infer(&self, body: &[Stmt], entity: &EntityDescriptor) -> Shape {
        let mut guard = RecursionGuard::for_method_resolution();
        let shape = self.infer_body(body, entity, &mut guard);
        self.apply_field_fallback(shape)
    }

    /// Run the structural pipeline on one method body: bind, locate
    /// returns, classify, unify. Shared by the public entry point, nested
    /// method resolution, and inline closure analysis. The fallback
    /// post-pass is *not* applied here, only on the publicly observed
    /// result.
    pub(crate) fn infer_body(
        &self,
        body: &[Stmt],
        entity: &EntityDescriptor,
        guard: &mut RecursionGuard<MethodKey>,
    ) -> Shape {
        let vars = self.bind(body, entity, guard);

        let returns = collect_returns(body);
        let mut shapes: SmallVec<[Shape; 4]> = SmallVec::new();
        for value in returns {
            shapes.push(match value {
                Some(expr) => self.classify(expr, entity, &vars, guard).shape,
                // A bare return yields null at runtime.
                None => Shape::null(),
            });
        }
        unify_returns(shapes)
    }

    /// Patch unknown fields of a top-level object result with name-based
    /// guesses. A wholly unknown result stays unknown; there is no field
    /// name to guess from.
    fn apply_field_fallback(&self, shape: Shape) -> Shape {
        let Shape::Object { mut fields } = shape else {
            return shape;
        };
        for (name, field) in fields.iter_mut() {
            if field.shape.is_unknown() {
                tracing::debug!(field = %name, "structural analysis inconclusive, using name heuristics");
                *field = fallback_field(name, &self.config);
            }
        }
        Shape::Object { fields }
    }
}

/// Convenience wrapper: one-shot inference without holding an engine.
pub fn infer(body: &[Stmt], entity: &EntityDescriptor, kb: &SchemaKb) -> Shape {
    Inference::new(kb).infer(body, entity)
}

/// Collect every return statement's expression (or `None` for a bare
/// return), descending into both branches of conditionals.
fn collect_returns(body: &[Stmt]) -> SmallVec<[Option<&Expr>; 4]> {
    let mut returns = SmallVec::new();
    collect_returns_into(body, &mut returns);
    returns
}

fn collect_returns_into<'b>(stmts: &'b [Stmt], out: &mut SmallVec<[Option<&'b Expr>; 4]>) {
    for stmt in stmts {
        match stmt {
            Stmt::Return { value } => out.push(value.as_ref()),
            Stmt::If { then_branch, else_branch, .. } => {
                collect_returns_into(then_branch, out);
                collect_returns_into(else_branch, out);
            }
            Stmt::Assign { .. } | Stmt::Expr { .. } => {}
        }
    }
}
