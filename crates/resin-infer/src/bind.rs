//! Contextual variable binder: the pre-pass over assignment statements.
//!
//! Scans every assignment in a method body, at any nesting depth, and
//! records the classified shape of its right-hand side under the assigned
//! name. Deliberately flow-insensitive: a binding made inside a
//! conditional branch is treated exactly like an unconditional one, and
//! the last write for a name wins. When the classifier later meets a bare
//! variable reference it substitutes the recorded field instead of
//! re-evaluating.

use resin_ast::{EntityDescriptor, Expr, Stmt};

use crate::recursion::RecursionGuard;
use crate::{BindingContext, Inference, MethodKey};

impl Inference<'_> {
    /// Build the variable binding context for one method body.
    pub(crate) fn bind(
        &self,
        body: &[Stmt],
        entity: &EntityDescriptor,
        guard: &mut RecursionGuard<MethodKey>,
    ) -> BindingContext {
        let mut vars = BindingContext::default();
        self.bind_into(body, entity, &mut vars, guard);
        vars
    }

    fn bind_into(
        &self,
        stmts: &[Stmt],
        entity: &EntityDescriptor,
        vars: &mut BindingContext,
        guard: &mut RecursionGuard<MethodKey>,
    ) {
        for stmt in stmts {
            match stmt {
                Stmt::Assign { name, value } => {
                    // Closure values belong to whatever call they are passed
                    // to; a bare closure binding has no data shape.
                    if matches!(value, Expr::Closure { .. }) {
                        tracing::trace!(var = %name, "skipping closure binding");
                        continue;
                    }
                    let field = self.classify(value, entity, vars, guard);
                    vars.insert(name.clone(), field);
                }
                Stmt::If { then_branch, else_branch, .. } => {
                    self.bind_into(then_branch, entity, vars, guard);
                    self.bind_into(else_branch, entity, vars, guard);
                }
                Stmt::Return { .. } | Stmt::Expr { .. } => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resin_ast::SchemaKb;
    use resin_common::Shape;

    fn bind_body(body: &[Stmt]) -> BindingContext {
        let kb = SchemaKb::new();
        let entity = EntityDescriptor::new("Thing");
        let engine = Inference::new(&kb);
        let mut guard = RecursionGuard::for_method_resolution();
        engine.bind(body, &entity, &mut guard)
    }

    #[test]
    fn binds_literal_assignments() {
        let vars = bind_body(&[Stmt::assign("label", Expr::str("hi"))]);
        assert_eq!(vars["label"].shape, Shape::string());
    }

    #[test]
    fn last_write_wins() {
        let vars = bind_body(&[
            Stmt::assign("x", Expr::str("first")),
            Stmt::assign("x", Expr::int(2)),
        ]);
        assert_eq!(vars["x"].shape, Shape::number());
    }

    #[test]
    fn branch_bindings_are_flow_insensitive() {
        let vars = bind_body(&[Stmt::If {
            cond: Expr::bool(true),
            then_branch: vec![Stmt::assign("inner", Expr::bool(false))],
            else_branch: vec![Stmt::assign("other", Expr::int(1))],
        }]);
        // Both branch bindings are visible, unconditionally.
        assert_eq!(vars["inner"].shape, Shape::boolean());
        assert_eq!(vars["other"].shape, Shape::number());
    }

    #[test]
    fn closure_assignments_are_skipped() {
        let vars = bind_body(&[Stmt::assign("cb", Expr::Closure { body: vec![] })]);
        assert!(!vars.contains_key("cb"));
    }

    #[test]
    fn bindings_chain_through_earlier_bindings() {
        let vars = bind_body(&[
            Stmt::assign("a", Expr::int(1)),
            Stmt::assign("b", Expr::var("a")),
        ]);
        assert_eq!(vars["b"].shape, Shape::number());
    }
}
