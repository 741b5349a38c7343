//! Expression and statement ASTs for transform-method bodies.
//!
//! The node set is a closed tagged enum: every shape the classifier
//! dispatches on is an explicit variant, so a new node kind is a
//! compile-time-checked match arm rather than a runtime type test. The
//! scanner collaborator produces these nodes; the engine only reads them.

use serde::{Deserialize, Serialize};

/// An expression inside a transform-method body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Expr {
    /// String literal.
    Str { value: String },
    /// Integer literal.
    Int { value: i64 },
    /// Float literal.
    Float { value: f64 },
    /// Boolean literal.
    Bool { value: bool },
    /// Null literal.
    Null,
    /// Keyed map literal. Entries without an explicit key are allowed in
    /// the source and carry `key: None`.
    Map { entries: Vec<MapEntry> },
    /// Reference to a local variable.
    Var { name: String },
    /// Member access on the receiver (`this.prop`).
    Prop { name: String },
    /// Invocation on the receiver (`this.method(...)`).
    Call(MethodCall),
    /// A member/call chain hung off a property or variable
    /// (`this.prop.sub()`, `raw.value`).
    Chain(Chain),
    /// Conditional expression.
    Ternary {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Null-coalescing: `value ?? fallback`.
    Coalesce { value: Box<Expr>, fallback: Box<Expr> },
    /// Explicit cast.
    Cast { target: CastTarget, value: Box<Expr> },
    /// Free-function invocation.
    FnCall { name: String, args: Vec<Expr> },
    /// Inline closure literal; the body is a statement list like any
    /// transform method.
    Closure { body: Vec<Stmt> },
}

impl Expr {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str { value: value.into() }
    }

    pub fn int(value: i64) -> Self {
        Self::Int { value }
    }

    pub fn float(value: f64) -> Self {
        Self::Float { value }
    }

    pub fn bool(value: bool) -> Self {
        Self::Bool { value }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::Var { name: name.into() }
    }

    pub fn prop(name: impl Into<String>) -> Self {
        Self::Prop { name: name.into() }
    }

    pub fn call(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::Call(MethodCall { name: name.into(), args: args.into_iter().collect() })
    }

    /// A keyed map literal from `(key, value)` pairs.
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Expr)>,
        K: Into<String>,
    {
        Self::Map {
            entries: entries
                .into_iter()
                .map(|(k, v)| MapEntry { key: Some(k.into()), value: v })
                .collect(),
        }
    }

    pub fn fn_call(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::FnCall { name: name.into(), args: args.into_iter().collect() }
    }

    pub fn coalesce(value: Expr, fallback: Expr) -> Self {
        Self::Coalesce { value: Box::new(value), fallback: Box::new(fallback) }
    }

    pub fn ternary(cond: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Self::Ternary {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    pub fn cast(target: CastTarget, value: Expr) -> Self {
        Self::Cast { target, value: Box::new(value) }
    }
}

/// One entry of a keyed map literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: Option<String>,
    pub value: Expr,
}

/// An invocation on the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub name: String,
    pub args: Vec<Expr>,
}

/// A member/call chain: a base (property or variable) plus ordered links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub base: ChainBase,
    pub links: Vec<Link>,
}

impl Chain {
    /// `this.prop.member` with a single member link.
    pub fn prop_member(prop: impl Into<String>, member: impl Into<String>) -> Expr {
        Expr::Chain(Chain {
            base: ChainBase::Prop { name: prop.into() },
            links: vec![Link::Member { name: member.into() }],
        })
    }

    /// `this.prop.name(args...)` with a single call link.
    pub fn prop_call(
        prop: impl Into<String>,
        name: impl Into<String>,
        args: impl IntoIterator<Item = Expr>,
    ) -> Expr {
        Expr::Chain(Chain {
            base: ChainBase::Prop { name: prop.into() },
            links: vec![Link::Call { name: name.into(), args: args.into_iter().collect() }],
        })
    }

    /// `var.member` with a single member link.
    pub fn var_member(var: impl Into<String>, member: impl Into<String>) -> Expr {
        Expr::Chain(Chain {
            base: ChainBase::Var { name: var.into() },
            links: vec![Link::Member { name: member.into() }],
        })
    }
}

/// What a chain hangs off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "base", rename_all = "snake_case")]
pub enum ChainBase {
    Prop { name: String },
    Var { name: String },
}

/// One link of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "link", rename_all = "snake_case")]
pub enum Link {
    Member { name: String },
    Call { name: String, args: Vec<Expr> },
}

impl Link {
    pub fn name(&self) -> &str {
        match self {
            Self::Member { name } | Self::Call { name, .. } => name,
        }
    }
}

/// Explicit cast targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastTarget {
    Int,
    Float,
    String,
    Bool,
    Array,
    Object,
}

/// A statement inside a transform-method body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    /// Assignment to a local variable.
    Assign { name: String, value: Expr },
    /// Return, possibly bare.
    Return { value: Option<Expr> },
    /// Conditional with optional else branch.
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        #[serde(default)]
        else_branch: Vec<Stmt>,
    },
    /// Expression evaluated for effect.
    Expr { value: Expr },
}

impl Stmt {
    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Self::Assign { name: name.into(), value }
    }

    pub fn ret(value: Expr) -> Self {
        Self::Return { value: Some(value) }
    }
}
