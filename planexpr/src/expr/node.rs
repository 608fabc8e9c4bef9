//! Expression nodes
//!
//! An [`ExprNode`] is immutable: operator tag, ordered children, payload, type. Nodes are only
//! built by an [`ExpressionManager`](super::manager::ExpressionManager), which guarantees that
//! the type is consistent with the children and that no two live nodes of the same manager are
//! structurally identical.
use std::{
    hash::{Hash, Hasher},
    ops::Deref,
    sync::Arc,
};

use num_bigint::BigInt;
use num_rational::BigRational;
use smallvec::SmallVec;
use strum::EnumIs;

use crate::{
    expr::kind::ExprKind,
    symbol::{Fluent, Object},
    timing::Timing,
    types::Type,
    variable::Variable,
};

/// Inline storage for children; most operators have at most two.
pub type ExprArgs = SmallVec<[Expr; 2]>;

/// Data attached to a node besides its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum Payload {
    None,
    Bool(bool),
    Int(BigInt),
    Real(BigRational),
    Fluent(Fluent),
    Object(Object),
    Variable(Variable),
    /// Variables bound by a quantifier, sorted and without duplicates.
    Variables(Vec<Variable>),
    Timing(Timing),
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::None => write!(f, "<none>"),
            Payload::Bool(b) => write!(f, "{b}"),
            Payload::Int(i) => write!(f, "{i}"),
            Payload::Real(r) => write!(f, "{r}"),
            Payload::Fluent(fl) => write!(f, "{}", fl.name()),
            Payload::Object(o) => write!(f, "{o}"),
            Payload::Variable(v) => write!(f, "{v}"),
            Payload::Variables(vs) => write!(
                f,
                "{}",
                vs.iter()
                    .map(|v| format!("{v:#}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Payload::Timing(t) => write!(f, "{t}"),
        }
    }
}

/// A constant value, as accepted by
/// [`ExpressionManager::constant`](super::manager::ExpressionManager::constant).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Bool(bool),
    Int(BigInt),
    Real(BigRational),
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(BigInt::from(value))
    }
}

impl From<BigInt> for Literal {
    fn from(value: BigInt) -> Self {
        Literal::Int(value)
    }
}

impl From<BigRational> for Literal {
    fn from(value: BigRational) -> Self {
        Literal::Real(value)
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Real(r) => write!(f, "{r}"),
        }
    }
}

/// An interned expression node. Always accessed through an [`Expr`] handle.
pub struct ExprNode {
    pub(crate) id: u64,
    pub(crate) manager: u64,
    pub(crate) kind: ExprKind,
    pub(crate) args: ExprArgs,
    pub(crate) payload: Payload,
    pub(crate) ty: Type,
}

impl ExprNode {
    /// Identifier of this node, unique and increasing within its manager.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ExprKind {
        self.kind
    }

    #[inline]
    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    /// The `i`-th child. Panics when out of range, like slice indexing.
    #[inline]
    pub fn arg(&self, i: usize) -> &Expr {
        &self.args[i]
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    // ---- predicates, all derived from the operator tag ----

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.kind.is_constant()
    }

    #[inline]
    pub fn is_bool_constant(&self) -> bool {
        self.kind.is_bool_constant()
    }

    #[inline]
    pub fn is_int_constant(&self) -> bool {
        self.kind.is_int_constant()
    }

    #[inline]
    pub fn is_real_constant(&self) -> bool {
        self.kind.is_real_constant()
    }

    pub fn is_true(&self) -> bool {
        self.bool_constant_value() == Some(true)
    }

    pub fn is_false(&self) -> bool {
        self.bool_constant_value() == Some(false)
    }

    #[inline]
    pub fn is_fluent_exp(&self) -> bool {
        self.kind.is_fluent_exp()
    }

    #[inline]
    pub fn is_object_exp(&self) -> bool {
        self.kind.is_object_exp()
    }

    #[inline]
    pub fn is_variable_exp(&self) -> bool {
        self.kind.is_variable_exp()
    }

    #[inline]
    pub fn is_timing_exp(&self) -> bool {
        self.kind.is_timing_exp()
    }

    #[inline]
    pub fn is_quantifier(&self) -> bool {
        self.kind.is_quantifier()
    }

    #[inline]
    pub fn is_comparison(&self) -> bool {
        self.kind.is_comparison()
    }

    #[inline]
    pub fn is_arithmetic(&self) -> bool {
        self.kind.is_arithmetic()
    }

    #[inline]
    pub fn is_boolean_connective(&self) -> bool {
        self.kind.is_boolean_connective()
    }

    #[inline]
    pub fn is_and(&self) -> bool {
        self.kind.is_and()
    }

    #[inline]
    pub fn is_or(&self) -> bool {
        self.kind.is_or()
    }

    #[inline]
    pub fn is_not(&self) -> bool {
        self.kind.is_not()
    }

    #[inline]
    pub fn is_implies(&self) -> bool {
        self.kind.is_implies()
    }

    #[inline]
    pub fn is_iff(&self) -> bool {
        self.kind.is_iff()
    }

    #[inline]
    pub fn is_exists(&self) -> bool {
        self.kind.is_exists()
    }

    #[inline]
    pub fn is_forall(&self) -> bool {
        self.kind.is_forall()
    }

    #[inline]
    pub fn is_equals(&self) -> bool {
        self.kind.is_equals()
    }

    #[inline]
    pub fn is_le(&self) -> bool {
        self.kind.is_le()
    }

    #[inline]
    pub fn is_lt(&self) -> bool {
        self.kind.is_lt()
    }

    #[inline]
    pub fn is_plus(&self) -> bool {
        self.kind.is_plus()
    }

    #[inline]
    pub fn is_minus(&self) -> bool {
        self.kind.is_minus()
    }

    #[inline]
    pub fn is_times(&self) -> bool {
        self.kind.is_times()
    }

    #[inline]
    pub fn is_div(&self) -> bool {
        self.kind.is_div()
    }

    // ---- payload accessors ----

    pub fn bool_constant_value(&self) -> Option<bool> {
        match self.payload {
            Payload::Bool(b) if self.kind.is_bool_constant() => Some(b),
            _ => None,
        }
    }

    pub fn int_constant_value(&self) -> Option<&BigInt> {
        match &self.payload {
            Payload::Int(i) if self.kind.is_int_constant() => Some(i),
            _ => None,
        }
    }

    pub fn real_constant_value(&self) -> Option<&BigRational> {
        match &self.payload {
            Payload::Real(r) if self.kind.is_real_constant() => Some(r),
            _ => None,
        }
    }

    /// Value of an integer or real constant as a rational.
    pub fn numeric_constant_value(&self) -> Option<BigRational> {
        match &self.payload {
            Payload::Int(i) if self.kind.is_int_constant() => {
                Some(BigRational::from_integer(i.clone()))
            }
            Payload::Real(r) if self.kind.is_real_constant() => Some(r.clone()),
            _ => None,
        }
    }

    pub fn fluent(&self) -> Option<&Fluent> {
        match &self.payload {
            Payload::Fluent(f) => Some(f),
            _ => None,
        }
    }

    pub fn object(&self) -> Option<&Object> {
        match &self.payload {
            Payload::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn variable(&self) -> Option<&Variable> {
        match &self.payload {
            Payload::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Variables bound by a quantifier; empty for any other node.
    pub fn quantifier_variables(&self) -> &[Variable] {
        match &self.payload {
            Payload::Variables(vs) => vs,
            _ => &[],
        }
    }

    pub fn timing(&self) -> Option<&Timing> {
        match &self.payload {
            Payload::Timing(t) => Some(t),
            _ => None,
        }
    }

    /// Body of a quantifier.
    pub fn quantifier_body(&self) -> Option<&Expr> {
        if self.kind.is_quantifier() {
            self.args.first()
        } else {
            None
        }
    }
}

// Children are released from a worklist: dropping the last handle to a deep chain must not
// recurse once per level.
impl Drop for ExprNode {
    fn drop(&mut self) {
        let mut pending: Vec<Expr> = self.args.drain(..).collect();
        while let Some(child) = pending.pop() {
            if let Some(mut node) = Arc::into_inner(child.0) {
                pending.extend(node.args.drain(..));
            }
        }
    }
}

/// Shared handle to an interned [`ExprNode`].
///
/// Equality semantics
/// - Two handles are equal iff they point to the same node. Because the manager hash-conses
///   every construction, this coincides with structural equality for nodes of one manager.
/// - Hashing and ordering use the node id, so sorting a list of expressions is deterministic
///   for a given construction order.
#[derive(Clone)]
pub struct Expr(pub(crate) Arc<ExprNode>);

impl Deref for Expr {
    type Target = ExprNode;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<ExprNode> for Expr {
    fn as_ref(&self) -> &ExprNode {
        &self.0
    }
}

impl PartialEq for Expr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.manager.hash(state);
        self.0.id.hash(state);
    }
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.0.manager, self.0.id).cmp(&(other.0.manager, other.0.id))
    }
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Expr#{}({})", self.0.id, self)
    }
}
