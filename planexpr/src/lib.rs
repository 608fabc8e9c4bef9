//! Planexpr: the expression and type-checking substrate of a planning model.
//!
//! Every condition, effect value and temporal constraint of a planning problem is an
//! [`Expr`](crate::expr::Expr): an immutable, typed node interned by an
//! [`ExpressionManager`](crate::expr::manager::ExpressionManager). The manager hash-conses
//! nodes, so two structurally identical requests return the very same node and equality is a
//! pointer comparison.
//!
//! Layers
//!  - [`types`]: canonical types (`bool`, bounded `integer`/`real`, user-defined hierarchies).
//!  - [`variable`] and [`symbol`]: the named things an expression may refer to.
//!  - [`expr`]: nodes, the manager, canonicalisation, substitution and pretty-printing.
//!  - [`free_vars`]: memoised free-variable analysis respecting quantifier scopes.
//!  - [`walker`] and [`features`]: read-only traversal for solver-side classification.
//!  - [`timing`]: timepoints and intervals used by temporal models.
//!  - [`env`]: the explicit context object tying everything together.
//!
//! Example
//! ```
//! use planexpr::prelude::*;
//!
//! let env = Environment::new();
//! let em = env.expression_manager();
//! let tm = env.type_manager();
//!
//! let location = tm.declare_user_type("Location", None).unwrap();
//! let l1 = em.declare_variable("l1", &location).unwrap();
//! let l2 = em.declare_variable("l2", &location).unwrap();
//!
//! let a = em.variable_exp(&l1).unwrap();
//! let b = em.variable_exp(&l2).unwrap();
//! let neq = em.not(em.equals(a, b).unwrap()).unwrap();
//! let closed = em.forall([l1], neq).unwrap();
//!
//! assert!(closed.ty().is_bool_type());
//! let free = env.free_vars_oracle().free_variables(&closed);
//! assert_eq!(free.len(), 1);
//! assert!(free.contains(&l2));
//! ```

/// Configuration of an [`Environment`](crate::env::Environment).
pub mod config;
/// The explicit context owning managers and oracles.
pub mod env;
/// Error taxonomy shared by every manager.
pub mod error;
/// Expressions: nodes, manager, canonicalisation, substitution and pretty-printing.
pub mod expr;
/// Classification of the operators and types used by an expression.
pub mod features;
/// Free-variable analysis.
pub mod free_vars;
/// Fluent and object declarations referenced by expressions.
pub mod symbol;
/// Timepoints, timings and intervals.
pub mod timing;
/// Canonical types and their compatibility rules.
pub mod types;
mod utils;
/// Named, typed variables.
pub mod variable;
/// Read-only traversal of expression DAGs.
pub mod walker;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::config::EnvironmentConfig;
    pub use crate::env::Environment;
    pub use crate::error::{Error, Result};
    pub use crate::expr::{
        Expr, ExprNode,
        kind::ExprKind,
        manager::ExpressionManager,
        node::{Literal, Payload},
        pretty::PrettyExpr,
    };
    pub use crate::features::{ExprFeatures, classify, classify_all};
    pub use crate::free_vars::{FreeVariables, FreeVarsOracle};
    pub use crate::symbol::{Fluent, Object, Parameter};
    pub use crate::timing::{DurationInterval, Interval, TimeInterval, Timepoint, Timing};
    pub use crate::types::{CompatibilityRules, Type, TypeKind, TypeManager};
    pub use crate::variable::Variable;
    pub use crate::walker::{Walk, subexpressions, walk_dag};
}
