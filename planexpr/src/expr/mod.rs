//! Expressions: interned nodes and the manager that builds them.
//!
//! Role
//! - [`node`] defines the immutable [`ExprNode`] and its shared [`Expr`] handle.
//! - [`kind`] is the closed set of operators.
//! - [`manager`] is the only way to build nodes: it type-checks, canonicalises and hash-conses.
//! - [`substitute`] rewrites free variables through the same construction path.
//! - [`pretty`] renders expressions, with colors on terminals.
//!
//! Performance
//! - Construction is proportional to the number of children (plus sorting for commutative
//!   operators); a repeated construction is a hash probe.
//! - Equality between two handles is a pointer comparison.
//!
//! Example
//! ```
//! use planexpr::prelude::*;
//!
//! let em = ExpressionManager::new();
//! let p = em.declare_fluent("p", &em.types().bool_type(), vec![]).unwrap();
//! let q = em.declare_fluent("q", &em.types().bool_type(), vec![]).unwrap();
//! let p = em.fluent_exp(&p, []).unwrap();
//! let q = em.fluent_exp(&q, []).unwrap();
//!
//! let pq = em.and([p.clone(), q.clone()]).unwrap();
//! let qp = em.and([q, p]).unwrap();
//! assert_eq!(pq, qp);
//! assert_eq!(pq.to_string(), "p & q");
//! ```
mod canon;
pub mod kind;
pub mod manager;
pub mod node;
pub mod pretty;
pub mod substitute;

pub use node::{Expr, ExprNode};
