//! Iterative walkers over expression DAGs.
//!
//! Expressions share subterms, so a naive tree traversal may visit the same node many times.
//! Both helpers here visit each distinct node exactly once, using an explicit stack (no
//! recursion) and a visited set keyed by node identity.
//!
//! - [`walk_dag`]: pre-order visit; the visitor decides per node whether to descend, skip the
//!   children, or stop the whole traversal.
//! - [`subexpressions`]: every distinct node, children before parents.
//!
//! Example: count the distinct nodes of a formula
//! ```
//! use planexpr::prelude::*;
//!
//! let em = ExpressionManager::new();
//! let x = em.declare_variable("x", &em.types().int_type()).unwrap();
//! let x = em.variable_exp(&x).unwrap();
//! let lo = em.le(em.int_constant(0), x.clone()).unwrap();
//! let hi = em.le(x, em.int_constant(9)).unwrap();
//! let both = em.and([lo, hi]).unwrap();
//!
//! let mut count = 0usize;
//! walk_dag(&both, |_| {
//!     count += 1;
//!     Walk::Continue
//! });
//! // and, two comparisons, x, 0 and 9: `x` is shared and visited once.
//! assert_eq!(count, 6);
//! ```
use std::collections::HashSet;

use crate::expr::Expr;

/// Decision returned by a [`walk_dag`] visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Visit the children of this node.
    Continue,
    /// Do not visit the children of this node (they may still be reached through another
    /// parent).
    Skip,
    /// Abort the traversal.
    Stop,
}

/// Visit every distinct node reachable from `root` in pre-order, left to right.
///
/// Returns `false` when the visitor stopped the traversal early.
pub fn walk_dag<F>(root: &Expr, mut visitor: F) -> bool
where
    F: FnMut(&Expr) -> Walk,
{
    let mut visited: HashSet<Expr> = HashSet::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        match visitor(&node) {
            Walk::Continue => {
                // Reverse so that the leftmost child is popped first.
                stack.extend(
                    node.args()
                        .iter()
                        .rev()
                        .filter(|c| !visited.contains(*c))
                        .cloned(),
                );
            }
            Walk::Skip => {}
            Walk::Stop => return false,
        }
    }
    true
}

/// Every distinct node reachable from `root`, each child listed before its parents.
pub fn subexpressions(root: &Expr) -> Vec<Expr> {
    let mut visited: HashSet<Expr> = HashSet::new();
    let mut order = Vec::new();
    // (node, children already expanded)
    let mut stack = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node.clone()) {
            continue;
        }
        let children: Vec<Expr> = node
            .args()
            .iter()
            .rev()
            .filter(|c| !visited.contains(*c))
            .cloned()
            .collect();
        stack.push((node, true));
        stack.extend(children.into_iter().map(|c| (c, false)));
    }
    order
}
