//! Free-variable analysis.
//!
//! Role
//! - Compute the set of variables occurring free in an expression, respecting quantifier
//!   scopes: `forall (x). p(x, y)` has `{y}` free.
//! - Memoise results per node. Nodes are immutable and interned, so a cached answer is valid
//!   for as long as the node exists; sets are shared between all nodes with the same answer
//!   through `Arc`.
//!
//! Performance
//! - The first query on a DAG of `n` distinct nodes costs O(n) set unions; every later query on
//!   any of those nodes is a hash lookup.
//! - The traversal is iterative, so arbitrarily deep expressions do not exhaust the stack.
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use log::trace;
use parking_lot::RwLock;

use crate::{expr::Expr, variable::Variable};

/// Set of free variables, ordered by name then type.
pub type FreeVariables = Arc<BTreeSet<Variable>>;

/// Memoising oracle answering free-variable queries.
///
/// The oracle can be shared between threads; concurrent queries may compute the same entry
/// twice but always agree on its value.
#[derive(Default)]
pub struct FreeVarsOracle {
    // Keyed by (manager id, node id) so that one oracle can serve several managers.
    memo: RwLock<HashMap<(u64, u64), FreeVariables>>,
}

impl FreeVarsOracle {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn key(expr: &Expr) -> (u64, u64) {
        (expr.manager, expr.id)
    }

    fn cached(&self, expr: &Expr) -> Option<FreeVariables> {
        self.memo.read().get(&Self::key(expr)).cloned()
    }

    fn compute(&self, expr: &Expr, children: &[FreeVariables]) -> FreeVariables {
        if let Some(v) = expr.variable() {
            return Arc::new(BTreeSet::from([v.clone()]));
        }
        if expr.is_quantifier() {
            let body = &children[0];
            // A binder hides every variable of the same name, whatever its type.
            let bound = expr.quantifier_variables();
            let hidden = |v: &Variable| bound.iter().any(|b| b.name() == v.name());
            if body.iter().any(hidden) {
                return Arc::new(body.iter().filter(|v| !hidden(*v)).cloned().collect());
            }
            return body.clone();
        }

        match children {
            [] => Arc::default(),
            [only] => only.clone(),
            _ => {
                // Reuse the largest child set when it already covers the others.
                let largest = children.iter().max_by_key(|s| s.len()).cloned().unwrap_or_default();
                if children.iter().all(|s| s.is_subset(&largest)) {
                    largest
                } else {
                    Arc::new(children.iter().flat_map(|s| s.iter().cloned()).collect())
                }
            }
        }
    }

    /// Variables occurring free in `expr`.
    pub fn free_variables(&self, expr: &Expr) -> FreeVariables {
        if let Some(done) = self.cached(expr) {
            return done;
        }

        let mut computed: HashMap<(u64, u64), FreeVariables> = HashMap::new();
        let mut stack = vec![(expr.clone(), false)];
        while let Some((node, expanded)) = stack.pop() {
            let key = Self::key(&node);
            if computed.contains_key(&key) {
                continue;
            }

            if expanded {
                let children: Vec<FreeVariables> = node
                    .args()
                    .iter()
                    .map(|c| {
                        computed
                            .get(&Self::key(c))
                            .cloned()
                            .or_else(|| self.cached(c))
                            .unwrap_or_default()
                    })
                    .collect();
                let vars = self.compute(&node, &children);
                computed.insert(key, vars);
                continue;
            }

            if let Some(done) = self.cached(&node) {
                computed.insert(key, done);
                continue;
            }
            stack.push((node.clone(), true));
            for child in node.args().iter().rev() {
                if !computed.contains_key(&Self::key(child)) {
                    stack.push((child.clone(), false));
                }
            }
        }

        let result = computed.get(&Self::key(expr)).cloned().unwrap_or_default();
        trace!(
            "Computed free variables of {} new node(s) starting at {}.",
            computed.len(),
            expr
        );
        self.memo.write().extend(computed);
        result
    }

    /// `true` when `expr` has no free variable.
    pub fn is_closed(&self, expr: &Expr) -> bool {
        self.free_variables(expr).is_empty()
    }

    /// Number of memoised nodes.
    pub fn len(&self) -> usize {
        self.memo.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every memoised entry.
    pub fn clear(&self) {
        self.memo.write().clear();
    }
}
