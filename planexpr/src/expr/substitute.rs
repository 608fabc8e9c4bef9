//! Substitution of free variables.
//!
//! Rewriting goes through [`ExpressionManager::create`], so the result is type-checked and
//! canonicalised like any other construction: substituting `x := 1` in `x + 1` yields `2`.
//!
//! Scoping
//! - A quantifier hides, inside its body only, the mapping entries whose variable shares a name
//!   with one it binds, whatever the type.
//! - No renaming is performed: a replacement mentioning a variable bound by an enclosing
//!   quantifier is captured by it.
//!
//! The walk uses an explicit stack, so the depth of `expr` is not limited by the thread stack.
use std::collections::HashMap;

use log::trace;

use crate::{
    error::{Error, Result},
    expr::{Expr, manager::ExpressionManager},
    variable::Variable,
};

/// Mapping in force below some quantifier, with the results already computed under it.
struct Scope {
    mapping: HashMap<Variable, Expr>,
    memo: HashMap<Expr, Expr>,
}

enum Task {
    Visit { expr: Expr, scope: usize },
    /// Rebuild `expr` in `scope` from its children, which were rewritten in `inner`.
    Rebuild { expr: Expr, scope: usize, inner: usize },
}

struct Substituter<'a> {
    em: &'a ExpressionManager,
    scopes: Vec<Scope>,
}

impl<'a> Substituter<'a> {
    fn new(em: &'a ExpressionManager, mapping: &HashMap<Variable, Expr>) -> Self {
        Self {
            em,
            scopes: vec![Scope {
                mapping: mapping.clone(),
                memo: HashMap::new(),
            }],
        }
    }

    fn done(&mut self, scope: usize, expr: Expr, result: Expr) {
        self.scopes[scope].memo.insert(expr, result);
    }

    /// Scope for the body of quantifier `expr`, or `None` when nothing is left to substitute.
    fn enter(&mut self, expr: &Expr, scope: usize) -> Option<usize> {
        let bound = expr.quantifier_variables();
        let mapping: HashMap<Variable, Expr> = self.scopes[scope]
            .mapping
            .iter()
            .filter(|(v, _)| !bound.iter().any(|b| b.name() == v.name()))
            .map(|(v, e)| (v.clone(), e.clone()))
            .collect();
        if mapping.is_empty() {
            return None;
        }
        self.scopes.push(Scope {
            mapping,
            memo: HashMap::new(),
        });
        Some(self.scopes.len() - 1)
    }

    fn run(mut self, root: &Expr) -> Result<Expr> {
        let mut stack = vec![Task::Visit {
            expr: root.clone(),
            scope: 0,
        }];

        while let Some(task) = stack.pop() {
            match task {
                Task::Visit { expr, scope } => {
                    if self.scopes[scope].memo.contains_key(&expr) {
                        continue;
                    }
                    if let Some(v) = expr.variable() {
                        let value = self.scopes[scope].mapping.get(v).cloned();
                        let result = value.unwrap_or_else(|| expr.clone());
                        self.done(scope, expr, result);
                        continue;
                    }
                    if expr.args().is_empty() {
                        self.done(scope, expr.clone(), expr);
                        continue;
                    }

                    let inner = if expr.is_quantifier() {
                        match self.enter(&expr, scope) {
                            Some(inner) => inner,
                            None => {
                                self.done(scope, expr.clone(), expr);
                                continue;
                            }
                        }
                    } else {
                        scope
                    };

                    let children: Vec<Expr> = expr
                        .args()
                        .iter()
                        .rev()
                        .filter(|c| !self.scopes[inner].memo.contains_key(*c))
                        .cloned()
                        .collect();
                    stack.push(Task::Rebuild { expr, scope, inner });
                    stack.extend(children.into_iter().map(|expr| Task::Visit { expr, scope: inner }));
                }
                Task::Rebuild { expr, scope, inner } => {
                    let memo = &self.scopes[inner].memo;
                    let args: Vec<Expr> = expr
                        .args()
                        .iter()
                        .map(|c| memo.get(c).cloned().unwrap_or_else(|| c.clone()))
                        .collect();
                    let result = if args.iter().zip(expr.args()).all(|(new, old)| new == old) {
                        expr.clone()
                    } else {
                        self.em.rebuild(&expr, args)?
                    };
                    self.done(scope, expr, result);
                }
            }
        }

        Ok(self.scopes[0]
            .memo
            .get(root)
            .cloned()
            .unwrap_or_else(|| root.clone()))
    }
}

impl ExpressionManager {
    /// Replace the free occurrences of the mapped variables in `expr`.
    ///
    /// Every replacement must belong to this manager and have a type compatible with its
    /// variable. Subtrees without any substituted variable are returned unchanged (same node).
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use planexpr::prelude::*;
    ///
    /// let em = ExpressionManager::new();
    /// let x = em.declare_variable("x", &em.types().int_type()).unwrap();
    /// let sum = em.plus([em.variable_exp(&x).unwrap(), em.int_constant(1)]).unwrap();
    ///
    /// let mapping = HashMap::from([(x, em.int_constant(41))]);
    /// assert_eq!(em.substitute(&sum, &mapping).unwrap(), em.int_constant(42));
    /// ```
    pub fn substitute(&self, expr: &Expr, mapping: &HashMap<Variable, Expr>) -> Result<Expr> {
        if !self.owns(expr) {
            return Err(Error::ForeignExpression {
                expr: expr.to_string(),
            });
        }
        for (variable, value) in mapping {
            if !self.owns(value) {
                return Err(Error::ForeignExpression {
                    expr: value.to_string(),
                });
            }
            if !self.types().is_compatible(value.ty(), variable.ty()) {
                return Err(Error::Type {
                    operator: "substitute".to_string(),
                    expected: format!("a value compatible with `{variable:#}`"),
                    got: value.ty().to_string(),
                });
            }
        }
        if mapping.is_empty() {
            return Ok(expr.clone());
        }

        trace!("Substituting {} variable(s) in {}.", mapping.len(), expr);
        Substituter::new(self, mapping).run(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_subtrees_are_shared() {
        let em = ExpressionManager::new();
        let int = em.types().int_type();
        let x = em.declare_variable("x", &int).unwrap();
        let y = em.declare_variable("y", &int).unwrap();
        let xe = em.variable_exp(&x).unwrap();
        let ye = em.variable_exp(&y).unwrap();

        let left = em.lt(xe.clone(), em.int_constant(3)).unwrap();
        let right = em.lt(ye.clone(), em.int_constant(3)).unwrap();
        let both = em.and([left.clone(), right.clone()]).unwrap();

        let mapping = HashMap::from([(y.clone(), em.int_constant(7))]);
        let out = em.substitute(&both, &mapping).unwrap();
        // `7 < 3` folds to false; a partially literal conjunction is kept.
        assert_eq!(out, em.and([left.clone(), em.false_()]).unwrap());

        let mapping = HashMap::from([(y, xe.clone())]);
        let out = em.substitute(&both, &mapping).unwrap();
        assert_eq!(out, left);
    }

    #[test]
    fn quantifiers_shadow_the_mapping() {
        let em = ExpressionManager::new();
        let int = em.types().int_type();
        let x = em.declare_variable("x", &int).unwrap();
        let xe = em.variable_exp(&x).unwrap();
        let body = em.lt(xe.clone(), em.int_constant(0)).unwrap();
        let q = em.exists([x.clone()], body.clone()).unwrap();
        let both = em.and([q.clone(), body]).unwrap();

        let mapping = HashMap::from([(x, em.int_constant(-1))]);
        let out = em.substitute(&both, &mapping).unwrap();
        assert_eq!(out, em.and([q.clone(), em.true_()]).unwrap());
        assert_eq!(em.substitute(&q, &mapping).unwrap(), q);
    }

    #[test]
    fn deep_chains_are_rewritten_iteratively() {
        let em = ExpressionManager::new();
        let b = em.types().bool_type();
        let v = em.declare_variable("v", &b).unwrap();
        let p = em.declare_fluent("p", &b, vec![]).unwrap();
        let q = em.declare_fluent("q", &b, vec![]).unwrap();
        let p = em.fluent_exp(&p, []).unwrap();
        let q = em.fluent_exp(&q, []).unwrap();

        let mut chain = em.variable_exp(&v).unwrap();
        let mut expected = q.clone();
        for _ in 0..50_000 {
            chain = em.implies(p.clone(), chain).unwrap();
            expected = em.implies(p.clone(), expected).unwrap();
        }

        let mapping = HashMap::from([(v, q)]);
        assert_eq!(em.substitute(&chain, &mapping).unwrap(), expected);
    }

    #[test]
    fn replacement_types_are_checked() {
        let em = ExpressionManager::new();
        let x = em.declare_variable("x", &em.types().int_type()).unwrap();
        let xe = em.variable_exp(&x).unwrap();
        let mapping = HashMap::from([(x, em.true_())]);
        assert!(em.substitute(&xe, &mapping).unwrap_err().is_type());

        let other = ExpressionManager::new();
        let mapping = HashMap::new();
        assert!(
            em.substitute(&other.true_(), &mapping)
                .unwrap_err()
                .is_foreign_expression()
        );
    }
}
