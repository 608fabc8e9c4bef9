//! Classification of expressions for solver selection.
//!
//! A solver usually supports a fragment of the language (no quantifiers, no numeric fluents,
//! ...). [`classify`] summarises which constructs an expression actually uses so that a caller
//! can reject or route a problem without inspecting it by hand.
use bitflags::bitflags;

use crate::{
    expr::{Expr, kind::ExprKind},
    walker::{Walk, walk_dag},
};

bitflags! {
    /// Constructs appearing in an expression.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExprFeatures: u32 {
        const NEGATION = 1 << 0;
        const DISJUNCTION = 1 << 1;
        /// Implications and equivalences, which hide a disjunction.
        const IMPLICATION = 1 << 2;
        const EQUALITY = 1 << 3;
        const EXISTENTIAL = 1 << 4;
        const UNIVERSAL = 1 << 5;
        /// `<` and `<=` (and therefore `>` and `>=`).
        const NUMERIC_COMPARISON = 1 << 6;
        const ARITHMETIC = 1 << 7;
        const FLUENT = 1 << 8;
        /// Fluents whose value is numeric rather than boolean or an object.
        const NUMERIC_FLUENT = 1 << 9;
        const OBJECT_FLUENT = 1 << 10;
        const TIMING = 1 << 11;
        /// Some node has a user-defined type.
        const USER_TYPES = 1 << 12;
        /// Some node has a real type.
        const REAL_NUMBERS = 1 << 13;
        const VARIABLES = 1 << 14;

        const QUANTIFIERS = Self::EXISTENTIAL.bits() | Self::UNIVERSAL.bits();
        const NUMERIC = Self::NUMERIC_COMPARISON.bits() | Self::ARITHMETIC.bits()
            | Self::NUMERIC_FLUENT.bits();
    }
}

impl ExprFeatures {
    fn of_node(e: &Expr) -> Self {
        let mut f = match e.kind() {
            ExprKind::Not => Self::NEGATION,
            ExprKind::Or => Self::DISJUNCTION,
            ExprKind::Implies | ExprKind::Iff => Self::IMPLICATION,
            ExprKind::Equals => Self::EQUALITY,
            ExprKind::Exists => Self::EXISTENTIAL,
            ExprKind::Forall => Self::UNIVERSAL,
            ExprKind::Le | ExprKind::Lt => Self::NUMERIC_COMPARISON,
            ExprKind::Plus | ExprKind::Minus | ExprKind::Times | ExprKind::Div => Self::ARITHMETIC,
            ExprKind::TimingExp => Self::TIMING,
            ExprKind::VariableExp => Self::VARIABLES,
            ExprKind::FluentExp if e.ty().is_numeric_type() => Self::FLUENT | Self::NUMERIC_FLUENT,
            ExprKind::FluentExp if e.ty().is_user_type() => Self::FLUENT | Self::OBJECT_FLUENT,
            ExprKind::FluentExp => Self::FLUENT,
            ExprKind::BoolConstant
            | ExprKind::IntConstant
            | ExprKind::RealConstant
            | ExprKind::ObjectExp
            | ExprKind::And => Self::empty(),
        };
        if e.ty().is_user_type() {
            f |= Self::USER_TYPES;
        }
        if e.ty().is_real_type() {
            f |= Self::REAL_NUMBERS;
        }
        f
    }
}

/// Features used anywhere in `expr`.
pub fn classify(expr: &Expr) -> ExprFeatures {
    let mut features = ExprFeatures::empty();
    walk_dag(expr, |e| {
        features |= ExprFeatures::of_node(e);
        Walk::Continue
    });
    features
}

/// Features used anywhere in any of `exprs`.
pub fn classify_all<'a, I>(exprs: I) -> ExprFeatures
where
    I: IntoIterator<Item = &'a Expr>,
{
    exprs
        .into_iter()
        .fold(ExprFeatures::empty(), |acc, e| acc | classify(e))
}

#[cfg(test)]
mod tests {
    use crate::{expr::manager::ExpressionManager, symbol::Parameter, timing::Timing};

    use super::*;

    #[test]
    fn propositional_formula() {
        let em = ExpressionManager::new();
        let b = em.types().bool_type();
        let p = em.declare_fluent("p", &b, vec![]).unwrap();
        let q = em.declare_fluent("q", &b, vec![]).unwrap();
        let p = em.fluent_exp(&p, []).unwrap();
        let q = em.fluent_exp(&q, []).unwrap();
        let e = em.and([p, em.not(q).unwrap()]).unwrap();

        assert_eq!(classify(&e), ExprFeatures::FLUENT | ExprFeatures::NEGATION);
    }

    #[test]
    fn quantified_numeric_formula() {
        let em = ExpressionManager::new();
        let tm = em.types();
        let robot = tm.declare_user_type("Robot", None).unwrap();
        let battery = em
            .declare_fluent("battery", &tm.real_type(), vec![Parameter::new("r", &robot)])
            .unwrap();
        let r = em.declare_variable("r", &robot).unwrap();
        let level = em.fluent_exp(&battery, [em.variable_exp(&r).unwrap()]).unwrap();
        let low = em.lt(level, em.timing_exp(Timing::start())).unwrap();
        let e = em.exists([r], low).unwrap();

        let f = classify(&e);
        assert!(f.contains(ExprFeatures::EXISTENTIAL | ExprFeatures::NUMERIC_COMPARISON));
        assert!(f.contains(ExprFeatures::NUMERIC_FLUENT | ExprFeatures::TIMING));
        assert!(f.contains(ExprFeatures::USER_TYPES | ExprFeatures::REAL_NUMBERS));
        assert!(!f.intersects(ExprFeatures::UNIVERSAL | ExprFeatures::ARITHMETIC));

        let both = classify_all([&e, &em.int_constant(1)]);
        assert_eq!(both, f);
    }
}
