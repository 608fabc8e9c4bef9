//! Canonicalisation helpers used by the manager before interning.
//!
//! Everything here is pure: ordering of children and folding of literal-only operations.
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::expr::{kind::ExprKind, node::ExprArgs};

/// Sort children by node id.
#[inline]
pub(super) fn sort(args: &mut ExprArgs) {
    args.sort_unstable();
}

/// Sort children by node id and drop repetitions (idempotent operators).
#[inline]
pub(super) fn sort_and_dedup(args: &mut ExprArgs) {
    args.sort_unstable();
    args.dedup();
}

/// Fold an n-ary arithmetic operator over literal values.
pub(super) fn fold_nary(kind: ExprKind, values: impl IntoIterator<Item = BigRational>) -> BigRational {
    match kind {
        ExprKind::Plus => values.into_iter().fold(BigRational::zero(), |acc, v| acc + v),
        ExprKind::Times => values.into_iter().fold(BigRational::one(), |acc, v| acc * v),
        _ => unreachable!("{kind} is not an n-ary arithmetic operator"),
    }
}

/// Fold a binary arithmetic operator over literal values.
///
/// Returns `None` when the operation must stay symbolic: division by zero, or an inexact
/// division whose result is integer-typed.
pub(super) fn fold_binary(
    kind: ExprKind,
    lhs: &BigRational,
    rhs: &BigRational,
    integral: bool,
) -> Option<BigRational> {
    match kind {
        ExprKind::Minus => Some(lhs - rhs),
        ExprKind::Div => {
            if rhs.is_zero() {
                return None;
            }
            let q = lhs / rhs;
            (!integral || q.is_integer()).then_some(q)
        }
        _ => unreachable!("{kind} is not a binary arithmetic operator"),
    }
}

/// Fold a comparison over literal values.
pub(super) fn fold_comparison(kind: ExprKind, lhs: &BigRational, rhs: &BigRational) -> bool {
    match kind {
        ExprKind::Equals => lhs == rhs,
        ExprKind::Lt => lhs < rhs,
        ExprKind::Le => lhs <= rhs,
        _ => unreachable!("{kind} is not a comparison"),
    }
}

/// Fold a binary boolean connective over literal values.
pub(super) fn fold_boolean(kind: ExprKind, lhs: bool, rhs: bool) -> bool {
    match kind {
        ExprKind::Implies => !lhs || rhs,
        ExprKind::Iff => lhs == rhs,
        _ => unreachable!("{kind} is not a binary boolean connective"),
    }
}

/// `true` if `value` lies within the optional inclusive bounds.
pub(super) fn within<T: PartialOrd>(value: &T, lower: Option<&T>, upper: Option<&T>) -> bool {
    lower.is_none_or(|l| value >= l) && upper.is_none_or(|u| value <= u)
}

/// Integer part of a rational known to be integral.
#[inline]
pub(super) fn to_integer(value: &BigRational) -> BigInt {
    value.to_integer()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn nary_folding() {
        assert_eq!(fold_nary(ExprKind::Plus, [q(1, 2), q(1, 3)]), q(5, 6));
        assert_eq!(fold_nary(ExprKind::Times, [q(2, 1), q(3, 1), q(1, 6)]), q(1, 1));
    }

    #[test]
    fn division_is_folded_only_when_meaningful() {
        assert_eq!(
            fold_binary(ExprKind::Div, &q(6, 1), &q(3, 1), true),
            Some(q(2, 1))
        );
        assert_eq!(fold_binary(ExprKind::Div, &q(7, 1), &q(2, 1), true), None);
        assert_eq!(
            fold_binary(ExprKind::Div, &q(7, 1), &q(2, 1), false),
            Some(q(7, 2))
        );
        assert_eq!(fold_binary(ExprKind::Div, &q(7, 1), &q(0, 1), false), None);
        assert_eq!(
            fold_binary(ExprKind::Minus, &q(1, 1), &q(3, 1), true),
            Some(q(-2, 1))
        );
    }

    #[test]
    fn bounds() {
        let v = BigInt::from(5);
        assert!(within(&v, None, None));
        assert!(within(&v, Some(&BigInt::from(5)), Some(&BigInt::from(5))));
        assert!(!within(&v, Some(&BigInt::from(6)), None));
        assert!(!within(&v, None, Some(&BigInt::from(4))));
    }
}
