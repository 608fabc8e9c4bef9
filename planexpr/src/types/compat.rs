//! Compatibility rules
//!
//! Decides when a value of one type may be used where another type is expected. The matrix is
//! data rather than code so that an [`Environment`](crate::env::Environment) can be configured
//! to forbid integer-to-real widening, or to ignore numeric bounds altogether.
use num_rational::BigRational;
use serde::Deserialize;

use crate::types::{Type, TypeKind};

/// Tunable compatibility matrix used by a [`TypeManager`](super::TypeManager).
///
/// | from \ to    | same type | user ancestor | integer       | real                  |
/// |--------------|-----------|---------------|---------------|-----------------------|
/// | user         | yes       | yes           | no            | no                    |
/// | integer      | yes       | no            | bounds inside | if `integer_to_real`  |
/// | real         | yes       | no            | never         | bounds inside         |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompatibilityRules {
    /// Integers may be used where reals are expected.
    pub integer_to_real: bool,

    /// Integers and reals may be compared with `==`. Ignored when `integer_to_real` is off.
    pub integer_to_real_in_equality: bool,

    /// Numeric bounds must be contained in the expected bounds. When `false`, any integer is
    /// compatible with any integer type (and likewise for reals).
    pub check_bounds: bool,
}

impl Default for CompatibilityRules {
    fn default() -> Self {
        Self {
            integer_to_real: true,
            integer_to_real_in_equality: true,
            check_bounds: true,
        }
    }
}

/// `true` if `[inner_lower, inner_upper]` is included in `[outer_lower, outer_upper]`.
fn contains<T: PartialOrd>(
    outer_lower: Option<&T>,
    outer_upper: Option<&T>,
    inner_lower: Option<&T>,
    inner_upper: Option<&T>,
) -> bool {
    let lower_ok = match (outer_lower, inner_lower) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(o), Some(i)) => i >= o,
    };
    let upper_ok = match (outer_upper, inner_upper) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(o), Some(i)) => i <= o,
    };
    lower_ok && upper_ok
}

impl CompatibilityRules {
    /// Whether a value of type `from` can be used where `to` is expected.
    pub fn is_compatible(&self, from: &Type, to: &Type) -> bool {
        self.compatible(from, to, self.integer_to_real)
    }

    /// Whether two numeric operands may meet in an ordering comparison (`<`, `<=`).
    ///
    /// Bounds are irrelevant here: comparing `integer[0, 5]` with `integer[3, 10]` is meaningful
    /// even though neither type contains the other.
    pub fn is_comparable(&self, lhs: &Type, rhs: &Type) -> bool {
        self.numeric_mix_allowed(lhs, rhs, self.integer_to_real)
    }

    /// Whether two operands may meet in an equality.
    ///
    /// Numeric operands follow [`Self::is_comparable`] with the equality-specific widening flag;
    /// user-typed operands must be related by the subtype order in one direction or the other.
    pub fn is_equatable(&self, lhs: &Type, rhs: &Type) -> bool {
        let widen = self.integer_to_real && self.integer_to_real_in_equality;
        match (lhs.kind(), rhs.kind()) {
            (l, r) if l.is_numeric() && r.is_numeric() => self.numeric_mix_allowed(lhs, rhs, widen),
            (TypeKind::User { .. }, TypeKind::User { .. }) => {
                self.is_compatible(lhs, rhs) || self.is_compatible(rhs, lhs)
            }
            _ => false,
        }
    }

    fn numeric_mix_allowed(&self, lhs: &Type, rhs: &Type, widen: bool) -> bool {
        match (lhs.kind(), rhs.kind()) {
            (TypeKind::Int { .. }, TypeKind::Int { .. })
            | (TypeKind::Real { .. }, TypeKind::Real { .. }) => true,
            (TypeKind::Int { .. }, TypeKind::Real { .. })
            | (TypeKind::Real { .. }, TypeKind::Int { .. }) => widen,
            _ => false,
        }
    }

    fn compatible(&self, from: &Type, to: &Type, widen: bool) -> bool {
        if from == to {
            return true;
        }

        match (from.kind(), to.kind()) {
            (TypeKind::User { .. }, TypeKind::User { .. }) => from.ancestors().any(|t| &t == to),
            (
                TypeKind::Int {
                    lower: il,
                    upper: iu,
                },
                TypeKind::Int {
                    lower: ol,
                    upper: ou,
                },
            ) => {
                !self.check_bounds || contains(ol.as_ref(), ou.as_ref(), il.as_ref(), iu.as_ref())
            }
            (
                TypeKind::Real {
                    lower: il,
                    upper: iu,
                },
                TypeKind::Real {
                    lower: ol,
                    upper: ou,
                },
            ) => {
                !self.check_bounds || contains(ol.as_ref(), ou.as_ref(), il.as_ref(), iu.as_ref())
            }
            (
                TypeKind::Int {
                    lower: il,
                    upper: iu,
                },
                TypeKind::Real {
                    lower: ol,
                    upper: ou,
                },
            ) if widen => {
                if !self.check_bounds {
                    return true;
                }
                let il = il.clone().map(BigRational::from_integer);
                let iu = iu.clone().map(BigRational::from_integer);
                contains(ol.as_ref(), ou.as_ref(), il.as_ref(), iu.as_ref())
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;
    use crate::types::TypeManager;

    #[test]
    fn bounded_integers_follow_containment() {
        let tm = TypeManager::new();
        let small = tm
            .int_type_with_bounds(Some(BigInt::from(0)), Some(BigInt::from(5)))
            .unwrap();
        let large = tm
            .int_type_with_bounds(Some(BigInt::from(0)), Some(BigInt::from(10)))
            .unwrap();
        let any = tm.int_type();

        assert!(tm.is_compatible(&small, &large));
        assert!(!tm.is_compatible(&large, &small));
        assert!(tm.is_compatible(&large, &any));
        assert!(!tm.is_compatible(&any, &large));
    }

    #[test]
    fn integer_widens_to_real_but_not_back() {
        let tm = TypeManager::new();
        let int = tm.int_type();
        let real = tm.real_type();
        assert!(tm.is_compatible(&int, &real));
        assert!(!tm.is_compatible(&real, &int));
    }

    #[test]
    fn widening_can_be_disabled() {
        let rules = CompatibilityRules {
            integer_to_real: false,
            ..Default::default()
        };
        let tm = TypeManager::with_rules(rules);
        assert!(!tm.is_compatible(&tm.int_type(), &tm.real_type()));
        assert!(!tm.rules().is_comparable(&tm.int_type(), &tm.real_type()));
    }

    #[test]
    fn equality_widening_is_separate() {
        let rules = CompatibilityRules {
            integer_to_real_in_equality: false,
            ..Default::default()
        };
        let tm = TypeManager::with_rules(rules);
        assert!(tm.is_compatible(&tm.int_type(), &tm.real_type()));
        assert!(tm.rules().is_comparable(&tm.int_type(), &tm.real_type()));
        assert!(!tm.rules().is_equatable(&tm.int_type(), &tm.real_type()));
    }

    #[test]
    fn unchecked_bounds_accept_any_integer() {
        let rules = CompatibilityRules {
            check_bounds: false,
            ..Default::default()
        };
        let tm = TypeManager::with_rules(rules);
        let small = tm
            .int_type_with_bounds(Some(BigInt::from(0)), Some(BigInt::from(5)))
            .unwrap();
        assert!(tm.is_compatible(&tm.int_type(), &small));
    }

    #[test]
    fn user_types_are_compatible_with_ancestors() {
        let tm = TypeManager::new();
        let location = tm.declare_user_type("Location", None).unwrap();
        let city = tm.declare_user_type("City", Some(&location)).unwrap();
        let capital = tm.declare_user_type("Capital", Some(&city)).unwrap();
        let robot = tm.declare_user_type("Robot", None).unwrap();

        assert!(tm.is_compatible(&capital, &location));
        assert!(tm.is_compatible(&city, &location));
        assert!(!tm.is_compatible(&location, &city));
        assert!(!tm.is_compatible(&robot, &location));
        assert!(tm.rules().is_equatable(&location, &capital));
        assert!(!tm.rules().is_equatable(&robot, &capital));
    }
}
