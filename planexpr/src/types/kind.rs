//! Type kinds
//!
//! The description stored behind every [`Type`] handle. A kind is plain data: it is hashed and
//! compared structurally by the [`TypeManager`](super::TypeManager) to find the canonical handle,
//! after which handles are compared by identity only.
use num_bigint::BigInt;
use num_rational::BigRational;
use strum::EnumIs;

use crate::types::Type;

/// The shape of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum TypeKind {
    /// Boolean truth values.
    Bool,

    /// Integers with optional inclusive bounds. `None` means unbounded on that side.
    Int {
        lower: Option<BigInt>,
        upper: Option<BigInt>,
    },

    /// Rationals with optional inclusive bounds. `None` means unbounded on that side.
    Real {
        lower: Option<BigRational>,
        upper: Option<BigRational>,
    },

    /// A user-declared type, optionally refining a father user type.
    User { name: String, father: Option<Type> },
}

impl TypeKind {
    /// `true` for integer and real kinds.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeKind::Int { .. } | TypeKind::Real { .. })
    }
}

fn fmt_bounds<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    lower: &Option<T>,
    upper: &Option<T>,
) -> std::fmt::Result {
    if lower.is_none() && upper.is_none() {
        return Ok(());
    }

    match lower {
        Some(l) => write!(f, "[{l}, ")?,
        None => write!(f, "[-inf, ")?,
    }
    match upper {
        Some(u) => write!(f, "{u}]"),
        None => write!(f, "inf]"),
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::Int { lower, upper } => {
                write!(f, "integer")?;
                fmt_bounds(f, lower, upper)
            }
            TypeKind::Real { lower, upper } => {
                write!(f, "real")?;
                fmt_bounds(f, lower, upper)
            }
            TypeKind::User { name, .. } => write!(f, "{name}"),
        }
    }
}
