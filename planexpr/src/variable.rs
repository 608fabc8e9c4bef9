//! Named, typed variables.
//!
//! Role
//! - Occur free in expressions (action parameters being grounded, lifted conditions) or bound
//!   by `forall` / `exists`.
//! - Identity is the `(name, type)` pair: two handles built from the same name and type are
//!   equal and substitutable.
use std::sync::Arc;

use crate::types::Type;

/// A variable usable in expressions once declared with an
/// [`ExpressionManager`](crate::expr::manager::ExpressionManager).
///
/// Display
/// - Default formatting prints the bare name.
/// - Alternate formatting (`{:#}`) also prints the type: `name: type`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    name: Arc<str>,
    ty: Type,
}

impl Variable {
    /// Build a variable handle. It still has to be declared before expressions can use it.
    pub fn new(name: &str, ty: &Type) -> Self {
        Self {
            name: Arc::from(name),
            ty: ty.clone(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{}: {}", self.name, self.ty)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeManager;

    #[test]
    fn identity_is_name_and_type() {
        let tm = TypeManager::new();
        let a = Variable::new("x", &tm.int_type());
        let b = Variable::new("x", &tm.int_type());
        let c = Variable::new("x", &tm.real_type());
        let d = Variable::new("y", &tm.int_type());

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn display() {
        let tm = TypeManager::new();
        let x = Variable::new("x", &tm.int_type());
        assert_eq!(format!("{x}"), "x");
        assert_eq!(format!("{x:#}"), "x: integer");
    }
}
