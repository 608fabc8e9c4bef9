//! Fluent and object declarations.
//!
//! These are the symbols an expression can refer to besides variables. The containers that
//! give them meaning (problems, initial states, actions) live outside this crate; here they only
//! carry what type checking needs: a name, a type and, for fluents, a signature.
use std::sync::Arc;

use crate::types::Type;

/// A typed parameter of a fluent signature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Parameter {
    name: String,
    ty: Type,
}

impl Parameter {
    pub fn new(name: &str, ty: &Type) -> Self {
        Self {
            name: name.to_string(),
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

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct FluentData {
    name: String,
    ty: Type,
    signature: Vec<Parameter>,
}

/// A state variable: `name(signature) -> type`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fluent(Arc<FluentData>);

impl Fluent {
    /// Build a fluent handle. It must be declared with an
    /// [`ExpressionManager`](crate::expr::manager::ExpressionManager) before use.
    pub fn new(name: &str, ty: &Type, signature: Vec<Parameter>) -> Self {
        Self(Arc::new(FluentData {
            name: name.to_string(),
            ty: ty.clone(),
            signature,
        }))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The type of the fluent's value.
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    #[inline]
    pub fn signature(&self) -> &[Parameter] {
        &self.0.signature
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.0.signature.len()
    }
}

impl std::fmt::Display for Fluent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.ty(), self.name())?;
        if !self.signature().is_empty() {
            let params = self
                .signature()
                .iter()
                .map(Parameter::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "({params})")?;
        }
        Ok(())
    }
}

/// A named constant of some user type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Object {
    name: Arc<str>,
    ty: Type,
}

impl Object {
    /// Build an object handle. It must be declared before use.
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

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
