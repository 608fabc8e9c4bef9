use strum::EnumIs;
use thiserror::Error;

/// Every failure reported by the type manager, the expression manager and the configuration
/// loader.
///
/// All of them are detected synchronously when a type, symbol or expression is requested; a
/// failed request never leaves a partially built node behind.
#[derive(Debug, EnumIs, Error)]
pub enum Error {
    /// An operand does not have a type accepted by the operator.
    #[error("Type error in `{operator}`: expected {expected}, but got an operand of type `{got}`.")]
    Type {
        operator: String,
        expected: String,
        got: String,
    },

    /// Wrong number of children for an operator (or arguments for a fluent).
    #[error("Operator `{operator}` expects {expected} argument(s), but {got} were given.")]
    Arity {
        operator: String,
        expected: String,
        got: usize,
    },

    /// A user type is redeclared with a different father.
    #[error(
        "User type `{name}` is already declared with father `{existing}`, it cannot be redeclared with father `{requested}`."
    )]
    DuplicateType {
        name: String,
        existing: String,
        requested: String,
    },

    /// A fluent, object or variable was referenced without being registered.
    #[error("Symbol `{name}` was never registered with this expression manager.")]
    UnknownSymbol { name: String },

    /// A quantifier binds a variable that was never declared.
    #[error("Quantified variable `{name}` was never declared with this expression manager.")]
    UnboundVariable { name: String },

    /// A fluent or object name is reused with a different definition.
    #[error("Symbol `{name}` is already declared with a different definition.")]
    DuplicateSymbol { name: String },

    /// A type handle was not issued by the type manager of this environment.
    #[error("Type `{name}` was not issued by this type manager.")]
    UnknownType { name: String },

    /// An expression handle was not interned by this expression manager.
    #[error("Expression `{expr}` belongs to another expression manager.")]
    ForeignExpression { expr: String },

    /// Bounds of a numeric type are inverted.
    #[error("Invalid bounds: lower bound {lower} is greater than upper bound {upper}.")]
    InvalidBounds { lower: String, upper: String },

    /// A literal does not fit the requested type.
    #[error("Literal `{literal}` does not fit type `{ty}`.")]
    InvalidLiteral { literal: String, ty: String },

    /// The payload given to a generic construction does not match the operator.
    #[error("Operator `{operator}` cannot carry payload `{payload}`.")]
    InvalidPayload { operator: String, payload: String },

    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration could not be parsed.
    #[error("Failed to parse configuration: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
