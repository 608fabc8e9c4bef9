use strum::{Display, EnumIs, EnumIter};

/// Operator tag of an expression node.
///
/// The set is closed: every consumer matches on it exhaustively. `>` and `>=` do not appear
/// because the manager stores `a > b` as `b < a` and `a >= b` as `b <= a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ExprKind {
    // Leaves
    BoolConstant,
    IntConstant,
    RealConstant,
    FluentExp,
    ObjectExp,
    VariableExp,
    TimingExp,

    // Boolean connectives
    And,
    Or,
    Not,
    Implies,
    Iff,

    // Quantifiers
    Exists,
    Forall,

    // Comparisons
    Equals,
    Le,
    Lt,

    // Arithmetic
    Plus,
    Minus,
    Times,
    Div,
}

/// Number of children accepted by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Fixed by the payload (fluent signatures).
    Payload,
}

impl Arity {
    /// Whether `n` children satisfy this arity. Payload-dependent arities always accept.
    pub fn accepts(&self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == *k,
            Arity::AtLeast(k) => n >= *k,
            Arity::Payload => true,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "exactly {k}"),
            Arity::AtLeast(k) => write!(f, "at least {k}"),
            Arity::Payload => write!(f, "signature-defined"),
        }
    }
}

impl ExprKind {
    pub fn arity(&self) -> Arity {
        use ExprKind::*;

        match self {
            BoolConstant | IntConstant | RealConstant | ObjectExp | VariableExp | TimingExp => {
                Arity::Exact(0)
            }
            FluentExp => Arity::Payload,
            Not | Exists | Forall => Arity::Exact(1),
            Implies | Iff | Equals | Le | Lt | Minus | Div => Arity::Exact(2),
            And | Or => Arity::AtLeast(0),
            Plus | Times => Arity::AtLeast(1),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            ExprKind::BoolConstant | ExprKind::IntConstant | ExprKind::RealConstant
        )
    }

    pub fn is_leaf(&self) -> bool {
        self.arity() == Arity::Exact(0)
    }

    pub fn is_boolean_connective(&self) -> bool {
        matches!(
            self,
            ExprKind::And | ExprKind::Or | ExprKind::Not | ExprKind::Implies | ExprKind::Iff
        )
    }

    pub fn is_quantifier(&self) -> bool {
        matches!(self, ExprKind::Exists | ExprKind::Forall)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, ExprKind::Equals | ExprKind::Le | ExprKind::Lt)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            ExprKind::Plus | ExprKind::Minus | ExprKind::Times | ExprKind::Div
        )
    }

    /// Children order is irrelevant; they are sorted before interning.
    pub fn is_commutative(&self) -> bool {
        matches!(
            self,
            ExprKind::And | ExprKind::Or | ExprKind::Plus | ExprKind::Times | ExprKind::Equals
        )
    }

    /// Nested occurrences of the same operator are flattened before interning.
    pub fn is_associative(&self) -> bool {
        matches!(
            self,
            ExprKind::And | ExprKind::Or | ExprKind::Plus | ExprKind::Times
        )
    }
}
