//! The expression manager: typed constructors over a hash-consing intern table.
use std::{
    collections::{HashMap, HashSet, hash_map::Entry},
    hash::{DefaultHasher, Hash, Hasher},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use log::{debug, info, trace};
use num_bigint::BigInt;
use num_rational::BigRational;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use smallvec::{SmallVec, smallvec};

use crate::{
    error::{Error, Result},
    expr::{
        canon,
        kind::ExprKind,
        node::{Expr, ExprArgs, ExprNode, Literal, Payload},
    },
    symbol::{Fluent, Object, Parameter},
    timing::{DurationInterval, Interval, Timing},
    types::{Type, TypeKind, TypeManager},
    utils::next_context_id,
    variable::Variable,
};

#[derive(Default)]
struct InternTable {
    buckets: HashMap<u64, SmallVec<[Expr; 1]>>,
    len: usize,
}

enum Symbol {
    Fluent(Fluent),
    Object(Object),
}

#[derive(Default)]
struct SymbolTable {
    named: HashMap<String, Symbol>,
    variables: HashSet<Variable>,
}

fn type_error(operator: impl ToString, expected: impl Into<String>, got: &Type) -> Error {
    Error::Type {
        operator: operator.to_string(),
        expected: expected.into(),
        got: got.to_string(),
    }
}

/// Factory and owner of every expression node of an environment.
///
/// Role
/// - Validate operand types at construction time; an ill-typed request fails and interns
///   nothing.
/// - Canonicalise (sort commutative children, flatten associative operators, remove double
///   negations, fold literal-only operations) before interning.
/// - Hash-cons: a structurally identical request returns the existing node.
///
/// # A note on concurrency
/// The probe-or-insert sequence of the intern table runs under one upgradable read lock that
/// is upgraded to a write lock on a miss. Upgradable readers exclude each other, so two threads
/// racing on the same construction cannot create two nodes. Plain readers (introspection) are
/// never blocked by a probe.
pub struct ExpressionManager {
    id: u64,
    types: TypeManager,
    table: RwLock<InternTable>,
    symbols: RwLock<SymbolTable>,
    next_node: AtomicU64,
}

impl Default for ExpressionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionManager {
    /// Create a manager with a fresh [`TypeManager`] using the default rules.
    pub fn new() -> Self {
        Self::with_type_manager(TypeManager::new())
    }

    /// Create a manager owning the given type manager.
    pub fn with_type_manager(types: TypeManager) -> Self {
        Self {
            id: next_context_id(),
            types,
            table: Default::default(),
            symbols: Default::default(),
            next_node: AtomicU64::new(0),
        }
    }

    /// The type manager every expression of this manager is typed against.
    #[inline]
    pub fn types(&self) -> &TypeManager {
        &self.types
    }

    /// Process-unique identifier of this manager.
    #[inline]
    pub fn manager_id(&self) -> u64 {
        self.id
    }

    /// Number of interned nodes.
    pub fn len(&self) -> usize {
        self.table.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `expr` was interned by this manager.
    #[inline]
    pub fn owns(&self, expr: &Expr) -> bool {
        expr.manager == self.id
    }

    fn check_owned(&self, expr: &Expr) -> Result<()> {
        if self.owns(expr) {
            Ok(())
        } else {
            Err(Error::ForeignExpression {
                expr: expr.to_string(),
            })
        }
    }

    // ======================== Interning ========================

    fn structural_hash(kind: ExprKind, args: &[Expr], payload: &Payload, ty: &Type) -> u64 {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        for arg in args {
            arg.id.hash(&mut hasher);
        }
        payload.hash(&mut hasher);
        ty.hash(&mut hasher);
        hasher.finish()
    }

    /// Return the unique node for `(kind, args, payload, ty)`, creating it on first request.
    ///
    /// Callers are responsible for having validated and canonicalised the request.
    fn intern(&self, kind: ExprKind, args: ExprArgs, payload: Payload, ty: Type) -> Expr {
        let h = Self::structural_hash(kind, &args, &payload, &ty);
        let table = self.table.upgradable_read();

        if let Some(bucket) = table.buckets.get(&h) {
            let hit = bucket.iter().find(|e| {
                e.kind == kind && e.args == args && e.payload == payload && e.ty == ty
            });
            if let Some(expr) = hit {
                trace!("Intern hit for {} (node #{}).", kind, expr.id);
                return expr.clone();
            }
        }

        let mut table = RwLockUpgradableReadGuard::upgrade(table);
        let expr = Expr(Arc::new(ExprNode {
            id: self.next_node.fetch_add(1, Ordering::Relaxed),
            manager: self.id,
            kind,
            args,
            payload,
            ty,
        }));
        trace!("Intern miss for {}, created node #{}.", kind, expr.id);

        match table.buckets.entry(h) {
            Entry::Occupied(mut bucket) => {
                info!(
                    "Detected an hash collision on hash 0x{:016x}. The following expressions collided: {}",
                    h,
                    bucket
                        .get()
                        .iter()
                        .chain(std::iter::once(&expr))
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                );
                bucket.get_mut().push(expr.clone());
            }
            Entry::Vacant(bucket) => {
                bucket.insert(smallvec![expr.clone()]);
            }
        }
        table.len += 1;
        expr
    }

    // ======================== Symbols ========================

    /// Declare a fluent `name(signature) -> ty`.
    ///
    /// Redeclaring the same fluent is idempotent; reusing the name for anything else fails
    /// with [`Error::DuplicateSymbol`].
    pub fn declare_fluent(
        &self,
        name: &str,
        ty: &Type,
        signature: Vec<Parameter>,
    ) -> Result<Fluent> {
        self.types.check_declared(ty)?;
        for param in &signature {
            self.types.check_declared(param.ty())?;
        }

        let fluent = Fluent::new(name, ty, signature);
        let symbols = self.symbols.upgradable_read();
        match symbols.named.get(name) {
            Some(Symbol::Fluent(existing)) if existing == &fluent => Ok(existing.clone()),
            Some(_) => Err(Error::DuplicateSymbol {
                name: name.to_string(),
            }),
            None => {
                let mut symbols = RwLockUpgradableReadGuard::upgrade(symbols);
                debug!("New fluent declared: {}.", fluent);
                symbols
                    .named
                    .insert(name.to_string(), Symbol::Fluent(fluent.clone()));
                Ok(fluent)
            }
        }
    }

    /// Declare an object of a user type.
    pub fn declare_object(&self, name: &str, ty: &Type) -> Result<Object> {
        self.types.check_declared(ty)?;
        if !ty.is_user_type() {
            return Err(type_error(
                format!("declare_object({name})"),
                "a user-defined type",
                ty,
            ));
        }

        let object = Object::new(name, ty);
        let symbols = self.symbols.upgradable_read();
        match symbols.named.get(name) {
            Some(Symbol::Object(existing)) if existing == &object => Ok(existing.clone()),
            Some(_) => Err(Error::DuplicateSymbol {
                name: name.to_string(),
            }),
            None => {
                let mut symbols = RwLockUpgradableReadGuard::upgrade(symbols);
                debug!("New object declared: {}: {}.", object, ty);
                symbols
                    .named
                    .insert(name.to_string(), Symbol::Object(object.clone()));
                Ok(object)
            }
        }
    }

    /// Declare a variable. Variables are identified by name and type, so the same name may
    /// be declared with several types.
    pub fn declare_variable(&self, name: &str, ty: &Type) -> Result<Variable> {
        self.types.check_declared(ty)?;
        let variable = Variable::new(name, ty);
        let mut symbols = self.symbols.write();
        if symbols.variables.insert(variable.clone()) {
            debug!("New variable declared: {:#}.", variable);
        }
        Ok(variable)
    }

    /// Look a declared fluent up by name.
    pub fn fluent(&self, name: &str) -> Option<Fluent> {
        match self.symbols.read().named.get(name) {
            Some(Symbol::Fluent(f)) => Some(f.clone()),
            _ => None,
        }
    }

    /// Look a declared object up by name.
    pub fn object(&self, name: &str) -> Option<Object> {
        match self.symbols.read().named.get(name) {
            Some(Symbol::Object(o)) => Some(o.clone()),
            _ => None,
        }
    }

    /// Whether `variable` was declared with this manager.
    pub fn is_variable_declared(&self, variable: &Variable) -> bool {
        self.symbols.read().variables.contains(variable)
    }

    // ======================== Type checks ========================

    fn expect_bool(&self, kind: ExprKind, arg: &Expr) -> Result<()> {
        if arg.ty().is_bool_type() {
            Ok(())
        } else {
            Err(type_error(kind, "a boolean operand", arg.ty()))
        }
    }

    fn expect_numeric(&self, kind: ExprKind, arg: &Expr) -> Result<()> {
        if arg.ty().is_numeric_type() {
            Ok(())
        } else {
            Err(type_error(kind, "a numeric operand", arg.ty()))
        }
    }

    /// Result type of an arithmetic operator: unbounded real if any operand is real,
    /// unbounded integer otherwise.
    fn widest_type(&self, kind: ExprKind, args: &[Expr]) -> Result<Type> {
        let real = args.iter().find(|a| a.ty().is_real_type());
        let int = args.iter().find(|a| a.ty().is_int_type());
        match (real, int) {
            (Some(r), Some(i)) if !self.types.rules().integer_to_real => Err(type_error(
                kind,
                format!("an operand of the same numeric kind as `{}`", r.ty()),
                i.ty(),
            )),
            (Some(_), _) => Ok(self.types.real_type()),
            (None, _) => Ok(self.types.int_type()),
        }
    }

    fn numeric_constant(&self, value: BigRational, ty: &Type) -> Expr {
        if ty.is_int_type() {
            self.int_constant(canon::to_integer(&value))
        } else {
            self.real_constant(value)
        }
    }

    // ======================== Leaves ========================

    /// A constant of the given type.
    ///
    /// Integer literals are accepted by real types. The literal must lie within the bounds of
    /// the type, otherwise [`Error::InvalidLiteral`] is returned.
    pub fn constant(&self, literal: Literal, ty: &Type) -> Result<Expr> {
        self.types.check_declared(ty)?;
        let invalid = || Error::InvalidLiteral {
            literal: literal.to_string(),
            ty: ty.to_string(),
        };

        let (kind, payload) = match (&literal, ty.kind()) {
            (Literal::Bool(b), TypeKind::Bool) => (ExprKind::BoolConstant, Payload::Bool(*b)),
            (Literal::Int(i), TypeKind::Int { lower, upper }) => {
                if !canon::within(i, lower.as_ref(), upper.as_ref()) {
                    return Err(invalid());
                }
                (ExprKind::IntConstant, Payload::Int(i.clone()))
            }
            (Literal::Int(i), TypeKind::Real { lower, upper }) => {
                let r = BigRational::from_integer(i.clone());
                if !canon::within(&r, lower.as_ref(), upper.as_ref()) {
                    return Err(invalid());
                }
                (ExprKind::RealConstant, Payload::Real(r))
            }
            (Literal::Real(r), TypeKind::Real { lower, upper }) => {
                if !canon::within(r, lower.as_ref(), upper.as_ref()) {
                    return Err(invalid());
                }
                (ExprKind::RealConstant, Payload::Real(r.clone()))
            }
            _ => return Err(invalid()),
        };

        Ok(self.intern(kind, ExprArgs::new(), payload, ty.clone()))
    }

    pub fn bool_constant(&self, value: bool) -> Expr {
        self.intern(
            ExprKind::BoolConstant,
            ExprArgs::new(),
            Payload::Bool(value),
            self.types.bool_type(),
        )
    }

    #[inline]
    pub fn true_(&self) -> Expr {
        self.bool_constant(true)
    }

    #[inline]
    pub fn false_(&self) -> Expr {
        self.bool_constant(false)
    }

    /// An integer constant of the unbounded integer type.
    pub fn int_constant(&self, value: impl Into<BigInt>) -> Expr {
        self.intern(
            ExprKind::IntConstant,
            ExprArgs::new(),
            Payload::Int(value.into()),
            self.types.int_type(),
        )
    }

    /// A real constant of the unbounded real type.
    pub fn real_constant(&self, value: BigRational) -> Expr {
        self.intern(
            ExprKind::RealConstant,
            ExprArgs::new(),
            Payload::Real(value),
            self.types.real_type(),
        )
    }

    /// Application of a declared fluent to arguments matching its signature.
    pub fn fluent_exp<I>(&self, fluent: &Fluent, args: I) -> Result<Expr>
    where
        I: IntoIterator<Item = Expr>,
    {
        let registered = matches!(
            self.symbols.read().named.get(fluent.name()),
            Some(Symbol::Fluent(f)) if f == fluent
        );
        if !registered {
            return Err(Error::UnknownSymbol {
                name: fluent.name().to_string(),
            });
        }

        let args: ExprArgs = args.into_iter().collect();
        if args.len() != fluent.arity() {
            return Err(Error::Arity {
                operator: fluent.name().to_string(),
                expected: format!("exactly {}", fluent.arity()),
                got: args.len(),
            });
        }
        for (arg, param) in args.iter().zip(fluent.signature()) {
            self.check_owned(arg)?;
            if !self.types.is_compatible(arg.ty(), param.ty()) {
                return Err(type_error(
                    fluent.name(),
                    format!("an operand compatible with `{}` for `{}`", param.ty(), param.name()),
                    arg.ty(),
                ));
            }
        }

        Ok(self.intern(
            ExprKind::FluentExp,
            args,
            Payload::Fluent(fluent.clone()),
            fluent.ty().clone(),
        ))
    }

    /// Reference to a declared object.
    pub fn object_exp(&self, object: &Object) -> Result<Expr> {
        let registered = matches!(
            self.symbols.read().named.get(object.name()),
            Some(Symbol::Object(o)) if o == object
        );
        if !registered {
            return Err(Error::UnknownSymbol {
                name: object.name().to_string(),
            });
        }

        Ok(self.intern(
            ExprKind::ObjectExp,
            ExprArgs::new(),
            Payload::Object(object.clone()),
            object.ty().clone(),
        ))
    }

    /// Reference to a declared variable.
    pub fn variable_exp(&self, variable: &Variable) -> Result<Expr> {
        if !self.is_variable_declared(variable) {
            return Err(Error::UnknownSymbol {
                name: variable.name().to_string(),
            });
        }

        Ok(self.intern(
            ExprKind::VariableExp,
            ExprArgs::new(),
            Payload::Variable(variable.clone()),
            variable.ty().clone(),
        ))
    }

    /// A temporal placeholder. Timings are real-valued.
    pub fn timing_exp(&self, timing: Timing) -> Expr {
        self.intern(
            ExprKind::TimingExp,
            ExprArgs::new(),
            Payload::Timing(timing),
            self.types.real_type(),
        )
    }

    // ======================== Boolean connectives ========================

    fn nary_boolean<I>(&self, kind: ExprKind, args: I) -> Result<Expr>
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut flat = ExprArgs::new();
        for arg in args {
            self.check_owned(&arg)?;
            self.expect_bool(kind, &arg)?;
            if arg.kind == kind {
                flat.extend(arg.args.iter().cloned());
            } else {
                flat.push(arg);
            }
        }
        canon::sort_and_dedup(&mut flat);

        if flat.iter().all(|a| a.is_bool_constant()) {
            let mut values = flat.iter().filter_map(|a| a.bool_constant_value());
            let value = match kind {
                ExprKind::And => values.all(|v| v),
                _ => values.any(|v| v),
            };
            return Ok(self.bool_constant(value));
        }

        if flat.len() == 1 {
            return Ok(flat.swap_remove(0));
        }

        Ok(self.intern(kind, flat, Payload::None, self.types.bool_type()))
    }

    /// Conjunction. No operand yields `true`, a single operand is returned as is.
    pub fn and<I>(&self, args: I) -> Result<Expr>
    where
        I: IntoIterator<Item = Expr>,
    {
        self.nary_boolean(ExprKind::And, args)
    }

    /// Disjunction. No operand yields `false`, a single operand is returned as is.
    pub fn or<I>(&self, args: I) -> Result<Expr>
    where
        I: IntoIterator<Item = Expr>,
    {
        self.nary_boolean(ExprKind::Or, args)
    }

    /// Negation; `not(not(x))` is `x`.
    pub fn not(&self, arg: Expr) -> Result<Expr> {
        self.check_owned(&arg)?;
        self.expect_bool(ExprKind::Not, &arg)?;

        if arg.is_not() {
            return Ok(arg.arg(0).clone());
        }
        if let Some(v) = arg.bool_constant_value() {
            return Ok(self.bool_constant(!v));
        }

        Ok(self.intern(
            ExprKind::Not,
            smallvec![arg],
            Payload::None,
            self.types.bool_type(),
        ))
    }

    fn binary_boolean(&self, kind: ExprKind, lhs: Expr, rhs: Expr) -> Result<Expr> {
        for arg in [&lhs, &rhs] {
            self.check_owned(arg)?;
            self.expect_bool(kind, arg)?;
        }

        if let (Some(a), Some(b)) = (lhs.bool_constant_value(), rhs.bool_constant_value()) {
            return Ok(self.bool_constant(canon::fold_boolean(kind, a, b)));
        }

        Ok(self.intern(
            kind,
            smallvec![lhs, rhs],
            Payload::None,
            self.types.bool_type(),
        ))
    }

    pub fn implies(&self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.binary_boolean(ExprKind::Implies, lhs, rhs)
    }

    pub fn iff(&self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.binary_boolean(ExprKind::Iff, lhs, rhs)
    }

    // ======================== Comparisons ========================

    /// Equality between numeric operands, or between user-typed operands related by
    /// subtyping.
    pub fn equals(&self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.check_owned(&lhs)?;
        self.check_owned(&rhs)?;
        if !self.types.rules().is_equatable(lhs.ty(), rhs.ty()) {
            return Err(type_error(
                ExprKind::Equals,
                format!("an operand equatable with `{}`", lhs.ty()),
                rhs.ty(),
            ));
        }

        if let (Some(a), Some(b)) = (lhs.numeric_constant_value(), rhs.numeric_constant_value()) {
            return Ok(self.bool_constant(canon::fold_comparison(ExprKind::Equals, &a, &b)));
        }

        let mut args: ExprArgs = smallvec![lhs, rhs];
        canon::sort(&mut args);
        Ok(self.intern(
            ExprKind::Equals,
            args,
            Payload::None,
            self.types.bool_type(),
        ))
    }

    fn ordering(&self, kind: ExprKind, lhs: Expr, rhs: Expr) -> Result<Expr> {
        for arg in [&lhs, &rhs] {
            self.check_owned(arg)?;
            self.expect_numeric(kind, arg)?;
        }
        if !self.types.rules().is_comparable(lhs.ty(), rhs.ty()) {
            return Err(type_error(
                kind,
                format!("an operand comparable with `{}`", lhs.ty()),
                rhs.ty(),
            ));
        }

        if let (Some(a), Some(b)) = (lhs.numeric_constant_value(), rhs.numeric_constant_value()) {
            return Ok(self.bool_constant(canon::fold_comparison(kind, &a, &b)));
        }

        Ok(self.intern(
            kind,
            smallvec![lhs, rhs],
            Payload::None,
            self.types.bool_type(),
        ))
    }

    /// `lhs < rhs`
    pub fn lt(&self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.ordering(ExprKind::Lt, lhs, rhs)
    }

    /// `lhs <= rhs`
    pub fn le(&self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.ordering(ExprKind::Le, lhs, rhs)
    }

    /// `lhs > rhs`, stored as `rhs < lhs`.
    pub fn gt(&self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.ordering(ExprKind::Lt, rhs, lhs)
    }

    /// `lhs >= rhs`, stored as `rhs <= lhs`.
    pub fn ge(&self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.ordering(ExprKind::Le, rhs, lhs)
    }

    // ======================== Arithmetic ========================

    fn nary_arithmetic<I>(&self, kind: ExprKind, args: I) -> Result<Expr>
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut given = 0usize;
        let mut flat = ExprArgs::new();
        for arg in args {
            given += 1;
            self.check_owned(&arg)?;
            self.expect_numeric(kind, &arg)?;
            if arg.kind == kind {
                flat.extend(arg.args.iter().cloned());
            } else {
                flat.push(arg);
            }
        }
        if given == 0 {
            return Err(Error::Arity {
                operator: kind.to_string(),
                expected: kind.arity().to_string(),
                got: 0,
            });
        }
        canon::sort(&mut flat);
        let ty = self.widest_type(kind, &flat)?;

        let values: Option<Vec<BigRational>> =
            flat.iter().map(|a| a.numeric_constant_value()).collect();
        if let Some(values) = values {
            return Ok(self.numeric_constant(canon::fold_nary(kind, values), &ty));
        }

        if flat.len() == 1 {
            return Ok(flat.swap_remove(0));
        }

        Ok(self.intern(kind, flat, Payload::None, ty))
    }

    fn binary_arithmetic(&self, kind: ExprKind, lhs: Expr, rhs: Expr) -> Result<Expr> {
        for arg in [&lhs, &rhs] {
            self.check_owned(arg)?;
            self.expect_numeric(kind, arg)?;
        }
        let ty = self.widest_type(kind, &[lhs.clone(), rhs.clone()])?;

        if let (Some(a), Some(b)) = (lhs.numeric_constant_value(), rhs.numeric_constant_value()) {
            if let Some(v) = canon::fold_binary(kind, &a, &b, ty.is_int_type()) {
                return Ok(self.numeric_constant(v, &ty));
            }
        }

        Ok(self.intern(kind, smallvec![lhs, rhs], Payload::None, ty))
    }

    /// Sum of at least one numeric operand.
    pub fn plus<I>(&self, args: I) -> Result<Expr>
    where
        I: IntoIterator<Item = Expr>,
    {
        self.nary_arithmetic(ExprKind::Plus, args)
    }

    /// Product of at least one numeric operand.
    pub fn times<I>(&self, args: I) -> Result<Expr>
    where
        I: IntoIterator<Item = Expr>,
    {
        self.nary_arithmetic(ExprKind::Times, args)
    }

    pub fn minus(&self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.binary_arithmetic(ExprKind::Minus, lhs, rhs)
    }

    /// Division. Literal integer divisions are folded only when exact, divisions by a literal
    /// zero are never folded.
    pub fn div(&self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.binary_arithmetic(ExprKind::Div, lhs, rhs)
    }

    // ======================== Quantifiers ========================

    fn quantifier<I>(&self, kind: ExprKind, variables: I, body: Expr) -> Result<Expr>
    where
        I: IntoIterator<Item = Variable>,
    {
        let mut variables: Vec<Variable> = variables.into_iter().collect();
        if variables.is_empty() {
            return Err(Error::Arity {
                operator: kind.to_string(),
                expected: "at least 1 bound variable".to_string(),
                got: 0,
            });
        }
        {
            let symbols = self.symbols.read();
            if let Some(v) = variables.iter().find(|v| !symbols.variables.contains(*v)) {
                return Err(Error::UnboundVariable {
                    name: v.name().to_string(),
                });
            }
        }
        self.check_owned(&body)?;
        self.expect_bool(kind, &body)?;

        variables.sort_unstable();
        variables.dedup();
        Ok(self.intern(
            kind,
            smallvec![body],
            Payload::Variables(variables),
            self.types.bool_type(),
        ))
    }

    /// `exists variables. body`
    pub fn exists<I>(&self, variables: I, body: Expr) -> Result<Expr>
    where
        I: IntoIterator<Item = Variable>,
    {
        self.quantifier(ExprKind::Exists, variables, body)
    }

    /// `forall variables. body`
    pub fn forall<I>(&self, variables: I, body: Expr) -> Result<Expr>
    where
        I: IntoIterator<Item = Variable>,
    {
        self.quantifier(ExprKind::Forall, variables, body)
    }

    // ======================== Generic construction ========================

    fn unpack<const N: usize>(kind: ExprKind, args: Vec<Expr>) -> Result<[Expr; N]> {
        args.try_into().map_err(|args: Vec<Expr>| Error::Arity {
            operator: kind.to_string(),
            expected: format!("exactly {N}"),
            got: args.len(),
        })
    }

    /// Build a node from its operator tag, children and payload.
    ///
    /// Dispatches to the typed constructors, so the result is checked and canonicalised
    /// exactly as if the constructor had been called directly. Constants built this way get
    /// the unbounded type of their kind.
    pub fn create(&self, kind: ExprKind, args: Vec<Expr>, payload: Payload) -> Result<Expr> {
        if !kind.arity().accepts(args.len()) {
            return Err(Error::Arity {
                operator: kind.to_string(),
                expected: kind.arity().to_string(),
                got: args.len(),
            });
        }

        match (kind, payload) {
            (ExprKind::BoolConstant, Payload::Bool(b)) => Ok(self.bool_constant(b)),
            (ExprKind::IntConstant, Payload::Int(i)) => Ok(self.int_constant(i)),
            (ExprKind::RealConstant, Payload::Real(r)) => Ok(self.real_constant(r)),
            (ExprKind::FluentExp, Payload::Fluent(f)) => self.fluent_exp(&f, args),
            (ExprKind::ObjectExp, Payload::Object(o)) => self.object_exp(&o),
            (ExprKind::VariableExp, Payload::Variable(v)) => self.variable_exp(&v),
            (ExprKind::TimingExp, Payload::Timing(t)) => Ok(self.timing_exp(t)),
            (ExprKind::And, Payload::None) => self.and(args),
            (ExprKind::Or, Payload::None) => self.or(args),
            (ExprKind::Not, Payload::None) => {
                let [arg] = Self::unpack(kind, args)?;
                self.not(arg)
            }
            (ExprKind::Implies, Payload::None) => {
                let [lhs, rhs] = Self::unpack(kind, args)?;
                self.implies(lhs, rhs)
            }
            (ExprKind::Iff, Payload::None) => {
                let [lhs, rhs] = Self::unpack(kind, args)?;
                self.iff(lhs, rhs)
            }
            (ExprKind::Exists, Payload::Variables(vs)) => {
                let [body] = Self::unpack(kind, args)?;
                self.exists(vs, body)
            }
            (ExprKind::Forall, Payload::Variables(vs)) => {
                let [body] = Self::unpack(kind, args)?;
                self.forall(vs, body)
            }
            (ExprKind::Equals, Payload::None) => {
                let [lhs, rhs] = Self::unpack(kind, args)?;
                self.equals(lhs, rhs)
            }
            (ExprKind::Le, Payload::None) => {
                let [lhs, rhs] = Self::unpack(kind, args)?;
                self.le(lhs, rhs)
            }
            (ExprKind::Lt, Payload::None) => {
                let [lhs, rhs] = Self::unpack(kind, args)?;
                self.lt(lhs, rhs)
            }
            (ExprKind::Plus, Payload::None) => self.plus(args),
            (ExprKind::Times, Payload::None) => self.times(args),
            (ExprKind::Minus, Payload::None) => {
                let [lhs, rhs] = Self::unpack(kind, args)?;
                self.minus(lhs, rhs)
            }
            (ExprKind::Div, Payload::None) => {
                let [lhs, rhs] = Self::unpack(kind, args)?;
                self.div(lhs, rhs)
            }
            (kind, payload) => Err(Error::InvalidPayload {
                operator: kind.to_string(),
                payload: payload.to_string(),
            }),
        }
    }

    /// Rebuild `expr` with new children, keeping its operator and payload.
    pub(crate) fn rebuild(&self, expr: &Expr, args: Vec<Expr>) -> Result<Expr> {
        self.create(expr.kind(), args, expr.payload().clone())
    }

    // ======================== Intervals ========================

    /// A duration interval whose bounds are numeric expressions of this manager.
    pub fn duration_interval(
        &self,
        lower: Expr,
        upper: Expr,
        lower_open: bool,
        upper_open: bool,
    ) -> Result<DurationInterval> {
        for bound in [&lower, &upper] {
            self.check_owned(bound)?;
            if !bound.ty().is_numeric_type() {
                return Err(type_error("duration_interval", "a numeric bound", bound.ty()));
            }
        }
        Ok(Interval::new(lower, upper, lower_open, upper_open))
    }

    /// The point interval `[duration, duration]`.
    pub fn fixed_duration(&self, duration: Expr) -> Result<DurationInterval> {
        self.duration_interval(duration.clone(), duration, false, false)
    }
}
