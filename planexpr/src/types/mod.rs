//! Types module
//!
//! Canonical representation of the types carried by expressions. A [`TypeManager`] owns a
//! registry that deduplicates type descriptions ([`TypeKind`]) and hands out [`Type`] handles.
//! Because the registry never creates two handles for the same description, handles compare by
//! identity: `a == b` is a pointer comparison.
//!
//! - Primitive types: `bool`, `integer` and `real`, the numeric ones with optional bounds.
//! - User types: named, optionally refining a father user type.
//! - [`CompatibilityRules`] decide subtyping and numeric widening.
use std::{
    collections::{HashMap, hash_map::Entry},
    hash::{DefaultHasher, Hash, Hasher},
    sync::Arc,
};

use log::{debug, info};
use num_bigint::BigInt;
use num_rational::BigRational;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use smallvec::{SmallVec, smallvec};

use crate::error::{Error, Result};
use crate::utils::next_context_id;

mod compat;
mod kind;

pub use compat::CompatibilityRules;
pub use kind::TypeKind;

struct TypeData {
    kind: TypeKind,
    manager: u64,
    seq: u32,
}

/// A canonical type handle issued by a [`TypeManager`].
///
/// Cloning is cheap (reference counted). Equality, hashing and ordering are by identity, which
/// coincides with structural equality thanks to the registry's deduplication.
#[derive(Clone)]
pub struct Type(Arc<TypeData>);

impl Type {
    /// The description of this type.
    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    #[inline]
    pub fn is_bool_type(&self) -> bool {
        self.kind().is_bool()
    }

    #[inline]
    pub fn is_int_type(&self) -> bool {
        self.kind().is_int()
    }

    #[inline]
    pub fn is_real_type(&self) -> bool {
        self.kind().is_real()
    }

    #[inline]
    pub fn is_numeric_type(&self) -> bool {
        self.kind().is_numeric()
    }

    #[inline]
    pub fn is_user_type(&self) -> bool {
        self.kind().is_user()
    }

    /// Name of a user type, `None` for primitive types.
    pub fn name(&self) -> Option<&str> {
        match self.kind() {
            TypeKind::User { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Direct father of a user type.
    pub fn father(&self) -> Option<&Type> {
        match self.kind() {
            TypeKind::User { father, .. } => father.as_ref(),
            _ => None,
        }
    }

    /// Iterate over the strict ancestors of a user type, closest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Type> + '_ {
        std::iter::successors(self.father().cloned(), |t| t.father().cloned())
    }

    /// Lower bound of an integer type.
    pub fn int_lower_bound(&self) -> Option<&BigInt> {
        match self.kind() {
            TypeKind::Int { lower, .. } => lower.as_ref(),
            _ => None,
        }
    }

    /// Upper bound of an integer type.
    pub fn int_upper_bound(&self) -> Option<&BigInt> {
        match self.kind() {
            TypeKind::Int { upper, .. } => upper.as_ref(),
            _ => None,
        }
    }

    /// Lower bound of a real type.
    pub fn real_lower_bound(&self) -> Option<&BigRational> {
        match self.kind() {
            TypeKind::Real { lower, .. } => lower.as_ref(),
            _ => None,
        }
    }

    /// Upper bound of a real type.
    pub fn real_upper_bound(&self) -> Option<&BigRational> {
        match self.kind() {
            TypeKind::Real { upper, .. } => upper.as_ref(),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn manager_id(&self) -> u64 {
        self.0.manager
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl PartialOrd for Type {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Type {
    /// Registration order within a manager; types of distinct managers are ordered by manager.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.0.manager, self.0.seq).cmp(&(other.0.manager, other.0.seq))
    }
}

impl std::fmt::Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Type({})", self.kind())
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind().fmt(f)
    }
}

#[derive(Default)]
struct TypeTable {
    inverse_lookup: HashMap<u64, SmallVec<[Type; 1]>>,
    user_types: HashMap<String, Type>,
    len: u32,
}

/// Registry of every type used by an environment.
///
/// Example:
/// ```rust
/// # use planexpr::types::TypeManager;
/// let tm = TypeManager::new();
/// assert_eq!(tm.int_type(), tm.int_type());
/// assert_ne!(tm.int_type(), tm.real_type());
///
/// let location = tm.declare_user_type("Location", None).unwrap();
/// assert_eq!(tm.user_type("Location"), Some(location));
/// ```
///
/// # A note on concurrency
/// Lookups and insertions happen under a single upgradable read lock which is upgraded to a
/// write lock only when a new type must be inserted. Two threads asking for the same new type
/// therefore receive the same handle.
pub struct TypeManager {
    id: u64,
    table: RwLock<TypeTable>,
    rules: CompatibilityRules,
    bool_type: Type,
    int_type: Type,
    real_type: Type,
}

impl Default for TypeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeManager {
    fn hash_kind(kind: &TypeKind) -> u64 {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        hasher.finish()
    }

    /// Create a manager with the default [`CompatibilityRules`].
    pub fn new() -> Self {
        Self::with_rules(CompatibilityRules::default())
    }

    /// Create a manager using the given compatibility matrix.
    pub fn with_rules(rules: CompatibilityRules) -> Self {
        let id = next_context_id();
        let mut table = TypeTable::default();
        let bool_type = Self::insert_locked(id, &mut table, TypeKind::Bool);
        let int_type = Self::insert_locked(
            id,
            &mut table,
            TypeKind::Int {
                lower: None,
                upper: None,
            },
        );
        let real_type = Self::insert_locked(
            id,
            &mut table,
            TypeKind::Real {
                lower: None,
                upper: None,
            },
        );

        Self {
            id,
            table: RwLock::new(table),
            rules,
            bool_type,
            int_type,
            real_type,
        }
    }

    /// The compatibility matrix in use.
    #[inline]
    pub fn rules(&self) -> &CompatibilityRules {
        &self.rules
    }

    /// Number of distinct types registered so far.
    pub fn len(&self) -> usize {
        self.table.read().len as usize
    }

    /// Always `false`: the primitive types are registered on creation.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_locked(manager: u64, table: &mut TypeTable, kind: TypeKind) -> Type {
        let h = Self::hash_kind(&kind);
        let ty = Type(Arc::new(TypeData {
            kind,
            manager,
            seq: table.len,
        }));
        table.len += 1;

        match table.inverse_lookup.entry(h) {
            Entry::Occupied(mut bucket) => {
                info!(
                    "Detected an hash collision on hash 0x{:016x}. The following types collided: {}",
                    h,
                    bucket
                        .get()
                        .iter()
                        .chain(std::iter::once(&ty))
                        .map(|t| t.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                );
                bucket.get_mut().push(ty.clone());
            }
            Entry::Vacant(bucket) => {
                debug!("New type registered: {}.", ty);
                bucket.insert(smallvec![ty.clone()]);
            }
        }

        if let TypeKind::User { name, .. } = ty.kind() {
            table.user_types.insert(name.clone(), ty.clone());
        }

        ty
    }

    /// Return the canonical handle for `kind`, inserting it if it is new.
    fn search_or_insert(&self, kind: TypeKind) -> Type {
        let h = Self::hash_kind(&kind);
        let table = self.table.upgradable_read();

        if let Some(bucket) = table.inverse_lookup.get(&h) {
            if let Some(ty) = bucket.iter().find(|t| t.kind() == &kind) {
                return ty.clone();
            }
        }

        let mut table = RwLockUpgradableReadGuard::upgrade(table);
        Self::insert_locked(self.id, &mut table, kind)
    }

    /// The boolean type.
    #[inline]
    pub fn bool_type(&self) -> Type {
        self.bool_type.clone()
    }

    /// The unbounded integer type.
    #[inline]
    pub fn int_type(&self) -> Type {
        self.int_type.clone()
    }

    /// The unbounded real type.
    #[inline]
    pub fn real_type(&self) -> Type {
        self.real_type.clone()
    }

    /// An integer type with optional inclusive bounds.
    pub fn int_type_with_bounds(
        &self,
        lower: Option<BigInt>,
        upper: Option<BigInt>,
    ) -> Result<Type> {
        if let (Some(l), Some(u)) = (&lower, &upper) {
            if l > u {
                return Err(Error::InvalidBounds {
                    lower: l.to_string(),
                    upper: u.to_string(),
                });
            }
        }
        Ok(self.search_or_insert(TypeKind::Int { lower, upper }))
    }

    /// A real type with optional inclusive bounds.
    pub fn real_type_with_bounds(
        &self,
        lower: Option<BigRational>,
        upper: Option<BigRational>,
    ) -> Result<Type> {
        if let (Some(l), Some(u)) = (&lower, &upper) {
            if l > u {
                return Err(Error::InvalidBounds {
                    lower: l.to_string(),
                    upper: u.to_string(),
                });
            }
        }
        Ok(self.search_or_insert(TypeKind::Real { lower, upper }))
    }

    /// Declare a user type, optionally refining `father`.
    ///
    /// Redeclaring a name with the same father returns the existing handle; redeclaring it with
    /// another father fails with [`Error::DuplicateType`].
    pub fn declare_user_type(&self, name: &str, father: Option<&Type>) -> Result<Type> {
        if let Some(father) = father {
            self.check_declared(father)?;
            if !father.is_user_type() {
                return Err(Error::Type {
                    operator: format!("declare_user_type({name})"),
                    expected: "a user-defined father type".to_string(),
                    got: father.to_string(),
                });
            }
        }

        let table = self.table.upgradable_read();
        if let Some(existing) = table.user_types.get(name) {
            return if existing.father() == father {
                Ok(existing.clone())
            } else {
                let show = |t: Option<&Type>| t.map_or_else(|| "<none>".to_string(), Type::to_string);
                Err(Error::DuplicateType {
                    name: name.to_string(),
                    existing: show(existing.father()),
                    requested: show(father),
                })
            };
        }

        let mut table = RwLockUpgradableReadGuard::upgrade(table);
        Ok(Self::insert_locked(
            self.id,
            &mut table,
            TypeKind::User {
                name: name.to_string(),
                father: father.cloned(),
            },
        ))
    }

    /// Look up a previously declared user type.
    pub fn user_type(&self, name: &str) -> Option<Type> {
        self.table.read().user_types.get(name).cloned()
    }

    /// Whether `ty` was issued by this manager.
    #[inline]
    pub fn is_declared(&self, ty: &Type) -> bool {
        ty.manager_id() == self.id
    }

    pub(crate) fn check_declared(&self, ty: &Type) -> Result<()> {
        if self.is_declared(ty) {
            Ok(())
        } else {
            Err(Error::UnknownType {
                name: ty.to_string(),
            })
        }
    }

    /// Whether a value of type `from` can be used where `to` is expected.
    ///
    /// True when the types are identical, when `from` is a (transitive) user subtype of `to`,
    /// or when `from` is a numeric type widening to `to` under the current rules.
    #[inline]
    pub fn is_compatible(&self, from: &Type, to: &Type) -> bool {
        self.rules.is_compatible(from, to)
    }
}
