//! Runtime type and capability identifiers.
//!
//! A [`Kind`] answers the question "does this node satisfy type X?". Every
//! component has the kind of its concrete payload type and may declare extra
//! capability kinds through [`Component::kinds`](crate::Component::kinds),
//! typically marker types or `dyn Trait` types.
//!
//! [`AncestorKey`] is what lookups and monitors are keyed by: either a kind,
//! or [`AncestorKey::Root`] for "the root of the tree".

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A type or capability identifier.
///
/// Two kinds are equal when they were created from the same type.
#[derive(Clone, Copy)]
pub struct Kind {
    id: TypeId,
    name: &'static str,
}

impl Kind {
    /// The kind of type `T`.
    ///
    /// `T` may be unsized, so `Kind::of::<dyn Presenter>()` is a valid
    /// capability kind.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` behind this kind.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The full type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path.
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Kind {}

impl Hash for Kind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind({})", self.name)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Key of an ancestor lookup or monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AncestorKey {
    /// The root of the tree: the first ancestor that has no parent.
    Root,
    /// The nearest ancestor satisfying the kind.
    Kind(Kind),
}

impl AncestorKey {
    /// Key for the nearest ancestor satisfying type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Kind(Kind::of::<T>())
    }

    /// Human-readable description used in error messages and debug output.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Kind(kind) => kind.short_name(),
        }
    }
}

impl From<Kind> for AncestorKey {
    fn from(kind: Kind) -> Self {
        Self::Kind(kind)
    }
}

impl fmt::Display for AncestorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Strip the module path from a type name, keeping generic arguments intact.
pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    let base_end = name.find('<').unwrap_or(name.len());
    match name[..base_end].rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}
