use core::any::{Any, TypeId};
use core::fmt;

// -----------------------------------------------------------------------------
// Ty

/// A lightweight type handle: [`TypeId`] plus the full type path.
///
/// # Example
///
/// ```
/// use veil_codec::info::Ty;
///
/// let ty = Ty::of::<String>();
/// assert!(ty.is::<String>());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ty {
    id: TypeId,
    path: &'static str,
}

impl Ty {
    /// Creates a `Ty` for the given type.
    ///
    /// Abstract markers are plain `'static` types, so any `T: Any` is
    /// accepted here, not only [`Facet`](crate::Facet) implementors.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
        }
    }

    pub(crate) fn from_parts(id: TypeId, path: &'static str) -> Self {
        Self { id, path }
    }

    /// Returns the [`TypeId`].
    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type path.
    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Check if the given type matches this one, by [`TypeId`] only.
    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        TypeId::of::<T>() == self.id
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ty({})", self.path)
    }
}
