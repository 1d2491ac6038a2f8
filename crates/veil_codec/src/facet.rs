use core::any::{Any, TypeId};
use core::fmt;

// -----------------------------------------------------------------------------
// Facet

/// The dynamic value handle every codec-visible type implements.
///
/// A `Facet` is a value the object serializer can traverse without
/// compile-time type information: it exposes the [`Any`] casting surface
/// and a stable type path for diagnostics. Structural knowledge about the
/// type (members, constructors, markers) lives in its
/// [`TypeDescriptor`](crate::info::TypeDescriptor), not here.
///
/// Implement it with [`impl_facet!`](crate::impl_facet):
///
/// ```
/// use veil_codec::impl_facet;
///
/// struct Point { x: i64, y: i64 }
/// impl_facet!(Point);
/// ```
pub trait Facet: Any + Send + Sync {
    /// Casts to [`Any`] by reference.
    fn as_any(&self) -> &dyn Any;

    /// Casts to [`Any`] by mutable reference.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Casts to a boxed [`Any`].
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// The full path of the underlying type, for diagnostics.
    fn type_path(&self) -> &'static str;

    /// The [`TypeId`] of the underlying value.
    ///
    /// Note that `Any::type_id` on a `Box<dyn Facet>` reports the box,
    /// not the inner value; this method always reports the inner value.
    fn ty_id(&self) -> TypeId {
        self.as_any().type_id()
    }
}

impl dyn Facet {
    /// Whether the inner value is a `T`.
    #[inline]
    pub fn is<T: Facet>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Downcasts to a shared `T` reference.
    #[inline]
    pub fn downcast_ref<T: Facet>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts to a mutable `T` reference.
    #[inline]
    pub fn downcast_mut<T: Facet>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Downcasts the box, returning it untouched on mismatch.
    pub fn downcast<T: Facet>(self: Box<Self>) -> Result<Box<T>, Box<dyn Facet>> {
        if self.is::<T>() {
            // Checked above, the second downcast cannot fail.
            match self.into_any().downcast::<T>() {
                Ok(value) => Ok(value),
                Err(_) => unreachable!("ty_id matched but downcast failed"),
            }
        } else {
            Err(self)
        }
    }

    /// Takes the inner value out of the box, returning the box on mismatch.
    pub fn take<T: Facet>(self: Box<Self>) -> Result<T, Box<dyn Facet>> {
        self.downcast::<T>().map(|boxed| *boxed)
    }
}

impl fmt::Debug for dyn Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Facet({})", self.type_path())
    }
}

/// Implements [`Facet`] for one or more concrete types.
///
/// The types must be `Send + Sync + 'static`.
#[macro_export]
macro_rules! impl_facet {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Facet for $ty {
                #[inline]
                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                #[inline]
                fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                    self
                }

                #[inline]
                fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                    self
                }

                #[inline]
                fn type_path(&self) -> &'static str {
                    ::core::any::type_name::<$ty>()
                }
            }
        )*
    };
}
