//! The descriptor registry: the central store of [`TypeDescriptor`]s that
//! both directions of the codec resolve against.

use core::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Facet;
use crate::hash::{HashMap, TypeIdMap};
use crate::info::TypeDescriptor;

// -----------------------------------------------------------------------------
// Describe

/// A type that can describe its own structure.
///
/// Implementations build a [`TypeDescriptor`] once; the registry stores it
/// and every codec built over that registry shares it read-only.
pub trait Describe: Facet {
    /// Builds the descriptor for this type.
    fn describe() -> TypeDescriptor;

    /// Registers the types this type's members refer to.
    ///
    /// Called once, right after this type's own descriptor is inserted.
    fn register_dependencies(registry: &mut DescriptorRegistry) {
        let _ = registry;
    }
}

// -----------------------------------------------------------------------------
// DescriptorRegistry

/// A registry of described types.
///
/// [Registering] a type stores its [`TypeDescriptor`] keyed by [`TypeId`]
/// and by full type path. Dependencies are registered recursively, and
/// duplicate registrations are ignored.
///
/// # Examples
///
/// ```
/// use veil_codec::registry::DescriptorRegistry;
///
/// let registry = DescriptorRegistry::new();
///
/// let descriptor = registry.get_with_path("alloc::string::String").unwrap();
/// assert_eq!(descriptor.type_path(), "alloc::string::String");
/// ```
///
/// [Registering]: DescriptorRegistry::register
pub struct DescriptorRegistry {
    table: TypeIdMap<Arc<TypeDescriptor>>,
    path_to_id: HashMap<&'static str, TypeId>,
}

impl Default for DescriptorRegistry {
    /// See [`DescriptorRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorRegistry {
    /// Creates an empty registry, without even the primitive scalars.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            table: TypeIdMap::new(),
            path_to_id: HashMap::with_hasher(crate::hash::FixedHashState),
        }
    }

    /// Creates a registry with the primitive scalars pre-registered.
    ///
    /// - `bool` `char` `String`
    /// - `i8 - i64` `isize`
    /// - `u8 - u64` `usize`
    /// - `f32` `f64`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<bool>();
        registry.register::<char>();
        registry.register::<String>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<isize>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<usize>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry
    }

    // Returns `true` only when the key was vacant and the descriptor was
    // inserted.
    fn register_internal(
        &mut self,
        type_id: TypeId,
        describe: impl FnOnce() -> TypeDescriptor,
    ) -> bool {
        let Self { table, path_to_id } = self;
        table.try_insert(type_id, || {
            let descriptor = describe();
            path_to_id.insert(descriptor.type_path(), type_id);
            Arc::new(descriptor)
        })
    }

    /// Registers `T` if it has not been registered already.
    ///
    /// This also recursively registers the member types named by
    /// [`Describe::register_dependencies`]. If `T` is already present,
    /// neither it nor its dependencies are touched.
    pub fn register<T: Describe>(&mut self) {
        if self.register_internal(TypeId::of::<T>(), T::describe) {
            T::register_dependencies(self);
        }
    }

    /// Inserts a descriptor built elsewhere if its type is not yet registered.
    ///
    /// Returns `true` if the descriptor was inserted. Dependencies are
    /// not registered; use [`register`](Self::register) for that.
    pub fn try_insert(&mut self, descriptor: TypeDescriptor) -> bool {
        self.register_internal(descriptor.id(), || descriptor)
    }

    /// Registers every type submitted through
    /// [`submit_descriptor!`](crate::submit_descriptor).
    ///
    /// Repeated calls are cheap and never insert duplicates. Returns `true`
    /// when collection ran; without the `auto_register` feature this is a
    /// no-op returning `false`.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            for submission in inventory::iter::<DescriptorSubmission> {
                (submission.register)(self);
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Whether the type with the given [`TypeId`] has been registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.table.contains(&type_id)
    }

    /// Returns the descriptor for the given [`TypeId`], if registered.
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&Arc<TypeDescriptor>> {
        self.table.get(&type_id)
    }

    /// Returns the descriptor for the given full type path, if registered.
    pub fn get_with_path(&self, type_path: &str) -> Option<&Arc<TypeDescriptor>> {
        match self.path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no types are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Iterates over the registered descriptors.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Arc<TypeDescriptor>> {
        self.table.values()
    }
}

// -----------------------------------------------------------------------------
// DescriptorRegistryArc

/// A shared, lock-guarded [`DescriptorRegistry`].
#[derive(Clone)]
pub struct DescriptorRegistryArc {
    /// The wrapped [`DescriptorRegistry`].
    pub internal: Arc<RwLock<DescriptorRegistry>>,
}

impl Default for DescriptorRegistryArc {
    /// Wraps [`DescriptorRegistry::new`].
    fn default() -> Self {
        Self {
            internal: Arc::new(RwLock::new(DescriptorRegistry::new())),
        }
    }
}

impl DescriptorRegistryArc {
    /// Takes a read lock on the underlying registry.
    pub fn read(&self) -> RwLockReadGuard<'_, DescriptorRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying registry.
    pub fn write(&self) -> RwLockWriteGuard<'_, DescriptorRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for DescriptorRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.internal
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .path_to_id
            .keys()
            .fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Auto registration

/// A registration hook collected at link time.
#[cfg(feature = "auto_register")]
pub struct DescriptorSubmission {
    /// Runs the registration.
    pub register: fn(&mut DescriptorRegistry),
}

#[cfg(feature = "auto_register")]
inventory::collect!(DescriptorSubmission);

#[cfg(feature = "auto_register")]
#[doc(hidden)]
pub use inventory;

/// Submits a [`Describe`] type for collection by
/// [`DescriptorRegistry::auto_register`].
///
/// # Examples
///
/// ```ignore
/// veil_codec::submit_descriptor!(Point);
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! submit_descriptor {
    ($ty:ty) => {
        $crate::registry::inventory::submit! {
            $crate::registry::DescriptorSubmission {
                register: |registry| registry.register::<$ty>(),
            }
        }
    };
}
