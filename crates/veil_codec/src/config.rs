//! Per-codec configuration: programmatic type mappings, scalar overrides,
//! the cipher, and the root encryption switch.

use core::any::{Any, TypeId};
use std::sync::Arc;

use crate::Facet;
use crate::cipher::Cipher;
use crate::hash::{FixedHashState, HashMap, TypeIdMap};
use crate::info::{ScalarConverter, Ty};

// -----------------------------------------------------------------------------
// Config

/// Configuration of one codec instance.
///
/// Mappings declared here outrank the declarative markers on the types
/// themselves: a by-member mapping wins over a by-type mapping, which wins
/// over anything the descriptors say.
///
/// # Examples
///
/// ```
/// use veil_codec::config::Config;
///
/// struct Shape;
/// struct Circle { radius: f64 }
/// veil_codec::impl_facet!(Circle);
///
/// let config = Config::builder()
///     .map_type::<Shape, Circle>()
///     .encrypt_root(false)
///     .build();
/// ```
pub struct Config {
    by_member: HashMap<(TypeId, &'static str), Ty>,
    by_type: TypeIdMap<Ty>,
    scalars: TypeIdMap<Arc<ScalarConverter>>,
    cipher: Option<Arc<dyn Cipher>>,
    encrypt_root: bool,
    redact_enabled: bool,
}

impl Default for Config {
    /// See [`Config::builder`].
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    /// Starts a builder with no mappings, no cipher, and redaction enabled.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            inner: Config {
                by_member: HashMap::with_hasher(FixedHashState),
                by_type: TypeIdMap::new(),
                scalars: TypeIdMap::new(),
                cipher: None,
                encrypt_root: false,
                redact_enabled: true,
            },
        }
    }

    /// The by-member mapping for `member` of the owner type, if declared.
    pub(crate) fn mapping_for_member(&self, owner: TypeId, member: &'static str) -> Option<Ty> {
        self.by_member.get(&(owner, member)).copied()
    }

    /// The by-type mapping for the declared type, if declared.
    pub(crate) fn mapping_for_type(&self, declared: TypeId) -> Option<Ty> {
        self.by_type.get(&declared).copied()
    }

    /// The scalar converter override for the given type, if declared.
    pub(crate) fn scalar_override(&self, type_id: TypeId) -> Option<&Arc<ScalarConverter>> {
        self.scalars.get(&type_id)
    }

    /// The configured cipher, if any.
    pub(crate) fn cipher_ref(&self) -> Option<&dyn Cipher> {
        self.cipher.as_deref()
    }

    /// Whether the whole document is encrypted regardless of type markers.
    #[inline]
    pub(crate) const fn encrypt_root(&self) -> bool {
        self.encrypt_root
    }

    /// Whether redact markers are honored on write.
    #[inline]
    pub(crate) const fn redact_enabled(&self) -> bool {
        self.redact_enabled
    }
}

// -----------------------------------------------------------------------------
// ConfigBuilder

/// Builder for [`Config`].
pub struct ConfigBuilder {
    inner: Config,
}

impl ConfigBuilder {
    /// Maps member `name` of owner `O`, wherever its declared type would
    /// apply, to the concrete type `C`.
    ///
    /// `name` is the member's internal name, not its wire name. This is
    /// the strongest resolution source.
    pub fn map_member<O: Facet, C: Facet>(mut self, name: &'static str) -> Self {
        self.inner
            .by_member
            .insert((TypeId::of::<O>(), name), Ty::of::<C>());
        self
    }

    /// Maps every occurrence of the declared type `D` to the concrete
    /// type `C`.
    pub fn map_type<D: Any, C: Facet>(mut self) -> Self {
        self.inner.by_type.insert(TypeId::of::<D>(), Ty::of::<C>());
        self
    }

    /// Overrides how values of type `T` are converted to and from tokens.
    ///
    /// Wins over the registered descriptor for `T`, including for
    /// non-scalar registrations.
    pub fn scalar<T: Facet>(mut self, converter: ScalarConverter) -> Self {
        self.inner
            .scalars
            .insert(TypeId::of::<T>(), Arc::new(converter));
        self
    }

    /// Installs the cipher used by every encrypt marker.
    pub fn cipher(mut self, cipher: impl Cipher + 'static) -> Self {
        self.inner.cipher = Some(Arc::new(cipher));
        self
    }

    /// Encrypts the whole document, independent of type markers.
    pub fn encrypt_root(mut self, enabled: bool) -> Self {
        self.inner.encrypt_root = enabled;
        self
    }

    /// Enables or disables redact markers (enabled by default).
    pub fn redact_enabled(mut self, enabled: bool) -> Self {
        self.inner.redact_enabled = enabled;
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> Config {
        self.inner
    }
}
