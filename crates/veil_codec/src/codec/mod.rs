//! The codec itself: the public [`JsonCodec`] facade plus the internal
//! writer, bound-serializer cache, and the two traversal drivers.

mod cache;
mod de;
mod ser;
mod writer;

#[cfg(test)]
mod tests;

use core::any::Any;
use std::sync::Arc;

use crate::Facet;
use crate::config::Config;
use crate::error::CodecError;
use crate::info::Ty;
use crate::registry::DescriptorRegistryArc;

use cache::SerializerCache;
use de::DeDriver;
use ser::SerDriver;

// -----------------------------------------------------------------------------
// JsonCodec

/// A JSON codec over a descriptor registry and one configuration.
///
/// The codec is cheap to share: serializer graphs are bound lazily and
/// cached per type, so repeated calls over the same types do no repeated
/// resolution work.
///
/// # Examples
///
/// ```
/// use veil_codec::codec::JsonCodec;
/// use veil_codec::config::Config;
/// use veil_codec::info::{MemberDescriptor, TypeDescriptor};
/// use veil_codec::registry::{Describe, DescriptorRegistryArc};
///
/// #[derive(Default, PartialEq, Debug)]
/// struct Point { x: i64, y: i64 }
/// veil_codec::impl_facet!(Point);
///
/// impl Describe for Point {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::structure::<Point>()
///             .zero_arg(Point::default)
///             .member(MemberDescriptor::required("x", |p: &Point| &p.x)
///                 .writable(|p: &mut Point, v| p.x = v))
///             .member(MemberDescriptor::required("y", |p: &Point| &p.y)
///                 .writable(|p: &mut Point, v| p.y = v))
///             .finish()
///     }
/// }
///
/// let registry = DescriptorRegistryArc::default();
/// registry.write().register::<Point>();
///
/// let codec = JsonCodec::new(registry, Config::default());
/// let text = codec.to_string(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(text, r#"{"x":1,"y":2}"#);
///
/// let back: Point = codec.from_str(&text).unwrap().unwrap();
/// assert_eq!(back, Point { x: 1, y: 2 });
/// ```
pub struct JsonCodec {
    registry: DescriptorRegistryArc,
    config: Arc<Config>,
    cache: SerializerCache,
}

impl JsonCodec {
    /// Creates a codec over `registry` with the given configuration.
    pub fn new(registry: DescriptorRegistryArc, config: Config) -> Self {
        Self {
            registry,
            config: Arc::new(config),
            cache: SerializerCache::new(),
        }
    }

    /// The registry this codec resolves against.
    pub fn registry(&self) -> &DescriptorRegistryArc {
        &self.registry
    }

    /// Serializes `value` to compact JSON text.
    pub fn to_string<T: Facet>(&self, value: &T) -> Result<String, CodecError> {
        self.to_string_dyn(Some(value))
    }

    /// Serializes an erased value; `None` serializes as `null`.
    pub fn to_string_dyn(&self, value: Option<&dyn Facet>) -> Result<String, CodecError> {
        let registry = self.registry.read();
        SerDriver::new(&registry, &self.config, &self.cache).write_root(value)
    }

    /// Deserializes `text` into a `T`; a `null` document yields `None`.
    pub fn from_str<T: Facet>(&self, text: &str) -> Result<Option<T>, CodecError> {
        match self.from_str_as(Ty::of::<T>(), text)? {
            None => Ok(None),
            Some(boxed) => match boxed.take::<T>() {
                Ok(value) => Ok(Some(value)),
                Err(other) => Err(CodecError::type_mismatch(
                    core::any::type_name::<T>(),
                    other.type_path(),
                    None,
                )),
            },
        }
    }

    /// Deserializes `text` with `D` as the declared type, producing
    /// whatever concrete value resolution yields.
    ///
    /// Use this when `D` is an abstract marker.
    pub fn from_str_dyn<D: Any>(&self, text: &str) -> Result<Option<Box<dyn Facet>>, CodecError> {
        self.from_str_as(Ty::of::<D>(), text)
    }

    /// Deserializes `text` against an explicit declared type.
    pub fn from_str_as(
        &self,
        declared: Ty,
        text: &str,
    ) -> Result<Option<Box<dyn Facet>>, CodecError> {
        let registry = self.registry.read();
        DeDriver::new(&registry, &self.config, &self.cache).read_root(declared, text)
    }
}
