use crate::Facet;
use crate::error::CodecError;
use crate::info::Ty;

// -----------------------------------------------------------------------------
// ParamSpec

/// One constructor parameter: a name to bind incoming members against,
/// and a default used when the document never supplied a value.
#[derive(Debug)]
pub struct ParamSpec {
    name: &'static str,
    ty: Ty,
    default: fn() -> Box<dyn Facet>,
}

impl ParamSpec {
    /// Creates a parameter of type `T`.
    pub fn new<T: Facet + Default>(name: &'static str) -> Self {
        Self {
            name,
            ty: Ty::of::<T>(),
            default: || Box::new(T::default()),
        }
    }

    /// The parameter name; matched case-insensitively against member names.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The parameter's declared type.
    #[inline]
    pub const fn ty(&self) -> Ty {
        self.ty
    }
}

// -----------------------------------------------------------------------------
// ArgSlots

/// Positional argument slots handed to a constructor's invoke function.
///
/// Slots the document never filled fall back to the parameter default,
/// mirroring construct-then-assign semantics for absent members.
pub struct ArgSlots<'a> {
    specs: &'a [ParamSpec],
    slots: Vec<Option<Box<dyn Facet>>>,
}

impl<'a> ArgSlots<'a> {
    pub(crate) fn new(specs: &'a [ParamSpec], slots: Vec<Option<Box<dyn Facet>>>) -> Self {
        debug_assert_eq!(specs.len(), slots.len());
        Self { specs, slots }
    }

    /// Takes the argument at `index` as a `T`.
    pub fn take<T: Facet>(&mut self, index: usize) -> Result<T, CodecError> {
        let spec = self
            .specs
            .get(index)
            .ok_or_else(|| CodecError::unexpected("a declared parameter", "constructor"))?;
        let value = match self.slots.get_mut(index).and_then(Option::take) {
            Some(value) => value,
            None => (spec.default)(),
        };
        value
            .take::<T>()
            .map_err(|_| CodecError::unexpected("the parameter's declared type", spec.name))
    }
}

// -----------------------------------------------------------------------------
// ConstructorSpec

type InvokeFn = Box<dyn Fn(&mut ArgSlots<'_>) -> Result<Box<dyn Facet>, CodecError> + Send + Sync>;

/// One declared constructor: ordered parameters plus the invoke thunk.
///
/// # Example
///
/// ```
/// use veil_codec::impl_facet;
/// use veil_codec::info::{ConstructorSpec, ParamSpec};
///
/// struct Account { id: i64, owner: String }
/// impl_facet!(Account);
///
/// let ctor = ConstructorSpec::new(
///     [ParamSpec::new::<i64>("id"), ParamSpec::new::<String>("owner")],
///     |args| {
///         Ok(Box::new(Account {
///             id: args.take(0)?,
///             owner: args.take(1)?,
///         }))
///     },
/// );
/// assert_eq!(ctor.params().len(), 2);
/// ```
pub struct ConstructorSpec {
    params: Vec<ParamSpec>,
    designated: bool,
    invoke: InvokeFn,
}

impl ConstructorSpec {
    /// Creates a constructor from its parameter list and invoke function.
    pub fn new(
        params: impl IntoIterator<Item = ParamSpec>,
        invoke: impl Fn(&mut ArgSlots<'_>) -> Result<Box<dyn Facet>, CodecError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            params: params.into_iter().collect(),
            designated: false,
            invoke: Box::new(invoke),
        }
    }

    /// Marks this constructor as the designated one for deserialization.
    pub fn designated(mut self) -> Self {
        self.designated = true;
        self
    }

    /// The ordered parameter list.
    #[inline]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Whether this constructor carries the designated marker.
    #[inline]
    pub const fn is_designated(&self) -> bool {
        self.designated
    }

    /// Invokes the constructor over the filled slots.
    pub fn invoke(&self, args: &mut ArgSlots<'_>) -> Result<Box<dyn Facet>, CodecError> {
        (self.invoke)(args)
    }
}

impl core::fmt::Debug for ConstructorSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConstructorSpec")
            .field("params", &self.params)
            .field("designated", &self.designated)
            .finish_non_exhaustive()
    }
}
