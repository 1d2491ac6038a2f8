use crate::Facet;
use crate::error::CodecError;
use crate::info::Ty;

// -----------------------------------------------------------------------------
// Accessor thunks

/// Reads a member off its owner; `None` means the member is absent and
/// emits nothing.
pub type GetFn = Box<dyn for<'a> Fn(&'a dyn Facet) -> Option<&'a dyn Facet> + Send + Sync>;

/// Writes a member back onto its owner.
pub type SetFn = Box<dyn Fn(&mut dyn Facet, Box<dyn Facet>) -> Result<(), CodecError> + Send + Sync>;

// -----------------------------------------------------------------------------
// MemberDescriptor

/// One serializable member of a struct type.
///
/// Carries the wire name (possibly renamed), the declared type, the
/// getter/setter thunks, and the declarative markers: `encrypt`,
/// `redact`, and an optional member-local type mapping.
///
/// A member without a setter is read-only: it is populated only through
/// constructor injection, never assigned afterwards.
///
/// # Example
///
/// ```
/// use veil_codec::impl_facet;
/// use veil_codec::info::MemberDescriptor;
///
/// struct Account { id: i64 }
/// impl_facet!(Account);
///
/// let member = MemberDescriptor::required("id", |a: &Account| &a.id)
///     .writable(|a: &mut Account, v| a.id = v)
///     .rename("accountId");
///
/// assert_eq!(member.wire_name(), "accountId");
/// ```
pub struct MemberDescriptor {
    name: &'static str,
    wire_name: &'static str,
    declared: Ty,
    encrypt: bool,
    redact: bool,
    mapping: Option<Ty>,
    get: GetFn,
    set: Option<SetFn>,
}

impl MemberDescriptor {
    fn with_getter(name: &'static str, declared: Ty, get: GetFn) -> Self {
        Self {
            name,
            wire_name: name,
            declared,
            encrypt: false,
            redact: false,
            mapping: None,
            get,
            set: None,
        }
    }

    /// A member that is always present.
    pub fn required<O, F>(name: &'static str, get: fn(&O) -> &F) -> Self
    where
        O: Facet,
        F: Facet,
    {
        Self::with_getter(
            name,
            Ty::of::<F>(),
            Box::new(move |owner| {
                owner
                    .downcast_ref::<O>()
                    .map(|owner| get(owner) as &dyn Facet)
            }),
        )
    }

    /// A member that may be absent; `None` emits nothing on write and an
    /// absent or `null` input leaves it untouched on read.
    pub fn optional<O, F>(name: &'static str, get: fn(&O) -> Option<&F>) -> Self
    where
        O: Facet,
        F: Facet,
    {
        Self::with_getter(
            name,
            Ty::of::<F>(),
            Box::new(move |owner| {
                owner
                    .downcast_ref::<O>()
                    .and_then(|owner| get(owner).map(|field| field as &dyn Facet))
            }),
        )
    }

    /// A polymorphic member: the declared type is the abstract marker
    /// `M`, the stored value is a boxed [`Facet`] of whatever concrete
    /// type resolution produced.
    pub fn poly<M, O>(name: &'static str, get: fn(&O) -> Option<&dyn Facet>) -> Self
    where
        M: core::any::Any,
        O: Facet,
    {
        Self::with_getter(
            name,
            Ty::of::<M>(),
            Box::new(move |owner| owner.downcast_ref::<O>().and_then(get)),
        )
    }

    /// Attaches a setter, making the member writable.
    pub fn writable<O, F>(mut self, set: fn(&mut O, F)) -> Self
    where
        O: Facet,
        F: Facet,
    {
        let name = self.name;
        self.set = Some(Box::new(move |owner, value| {
            let owner = owner
                .downcast_mut::<O>()
                .ok_or_else(|| CodecError::unexpected("the owning struct", name))?;
            let value = value
                .take::<F>()
                .map_err(|_| CodecError::unexpected("the member's declared type", name))?;
            set(owner, value);
            Ok(())
        }));
        self
    }

    /// Attaches a setter for a polymorphic member.
    pub fn writable_poly<O>(mut self, set: fn(&mut O, Box<dyn Facet>)) -> Self
    where
        O: Facet,
    {
        let name = self.name;
        self.set = Some(Box::new(move |owner, value| {
            let owner = owner
                .downcast_mut::<O>()
                .ok_or_else(|| CodecError::unexpected("the owning struct", name))?;
            set(owner, value);
            Ok(())
        }));
        self
    }

    /// Overrides the wire name.
    pub fn rename(mut self, wire_name: &'static str) -> Self {
        self.wire_name = wire_name;
        self
    }

    /// Flags the member's subtree for encryption.
    pub fn encrypt(mut self) -> Self {
        self.encrypt = true;
        self
    }

    /// Flags the member for redacted output.
    pub fn redact(mut self) -> Self {
        self.redact = true;
        self
    }

    /// Attaches a member-local type mapping (the member-attribute
    /// resolution source).
    pub fn mapped<C: Facet>(mut self) -> Self {
        self.mapping = Some(Ty::of::<C>());
        self
    }

    /// The member's internal name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The member's key in the serialized document.
    #[inline]
    pub const fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    /// The declared (possibly abstract) type.
    #[inline]
    pub const fn declared(&self) -> Ty {
        self.declared
    }

    /// Whether the member carries the encrypt marker.
    #[inline]
    pub const fn is_encrypt(&self) -> bool {
        self.encrypt
    }

    /// Whether the member carries the redact marker.
    #[inline]
    pub const fn is_redact(&self) -> bool {
        self.redact
    }

    /// The member-local mapping attribute, if any.
    #[inline]
    pub const fn mapping(&self) -> Option<Ty> {
        self.mapping
    }

    /// Whether the member can be assigned after construction.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    /// Reads the member off `owner`.
    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Facet) -> Option<&'a dyn Facet> {
        (self.get)(owner)
    }

    /// Assigns the member on `owner`.
    pub fn set(&self, owner: &mut dyn Facet, value: Box<dyn Facet>) -> Result<(), CodecError> {
        match &self.set {
            Some(set) => set(owner, value),
            None => Err(CodecError::unexpected("a writable member", self.name)),
        }
    }
}

impl core::fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("declared", &self.declared)
            .field("encrypt", &self.encrypt)
            .field("redact", &self.redact)
            .finish_non_exhaustive()
    }
}
