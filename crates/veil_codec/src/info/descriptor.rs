use core::any::{Any, TypeId};
use core::marker::PhantomData;
use std::sync::Arc;

use crate::Facet;
use crate::error::CodecError;
use crate::info::{ConstructorSpec, MemberDescriptor, ScalarConverter, Ty};

// -----------------------------------------------------------------------------
// TypeKind

/// Produces a fresh instance, type-erased.
pub type MakeFn = Box<dyn Fn() -> Box<dyn Facet> + Send + Sync>;

type PushFn = Box<dyn Fn(&mut dyn Facet, Box<dyn Facet>) -> Result<(), CodecError> + Send + Sync>;
type IterFn = Box<
    dyn for<'a> Fn(&'a dyn Facet) -> Box<dyn Iterator<Item = &'a dyn Facet> + 'a> + Send + Sync,
>;

/// The structural kind of a registered type.
pub enum TypeKind {
    /// A named-member aggregate.
    Struct(StructLayout),
    /// An abstract declared type: never instantiated itself, only a
    /// resolution source for a concrete mapping.
    Abstract(AbstractLayout),
    /// A terminal value handled by a [`ScalarConverter`].
    Scalar(Arc<ScalarConverter>),
    /// A homogeneous sequence.
    List(ListLayout),
}

// -----------------------------------------------------------------------------
// StructLayout

/// Members, constructors, and markers of a struct type.
pub struct StructLayout {
    members: Vec<MemberDescriptor>,
    zero_arg: Option<MakeFn>,
    constructors: Vec<ConstructorSpec>,
    implements: Vec<Ty>,
    encrypt: bool,
}

impl StructLayout {
    /// The members, in declaration order.
    #[inline]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// The declared parameterized constructors.
    #[inline]
    pub fn constructors(&self) -> &[ConstructorSpec] {
        &self.constructors
    }

    /// Whether a zero-argument constructor was declared.
    #[inline]
    pub fn has_zero_arg(&self) -> bool {
        self.zero_arg.is_some()
    }

    /// Instantiates through the zero-argument constructor.
    pub fn make_zero_arg(&self) -> Option<Box<dyn Facet>> {
        self.zero_arg.as_ref().map(|make| make())
    }

    /// Whether this type can stand in for the given declared type.
    pub fn implements(&self, declared: TypeId) -> bool {
        self.implements.iter().any(|ty| ty.id() == declared)
    }

    /// Whether the type carries the whole-object encrypt marker.
    #[inline]
    pub const fn is_encrypt(&self) -> bool {
        self.encrypt
    }
}

// -----------------------------------------------------------------------------
// AbstractLayout

/// Resolution metadata of an abstract (interface-like) declared type.
#[derive(Debug, Clone, Copy)]
pub struct AbstractLayout {
    mapping: Option<Ty>,
}

impl AbstractLayout {
    /// The type-level mapping attribute, if any.
    #[inline]
    pub const fn mapping(&self) -> Option<Ty> {
        self.mapping
    }
}

// -----------------------------------------------------------------------------
// ListLayout

/// Erased element access of a sequence type.
pub struct ListLayout {
    item: Ty,
    new_list: MakeFn,
    push: PushFn,
    iter: IterFn,
}

impl ListLayout {
    /// Builds the layout for `Vec<T>`.
    pub fn of<T: Facet>() -> Self {
        Self {
            item: Ty::of::<T>(),
            new_list: Box::new(|| Box::new(Vec::<T>::new())),
            push: Box::new(|list, item| {
                let list = list
                    .downcast_mut::<Vec<T>>()
                    .ok_or_else(|| CodecError::unexpected("the owning list", "list"))?;
                let item = item
                    .take::<T>()
                    .map_err(|item| CodecError::unexpected("the item type", item.type_path()))?;
                list.push(item);
                Ok(())
            }),
            iter: Box::new(|list| match list.downcast_ref::<Vec<T>>() {
                Some(items) => Box::new(items.iter().map(|item| item as &dyn Facet)),
                None => Box::new(core::iter::empty()),
            }),
        }
    }

    /// The declared element type.
    #[inline]
    pub const fn item(&self) -> Ty {
        self.item
    }

    /// Creates an empty list.
    #[inline]
    pub fn new_list(&self) -> Box<dyn Facet> {
        (self.new_list)()
    }

    /// Appends one element.
    #[inline]
    pub fn push(&self, list: &mut dyn Facet, item: Box<dyn Facet>) -> Result<(), CodecError> {
        (self.push)(list, item)
    }

    /// Iterates over the elements.
    #[inline]
    pub fn iter<'a>(&self, list: &'a dyn Facet) -> Box<dyn Iterator<Item = &'a dyn Facet> + 'a> {
        (self.iter)(list)
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// Immutable structural metadata for one registered type.
///
/// Built exactly once per type through [`Describe`](crate::registry::Describe)
/// and owned by the [`DescriptorRegistry`](crate::registry::DescriptorRegistry);
/// every serializer graph shares it read-only.
pub struct TypeDescriptor {
    ty: Ty,
    kind: TypeKind,
}

impl TypeDescriptor {
    /// Starts a builder for a struct type.
    pub fn structure<T: Facet>() -> StructBuilder<T> {
        StructBuilder {
            ty: Ty::of::<T>(),
            members: Vec::new(),
            zero_arg: None,
            constructors: Vec::new(),
            implements: Vec::new(),
            encrypt: false,
            _marker: PhantomData,
        }
    }

    /// Declares an abstract marker type.
    ///
    /// `M` stands for an interface or abstract base: it is never
    /// instantiated, only resolved to a concrete type at
    /// deserialization time.
    pub fn abstract_marker<M: Any>() -> Self {
        Self {
            ty: Ty::of::<M>(),
            kind: TypeKind::Abstract(AbstractLayout { mapping: None }),
        }
    }

    /// Attaches a type-level mapping attribute to an abstract marker.
    pub fn with_type_mapping<C: Facet>(mut self) -> Self {
        if let TypeKind::Abstract(layout) = &mut self.kind {
            layout.mapping = Some(Ty::of::<C>());
        } else {
            debug_assert!(false, "type mappings attach to abstract markers only");
        }
        self
    }

    /// Declares a scalar type handled by `converter`.
    pub fn scalar<T: Facet>(converter: ScalarConverter) -> Self {
        Self {
            ty: Ty::of::<T>(),
            kind: TypeKind::Scalar(Arc::new(converter)),
        }
    }

    /// Declares a list type.
    pub fn list<T: Facet>(layout: ListLayout) -> Self {
        Self {
            ty: Ty::of::<T>(),
            kind: TypeKind::List(layout),
        }
    }

    /// The described type.
    #[inline]
    pub const fn ty(&self) -> Ty {
        self.ty
    }

    /// The described type's [`TypeId`].
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.ty.id()
    }

    /// The described type's full path.
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.ty.path()
    }

    /// The structural kind.
    #[inline]
    pub const fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// The struct layout, if this is a struct type.
    pub fn as_struct(&self) -> Option<&StructLayout> {
        match &self.kind {
            TypeKind::Struct(layout) => Some(layout),
            _ => None,
        }
    }

    /// The abstract layout, if this is an abstract marker.
    pub fn as_abstract(&self) -> Option<&AbstractLayout> {
        match &self.kind {
            TypeKind::Abstract(layout) => Some(layout),
            _ => None,
        }
    }

    /// Whether the described type can be a resolution target or serialize
    /// on its own (everything except abstract markers).
    pub fn is_concrete(&self) -> bool {
        !matches!(self.kind, TypeKind::Abstract(_))
    }

    /// Whether the type carries the whole-object encrypt marker.
    pub fn is_encrypt(&self) -> bool {
        match &self.kind {
            TypeKind::Struct(layout) => layout.encrypt,
            _ => false,
        }
    }
}

impl core::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kind = match &self.kind {
            TypeKind::Struct(_) => "struct",
            TypeKind::Abstract(_) => "abstract",
            TypeKind::Scalar(_) => "scalar",
            TypeKind::List(_) => "list",
        };
        write!(f, "TypeDescriptor({} {})", kind, self.ty.path())
    }
}

// -----------------------------------------------------------------------------
// StructBuilder

/// Builder for a struct [`TypeDescriptor`].
///
/// This is the registration step the resolvers rely on: all markers and
/// accessor thunks are attached here, once, never rediscovered per call.
pub struct StructBuilder<T: Facet> {
    ty: Ty,
    members: Vec<MemberDescriptor>,
    zero_arg: Option<MakeFn>,
    constructors: Vec<ConstructorSpec>,
    implements: Vec<Ty>,
    encrypt: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Facet> StructBuilder<T> {
    /// Appends a member; declaration order is emission order.
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    /// Declares the zero-argument constructor.
    pub fn zero_arg(mut self, make: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.zero_arg = Some(Box::new(move || Box::new(make())));
        self
    }

    /// Declares a parameterized constructor.
    pub fn constructor(mut self, spec: ConstructorSpec) -> Self {
        self.constructors.push(spec);
        self
    }

    /// Declares that `T` can stand in for the declared type `M`.
    pub fn implements<M: Any>(mut self) -> Self {
        self.implements.push(Ty::of::<M>());
        self
    }

    /// Flags the whole type for encryption.
    pub fn encrypt(mut self) -> Self {
        self.encrypt = true;
        self
    }

    /// Finishes the descriptor.
    pub fn finish(self) -> TypeDescriptor {
        TypeDescriptor {
            ty: self.ty,
            kind: TypeKind::Struct(StructLayout {
                members: self.members,
                zero_arg: self.zero_arg,
                constructors: self.constructors,
                implements: self.implements,
                encrypt: self.encrypt,
            }),
        }
    }
}
