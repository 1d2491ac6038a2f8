//! Structural metadata: type identities, member descriptors, constructor
//! specs, and the [`TypeDescriptor`] that ties them together.

mod constructor;
mod descriptor;
mod member;
mod scalar;
mod ty;

pub use constructor::{ArgSlots, ConstructorSpec, ParamSpec};
pub use descriptor::{
    AbstractLayout, ListLayout, MakeFn, StructBuilder, StructLayout, TypeDescriptor, TypeKind,
};
pub use member::MemberDescriptor;
pub use scalar::ScalarConverter;
pub use ty::Ty;

pub(crate) use scalar::{escape_str, mask_token};
