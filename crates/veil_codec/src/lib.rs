#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Modules

mod error;
mod facet;
mod resolve;

pub mod cipher;
pub mod codec;
pub mod config;
pub mod hash;
pub mod impls;
pub mod info;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use cipher::{Base64Cipher, Cipher, CipherError};
pub use codec::JsonCodec;
pub use config::Config;
pub use error::CodecError;
pub use facet::Facet;
pub use info::TypeDescriptor;
pub use registry::{Describe, DescriptorRegistry, DescriptorRegistryArc};

/// The most common imports, in one place.
pub mod prelude {
    pub use crate::cipher::{Base64Cipher, Cipher};
    pub use crate::codec::JsonCodec;
    pub use crate::config::Config;
    pub use crate::error::CodecError;
    pub use crate::facet::Facet;
    pub use crate::impl_facet;
    pub use crate::info::{ConstructorSpec, MemberDescriptor, ParamSpec, TypeDescriptor};
    pub use crate::registry::{Describe, DescriptorRegistry, DescriptorRegistryArc};

    #[cfg(feature = "auto_register")]
    pub use crate::submit_descriptor;
}
