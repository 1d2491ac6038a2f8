use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::config::Config;
use crate::error::CodecError;
use crate::hash::{FixedHashState, HashMap, TypeIdMap};
use crate::info::{MemberDescriptor, StructLayout, Ty, TypeDescriptor, TypeKind};
use crate::registry::DescriptorRegistry;
use crate::resolve::{DePlan, resolve_concrete, resolve_plan};

// -----------------------------------------------------------------------------
// Binding

/// How one member's value is handled, decided once at bind time.
pub(crate) enum Binding {
    /// A terminal token, via this converter.
    Scalar(Arc<crate::info::ScalarConverter>),
    /// A nested subtree; the concrete type is resolved on first use and
    /// the outcome, success or failure, is memoized.
    Tree {
        declared: Ty,
        resolved: OnceLock<Result<Ty, CodecError>>,
    },
}

/// A member descriptor fused with the codec configuration.
pub(crate) struct BoundMember {
    pub encrypt: bool,
    pub redact: bool,
    pub binding: Binding,
}

// -----------------------------------------------------------------------------
// BoundStruct

/// One struct descriptor bound against one configuration.
///
/// Built at most once per (codec, type) pair; both directions of the
/// codec traverse it. Mapping and constructor resolution stay lazy so a
/// serialize-only flow over a partially mapped model still succeeds.
pub(crate) struct BoundStruct {
    desc: Arc<TypeDescriptor>,
    members: Vec<BoundMember>,
    by_wire: HashMap<&'static str, usize>,
    pub encrypt: bool,
    de_plan: OnceLock<Result<DePlan, CodecError>>,
}

impl BoundStruct {
    fn bind(
        desc: Arc<TypeDescriptor>,
        config: &Config,
        registry: &DescriptorRegistry,
    ) -> Result<Self, CodecError> {
        let layout = match desc.kind() {
            TypeKind::Struct(layout) => layout,
            _ => return Err(CodecError::unexpected("a struct type", desc.type_path())),
        };

        let mut members = Vec::with_capacity(layout.members().len());
        let mut by_wire = HashMap::with_capacity_and_hasher(layout.members().len(), FixedHashState);
        for (index, member) in layout.members().iter().enumerate() {
            let declared = member.declared();
            let binding = match config.scalar_override(declared.id()) {
                Some(converter) => Binding::Scalar(converter.clone()),
                None => match registry.get(declared.id()).map(|d| d.kind()) {
                    Some(TypeKind::Scalar(converter)) => Binding::Scalar(converter.clone()),
                    Some(_) => Binding::Tree {
                        declared,
                        resolved: OnceLock::new(),
                    },
                    None => return Err(CodecError::not_registered(declared.path())),
                },
            };
            members.push(BoundMember {
                encrypt: member.is_encrypt(),
                redact: member.is_redact() && config.redact_enabled(),
                binding,
            });
            by_wire.insert(member.wire_name(), index);
        }

        Ok(Self {
            encrypt: desc.is_encrypt(),
            desc,
            members,
            by_wire,
            de_plan: OnceLock::new(),
        })
    }

    pub(crate) fn ty(&self) -> Ty {
        self.desc.ty()
    }

    pub(crate) fn layout(&self) -> &StructLayout {
        match self.desc.kind() {
            TypeKind::Struct(layout) => layout,
            // bind() rejects everything else.
            _ => unreachable!("bound a non-struct descriptor"),
        }
    }

    /// The bound members, parallel to [`StructLayout::members`].
    pub(crate) fn members(&self) -> &[BoundMember] {
        &self.members
    }

    /// Looks a member up by wire name.
    pub(crate) fn member_by_wire(&self, wire_name: &str) -> Option<usize> {
        self.by_wire.get(wire_name).copied()
    }

    /// The deserialization plan, resolved on first use.
    pub(crate) fn de_plan(&self) -> Result<&DePlan, CodecError> {
        self.de_plan
            .get_or_init(|| resolve_plan(self.layout(), self.desc.type_path()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Resolves a tree member's concrete type, memoizing the outcome.
    pub(crate) fn resolve_member_tree(
        &self,
        index: usize,
        config: &Config,
        registry: &DescriptorRegistry,
    ) -> Result<Ty, CodecError> {
        let member = &self.layout().members()[index];
        match &self.members[index].binding {
            Binding::Scalar(_) => Ok(member.declared()),
            Binding::Tree { declared, resolved } => resolved
                .get_or_init(|| {
                    resolve_concrete(*declared, Some((self.desc.ty(), member)), config, registry)
                })
                .clone(),
        }
    }

    pub(crate) fn member_descriptor(&self, index: usize) -> &MemberDescriptor {
        &self.layout().members()[index]
    }
}

// -----------------------------------------------------------------------------
// SerializerCache

/// The per-codec store of [`BoundStruct`]s.
pub(crate) struct SerializerCache {
    inner: RwLock<TypeIdMap<Arc<BoundStruct>>>,
}

impl SerializerCache {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(TypeIdMap::new()),
        }
    }

    /// Returns the bound serializer for `desc`, building it on first use.
    pub(crate) fn get_or_bind(
        &self,
        desc: &Arc<TypeDescriptor>,
        config: &Config,
        registry: &DescriptorRegistry,
    ) -> Result<Arc<BoundStruct>, CodecError> {
        if let Some(bound) = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&desc.id())
        {
            return Ok(bound.clone());
        }

        let mut table = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // A racing writer may have bound it between the locks.
        if let Some(bound) = table.get(&desc.id()) {
            return Ok(bound.clone());
        }
        let bound = Arc::new(BoundStruct::bind(desc.clone(), config, registry)?);
        table.insert(desc.id(), bound.clone());
        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_facet;
    use crate::registry::Describe;

    #[derive(Default)]
    struct Fred {
        barney: String,
    }
    impl_facet!(Fred);

    impl Describe for Fred {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::structure::<Fred>()
                .zero_arg(Fred::default)
                .member(
                    MemberDescriptor::required("barney", |f: &Fred| &f.barney)
                        .writable(|f: &mut Fred, v| f.barney = v)
                        .rename("Barney"),
                )
                .finish()
        }
    }

    #[test]
    fn binding_is_built_once_and_shared() {
        let mut registry = DescriptorRegistry::new();
        registry.register::<Fred>();
        let config = Config::default();
        let cache = SerializerCache::new();

        let desc = registry.get(core::any::TypeId::of::<Fred>()).unwrap();
        let a = cache.get_or_bind(desc, &config, &registry).unwrap();
        let b = cache.get_or_bind(desc, &config, &registry).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.member_by_wire("Barney"), Some(0));
        assert_eq!(a.member_by_wire("barney"), None);
    }
}
