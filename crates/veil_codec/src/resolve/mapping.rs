use crate::config::Config;
use crate::error::CodecError;
use crate::info::{MemberDescriptor, Ty, TypeKind};
use crate::registry::DescriptorRegistry;

// -----------------------------------------------------------------------------
// resolve_concrete

/// Resolves a declared type to the concrete type that will actually be
/// instantiated or emitted.
///
/// Resolution sources, strongest first:
///
/// 1. config by-member mapping,
/// 2. config by-type mapping,
/// 3. the member's own mapping attribute,
/// 4. the type-level mapping attribute of an abstract marker.
///
/// A mapped type that cannot stand in for the declared one is a
/// [`TypeMismatch`](CodecError::TypeMismatch). An abstract declared type
/// with no source at all is a [`NoMapping`](CodecError::NoMapping).
/// Concrete declared types with no mapping resolve to themselves.
pub(crate) fn resolve_concrete(
    declared: Ty,
    owner: Option<(Ty, &MemberDescriptor)>,
    config: &Config,
    registry: &DescriptorRegistry,
) -> Result<Ty, CodecError> {
    let member_name = owner.map(|(_, member)| member.name());

    let candidate = owner
        .and_then(|(owner_ty, member)| config.mapping_for_member(owner_ty.id(), member.name()))
        .or_else(|| config.mapping_for_type(declared.id()))
        .or_else(|| owner.and_then(|(_, member)| member.mapping()))
        .or_else(|| {
            registry
                .get(declared.id())
                .and_then(|descriptor| descriptor.as_abstract())
                .and_then(|layout| layout.mapping())
        });

    match candidate {
        Some(concrete) => {
            check_assignable(declared, concrete, member_name, registry)?;
            Ok(concrete)
        }
        None => {
            // A config scalar override makes the type concrete without a
            // registry entry.
            if config.scalar_override(declared.id()).is_some() {
                return Ok(declared);
            }
            match registry.get(declared.id()) {
                Some(descriptor) if descriptor.is_concrete() => Ok(declared),
                Some(_) => Err(CodecError::no_mapping(declared.path(), member_name)),
                None => Err(CodecError::not_registered(declared.path())),
            }
        }
    }
}

// A mapping target stands in for the declared type when it is the declared
// type itself, or a registered struct that lists the declared type among
// its implemented markers.
fn check_assignable(
    declared: Ty,
    concrete: Ty,
    member_name: Option<&'static str>,
    registry: &DescriptorRegistry,
) -> Result<(), CodecError> {
    if concrete.id() == declared.id() {
        return Ok(());
    }
    let descriptor = registry
        .get(concrete.id())
        .ok_or_else(|| CodecError::not_registered(concrete.path()))?;
    let fits = match descriptor.kind() {
        TypeKind::Struct(layout) => layout.implements(declared.id()),
        _ => false,
    };
    if fits {
        Ok(())
    } else {
        Err(CodecError::type_mismatch(
            declared.path(),
            concrete.path(),
            member_name,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_facet;
    use crate::info::TypeDescriptor;
    use crate::registry::Describe;

    struct Dish;

    #[derive(Default)]
    struct Spam {
        count: i32,
    }
    impl_facet!(Spam);

    impl Describe for Spam {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::structure::<Spam>()
                .zero_arg(Spam::default)
                .implements::<Dish>()
                .member(
                    MemberDescriptor::required("count", |s: &Spam| &s.count)
                        .writable(|s: &mut Spam, v| s.count = v),
                )
                .finish()
        }
    }

    #[derive(Default)]
    struct Eggs;
    impl_facet!(Eggs);

    impl Describe for Eggs {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::structure::<Eggs>()
                .zero_arg(Eggs::default)
                .finish()
        }
    }

    fn registry() -> DescriptorRegistry {
        let mut registry = DescriptorRegistry::new();
        registry.register::<Spam>();
        registry.register::<Eggs>();
        registry.try_insert(TypeDescriptor::abstract_marker::<Dish>());
        registry
    }

    #[test]
    fn concrete_types_resolve_to_themselves() {
        let registry = registry();
        let config = Config::default();

        let resolved =
            resolve_concrete(Ty::of::<Spam>(), None, &config, &registry).unwrap();
        assert!(resolved.is::<Spam>());
    }

    #[test]
    fn abstract_without_mapping_fails_distinctly() {
        let registry = registry();
        let config = Config::default();

        let err = resolve_concrete(Ty::of::<Dish>(), None, &config, &registry).unwrap_err();
        assert!(matches!(err, CodecError::NoMapping { .. }));
    }

    #[test]
    fn config_mapping_resolves_the_abstract_type() {
        let registry = registry();
        let config = Config::builder().map_type::<Dish, Spam>().build();

        let resolved =
            resolve_concrete(Ty::of::<Dish>(), None, &config, &registry).unwrap();
        assert!(resolved.is::<Spam>());
    }

    #[test]
    fn mapping_to_a_stranger_is_a_mismatch() {
        let registry = registry();
        let config = Config::builder().map_type::<Dish, Eggs>().build();

        let err = resolve_concrete(Ty::of::<Dish>(), None, &config, &registry).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
    }
}
