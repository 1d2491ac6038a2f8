use crate::Facet;
use crate::info::{ListLayout, TypeDescriptor};
use crate::registry::{Describe, DescriptorRegistry};

impl<T: Facet> Facet for Vec<T> {
    #[inline]
    fn as_any(&self) -> &dyn core::any::Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn core::any::Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn core::any::Any> {
        self
    }

    #[inline]
    fn type_path(&self) -> &'static str {
        core::any::type_name::<Vec<T>>()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::list::<Vec<T>>(ListLayout::of::<T>())
    }

    fn register_dependencies(registry: &mut DescriptorRegistry) {
        registry.register::<T>();
    }
}
