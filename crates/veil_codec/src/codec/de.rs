use std::borrow::Cow;

use serde_json::Value;

use crate::Facet;
use crate::codec::cache::{Binding, BoundStruct, SerializerCache};
use crate::config::Config;
use crate::error::CodecError;
use crate::info::{ArgSlots, ListLayout, Ty, TypeKind};
use crate::registry::DescriptorRegistry;
use crate::resolve::{PlanKind, resolve_concrete};

// -----------------------------------------------------------------------------
// DeDriver

/// One deserialization pass over a parsed document tree.
///
/// Carries the decryption scope flag: once a marker has opened a scope,
/// markers further down are ignored, mirroring the write side.
pub(crate) struct DeDriver<'a> {
    registry: &'a DescriptorRegistry,
    config: &'a Config,
    cache: &'a SerializerCache,
    decrypting: bool,
}

impl<'a> DeDriver<'a> {
    pub(crate) fn new(
        registry: &'a DescriptorRegistry,
        config: &'a Config,
        cache: &'a SerializerCache,
    ) -> Self {
        Self {
            registry,
            config,
            cache,
            decrypting: false,
        }
    }

    /// Deserializes the whole document. A `null` root yields `None`.
    pub(crate) fn read_root(
        &mut self,
        declared: Ty,
        text: &str,
    ) -> Result<Option<Box<dyn Facet>>, CodecError> {
        let root: Value = serde_json::from_str(text)?;
        if root.is_null() {
            return Ok(None);
        }
        let (root, entered) = self.enter_decryption(self.config.encrypt_root(), &root, "root")?;
        if root.is_null() {
            self.exit_decryption(entered);
            return Ok(None);
        }
        let concrete = resolve_concrete(declared, None, self.config, self.registry)?;
        let result = self.read_concrete(concrete, &root);
        self.exit_decryption(entered);
        result.map(Some)
    }

    fn read_concrete(&mut self, ty: Ty, value: &Value) -> Result<Box<dyn Facet>, CodecError> {
        if let Some(converter) = self.config.scalar_override(ty.id()) {
            return converter.read(value);
        }
        let descriptor = self
            .registry
            .get(ty.id())
            .ok_or_else(|| CodecError::not_registered(ty.path()))?
            .clone();
        match descriptor.kind() {
            TypeKind::Scalar(converter) => converter.read(value),
            TypeKind::List(layout) => self.read_list(layout, value),
            TypeKind::Struct(_) => {
                let bound = self
                    .cache
                    .get_or_bind(&descriptor, self.config, self.registry)?;
                self.read_object(&bound, value)
            }
            TypeKind::Abstract(_) => Err(CodecError::no_mapping(ty.path(), None)),
        }
    }

    fn read_list(
        &mut self,
        layout: &ListLayout,
        value: &Value,
    ) -> Result<Box<dyn Facet>, CodecError> {
        let items = value
            .as_array()
            .ok_or_else(|| CodecError::unexpected("an array", layout.item().path()))?;
        let item_ty = resolve_concrete(layout.item(), None, self.config, self.registry)?;
        let mut list = layout.new_list();
        for item in items {
            let parsed = self.read_concrete(item_ty, item)?;
            layout.push(list.as_mut(), parsed)?;
        }
        Ok(list)
    }

    fn read_object(
        &mut self,
        bound: &BoundStruct,
        value: &Value,
    ) -> Result<Box<dyn Facet>, CodecError> {
        let (value, entered) =
            self.enter_decryption(bound.encrypt, value, bound.ty().path())?;
        let result = self.read_members(bound, &value);
        self.exit_decryption(entered);
        result
    }

    // Input order drives the loop; each filled member lands either in a
    // constructor slot or in the post-construction assignment list, never
    // both. Unknown keys and explicit nulls are skipped.
    fn read_members(
        &mut self,
        bound: &BoundStruct,
        value: &Value,
    ) -> Result<Box<dyn Facet>, CodecError> {
        let map = value
            .as_object()
            .ok_or_else(|| CodecError::unexpected("an object", bound.ty().path()))?;
        let plan = bound.de_plan()?.clone();

        let mut slots: Vec<Option<Box<dyn Facet>>> = Vec::new();
        slots.resize_with(plan.params_len, || None);
        let mut pending: Vec<Option<Box<dyn Facet>>> = Vec::new();
        pending.resize_with(bound.members().len(), || None);

        for (key, node) in map {
            let Some(index) = bound.member_by_wire(key) else {
                continue;
            };
            if node.is_null() {
                continue;
            }
            let bound_member = &bound.members()[index];
            let member = bound.member_descriptor(index);

            let (node, entered) = self.enter_decryption(bound_member.encrypt, node, member.name())?;
            let parsed = match &bound_member.binding {
                Binding::Scalar(converter) => converter.read(&node),
                Binding::Tree { .. } => bound
                    .resolve_member_tree(index, self.config, self.registry)
                    .and_then(|item_ty| self.read_concrete(item_ty, &node)),
            };
            self.exit_decryption(entered);

            match plan.inject[index] {
                Some(slot) => slots[slot] = Some(parsed?),
                None if member.is_writable() => pending[index] = Some(parsed?),
                None => {
                    // Read-only and not injected: validated above, dropped here.
                    parsed?;
                }
            }
        }

        let mut instance = match plan.kind {
            PlanKind::ZeroArg => bound.layout().make_zero_arg().ok_or_else(|| {
                CodecError::NotConstructible {
                    type_path: Cow::Borrowed(bound.ty().path()),
                }
            })?,
            PlanKind::Parameterized(index) => {
                let constructor = &bound.layout().constructors()[index];
                let mut args = ArgSlots::new(constructor.params(), slots);
                constructor.invoke(&mut args)?
            }
        };

        for (index, parsed) in pending.into_iter().enumerate() {
            if let Some(parsed) = parsed {
                bound.member_descriptor(index).set(instance.as_mut(), parsed)?;
            }
        }
        Ok(instance)
    }

    // Opens a decryption scope: the string token is deciphered and
    // re-parsed as the subtree it stands for.
    fn enter_decryption<'v>(
        &mut self,
        flagged: bool,
        value: &'v Value,
        at: &'static str,
    ) -> Result<(Cow<'v, Value>, bool), CodecError> {
        if !flagged || self.decrypting {
            return Ok((Cow::Borrowed(value), false));
        }
        let cipher = self.config.cipher_ref().ok_or(CodecError::NoCipher {
            at: Cow::Borrowed(at),
        })?;
        let ciphertext = value
            .as_str()
            .ok_or_else(|| CodecError::unexpected("an encrypted string", at))?;
        let plaintext = cipher.decrypt(ciphertext)?;
        let parsed: Value = serde_json::from_str(&plaintext)?;
        self.decrypting = true;
        Ok((Cow::Owned(parsed), true))
    }

    fn exit_decryption(&mut self, entered: bool) {
        if entered {
            self.decrypting = false;
        }
    }
}
