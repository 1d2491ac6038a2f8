use crate::Facet;
use crate::codec::cache::{BoundStruct, SerializerCache};
use crate::codec::writer::JsonWriter;
use crate::config::Config;
use crate::error::CodecError;
use crate::info::{ListLayout, ScalarConverter, Ty, TypeKind, escape_str, mask_token};
use crate::registry::DescriptorRegistry;

// -----------------------------------------------------------------------------
// SerDriver

/// One serialization pass: dispatches on each value's runtime type and
/// emits compact tokens through a [`JsonWriter`].
pub(crate) struct SerDriver<'a> {
    registry: &'a DescriptorRegistry,
    config: &'a Config,
    cache: &'a SerializerCache,
}

impl<'a> SerDriver<'a> {
    pub(crate) fn new(
        registry: &'a DescriptorRegistry,
        config: &'a Config,
        cache: &'a SerializerCache,
    ) -> Self {
        Self {
            registry,
            config,
            cache,
        }
    }

    /// Serializes the whole document, honoring root encryption.
    pub(crate) fn write_root(&self, value: Option<&dyn Facet>) -> Result<String, CodecError> {
        let mut writer = JsonWriter::new(self.config.cipher_ref());
        match value {
            None => writer.push("null"),
            Some(value) => {
                let entered = writer.enter_encryption(self.config.encrypt_root(), "root")?;
                match self.write_any(&mut writer, value, false) {
                    Ok(()) => writer.exit_encryption(entered)?,
                    Err(err) => {
                        writer.abort_encryption(entered);
                        return Err(err);
                    }
                }
            }
        }
        Ok(writer.finish())
    }

    // Dispatch by the value's runtime type, not its declared one: a
    // polymorphic member serializes whatever concrete value it holds.
    fn write_any(
        &self,
        writer: &mut JsonWriter<'_>,
        value: &dyn Facet,
        redact: bool,
    ) -> Result<(), CodecError> {
        let ty = Ty::from_parts(value.ty_id(), value.type_path());

        if let Some(converter) = self.config.scalar_override(ty.id()) {
            return Self::write_scalar(writer, converter, value, redact);
        }

        let descriptor = self
            .registry
            .get(ty.id())
            .ok_or_else(|| CodecError::not_registered(ty.path()))?;
        match descriptor.kind() {
            TypeKind::Scalar(converter) => Self::write_scalar(writer, converter, value, redact),
            TypeKind::List(layout) => self.write_list(writer, layout, value, redact),
            TypeKind::Struct(_) => {
                let bound = self
                    .cache
                    .get_or_bind(descriptor, self.config, self.registry)?;
                self.write_object(writer, &bound, value)
            }
            TypeKind::Abstract(_) => Err(CodecError::unexpected("a concrete value", ty.path())),
        }
    }

    fn write_scalar(
        writer: &mut JsonWriter<'_>,
        converter: &ScalarConverter,
        value: &dyn Facet,
        redact: bool,
    ) -> Result<(), CodecError> {
        let token = converter.write(value)?;
        if redact {
            writer.push(&mask_token(&token));
        } else {
            writer.push(&token);
        }
        Ok(())
    }

    fn write_list(
        &self,
        writer: &mut JsonWriter<'_>,
        layout: &ListLayout,
        value: &dyn Facet,
        redact: bool,
    ) -> Result<(), CodecError> {
        writer.push("[");
        for (index, item) in layout.iter(value).enumerate() {
            if index > 0 {
                writer.push(",");
            }
            self.write_any(writer, item, redact)?;
        }
        writer.push("]");
        Ok(())
    }

    fn write_object(
        &self,
        writer: &mut JsonWriter<'_>,
        bound: &BoundStruct,
        value: &dyn Facet,
    ) -> Result<(), CodecError> {
        let entered = writer.enter_encryption(bound.encrypt, bound.ty().path())?;
        match self.write_members(writer, bound, value) {
            Ok(()) => writer.exit_encryption(entered),
            Err(err) => {
                writer.abort_encryption(entered);
                Err(err)
            }
        }
    }

    // Members emit in declaration order; absent optionals emit nothing.
    fn write_members(
        &self,
        writer: &mut JsonWriter<'_>,
        bound: &BoundStruct,
        value: &dyn Facet,
    ) -> Result<(), CodecError> {
        writer.push("{");
        let mut first = true;
        for (index, bound_member) in bound.members().iter().enumerate() {
            let member = bound.member_descriptor(index);
            let Some(field) = member.get(value) else {
                continue;
            };
            if !first {
                writer.push(",");
            }
            first = false;
            writer.push(&escape_str(member.wire_name()));
            writer.push(":");

            let entered = writer.enter_encryption(bound_member.encrypt, member.name())?;
            match self.write_any(writer, field, bound_member.redact) {
                Ok(()) => writer.exit_encryption(entered)?,
                Err(err) => {
                    writer.abort_encryption(entered);
                    return Err(err);
                }
            }
        }
        writer.push("}");
        Ok(())
    }
}
