//! Scalar descriptors for the primitive types.
//!
//! Token formatting goes through [`serde_json::Value`] in every case, so
//! escaping and number formatting match the rest of the ecosystem.

use serde_json::Value;

use crate::error::CodecError;
use crate::impl_facet;
use crate::info::{ScalarConverter, TypeDescriptor, escape_str};
use crate::registry::Describe;

impl_facet!(
    bool, char, String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64
);

fn downcast<'a, T: crate::Facet>(value: &'a dyn crate::Facet) -> Result<&'a T, CodecError> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| CodecError::unexpected("the converter's own type", value.type_path()))
}

macro_rules! signed_scalar {
    ($($ty:ty),*) => {$(
        impl Describe for $ty {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::scalar::<$ty>(ScalarConverter::new(
                    |value| Ok(Value::from(*downcast::<$ty>(value)?).to_string()),
                    |node| {
                        let raw = node.as_i64().ok_or_else(|| {
                            CodecError::unexpected("an integer", core::any::type_name::<$ty>())
                        })?;
                        let value: $ty = raw.try_into().map_err(|_| {
                            CodecError::unexpected(
                                "an integer in range",
                                core::any::type_name::<$ty>(),
                            )
                        })?;
                        Ok(Box::new(value))
                    },
                    || Box::new(<$ty>::default()),
                ))
            }
        }
    )*};
}

macro_rules! unsigned_scalar {
    ($($ty:ty),*) => {$(
        impl Describe for $ty {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::scalar::<$ty>(ScalarConverter::new(
                    |value| Ok(Value::from(*downcast::<$ty>(value)?).to_string()),
                    |node| {
                        let raw = node.as_u64().ok_or_else(|| {
                            CodecError::unexpected("an unsigned integer", core::any::type_name::<$ty>())
                        })?;
                        let value: $ty = raw.try_into().map_err(|_| {
                            CodecError::unexpected(
                                "an unsigned integer in range",
                                core::any::type_name::<$ty>(),
                            )
                        })?;
                        Ok(Box::new(value))
                    },
                    || Box::new(<$ty>::default()),
                ))
            }
        }
    )*};
}

signed_scalar!(i8, i16, i32, i64, isize);
unsigned_scalar!(u8, u16, u32, u64, usize);

impl Describe for bool {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::scalar::<bool>(ScalarConverter::new(
            |value| {
                Ok(if *downcast::<bool>(value)? {
                    String::from("true")
                } else {
                    String::from("false")
                })
            },
            |node| {
                let value = node
                    .as_bool()
                    .ok_or_else(|| CodecError::unexpected("a boolean", "bool"))?;
                Ok(Box::new(value))
            },
            || Box::new(false),
        ))
    }
}

impl Describe for String {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::scalar::<String>(ScalarConverter::new(
            |value| Ok(escape_str(downcast::<String>(value)?)),
            |node| {
                let value = node
                    .as_str()
                    .ok_or_else(|| CodecError::unexpected("a string", "String"))?;
                Ok(Box::new(value.to_owned()))
            },
            || Box::new(String::new()),
        ))
    }
}

impl Describe for char {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::scalar::<char>(ScalarConverter::new(
            |value| Ok(escape_str(&downcast::<char>(value)?.to_string())),
            |node| {
                let text = node
                    .as_str()
                    .ok_or_else(|| CodecError::unexpected("a one-character string", "char"))?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Box::new(c)),
                    _ => Err(CodecError::unexpected("a one-character string", "char")),
                }
            },
            || Box::new('\0'),
        ))
    }
}

impl Describe for f64 {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::scalar::<f64>(ScalarConverter::new(
            |value| Ok(Value::from(*downcast::<f64>(value)?).to_string()),
            |node| {
                let value = node
                    .as_f64()
                    .ok_or_else(|| CodecError::unexpected("a number", "f64"))?;
                Ok(Box::new(value))
            },
            || Box::new(0.0_f64),
        ))
    }
}

impl Describe for f32 {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::scalar::<f32>(ScalarConverter::new(
            |value| Ok(Value::from(*downcast::<f32>(value)?).to_string()),
            |node| {
                let value = node
                    .as_f64()
                    .ok_or_else(|| CodecError::unexpected("a number", "f32"))?;
                Ok(Box::new(value as f32))
            },
            || Box::new(0.0_f32),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::TypeKind;

    fn converter_of(descriptor: &TypeDescriptor) -> &ScalarConverter {
        match descriptor.kind() {
            TypeKind::Scalar(converter) => converter,
            _ => panic!("not a scalar descriptor"),
        }
    }

    #[test]
    fn strings_are_escaped_json_tokens() {
        let descriptor = String::describe();
        let converter = converter_of(&descriptor);

        let token = converter.write(&String::from("ab\"c")).unwrap();
        assert_eq!(token, r#""ab\"c""#);

        let back = converter.read(&Value::from("ab\"c")).unwrap();
        assert_eq!(back.take::<String>().ok().unwrap(), "ab\"c");
    }

    #[test]
    fn integers_check_their_range() {
        let descriptor = u8::describe();
        let converter = converter_of(&descriptor);

        assert!(converter.read(&Value::from(255_u64)).is_ok());
        assert!(converter.read(&Value::from(256_u64)).is_err());
        assert!(converter.read(&Value::from("7")).is_err());
    }

    #[test]
    fn booleans_use_keyword_tokens() {
        let descriptor = bool::describe();
        let converter = converter_of(&descriptor);
        assert_eq!(converter.write(&true).unwrap(), "true");
        assert_eq!(converter.write(&false).unwrap(), "false");
    }

    #[test]
    fn chars_are_single_character_strings() {
        let descriptor = char::describe();
        let converter = converter_of(&descriptor);
        assert_eq!(converter.write(&'q').unwrap(), r#""q""#);
        assert!(converter.read(&Value::from("qq")).is_err());
    }
}
