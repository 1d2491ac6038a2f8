use core::{error, fmt};
use std::borrow::Cow;

// -----------------------------------------------------------------------------
// CodecError

/// Every error outcome of building serializers or running them.
///
/// Resolution failures (`NoMapping`, `TypeMismatch`, the constructor
/// variants, `NotRegistered`) mean the configuration or registration is
/// wrong; `MalformedInput` and `UnexpectedValue` mean the data is wrong.
/// The variants are kept distinct so callers can tell the two apart.
///
/// The type is `Clone` because resolution results are memoized per
/// serializer graph and a cached failure is re-surfaced on every use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An abstract declared type with no concrete mapping in any source.
    NoMapping {
        declared: Cow<'static, str>,
        member: Option<Cow<'static, str>>,
    },
    /// A mapping resolved to a type that cannot stand in for the declared one.
    TypeMismatch {
        declared: Cow<'static, str>,
        concrete: Cow<'static, str>,
        member: Option<Cow<'static, str>>,
    },
    /// More than one usable constructor and no single designation.
    AmbiguousConstructor {
        type_path: Cow<'static, str>,
        /// `true` when the ambiguity is several designated constructors.
        designated: bool,
    },
    /// The type has no way to be instantiated.
    NotConstructible { type_path: Cow<'static, str> },
    /// The type was never registered.
    NotRegistered { type_path: Cow<'static, str> },
    /// Input text does not conform to the wire grammar.
    MalformedInput { detail: String },
    /// A value node has the wrong shape for its destination.
    UnexpectedValue {
        expected: Cow<'static, str>,
        at: Cow<'static, str>,
    },
    /// An encrypt marker was reached but no cipher is configured.
    NoCipher { at: Cow<'static, str> },
    /// The configured cipher rejected a ciphertext.
    Cipher { detail: Cow<'static, str> },
}

impl CodecError {
    pub(crate) fn no_mapping(declared: &'static str, member: Option<&'static str>) -> Self {
        Self::NoMapping {
            declared: Cow::Borrowed(declared),
            member: member.map(Cow::Borrowed),
        }
    }

    pub(crate) fn type_mismatch(
        declared: &'static str,
        concrete: &'static str,
        member: Option<&'static str>,
    ) -> Self {
        Self::TypeMismatch {
            declared: Cow::Borrowed(declared),
            concrete: Cow::Borrowed(concrete),
            member: member.map(Cow::Borrowed),
        }
    }

    pub(crate) fn not_registered(type_path: &'static str) -> Self {
        Self::NotRegistered {
            type_path: Cow::Borrowed(type_path),
        }
    }

    pub(crate) fn unexpected(expected: &'static str, at: impl Into<Cow<'static, str>>) -> Self {
        Self::UnexpectedValue {
            expected: Cow::Borrowed(expected),
            at: at.into(),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMapping { declared, member } => match member {
                Some(member) => write!(
                    f,
                    "no concrete mapping for abstract type `{declared}` at member `{member}`"
                ),
                None => write!(f, "no concrete mapping for abstract type `{declared}`"),
            },
            Self::TypeMismatch {
                declared,
                concrete,
                member,
            } => match member {
                Some(member) => write!(
                    f,
                    "mapped type `{concrete}` does not implement `{declared}` (member `{member}`)"
                ),
                None => write!(f, "mapped type `{concrete}` does not implement `{declared}`"),
            },
            Self::AmbiguousConstructor {
                type_path,
                designated,
            } => {
                if *designated {
                    write!(f, "type `{type_path}` designates more than one constructor")
                } else {
                    write!(
                        f,
                        "type `{type_path}` has multiple constructors and none is designated"
                    )
                }
            }
            Self::NotConstructible { type_path } => {
                write!(f, "type `{type_path}` cannot be instantiated")
            }
            Self::NotRegistered { type_path } => {
                write!(f, "type `{type_path}` is not registered")
            }
            Self::MalformedInput { detail } => write!(f, "malformed input: {detail}"),
            Self::UnexpectedValue { expected, at } => {
                write!(f, "expected {expected} at `{at}`")
            }
            Self::NoCipher { at } => {
                write!(f, "encrypt marker at `{at}` but no cipher is configured")
            }
            Self::Cipher { detail } => write!(f, "cipher error: {detail}"),
        }
    }
}

impl error::Error for CodecError {}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedInput {
            detail: value.to_string(),
        }
    }
}
