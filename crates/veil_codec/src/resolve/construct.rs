use std::borrow::Cow;

use crate::error::CodecError;
use crate::info::StructLayout;

// -----------------------------------------------------------------------------
// DePlan

/// How a struct is instantiated during deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlanKind {
    /// Zero-argument construction, members assigned afterwards.
    ZeroArg,
    /// The constructor at this index in the layout's list.
    Parameterized(usize),
}

/// The once-resolved deserialization plan of a struct type.
#[derive(Debug, Clone)]
pub(crate) struct DePlan {
    pub kind: PlanKind,
    /// Parallel to the layout's members: the parameter slot each member
    /// injects into, or `None` when it is assigned after construction.
    pub inject: Vec<Option<usize>>,
    pub params_len: usize,
}

// -----------------------------------------------------------------------------
// resolve_plan

/// Picks the constructor for a struct layout.
///
/// Selection order: a single designated constructor, else the only
/// parameterized constructor, else the zero-argument constructor.
/// More than one designation, or several undesignated candidates with
/// no zero-argument fallback, is ambiguous.
pub(crate) fn resolve_plan(
    layout: &StructLayout,
    type_path: &'static str,
) -> Result<DePlan, CodecError> {
    let constructors = layout.constructors();
    let mut designated = constructors.iter().enumerate().filter(|(_, c)| c.is_designated());

    let chosen = match (designated.next(), designated.next()) {
        (Some(_), Some(_)) => {
            return Err(CodecError::AmbiguousConstructor {
                type_path: Cow::Borrowed(type_path),
                designated: true,
            });
        }
        (Some((index, _)), None) => Some(index),
        (None, _) if constructors.len() == 1 => Some(0),
        (None, _) => None,
    };

    let index = match chosen {
        Some(index) => index,
        None if layout.has_zero_arg() => {
            return Ok(DePlan {
                kind: PlanKind::ZeroArg,
                inject: vec![None; layout.members().len()],
                params_len: 0,
            });
        }
        None if constructors.len() > 1 => {
            return Err(CodecError::AmbiguousConstructor {
                type_path: Cow::Borrowed(type_path),
                designated: false,
            });
        }
        None => {
            return Err(CodecError::NotConstructible {
                type_path: Cow::Borrowed(type_path),
            });
        }
    };

    let params = constructors[index].params();
    let inject = layout
        .members()
        .iter()
        .map(|member| {
            params
                .iter()
                .position(|param| param.name().eq_ignore_ascii_case(member.name()))
        })
        .collect();

    Ok(DePlan {
        kind: PlanKind::Parameterized(index),
        inject,
        params_len: params.len(),
    })
}
