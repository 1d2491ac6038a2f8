//! Resolution: declared type to concrete type, and struct layout to
//! deserialization plan. Both run once per serializer graph and are
//! memoized by the cache layer.

mod construct;
mod mapping;

pub(crate) use construct::{DePlan, PlanKind, resolve_plan};
pub(crate) use mapping::resolve_concrete;
