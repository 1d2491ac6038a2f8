//! Built-in [`Describe`](crate::registry::Describe) implementations:
//! the primitive scalars and `Vec<T>`.

mod list;
mod scalars;
