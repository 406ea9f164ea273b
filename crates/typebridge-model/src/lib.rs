//! The intermediate type model every other typebridge crate speaks.
//!
//! A [`TypeModel`] is produced either by scanning annotated Rust sources or by parsing the
//! introspection JSON of a remote schema. It never embeds object structure inside a
//! [`TypeRef`]: objects and interfaces are referenced by name and resolved against the model.

mod cache_policy;
mod definitions;
pub mod introspection;
mod model;
pub mod names;
mod type_ref;
mod wire;

pub use cache_policy::{CachePolicy, CachePolicyParseError};
pub use definitions::{
    Argument, EnumDef, EnumValueDef, FieldDef, FunctionDef, InputObjectDef, InterfaceDef, ObjectDef, ScalarDef,
};
pub use model::{Definition, TypeModel};
pub use type_ref::{builtin, TypeRef};
pub use wire::{Number, WireKind, WireValue};
