//! Core data model (§3): `Document` and everything that hangs off it.
//!
//! Cyclic references are absent by design — templates are referenced by
//! name, not by pointer, so split/combine stays purely tree-shaped (§9).

mod asset;
mod document;
mod entropy;
mod ir;
pub mod json;
mod state;
mod template;

pub use asset::{AssetBlob, UnknownBlob};
pub use document::{Document, FormatVersion};
pub use entropy::Entropy;
pub use ir::{normalize_expression, ArgMetadata, FuncNode, IrBlock, PropNode, TypeRef, TypedName};
pub use state::{ControlState, PropertyState};
pub use template::{CustomPropertyDef, ScopeRule, TemplateState, TemplateStore};

pub use pasrc_path::NormalizedPath;
