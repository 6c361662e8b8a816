//! # Domain Services
//!
//! Business rules that span a document's fields rather than a single value.
//!
//! ## Services
//!
//! - **effects**: The effect vocabulary and the routine that applies it to a document
//! - **relationships**: Attend, join, promote, like, comment and availability mutators

pub mod effects;
pub mod relationships;

pub use effects::{apply_effects, Document, Effect, EffectError, OnAbsent, OnDuplicate, SetField};
pub use relationships::*;
