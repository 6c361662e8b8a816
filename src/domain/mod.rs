//! # Domain Layer
//!
//! The domain layer contains the data model and invariants of the campus app.
//! It is independent of any HTTP or storage concerns.
//!
//! ## Structure
//!
//! - **entities**: User, Event, Club, Listing and Post with their repository traits
//! - **value_objects**: Pagination, search terms, coordinates, image URLs
//! - **services**: Relationship mutators and the effects they produce
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Entities are data plus predicate functions
//! - Mutators are pure and return effects for a repository to apply
//! - Repository traits define data access contracts

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
