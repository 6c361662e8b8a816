//! # Campus Hub Library
//!
//! This crate provides the backend of a campus social app with:
//! - RESTful HTTP API endpoints for users, events, clubs, listings and posts
//! - PostgreSQL persistence, or a process-local store for development
//! - Relationship mutations (attend, join, like, ...) applied atomically
//!   per document
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, invariants, relationship mutators and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, in-memory store and metrics
//! - **Presentation Layer**: HTTP routes, handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! campus_hub/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, value objects, and mutators
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Repositories, migrations and metrics
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Common utilities (errors, validation, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
