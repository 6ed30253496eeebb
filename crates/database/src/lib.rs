//! # Reflex Database Crate
//!
//! This crate is the Attempt Store: the only shared mutable resource in the
//! system. It hides SQL and driver details behind the `AttemptStore` trait.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** all database-specific logic lives here. The rest of the
//!   application talks to `dyn AttemptStore` and never sees SQL.
//! - **Single-statement operations:** every trait method is one read or one
//!   write, relying on the store's own transactional guarantees. There is no
//!   application-level locking.
//! - **Asynchronous & Pooled:** the PostgreSQL implementation uses a `PgPool`
//!   for concurrent access.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: build the pool and bring the schema up to date.
//! - `AttemptStore`: the typed query interface.
//! - `DbRepository`: the PostgreSQL implementation.
//! - `InMemoryStore`: a non-durable implementation for development and tests.
//! - `DbError`: the error type returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::InMemoryStore;
pub use repository::DbRepository;
pub use store::AttemptStore;
