//! Infrastructure Layer
//!
//! Storage adapters: PostgreSQL for deployments, in-memory for tests and
//! local runs.

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryAuthRepository, InMemoryRevocationStore};
pub use postgres::PgAuthRepository;
