//! Revocation store adapters for `wallet_auth::RevocationStore`.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRevocationStore;
pub use postgres::PostgresRevocationStore;
