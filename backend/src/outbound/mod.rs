//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **mercadopago**: reqwest client for the hosted-checkout gateway
//! - **argon2_hasher**: Argon2id password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod argon2_hasher;
pub mod mercadopago;
pub mod persistence;
