//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain's repository ports backed by
//! PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Business rules stay in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: Diesel and pool failures are classified once in
//!   `diesel_error_mapping` and surface as each port's error enum.
//!
//! # Example
//!
//! ```no_run
//! use pazanimal::outbound::persistence::{DbPool, DieselVolunteerRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), pazanimal::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/pazanimal")).await?;
//! let volunteers = DieselVolunteerRepository::new(pool.clone());
//! # let _ = volunteers;
//! # Ok(())
//! # }
//! ```

mod diesel_audit_log_repository;
mod diesel_donation_repository;
mod diesel_error_mapping;
mod diesel_helpers;
mod diesel_publication_repository;
mod diesel_user_repository;
mod diesel_volunteer_repository;
mod models;
mod pool;
mod schema;

pub use diesel_audit_log_repository::DieselAuditLogRepository;
pub use diesel_donation_repository::DieselDonationRepository;
pub use diesel_publication_repository::DieselPublicationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_volunteer_repository::DieselVolunteerRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
