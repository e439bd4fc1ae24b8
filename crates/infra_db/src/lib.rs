//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the billing domain, implemented with SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: `PostgresBillingRepository`
//! implements the domain's `BillingPort`, keeping SQL out of the domain
//! layer. Invoice persistence runs inside a single transaction and relies
//! on a uniqueness constraint over invoiced activity tracks to make
//! double-billing impossible at the storage level.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, PostgresBillingRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/billing")).await?;
//! let repo = PostgresBillingRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::PostgresBillingRepository;
