//! # waybill-db: Rate Catalog Storage for Waybill
//!
//! SQLite persistence for shipping methods, zones and rates, using sqlx
//! for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Waybill Data Flow                                │
//! │                                                                         │
//! │  RateEngine::quote / bulk_create                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    waybill-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ RateRepository │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ MethodRepo     │   │ 001_shipping │   │   │
//! │  │   │ begin()       │    │ ZoneRepo       │   │   _schema    │   │   │
//! │  │   │               │    │ CatalogTx      │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (rate, method, zone)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use waybill_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("waybill.db")).await?;
//! let rates = db.rates().find_active_for(1, 2).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::method::MethodRepository;
pub use repository::rate::RateRepository;
pub use repository::transaction::CatalogTransaction;
pub use repository::zone::ZoneRepository;
