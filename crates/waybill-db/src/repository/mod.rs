//! # Repository Module
//!
//! Database repository implementations for the shipping catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  RateEngine                                                            │
//! │       │                                                                 │
//! │       │  db.rates().find_active_for(1, 2)          (reads)             │
//! │       │  db.begin() → CatalogTransaction            (writes)           │
//! │       ▼                                                                 │
//! │  RateRepository / MethodRepository / ZoneRepository                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`RateRepository`](rate::RateRepository) - Rate reads and trusted inserts
//! - [`MethodRepository`](method::MethodRepository) - Shipping method registration
//! - [`ZoneRepository`](zone::ZoneRepository) - Shipping zone registration
//! - [`CatalogTransaction`](transaction::CatalogTransaction) - Serialized writes

pub mod method;
pub mod rate;
pub mod transaction;
pub mod zone;
