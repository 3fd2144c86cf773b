//! # waybill-engine: Shipping Rate Engine
//!
//! Combines the pure rate logic in `waybill-core` with the catalog in
//! `waybill-db` behind one async operation surface, [`RateEngine`].
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  admin / checkout service                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  waybill-engine (THIS CRATE)                     │  │
//! │  │                                                                  │  │
//! │  │  RateEngine ──► WriteGate ──► CatalogTransaction (writes)        │  │
//! │  │      │                                                           │  │
//! │  │      ├──► BulkMutationCoordinator (bulk create/update, copy)     │  │
//! │  │      │                                                           │  │
//! │  │      └──► resolver / pricing / ConflictValidator (waybill-core)  │  │
//! │  │                                                                  │  │
//! │  │  EngineConfig (TOML + env)     init_tracing (tracing-subscriber) │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  waybill-db ──► SQLite                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use waybill_engine::{init_tracing, EngineConfig, RateEngine};
//!
//! init_tracing();
//! let engine = RateEngine::connect(&EngineConfig::load(None)?).await?;
//!
//! let quote = engine.quote(method_id, zone_id, 2_000, 3_000).await?;
//! println!("{} (free: {})", quote.cost.minor(), quote.is_free);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bulk;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod logging;
pub mod outcome;

// =============================================================================
// Re-exports
// =============================================================================

pub use bulk::BulkMutationCoordinator;
pub use config::{CatalogSettings, DatabaseSettings, EngineConfig};
pub use engine::RateEngine;
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult, ErrorCode, ErrorPayload};
pub use gate::{WriteGate, WriteScope};
pub use logging::init_tracing;
pub use outcome::{BulkCreateOutcome, BulkUpdateOutcome, DuplicateOutcome, Quote, SkippedRate};
