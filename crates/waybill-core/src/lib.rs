//! # waybill-core: Pure Rate Logic for Waybill
//!
//! This crate holds every decision the shipping rate engine makes, as pure
//! functions over explicit value types. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Waybill Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Admin service layer (external)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          waybill-engine (quote, bulk create, duplicate)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ waybill-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   range   │  │ resolver  │  │  pricing  │  │ conflict  │  │   │
//! │  │   │ Interval  │  │  resolve  │  │   cost    │  │ Conflict  │  │   │
//! │  │   │ RateRange │  │ tie-break │  │ threshold │  │ Validator │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 waybill-db (Rate catalog, SQLite)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ShippingRate, ShippingMethod, ShippingZone)
//! - [`range`] - Weight and total intervals
//! - [`resolver`] - Selects the single applicable rate
//! - [`pricing`] - Flat-rate cost with free-shipping threshold
//! - [`conflict`] - Overlap detection for single rows and batches
//! - [`money`] - Integer minor-unit money
//! - [`weight`] - Gram convention for weights
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use waybill_core::{pricing, resolver, Interval, RateRange};
//! # use waybill_core::ShippingRate;
//! # fn rates() -> Vec<ShippingRate> { Vec::new() }
//!
//! let range = RateRange::new(Interval::new(0, Some(5000)), Interval::new(0, Some(5000)));
//! assert!(range.contains(2000, 3000));
//!
//! let rates = rates();
//! if let Ok(rate) = resolver::resolve(&rates, 1, 2, 2000, 3000) {
//!     let charge = pricing::cost(rate, 3000);
//!     println!("shipping costs {}", charge.cost.minor());
//! }
//! ```

pub mod conflict;
pub mod error;
pub mod money;
pub mod pricing;
pub mod range;
pub mod resolver;
pub mod types;
pub mod validation;
pub mod weight;

pub use conflict::{CandidateRejection, ConflictValidator, RejectionReason};
pub use error::{ConflictSource, RateError, RateResult, ValidationError};
pub use money::Money;
pub use pricing::ShippingCost;
pub use range::{Interval, RateRange};
pub use types::*;

/// Largest batch accepted by bulk create and bulk update when no
/// configuration overrides it.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;
