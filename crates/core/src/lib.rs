//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `accounts` - Chart-of-accounts classification and account roles
//! - `context` - Tenant and actor scope of a request
//! - `events` - Domain events and the outbound event queue
//! - `filter` - Dynamic list filtering, sorting and pagination descriptors
//! - `item_category` - Item category lifecycle service
//! - `ledger` - Manual journal line validation
//! - `reports` - Profit & loss statement shaping

pub mod accounts;
pub mod context;
pub mod events;
pub mod filter;
pub mod item_category;
pub mod ledger;
pub mod reports;

pub use context::TenantContext;
