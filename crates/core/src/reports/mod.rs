//! Profit & loss statement shaping.
//!
//! Reports are computed on every request from the tenant's accounts and ledger postings. Nothing
//! here is stored or cached.

pub mod error;
pub mod format;
pub mod periods;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use format::format_amount;
pub use periods::date_periods;
pub use service::ProfitLossService;
pub use types::*;
