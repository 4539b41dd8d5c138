//! Chart-of-accounts classification.
//!
//! Root types and subtypes decide which accounts may back an item category role
//! and which profit & loss section an account lands in.

pub mod role;
pub mod types;

pub use role::AccountRole;
pub use types::{AccountRef, AccountSubtype, AccountType, NormalBalance};
