//! Item category lifecycle.
//!
//! Categories group items and carry the default sell, cost and inventory accounts used when
//! those items are sold or stocked. The service validates every account reference against the
//! chart-of-accounts role rules before anything is written.

pub mod error;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{ItemCategoryError, StoreError};
pub use service::{ItemCategoryService, MAX_BULK_DELETE};
pub use store::ItemCategoryStore;
pub use types::{ITEM_CATEGORY_FIELDS, ItemCategory, ItemCategoryInput, ItemCategoryWithCount};
