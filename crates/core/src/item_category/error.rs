//! Item category error types.

use thiserror::Error;

use tally_shared::types::{AccountId, ItemCategoryId};

use crate::accounts::{AccountRole, AccountType};
use crate::filter::FilterError;

/// Failure reported by an [`ItemCategoryStore`](super::ItemCategoryStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write, usually because a concurrent request
    /// committed the same name first.
    #[error("Conflicting write: {0}")]
    Conflict(String),

    /// Any other persistence failure.
    #[error("Store error: {0}")]
    Backend(String),
}

/// Item category errors.
#[derive(Debug, Error)]
pub enum ItemCategoryError {
    /// No category with this ID in the tenant.
    #[error("Item category not found: {0}")]
    NotFound(ItemCategoryId),

    /// Another category in the tenant already uses this name.
    #[error("Item category name already exists: {0}")]
    NameExists(String),

    /// A referenced account does not exist in the tenant.
    #[error("The {role} account {id} was not found")]
    AccountNotFound {
        /// Role the account was referenced for.
        role: AccountRole,
        /// Referenced account.
        id: AccountId,
    },

    /// A referenced account exists but cannot fill the role.
    #[error("The {role} account {id} has type {account_type}, expected {}", .role.requirement())]
    AccountWrongRole {
        /// Role the account was referenced for.
        role: AccountRole,
        /// Referenced account.
        id: AccountId,
        /// Root type of the referenced account.
        account_type: AccountType,
    },

    /// Bulk delete called without IDs.
    #[error("No item categories selected")]
    EmptySelection,

    /// Bulk delete called with more distinct IDs than one request may remove.
    #[error("At most {max} item categories can be deleted at once, got {given}")]
    SelectionTooLarge {
        /// Upper bound on distinct IDs.
        max: usize,
        /// Distinct IDs received.
        given: usize,
    },

    /// Some IDs of a bulk delete do not exist in the tenant.
    #[error("Item categories not found: {}", join_ids(.0))]
    NotFoundMany(Vec<ItemCategoryId>),

    /// Invalid list filter.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_ids(ids: &[ItemCategoryId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
