//! Persistence seam for the item category service.

use async_trait::async_trait;
use tally_shared::types::{AccountId, ItemCategoryId, OrganizationId};

use super::error::StoreError;
use super::types::{ItemCategory, ItemCategoryWithCount};
use crate::accounts::AccountRef;
use crate::filter::ValidatedFilter;

/// Storage operations the item category service relies on.
///
/// Every lookup is scoped to a tenant. Implementations are expected to run all calls of one
/// service operation inside a single transaction.
#[async_trait]
pub trait ItemCategoryStore: Send + Sync {
    /// Fetches one category.
    async fn find_category(
        &self,
        organization_id: OrganizationId,
        id: ItemCategoryId,
    ) -> Result<Option<ItemCategory>, StoreError>;

    /// Fetches every category among `ids` that exists.
    async fn find_categories(
        &self,
        organization_id: OrganizationId,
        ids: &[ItemCategoryId],
    ) -> Result<Vec<ItemCategory>, StoreError>;

    /// Returns true if a category other than `exclude` has exactly this name.
    async fn name_exists(
        &self,
        organization_id: OrganizationId,
        name: &str,
        exclude: Option<ItemCategoryId>,
    ) -> Result<bool, StoreError>;

    /// Fetches an account of the chart of accounts.
    async fn find_account(
        &self,
        organization_id: OrganizationId,
        id: AccountId,
    ) -> Result<Option<AccountRef>, StoreError>;

    /// Inserts a new category.
    async fn insert_category(&self, category: &ItemCategory) -> Result<(), StoreError>;

    /// Overwrites an existing category.
    async fn update_category(&self, category: &ItemCategory) -> Result<(), StoreError>;

    /// Clears the category reference of every item in any of `ids`. Returns the rows touched.
    async fn unassociate_items(
        &self,
        organization_id: OrganizationId,
        ids: &[ItemCategoryId],
    ) -> Result<u64, StoreError>;

    /// Deletes the categories. Returns the rows removed.
    async fn delete_categories(
        &self,
        organization_id: OrganizationId,
        ids: &[ItemCategoryId],
    ) -> Result<u64, StoreError>;

    /// Counts items assigned to a category.
    async fn count_items(
        &self,
        organization_id: OrganizationId,
        id: ItemCategoryId,
    ) -> Result<u64, StoreError>;

    /// Returns one page of categories matching the filter, and the total match count.
    async fn list_categories(
        &self,
        organization_id: OrganizationId,
        filter: &ValidatedFilter,
    ) -> Result<(Vec<ItemCategoryWithCount>, u64), StoreError>;
}
