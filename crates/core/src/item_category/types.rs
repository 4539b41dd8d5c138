//! Item category domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, ItemCategoryId, OrganizationId, UserId};

use crate::accounts::AccountRole;
use crate::filter::{FieldMeta, FieldType};

/// Fields a category list can be filtered and sorted by.
pub const ITEM_CATEGORY_FIELDS: &[FieldMeta] = &[
    FieldMeta::sortable("name", FieldType::Text),
    FieldMeta::filter_only("description", FieldType::Text),
    FieldMeta::sortable("created_at", FieldType::Date),
    FieldMeta::sortable("updated_at", FieldType::Date),
];

/// A stored item category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCategory {
    /// Category ID.
    pub id: ItemCategoryId,
    /// Owning tenant.
    pub organization_id: OrganizationId,
    /// Name, unique within the tenant.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Income account credited on sale.
    pub sell_account_id: Option<AccountId>,
    /// Expense account debited with cost of sale.
    pub cost_account_id: Option<AccountId>,
    /// Inventory asset account.
    pub inventory_account_id: Option<AccountId>,
    /// User who created the category.
    pub user_id: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a category, used for both create and edit.
///
/// Edit replaces every field: an omitted account reference clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCategoryInput {
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Sell account.
    #[serde(default)]
    pub sell_account_id: Option<AccountId>,
    /// Cost account.
    #[serde(default)]
    pub cost_account_id: Option<AccountId>,
    /// Inventory account.
    #[serde(default)]
    pub inventory_account_id: Option<AccountId>,
}

impl ItemCategoryInput {
    /// Supplied account references in validation order.
    pub fn account_refs(&self) -> impl Iterator<Item = (AccountRole, AccountId)> + '_ {
        [
            (AccountRole::Sell, self.sell_account_id),
            (AccountRole::Cost, self.cost_account_id),
            (AccountRole::Inventory, self.inventory_account_id),
        ]
        .into_iter()
        .filter_map(|(role, id)| id.map(|id| (role, id)))
    }
}

/// A category together with the number of items assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCategoryWithCount {
    /// The category.
    #[serde(flatten)]
    pub category: ItemCategory,
    /// Items referencing the category. Derived, never stored.
    pub item_count: u64,
}
