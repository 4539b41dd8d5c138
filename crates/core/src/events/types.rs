//! Domain event definitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{ItemCategoryId, ItemId, ManualJournalId, OrganizationId, UserId};

use crate::context::TenantContext;
use crate::item_category::ItemCategory;

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventPayload {
    /// An item category was created.
    ItemCategoryCreated {
        /// The new category.
        category: ItemCategory,
    },
    /// An item category was edited.
    ItemCategoryEdited {
        /// The category after the edit.
        category: ItemCategory,
        /// The category before the edit.
        previous: ItemCategory,
    },
    /// An item category was deleted.
    ItemCategoryDeleted {
        /// The removed category.
        category: ItemCategory,
    },
    /// Several item categories were deleted at once.
    ItemCategoriesBulkDeleted {
        /// IDs of the removed categories.
        category_ids: Vec<ItemCategoryId>,
    },
    /// An item was created.
    ItemCreated {
        /// Item ID.
        item_id: ItemId,
        /// Item name.
        name: String,
        /// Assigned category.
        category_id: Option<ItemCategoryId>,
    },
    /// A manual journal was posted to the ledger.
    ManualJournalCreated {
        /// Journal ID.
        journal_id: ManualJournalId,
        /// Journal number.
        journal_number: String,
        /// Sum of debits (equal to the sum of credits).
        amount: Decimal,
    },
}

impl EventPayload {
    /// Dotted event name used by subscribers and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ItemCategoryCreated { .. } => "item_category.created",
            Self::ItemCategoryEdited { .. } => "item_category.edited",
            Self::ItemCategoryDeleted { .. } => "item_category.deleted",
            Self::ItemCategoriesBulkDeleted { .. } => "item_category.bulk_deleted",
            Self::ItemCreated { .. } => "item.created",
            Self::ManualJournalCreated { .. } => "manual_journal.created",
        }
    }
}

/// An event with its tenant scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Tenant the change happened in.
    pub organization_id: OrganizationId,
    /// User who caused the change.
    pub user_id: UserId,
    /// When the change happened.
    pub occurred_at: DateTime<Utc>,
    /// Event details.
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl DomainEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(ctx: &TenantContext, payload: EventPayload) -> Self {
        Self {
            organization_id: ctx.organization_id,
            user_id: ctx.user_id,
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// Dotted event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.payload.name()
    }
}
