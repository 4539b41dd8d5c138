//! Item category service.

use std::collections::HashSet;

use chrono::Utc;
use tally_shared::types::{ItemCategoryId, PageResponse};

use super::error::{ItemCategoryError, StoreError};
use super::store::ItemCategoryStore;
use super::types::{ITEM_CATEGORY_FIELDS, ItemCategory, ItemCategoryInput, ItemCategoryWithCount};
use crate::context::TenantContext;
use crate::events::{DomainEvent, EventPayload, EventPublisher};
use crate::filter::FilterDescriptor;

/// Most distinct IDs a single bulk delete accepts.
pub const MAX_BULK_DELETE: usize = 500;

/// Create, edit, delete and query item categories of one tenant.
///
/// All validation runs before the first write. Events are handed to the publisher only after
/// the store calls of an operation have succeeded.
pub struct ItemCategoryService<'a, S: ?Sized, P: ?Sized> {
    store: &'a S,
    events: &'a P,
}

impl<'a, S, P> ItemCategoryService<'a, S, P>
where
    S: ItemCategoryStore + ?Sized,
    P: EventPublisher + ?Sized,
{
    /// Creates a service over a store and an event publisher.
    #[must_use]
    pub const fn new(store: &'a S, events: &'a P) -> Self {
        Self { store, events }
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// `NameExists` if the name is taken in the tenant, `AccountNotFound` or
    /// `AccountWrongRole` for a bad account reference.
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: ItemCategoryInput,
    ) -> Result<ItemCategory, ItemCategoryError> {
        self.validate_input(ctx, &input, None).await?;

        let now = Utc::now();
        let category = ItemCategory {
            id: ItemCategoryId::new(),
            organization_id: ctx.organization_id,
            name: input.name,
            description: input.description,
            sell_account_id: input.sell_account_id,
            cost_account_id: input.cost_account_id,
            inventory_account_id: input.inventory_account_id,
            user_id: ctx.user_id,
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert_category(&category)
            .await
            .map_err(|err| name_conflict(err, &category.name))?;
        self.publish(
            ctx,
            EventPayload::ItemCategoryCreated {
                category: category.clone(),
            },
        );

        Ok(category)
    }

    /// Replaces the editable fields of a category.
    ///
    /// # Errors
    ///
    /// `NotFound` if the category does not exist, otherwise the same errors as [`Self::create`].
    pub async fn edit(
        &self,
        ctx: &TenantContext,
        id: ItemCategoryId,
        input: ItemCategoryInput,
    ) -> Result<ItemCategory, ItemCategoryError> {
        let previous = self.find_or_not_found(ctx, id).await?;
        self.validate_input(ctx, &input, Some(id)).await?;

        let category = ItemCategory {
            name: input.name,
            description: input.description,
            sell_account_id: input.sell_account_id,
            cost_account_id: input.cost_account_id,
            inventory_account_id: input.inventory_account_id,
            updated_at: Utc::now(),
            ..previous.clone()
        };

        self.store
            .update_category(&category)
            .await
            .map_err(|err| name_conflict(err, &category.name))?;
        self.publish(
            ctx,
            EventPayload::ItemCategoryEdited {
                category: category.clone(),
                previous,
            },
        );

        Ok(category)
    }

    /// Deletes a category after detaching its items.
    ///
    /// # Errors
    ///
    /// `NotFound` if the category does not exist.
    pub async fn delete(
        &self,
        ctx: &TenantContext,
        id: ItemCategoryId,
    ) -> Result<ItemCategory, ItemCategoryError> {
        let category = self.find_or_not_found(ctx, id).await?;

        self.store
            .unassociate_items(ctx.organization_id, &[id])
            .await?;
        self.store
            .delete_categories(ctx.organization_id, &[id])
            .await?;

        self.publish(
            ctx,
            EventPayload::ItemCategoryDeleted {
                category: category.clone(),
            },
        );

        Ok(category)
    }

    /// Deletes several categories at once. Either all of them go or none does.
    ///
    /// Returns the deduplicated IDs that were deleted.
    ///
    /// # Errors
    ///
    /// `EmptySelection` for an empty list, `SelectionTooLarge` past [`MAX_BULK_DELETE`]
    /// distinct IDs, `NotFoundMany` listing every missing ID.
    pub async fn bulk_delete(
        &self,
        ctx: &TenantContext,
        ids: &[ItemCategoryId],
    ) -> Result<Vec<ItemCategoryId>, ItemCategoryError> {
        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<ItemCategoryId> = ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if unique.is_empty() {
            return Err(ItemCategoryError::EmptySelection);
        }
        if unique.len() > MAX_BULK_DELETE {
            return Err(ItemCategoryError::SelectionTooLarge {
                max: MAX_BULK_DELETE,
                given: unique.len(),
            });
        }

        let found = self
            .store
            .find_categories(ctx.organization_id, &unique)
            .await?;
        let found: HashSet<ItemCategoryId> = found.iter().map(|category| category.id).collect();
        let missing: Vec<ItemCategoryId> = unique
            .iter()
            .filter(|id| !found.contains(*id))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ItemCategoryError::NotFoundMany(missing));
        }

        self.store
            .unassociate_items(ctx.organization_id, &unique)
            .await?;
        self.store
            .delete_categories(ctx.organization_id, &unique)
            .await?;

        self.publish(
            ctx,
            EventPayload::ItemCategoriesBulkDeleted {
                category_ids: unique.clone(),
            },
        );

        Ok(unique)
    }

    /// Fetches a category with its item count.
    ///
    /// # Errors
    ///
    /// `NotFound` if the category does not exist.
    pub async fn get(
        &self,
        ctx: &TenantContext,
        id: ItemCategoryId,
    ) -> Result<ItemCategoryWithCount, ItemCategoryError> {
        let category = self.find_or_not_found(ctx, id).await?;
        let item_count = self.store.count_items(ctx.organization_id, id).await?;

        Ok(ItemCategoryWithCount {
            category,
            item_count,
        })
    }

    /// Lists categories matching a filter descriptor.
    ///
    /// # Errors
    ///
    /// `Filter` if the descriptor names unknown fields or carries invalid values.
    pub async fn list(
        &self,
        ctx: &TenantContext,
        descriptor: &FilterDescriptor,
    ) -> Result<PageResponse<ItemCategoryWithCount>, ItemCategoryError> {
        let filter = descriptor.validate(ITEM_CATEGORY_FIELDS)?;
        let (rows, total) = self
            .store
            .list_categories(ctx.organization_id, &filter)
            .await?;

        Ok(PageResponse::new(rows, filter.page, total))
    }

    async fn find_or_not_found(
        &self,
        ctx: &TenantContext,
        id: ItemCategoryId,
    ) -> Result<ItemCategory, ItemCategoryError> {
        self.store
            .find_category(ctx.organization_id, id)
            .await?
            .ok_or(ItemCategoryError::NotFound(id))
    }

    /// Name uniqueness first, then each account reference in sell, cost, inventory order.
    async fn validate_input(
        &self,
        ctx: &TenantContext,
        input: &ItemCategoryInput,
        exclude: Option<ItemCategoryId>,
    ) -> Result<(), ItemCategoryError> {
        if self
            .store
            .name_exists(ctx.organization_id, &input.name, exclude)
            .await?
        {
            return Err(ItemCategoryError::NameExists(input.name.clone()));
        }

        for (role, id) in input.account_refs() {
            let account = self
                .store
                .find_account(ctx.organization_id, id)
                .await?
                .ok_or(ItemCategoryError::AccountNotFound { role, id })?;

            if !role.accepts(&account) {
                return Err(ItemCategoryError::AccountWrongRole {
                    role,
                    id,
                    account_type: account.account_type,
                });
            }
        }

        Ok(())
    }

    fn publish(&self, ctx: &TenantContext, payload: EventPayload) {
        self.events.publish(DomainEvent::new(ctx, payload));
    }
}

/// A unique-index rejection at write time means another request took the name between the
/// pre-check and the write.
fn name_conflict(err: StoreError, name: &str) -> ItemCategoryError {
    match err {
        StoreError::Conflict(_) => ItemCategoryError::NameExists(name.to_string()),
        other => ItemCategoryError::Store(other),
    }
}
