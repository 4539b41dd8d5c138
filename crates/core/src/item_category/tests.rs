//! Tests for the item category service, run against an in-memory store.

use async_trait::async_trait;
use tally_shared::types::{AccountId, ItemCategoryId, ItemId, OrganizationId, UserId};
use tokio::sync::Mutex;

use super::*;
use crate::accounts::{AccountRef, AccountRole, AccountSubtype, AccountType};
use crate::context::TenantContext;
use crate::events::{EventPayload, PendingEvents};
use crate::filter::{FilterDescriptor, FilterError, SortOrder, ValidatedFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Write {
    Insert(ItemCategoryId),
    Update(ItemCategoryId),
    Unassociate(Vec<ItemCategoryId>),
    Delete(Vec<ItemCategoryId>),
}

#[derive(Debug, Clone)]
struct FakeItem {
    id: ItemId,
    organization_id: OrganizationId,
    category_id: Option<ItemCategoryId>,
}

#[derive(Default)]
struct FakeState {
    categories: Vec<ItemCategory>,
    accounts: Vec<(OrganizationId, AccountRef)>,
    items: Vec<FakeItem>,
    writes: Vec<Write>,
    /// Reject the next insert or update as a unique-name violation.
    name_taken_at_write: bool,
}

#[derive(Default)]
struct FakeStore {
    state: Mutex<FakeState>,
}

impl FakeStore {
    async fn add_account(
        &self,
        organization_id: OrganizationId,
        account_type: AccountType,
        subtype: Option<AccountSubtype>,
    ) -> AccountId {
        let id = AccountId::new();
        self.state.lock().await.accounts.push((
            organization_id,
            AccountRef {
                id,
                code: "1000".to_string(),
                name: "Account".to_string(),
                account_type,
                account_subtype: subtype,
            },
        ));
        id
    }

    async fn add_item(
        &self,
        organization_id: OrganizationId,
        category_id: Option<ItemCategoryId>,
    ) -> ItemId {
        let id = ItemId::new();
        self.state.lock().await.items.push(FakeItem {
            id,
            organization_id,
            category_id,
        });
        id
    }

    async fn item_category(&self, id: ItemId) -> Option<ItemCategoryId> {
        self.state
            .lock()
            .await
            .items
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| item.category_id)
    }

    /// Another writer commits the same name after the service's pre-check.
    async fn race_next_write(&self) {
        self.state.lock().await.name_taken_at_write = true;
    }

    async fn writes(&self) -> Vec<Write> {
        self.state.lock().await.writes.clone()
    }

    async fn category_count(&self) -> usize {
        self.state.lock().await.categories.len()
    }
}

#[async_trait]
impl ItemCategoryStore for FakeStore {
    async fn find_category(
        &self,
        organization_id: OrganizationId,
        id: ItemCategoryId,
    ) -> Result<Option<ItemCategory>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .categories
            .iter()
            .find(|c| c.organization_id == organization_id && c.id == id)
            .cloned())
    }

    async fn find_categories(
        &self,
        organization_id: OrganizationId,
        ids: &[ItemCategoryId],
    ) -> Result<Vec<ItemCategory>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .categories
            .iter()
            .filter(|c| c.organization_id == organization_id && ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn name_exists(
        &self,
        organization_id: OrganizationId,
        name: &str,
        exclude: Option<ItemCategoryId>,
    ) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        Ok(state.categories.iter().any(|c| {
            c.organization_id == organization_id && c.name == name && Some(c.id) != exclude
        }))
    }

    async fn find_account(
        &self,
        organization_id: OrganizationId,
        id: AccountId,
    ) -> Result<Option<AccountRef>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .find(|(org, account)| *org == organization_id && account.id == id)
            .map(|(_, account)| account.clone()))
    }

    async fn insert_category(&self, category: &ItemCategory) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if std::mem::take(&mut state.name_taken_at_write) {
            return Err(StoreError::Conflict(
                "item_categories_organization_id_name_key".to_string(),
            ));
        }
        state.writes.push(Write::Insert(category.id));
        state.categories.push(category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &ItemCategory) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if std::mem::take(&mut state.name_taken_at_write) {
            return Err(StoreError::Conflict(
                "item_categories_organization_id_name_key".to_string(),
            ));
        }
        state.writes.push(Write::Update(category.id));
        let row = state
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| StoreError::Backend("missing row".to_string()))?;
        *row = category.clone();
        Ok(())
    }

    async fn unassociate_items(
        &self,
        organization_id: OrganizationId,
        ids: &[ItemCategoryId],
    ) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        state.writes.push(Write::Unassociate(ids.to_vec()));
        let mut touched = 0;
        for item in &mut state.items {
            if item.organization_id == organization_id
                && item.category_id.is_some_and(|id| ids.contains(&id))
            {
                item.category_id = None;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn delete_categories(
        &self,
        organization_id: OrganizationId,
        ids: &[ItemCategoryId],
    ) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        state.writes.push(Write::Delete(ids.to_vec()));
        let referenced = state.items.iter().any(|item| {
            item.category_id.is_some_and(|id| ids.contains(&id))
        });
        if referenced {
            return Err(StoreError::Backend("foreign key violation".to_string()));
        }
        let before = state.categories.len();
        state
            .categories
            .retain(|c| !(c.organization_id == organization_id && ids.contains(&c.id)));
        Ok((before - state.categories.len()) as u64)
    }

    async fn count_items(
        &self,
        organization_id: OrganizationId,
        id: ItemCategoryId,
    ) -> Result<u64, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .iter()
            .filter(|item| item.organization_id == organization_id && item.category_id == Some(id))
            .count() as u64)
    }

    async fn list_categories(
        &self,
        organization_id: OrganizationId,
        filter: &ValidatedFilter,
    ) -> Result<(Vec<ItemCategoryWithCount>, u64), StoreError> {
        let state = self.state.lock().await;
        let mut rows: Vec<ItemCategory> = state
            .categories
            .iter()
            .filter(|c| c.organization_id == organization_id)
            .filter(|c| {
                filter
                    .search
                    .as_deref()
                    .is_none_or(|term| c.name.to_lowercase().contains(&term.to_lowercase()))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        if matches!(filter.sort, Some((_, SortOrder::Desc))) {
            rows.reverse();
        }
        let total = rows.len() as u64;
        let page = rows
            .into_iter()
            .skip(usize::try_from(filter.page.offset()).unwrap())
            .take(usize::try_from(filter.page.limit()).unwrap())
            .map(|category| {
                let item_count = state
                    .items
                    .iter()
                    .filter(|item| item.category_id == Some(category.id))
                    .count() as u64;
                ItemCategoryWithCount {
                    category,
                    item_count,
                }
            })
            .collect();
        Ok((page, total))
    }
}

fn tenant() -> TenantContext {
    TenantContext::new(OrganizationId::new(), UserId::new())
}

fn named(name: &str) -> ItemCategoryInput {
    ItemCategoryInput {
        name: name.to_string(),
        ..ItemCategoryInput::default()
    }
}

#[tokio::test]
async fn test_create_with_valid_accounts() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let sell = store
        .add_account(ctx.organization_id, AccountType::Income, Some(AccountSubtype::OperatingIncome))
        .await;
    let cost = store
        .add_account(ctx.organization_id, AccountType::Expense, Some(AccountSubtype::CostOfGoodsSold))
        .await;
    let inventory = store
        .add_account(ctx.organization_id, AccountType::Asset, Some(AccountSubtype::Inventory))
        .await;

    let service = ItemCategoryService::new(&store, &events);
    let category = service
        .create(
            &ctx,
            ItemCategoryInput {
                name: "Hardware".to_string(),
                description: Some("Nuts and bolts".to_string()),
                sell_account_id: Some(sell),
                cost_account_id: Some(cost),
                inventory_account_id: Some(inventory),
            },
        )
        .await
        .unwrap();

    assert_eq!(category.organization_id, ctx.organization_id);
    assert_eq!(category.user_id, ctx.user_id);
    assert_eq!(category.sell_account_id, Some(sell));
    assert_eq!(store.writes().await, vec![Write::Insert(category.id)]);

    let published = events.take();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].name(), "item_category.created");
}

#[tokio::test]
async fn test_create_duplicate_name_writes_nothing() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    service.create(&ctx, named("Hardware")).await.unwrap();
    events.take();

    let result = service.create(&ctx, named("Hardware")).await;
    assert!(matches!(result, Err(ItemCategoryError::NameExists(name)) if name == "Hardware"));
    assert_eq!(store.writes().await.len(), 1);
    assert_eq!(store.category_count().await, 1);
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_name_uniqueness_is_case_sensitive_and_per_tenant() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let service = ItemCategoryService::new(&store, &events);
    let ctx = tenant();

    service.create(&ctx, named("Hardware")).await.unwrap();
    service.create(&ctx, named("hardware")).await.unwrap();
    service.create(&tenant(), named("Hardware")).await.unwrap();

    assert_eq!(store.category_count().await, 3);
}

#[tokio::test]
async fn test_sell_account_must_be_income() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let expense = store
        .add_account(ctx.organization_id, AccountType::Expense, Some(AccountSubtype::OperatingExpense))
        .await;
    let service = ItemCategoryService::new(&store, &events);

    let result = service
        .create(
            &ctx,
            ItemCategoryInput {
                sell_account_id: Some(expense),
                ..named("Hardware")
            },
        )
        .await;

    match result {
        Err(ItemCategoryError::AccountWrongRole {
            role,
            id,
            account_type,
        }) => {
            assert_eq!(role, AccountRole::Sell);
            assert_eq!(id, expense);
            assert_eq!(account_type, AccountType::Expense);
        }
        other => panic!("expected AccountWrongRole, got {other:?}"),
    }
    assert!(store.writes().await.is_empty());
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_account_from_other_tenant_is_not_found() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let foreign = store
        .add_account(OrganizationId::new(), AccountType::Income, None)
        .await;
    let service = ItemCategoryService::new(&store, &events);

    let result = service
        .create(
            &ctx,
            ItemCategoryInput {
                sell_account_id: Some(foreign),
                ..named("Hardware")
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(ItemCategoryError::AccountNotFound { role: AccountRole::Sell, id }) if id == foreign
    ));
    assert!(store.writes().await.is_empty());
}

#[tokio::test]
async fn test_accounts_are_checked_in_sell_cost_inventory_order() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let bank = store
        .add_account(ctx.organization_id, AccountType::Asset, Some(AccountSubtype::Bank))
        .await;
    let service = ItemCategoryService::new(&store, &events);

    // cost is missing and inventory has the wrong subtype; cost is reported first
    let result = service
        .create(
            &ctx,
            ItemCategoryInput {
                cost_account_id: Some(AccountId::new()),
                inventory_account_id: Some(bank),
                ..named("Hardware")
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(ItemCategoryError::AccountNotFound {
            role: AccountRole::Cost,
            ..
        })
    ));
}

#[tokio::test]
async fn test_edit_replaces_fields_and_keeps_own_name() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let sell = store
        .add_account(ctx.organization_id, AccountType::Income, None)
        .await;
    let service = ItemCategoryService::new(&store, &events);

    let created = service
        .create(
            &ctx,
            ItemCategoryInput {
                sell_account_id: Some(sell),
                ..named("Hardware")
            },
        )
        .await
        .unwrap();
    events.take();

    let edited = service
        .edit(
            &ctx,
            created.id,
            ItemCategoryInput {
                description: Some("Tools".to_string()),
                ..named("Hardware")
            },
        )
        .await
        .unwrap();

    assert_eq!(edited.id, created.id);
    assert_eq!(edited.created_at, created.created_at);
    assert_eq!(edited.description.as_deref(), Some("Tools"));
    assert_eq!(edited.sell_account_id, None);

    let published = events.take();
    assert_eq!(published.len(), 1);
    match &published[0].payload {
        EventPayload::ItemCategoryEdited { category, previous } => {
            assert_eq!(category, &edited);
            assert_eq!(previous, &created);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_edit_to_taken_name_fails() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    service.create(&ctx, named("Hardware")).await.unwrap();
    let tools = service.create(&ctx, named("Tools")).await.unwrap();

    let result = service.edit(&ctx, tools.id, named("Hardware")).await;
    assert!(matches!(result, Err(ItemCategoryError::NameExists(_))));
    assert!(!store.writes().await.contains(&Write::Update(tools.id)));
}

#[tokio::test]
async fn test_create_loses_race_for_name() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    store.race_next_write().await;
    let result = service.create(&ctx, named("Hardware")).await;

    assert!(matches!(result, Err(ItemCategoryError::NameExists(name)) if name == "Hardware"));
    assert_eq!(store.category_count().await, 0);
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_edit_loses_race_for_name() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    let tools = service.create(&ctx, named("Tools")).await.unwrap();
    events.take();

    store.race_next_write().await;
    let result = service.edit(&ctx, tools.id, named("Hardware")).await;

    assert!(matches!(result, Err(ItemCategoryError::NameExists(name)) if name == "Hardware"));
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_edit_missing_category() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let service = ItemCategoryService::new(&store, &events);
    let id = ItemCategoryId::new();

    let result = service.edit(&tenant(), id, named("Hardware")).await;
    assert!(matches!(result, Err(ItemCategoryError::NotFound(missing)) if missing == id));
}

#[tokio::test]
async fn test_delete_unassociates_items_first() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    let category = service.create(&ctx, named("Hardware")).await.unwrap();
    let bolt = store.add_item(ctx.organization_id, Some(category.id)).await;
    let nut = store.add_item(ctx.organization_id, Some(category.id)).await;
    events.take();

    service.delete(&ctx, category.id).await.unwrap();

    assert_eq!(
        store.writes().await[1..],
        [
            Write::Unassociate(vec![category.id]),
            Write::Delete(vec![category.id]),
        ]
    );
    assert_eq!(store.item_category(bolt).await, None);
    assert_eq!(store.item_category(nut).await, None);
    assert_eq!(store.category_count().await, 0);
    assert_eq!(events.take()[0].name(), "item_category.deleted");
}

#[tokio::test]
async fn test_delete_missing_category() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let service = ItemCategoryService::new(&store, &events);

    let result = service.delete(&tenant(), ItemCategoryId::new()).await;
    assert!(matches!(result, Err(ItemCategoryError::NotFound(_))));
    assert!(store.writes().await.is_empty());
}

#[tokio::test]
async fn test_bulk_delete_with_missing_id_deletes_nothing() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    let hardware = service.create(&ctx, named("Hardware")).await.unwrap();
    let tools = service.create(&ctx, named("Tools")).await.unwrap();
    events.take();
    let ghost = ItemCategoryId::new();

    let result = service
        .bulk_delete(&ctx, &[hardware.id, ghost, tools.id])
        .await;

    assert!(matches!(result, Err(ItemCategoryError::NotFoundMany(missing)) if missing == vec![ghost]));
    assert_eq!(store.category_count().await, 2);
    assert_eq!(store.writes().await.len(), 2);
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_bulk_delete_collapses_duplicates() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    let hardware = service.create(&ctx, named("Hardware")).await.unwrap();
    let tools = service.create(&ctx, named("Tools")).await.unwrap();
    let item = store.add_item(ctx.organization_id, Some(tools.id)).await;
    events.take();

    let deleted = service
        .bulk_delete(&ctx, &[hardware.id, tools.id, hardware.id])
        .await
        .unwrap();

    assert_eq!(deleted, vec![hardware.id, tools.id]);
    assert_eq!(store.category_count().await, 0);
    assert_eq!(store.item_category(item).await, None);

    let published = events.take();
    assert_eq!(published.len(), 1);
    assert_eq!(
        published[0].payload,
        EventPayload::ItemCategoriesBulkDeleted {
            category_ids: vec![hardware.id, tools.id]
        }
    );
}

#[tokio::test]
async fn test_bulk_delete_dedups_long_repeated_selection() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    let hardware = service.create(&ctx, named("Hardware")).await.unwrap();
    let tools = service.create(&ctx, named("Tools")).await.unwrap();
    let paint = service.create(&ctx, named("Paint")).await.unwrap();
    events.take();

    let selection: Vec<ItemCategoryId> = [tools.id, paint.id, tools.id, hardware.id]
        .iter()
        .copied()
        .cycle()
        .take(4 * MAX_BULK_DELETE)
        .collect();
    let deleted = service.bulk_delete(&ctx, &selection).await.unwrap();

    assert_eq!(deleted, vec![tools.id, paint.id, hardware.id]);
    assert_eq!(store.category_count().await, 0);
}

#[tokio::test]
async fn test_bulk_delete_rejects_oversized_selection() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let service = ItemCategoryService::new(&store, &events);

    let selection: Vec<ItemCategoryId> = (0..=MAX_BULK_DELETE)
        .map(|_| ItemCategoryId::new())
        .collect();
    let result = service.bulk_delete(&tenant(), &selection).await;

    assert!(matches!(
        result,
        Err(ItemCategoryError::SelectionTooLarge { max, given })
            if max == MAX_BULK_DELETE && given == MAX_BULK_DELETE + 1
    ));
    assert!(store.writes().await.is_empty());
}

#[tokio::test]
async fn test_bulk_delete_empty_selection() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let service = ItemCategoryService::new(&store, &events);

    let result = service.bulk_delete(&tenant(), &[]).await;
    assert!(matches!(result, Err(ItemCategoryError::EmptySelection)));
}

#[tokio::test]
async fn test_get_includes_item_count() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    let category = service.create(&ctx, named("Hardware")).await.unwrap();
    store.add_item(ctx.organization_id, Some(category.id)).await;
    store.add_item(ctx.organization_id, Some(category.id)).await;
    store.add_item(ctx.organization_id, None).await;

    let fetched = service.get(&ctx, category.id).await.unwrap();
    assert_eq!(fetched.category, category);
    assert_eq!(fetched.item_count, 2);

    let other_tenant = service.get(&tenant(), category.id).await;
    assert!(matches!(other_tenant, Err(ItemCategoryError::NotFound(_))));
}

#[tokio::test]
async fn test_list_pages_and_searches() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let ctx = tenant();
    let service = ItemCategoryService::new(&store, &events);

    for name in ["Bolts", "Nuts", "Washers", "Tools"] {
        service.create(&ctx, named(name)).await.unwrap();
    }

    let mut descriptor = FilterDescriptor::default();
    descriptor.page.per_page = 3;
    let page = service.list(&ctx, &descriptor).await.unwrap();
    assert_eq!(page.data.len(), 3);
    assert_eq!(page.meta.total, 4);
    assert_eq!(page.meta.total_pages, 2);

    descriptor.search = Some("OL".to_string());
    let page = service.list(&ctx, &descriptor).await.unwrap();
    let names: Vec<&str> = page.data.iter().map(|c| c.category.name.as_str()).collect();
    assert_eq!(names, vec!["Bolts", "Tools"]);
}

#[tokio::test]
async fn test_list_rejects_unknown_sort_field() {
    let store = FakeStore::default();
    let events = PendingEvents::new();
    let service = ItemCategoryService::new(&store, &events);

    let descriptor = FilterDescriptor {
        sort_by: Some("sell_account_id".to_string()),
        ..FilterDescriptor::default()
    };
    let result = service.list(&tenant(), &descriptor).await;
    assert!(matches!(
        result,
        Err(ItemCategoryError::Filter(FilterError::UnknownField(_)))
    ));
}

mod unit_tests {
    use super::*;

    #[test]
    fn test_account_refs_skip_missing_roles() {
        let inventory = AccountId::new();
        let input = ItemCategoryInput {
            inventory_account_id: Some(inventory),
            ..named("Hardware")
        };
        let refs: Vec<_> = input.account_refs().collect();
        assert_eq!(refs, vec![(AccountRole::Inventory, inventory)]);
    }

    #[test]
    fn test_wrong_role_message() {
        let err = ItemCategoryError::AccountWrongRole {
            role: AccountRole::Sell,
            id: AccountId::from_uuid(uuid::Uuid::nil()),
            account_type: AccountType::Expense,
        };
        assert_eq!(
            err.to_string(),
            "The sell account 00000000-0000-0000-0000-000000000000 has type expense, expected an income account"
        );
    }
}
