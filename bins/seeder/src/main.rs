//! Demo data seeder for Tally development.
//!
//! Seeds one organization with a small chart of accounts, an item category, a few items and
//! journals whose profit & loss sheet shows income 1000, cost of sales 400 and expenses 300.
//!
//! Usage: `DATABASE_URL=postgres://... cargo run --bin seeder`

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, Set};
use tally_core::TenantContext;
use tally_core::accounts::AccountSubtype;
use tally_core::events::PendingEvents;
use tally_core::item_category::{ItemCategoryInput, ItemCategoryService};
use tally_core::ledger::{JournalLineInput, JournalSourceType, ManualJournalInput};
use tally_db::entities::{organizations, sea_orm_active_enums::ItemType};
use tally_db::repositories::{CreateAccountInput, CreateItemInput};
use tally_db::{
    AccountRepository, ItemCategoryRepository, ItemRepository, JournalRepository, RlsConnection,
};
use tally_shared::config::DatabaseConfig;
use tally_shared::types::{AccountId, OrganizationId, UserId};
use tracing::info;
use uuid::Uuid;

/// Demo organization ID (stable across runs).
const DEMO_ORG_ID: Uuid = Uuid::from_u128(1);
/// Demo user ID (stable across runs).
const DEMO_USER_ID: Uuid = Uuid::from_u128(2);

struct ChartOfAccounts {
    cash: AccountId,
    inventory: AccountId,
    sales: AccountId,
    cogs: AccountId,
    rent: AccountId,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=info".into()),
        )
        .init();

    let config = DatabaseConfig {
        url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
        max_connections: 2,
        min_connections: 1,
    };
    let db = tally_db::connect(&config).await?;
    info!("Connected to database");

    let ctx = TenantContext::new(
        OrganizationId::from_uuid(DEMO_ORG_ID),
        UserId::from_uuid(DEMO_USER_ID),
    );
    let rls = RlsConnection::new(&db, ctx.organization_id).await?;
    let txn = rls.transaction();

    if organizations::Entity::find_by_id(DEMO_ORG_ID)
        .one(txn)
        .await?
        .is_some()
    {
        info!("Demo organization already exists, skipping");
        return Ok(());
    }

    seed_organization(txn).await?;
    let chart = seed_accounts(txn, ctx.organization_id).await?;
    seed_catalog(txn, &ctx, &chart).await?;
    seed_journals(txn, &ctx, &chart).await?;

    rls.commit().await?;
    info!(organization_id = %ctx.organization_id, "Seeding complete");
    Ok(())
}

async fn seed_organization(txn: &DatabaseTransaction) -> anyhow::Result<()> {
    let now = Utc::now();
    organizations::ActiveModel {
        id: Set(DEMO_ORG_ID),
        name: Set("Demo Hardware Co".to_string()),
        base_currency: Set("USD".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;
    info!("Seeded organization");
    Ok(())
}

async fn seed_accounts(
    txn: &DatabaseTransaction,
    organization_id: OrganizationId,
) -> anyhow::Result<ChartOfAccounts> {
    let repo = AccountRepository::new(txn);

    let chart = ChartOfAccounts {
        cash: create_account(&repo, organization_id, "1000", "Cash", AccountSubtype::Cash).await?,
        inventory: create_account(
            &repo,
            organization_id,
            "1200",
            "Inventory",
            AccountSubtype::Inventory,
        )
        .await?,
        sales: create_account(
            &repo,
            organization_id,
            "4000",
            "Sales",
            AccountSubtype::OperatingIncome,
        )
        .await?,
        cogs: create_account(
            &repo,
            organization_id,
            "5000",
            "Cost of Goods Sold",
            AccountSubtype::CostOfGoodsSold,
        )
        .await?,
        rent: create_account(
            &repo,
            organization_id,
            "6100",
            "Rent",
            AccountSubtype::OperatingExpense,
        )
        .await?,
    };
    for (code, name, subtype) in [
        ("4900", "Interest Income", AccountSubtype::OtherIncome),
        ("7000", "Bank Charges", AccountSubtype::OtherExpense),
    ] {
        create_account(&repo, organization_id, code, name, subtype).await?;
    }

    info!("Seeded chart of accounts");
    Ok(chart)
}

async fn create_account(
    repo: &AccountRepository<'_, DatabaseTransaction>,
    organization_id: OrganizationId,
    code: &str,
    name: &str,
    subtype: AccountSubtype,
) -> anyhow::Result<AccountId> {
    let account = repo
        .create_account(
            organization_id,
            CreateAccountInput {
                code: code.to_string(),
                name: name.to_string(),
                description: None,
                account_type: subtype.root_type(),
                account_subtype: Some(subtype),
                is_active: true,
            },
        )
        .await?;
    Ok(AccountId::from_uuid(account.id))
}

async fn seed_catalog(
    txn: &DatabaseTransaction,
    ctx: &TenantContext,
    chart: &ChartOfAccounts,
) -> anyhow::Result<()> {
    let store = ItemCategoryRepository::new(txn);
    let events = PendingEvents::new();
    let service = ItemCategoryService::new(&store, &events);

    let hardware = service
        .create(
            ctx,
            ItemCategoryInput {
                name: "Hardware".to_string(),
                description: Some("Tools and fasteners".to_string()),
                sell_account_id: Some(chart.sales),
                cost_account_id: Some(chart.cogs),
                inventory_account_id: Some(chart.inventory),
            },
        )
        .await?;
    service
        .create(
            ctx,
            ItemCategoryInput {
                name: "Services".to_string(),
                sell_account_id: Some(chart.sales),
                ..ItemCategoryInput::default()
            },
        )
        .await?;

    let items = ItemRepository::new(txn);
    for (name, sku, price) in [
        ("Claw Hammer", "HW-001", Decimal::new(2499, 2)),
        ("Box of Nails", "HW-002", Decimal::new(599, 2)),
    ] {
        items
            .create_item(
                ctx.organization_id,
                ctx.user_id,
                CreateItemInput {
                    name: name.to_string(),
                    item_type: ItemType::Inventory,
                    sku: Some(sku.to_string()),
                    category_id: Some(hardware.id),
                    sell_price: Some(price),
                    cost_price: None,
                },
            )
            .await?;
    }

    info!(events = events.len(), "Seeded item categories and items");
    Ok(())
}

async fn seed_journals(
    txn: &DatabaseTransaction,
    ctx: &TenantContext,
    chart: &ChartOfAccounts,
) -> anyhow::Result<()> {
    let repo = JournalRepository::new(txn);
    let date = NaiveDate::from_ymd_opt(2026, 1, 15).context("valid date")?;

    let postings = [
        ("MJ-0001", chart.cash, chart.sales, 1000, JournalSourceType::Journal),
        ("MJ-0002", chart.cogs, chart.inventory, 400, JournalSourceType::Journal),
        ("MJ-0003", chart.rent, chart.cash, 300, JournalSourceType::Expense),
    ];

    for (number, debit_account, credit_account, amount, source_type) in postings {
        let amount = Decimal::from(amount);
        repo.create_journal(
            ctx.organization_id,
            ctx.user_id,
            ManualJournalInput {
                journal_number: number.to_string(),
                date,
                source_type,
                reference: None,
                description: None,
                lines: vec![
                    JournalLineInput {
                        account_id: debit_account,
                        debit: amount,
                        credit: Decimal::ZERO,
                        memo: None,
                    },
                    JournalLineInput {
                        account_id: credit_account,
                        debit: Decimal::ZERO,
                        credit: amount,
                        memo: None,
                    },
                ],
            },
        )
        .await?;
    }

    info!("Seeded manual journals");
    Ok(())
}
