//! `SeaORM` Entity for item_categories table.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tally_core::item_category::ItemCategory;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "item_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sell_account_id: Option<Uuid>,
    pub cost_account_id: Option<Uuid>,
    pub inventory_account_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(has_many = "super::items::Entity")]
    Items,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ItemCategory {
    fn from(model: Model) -> Self {
        Self {
            id: model.id.into(),
            organization_id: model.organization_id.into(),
            name: model.name,
            description: model.description,
            sell_account_id: model.sell_account_id.map(Into::into),
            cost_account_id: model.cost_account_id.map(Into::into),
            inventory_account_id: model.inventory_account_id.map(Into::into),
            user_id: model.user_id.into(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&ItemCategory> for ActiveModel {
    fn from(category: &ItemCategory) -> Self {
        Self {
            id: Set(category.id.into()),
            organization_id: Set(category.organization_id.into()),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            sell_account_id: Set(category.sell_account_id.map(Into::into)),
            cost_account_id: Set(category.cost_account_id.map(Into::into)),
            inventory_account_id: Set(category.inventory_account_id.map(Into::into)),
            user_id: Set(category.user_id.into()),
            created_at: Set(category.created_at),
            updated_at: Set(category.updated_at),
        }
    }
}
