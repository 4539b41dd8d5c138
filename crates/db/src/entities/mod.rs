//! `SeaORM` entity definitions.

pub mod accounts;
pub mod item_categories;
pub mod items;
pub mod ledger_entries;
pub mod manual_journals;
pub mod organizations;
pub mod sea_orm_active_enums;
