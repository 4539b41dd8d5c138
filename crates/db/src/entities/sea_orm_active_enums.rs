//! Postgres enum types and their mapping to domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::accounts as domain;
use tally_core::ledger::JournalSourceType as DomainSourceType;

/// `account_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// `account_subtype` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_subtype")]
pub enum AccountSubtype {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "accounts_receivable")]
    AccountsReceivable,
    #[sea_orm(string_value = "inventory")]
    Inventory,
    #[sea_orm(string_value = "other_current_asset")]
    OtherCurrentAsset,
    #[sea_orm(string_value = "fixed_asset")]
    FixedAsset,
    #[sea_orm(string_value = "accounts_payable")]
    AccountsPayable,
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    #[sea_orm(string_value = "other_liability")]
    OtherLiability,
    #[sea_orm(string_value = "owner_equity")]
    OwnerEquity,
    #[sea_orm(string_value = "retained_earnings")]
    RetainedEarnings,
    #[sea_orm(string_value = "operating_income")]
    OperatingIncome,
    #[sea_orm(string_value = "other_income")]
    OtherIncome,
    #[sea_orm(string_value = "cost_of_goods_sold")]
    CostOfGoodsSold,
    #[sea_orm(string_value = "operating_expense")]
    OperatingExpense,
    #[sea_orm(string_value = "other_expense")]
    OtherExpense,
}

/// `item_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "item_type")]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[sea_orm(string_value = "service")]
    Service,
    #[sea_orm(string_value = "non_inventory")]
    NonInventory,
    #[sea_orm(string_value = "inventory")]
    Inventory,
}

/// `journal_source_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_source_type")]
pub enum JournalSourceType {
    #[sea_orm(string_value = "journal")]
    Journal,
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "bill")]
    Bill,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "expense")]
    Expense,
}

macro_rules! mirror_enum {
    ($db:ident <=> $domain:ty { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                type Domain = $domain;
                match value {
                    $(Domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountType <=> domain::AccountType {
    Asset, Liability, Equity, Income, Expense
});

mirror_enum!(AccountSubtype <=> domain::AccountSubtype {
    Cash,
    Bank,
    AccountsReceivable,
    Inventory,
    OtherCurrentAsset,
    FixedAsset,
    AccountsPayable,
    CreditCard,
    OtherLiability,
    OwnerEquity,
    RetainedEarnings,
    OperatingIncome,
    OtherIncome,
    CostOfGoodsSold,
    OperatingExpense,
    OtherExpense,
});

mirror_enum!(JournalSourceType <=> DomainSourceType {
    Journal, Invoice, Bill, Payment, Expense
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtypes_round_trip_through_domain() {
        for subtype in domain::AccountSubtype::ALL {
            let stored = AccountSubtype::from(subtype);
            assert_eq!(domain::AccountSubtype::from(stored), subtype);
            assert_eq!(stored.to_value(), subtype.as_str());
        }
    }

    #[test]
    fn test_source_type_values() {
        for source in DomainSourceType::ALL {
            assert_eq!(JournalSourceType::from(source).to_value(), source.as_str());
        }
    }
}
