//! Account roles an item category can reference.

use serde::{Deserialize, Serialize};

use super::types::{AccountRef, AccountSubtype, AccountType};

/// The purpose an account serves on an item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Account credited when items in the category are sold.
    Sell,
    /// Account debited with the cost of items sold.
    Cost,
    /// Asset account tracking stock on hand.
    Inventory,
}

impl AccountRole {
    /// Returns true if the account may fill this role.
    ///
    /// - sell: any `income` account
    /// - cost: any `expense` account (cost of goods sold is an expense subtype)
    /// - inventory: an account with the `inventory` subtype
    #[must_use]
    pub fn accepts(self, account: &AccountRef) -> bool {
        match self {
            Self::Sell => account.account_type == AccountType::Income,
            Self::Cost => account.account_type == AccountType::Expense,
            Self::Inventory => account.account_subtype == Some(AccountSubtype::Inventory),
        }
    }

    /// Human readable description of what the role requires.
    #[must_use]
    pub const fn requirement(self) -> &'static str {
        match self {
            Self::Sell => "an income account",
            Self::Cost => "an expense or cost of goods sold account",
            Self::Inventory => "an inventory account",
        }
    }

    /// Returns the snake_case key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sell => "sell",
            Self::Cost => "cost",
            Self::Inventory => "inventory",
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
