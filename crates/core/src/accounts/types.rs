//! Account type definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

/// Root account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Asset accounts.
    Asset,
    /// Liability accounts.
    Liability,
    /// Equity accounts.
    Equity,
    /// Income (revenue) accounts.
    Income,
    /// Expense accounts, including cost of goods sold.
    Expense,
}

/// Side on which an account's balance normally grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    /// Debit-normal (assets, expenses).
    Debit,
    /// Credit-normal (liabilities, equity, income).
    Credit,
}

impl AccountType {
    /// Returns the normal balance side.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::Credit,
        }
    }

    /// Signed balance of the given debit and credit totals.
    ///
    /// Positive when the account moves in its normal direction.
    #[must_use]
    pub fn balance(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self.normal_balance() {
            NormalBalance::Debit => debit - credit,
            NormalBalance::Credit => credit - debit,
        }
    }

    /// Returns the snake_case key used on the wire and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// Account subtype for finer classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSubtype {
    /// Cash on hand.
    Cash,
    /// Bank account.
    Bank,
    /// Accounts receivable.
    AccountsReceivable,
    /// Inventory asset.
    Inventory,
    /// Other current asset.
    OtherCurrentAsset,
    /// Fixed asset.
    FixedAsset,
    /// Accounts payable.
    AccountsPayable,
    /// Credit card.
    CreditCard,
    /// Other liability.
    OtherLiability,
    /// Owner equity.
    OwnerEquity,
    /// Retained earnings.
    RetainedEarnings,
    /// Operating income.
    OperatingIncome,
    /// Other income.
    OtherIncome,
    /// Cost of goods sold.
    CostOfGoodsSold,
    /// Operating expense.
    OperatingExpense,
    /// Other expense.
    OtherExpense,
}

impl AccountSubtype {
    /// Root type this subtype belongs to.
    #[must_use]
    pub const fn root_type(self) -> AccountType {
        match self {
            Self::Cash
            | Self::Bank
            | Self::AccountsReceivable
            | Self::Inventory
            | Self::OtherCurrentAsset
            | Self::FixedAsset => AccountType::Asset,
            Self::AccountsPayable | Self::CreditCard | Self::OtherLiability => {
                AccountType::Liability
            }
            Self::OwnerEquity | Self::RetainedEarnings => AccountType::Equity,
            Self::OperatingIncome | Self::OtherIncome => AccountType::Income,
            Self::CostOfGoodsSold | Self::OperatingExpense | Self::OtherExpense => {
                AccountType::Expense
            }
        }
    }

    /// Returns true if the subtype may be used with the given root type.
    #[must_use]
    pub fn is_compatible_with(self, account_type: AccountType) -> bool {
        self.root_type() == account_type
    }

    /// Returns the snake_case key used on the wire and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::AccountsReceivable => "accounts_receivable",
            Self::Inventory => "inventory",
            Self::OtherCurrentAsset => "other_current_asset",
            Self::FixedAsset => "fixed_asset",
            Self::AccountsPayable => "accounts_payable",
            Self::CreditCard => "credit_card",
            Self::OtherLiability => "other_liability",
            Self::OwnerEquity => "owner_equity",
            Self::RetainedEarnings => "retained_earnings",
            Self::OperatingIncome => "operating_income",
            Self::OtherIncome => "other_income",
            Self::CostOfGoodsSold => "cost_of_goods_sold",
            Self::OperatingExpense => "operating_expense",
            Self::OtherExpense => "other_expense",
        }
    }

    /// All subtypes, in chart order.
    pub const ALL: [Self; 16] = [
        Self::Cash,
        Self::Bank,
        Self::AccountsReceivable,
        Self::Inventory,
        Self::OtherCurrentAsset,
        Self::FixedAsset,
        Self::AccountsPayable,
        Self::CreditCard,
        Self::OtherLiability,
        Self::OwnerEquity,
        Self::RetainedEarnings,
        Self::OperatingIncome,
        Self::OtherIncome,
        Self::CostOfGoodsSold,
        Self::OperatingExpense,
        Self::OtherExpense,
    ];
}

impl std::fmt::Display for AccountSubtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountSubtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|subtype| subtype.as_str() == s)
            .ok_or_else(|| format!("Unknown account subtype: {s}"))
    }
}

/// The slice of an account the domain rules need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Root type.
    pub account_type: AccountType,
    /// Subtype.
    pub account_subtype: Option<AccountSubtype>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_balance_follows_normal_side() {
        assert_eq!(AccountType::Expense.balance(dec!(500), dec!(100)), dec!(400));
        assert_eq!(AccountType::Asset.balance(dec!(100), dec!(500)), dec!(-400));
        assert_eq!(AccountType::Income.balance(dec!(100), dec!(500)), dec!(400));
        assert_eq!(AccountType::Liability.balance(dec!(0), dec!(50)), dec!(50));
    }

    #[test]
    fn test_subtype_compatibility() {
        assert!(AccountSubtype::Inventory.is_compatible_with(AccountType::Asset));
        assert!(AccountSubtype::CostOfGoodsSold.is_compatible_with(AccountType::Expense));
        assert!(!AccountSubtype::CostOfGoodsSold.is_compatible_with(AccountType::Income));
        assert!(!AccountSubtype::OtherIncome.is_compatible_with(AccountType::Expense));
    }

    #[test]
    fn test_subtype_parse_matches_display() {
        for subtype in AccountSubtype::ALL {
            assert_eq!(AccountSubtype::from_str(subtype.as_str()).unwrap(), subtype);
        }
        assert!(AccountSubtype::from_str("petty_cash").is_err());
    }

    #[test]
    fn test_account_type_parse() {
        assert_eq!(AccountType::from_str("income").unwrap(), AccountType::Income);
        assert!(AccountType::from_str("revenue").is_err());
    }
}
