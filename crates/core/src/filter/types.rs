//! Filter descriptor types and validation.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::PageRequest;

use super::error::FilterError;

/// Value type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    Text,
    /// Decimal number.
    Number,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Boolean flag.
    Boolean,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
        })
    }
}

/// Describes one filterable field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Key used in filter roles and `sort_by`.
    pub key: &'static str,
    /// Value type.
    pub field_type: FieldType,
    /// Whether `sort_by` may name this field.
    pub sortable: bool,
}

impl FieldMeta {
    /// Creates a sortable field.
    #[must_use]
    pub const fn sortable(key: &'static str, field_type: FieldType) -> Self {
        Self {
            key,
            field_type,
            sortable: true,
        }
    }

    /// Creates a field that can be filtered but not sorted.
    #[must_use]
    pub const fn filter_only(key: &'static str, field_type: FieldType) -> Self {
        Self {
            key,
            field_type,
            sortable: false,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Comparison applied by a filter role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Equal to the value.
    Equals,
    /// Not equal to the value.
    NotEquals,
    /// Text contains the value.
    Contains,
    /// Text does not contain the value.
    NotContains,
    /// Text starts with the value.
    StartsWith,
    /// Greater than the value.
    Bigger,
    /// Greater than or equal to the value.
    BiggerOrEqual,
    /// Less than the value.
    Smaller,
    /// Less than or equal to the value.
    SmallerOrEqual,
    /// Field is null or blank.
    Empty,
    /// Field is present.
    NotEmpty,
}

impl Comparator {
    /// Returns true if the comparator applies to the field type.
    #[must_use]
    pub const fn supports(self, field_type: FieldType) -> bool {
        match self {
            Self::Equals | Self::NotEquals => true,
            Self::Empty | Self::NotEmpty => !matches!(field_type, FieldType::Boolean),
            Self::Contains | Self::NotContains | Self::StartsWith => {
                matches!(field_type, FieldType::Text)
            }
            Self::Bigger | Self::BiggerOrEqual | Self::Smaller | Self::SmallerOrEqual => {
                matches!(field_type, FieldType::Number | FieldType::Date)
            }
        }
    }

    /// Returns true if the comparator ignores the role value.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::Empty | Self::NotEmpty)
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::StartsWith => "starts_with",
            Self::Bigger => "bigger",
            Self::BiggerOrEqual => "bigger_or_equal",
            Self::Smaller => "smaller",
            Self::SmallerOrEqual => "smaller_or_equal",
            Self::Empty => "empty",
            Self::NotEmpty => "not_empty",
        })
    }
}

/// One filter condition as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRole {
    /// Field key.
    pub field: String,
    /// Comparator.
    pub comparator: Comparator,
    /// Raw value; ignored by unary comparators.
    #[serde(default)]
    pub value: String,
}

impl FilterRole {
    /// Parses a JSON array of roles, as sent in a `stringified_filter_roles` query parameter.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::MalformedRoles` if the input is not a JSON role array.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, FilterError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(raw).map_err(|e| FilterError::MalformedRoles(e.to_string()))
    }
}

/// Unvalidated list request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Field to sort by.
    pub sort_by: Option<String>,
    /// Sort direction.
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Free-text search term.
    pub search: Option<String>,
    /// Filter conditions, all of which must hold.
    #[serde(default)]
    pub roles: Vec<FilterRole>,
    /// Requested page.
    #[serde(default)]
    pub page: PageRequest,
}

/// Typed value of a validated condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Text value.
    Text(String),
    /// Number value.
    Number(Decimal),
    /// Date value.
    Date(NaiveDate),
    /// Boolean value.
    Boolean(bool),
    /// No value (unary comparators).
    None,
}

/// A condition whose field, comparator and value are known to be valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    /// Field key from the entity's field table.
    pub field: &'static str,
    /// Field type.
    pub field_type: FieldType,
    /// Comparator.
    pub comparator: Comparator,
    /// Typed value.
    pub value: FilterValue,
}

/// Result of validating a [`FilterDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFilter {
    /// Sort field and direction.
    pub sort: Option<(&'static str, SortOrder)>,
    /// Trimmed, non-empty search term.
    pub search: Option<String>,
    /// Conditions joined with AND.
    pub conditions: Vec<FilterCondition>,
    /// Clamped page request.
    pub page: PageRequest,
}

impl FilterDescriptor {
    /// Validates the descriptor against an entity's field table.
    ///
    /// # Errors
    ///
    /// Returns a `FilterError` describing the first invalid part.
    pub fn validate(&self, fields: &[FieldMeta]) -> Result<ValidatedFilter, FilterError> {
        let sort = match &self.sort_by {
            Some(key) => {
                let meta = lookup(fields, key)?;
                if !meta.sortable {
                    return Err(FilterError::NotSortable(key.clone()));
                }
                Some((meta.key, self.sort_order))
            }
            None => None,
        };

        let conditions = self
            .roles
            .iter()
            .map(|role| validate_role(fields, role))
            .collect::<Result<Vec<_>, _>>()?;

        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);

        Ok(ValidatedFilter {
            sort,
            search,
            conditions,
            page: PageRequest::new(self.page.page, self.page.per_page),
        })
    }
}

fn lookup(fields: &[FieldMeta], key: &str) -> Result<FieldMeta, FilterError> {
    fields
        .iter()
        .find(|meta| meta.key == key)
        .copied()
        .ok_or_else(|| FilterError::UnknownField(key.to_string()))
}

fn validate_role(fields: &[FieldMeta], role: &FilterRole) -> Result<FilterCondition, FilterError> {
    let meta = lookup(fields, &role.field)?;

    if !role.comparator.supports(meta.field_type) {
        return Err(FilterError::UnsupportedComparator {
            field: role.field.clone(),
            field_type: meta.field_type,
            comparator: role.comparator,
        });
    }

    let value = if role.comparator.is_unary() {
        FilterValue::None
    } else {
        parse_value(meta, &role.value)?
    };

    Ok(FilterCondition {
        field: meta.key,
        field_type: meta.field_type,
        comparator: role.comparator,
        value,
    })
}

fn parse_value(meta: FieldMeta, raw: &str) -> Result<FilterValue, FilterError> {
    let invalid = || FilterError::InvalidValue {
        field: meta.key.to_string(),
        field_type: meta.field_type,
        value: raw.to_string(),
    };
    let trimmed = raw.trim();

    match meta.field_type {
        FieldType::Text => Ok(FilterValue::Text(raw.to_string())),
        FieldType::Number => Decimal::from_str(trimmed)
            .map(FilterValue::Number)
            .map_err(|_| invalid()),
        FieldType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(FilterValue::Date)
            .map_err(|_| invalid()),
        FieldType::Boolean => match trimmed {
            "true" | "1" => Ok(FilterValue::Boolean(true)),
            "false" | "0" => Ok(FilterValue::Boolean(false)),
            _ => Err(invalid()),
        },
    }
}
