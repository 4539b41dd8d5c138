//! Filter error types.

use thiserror::Error;

use super::types::{Comparator, FieldType};

/// Errors raised while validating a filter descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The field is not filterable on this entity.
    #[error("Unknown filter field: {0}")]
    UnknownField(String),

    /// The field cannot be used for sorting.
    #[error("Field '{0}' is not sortable")]
    NotSortable(String),

    /// The comparator does not apply to the field's type.
    #[error("Comparator '{comparator}' is not supported for {field_type} field '{field}'")]
    UnsupportedComparator {
        /// Field key.
        field: String,
        /// Field type.
        field_type: FieldType,
        /// Rejected comparator.
        comparator: Comparator,
    },

    /// The value does not parse as the field's type.
    #[error("Invalid value '{value}' for {field_type} field '{field}'")]
    InvalidValue {
        /// Field key.
        field: String,
        /// Field type.
        field_type: FieldType,
        /// Raw value.
        value: String,
    },

    /// The stringified role list is not valid JSON.
    #[error("Malformed filter roles: {0}")]
    MalformedRoles(String),
}
