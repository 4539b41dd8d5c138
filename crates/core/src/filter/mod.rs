//! Dynamic list filtering, sorting and pagination.
//!
//! A [`FilterDescriptor`] arrives from the API untrusted. Validating it against an entity's
//! [`FieldMeta`] table yields a [`ValidatedFilter`] whose field keys, comparators and values are
//! known to be meaningful, which the persistence layer then translates into SQL.

pub mod error;
pub mod types;


pub use error::FilterError;
pub use types::{
    Comparator, FieldMeta, FieldType, FilterCondition, FilterDescriptor, FilterRole, FilterValue,
    SortOrder, ValidatedFilter,
};
