//! Manual journals and double-entry line validation.

pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::JournalValidationError;
pub use types::{
    JournalLine, JournalLineInput, JournalSourceType, JournalTotals, ManualJournal,
    ManualJournalInput,
};
pub use validation::validate_lines;
