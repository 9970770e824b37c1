//! Domain model for the custom field engine

pub mod choice;
pub mod definition;
pub mod field_type;
pub mod value;

pub use choice::{Choice, MULTI_SELECT_DELIMITER};
pub use definition::{FieldDefinition, FieldSpec};
pub use field_type::FieldType;
pub use value::{TypedValue, ValueEntry};
