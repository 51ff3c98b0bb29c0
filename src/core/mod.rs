pub mod error;
pub mod types;
pub mod value;

pub use error::{CrmError, Result};
pub use types::{
    IntoRecordId, RecordId, Timestamp, coerce_id, coerce_timestamp, earliest, parse_id,
    parse_timestamp,
};
pub use value::FieldValue;
