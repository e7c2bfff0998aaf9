mod indicator;
mod native;
mod row;
mod sql_value;

pub use indicator::Indicator;
pub use native::NativeType;
pub use row::{QueryResult, RawQueryResult, Row};
pub use sql_value::SqlValue;
