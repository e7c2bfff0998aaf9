use std::fmt::Debug;

use chrono::{DateTime, Utc};

use crate::error::{PgBindError, Result};
use crate::types::SqlValue;

mod sealed {
    pub trait Sealed {}
}

/// A primitive the statement layer can send and receive directly.
///
/// The set is closed: every `TypeConversion::Base` must be one of these types.
/// `from_sql_value` is only called with non-null values; NULL is routed
/// through the binding's indicator instead.
pub trait NativeType: sealed::Sealed + Default + Clone + Debug + 'static {
    /// Name reported in type mismatch errors.
    const NAME: &'static str;

    fn to_sql_value(&self) -> SqlValue;

    fn from_sql_value(value: &SqlValue) -> Result<Self>;
}

fn mismatch<T: NativeType>(value: &SqlValue) -> PgBindError {
    PgBindError::TypeMismatch {
        expected: T::NAME,
        actual: value.type_name(),
    }
}

impl sealed::Sealed for i32 {}
impl NativeType for i32 {
    const NAME: &'static str = "int32";

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Int32(*self)
    }

    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Int32(v) => Ok(*v),
            SqlValue::Int64(v) => i32::try_from(*v).map_err(|_| mismatch::<Self>(value)),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl sealed::Sealed for i64 {}
impl NativeType for i64 {
    const NAME: &'static str = "int64";

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Int64(*self)
    }

    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Int64(v) => Ok(*v),
            SqlValue::Int32(v) => Ok(i64::from(*v)),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl sealed::Sealed for f64 {}
impl NativeType for f64 {
    const NAME: &'static str = "float64";

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float64(*self)
    }

    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Float64(v) => Ok(*v),
            SqlValue::Int32(v) => Ok(f64::from(*v)),
            // Precision loss above 2^53 is accepted, as in SQL numeric promotion.
            SqlValue::Int64(v) => Ok(*v as f64),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl sealed::Sealed for bool {}
impl NativeType for bool {
    const NAME: &'static str = "bool";

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }

    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bool(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl sealed::Sealed for String {}
impl NativeType for String {
    const NAME: &'static str = "text";

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Text(v) => Ok(v.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl sealed::Sealed for DateTime<Utc> {}
impl NativeType for DateTime<Utc> {
    const NAME: &'static str = "timestamp";

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }

    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Timestamp(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl sealed::Sealed for Vec<u8> {}
impl NativeType for Vec<u8> {
    const NAME: &'static str = "blob";

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Blob(self.clone())
    }

    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Blob(v) => Ok(v.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}
