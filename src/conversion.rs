//! The per-type customization point for moving domain values through bindings.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::NativeType;

/// Maps a domain type to one of the natively supported primitives.
///
/// Implement this once for a type and every binding shape picks it up:
/// scalar, `Option<T>` and `Vec<T>`, both as query parameters and as fetch
/// destinations. Native types implement it as the identity, so they bind
/// without any user code. A type with neither a native nor a user impl
/// cannot be bound at all.
///
/// # Example
/// ```
/// use pgbind::{PgBindError, Result, TypeConversion};
///
/// #[derive(Debug, PartialEq)]
/// struct Email(String);
///
/// impl TypeConversion for Email {
///     type Base = String;
///
///     fn from_base(base: &String) -> Result<Self> {
///         if base.contains('@') {
///             Ok(Email(base.clone()))
///         } else {
///             Err(PgBindError::conversion(format!("not an email: {base}")))
///         }
///     }
///
///     fn to_base(&self) -> Result<String> {
///         Ok(self.0.clone())
///     }
/// }
///
/// let email = Email::from_base(&"a@b.c".to_string()).unwrap();
/// assert_eq!(email.to_base().unwrap(), "a@b.c");
/// ```
pub trait TypeConversion: Sized {
    /// The native type this value is staged as.
    type Base: NativeType;

    /// Builds the domain value from a fetched native value.
    fn from_base(base: &Self::Base) -> Result<Self>;

    /// Produces the native value to send for this domain value.
    fn to_base(&self) -> Result<Self::Base>;
}

macro_rules! identity_conversion {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TypeConversion for $ty {
                type Base = $ty;

                fn from_base(base: &$ty) -> Result<Self> {
                    Ok(base.clone())
                }

                fn to_base(&self) -> Result<$ty> {
                    Ok(self.clone())
                }
            }
        )*
    };
}

identity_conversion!(i32, i64, f64, bool, String, DateTime<Utc>, Vec<u8>);
