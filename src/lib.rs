//! pgbind - Typed value conversion and parameter binding for PostgreSQL
//!
//! Implement [`TypeConversion`] once for a domain type and bind it anywhere:
//! as a plain value, an `Option`, or a `Vec` for batch execute and fetch.
//!
//! # NULL handling
//! Parameters are always converted with `to_base`; an indicator set to `Null`
//! only replaces the staged value with NULL when it is sent.
//!
//! Fetched NULLs need somewhere to go. A plain `T` fetched as NULL is an
//! error unless an indicator was bound with it. When the indicator reports
//! `Null`, `from_base` is skipped for that row and the destination keeps its
//! previous value. `Option<T>` becomes `None`.
//!
//! # Example
//! ```ignore
//! use pgbind::{PgBindError, Result, Session, TypeConversion};
//!
//! struct Email(String);
//!
//! impl TypeConversion for Email {
//!     type Base = String;
//!     fn from_base(base: &String) -> Result<Self> { Ok(Email(base.clone())) }
//!     fn to_base(&self) -> Result<String> { Ok(self.0.clone()) }
//! }
//!
//! let session = Session::connect("postgres://localhost/mydb").await?;
//!
//! let mut id = 0i64;
//! let mut email = Email("john@example.com".into());
//! {
//!     let mut st = session.prepare("SELECT id FROM users WHERE email = $1");
//!     st.bind_into(&mut id).bind_use(&mut email);
//!     st.execute().await?;
//! }
//! ```

pub mod binding;
pub mod conversion;
pub mod drivers;
pub mod error;
pub mod statement;
pub mod traits;
pub mod types;

mod session;

// Re-export main types for convenient access
pub use binding::{into, into_with_indicator, use_, use_named, use_with_indicator};
pub use conversion::TypeConversion;
pub use error::{PgBindError, Result};
pub use session::Session;
pub use statement::Statement;
pub use traits::{DatabaseDriver, IntoType, IntoTypePtr, UseType, UseTypePtr};
pub use types::{Indicator, NativeType, QueryResult, RawQueryResult, Row, SqlValue};
