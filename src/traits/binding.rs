use crate::error::Result;
use crate::types::SqlValue;

/// A fetch destination attached to a statement.
///
/// The statement stages every fetched column value with `fetch_value`, then
/// calls `post_fetch` once per fetch, which is where conversion into the
/// caller's variable happens.
pub trait IntoType {
    /// Stores the fetched value for `row` of the current batch into staging.
    fn fetch_value(&mut self, row: usize, value: &SqlValue) -> Result<()>;

    /// Runs after a fetch. `got_data` is false at end of data, in which case
    /// nothing is converted.
    fn post_fetch(&mut self, got_data: bool) -> Result<()>;

    /// Whether this binding receives a batch of rows per fetch.
    fn is_bulk(&self) -> bool {
        false
    }

    /// Number of rows this binding holds.
    fn size(&self) -> usize {
        1
    }

    /// Resizes a bulk binding. Scalars ignore this.
    fn resize(&mut self, _size: usize) {}
}

/// A query parameter attached to a statement.
///
/// `pre_use` runs immediately before parameters are sent. `write_back` and
/// `post_use` only run when the statement writes a returned value back into
/// the parameter.
pub trait UseType {
    /// Name of the parameter, if it was bound by name.
    fn name(&self) -> Option<&str>;

    /// Converts the caller's value into staging.
    fn pre_use(&mut self) -> Result<()>;

    /// Staged value for `row` as it will be sent to the driver.
    fn sql_value(&self, row: usize) -> Result<SqlValue>;

    /// Stores a value returned by the database for `row` into staging.
    fn write_back(&mut self, row: usize, value: &SqlValue) -> Result<()>;

    /// Converts staging back into the caller's value.
    fn post_use(&mut self, got_data: bool) -> Result<()>;

    fn is_bulk(&self) -> bool {
        false
    }

    fn size(&self) -> usize {
        1
    }
}

/// Owned handle to a fetch destination, as held by a statement.
pub type IntoTypePtr<'a> = Box<dyn IntoType + 'a>;

/// Owned handle to a query parameter, as held by a statement.
pub type UseTypePtr<'a> = Box<dyn UseType + 'a>;
