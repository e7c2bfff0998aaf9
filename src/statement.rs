use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::binding::{IntoTarget, UseTarget};
use crate::error::{PgBindError, Result};
use crate::traits::{DatabaseDriver, IntoTypePtr, UseTypePtr};
use crate::types::{RawQueryResult, SqlValue};

struct UseSlot<'a> {
    binding: UseTypePtr<'a>,
    write_back: bool,
}

/// A prepared SQL statement with its bound parameters and fetch destinations.
///
/// The statement drives the binding lifecycle:
/// 1. `pre_use` on every parameter, then the driver call (once per bulk row).
/// 2. For in-out parameters, the value returned in a column of the same name
///    is written back and `post_use` converts it into the caller's variable.
/// 3. Each `fetch` stages the next row (or batch of rows for bulk
///    destinations) and `post_fetch` converts it.
///
/// # Example
/// ```ignore
/// let mut id = 0i64;
/// let mut name = String::from("Alice");
/// {
///     let mut st = session.prepare("SELECT id FROM users WHERE name = $1");
///     st.bind_into(&mut id).bind_use(&mut name);
///     st.execute().await?;
/// }
/// println!("{id}");
/// ```
pub struct Statement<'a> {
    driver: Arc<dyn DatabaseDriver>,
    sql: String,
    intos: Vec<IntoTypePtr<'a>>,
    uses: Vec<UseSlot<'a>>,
    columns: Vec<String>,
    pending: VecDeque<Vec<SqlValue>>,
}

impl<'a> Statement<'a> {
    pub(crate) fn new(driver: Arc<dyn DatabaseDriver>, sql: impl Into<String>) -> Self {
        Self {
            driver,
            sql: sql.into(),
            intos: Vec::new(),
            uses: Vec::new(),
            columns: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Column names of the last executed result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Attach a fetch destination. Destinations map to result columns in the
    /// order they are attached.
    pub fn exchange_into(&mut self, binding: IntoTypePtr<'a>) -> &mut Self {
        self.intos.push(binding);
        self
    }

    /// Attach a parameter. Parameters map to `$1, $2, ...` in the order they
    /// are attached.
    pub fn exchange_use(&mut self, binding: UseTypePtr<'a>) -> &mut Self {
        self.uses.push(UseSlot {
            binding,
            write_back: false,
        });
        self
    }

    /// Attach an in-out parameter: after execution, a result column named
    /// like the binding is written back into it.
    pub fn exchange_inout(&mut self, binding: UseTypePtr<'a>) -> &mut Self {
        self.uses.push(UseSlot {
            binding,
            write_back: true,
        });
        self
    }

    pub fn bind_into<S, X: IntoTarget<'a, S>>(&mut self, target: X) -> &mut Self {
        self.exchange_into(target.into_binding())
    }

    pub fn bind_use<S, X: UseTarget<'a, S>>(&mut self, target: X) -> &mut Self {
        self.exchange_use(target.use_binding(None))
    }

    pub fn bind_inout<S, X: UseTarget<'a, S>>(
        &mut self,
        target: X,
        name: impl Into<String>,
    ) -> &mut Self {
        self.exchange_inout(target.use_binding(Some(name.into())))
    }

    /// Execute the statement. When fetch destinations are bound, the first
    /// row (or batch) is fetched as well; returns whether it got data.
    pub async fn execute(&mut self) -> Result<bool> {
        self.pending.clear();
        self.columns.clear();

        for slot in self.uses.iter_mut() {
            slot.binding.pre_use()?;
        }

        let rows = self.batch_rows()?;
        debug!(sql = %self.sql, rows, params = self.uses.len(), "statement.execute");

        let driver = Arc::clone(&self.driver);
        let mut written = vec![false; self.uses.len()];
        for row in 0..rows {
            let params = self
                .uses
                .iter()
                .map(|slot| slot.binding.sql_value(row))
                .collect::<Result<Vec<_>>>()?;

            let raw = driver.execute(&self.sql, &params).await?;
            for values in raw.rows.iter() {
                self.check_column_count(values)?;
            }
            self.write_back(row, &raw, &mut written)?;

            if self.columns.is_empty() {
                self.columns = raw.columns;
            }
            self.pending.extend(raw.rows);
        }

        for (slot, written) in self.uses.iter_mut().zip(written) {
            if written {
                slot.binding.post_use(true)?;
            }
        }

        if self.intos.is_empty() {
            return Ok(false);
        }
        self.fetch()
    }

    /// Fetch the next row, or the next batch for bulk destinations. Bulk
    /// destinations are resized to the number of rows delivered; at end of
    /// data they are resized to 0 and nothing is converted.
    pub fn fetch(&mut self) -> Result<bool> {
        if self.intos.is_empty() {
            return Ok(false);
        }

        let capacity = self.fetch_capacity()?;
        let available = capacity.min(self.pending.len());

        if available == 0 {
            for into in self.intos.iter_mut() {
                if into.is_bulk() {
                    into.resize(0);
                }
                into.post_fetch(false)?;
            }
            debug!(sql = %self.sql, "statement.fetch: end of data");
            return Ok(false);
        }

        for values in self.pending.iter().take(available) {
            self.check_column_count(values)?;
        }
        for row in 0..available {
            let Some(values) = self.pending.pop_front() else {
                break;
            };
            for (into, value) in self.intos.iter_mut().zip(values.iter()) {
                into.fetch_value(row, value)?;
            }
        }

        for into in self.intos.iter_mut() {
            if into.is_bulk() && into.size() != available {
                into.resize(available);
            }
            into.post_fetch(true)?;
        }

        debug!(sql = %self.sql, rows = available, "statement.fetch");
        Ok(true)
    }

    fn check_column_count(&self, values: &[SqlValue]) -> Result<()> {
        if values.len() < self.intos.len() {
            return Err(PgBindError::ColumnCountMismatch {
                bound: self.intos.len(),
                returned: values.len(),
            });
        }
        Ok(())
    }

    /// Number of driver round trips: the common size of the bulk parameters,
    /// or 1 when every parameter is scalar.
    fn batch_rows(&self) -> Result<usize> {
        let mut rows = None;
        for slot in self.uses.iter().filter(|slot| slot.binding.is_bulk()) {
            let size = slot.binding.size();
            match rows {
                None => rows = Some(size),
                Some(expected) if expected != size => {
                    return Err(PgBindError::BulkSizeMismatch {
                        expected,
                        actual: size,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(rows.unwrap_or(1))
    }

    /// Rows per fetch: 1 for scalar destinations, otherwise the common size
    /// of the bulk destinations.
    fn fetch_capacity(&self) -> Result<usize> {
        let bulk = self.intos.iter().filter(|into| into.is_bulk()).count();
        if bulk == 0 {
            return Ok(1);
        }
        if bulk != self.intos.len() {
            return Err(PgBindError::MixedIntoShapes);
        }

        let expected = self.intos[0].size();
        if let Some(other) = self.intos.iter().find(|into| into.size() != expected) {
            return Err(PgBindError::BulkSizeMismatch {
                expected,
                actual: other.size(),
            });
        }
        if expected == 0 {
            return Err(PgBindError::EmptyBulkInto);
        }
        Ok(expected)
    }

    fn write_back(&mut self, row: usize, raw: &RawQueryResult, written: &mut [bool]) -> Result<()> {
        let Some(returned) = raw.rows.first() else {
            return Ok(());
        };

        for (slot, written) in self.uses.iter_mut().zip(written.iter_mut()) {
            if !slot.write_back {
                continue;
            }
            let Some(index) = slot.binding.name().and_then(|name| raw.column_index(name)) else {
                continue;
            };
            if let Some(value) = returned.get(index) {
                slot.binding.write_back(row, value)?;
                *written = true;
            }
        }
        Ok(())
    }
}
