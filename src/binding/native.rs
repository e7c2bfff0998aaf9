//! Native-typed binding bases.
//!
//! Each base takes its staging storage by value at construction. The storage
//! therefore exists before the base does and stays put for the base's whole
//! lifetime; conversion wrappers build the storage first and then hand it
//! over.

use crate::error::{PgBindError, Result};
use crate::types::{Indicator, NativeType, SqlValue};

/// Where a scalar binding records NULL / not-NULL.
#[derive(Debug)]
pub enum IndicatorSlot<'a> {
    /// No indicator: a fetched NULL is an error.
    Untracked,
    /// Indicator owned by the binding itself.
    Owned(Indicator),
    /// Indicator supplied by the caller.
    Borrowed(&'a mut Indicator),
}

impl IndicatorSlot<'_> {
    pub fn get(&self) -> Option<Indicator> {
        match self {
            IndicatorSlot::Untracked => None,
            IndicatorSlot::Owned(ind) => Some(*ind),
            IndicatorSlot::Borrowed(ind) => Some(**ind),
        }
    }

    /// Records `ind`. Returns false when nothing is tracked.
    pub fn set(&mut self, ind: Indicator) -> bool {
        match self {
            IndicatorSlot::Untracked => false,
            IndicatorSlot::Owned(slot) => {
                *slot = ind;
                true
            }
            IndicatorSlot::Borrowed(slot) => {
                **slot = ind;
                true
            }
        }
    }

    fn is_null(&self) -> bool {
        self.get() == Some(Indicator::Null)
    }
}

fn stage<B: NativeType>(
    staging: &mut B,
    indicator: &mut IndicatorSlot<'_>,
    row: usize,
    value: &SqlValue,
) -> Result<()> {
    if value.is_null() {
        if !indicator.set(Indicator::Null) {
            return Err(PgBindError::NullWithoutIndicator { row });
        }
        *staging = B::default();
        return Ok(());
    }
    *staging = B::from_sql_value(value)?;
    indicator.set(Indicator::Ok);
    Ok(())
}

fn check_indicator_count(values: usize, indicators: Option<usize>) -> Result<()> {
    match indicators {
        Some(indicators) if indicators != values => {
            Err(PgBindError::IndicatorSizeMismatch { values, indicators })
        }
        _ => Ok(()),
    }
}

fn row_out_of_range(len: usize, row: usize) -> PgBindError {
    PgBindError::BulkSizeMismatch {
        expected: len,
        actual: row + 1,
    }
}

/// Scalar fetch destination over one staging value.
#[derive(Debug)]
pub struct NativeInto<'a, B> {
    staging: B,
    indicator: IndicatorSlot<'a>,
}

impl<'a, B: NativeType> NativeInto<'a, B> {
    pub fn new(staging: B, indicator: IndicatorSlot<'a>) -> Self {
        Self { staging, indicator }
    }

    pub fn staging(&self) -> &B {
        &self.staging
    }

    pub fn indicator(&self) -> Option<Indicator> {
        self.indicator.get()
    }

    pub fn fetch_value(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        stage(&mut self.staging, &mut self.indicator, row, value)
    }
}

/// Scalar query parameter over one staging value.
#[derive(Debug)]
pub struct NativeUse<'a, B> {
    staging: B,
    indicator: IndicatorSlot<'a>,
    name: Option<String>,
}

impl<'a, B: NativeType> NativeUse<'a, B> {
    pub fn new(staging: B, indicator: IndicatorSlot<'a>, name: Option<String>) -> Self {
        Self {
            staging,
            indicator,
            name,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn staging(&self) -> &B {
        &self.staging
    }

    pub(crate) fn staging_mut(&mut self) -> &mut B {
        &mut self.staging
    }

    pub fn indicator(&self) -> Option<Indicator> {
        self.indicator.get()
    }

    pub(crate) fn set_indicator(&mut self, ind: Indicator) -> bool {
        self.indicator.set(ind)
    }

    /// The value sent to the driver. NULL when the indicator says so; the
    /// staging content is not read in that case.
    pub fn sql_value(&self) -> SqlValue {
        if self.indicator.is_null() {
            SqlValue::Null
        } else {
            self.staging.to_sql_value()
        }
    }

    pub fn write_back(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        stage(&mut self.staging, &mut self.indicator, row, value)
    }
}

/// Bulk fetch destination over a staging vector.
#[derive(Debug)]
pub struct NativeIntoVec<'a, B> {
    staging: Vec<B>,
    indicators: Option<&'a mut Vec<Indicator>>,
}

impl<'a, B: NativeType> NativeIntoVec<'a, B> {
    /// Fails when the indicator vector does not match the staging size.
    pub fn new(staging: Vec<B>, indicators: Option<&'a mut Vec<Indicator>>) -> Result<Self> {
        check_indicator_count(staging.len(), indicators.as_ref().map(|i| i.len()))?;
        Ok(Self {
            staging,
            indicators,
        })
    }

    /// Bulk destination with no indicators; a fetched NULL is an error.
    pub fn untracked(staging: Vec<B>) -> Self {
        Self {
            staging,
            indicators: None,
        }
    }

    pub fn staging(&self) -> &[B] {
        &self.staging
    }

    pub fn indicator(&self, row: usize) -> Option<Indicator> {
        self.indicators
            .as_ref()
            .and_then(|inds| inds.get(row).copied())
    }

    pub fn size(&self) -> usize {
        self.staging.len()
    }

    /// Resizes staging and the tracked indicators together. New slots hold
    /// `B::default()` and `Indicator::Ok`.
    pub fn resize(&mut self, size: usize) {
        self.staging.resize(size, B::default());
        if let Some(inds) = self.indicators.as_mut() {
            inds.resize(size, Indicator::Ok);
        }
    }

    pub fn fetch_value(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        let len = self.staging.len();
        let slot = self
            .staging
            .get_mut(row)
            .ok_or_else(|| row_out_of_range(len, row))?;

        if value.is_null() {
            let ind = self
                .indicators
                .as_mut()
                .and_then(|inds| inds.get_mut(row))
                .ok_or(PgBindError::NullWithoutIndicator { row })?;
            *ind = Indicator::Null;
            *slot = B::default();
            return Ok(());
        }

        *slot = B::from_sql_value(value)?;
        if let Some(ind) = self.indicators.as_mut().and_then(|inds| inds.get_mut(row)) {
            *ind = Indicator::Ok;
        }
        Ok(())
    }
}

/// Bulk query parameter over a staging vector.
#[derive(Debug)]
pub struct NativeUseVec<'a, B> {
    staging: Vec<B>,
    indicators: Option<&'a [Indicator]>,
    name: Option<String>,
}

impl<'a, B: NativeType> NativeUseVec<'a, B> {
    /// Fails when the indicator slice does not match the staging size.
    pub fn new(
        staging: Vec<B>,
        indicators: Option<&'a [Indicator]>,
        name: Option<String>,
    ) -> Result<Self> {
        check_indicator_count(staging.len(), indicators.map(|i| i.len()))?;
        Ok(Self {
            staging,
            indicators,
            name,
        })
    }

    pub fn untracked(staging: Vec<B>, name: Option<String>) -> Self {
        Self {
            staging,
            indicators: None,
            name,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn staging(&self) -> &[B] {
        &self.staging
    }

    pub(crate) fn staging_mut(&mut self) -> &mut [B] {
        &mut self.staging
    }

    pub fn indicator(&self, row: usize) -> Option<Indicator> {
        self.indicators.and_then(|inds| inds.get(row).copied())
    }

    pub fn size(&self) -> usize {
        self.staging.len()
    }

    pub fn sql_value(&self, row: usize) -> Result<SqlValue> {
        let base = self
            .staging
            .get(row)
            .ok_or_else(|| row_out_of_range(self.staging.len(), row))?;
        if self.indicator(row) == Some(Indicator::Null) {
            return Ok(SqlValue::Null);
        }
        Ok(base.to_sql_value())
    }

    /// Caller-supplied indicators are read-only, so a returned NULL cannot be
    /// recorded and is rejected.
    pub fn write_back(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        let len = self.staging.len();
        let slot = self
            .staging
            .get_mut(row)
            .ok_or_else(|| row_out_of_range(len, row))?;
        if value.is_null() {
            return Err(PgBindError::NullWithoutIndicator { row });
        }
        *slot = B::from_sql_value(value)?;
        Ok(())
    }
}
