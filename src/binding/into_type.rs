//! Fetch destinations that convert from a native staging value into the
//! caller's domain value.

use tracing::trace;

use crate::binding::native::{IndicatorSlot, NativeInto, NativeIntoVec};
use crate::conversion::TypeConversion;
use crate::error::Result;
use crate::traits::IntoType;
use crate::types::{Indicator, SqlValue};

/// Fetches into a plain `T`.
///
/// With no indicator a fetched NULL fails in the native base. With a
/// caller-supplied indicator a NULL is reported through the indicator only:
/// `T::from_base` is not called and `T` keeps its previous value.
pub struct ConversionInto<'a, T: TypeConversion> {
    native: NativeInto<'a, T::Base>,
    value: &'a mut T,
}

impl<'a, T: TypeConversion> ConversionInto<'a, T> {
    pub fn new(value: &'a mut T) -> Self {
        let staging = T::Base::default();
        Self {
            native: NativeInto::new(staging, IndicatorSlot::Untracked),
            value,
        }
    }

    pub fn with_indicator(value: &'a mut T, indicator: &'a mut Indicator) -> Self {
        let staging = T::Base::default();
        Self {
            native: NativeInto::new(staging, IndicatorSlot::Borrowed(indicator)),
            value,
        }
    }

    pub fn staging(&self) -> &T::Base {
        self.native.staging()
    }

    fn convert_from(&mut self) -> Result<()> {
        if self.native.indicator() == Some(Indicator::Null) {
            return Ok(());
        }
        *self.value = T::from_base(self.native.staging())?;
        Ok(())
    }
}

impl<T: TypeConversion> IntoType for ConversionInto<'_, T> {
    fn fetch_value(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        self.native.fetch_value(row, value)
    }

    fn post_fetch(&mut self, got_data: bool) -> Result<()> {
        if got_data {
            self.convert_from()?;
        }
        Ok(())
    }
}

/// Fetches into an `Option<T>`, using an indicator owned by the binding.
pub struct ConversionIntoOptional<'a, T: TypeConversion> {
    native: NativeInto<'a, T::Base>,
    value: &'a mut Option<T>,
}

impl<'a, T: TypeConversion> ConversionIntoOptional<'a, T> {
    pub fn new(value: &'a mut Option<T>) -> Self {
        let staging = T::Base::default();
        Self {
            native: NativeInto::new(staging, IndicatorSlot::Owned(Indicator::Ok)),
            value,
        }
    }

    pub fn indicator(&self) -> Option<Indicator> {
        self.native.indicator()
    }

    fn convert_from(&mut self) -> Result<()> {
        // Only Ok carries a value; Null and Truncated both clear the option.
        *self.value = match self.native.indicator() {
            Some(Indicator::Ok) => Some(T::from_base(self.native.staging())?),
            _ => None,
        };
        Ok(())
    }
}

impl<T: TypeConversion> IntoType for ConversionIntoOptional<'_, T> {
    fn fetch_value(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        self.native.fetch_value(row, value)
    }

    fn post_fetch(&mut self, got_data: bool) -> Result<()> {
        if got_data {
            self.convert_from()?;
        }
        Ok(())
    }
}

/// Fetches a batch of rows into a `Vec<T>`, element by element.
///
/// The staging buffer and the caller's vector always have the same length;
/// `resize` changes both before any further conversion can run.
///
/// `T::from_base` runs for every row except those whose indicator is `Null`;
/// those elements keep their previous value (`T::default()` after a grow).
pub struct ConversionIntoVec<'a, T: TypeConversion> {
    native: NativeIntoVec<'a, T::Base>,
    values: &'a mut Vec<T>,
}

impl<'a, T: TypeConversion> ConversionIntoVec<'a, T> {
    pub fn new(values: &'a mut Vec<T>) -> Self {
        let staging = vec![T::Base::default(); values.len()];
        Self {
            native: NativeIntoVec::untracked(staging),
            values,
        }
    }

    /// Fails when `indicators` and `values` differ in length.
    pub fn with_indicators(
        values: &'a mut Vec<T>,
        indicators: &'a mut Vec<Indicator>,
    ) -> Result<Self> {
        let staging = vec![T::Base::default(); values.len()];
        Ok(Self {
            native: NativeIntoVec::new(staging, Some(indicators))?,
            values,
        })
    }

    pub fn staging(&self) -> &[T::Base] {
        self.native.staging()
    }

    fn convert_from(&mut self) -> Result<()> {
        debug_assert_eq!(self.native.size(), self.values.len());
        trace!(rows = self.native.size(), "into.convert_from");

        for (row, (base, value)) in self
            .native
            .staging()
            .iter()
            .zip(self.values.iter_mut())
            .enumerate()
        {
            if self.native.indicator(row) == Some(Indicator::Null) {
                continue;
            }
            *value = T::from_base(base)?;
        }
        Ok(())
    }
}

impl<T: TypeConversion + Default> IntoType for ConversionIntoVec<'_, T> {
    fn fetch_value(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        self.native.fetch_value(row, value)
    }

    fn post_fetch(&mut self, got_data: bool) -> Result<()> {
        if got_data {
            self.convert_from()?;
        }
        Ok(())
    }

    fn is_bulk(&self) -> bool {
        true
    }

    fn size(&self) -> usize {
        self.native.size()
    }

    fn resize(&mut self, size: usize) {
        self.values.resize_with(size, T::default);
        self.native.resize(size);
    }
}
