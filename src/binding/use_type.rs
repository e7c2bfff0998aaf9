//! Query parameters that convert the caller's domain value into a native
//! staging value before it is sent.

use tracing::trace;

use crate::binding::native::{IndicatorSlot, NativeUse, NativeUseVec};
use crate::conversion::TypeConversion;
use crate::error::Result;
use crate::traits::UseType;
use crate::types::{Indicator, SqlValue};

/// Sends a plain `T`.
///
/// `T` is always converted; a caller-supplied indicator set to `Null` only
/// decides that NULL is sent in place of the staged value.
pub struct ConversionUse<'a, T: TypeConversion> {
    native: NativeUse<'a, T::Base>,
    value: &'a mut T,
}

impl<'a, T: TypeConversion> ConversionUse<'a, T> {
    pub fn new(value: &'a mut T, name: Option<String>) -> Self {
        let staging = T::Base::default();
        Self {
            native: NativeUse::new(staging, IndicatorSlot::Untracked, name),
            value,
        }
    }

    pub fn with_indicator(
        value: &'a mut T,
        indicator: &'a mut Indicator,
        name: Option<String>,
    ) -> Self {
        let staging = T::Base::default();
        Self {
            native: NativeUse::new(staging, IndicatorSlot::Borrowed(indicator), name),
            value,
        }
    }

    pub fn staging(&self) -> &T::Base {
        self.native.staging()
    }

    #[cfg(test)]
    pub(crate) fn staging_mut(&mut self) -> &mut T::Base {
        self.native.staging_mut()
    }

    fn convert_to(&mut self) -> Result<()> {
        *self.native.staging_mut() = self.value.to_base()?;
        Ok(())
    }

    fn convert_from(&mut self) -> Result<()> {
        if self.native.indicator() == Some(Indicator::Null) {
            return Ok(());
        }
        *self.value = T::from_base(self.native.staging())?;
        Ok(())
    }
}

impl<T: TypeConversion> UseType for ConversionUse<'_, T> {
    fn name(&self) -> Option<&str> {
        self.native.name()
    }

    fn pre_use(&mut self) -> Result<()> {
        self.convert_to()
    }

    fn sql_value(&self, _row: usize) -> Result<SqlValue> {
        Ok(self.native.sql_value())
    }

    fn write_back(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        self.native.write_back(row, value)
    }

    fn post_use(&mut self, got_data: bool) -> Result<()> {
        if got_data {
            self.convert_from()?;
        }
        Ok(())
    }
}

/// Sends an `Option<T>`; `None` goes out as NULL through an owned indicator.
pub struct ConversionUseOptional<'a, T: TypeConversion> {
    native: NativeUse<'a, T::Base>,
    value: &'a mut Option<T>,
}

impl<'a, T: TypeConversion> ConversionUseOptional<'a, T> {
    pub fn new(value: &'a mut Option<T>, name: Option<String>) -> Self {
        let staging = T::Base::default();
        Self {
            native: NativeUse::new(staging, IndicatorSlot::Owned(Indicator::Ok), name),
            value,
        }
    }

    pub fn indicator(&self) -> Option<Indicator> {
        self.native.indicator()
    }

    fn convert_to(&mut self) -> Result<()> {
        match self.value.as_ref() {
            Some(v) => {
                *self.native.staging_mut() = v.to_base()?;
                self.native.set_indicator(Indicator::Ok);
            }
            None => {
                self.native.set_indicator(Indicator::Null);
            }
        }
        Ok(())
    }

    fn convert_from(&mut self) -> Result<()> {
        *self.value = match self.native.indicator() {
            Some(Indicator::Ok) => Some(T::from_base(self.native.staging())?),
            _ => None,
        };
        Ok(())
    }
}

impl<T: TypeConversion> UseType for ConversionUseOptional<'_, T> {
    fn name(&self) -> Option<&str> {
        self.native.name()
    }

    fn pre_use(&mut self) -> Result<()> {
        self.convert_to()
    }

    fn sql_value(&self, _row: usize) -> Result<SqlValue> {
        Ok(self.native.sql_value())
    }

    fn write_back(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        self.native.write_back(row, value)
    }

    fn post_use(&mut self, got_data: bool) -> Result<()> {
        if got_data {
            self.convert_from()?;
        }
        Ok(())
    }
}

/// Sends a `Vec<T>` as one row per element.
///
/// Every element is converted. Per-element NULLs come from an optional
/// caller-supplied indicator slice, which the native base consults when
/// producing each row's value.
pub struct ConversionUseVec<'a, T: TypeConversion> {
    native: NativeUseVec<'a, T::Base>,
    values: &'a mut Vec<T>,
}

impl<'a, T: TypeConversion> ConversionUseVec<'a, T> {
    pub fn new(values: &'a mut Vec<T>, name: Option<String>) -> Self {
        let staging = vec![T::Base::default(); values.len()];
        Self {
            native: NativeUseVec::untracked(staging, name),
            values,
        }
    }

    /// Fails when `indicators` and `values` differ in length.
    pub fn with_indicators(
        values: &'a mut Vec<T>,
        indicators: &'a [Indicator],
        name: Option<String>,
    ) -> Result<Self> {
        let staging = vec![T::Base::default(); values.len()];
        Ok(Self {
            native: NativeUseVec::new(staging, Some(indicators), name)?,
            values,
        })
    }

    pub fn staging(&self) -> &[T::Base] {
        self.native.staging()
    }

    #[cfg(test)]
    pub(crate) fn staging_mut(&mut self) -> &mut [T::Base] {
        self.native.staging_mut()
    }

    fn convert_to(&mut self) -> Result<()> {
        trace!(rows = self.values.len(), "use.convert_to");

        for (row, value) in self.values.iter().enumerate() {
            let base = value.to_base()?;
            // The caller's vector is borrowed for our whole lifetime, so its
            // length still matches staging.
            if let Some(slot) = self.native.staging_mut().get_mut(row) {
                *slot = base;
            }
        }
        Ok(())
    }

    fn convert_from(&mut self) -> Result<()> {
        trace!(rows = self.values.len(), "use.convert_from");

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

impl<T: TypeConversion> UseType for ConversionUseVec<'_, T> {
    fn name(&self) -> Option<&str> {
        self.native.name()
    }

    fn pre_use(&mut self) -> Result<()> {
        self.convert_to()
    }

    fn sql_value(&self, row: usize) -> Result<SqlValue> {
        self.native.sql_value(row)
    }

    fn write_back(&mut self, row: usize, value: &SqlValue) -> Result<()> {
        self.native.write_back(row, value)
    }

    fn post_use(&mut self, got_data: bool) -> Result<()> {
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
}
