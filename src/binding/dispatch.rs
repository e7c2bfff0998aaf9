//! Factories that pick the binding wrapper from the static shape of the
//! bound value.
//!
//! The shape tag is a type parameter of [`IntoTarget`] / [`UseTarget`]. Only
//! one impl can apply to a given `&mut` type, so the compiler infers the tag
//! and the wrapper is chosen without any runtime branch:
//!
//! | bound value      | shape        | into wrapper              | use wrapper              |
//! |------------------|--------------|---------------------------|--------------------------|
//! | `&mut T`         | [`Scalar`]   | `ConversionInto`          | `ConversionUse`          |
//! | `&mut Option<T>` | [`Optional`] | `ConversionIntoOptional`  | `ConversionUseOptional`  |
//! | `&mut Vec<T>`    | [`Bulk`]     | `ConversionIntoVec`       | `ConversionUseVec`       |
//!
//! `Vec<u8>` is a native blob and therefore binds as a scalar.

use crate::binding::into_type::{ConversionInto, ConversionIntoOptional, ConversionIntoVec};
use crate::binding::use_type::{ConversionUse, ConversionUseOptional, ConversionUseVec};
use crate::conversion::TypeConversion;
use crate::error::Result;
use crate::traits::{IntoTypePtr, UseTypePtr};
use crate::types::Indicator;

/// Shape tag: a single value.
#[derive(Debug)]
pub enum Scalar {}

/// Shape tag: an `Option<T>`, with NULL handled by an owned indicator.
#[derive(Debug)]
pub enum Optional {}

/// Shape tag: a `Vec<T>` bound for batch execute or fetch.
#[derive(Debug)]
pub enum Bulk {}

/// A value that can be bound as a fetch destination.
pub trait IntoTarget<'a, Shape> {
    fn into_binding(self) -> IntoTypePtr<'a>;
}

/// A fetch destination that can also report NULLs through caller-owned
/// indicators.
pub trait IntoTargetWithIndicator<'a, Shape>: IntoTarget<'a, Shape> {
    type Indicators;

    fn into_binding_with_indicator(self, indicators: Self::Indicators)
        -> Result<IntoTypePtr<'a>>;
}

/// A value that can be bound as a query parameter.
pub trait UseTarget<'a, Shape> {
    fn use_binding(self, name: Option<String>) -> UseTypePtr<'a>;
}

/// A query parameter whose NULLs come from caller-owned indicators.
pub trait UseTargetWithIndicator<'a, Shape>: UseTarget<'a, Shape> {
    type Indicators;

    fn use_binding_with_indicator(
        self,
        indicators: Self::Indicators,
        name: Option<String>,
    ) -> Result<UseTypePtr<'a>>;
}

impl<'a, T: TypeConversion + 'a> IntoTarget<'a, Scalar> for &'a mut T {
    fn into_binding(self) -> IntoTypePtr<'a> {
        Box::new(ConversionInto::new(self))
    }
}

impl<'a, T: TypeConversion + 'a> IntoTargetWithIndicator<'a, Scalar> for &'a mut T {
    type Indicators = &'a mut Indicator;

    fn into_binding_with_indicator(self, indicator: &'a mut Indicator) -> Result<IntoTypePtr<'a>> {
        Ok(Box::new(ConversionInto::with_indicator(self, indicator)))
    }
}

impl<'a, T: TypeConversion + 'a> IntoTarget<'a, Optional> for &'a mut Option<T> {
    fn into_binding(self) -> IntoTypePtr<'a> {
        Box::new(ConversionIntoOptional::new(self))
    }
}

impl<'a, T: TypeConversion + Default + 'a> IntoTarget<'a, Bulk> for &'a mut Vec<T> {
    fn into_binding(self) -> IntoTypePtr<'a> {
        Box::new(ConversionIntoVec::new(self))
    }
}

impl<'a, T: TypeConversion + Default + 'a> IntoTargetWithIndicator<'a, Bulk> for &'a mut Vec<T> {
    type Indicators = &'a mut Vec<Indicator>;

    fn into_binding_with_indicator(
        self,
        indicators: &'a mut Vec<Indicator>,
    ) -> Result<IntoTypePtr<'a>> {
        Ok(Box::new(ConversionIntoVec::with_indicators(self, indicators)?))
    }
}

impl<'a, T: TypeConversion + 'a> UseTarget<'a, Scalar> for &'a mut T {
    fn use_binding(self, name: Option<String>) -> UseTypePtr<'a> {
        Box::new(ConversionUse::new(self, name))
    }
}

impl<'a, T: TypeConversion + 'a> UseTargetWithIndicator<'a, Scalar> for &'a mut T {
    type Indicators = &'a mut Indicator;

    fn use_binding_with_indicator(
        self,
        indicator: &'a mut Indicator,
        name: Option<String>,
    ) -> Result<UseTypePtr<'a>> {
        Ok(Box::new(ConversionUse::with_indicator(self, indicator, name)))
    }
}

impl<'a, T: TypeConversion + 'a> UseTarget<'a, Optional> for &'a mut Option<T> {
    fn use_binding(self, name: Option<String>) -> UseTypePtr<'a> {
        Box::new(ConversionUseOptional::new(self, name))
    }
}

impl<'a, T: TypeConversion + 'a> UseTarget<'a, Bulk> for &'a mut Vec<T> {
    fn use_binding(self, name: Option<String>) -> UseTypePtr<'a> {
        Box::new(ConversionUseVec::new(self, name))
    }
}

impl<'a, T: TypeConversion + 'a> UseTargetWithIndicator<'a, Bulk> for &'a mut Vec<T> {
    type Indicators = &'a [Indicator];

    fn use_binding_with_indicator(
        self,
        indicators: &'a [Indicator],
        name: Option<String>,
    ) -> Result<UseTypePtr<'a>> {
        Ok(Box::new(ConversionUseVec::with_indicators(
            self, indicators, name,
        )?))
    }
}

/// Binds `target` as a fetch destination.
pub fn into<'a, S, X>(target: X) -> IntoTypePtr<'a>
where
    X: IntoTarget<'a, S>,
{
    target.into_binding()
}

/// Binds `target` as a fetch destination that reports NULLs through
/// `indicators`. Bulk targets fail when the two lengths differ.
pub fn into_with_indicator<'a, S, X>(target: X, indicators: X::Indicators) -> Result<IntoTypePtr<'a>>
where
    X: IntoTargetWithIndicator<'a, S>,
{
    target.into_binding_with_indicator(indicators)
}

/// Binds `target` as a positional query parameter.
pub fn use_<'a, S, X>(target: X) -> UseTypePtr<'a>
where
    X: UseTarget<'a, S>,
{
    target.use_binding(None)
}

/// Binds `target` as a named query parameter.
pub fn use_named<'a, S, X>(target: X, name: impl Into<String>) -> UseTypePtr<'a>
where
    X: UseTarget<'a, S>,
{
    target.use_binding(Some(name.into()))
}

/// Binds `target` as a positional query parameter with NULLs taken from
/// `indicators`. Bulk targets fail when the two lengths differ.
pub fn use_with_indicator<'a, S, X>(target: X, indicators: X::Indicators) -> Result<UseTypePtr<'a>>
where
    X: UseTargetWithIndicator<'a, S>,
{
    target.use_binding_with_indicator(indicators, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PgBindError;
    use crate::types::SqlValue;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Tag(String);

    impl TypeConversion for Tag {
        type Base = String;

        fn from_base(base: &String) -> Result<Self> {
            Ok(Tag(base.trim_start_matches('#').to_string()))
        }

        fn to_base(&self) -> Result<String> {
            Ok(format!("#{}", self.0))
        }
    }

    #[test]
    fn test_shape_selection() {
        let mut scalar = Tag("a".to_string());
        let mut optional: Option<Tag> = None;
        let mut bulk = vec![Tag::default(); 4];
        let mut blob: Vec<u8> = vec![1, 2];

        assert!(!into(&mut scalar).is_bulk());
        assert!(!into(&mut optional).is_bulk());
        assert!(!into(&mut blob).is_bulk());

        let bulk_into = into(&mut bulk);
        assert!(bulk_into.is_bulk());
        assert_eq!(bulk_into.size(), 4);
    }

    #[test]
    fn test_use_factory_converts() {
        let mut tag = Tag("rust".to_string());
        let mut use_ = use_named(&mut tag, "tag");
        use_.pre_use().unwrap();
        assert_eq!(use_.name(), Some("tag"));
        assert_eq!(use_.sql_value(0).unwrap(), SqlValue::from("#rust"));
    }

    #[test]
    fn test_blob_binds_as_scalar() {
        let mut blob: Vec<u8> = vec![9, 8];
        let mut use_ = use_(&mut blob);
        use_.pre_use().unwrap();
        assert!(!use_.is_bulk());
        assert_eq!(use_.sql_value(0).unwrap(), SqlValue::Blob(vec![9, 8]));
    }

    #[test]
    fn test_indicator_factories_check_sizes() {
        let mut values = vec![Tag::default(); 2];
        let mut inds = vec![Indicator::Ok; 1];
        assert!(matches!(
            into_with_indicator(&mut values, &mut inds),
            Err(PgBindError::IndicatorSizeMismatch { .. })
        ));

        let mut values = vec![Tag::default(); 2];
        let inds = [Indicator::Ok; 3];
        assert!(matches!(
            use_with_indicator(&mut values, &inds[..]),
            Err(PgBindError::IndicatorSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_scalar_indicator_factory() {
        let mut tag = Tag("x".to_string());
        let mut ind = Indicator::Ok;
        {
            let mut into = into_with_indicator(&mut tag, &mut ind).unwrap();
            into.fetch_value(0, &SqlValue::Null).unwrap();
            into.post_fetch(true).unwrap();
        }
        assert_eq!(ind, Indicator::Null);
        assert_eq!(tag, Tag("x".to_string()));
    }
}
