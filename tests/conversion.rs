use std::cell::Cell;

use chrono::{DateTime, Utc};
use pgbind::binding::{ConversionIntoVec, ConversionUseVec};
use pgbind::error::PgBindError;
use pgbind::{into, into_with_indicator, use_, use_with_indicator, Indicator, IntoType, Result, SqlValue, TypeConversion, UseType};

// Sends `value` through a use binding and reads the sent native value back
// through an into binding of the same type.
fn round_trip<T: TypeConversion>(mut value: T, mut out: T) -> T {
    let sent = {
        let mut binding = use_(&mut value);
        binding.pre_use().unwrap();
        binding.sql_value(0).unwrap()
    };
    {
        let mut binding = into(&mut out);
        binding.fetch_value(0, &sent).unwrap();
        binding.post_fetch(true).unwrap();
    }
    out
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Label(String);

impl TypeConversion for Label {
    type Base = String;

    fn from_base(base: &String) -> Result<Self> {
        Ok(Label(base.clone()))
    }

    fn to_base(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Ticks(i64);

impl TypeConversion for Ticks {
    type Base = i64;

    fn from_base(base: &i64) -> Result<Self> {
        Ok(Ticks(*base))
    }

    fn to_base(&self) -> Result<i64> {
        Ok(self.0)
    }
}

/// Stored as a percentage in an int32 column.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Ratio(f64);

impl TypeConversion for Ratio {
    type Base = i32;

    fn from_base(base: &i32) -> Result<Self> {
        Ok(Ratio(f64::from(*base) / 100.0))
    }

    fn to_base(&self) -> Result<i32> {
        let scaled = (self.0 * 100.0).round();
        if scaled < f64::from(i32::MIN) || scaled > f64::from(i32::MAX) {
            return Err(PgBindError::conversion(format!("ratio {} out of range", self.0)));
        }
        Ok(scaled as i32)
    }
}

thread_local! {
    static FROM_CALLS: Cell<usize> = const { Cell::new(0) };
    static TO_CALLS: Cell<usize> = const { Cell::new(0) };
}

/// Stored as tenths.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Tenths(i32);

impl TypeConversion for Tenths {
    type Base = i32;

    fn from_base(base: &i32) -> Result<Self> {
        FROM_CALLS.with(|calls| calls.set(calls.get() + 1));
        Ok(Tenths(*base / 10))
    }

    fn to_base(&self) -> Result<i32> {
        TO_CALLS.with(|calls| calls.set(calls.get() + 1));
        Ok(self.0 * 10)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Counted(i32);

impl TypeConversion for Counted {
    type Base = i32;

    fn from_base(base: &i32) -> Result<Self> {
        FROM_CALLS.with(|calls| calls.set(calls.get() + 1));
        Ok(Counted(*base))
    }

    fn to_base(&self) -> Result<i32> {
        Ok(self.0)
    }
}

#[test]
fn test_identity_default_for_native_types() {
    for v in [0i32, 1, -1, i32::MIN, i32::MAX] {
        assert_eq!(round_trip(v, 0), v);
    }
    for v in [0i64, i64::MIN, i64::MAX] {
        assert_eq!(round_trip(v, 0), v);
    }
    for v in [0.0f64, -1.5, f64::MIN, f64::MAX] {
        assert_eq!(round_trip(v, 0.0), v);
    }
    for v in ["", "plain", "ünïcödé"] {
        assert_eq!(round_trip(v.to_string(), String::new()), v);
    }
    assert!(round_trip(true, false));
    assert_eq!(round_trip(vec![0u8, 255], Vec::new()), vec![0u8, 255]);

    let ts = DateTime::<Utc>::from_timestamp(1_234_567_890, 123_000).unwrap();
    assert_eq!(round_trip(ts, DateTime::<Utc>::default()), ts);
}

#[test]
fn test_round_trip_with_user_conversion() {
    assert_eq!(round_trip(Label(String::new()), Label("x".into())), Label(String::new()));
    assert_eq!(round_trip(Label("abc".into()), Label::default()), Label("abc".into()));

    for v in [0, i64::MIN, i64::MAX] {
        assert_eq!(round_trip(Ticks(v), Ticks::default()), Ticks(v));
    }

    for v in [0.0, 0.25, -12.5, f64::from(i32::MAX) / 100.0, f64::from(i32::MIN) / 100.0] {
        assert_eq!(round_trip(Ratio(v), Ratio::default()), Ratio(v));
    }
}

#[test]
fn test_user_conversion_failure_propagates() {
    let mut ratio = Ratio(1e12);
    let mut binding = use_(&mut ratio);
    assert!(matches!(binding.pre_use(), Err(PgBindError::Conversion(_))));
}

#[test]
fn test_optional_round_trip() {
    let mut none: Option<Label> = None;
    let sent = {
        let mut binding = use_(&mut none);
        binding.pre_use().unwrap();
        binding.sql_value(0).unwrap()
    };
    assert_eq!(sent, SqlValue::Null);

    let mut fetched = Some(Label("stale".into()));
    {
        let mut binding = into(&mut fetched);
        binding.fetch_value(0, &sent).unwrap();
        binding.post_fetch(true).unwrap();
    }
    assert_eq!(fetched, None);

    for v in ["", "x", "longer value"] {
        let mut some = Some(Label(v.into()));
        let sent = {
            let mut binding = use_(&mut some);
            binding.pre_use().unwrap();
            binding.sql_value(0).unwrap()
        };
        let mut out: Option<Label> = None;
        {
            let mut binding = into(&mut out);
            binding.fetch_value(0, &sent).unwrap();
            binding.post_fetch(true).unwrap();
        }
        assert_eq!(out, Some(Label(v.into())));
    }
}

#[test]
fn test_bulk_positional_integrity() {
    for n in [0usize, 1, 64] {
        let mut ticks: Vec<Ticks> = (0..n as i64).map(|i| Ticks(i * 7 - 3)).collect();
        let expected: Vec<SqlValue> = ticks.iter().map(|t| SqlValue::Int64(t.0)).collect();

        let mut binding = ConversionUseVec::new(&mut ticks, None);
        binding.pre_use().unwrap();
        assert_eq!(binding.size(), n);

        let sent: Vec<SqlValue> = (0..n).map(|row| binding.sql_value(row).unwrap()).collect();
        assert_eq!(sent, expected);
    }
}

#[test]
fn test_bulk_use_converts_rows_marked_null() {
    let mut values = vec![Tenths(1), Tenths(2), Tenths(3)];
    let inds = [Indicator::Ok, Indicator::Null, Indicator::Ok];

    TO_CALLS.with(|calls| calls.set(0));
    let mut binding = ConversionUseVec::with_indicators(&mut values, &inds, None).unwrap();
    binding.pre_use().unwrap();

    assert_eq!(TO_CALLS.with(Cell::get), 3);
    assert_eq!(binding.staging(), &[10, 20, 30]);
    assert_eq!(binding.sql_value(1).unwrap(), SqlValue::Null);
}

#[test]
fn test_scalar_use_converts_when_marked_null() {
    let mut value = Tenths(4);
    let mut ind = Indicator::Null;

    TO_CALLS.with(|calls| calls.set(0));
    let mut binding = use_with_indicator(&mut value, &mut ind).unwrap();
    binding.pre_use().unwrap();

    assert_eq!(TO_CALLS.with(Cell::get), 1);
    assert_eq!(binding.sql_value(0).unwrap(), SqlValue::Null);
}

#[test]
fn test_bulk_use_indicators_mark_rows_null() {
    let mut labels = vec![Label("a".into()), Label("b".into()), Label("c".into())];
    let inds = [Indicator::Ok, Indicator::Null, Indicator::Ok];

    let mut binding = ConversionUseVec::with_indicators(&mut labels, &inds, None).unwrap();
    binding.pre_use().unwrap();
    assert_eq!(binding.sql_value(0).unwrap(), SqlValue::from("a"));
    assert_eq!(binding.sql_value(1).unwrap(), SqlValue::Null);
    assert_eq!(binding.sql_value(2).unwrap(), SqlValue::from("c"));
}

#[test]
fn test_bulk_resize_touches_exactly_new_size() {
    for (from, to) in [(3usize, 8usize), (8, 3)] {
        let mut values = vec![Counted::default(); from];
        {
            let mut binding = ConversionIntoVec::new(&mut values);
            binding.resize(to);
            assert_eq!(binding.size(), to);
            assert_eq!(binding.staging().len(), to);

            for row in 0..to {
                binding.fetch_value(row, &SqlValue::Int32(row as i32)).unwrap();
            }

            FROM_CALLS.with(|calls| calls.set(0));
            binding.post_fetch(true).unwrap();
            assert_eq!(FROM_CALLS.with(Cell::get), to);
        }
        let expected: Vec<Counted> = (0..to as i32).map(Counted).collect();
        assert_eq!(values, expected);
    }
}

#[test]
fn test_bulk_into_indicator_mismatch_rejected() {
    let mut values = vec![Counted::default(); 2];
    let mut inds = Vec::new();
    assert!(matches!(
        ConversionIntoVec::with_indicators(&mut values, &mut inds),
        Err(PgBindError::IndicatorSizeMismatch {
            values: 2,
            indicators: 0
        })
    ));
}

#[test]
fn test_into_with_null_indicator_keeps_value() {
    let mut value = Tenths(7);
    let mut ind = Indicator::Ok;
    {
        let mut binding = into_with_indicator(&mut value, &mut ind).unwrap();
        binding.fetch_value(0, &SqlValue::Null).unwrap();

        FROM_CALLS.with(|calls| calls.set(0));
        binding.post_fetch(true).unwrap();
        assert_eq!(FROM_CALLS.with(Cell::get), 0);
    }
    assert_eq!(ind, Indicator::Null);
    assert_eq!(value, Tenths(7));
}

#[test]
fn test_plain_into_rejects_null() {
    let mut label = Label("kept".into());
    let mut binding = into(&mut label);
    assert!(matches!(
        binding.fetch_value(0, &SqlValue::Null),
        Err(PgBindError::NullWithoutIndicator { row: 0 })
    ));
}
