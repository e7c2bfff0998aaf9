//! Binding wrappers that join a native staging buffer to a caller's domain
//! value, and the factories that pick one by the value's shape.

mod dispatch;
mod into_type;
pub mod native;
mod use_type;

pub use dispatch::{
    into, into_with_indicator, use_, use_named, use_with_indicator, Bulk, IntoTarget,
    IntoTargetWithIndicator, Optional, Scalar, UseTarget, UseTargetWithIndicator,
};
pub use into_type::{ConversionInto, ConversionIntoOptional, ConversionIntoVec};
pub use use_type::{ConversionUse, ConversionUseOptional, ConversionUseVec};
