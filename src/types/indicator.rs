/// Side-channel status of a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indicator {
    /// A value is present.
    #[default]
    Ok,
    Null,
    Truncated,
}

impl Indicator {
    pub fn is_null(self) -> bool {
        self == Indicator::Null
    }
}
