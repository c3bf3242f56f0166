/// Wheel speed outside of `-100..=100` percent.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SpeedOutOfRange;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PolicyError {
    Empty,
    /// more bands than [`crate::MAX_BANDS`]
    TooManyBands,
    /// upper bounds must strictly increase
    NotIncreasing,
    /// the last band has to end at exactly `1.0`
    NotCovering,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ConfigError {
    ZeroPeriod,
    ZeroTolerance,
    CreepOutOfRange,
    Policy(PolicyError),
}

impl From<PolicyError> for ConfigError {
    fn from(err: PolicyError) -> Self {
        ConfigError::Policy(err)
    }
}

impl From<SpeedOutOfRange> for ConfigError {
    fn from(_: SpeedOutOfRange) -> Self {
        ConfigError::CreepOutOfRange
    }
}
