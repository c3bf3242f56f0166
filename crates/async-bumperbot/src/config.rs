use crate::{error::ConfigError, hal::Tone, Policy, Speed};

/// Timings, thresholds and policies of the behaviour.
///
/// All durations are in milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// touch sensor sampling period, also the debounce interval
    pub sample_period_ms: u32,
    /// wheel command refresh period
    pub motion_period_ms: u32,
    /// backing up after a bump
    pub reverse_ms: u32,
    /// standing still after a head-on collision
    pub pause_ms: u32,
    /// base duration of a pivot
    pub turn_ms: u32,
    /// random extra time added to `turn_ms`, drawn from `0..turn_jitter_ms`
    pub turn_jitter_ms: u32,
    /// spinning in place, and holding the oscillation escape
    pub turn_around_ms: u32,
    /// hold time of one wandering decision
    pub wander_ms: u32,
    /// summed bump count that counts as oscillating against an obstacle
    pub oscillation_tolerance: u32,
    /// speed of a disabled wheel while wandering
    pub creep: Speed,
    pub alert: Tone,
    pub recovery: Policy,
    pub wandering: Policy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_period_ms: 50,
            motion_period_ms: 10,
            reverse_ms: 800,
            pause_ms: 2000,
            turn_ms: 600,
            turn_jitter_ms: 500,
            turn_around_ms: 800,
            wander_ms: 200,
            oscillation_tolerance: 4,
            creep: Speed::CREEP,
            alert: Tone {
                frequency_hz: 440,
                duration_ms: 100,
            },
            recovery: Policy::collision_recovery(),
            wandering: Policy::wandering(),
        }
    }
}

impl Config {
    pub fn with_sample_period_ms(mut self, ms: u32) -> Self {
        self.sample_period_ms = ms;
        self
    }

    pub fn with_motion_period_ms(mut self, ms: u32) -> Self {
        self.motion_period_ms = ms;
        self
    }

    pub fn with_turn_jitter_ms(mut self, ms: u32) -> Self {
        self.turn_jitter_ms = ms;
        self
    }

    pub fn with_oscillation_tolerance(mut self, tolerance: u32) -> Self {
        self.oscillation_tolerance = tolerance;
        self
    }

    pub fn with_creep_percent(mut self, percent: i8) -> Result<Self, ConfigError> {
        self.creep = Speed::new(percent)?;
        Ok(self)
    }

    pub fn with_recovery_policy(mut self, policy: Policy) -> Self {
        self.recovery = policy;
        self
    }

    pub fn with_wandering_policy(mut self, policy: Policy) -> Self {
        self.wandering = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period_ms == 0 || self.motion_period_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.oscillation_tolerance == 0 {
            return Err(ConfigError::ZeroTolerance);
        }
        if self.creep.percent() < 0 {
            return Err(ConfigError::CreepOutOfRange);
        }
        self.recovery.validate()?;
        self.wandering.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::PolicyError, Band, Intent};

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.creep.percent(), 35);
        assert_eq!(config.oscillation_tolerance, 4);
        assert_eq!(config.reverse_ms, 800);
        assert_eq!(config.pause_ms, 2000);
        assert_eq!(config.alert.frequency_hz, 440);
    }

    #[test]
    fn rejects_inconsistent_values() {
        assert_eq!(
            Config::default().with_sample_period_ms(0).validate(),
            Err(ConfigError::ZeroPeriod)
        );
        assert_eq!(
            Config::default().with_motion_period_ms(0).validate(),
            Err(ConfigError::ZeroPeriod)
        );
        assert_eq!(
            Config::default().with_oscillation_tolerance(0).validate(),
            Err(ConfigError::ZeroTolerance)
        );
        assert_eq!(
            Config::default().with_creep_percent(-10).unwrap().validate(),
            Err(ConfigError::CreepOutOfRange)
        );
        assert_eq!(
            Config::default().with_creep_percent(120),
            Err(ConfigError::CreepOutOfRange)
        );
    }

    #[test]
    fn rejects_broken_policy() {
        let straight = Policy::from_bands(&[Band::new(1.0, Intent::Forward)]).unwrap();
        let config = Config::default().with_wandering_policy(straight.clone());
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.wandering, straight);

        let broken = Policy::from_bands(&[Band::new(0.5, Intent::Forward)]);
        assert_eq!(broken, Err(PolicyError::NotCovering));
    }
}
