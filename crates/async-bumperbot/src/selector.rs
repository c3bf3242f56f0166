use heapless::Vec;

use crate::{error::PolicyError, hal::RandomSource};

/// Upper limit of bands in one [`Policy`]. An intent may own several bands.
pub const MAX_BANDS: usize = 8;

/// Abstract drive decision, before it becomes wheel flags.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Intent {
    Forward,
    TurnLeft,
    TurnRight,
    TurnAround,
}

impl Intent {
    pub fn all() -> [Self; 4] {
        [
            Self::Forward,
            Self::TurnLeft,
            Self::TurnRight,
            Self::TurnAround,
        ]
    }
}

/// Samples below `upto` (and above the previous band) select `intent`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub upto: f32,
    pub intent: Intent,
}

impl Band {
    pub const fn new(upto: f32, intent: Intent) -> Self {
        Self { upto, intent }
    }
}

/// Forward 20 %, TurnLeft 30 %, TurnRight 30 %, TurnAround 20 %, interleaved
/// so that 0.25 and 0.59 turn left, 0.61 turns right, 0.85 turns around and
/// 0.99 goes straight.
const COLLISION_RECOVERY: [Band; 8] = [
    Band::new(0.1, Intent::Forward),
    Band::new(0.2, Intent::TurnAround),
    Band::new(0.3, Intent::TurnLeft),
    Band::new(0.4, Intent::TurnRight),
    Band::new(0.6, Intent::TurnLeft),
    Band::new(0.8, Intent::TurnRight),
    Band::new(0.9, Intent::TurnAround),
    Band::new(1.0, Intent::Forward),
];

const WANDERING: [Band; 3] = [
    Band::new(0.9, Intent::Forward),
    Band::new(0.96, Intent::TurnLeft),
    Band::new(1.0, Intent::TurnRight),
];

/// Weighted partition of `[0, 1)` into intents.
#[derive(Clone, Debug, PartialEq)]
pub struct Policy {
    bands: Vec<Band, MAX_BANDS>,
}

impl Policy {
    /// Used after a head-on collision.
    pub fn collision_recovery() -> Self {
        Self {
            bands: COLLISION_RECOVERY.iter().copied().collect(),
        }
    }

    /// Used while nothing is touched.
    pub fn wandering() -> Self {
        Self {
            bands: WANDERING.iter().copied().collect(),
        }
    }

    pub fn from_bands(bands: &[Band]) -> Result<Self, PolicyError> {
        let policy = Self {
            bands: Vec::from_slice(bands).map_err(|_| PolicyError::TooManyBands)?,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Builds the bands from integer percentages summing to 100.
    /// Intents with weight zero are left out.
    pub fn from_weights(weights: &[(Intent, u8)]) -> Result<Self, PolicyError> {
        let mut bands = Vec::<Band, MAX_BANDS>::new();
        let mut total = 0u32;
        for &(intent, weight) in weights.iter().filter(|(_, w)| *w > 0) {
            total += u32::from(weight);
            bands
                .push(Band::new(total as f32 / 100.0, intent))
                .map_err(|_| PolicyError::TooManyBands)?;
        }
        if bands.is_empty() {
            return Err(PolicyError::Empty);
        }
        if total != 100 {
            return Err(PolicyError::NotCovering);
        }
        Ok(Self { bands })
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        let last = self.bands.last().ok_or(PolicyError::Empty)?;
        if self
            .bands
            .windows(2)
            .any(|pair| pair[1].upto <= pair[0].upto)
            || self.bands[0].upto <= 0.0
        {
            return Err(PolicyError::NotIncreasing);
        }
        if last.upto != 1.0 {
            return Err(PolicyError::NotCovering);
        }
        Ok(())
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Maps one uniform sample to an intent. Out-of-range samples fall into
    /// the last band.
    pub fn pick(&self, sample: f32) -> Intent {
        self.bands
            .iter()
            .find(|band| sample < band.upto)
            .or(self.bands.last())
            .map_or(Intent::Forward, |band| band.intent)
    }

    /// Draws exactly one sample from `rng`.
    pub fn select(&self, rng: &mut impl RandomSource) -> Intent {
        self.pick(rng.uniform())
    }

    pub fn probability(&self, intent: Intent) -> f32 {
        let mut lower = 0.0;
        let mut sum = 0.0;
        for band in &self.bands {
            if band.intent == intent {
                sum += band.upto - lower;
            }
            lower = band.upto;
        }
        sum
    }
}
