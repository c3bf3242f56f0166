//! Platform services the behaviour core drives.
//!
//! None of these calls can fail from the core's point of view; a platform that
//! loses a sensor or a motor has to deal with it on its own side.

use rand::{Rng, RngCore};

use crate::{Side, Speed};

/// Instantaneous state of the touch sensors.
pub trait TouchSensor {
    fn is_pressed(&mut self, side: Side) -> bool;
}

/// Per-side count of discrete bump events, kept by the platform.
pub trait BumpCounter {
    fn bump_count(&mut self, side: Side) -> u32;
    fn reset_bump_count(&mut self, side: Side);
}

pub trait Drive {
    fn set_wheel_speed(&mut self, side: Side, speed: Speed);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Tone {
    pub frequency_hz: u16,
    pub duration_ms: u16,
}

/// Best-effort audible feedback. Must not block the caller.
pub trait Buzzer {
    fn play_tone(&mut self, tone: Tone);
}

/// Cooperative wait of the calling task.
#[allow(async_fn_in_trait)]
pub trait Delay {
    async fn delay_ms(&mut self, ms: u32);
}

/// Uniform samples in `[0, 1)`.
pub trait RandomSource {
    fn uniform(&mut self) -> f32;

    /// Uniform integer in `[0, bound)`, `0` for a zero bound.
    fn below(&mut self, bound: u32) -> u32 {
        let value = (self.uniform() * bound as f32) as u32;
        value.min(bound.saturating_sub(1))
    }
}

/// Adapts any [`RngCore`] to a [`RandomSource`].
pub struct RngSource<R: RngCore>(pub R);

impl<R: RngCore> RandomSource for RngSource<R> {
    fn uniform(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}

impl<T: TouchSensor + ?Sized> TouchSensor for &mut T {
    fn is_pressed(&mut self, side: Side) -> bool {
        (**self).is_pressed(side)
    }
}

impl<T: BumpCounter + ?Sized> BumpCounter for &mut T {
    fn bump_count(&mut self, side: Side) -> u32 {
        (**self).bump_count(side)
    }
    fn reset_bump_count(&mut self, side: Side) {
        (**self).reset_bump_count(side)
    }
}

impl<T: Drive + ?Sized> Drive for &mut T {
    fn set_wheel_speed(&mut self, side: Side, speed: Speed) {
        (**self).set_wheel_speed(side, speed)
    }
}

impl<T: Buzzer + ?Sized> Buzzer for &mut T {
    fn play_tone(&mut self, tone: Tone) {
        (**self).play_tone(tone)
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    async fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms).await
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn uniform(&mut self) -> f32 {
        (**self).uniform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    struct Fixed(f32);

    impl RandomSource for Fixed {
        fn uniform(&mut self) -> f32 {
            self.0
        }
    }

    #[test]
    fn below_stays_in_range() {
        assert_eq!(Fixed(0.0).below(500), 0);
        assert_eq!(Fixed(0.5).below(500), 250);
        assert_eq!(Fixed(0.999_999_9).below(500), 499);
        assert_eq!(Fixed(0.7).below(0), 0);
    }

    #[test]
    fn rng_source_is_unit_interval() {
        let mut rng = RngSource(SmallRng::seed_from_u64(7));
        for _ in 0..10_000 {
            let r = rng.uniform();
            assert!((0.0..1.0).contains(&r));
        }
    }
}
