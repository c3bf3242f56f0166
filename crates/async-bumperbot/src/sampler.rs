use tracing::trace;

use crate::{
    hal::{Delay, TouchSensor},
    Side, TouchFlags, TouchWriter,
};

/// Periodic task copying the touch sensors into the shared state.
///
/// The fixed period doubles as debounce: a contact shorter than one period
/// may go unnoticed.
pub struct SensorSampler<'a, S: TouchSensor, T: Delay> {
    writer: TouchWriter<'a>,
    sensor: S,
    delay: T,
    period_ms: u32,
}

impl<'a, S: TouchSensor, T: Delay> SensorSampler<'a, S, T> {
    pub fn new(writer: TouchWriter<'a>, sensor: S, delay: T, period_ms: u32) -> Self {
        Self {
            writer,
            sensor,
            delay,
            period_ms,
        }
    }

    pub fn sample(&mut self) -> TouchFlags {
        let touch = TouchFlags {
            left: self.sensor.is_pressed(Side::Left),
            right: self.sensor.is_pressed(Side::Right),
        };
        trace!(left = touch.left, right = touch.right, "touch sample");
        self.writer.publish(touch);
        touch
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.delay.delay_ms(self.period_ms).await;
            self.sample();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SharedState;
    use core::cell::Cell;

    struct Pressed(Cell<[bool; 2]>);

    impl TouchSensor for &Pressed {
        fn is_pressed(&mut self, side: Side) -> bool {
            self.0.get()[side as usize]
        }
    }

    struct NoDelay;

    impl Delay for NoDelay {
        async fn delay_ms(&mut self, _ms: u32) {}
    }

    #[test]
    fn sample_publishes_latest_reading() {
        let state = SharedState::new();
        let (touch, _) = state.split().unwrap();
        let pressed = Pressed(Cell::new([false, true]));
        let mut sampler = SensorSampler::new(touch, &pressed, NoDelay, 50);

        assert_eq!(
            sampler.sample(),
            TouchFlags {
                left: false,
                right: true
            }
        );
        assert!(state.touch().right && !state.touch().left);

        pressed.0.set([true, true]);
        assert!(!state.touch().both());
        sampler.sample();
        assert!(state.touch().both());

        pressed.0.set([false, false]);
        sampler.sample();
        assert!(!state.touch().any());
    }
}
