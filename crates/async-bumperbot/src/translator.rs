use tracing::debug;

use crate::{
    error::SpeedOutOfRange,
    hal::{Delay, Drive},
    MotionFlags, SharedState, Side,
};

/// Signed wheel speed in percent of full power.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Speed(i8);

impl Speed {
    pub const FORWARD: Self = Self(100);
    pub const REVERSE: Self = Self(-100);
    pub const STOP: Self = Self(0);
    /// default speed of a disabled wheel while wandering
    pub const CREEP: Self = Self(35);

    pub fn new(percent: i8) -> Result<Self, SpeedOutOfRange> {
        if (-100..=100).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(SpeedOutOfRange)
        }
    }

    pub fn percent(&self) -> i8 {
        self.0
    }

    fn full(reverse: bool) -> Self {
        if reverse {
            Self::REVERSE
        } else {
            Self::FORWARD
        }
    }
}

impl core::fmt::Display for Speed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct WheelCommand {
    pub left: Speed,
    pub right: Speed,
}

impl WheelCommand {
    pub const fn new(left: Speed, right: Speed) -> Self {
        Self { left, right }
    }

    pub fn speed(&self, side: Side) -> Speed {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Wheel speeds for a set of motion flags.
///
/// A disabled wheel creeps at `creep` while wandering so the robot curves
/// smoothly, and stops while evading so it pivots sharply.
pub fn translate(flags: MotionFlags, creep: Speed) -> WheelCommand {
    let drive = flags.drive;
    match (drive.left_enabled, drive.right_enabled) {
        (true, true) => {
            let speed = Speed::full(drive.reverse);
            WheelCommand::new(speed, speed)
        }
        (false, false) if drive.reverse => WheelCommand::new(Speed::REVERSE, Speed::FORWARD),
        (false, false) => WheelCommand::new(Speed::STOP, Speed::STOP),
        (left_enabled, right_enabled) => {
            let idle = if flags.wandering { creep } else { Speed::STOP };
            let wheel = |enabled: bool| {
                if enabled {
                    Speed::full(drive.reverse)
                } else {
                    idle
                }
            };
            WheelCommand::new(wheel(left_enabled), wheel(right_enabled))
        }
    }
}

/// Periodic task pushing the current motion flags to the wheels.
pub struct MotionTranslator<'a, D: Drive, T: Delay> {
    state: &'a SharedState,
    drive: D,
    delay: T,
    period_ms: u32,
    creep: Speed,
    last: Option<WheelCommand>,
}

impl<'a, D: Drive, T: Delay> MotionTranslator<'a, D, T> {
    pub fn new(state: &'a SharedState, drive: D, delay: T, period_ms: u32, creep: Speed) -> Self {
        Self {
            state,
            drive,
            delay,
            period_ms,
            creep,
            last: None,
        }
    }

    /// Reads the flags once and commands both wheels.
    pub fn tick(&mut self) -> WheelCommand {
        let command = translate(self.state.motion(), self.creep);
        if self.last != Some(command) {
            debug!(left = %command.left, right = %command.right, "wheel command");
            self.last = Some(command);
        }
        for side in Side::both() {
            self.drive.set_wheel_speed(side, command.speed(side));
        }
        command
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.tick();
            self.delay.delay_ms(self.period_ms).await;
        }
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DriveFlags;

    const CREEP: Speed = Speed::CREEP;

    fn speeds(reverse: bool, left: bool, right: bool, wandering: bool) -> (i8, i8) {
        let command = translate(
            MotionFlags {
                drive: DriveFlags::new(reverse, left, right),
                wandering,
            },
            CREEP,
        );
        (command.left.percent(), command.right.percent())
    }

    #[test]
    fn full_table() {
        for wandering in [false, true] {
            assert_eq!(speeds(false, true, true, wandering), (100, 100));
            assert_eq!(speeds(true, true, true, wandering), (-100, -100));
            assert_eq!(speeds(false, false, false, wandering), (0, 0));
            assert_eq!(speeds(true, false, false, wandering), (-100, 100));
        }

        assert_eq!(speeds(false, false, true, true), (35, 100));
        assert_eq!(speeds(false, true, false, true), (100, 35));
        assert_eq!(speeds(true, false, true, true), (35, -100));
        assert_eq!(speeds(true, true, false, true), (-100, 35));

        assert_eq!(speeds(false, false, true, false), (0, 100));
        assert_eq!(speeds(false, true, false, false), (100, 0));
        assert_eq!(speeds(true, false, true, false), (0, -100));
        assert_eq!(speeds(true, true, false, false), (-100, 0));
    }

    #[test]
    fn speed_range() {
        assert_eq!(Speed::new(100), Ok(Speed::FORWARD));
        assert_eq!(Speed::new(-100), Ok(Speed::REVERSE));
        assert_eq!(Speed::new(101), Err(SpeedOutOfRange));
        assert_eq!(Speed::new(-128), Err(SpeedOutOfRange));
    }

    #[derive(Default)]
    struct LastSpeeds([i8; 2]);

    impl Drive for LastSpeeds {
        fn set_wheel_speed(&mut self, side: Side, speed: Speed) {
            self.0[side as usize] = speed.percent();
        }
    }

    struct NoDelay;

    impl Delay for NoDelay {
        async fn delay_ms(&mut self, _ms: u32) {}
    }

    #[test]
    fn tick_follows_shared_state() {
        let state = SharedState::new();
        let (_, mut motion) = state.split().unwrap();
        let mut translator =
            MotionTranslator::new(&state, LastSpeeds::default(), NoDelay, 10, CREEP);

        translator.tick();
        assert_eq!(translator.drive().0, [0, 0]);

        motion.set_wandering(true);
        motion.set_drive(DriveFlags::new(false, false, true));
        translator.tick();
        assert_eq!(translator.drive().0, [35, 100]);

        motion.set_drive(DriveFlags::SPIN);
        translator.tick();
        assert_eq!(translator.drive().0, [-100, 100]);
    }
}
