use tracing::{debug, info};

use crate::{
    hal::{BumpCounter, Buzzer, Delay, RandomSource},
    Config, DriveFlags, Intent, MotionWriter, SharedState, Side, TouchFlags,
};

/// The branch one controller step took, in priority order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Branch {
    /// both bumpers pressed, followed by the chosen recovery intent
    Collision(Intent),
    /// too many bumps since the last reset
    Oscillation,
    LeftBump,
    RightBump,
    Wander(Intent),
}

/// Decision loop writing the motion flags.
///
/// A step runs its branch to completion, including all of its waits, before
/// the sensors are looked at again.
pub struct BehaviorController<'a, B, Z, T, R> {
    state: &'a SharedState,
    motion: MotionWriter<'a>,
    bumps: B,
    buzzer: Z,
    delay: T,
    rng: R,
    config: Config,
}

impl<'a, B, Z, T, R> BehaviorController<'a, B, Z, T, R>
where
    B: BumpCounter,
    Z: Buzzer,
    T: Delay,
    R: RandomSource,
{
    pub fn new(
        motion: MotionWriter<'a>,
        bumps: B,
        buzzer: Z,
        delay: T,
        rng: R,
        config: Config,
    ) -> Self {
        Self {
            state: motion.state(),
            motion,
            bumps,
            buzzer,
            delay,
            rng,
            config,
        }
    }

    pub fn oscillation_count(&mut self) -> u32 {
        Side::both()
            .into_iter()
            .map(|side| self.bumps.bump_count(side))
            .fold(0, u32::saturating_add)
    }

    /// Both counters are always cleared together.
    pub fn reset_oscillation(&mut self) {
        for side in Side::both() {
            self.bumps.reset_bump_count(side);
        }
    }

    pub async fn run(&mut self) -> ! {
        self.reset_oscillation();
        loop {
            self.step().await;
        }
    }

    /// Evaluates the branches once, first match wins.
    pub async fn step(&mut self) -> Branch {
        let touch = self.state.touch();
        if touch.both() {
            Branch::Collision(self.collision().await)
        } else if self.oscillation_count() >= self.config.oscillation_tolerance {
            self.escape(touch).await;
            Branch::Oscillation
        } else if touch.left {
            self.evade(Side::Left).await;
            Branch::LeftBump
        } else if touch.right {
            self.evade(Side::Right).await;
            Branch::RightBump
        } else {
            Branch::Wander(self.wander().await)
        }
    }

    async fn collision(&mut self) -> Intent {
        info!("head-on collision");
        self.reset_oscillation();
        self.motion.set_wandering(false);
        self.buzzer.play_tone(self.config.alert);

        self.hold(DriveFlags::REVERSE, self.config.reverse_ms).await;
        self.hold(DriveFlags::STOP, self.config.pause_ms).await;

        let intent = self.config.recovery.select(&mut self.rng);
        let turn_ms = match intent {
            Intent::TurnAround => self.config.turn_around_ms,
            _ => self.turn_ms(),
        };
        info!(?intent, turn_ms, "recovering");
        self.hold(intent.into(), turn_ms).await;

        self.motion.set_drive(DriveFlags::FORWARD);
        intent
    }

    /// Keeps the wheel on the bumped side driving and stops the other one.
    ///
    /// That pivots away from the contact in the same direction as a single
    /// bump on that side, so the escape and [`Self::evade`] never work against
    /// each other. With no contact both wheels drive and the robot leaves
    /// straight ahead.
    async fn escape(&mut self, touch: TouchFlags) {
        info!(
            count = self.oscillation_count(),
            left = touch.left,
            right = touch.right,
            "oscillation detected"
        );
        self.reset_oscillation();
        self.motion.set_wheels(!touch.right, !touch.left);
        self.delay.delay_ms(self.config.turn_around_ms).await;
    }

    /// Backs up, then pivots away from the bumped side.
    async fn evade(&mut self, bumped: Side) {
        info!(side = %bumped, "bump");
        self.motion.set_wandering(false);
        self.hold(DriveFlags::REVERSE, self.config.reverse_ms).await;

        let away = match bumped {
            Side::Left => Intent::TurnRight,
            Side::Right => Intent::TurnLeft,
        };
        let turn_ms = self.turn_ms();
        self.hold(away.into(), turn_ms).await;

        self.motion.set_drive(DriveFlags::FORWARD);
    }

    async fn wander(&mut self) -> Intent {
        self.motion.set_wandering(true);
        let intent = self.config.wandering.select(&mut self.rng);
        debug!(?intent, "wander");
        self.hold(intent.into(), self.config.wander_ms).await;
        intent
    }

    fn turn_ms(&mut self) -> u32 {
        self.config
            .turn_ms
            .saturating_add(self.rng.below(self.config.turn_jitter_ms))
    }

    async fn hold(&mut self, drive: DriveFlags, ms: u32) {
        self.motion.set_drive(drive);
        self.delay.delay_ms(ms).await;
    }
}
