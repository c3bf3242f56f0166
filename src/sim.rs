use core::cell::RefCell;
use core::f32::consts::TAU;

use async_bumperbot::hal::{BumpCounter, Buzzer, Drive, Tone, TouchSensor};
use async_bumperbot::{ClockBackend, Side, Speed};
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use tracing::{debug, info};

use crate::StdClock;

/// distance between the wheels
const WHEEL_BASE_M: f32 = 0.12;
/// ground speed of a wheel at 100 %
const MAX_WHEEL_SPEED_M_S: f32 = 0.25;
/// distance from the body centre to each bumper corner
const BUMPER_REACH_M: f32 = 0.08;
/// angle of each bumper corner off the heading
const BUMPER_ANGLE_RAD: f32 = 0.6;
/// a corner closer to a wall than this presses its bumper
const CONTACT_M: f32 = 0.02;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width_m: f32,
    pub height_m: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width_m: 1.5,
            height_m: 1.5,
        }
    }
}

/// Position in metres and heading in radians, counter-clockwise from +x.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

struct Body {
    pose: Pose,
    speeds: [Speed; 2],
    pressed: [bool; 2],
    bumps: [u32; 2],
    last_ms: Option<u32>,
}

/// Simulated robot implementing every platform trait through `&SimRobot`.
///
/// Motion is integrated lazily whenever the sensors or wheels are accessed,
/// from the wheel speeds commanded last.
pub struct SimRobot {
    arena: Arena,
    body: Mutex<CriticalSectionRawMutex, RefCell<Body>>,
}

impl SimRobot {
    /// Starts in the middle of the arena, facing +x.
    pub fn new(arena: Arena) -> Self {
        Self::with_pose(
            arena,
            Pose {
                x: arena.width_m / 2.0,
                y: arena.height_m / 2.0,
                heading: 0.0,
            },
        )
    }

    pub fn with_pose(arena: Arena, pose: Pose) -> Self {
        Self {
            arena,
            body: Mutex::new(RefCell::new(Body {
                pose,
                speeds: [Speed::STOP; 2],
                pressed: [false; 2],
                bumps: [0; 2],
                last_ms: None,
            })),
        }
    }

    pub fn pose(&self) -> Pose {
        self.body.lock(|body| body.borrow().pose)
    }

    /// Integrates motion up to `now_ms` and updates the bumpers.
    pub fn advance_to(&self, now_ms: u32) {
        self.body.lock(|body| {
            let mut body = body.borrow_mut();
            let dt = body
                .last_ms
                .map_or(0.0, |last| now_ms.saturating_sub(last) as f32 / 1000.0);
            body.last_ms = Some(now_ms);

            let [left, right] = body
                .speeds
                .map(|speed| f32::from(speed.percent()) / 100.0 * MAX_WHEEL_SPEED_M_S);
            let v = (left + right) / 2.0;
            let w = (right - left) / WHEEL_BASE_M;

            let mut pose = body.pose;
            pose.heading = (pose.heading + w * dt).rem_euclid(TAU);
            pose.x = (pose.x + v * pose.heading.cos() * dt)
                .clamp(BUMPER_REACH_M, self.arena.width_m - BUMPER_REACH_M);
            pose.y = (pose.y + v * pose.heading.sin() * dt)
                .clamp(BUMPER_REACH_M, self.arena.height_m - BUMPER_REACH_M);
            body.pose = pose;

            for side in Side::both() {
                let pressed = self.corner_touches_wall(pose, side);
                let i = side as usize;
                if pressed && !body.pressed[i] {
                    body.bumps[i] += 1;
                    debug!(%side, count = body.bumps[i], "bump event");
                }
                body.pressed[i] = pressed;
            }
        });
    }

    fn corner_touches_wall(&self, pose: Pose, side: Side) -> bool {
        let angle = match side {
            Side::Left => pose.heading + BUMPER_ANGLE_RAD,
            Side::Right => pose.heading - BUMPER_ANGLE_RAD,
        };
        let x = pose.x + BUMPER_REACH_M * angle.cos();
        let y = pose.y + BUMPER_REACH_M * angle.sin();
        x < CONTACT_M
            || y < CONTACT_M
            || x > self.arena.width_m - CONTACT_M
            || y > self.arena.height_m - CONTACT_M
    }

    fn sync(&self) {
        self.advance_to(StdClock::now());
    }

    fn pressed(&self, side: Side) -> bool {
        self.body.lock(|body| body.borrow().pressed[side as usize])
    }

    fn set_speed(&self, side: Side, speed: Speed) {
        self.body
            .lock(|body| body.borrow_mut().speeds[side as usize] = speed);
    }

    fn bumps(&self, side: Side) -> u32 {
        self.body.lock(|body| body.borrow().bumps[side as usize])
    }

    fn reset_bumps(&self, side: Side) {
        self.body
            .lock(|body| body.borrow_mut().bumps[side as usize] = 0);
    }
}

impl TouchSensor for &SimRobot {
    fn is_pressed(&mut self, side: Side) -> bool {
        self.sync();
        self.pressed(side)
    }
}

impl BumpCounter for &SimRobot {
    fn bump_count(&mut self, side: Side) -> u32 {
        self.bumps(side)
    }

    fn reset_bump_count(&mut self, side: Side) {
        self.reset_bumps(side);
    }
}

impl Drive for &SimRobot {
    fn set_wheel_speed(&mut self, side: Side, speed: Speed) {
        // integrate with the old speed before switching
        self.sync();
        self.set_speed(side, speed);
    }
}

impl Buzzer for &SimRobot {
    fn play_tone(&mut self, tone: Tone) {
        info!(
            frequency_hz = tone.frequency_hz,
            duration_ms = tone.duration_ms,
            "beep"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(robot: &SimRobot, left: i8, right: i8) {
        robot.set_speed(Side::Left, Speed::new(left).unwrap());
        robot.set_speed(Side::Right, Speed::new(right).unwrap());
    }

    #[test]
    fn drives_straight_into_the_wall() {
        let robot = SimRobot::new(Arena::default());
        robot.advance_to(0);
        drive(&robot, 100, 100);

        robot.advance_to(1000);
        assert!((robot.pose().x - 1.0).abs() < 1e-3);
        assert!(!robot.pressed(Side::Left) && !robot.pressed(Side::Right));

        robot.advance_to(5000);
        assert!(robot.pressed(Side::Left) && robot.pressed(Side::Right));
        assert_eq!(robot.bumps(Side::Left), 1);
        assert_eq!(robot.bumps(Side::Right), 1);
        assert!(robot.pose().x <= 1.5 - BUMPER_REACH_M);

        // staying against the wall is not a new bump
        robot.advance_to(6000);
        assert_eq!(robot.bumps(Side::Left), 1);

        drive(&robot, -100, -100);
        robot.advance_to(7000);
        assert!(!robot.pressed(Side::Left) && !robot.pressed(Side::Right));
        robot.reset_bumps(Side::Left);
        assert_eq!(robot.bumps(Side::Left), 0);
        assert_eq!(robot.bumps(Side::Right), 1);
    }

    #[test]
    fn angled_approach_presses_one_side() {
        let robot = SimRobot::with_pose(
            Arena::default(),
            Pose {
                x: 0.75,
                y: 0.75,
                heading: 0.3,
            },
        );
        robot.advance_to(0);
        drive(&robot, 100, 100);
        robot.advance_to(4000);
        // heading left of the wall normal, so the right corner touches first
        assert!(robot.pressed(Side::Right));
        assert!(!robot.pressed(Side::Left));
    }

    #[test]
    fn spins_in_place() {
        let robot = SimRobot::new(Arena::default());
        robot.advance_to(0);
        drive(&robot, -100, 100);
        robot.advance_to(100);
        let pose = robot.pose();
        assert!((pose.x - 0.75).abs() < 1e-4);
        assert!((pose.y - 0.75).abs() < 1e-4);
        assert!(pose.heading > 0.0);
    }
}
