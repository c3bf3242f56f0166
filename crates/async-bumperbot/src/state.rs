use core::sync::atomic::{AtomicBool, Ordering};

use crate::Intent;

/// Flags shared between the sensor, motion and behaviour tasks.
///
/// Every field has exactly one writer. The touch flags belong to the
/// [`TouchWriter`], the motion flags to the [`MotionWriter`]; both are handed
/// out once by [`SharedState::split`]. Anyone holding a `&SharedState` may read.
/// Readers can lag a writer by one polling period, which is fine for a robot
/// whose reactions take hundreds of milliseconds.
pub struct SharedState {
    reverse: AtomicBool,
    left_enabled: AtomicBool,
    right_enabled: AtomicBool,
    left_bumped: AtomicBool,
    right_bumped: AtomicBool,
    wandering: AtomicBool,
    split: AtomicBool,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct TouchFlags {
    pub left: bool,
    pub right: bool,
}

impl TouchFlags {
    pub fn both(&self) -> bool {
        self.left && self.right
    }
    pub fn any(&self) -> bool {
        self.left || self.right
    }
}

/// The three flags that pick a drive primitive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct DriveFlags {
    pub reverse: bool,
    pub left_enabled: bool,
    pub right_enabled: bool,
}

impl DriveFlags {
    pub const FORWARD: Self = Self::new(false, true, true);
    pub const REVERSE: Self = Self::new(true, true, true);
    pub const STOP: Self = Self::new(false, false, false);
    pub const SPIN: Self = Self::new(true, false, false);

    pub const fn new(reverse: bool, left_enabled: bool, right_enabled: bool) -> Self {
        Self {
            reverse,
            left_enabled,
            right_enabled,
        }
    }
}

impl From<Intent> for DriveFlags {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Forward => DriveFlags::FORWARD,
            Intent::TurnLeft => DriveFlags::new(false, false, true),
            Intent::TurnRight => DriveFlags::new(false, true, false),
            Intent::TurnAround => DriveFlags::SPIN,
        }
    }
}

/// Everything the motion translator looks at.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct MotionFlags {
    pub drive: DriveFlags,
    pub wandering: bool,
}

impl SharedState {
    /// At rest: no bumps, not wandering, all wheels disabled.
    pub const fn new() -> Self {
        Self {
            reverse: AtomicBool::new(false),
            left_enabled: AtomicBool::new(false),
            right_enabled: AtomicBool::new(false),
            left_bumped: AtomicBool::new(false),
            right_bumped: AtomicBool::new(false),
            wandering: AtomicBool::new(false),
            split: AtomicBool::new(false),
        }
    }

    /// Hands out the writer handles. Only the first call succeeds.
    pub fn split(&self) -> Option<(TouchWriter<'_>, MotionWriter<'_>)> {
        if self.split.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some((TouchWriter { state: self }, MotionWriter { state: self }))
        }
    }

    pub fn touch(&self) -> TouchFlags {
        TouchFlags {
            left: self.left_bumped.load(Ordering::Relaxed),
            right: self.right_bumped.load(Ordering::Relaxed),
        }
    }

    pub fn motion(&self) -> MotionFlags {
        MotionFlags {
            drive: DriveFlags {
                reverse: self.reverse.load(Ordering::Relaxed),
                left_enabled: self.left_enabled.load(Ordering::Relaxed),
                right_enabled: self.right_enabled.load(Ordering::Relaxed),
            },
            wandering: self.wandering.load(Ordering::Relaxed),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Sole writer of the touch flags, owned by the sensor sampler.
pub struct TouchWriter<'a> {
    state: &'a SharedState,
}

impl TouchWriter<'_> {
    pub fn publish(&mut self, touch: TouchFlags) {
        self.state.left_bumped.store(touch.left, Ordering::Relaxed);
        self.state.right_bumped.store(touch.right, Ordering::Relaxed);
    }
}

/// Sole writer of the motion flags, owned by the behaviour controller.
pub struct MotionWriter<'a> {
    state: &'a SharedState,
}

impl<'a> MotionWriter<'a> {
    pub fn state(&self) -> &'a SharedState {
        self.state
    }

    pub fn set_drive(&mut self, drive: DriveFlags) {
        self.state.reverse.store(drive.reverse, Ordering::Relaxed);
        self.set_wheels(drive.left_enabled, drive.right_enabled);
    }

    /// Changes the wheel enables and keeps the current direction sign.
    pub fn set_wheels(&mut self, left_enabled: bool, right_enabled: bool) {
        self.state
            .left_enabled
            .store(left_enabled, Ordering::Relaxed);
        self.state
            .right_enabled
            .store(right_enabled, Ordering::Relaxed);
    }

    pub fn set_wandering(&mut self, wandering: bool) {
        self.state.wandering.store(wandering, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_rest() {
        let state = SharedState::new();
        assert_eq!(state.touch(), TouchFlags::default());
        assert_eq!(state.motion().drive, DriveFlags::STOP);
        assert!(!state.motion().wandering);
    }

    #[test]
    fn split_only_once() {
        let state = SharedState::new();
        assert!(state.split().is_some());
        assert!(state.split().is_none());
    }

    #[test]
    fn writers_publish_to_readers() {
        let state = SharedState::new();
        let (mut touch, mut motion) = state.split().unwrap();

        touch.publish(TouchFlags {
            left: true,
            right: false,
        });
        assert!(state.touch().left);
        assert!(!state.touch().both());
        assert!(state.touch().any());

        motion.set_drive(DriveFlags::REVERSE);
        motion.set_wandering(true);
        assert_eq!(
            state.motion(),
            MotionFlags {
                drive: DriveFlags::REVERSE,
                wandering: true
            }
        );

        motion.set_wheels(false, true);
        assert_eq!(state.motion().drive, DriveFlags::new(true, false, true));
    }

    #[test]
    fn intents_map_to_drive_flags() {
        assert_eq!(
            DriveFlags::from(Intent::Forward),
            DriveFlags::new(false, true, true)
        );
        assert_eq!(
            DriveFlags::from(Intent::TurnLeft),
            DriveFlags::new(false, false, true)
        );
        assert_eq!(
            DriveFlags::from(Intent::TurnRight),
            DriveFlags::new(false, true, false)
        );
        assert_eq!(
            DriveFlags::from(Intent::TurnAround),
            DriveFlags::new(true, false, false)
        );
    }
}
