//! Behaviour core of a two-bumper, two-wheel wandering robot.
//!
//! Three tasks share one [`SharedState`]: the [`SensorSampler`] publishes the
//! bumper flags, the [`BehaviorController`] decides what the wheels should do
//! and the [`MotionTranslator`] turns those flags into wheel speeds. All
//! hardware access goes through the traits in [`hal`].
#![no_std]

mod clock;
mod config;
mod controller;
pub mod error;
pub mod hal;
mod sampler;
mod selector;
mod side;
mod state;
mod translator;

pub use clock::{ClockBackend, Duration, Instant, Timer, TimerDelay};
pub use config::Config;
pub use controller::{BehaviorController, Branch};
pub use sampler::SensorSampler;
pub use selector::{Band, Intent, Policy, MAX_BANDS};
pub use side::Side;
pub use state::{DriveFlags, MotionFlags, MotionWriter, SharedState, TouchFlags, TouchWriter};
pub use translator::{translate, MotionTranslator, Speed, WheelCommand};
