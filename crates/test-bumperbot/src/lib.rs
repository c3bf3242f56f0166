//! Deterministic fakes of the platform traits.
//!
//! Every fake shares one [`Timeline`], so a test can replay in order which
//! tones were played, which counters were cleared and what the motion flags
//! looked like during each wait.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_bumperbot::hal::{BumpCounter, Buzzer, Delay, Drive, RandomSource, Tone, TouchSensor};
use async_bumperbot::{MotionFlags, SharedState, Side, Speed, WheelCommand};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Tone(Tone),
    BumpReset(Side),
    /// a timed wait together with the motion flags published during it
    Wait { ms: u32, motion: MotionFlags },
}

#[derive(Clone, Default)]
pub struct Timeline(Rc<RefCell<Vec<Event>>>);

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn waits(&self) -> Vec<(u32, MotionFlags)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Wait { ms, motion } => Some((*ms, *motion)),
                _ => None,
            })
            .collect()
    }

    pub fn total_ms(&self) -> u32 {
        self.waits().iter().map(|(ms, _)| ms).sum()
    }

    pub fn tones(&self) -> Vec<Tone> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Tone(tone) => Some(*tone),
                _ => None,
            })
            .collect()
    }
}

/// Returns immediately and records the wait with the current motion flags.
pub struct RecordingDelay<'a> {
    state: &'a SharedState,
    timeline: Timeline,
}

impl<'a> RecordingDelay<'a> {
    pub fn new(state: &'a SharedState, timeline: Timeline) -> Self {
        Self { state, timeline }
    }
}

impl Delay for RecordingDelay<'_> {
    async fn delay_ms(&mut self, ms: u32) {
        self.timeline.push(Event::Wait {
            ms,
            motion: self.state.motion(),
        });
    }
}

/// Records waits without a state to snapshot.
#[derive(Clone, Default)]
pub struct CountingDelay(Rc<Cell<u32>>);

impl CountingDelay {
    pub fn total_ms(&self) -> u32 {
        self.0.get()
    }
}

impl Delay for CountingDelay {
    async fn delay_ms(&mut self, ms: u32) {
        self.0.set(self.0.get() + ms);
    }
}

/// Hands each wait to `on_wait` together with its index, and never returns
/// from the wait after the first `limit`.
///
/// Lets a test poll an endless task loop once and inspect a fixed number of
/// its iterations.
pub struct PacedDelay<F: FnMut(usize, u32)> {
    limit: usize,
    waits: usize,
    on_wait: F,
}

impl<F: FnMut(usize, u32)> PacedDelay<F> {
    pub fn new(limit: usize, on_wait: F) -> Self {
        Self {
            limit,
            waits: 0,
            on_wait,
        }
    }
}

impl<F: FnMut(usize, u32)> Delay for PacedDelay<F> {
    async fn delay_ms(&mut self, ms: u32) {
        if self.waits >= self.limit {
            core::future::pending::<()>().await;
        }
        (self.on_wait)(self.waits, ms);
        self.waits += 1;
    }
}

#[derive(Clone)]
pub struct RecordingBuzzer(pub Timeline);

impl Buzzer for RecordingBuzzer {
    fn play_tone(&mut self, tone: Tone) {
        self.0.push(Event::Tone(tone));
    }
}

/// Bump counters a test can preset; clones share the counts.
#[derive(Clone)]
pub struct FakeBumps {
    counts: Rc<Cell<[u32; 2]>>,
    timeline: Timeline,
}

impl FakeBumps {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            counts: Default::default(),
            timeline,
        }
    }

    pub fn set(&self, left: u32, right: u32) {
        self.counts.set([left, right]);
    }

    pub fn counts(&self) -> [u32; 2] {
        self.counts.get()
    }

    pub fn bump(&self, side: Side) {
        let mut counts = self.counts.get();
        counts[side as usize] += 1;
        self.counts.set(counts);
    }
}

impl BumpCounter for FakeBumps {
    fn bump_count(&mut self, side: Side) -> u32 {
        self.counts.get()[side as usize]
    }

    fn reset_bump_count(&mut self, side: Side) {
        let mut counts = self.counts.get();
        counts[side as usize] = 0;
        self.counts.set(counts);
        self.timeline.push(Event::BumpReset(side));
    }
}

/// Touch sensors a test can press and release.
#[derive(Clone, Default)]
pub struct FakeTouch(Rc<Cell<[bool; 2]>>);

impl FakeTouch {
    pub fn press(&self, left: bool, right: bool) {
        self.0.set([left, right]);
    }
}

impl TouchSensor for FakeTouch {
    fn is_pressed(&mut self, side: Side) -> bool {
        self.0.get()[side as usize]
    }
}

/// Remembers the last speed sent to each wheel.
#[derive(Clone, Default)]
pub struct FakeDrive(Rc<Cell<[Speed; 2]>>);

impl FakeDrive {
    pub fn command(&self) -> WheelCommand {
        let [left, right] = self.0.get();
        WheelCommand::new(left, right)
    }
}

impl Drive for FakeDrive {
    fn set_wheel_speed(&mut self, side: Side, speed: Speed) {
        let mut speeds = self.0.get();
        speeds[side as usize] = speed;
        self.0.set(speeds);
    }
}

/// Replays a fixed sequence of samples, then repeats `fallback`.
pub struct Scripted {
    samples: VecDeque<f32>,
    fallback: f32,
}

impl Scripted {
    pub fn new(samples: &[f32]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            fallback: 0.0,
        }
    }

    pub fn with_fallback(mut self, fallback: f32) -> Self {
        self.fallback = fallback;
        self
    }
}

impl RandomSource for Scripted {
    fn uniform(&mut self) -> f32 {
        self.samples.pop_front().unwrap_or(self.fallback)
    }
}
