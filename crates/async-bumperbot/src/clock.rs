use core::future::Future;
use core::marker::PhantomData;
use core::ops::Add;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::hal::Delay;

/// Source of a monotonic tick counter.
pub trait ClockBackend {
    fn now() -> u32;
    fn ticks_per_milli() -> u32;
}

pub struct Instant<C: ClockBackend> {
    ticks: u32,
    _phantom: PhantomData<C>,
}

impl<C: ClockBackend> Instant<C> {
    pub fn now() -> Self {
        Self {
            ticks: C::now(),
            _phantom: PhantomData,
        }
    }
}

impl<C: ClockBackend> Copy for Instant<C> {}

impl<C: ClockBackend> Clone for Instant<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ClockBackend> PartialEq for Instant<C> {
    fn eq(&self, other: &Self) -> bool {
        self.ticks == other.ticks
    }
}

impl<C: ClockBackend> Eq for Instant<C> {}

impl<C: ClockBackend> PartialOrd for Instant<C> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: ClockBackend> Ord for Instant<C> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.ticks.cmp(&other.ticks)
    }
}

pub struct Duration<C: ClockBackend> {
    ticks: u32,
    _phantom: PhantomData<C>,
}

impl<C: ClockBackend> Duration<C> {
    pub fn from_millis(millis: u32) -> Self {
        Self {
            ticks: millis.saturating_mul(C::ticks_per_milli()),
            _phantom: PhantomData,
        }
    }
}

impl<C: ClockBackend> Copy for Duration<C> {}

impl<C: ClockBackend> Clone for Duration<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ClockBackend> Add<Duration<C>> for Instant<C> {
    type Output = Instant<C>;

    fn add(self, rhs: Duration<C>) -> Self::Output {
        Instant {
            ticks: self.ticks.saturating_add(rhs.ticks),
            _phantom: PhantomData,
        }
    }
}

/// Future that completes once the clock has passed its deadline.
///
/// It always yields at least once, so awaiting a zero-length timer still lets
/// the other tasks run.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Timer<C: ClockBackend> {
    expires_at: Instant<C>,
    yielded_once: bool,
}

impl<C: ClockBackend> Timer<C> {
    pub fn after(duration: Duration<C>) -> Self {
        Self {
            expires_at: Instant::now() + duration,
            yielded_once: false,
        }
    }

    #[inline]
    pub fn after_millis(millis: u32) -> Self {
        Self::after(Duration::from_millis(millis))
    }
}

impl<C: ClockBackend> Unpin for Timer<C> {}

impl<C: ClockBackend> Future for Timer<C> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.yielded_once && self.expires_at <= Instant::now() {
            Poll::Ready(())
        } else {
            // no alarm queue, the executor spins until the deadline passes
            cx.waker().wake_by_ref();
            self.yielded_once = true;
            Poll::Pending
        }
    }
}

/// [`Delay`] backed by [`Timer`] for any clock backend.
pub struct TimerDelay<C: ClockBackend> {
    _phantom: PhantomData<C>,
}

impl<C: ClockBackend> TimerDelay<C> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<C: ClockBackend> Default for TimerDelay<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClockBackend> Delay for TimerDelay<C> {
    async fn delay_ms(&mut self, ms: u32) {
        Timer::<C>::after_millis(ms).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    static TICKS: AtomicU32 = AtomicU32::new(0);

    struct TestClock;

    impl ClockBackend for TestClock {
        fn now() -> u32 {
            // every read advances time by one millisecond
            TICKS.fetch_add(4, Ordering::Relaxed)
        }
        fn ticks_per_milli() -> u32 {
            4
        }
    }

    #[test]
    fn deadline_is_scaled_to_ticks() {
        let start = Instant::<TestClock>::now();
        let deadline = start + Duration::from_millis(50);
        assert_eq!(deadline.ticks - start.ticks, 200);
        assert!(start < deadline);
    }

    #[test]
    fn timer_yields_before_completing() {
        let mut timer = Timer::<TestClock>::after_millis(0);
        assert!(embassy_futures::poll_once(&mut timer).is_pending());
        assert!(embassy_futures::poll_once(&mut timer).is_ready());
    }

    #[test]
    fn delay_waits_until_deadline() {
        let start = TICKS.load(Ordering::Relaxed);
        embassy_futures::block_on(TimerDelay::<TestClock>::new().delay_ms(5));
        assert!(TICKS.load(Ordering::Relaxed) - start >= 5 * 4);
    }
}
