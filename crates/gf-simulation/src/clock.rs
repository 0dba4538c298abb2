use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Where input timestamps come from.
///
/// Jump-buffer and coyote windows compare these timestamps, so tests swap in
/// a deterministic source instead of real time.
pub trait TimeSource: fmt::Debug {
    /// Time elapsed since the source started.
    fn now(&self) -> Duration;

    /// Called once per tick with the nominal frame length.
    fn advance(&mut self, frame: Duration);
}

/// Deterministic time: exactly one frame per tick. The default.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    elapsed: Duration,
}

impl TimeSource for FrameClock {
    fn now(&self) -> Duration {
        self.elapsed
    }

    fn advance(&mut self, frame: Duration) {
        self.elapsed += frame;
    }
}

/// Real monotonic time. Ignores the nominal frame length.
#[derive(Debug, Clone)]
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    /// Start measuring from now.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn advance(&mut self, _frame: Duration) {}
}

/// Time that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle while the
/// simulation owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// A clock stopped at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `now`.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    /// Move forward by `delta`.
    pub fn advance_by(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn advance(&mut self, _frame: Duration) {}
}

/// Tick counter plus the time source used for input timestamps.
pub struct SimClock {
    tick: u64,
    frame: Duration,
    source: Box<dyn TimeSource>,
}

impl fmt::Debug for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimClock")
            .field("tick", &self.tick)
            .field("frame", &self.frame)
            .field("now", &self.now())
            .finish()
    }
}

impl SimClock {
    /// A frame-counting clock running at `frame_rate` ticks per second.
    pub fn new(frame_rate: u32) -> Self {
        Self::with_source(frame_rate, Box::new(FrameClock::default()))
    }

    /// A clock that reads time from `source`.
    pub fn with_source(frame_rate: u32, source: Box<dyn TimeSource>) -> Self {
        Self {
            tick: 0,
            frame: Duration::from_secs(1) / frame_rate.max(1),
            source,
        }
    }

    /// Advance by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.source.advance(self.frame);
        self.tick
    }

    /// Ticks advanced so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current time from the source.
    pub fn now(&self) -> Duration {
        self.source.now()
    }

    /// Nominal frame length.
    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Fixed integration step in seconds.
    pub fn dt(&self) -> f32 {
        self.frame.as_secs_f32()
    }
}
