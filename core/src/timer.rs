use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::Cell;
use core::time::Duration;
use web_time::Instant;

/// Source of monotonic time for [`InteractionTimer`].
pub trait Clock {
    /// Time elapsed since a fixed, arbitrary origin.
    fn now(&self) -> Duration;
}

/// Wall clock, `web_time` keeps this working on wasm targets.
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Ended,
}

/// Measures how long an interaction lasted and classifies it against a threshold.
///
/// The same timer doubles as the session clock, where only [`duration`](Self::duration) is read and `end` is
/// called on every frame to refresh it.
///
/// Resuming a paused timer starts a new window: the time measured before the pause is replaced, not
/// accumulated, by the next `end`.
#[derive(Clone, Debug)]
pub struct InteractionTimer<K: Clock = SystemClock> {
    clock: K,
    threshold: Duration,
    start: Option<Duration>,
    duration: Duration,
    state: TimerState,
}

impl<K: Clock> InteractionTimer<K> {
    pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(250);

    pub fn new(clock: K, threshold: Duration) -> Self {
        Self {
            clock,
            threshold,
            start: None,
            duration: Duration::ZERO,
            state: TimerState::Idle,
        }
    }

    pub fn with_clock(clock: K) -> Self {
        Self::new(clock, Self::DEFAULT_THRESHOLD)
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Starts a fresh measurement, or resumes when paused.
    pub fn start(&mut self) {
        self.start = Some(self.clock.now());
        if self.state != TimerState::Paused {
            self.duration = Duration::ZERO;
        }
        self.state = TimerState::Running;
    }

    /// Records the time since the last start. No-op while paused or before any start.
    pub fn end(&mut self) {
        if self.state == TimerState::Paused {
            return;
        }
        let Some(start) = self.start else {
            return;
        };
        self.duration = self.clock.now().saturating_sub(start);
        self.state = TimerState::Ended;
    }

    /// Freezes the current duration. No-op when already paused or never started.
    pub fn pause(&mut self) {
        if matches!(self.state, TimerState::Idle | TimerState::Paused) {
            return;
        }
        if let Some(start) = self.start {
            self.duration = self.clock.now().saturating_sub(start);
            self.state = TimerState::Paused;
        }
    }

    pub fn is_hold(&self) -> bool {
        self.duration >= self.threshold
    }

    pub fn is_click(&self) -> bool {
        !self.is_hold()
    }

    /// `MM:SS`, seconds truncated, minutes never wrap into hours.
    pub fn format(duration: Duration) -> String {
        let total_secs = duration.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for InteractionTimer<SystemClock> {
    fn default() -> Self {
        Self::with_clock(SystemClock::new())
    }
}
