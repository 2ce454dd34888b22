use playfield_common::StepMode;
use std::time::Duration;

/// How elapsed time is converted into steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// One step when at least one interval has passed since the last step,
    /// however many intervals that was. Falls behind wall-clock time under load.
    Gated,
    /// Accumulate elapsed time and run one step per owed interval, at most
    /// `max_steps` per frame. Owed time beyond the cap is dropped.
    Accumulate { max_steps: u32 },
}

impl StepPolicy {
    pub fn from_mode(mode: StepMode, max_steps: u32) -> Self {
        match mode {
            StepMode::Gated => Self::Gated,
            StepMode::Accumulate => Self::Accumulate {
                max_steps: max_steps.max(1),
            },
        }
    }
}

/// What the caller should do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramePlan {
    /// Number of fixed simulation steps to run before drawing.
    pub steps: u32,
    /// Owed time discarded because it exceeded the catch-up cap.
    pub dropped: Duration,
}

impl FramePlan {
    pub const IDLE: FramePlan = FramePlan {
        steps: 0,
        dropped: Duration::ZERO,
    };

    fn single() -> Self {
        Self {
            steps: 1,
            dropped: Duration::ZERO,
        }
    }
}

/// Fixed-timestep gate, called once per display frame.
#[derive(Debug, Clone)]
pub struct FrameDriver {
    interval: Duration,
    policy: StepPolicy,
    last_update: Option<Duration>,
    accumulator: Duration,
    total_steps: u64,
}

impl FrameDriver {
    /// A zero interval is raised to one nanosecond.
    pub fn new(interval: Duration, policy: StepPolicy) -> Self {
        Self {
            interval: interval.max(Duration::from_nanos(1)),
            policy,
            last_update: None,
            accumulator: Duration::ZERO,
            total_steps: 0,
        }
    }

    /// Build a driver stepping `updates_per_second` times per second.
    pub fn from_rate(updates_per_second: u32, policy: StepPolicy) -> Self {
        let interval = Duration::from_secs(1) / updates_per_second.max(1);
        Self::new(interval, policy)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn policy(&self) -> StepPolicy {
        self.policy
    }

    /// Steps planned since construction.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn last_update(&self) -> Option<Duration> {
        self.last_update
    }

    /// Forget the previous timestamp so the next frame starts fresh.
    pub fn reset(&mut self) {
        self.last_update = None;
        self.accumulator = Duration::ZERO;
    }

    /// Fraction of an interval currently owed but not yet stepped.
    ///
    /// Always 0 under [`StepPolicy::Gated`], which keeps no accumulator.
    pub fn interpolation_alpha(&self) -> f32 {
        (self.accumulator.as_secs_f64() / self.interval.as_secs_f64()) as f32
    }

    /// Decide how many steps run for a frame observed at `now`.
    ///
    /// The first frame after construction or [`reset`](Self::reset) always
    /// steps once. A clock that moved backwards counts as no elapsed time.
    pub fn advance(&mut self, now: Duration) -> FramePlan {
        let Some(last) = self.last_update else {
            self.last_update = Some(now);
            self.accumulator = Duration::ZERO;
            self.total_steps += 1;
            return FramePlan::single();
        };
        let elapsed = now.saturating_sub(last);

        let plan = match self.policy {
            StepPolicy::Gated => {
                if elapsed >= self.interval {
                    self.last_update = Some(now);
                    FramePlan::single()
                } else {
                    FramePlan::IDLE
                }
            }
            StepPolicy::Accumulate { max_steps } => {
                self.last_update = Some(now);
                self.accumulator += elapsed;
                self.drain_accumulator(max_steps)
            }
        };

        self.total_steps += u64::from(plan.steps);
        plan
    }

    fn drain_accumulator(&mut self, max_steps: u32) -> FramePlan {
        let interval_nanos = self.interval.as_nanos();
        let owed = self.accumulator.as_nanos() / interval_nanos;
        let steps = owed.min(u128::from(max_steps)) as u32;
        self.accumulator -= self.interval * steps;

        let mut dropped = Duration::ZERO;
        if owed > u128::from(steps) {
            let remainder = self.accumulator.as_nanos() % interval_nanos;
            let remainder = Duration::from_nanos(remainder as u64);
            dropped = self.accumulator - remainder;
            self.accumulator = remainder;
            tracing::warn!(
                owed = owed as u64,
                ran = steps,
                dropped_ms = dropped.as_secs_f64() * 1000.0,
                "simulation fell behind, dropping owed steps"
            );
        }

        FramePlan { steps, dropped }
    }
}
