//! Pacer and reporter triggers.
//!
//! The publish loop waits on a [`TriggerSource`] and reacts to whichever of
//! the two periodic triggers fires next. [`IntervalTriggers`] drives the loop
//! from the tokio clock; [`ScriptedTriggers`] replays a fixed sequence so the
//! loop can be exercised deterministically.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Period of the reporter trigger.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Which trigger fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tick {
    /// Produce and dispatch one record.
    Pace,
    /// Report and reset the throughput counter, then flush the sink.
    Report,
}

#[async_trait]
pub trait TriggerSource: Send {
    /// Wait for the next trigger. `None` means the source is exhausted.
    async fn next(&mut self) -> Option<Tick>;
}

/// Two independent tokio intervals.
///
/// Both first fire one period after construction. A tick that is handled late
/// pushes the following ticks back instead of firing a catch-up burst.
#[derive(Debug)]
pub struct IntervalTriggers {
    pace: Interval,
    report: Interval,
}

impl IntervalTriggers {
    /// Must be called from within a tokio runtime.
    pub fn new(pace_period: Duration, report_period: Duration) -> Self {
        let start = Instant::now();
        Self {
            pace: periodic(start, pace_period),
            report: periodic(start, report_period),
        }
    }

    /// Pacer at `rate` ticks per second, reporter once per second.
    pub fn for_rate(rate: u32) -> Self {
        Self::new(Duration::from_secs(1) / rate.max(1), REPORT_INTERVAL)
    }
}

fn periodic(start: Instant, period: Duration) -> Interval {
    let mut interval = interval_at(start + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[async_trait]
impl TriggerSource for IntervalTriggers {
    async fn next(&mut self) -> Option<Tick> {
        tokio::select! {
            _ = self.pace.tick() => Some(Tick::Pace),
            _ = self.report.tick() => Some(Tick::Report),
        }
    }
}

/// A finite, pre-computed sequence of ticks.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTriggers {
    ticks: VecDeque<Tick>,
}

impl ScriptedTriggers {
    pub fn new(ticks: impl IntoIterator<Item = Tick>) -> Self {
        Self {
            ticks: ticks.into_iter().collect(),
        }
    }

    /// Merge two sets of firing instants (offsets from start) into one
    /// sequence. When both fire at the same instant the pacer goes first.
    pub fn from_instants(
        pace: impl IntoIterator<Item = Duration>,
        report: impl IntoIterator<Item = Duration>,
    ) -> Self {
        let mut events: Vec<(Duration, Tick)> = pace
            .into_iter()
            .map(|at| (at, Tick::Pace))
            .chain(report.into_iter().map(|at| (at, Tick::Report)))
            .collect();
        // Stable sort keeps input order within a kind; Pace sorts before Report.
        events.sort_by_key(|&(at, tick)| (at, tick == Tick::Report));

        Self::new(events.into_iter().map(|(_, tick)| tick))
    }

    /// The ticks two ideal periodic timers would produce up to and including
    /// `horizon`, each first firing one period after start.
    pub fn periodic(pace_period: Duration, report_period: Duration, horizon: Duration) -> Self {
        Self::from_instants(
            instants(pace_period, horizon),
            instants(report_period, horizon),
        )
    }

    pub fn remaining(&self) -> usize {
        self.ticks.len()
    }
}

fn instants(period: Duration, horizon: Duration) -> Vec<Duration> {
    if period.is_zero() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut at = period;
    while at <= horizon {
        out.push(at);
        at += period;
    }
    out
}

#[async_trait]
impl TriggerSource for ScriptedTriggers {
    async fn next(&mut self) -> Option<Tick> {
        let tick = self.ticks.pop_front()?;
        // Let other tasks (e.g. the delivery drain) run between ticks.
        tokio::task::yield_now().await;
        Some(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Tick::{Pace, Report};

    async fn drain(source: &mut impl TriggerSource) -> Vec<Tick> {
        let mut out = Vec::new();
        while let Some(tick) = source.next().await {
            out.push(tick);
        }
        out
    }

    #[test]
    fn test_scripted_replays_in_order() {
        let mut source = ScriptedTriggers::new([Pace, Report, Pace]);
        assert_eq!(source.remaining(), 3);
        assert_eq!(
            tokio_test::block_on(drain(&mut source)),
            vec![Pace, Report, Pace]
        );
        assert_eq!(tokio_test::block_on(source.next()), None);
    }

    #[tokio::test]
    async fn test_ties_fire_pacer_first() {
        let ms = Duration::from_millis;
        let mut source = ScriptedTriggers::from_instants([ms(500), ms(1000)], [ms(1000)]);
        assert_eq!(drain(&mut source).await, vec![Pace, Pace, Report]);
    }

    #[tokio::test]
    async fn test_periodic_counts() {
        let mut source = ScriptedTriggers::periodic(
            Duration::from_millis(250),
            Duration::from_secs(1),
            Duration::from_secs(2),
        );
        let ticks = drain(&mut source).await;
        assert_eq!(
            ticks,
            vec![Pace, Pace, Pace, Pace, Report, Pace, Pace, Pace, Pace, Report]
        );
    }

    #[test]
    fn test_zero_period_yields_nothing() {
        let source =
            ScriptedTriggers::periodic(Duration::ZERO, Duration::ZERO, Duration::from_secs(1));
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intervals_first_fire_after_one_period() {
        let start = Instant::now();
        let mut source =
            IntervalTriggers::new(Duration::from_millis(300), Duration::from_secs(1));

        assert_eq!(source.next().await, Some(Pace));
        assert_near(start.elapsed(), Duration::from_millis(300));
        assert_eq!(source.next().await, Some(Pace));
        assert_eq!(source.next().await, Some(Pace));
        assert_near(start.elapsed(), Duration::from_millis(900));
        assert_eq!(source.next().await, Some(Report));
        assert_near(start.elapsed(), Duration::from_secs(1));
    }

    // The timer wheel works at millisecond granularity.
    fn assert_near(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_handling_does_not_burst() {
        let mut source =
            IntervalTriggers::new(Duration::from_millis(100), Duration::from_secs(60));
        assert_eq!(source.next().await, Some(Pace));

        // Stall for several periods before asking again.
        tokio::time::sleep(Duration::from_millis(450)).await;
        let stalled_at = Instant::now();
        assert_eq!(source.next().await, Some(Pace));
        assert_eq!(source.next().await, Some(Pace));
        assert!(stalled_at.elapsed() >= Duration::from_millis(100));
    }
}
