//! Parity runner
//!
//! Drives a fixed number of timed rounds against the subject and reference adapters, keeps
//! the last round's output of each, compares them, and aggregates the timings.
//!
//! Adapter calls never overlap: in every round the subject runs to completion, then the
//! reference does. Rounds are not retried; the first adapter error ends the run.

use crate::adapter::{SheetAdapter, SheetRender};
use crate::types::{DurationStatistics, RoundMeasurement, RunReport, Summary};
use crate::{Error, Result};
use sheet_parity::compare;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Statistical median; the mean of the two middle values for an even count
pub fn median(values: &[Duration]) -> Duration {
    if values.is_empty() {
        return Duration::ZERO;
    }

    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2
    }
}

/// Calculate statistics over a set of durations
pub fn calculate_statistics(values: &[Duration]) -> DurationStatistics {
    if values.is_empty() {
        return DurationStatistics {
            median: Duration::ZERO,
            mean: Duration::ZERO,
            min: Duration::ZERO,
            max: Duration::ZERO,
            sample_count: 0,
        };
    }

    let total: Duration = values.iter().sum();
    let count = values.len();

    DurationStatistics {
        median: median(values),
        mean: total / count as u32,
        min: values.iter().copied().min().unwrap_or_default(),
        max: values.iter().copied().max().unwrap_or_default(),
        sample_count: count,
    }
}

/// Lifecycle of a [`ParityRunner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running { round: usize, total: usize },
    Finalizing,
    Done,
}

/// Orchestrates a parity run between two adapters
pub struct ParityRunner {
    subject: Box<dyn SheetAdapter>,
    reference: Box<dyn SheetAdapter>,
    file: PathBuf,
    sheet_index: usize,
    rounds: usize,
    state: RunnerState,
    measurements: Vec<RoundMeasurement>,
    last_outputs: Option<(SheetRender, SheetRender)>,
}

impl ParityRunner {
    /// Create a new runner
    ///
    /// # Arguments
    /// * `subject` - Adapter under test; runs first in every round, left side of the comparison
    /// * `reference` - Baseline adapter; runs second, right side of the comparison
    pub fn new(
        subject: Box<dyn SheetAdapter>,
        reference: Box<dyn SheetAdapter>,
        file: impl Into<PathBuf>,
        sheet_index: usize,
        rounds: usize,
    ) -> Self {
        Self {
            subject,
            reference,
            file: file.into(),
            sheet_index,
            rounds,
            state: RunnerState::Idle,
            measurements: Vec::with_capacity(rounds),
            last_outputs: None,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn measurements(&self) -> &[RoundMeasurement] {
        &self.measurements
    }

    /// Outputs of the most recent round as `(subject, reference)`
    pub fn last_outputs(&self) -> Option<&(SheetRender, SheetRender)> {
        self.last_outputs.as_ref()
    }

    pub fn subject_name(&self) -> &str {
        self.subject.name()
    }

    pub fn reference_name(&self) -> &str {
        self.reference.name()
    }

    /// Run all rounds and build the report
    pub async fn run(&mut self) -> Result<RunReport> {
        self.run_with_progress(|_| {}).await
    }

    /// Run all rounds, calling `on_round` after each one completes
    ///
    /// # Errors
    ///
    /// Returns the first adapter error; no further rounds run after it.
    pub async fn run_with_progress<F>(&mut self, mut on_round: F) -> Result<RunReport>
    where
        F: FnMut(&RoundMeasurement),
    {
        if self.state != RunnerState::Idle {
            return Err(Error::Config("a runner can only be run once".to_string()));
        }
        if self.rounds == 0 {
            return Err(Error::Config("rounds must be > 0".to_string()));
        }

        self.subject.setup().await?;
        self.reference.setup().await?;

        let outcome = self.run_rounds(&mut on_round).await;
        if outcome.is_ok() {
            self.state = RunnerState::Finalizing;
        }

        // Adapters are torn down whether or not every round completed
        let teardown = self.teardown_adapters().await;
        outcome?;
        teardown?;

        let report = self.finalize()?;
        self.state = RunnerState::Done;
        Ok(report)
    }

    async fn run_rounds<F>(&mut self, on_round: &mut F) -> Result<()>
    where
        F: FnMut(&RoundMeasurement),
    {
        for round in 1..=self.rounds {
            self.state = RunnerState::Running {
                round,
                total: self.rounds,
            };

            let (subject_out, subject_duration) =
                timed(self.subject.as_ref(), &self.file, self.sheet_index).await?;
            let (reference_out, reference_duration) =
                timed(self.reference.as_ref(), &self.file, self.sheet_index).await?;

            let measurement = RoundMeasurement {
                round,
                subject_duration,
                reference_duration,
                row_count: reference_out.row_count.or(subject_out.row_count),
                subject_timing: subject_out.diagnostics.clone(),
            };

            tracing::info!(
                round,
                total = self.rounds,
                subject_ms = subject_duration.as_secs_f64() * 1000.0,
                reference_ms = reference_duration.as_secs_f64() * 1000.0,
                "Round complete"
            );

            on_round(&measurement);
            self.measurements.push(measurement);
            self.last_outputs = Some((subject_out, reference_out));
        }

        Ok(())
    }

    /// Tear down both adapters, returning the first failure
    async fn teardown_adapters(&self) -> Result<()> {
        let subject = self.subject.teardown().await;
        let reference = self.reference.teardown().await;

        for (name, result) in [(self.subject.name(), &subject), (self.reference.name(), &reference)] {
            if let Err(e) = result {
                tracing::warn!(adapter = name, error = %e, "Teardown failed");
            }
        }

        subject.and(reference)
    }

    fn finalize(&self) -> Result<RunReport> {
        let (subject_out, reference_out) = self
            .last_outputs
            .as_ref()
            .ok_or_else(|| Error::Config("no completed rounds to compare".to_string()))?;

        let parity = compare(&subject_out.text, &reference_out.text);
        if !parity.matches {
            tracing::warn!(
                subject = self.subject.name(),
                reference = self.reference.name(),
                line = parity.divergence.as_ref().map(|d| d.line_number),
                "Outputs differ"
            );
        }

        let subject_durations: Vec<Duration> = self.measurements.iter().map(|m| m.subject_duration).collect();
        let reference_durations: Vec<Duration> = self.measurements.iter().map(|m| m.reference_duration).collect();

        Ok(RunReport {
            subject_name: self.subject.name().to_string(),
            reference_name: self.reference.name().to_string(),
            file: self.file.clone(),
            sheet_index: self.sheet_index,
            rounds: self.measurements.clone(),
            parity,
            summary: Summary {
                subject: calculate_statistics(&subject_durations),
                reference: calculate_statistics(&reference_durations),
            },
        })
    }
}

/// Call `adapter` once and measure its wall time on the monotonic clock
async fn timed(adapter: &dyn SheetAdapter, file: &Path, sheet_index: usize) -> Result<(SheetRender, Duration)> {
    tracing::debug!(adapter = adapter.name(), "Rendering sheet");
    let start = Instant::now();
    let render = adapter.render(file, sheet_index).await?;
    Ok((render, start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;

    /// Adapter that replays canned outputs and records the global call order
    struct ScriptedAdapter {
        name: &'static str,
        outputs: Mutex<Vec<String>>,
        calls: Arc<Mutex<Vec<String>>>,
        fail_on_call: Option<usize>,
        row_count: Option<usize>,
        teardowns: Arc<Mutex<usize>>,
    }

    impl ScriptedAdapter {
        fn new(name: &'static str, outputs: &[&str], calls: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                outputs: Mutex::new(outputs.iter().rev().map(|s| s.to_string()).collect()),
                calls,
                fail_on_call: None,
                row_count: None,
                teardowns: Arc::new(Mutex::new(0)),
            }
        }
    }

    #[async_trait]
    impl SheetAdapter for ScriptedAdapter {
        fn name(&self) -> &str {
            self.name
        }

        async fn render(&self, _file_path: &Path, sheet_index: usize) -> Result<SheetRender> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(format!("{}:{}", self.name, sheet_index));
                calls.iter().filter(|c| c.starts_with(self.name)).count()
            };
            if self.fail_on_call == Some(call) {
                return Err(Error::Subprocess(format!("{} failed", self.name)));
            }
            let text = self.outputs.lock().unwrap().pop().unwrap_or_default();
            Ok(SheetRender {
                text,
                row_count: self.row_count,
                diagnostics: Some(format!("turboxl_timing_ms call={}", call)),
            })
        }

        async fn teardown(&self) -> Result<()> {
            *self.teardowns.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn runner(subject: ScriptedAdapter, reference: ScriptedAdapter, rounds: usize) -> ParityRunner {
        ParityRunner::new(Box::new(subject), Box::new(reference), "book.xlsx", 1, rounds)
    }

    #[test]
    fn test_median_odd_and_even() {
        let ms = Duration::from_millis;
        assert_eq!(median(&[ms(30), ms(10), ms(20)]), ms(20));
        assert_eq!(median(&[ms(40), ms(10), ms(20), ms(30)]), ms(25));
        assert_eq!(median(&[ms(7)]), ms(7));
        assert_eq!(median(&[]), Duration::ZERO);
    }

    #[test]
    fn test_calculate_statistics() {
        let ms = Duration::from_millis;
        let stats = calculate_statistics(&[ms(30), ms(10), ms(20)]);
        assert_eq!(stats.median, ms(20));
        assert_eq!(stats.mean, ms(20));
        assert_eq!(stats.min, ms(10));
        assert_eq!(stats.max, ms(30));
        assert_eq!(stats.sample_count, 3);
    }

    #[tokio::test]
    async fn test_three_rounds_keep_last_outputs() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let subject = ScriptedAdapter::new("turboxl", &["s1\n", "s2\n", "s3\n"], calls.clone());
        let mut reference = ScriptedAdapter::new("calamine", &["r1\n", "r2\n", "s3\n"], calls.clone());
        reference.row_count = Some(1);

        let mut runner = runner(subject, reference, 3);
        assert_eq!(runner.state(), RunnerState::Idle);

        let mut seen = Vec::new();
        let report = runner.run_with_progress(|m| seen.push(m.round)).await.unwrap();

        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(runner.state(), RunnerState::Done);
        assert_eq!(report.rounds.len(), 3);
        assert_eq!(runner.measurements().len(), 3);

        let (subject_out, reference_out) = runner.last_outputs().unwrap();
        assert_eq!(subject_out.text, "s3\n");
        assert_eq!(reference_out.text, "s3\n");
        assert!(report.parity.matches);

        assert_eq!(report.rounds[2].row_count, Some(1));
        assert_eq!(report.rounds[2].subject_timing.as_deref(), Some("turboxl_timing_ms call=3"));
    }

    #[tokio::test]
    async fn test_summary_medians_match_rounds() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let subject = ScriptedAdapter::new("turboxl", &["a", "a", "a"], calls.clone());
        let reference = ScriptedAdapter::new("calamine", &["a", "a", "a"], calls.clone());

        let report = runner(subject, reference, 3).run().await.unwrap();

        let subject: Vec<Duration> = report.rounds.iter().map(|m| m.subject_duration).collect();
        let reference: Vec<Duration> = report.rounds.iter().map(|m| m.reference_duration).collect();
        assert_eq!(report.summary.subject.median, median(&subject));
        assert_eq!(report.summary.reference.median, median(&reference));
        assert_eq!(report.summary.subject.sample_count, 3);
    }

    #[tokio::test]
    async fn test_subject_runs_before_reference_each_round() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let subject = ScriptedAdapter::new("turboxl", &["x", "x"], calls.clone());
        let reference = ScriptedAdapter::new("calamine", &["x", "x"], calls.clone());

        runner(subject, reference, 2).run().await.unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["turboxl:1", "calamine:1", "turboxl:1", "calamine:1"]
        );
    }

    #[tokio::test]
    async fn test_only_final_round_is_compared() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let subject = ScriptedAdapter::new("turboxl", &["same\n", "a\nb\n"], calls.clone());
        let reference = ScriptedAdapter::new("calamine", &["same\n", "a\nc\n"], calls.clone());

        let report = runner(subject, reference, 2).run().await.unwrap();

        assert!(!report.parity.matches);
        let divergence = report.parity.divergence.unwrap();
        assert_eq!(divergence.line_number, 2);
    }

    #[tokio::test]
    async fn test_adapter_failure_aborts_run() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut subject = ScriptedAdapter::new("turboxl", &["a", "a", "a"], calls.clone());
        subject.fail_on_call = Some(2);
        let reference = ScriptedAdapter::new("calamine", &["a", "a", "a"], calls.clone());

        let subject_teardowns = subject.teardowns.clone();
        let reference_teardowns = reference.teardowns.clone();

        let mut runner = runner(subject, reference, 3);
        let err = runner.run().await.unwrap_err();

        assert!(matches!(err, Error::Subprocess(_)));
        assert_eq!(runner.measurements().len(), 1);
        assert_eq!(calls.lock().unwrap().len(), 3);
        assert_eq!(runner.state(), RunnerState::Running { round: 2, total: 3 });
        assert_eq!(*subject_teardowns.lock().unwrap(), 1);
        assert_eq!(*reference_teardowns.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_teardown_runs_once_after_success() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let subject = ScriptedAdapter::new("turboxl", &["a", "a"], calls.clone());
        let reference = ScriptedAdapter::new("calamine", &["a", "a"], calls.clone());
        let subject_teardowns = subject.teardowns.clone();
        let reference_teardowns = reference.teardowns.clone();

        runner(subject, reference, 2).run().await.unwrap();

        assert_eq!(*subject_teardowns.lock().unwrap(), 1);
        assert_eq!(*reference_teardowns.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_rounds_rejected() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let subject = ScriptedAdapter::new("turboxl", &[], calls.clone());
        let reference = ScriptedAdapter::new("calamine", &[], calls.clone());

        let err = runner(subject, reference, 0).run().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
