//! Replicate runs for mean and variance curves.
//!
//! [`run_batch`] runs several independent simulations of the same parameters, each with its own
//! population, generators and seed, and summarizes the compartment counts across runs day by
//! day. Runs share no mutable state, so they are executed on separate threads, at most one per
//! available core at a time.

use std::num::NonZeroUsize;
use std::thread;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::agent::HealthStatus;
use crate::data_collector::DailyRecord;
use crate::define_report;
use crate::error::SeirvError;
use crate::parameters::Parameters;
use crate::report::ReportWriter;
use crate::simulation::Simulation;

/// Mean and population standard deviation of every compartment on one day across runs.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchSummaryRow {
    pub day: usize,
    pub mean_s: f64,
    pub std_s: f64,
    pub mean_e: f64,
    pub std_e: f64,
    pub mean_i: f64,
    pub std_i: f64,
    pub mean_r: f64,
    pub std_r: f64,
    pub mean_v: f64,
    pub std_v: f64,
}

define_report!(BatchSummaryRow);

/// The daily records of every run, in run order.
#[derive(Clone, Debug)]
pub struct BatchResult {
    runs: Vec<Vec<DailyRecord>>,
}

/// Seed used by run `run` of a batch whose parameters carry `base_seed`.
#[must_use]
pub fn run_seed(base_seed: u64, run: usize) -> u64 {
    base_seed.wrapping_add(run as u64)
}

/// Runs `runs` independent simulations for `days` days each. Run `k` uses the seed
/// `parameters.seed + k`, so a batch is reproducible and run 0 matches a single simulation with
/// the same parameters.
///
/// # Errors
///
/// Returns [`SeirvError::InvalidConfiguration`] if `runs` or `days` is zero or the parameters do
/// not validate.
pub fn run_batch(
    parameters: &Parameters,
    runs: usize,
    days: usize,
) -> Result<BatchResult, SeirvError> {
    if runs == 0 {
        return Err(SeirvError::InvalidConfiguration(
            "a batch needs at least one run".to_string(),
        ));
    }
    if days == 0 {
        return Err(SeirvError::InvalidConfiguration(
            "a batch needs at least one day".to_string(),
        ));
    }
    parameters.validate()?;
    info!("Running batch of {runs} simulations for {days} days");

    let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let runs = run_replicates(parameters, runs, days, workers)?;

    Ok(BatchResult { runs })
}

/// Runs replicates `0..runs` at most `workers` at a time, each on its own scoped thread, and
/// returns their records in run order.
fn run_replicates(
    parameters: &Parameters,
    runs: usize,
    days: usize,
    workers: usize,
) -> Result<Vec<Vec<DailyRecord>>, SeirvError> {
    let run_ids: Vec<usize> = (0..runs).collect();
    let mut results = Vec::with_capacity(runs);
    for chunk in run_ids.chunks(workers.max(1)) {
        let chunk_results = thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|&run| {
                    let mut run_parameters = parameters.clone();
                    run_parameters.seed = run_seed(parameters.seed, run);
                    scope.spawn(move || -> Result<Vec<DailyRecord>, SeirvError> {
                        debug!("batch run {run} using seed {}", run_parameters.seed);
                        let mut simulation = Simulation::new(run_parameters)?;
                        Ok(simulation.run(days))
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    // A run panics only on a broken invariant; surface it on the caller's thread.
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect::<Result<Vec<_>, SeirvError>>()
        })?;
        results.extend(chunk_results);
    }
    Ok(results)
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

impl BatchResult {
    #[must_use]
    pub fn runs(&self) -> &[Vec<DailyRecord>] {
        &self.runs
    }

    #[must_use]
    pub fn num_runs(&self) -> usize {
        self.runs.len()
    }

    /// Count of `status` on every day of every run, indexed `[run][day - 1]`.
    #[must_use]
    pub fn series(&self, status: HealthStatus) -> Vec<Vec<usize>> {
        self.runs
            .iter()
            .map(|records| {
                records
                    .iter()
                    .map(|record| record.counts().get(status))
                    .collect()
            })
            .collect()
    }

    /// One row per day with the mean and population standard deviation of each compartment.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self) -> Vec<BatchSummaryRow> {
        let days = self.runs.first().map_or(0, Vec::len);
        (0..days)
            .map(|offset| {
                let stats = |status: HealthStatus| {
                    let values: Vec<f64> = self
                        .runs
                        .iter()
                        .map(|records| records[offset].counts().get(status) as f64)
                        .collect();
                    mean_and_std(&values)
                };
                let (mean_s, std_s) = stats(HealthStatus::Susceptible);
                let (mean_e, std_e) = stats(HealthStatus::Exposed);
                let (mean_i, std_i) = stats(HealthStatus::Infected);
                let (mean_r, std_r) = stats(HealthStatus::Recovered);
                let (mean_v, std_v) = stats(HealthStatus::Vaccinated);
                BatchSummaryRow {
                    day: self.runs[0][offset].day,
                    mean_s,
                    std_s,
                    mean_e,
                    std_e,
                    mean_i,
                    std_i,
                    mean_r,
                    std_r,
                    mean_v,
                    std_v,
                }
            })
            .collect()
    }

    /// Sends every summary row to the `BatchSummaryRow` report of `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if no `BatchSummaryRow` report was added to `writer` or a row cannot be
    /// written.
    pub fn write_summary_report(&self, writer: &mut ReportWriter) -> Result<(), SeirvError> {
        for row in self.summary() {
            writer.send_report(row)?;
        }
        Ok(())
    }
}
