//! Per-day compartment counts.
//!
//! The [`DataCollector`] is the only contract between the engine and anything that analyses its
//! output: an append-only, day-ordered list of [`DailyRecord`]s whose five counts always sum to
//! the population size.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, HealthStatus};
use crate::define_report;
use crate::error::SeirvError;
use crate::report::ReportWriter;

/// Number of agents in each compartment at one point in time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub susceptible: usize,
    pub exposed: usize,
    pub infected: usize,
    pub recovered: usize,
    pub vaccinated: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn from_agents(agents: &[Agent]) -> Self {
        let mut counts = StatusCounts::default();
        for agent in agents {
            *counts.get_mut(agent.status()) += 1;
        }
        counts
    }

    #[must_use]
    pub fn get(&self, status: HealthStatus) -> usize {
        match status {
            HealthStatus::Susceptible => self.susceptible,
            HealthStatus::Exposed => self.exposed,
            HealthStatus::Infected => self.infected,
            HealthStatus::Recovered => self.recovered,
            HealthStatus::Vaccinated => self.vaccinated,
        }
    }

    fn get_mut(&mut self, status: HealthStatus) -> &mut usize {
        match status {
            HealthStatus::Susceptible => &mut self.susceptible,
            HealthStatus::Exposed => &mut self.exposed,
            HealthStatus::Infected => &mut self.infected,
            HealthStatus::Recovered => &mut self.recovered,
            HealthStatus::Vaccinated => &mut self.vaccinated,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.susceptible + self.exposed + self.infected + self.recovered + self.vaccinated
    }

    /// Checks that the counts account for exactly `population_size` agents.
    ///
    /// # Errors
    ///
    /// Returns [`SeirvError::DegenerateState`] if they do not.
    pub fn check_conservation(&self, population_size: usize) -> Result<(), SeirvError> {
        if population_size == 0 || self.total() != population_size {
            return Err(SeirvError::DegenerateState(format!(
                "compartment counts {self:?} sum to {} but the population size is {population_size}",
                self.total()
            )));
        }
        Ok(())
    }
}

/// One row of output: the compartment counts at the end of `day`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub day: usize,
    #[serde(rename = "S")]
    pub susceptible: usize,
    #[serde(rename = "E")]
    pub exposed: usize,
    #[serde(rename = "I")]
    pub infected: usize,
    #[serde(rename = "R")]
    pub recovered: usize,
    #[serde(rename = "V")]
    pub vaccinated: usize,
}

define_report!(DailyRecord);

impl DailyRecord {
    #[must_use]
    pub fn new(day: usize, counts: StatusCounts) -> Self {
        DailyRecord {
            day,
            susceptible: counts.susceptible,
            exposed: counts.exposed,
            infected: counts.infected,
            recovered: counts.recovered,
            vaccinated: counts.vaccinated,
        }
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            susceptible: self.susceptible,
            exposed: self.exposed,
            infected: self.infected,
            recovered: self.recovered,
            vaccinated: self.vaccinated,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts().total()
    }
}

/// Accumulates one [`DailyRecord`] per simulated day, in day order.
#[derive(Clone, Debug, Default)]
pub struct DataCollector {
    records: Vec<DailyRecord>,
}

impl DataCollector {
    #[must_use]
    pub fn new() -> Self {
        DataCollector::default()
    }

    /// Appends a snapshot of `agents` for `day` and returns it.
    pub fn record(&mut self, day: usize, agents: &[Agent]) -> DailyRecord {
        let record = DailyRecord::new(day, StatusCounts::from_agents(agents));
        self.records.push(record);
        record
    }

    /// The recorded days in insertion order.
    #[must_use]
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    /// An owned copy of the recorded days in insertion order.
    #[must_use]
    pub fn export(&self) -> Vec<DailyRecord> {
        self.records.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sends every record to the `DailyRecord` report of `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if no `DailyRecord` report was added to `writer` or a row cannot be
    /// written.
    pub fn write_report(&self, writer: &mut ReportWriter) -> Result<(), SeirvError> {
        for record in &self.records {
            writer.send_report(*record)?;
        }
        Ok(())
    }
}
