//! A stochastic agent-based SEIRV epidemic model
//!
//! `ixa-seirv` simulates the spread of an infectious disease through a closed
//! population of individual agents, one day at a time. Every agent is in
//! exactly one of five health states: Susceptible, Exposed, Infected,
//! Recovered or Vaccinated. Two fixed traits, mask use and vaccination,
//! reduce the chance that a contact with an infected agent leads to
//! exposure.
//!
//! The main pieces are:
//! * [`Environment`], which creates and owns the population of [`Agent`]s.
//! * [`Simulation`], which seeds the index case and advances the model one
//!   day per [`Simulation::step`] call, applying a transmission pass (random
//!   contact sampling) followed by a progression pass (daily transition
//!   probabilities).
//! * [`DataCollector`], which keeps one [`DailyRecord`] of compartment counts
//!   per simulated day for downstream analysis.
//!
//! Everything is configured through an explicit [`Parameters`] value and
//! all randomness flows through generators owned by the simulation, so a run
//! is fully determined by its parameters and seed:
//!
//! ```rust
//! use ixa_seirv::{ParametersBuilder, Simulation};
//!
//! let parameters = ParametersBuilder::default()
//!     .population(100)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! let mut simulation = Simulation::new(parameters).unwrap();
//! let records = simulation.run(50);
//! assert_eq!(records.len(), 50);
//! assert_eq!(records[49].day, 50);
//! ```
//!
//! Independent replicate runs for mean/variance curves are provided by
//! [`batch::run_batch`], and CSV output by the [`report`] module.
pub mod agent;
pub use agent::{Agent, AgentId, HealthStatus};

pub mod batch;
pub use batch::{run_batch, BatchResult, BatchSummaryRow};

pub mod data_collector;
pub use data_collector::{DailyRecord, DataCollector, StatusCounts};

pub mod environment;
pub use environment::Environment;

pub mod error;
pub use error::SeirvError;

pub mod hashing;
pub mod log;

pub mod numeric;

pub mod parameters;
pub use parameters::{load_parameters, Parameters, ParametersBuilder};

pub mod random;
pub use random::{RngId, RngStreams};

pub mod report;
pub use report::{Report, ReportOptions, ReportWriter};

pub mod runner;

pub mod simulation;
pub use simulation::Simulation;

pub mod prelude;

// Re-exports for use in the exported macros.
pub use csv;
pub use paste;
pub use rand;
