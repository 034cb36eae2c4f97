//! The population an epidemic runs through.

use log::debug;
use rand::Rng;

use crate::agent::{Agent, AgentId, HealthStatus};
use crate::data_collector::StatusCounts;
use crate::error::SeirvError;

/// Owns every agent of one population. The population size never changes after construction.
#[derive(Clone, Debug)]
pub struct Environment {
    agents: Vec<Agent>,
}

fn check_rate(name: &str, value: f64) -> Result<(), SeirvError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SeirvError::InvalidConfiguration(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

impl Environment {
    /// Creates `population_size` susceptible agents. Each agent independently wears a mask with
    /// probability `mask_rate` and is vaccinated with probability `vaccine_rate`; the mask draw
    /// is made before the vaccination draw for every agent.
    ///
    /// # Errors
    ///
    /// Returns [`SeirvError::InvalidConfiguration`] if `population_size` is zero or either rate
    /// lies outside `[0, 1]`.
    pub fn new<R: Rng>(
        population_size: usize,
        mask_rate: f64,
        vaccine_rate: f64,
        rng: &mut R,
    ) -> Result<Self, SeirvError> {
        if population_size == 0 {
            return Err(SeirvError::InvalidConfiguration(
                "population must be at least 1".to_string(),
            ));
        }
        check_rate("mask_rate", mask_rate)?;
        check_rate("vaccine_rate", vaccine_rate)?;

        let agents: Vec<Agent> = (0..population_size)
            .map(|index| {
                let wears_mask = rng.random_bool(mask_rate);
                let is_vaccinated = rng.random_bool(vaccine_rate);
                Agent::new(AgentId(index), wears_mask, is_vaccinated)
            })
            .collect();

        debug!(
            "Created population of {} ({} masked, {} vaccinated)",
            population_size,
            agents.iter().filter(|agent| agent.wears_mask()).count(),
            agents.iter().filter(|agent| agent.is_vaccinated()).count()
        );
        Ok(Environment { agents })
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.agents.len()
    }

    /// All agents, ordered by id.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.0)
    }

    pub(crate) fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::from_agents(&self.agents)
    }

    #[must_use]
    pub fn count_status(&self, status: HealthStatus) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.status() == status)
            .count()
    }

    /// Number of agents that have been Exposed or Infected at any point.
    #[must_use]
    pub fn ever_infected_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.ever_infected())
            .count()
    }
}
