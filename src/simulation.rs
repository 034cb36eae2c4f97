//! The daily SEIRV update rule.
//!
//! Each call to [`Simulation::step`] advances the model by one day in three fixed stages:
//!
//! 1. **Transmission.** Every agent that is Infected at the start of the day meets
//!    `min(contacts_per_day, population)` distinct agents drawn uniformly from the whole
//!    population (the infected agent itself may be drawn, which has no effect). Each contact that
//!    is still Susceptible becomes Exposed with probability
//!    `beta * (1 - e_m) * (1 - e_v)`, where `e_m` is `mask_effect` if either agent wears a mask
//!    and `e_v` is `vaccine_effect` if the contact is vaccinated.
//! 2. **Progression.** After transmission has finished for the whole population, every agent
//!    gets at most one transition: Exposed becomes Infected with probability `sigma`, otherwise
//!    Infected becomes Recovered with probability `gamma`, otherwise Susceptible becomes
//!    Vaccinated with probability `nu`. Recovered and Vaccinated are absorbing.
//! 3. **Recording.** The compartment counts are appended to the [`DataCollector`].
//!
//! Transmission and progression draw from separate random streams, so the progression draws of a
//! run do not depend on how many transmission draws were made.

use log::{debug, info, trace};

use crate::agent::{Agent, HealthStatus};
use crate::data_collector::{DailyRecord, DataCollector, StatusCounts};
use crate::define_rng;
use crate::environment::Environment;
use crate::error::SeirvError;
use crate::parameters::Parameters;
use crate::random::RngStreams;

define_rng!(PopulationRng);
define_rng!(TransmissionRng);
define_rng!(ProgressionRng);

/// A single stochastic run over one population.
pub struct Simulation {
    environment: Environment,
    parameters: Parameters,
    day: usize,
    rngs: RngStreams,
    data_collector: DataCollector,
}

impl Simulation {
    /// Builds the population described by `parameters`, seeded from `parameters.seed`, and makes
    /// the first agent the index case.
    ///
    /// # Errors
    ///
    /// Returns [`SeirvError::InvalidConfiguration`] if the parameters do not validate.
    pub fn new(parameters: Parameters) -> Result<Self, SeirvError> {
        parameters.validate()?;
        let mut rngs = RngStreams::new(parameters.seed);
        let environment = Environment::new(
            parameters.population,
            parameters.mask_rate,
            parameters.vaccine_rate,
            rngs.get_rng(PopulationRng),
        )?;
        Ok(Self::seeded(parameters, environment, rngs))
    }

    /// Runs the model over a population that was built elsewhere, for instance with a caller
    /// supplied generator. Daily draws still come from streams seeded with `parameters.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`SeirvError::InvalidConfiguration`] if the parameters do not validate, if the
    /// population size differs from `parameters.population`, or if any agent is no longer
    /// Susceptible.
    pub fn from_environment(
        parameters: Parameters,
        environment: Environment,
    ) -> Result<Self, SeirvError> {
        parameters.validate()?;
        if environment.population_size() != parameters.population {
            return Err(SeirvError::InvalidConfiguration(format!(
                "environment has {} agents but population is {}",
                environment.population_size(),
                parameters.population
            )));
        }
        if environment.count_status(HealthStatus::Susceptible) != environment.population_size() {
            return Err(SeirvError::InvalidConfiguration(
                "every agent must be Susceptible before the index case is seeded".to_string(),
            ));
        }
        let rngs = RngStreams::new(parameters.seed);
        Ok(Self::seeded(parameters, environment, rngs))
    }

    fn seeded(parameters: Parameters, mut environment: Environment, rngs: RngStreams) -> Self {
        // Validation guarantees a non-empty population.
        environment.agents_mut()[0].set_status(HealthStatus::Infected);
        info!(
            "Starting simulation: population={}, beta={}, sigma={}, gamma={}, nu={}, seed={}",
            parameters.population,
            parameters.beta,
            parameters.sigma,
            parameters.gamma,
            parameters.nu,
            parameters.seed
        );
        Simulation {
            environment,
            parameters,
            day: 0,
            rngs,
            data_collector: DataCollector::new(),
        }
    }

    /// Chance that `infected` exposes `contact` during one contact.
    #[must_use]
    pub fn infection_probability(&self, infected: &Agent, contact: &Agent) -> f64 {
        let mask_effect = if infected.wears_mask() || contact.wears_mask() {
            self.parameters.mask_effect
        } else {
            0.0
        };
        let vaccine_effect = if contact.is_vaccinated() {
            self.parameters.vaccine_effect
        } else {
            0.0
        };
        self.parameters.beta * (1.0 - mask_effect) * (1.0 - vaccine_effect)
    }

    /// Advances the model by one day and returns that day's record.
    ///
    /// # Panics
    ///
    /// Panics if the compartment counts no longer sum to the population size, which can only
    /// happen through a defect in the update rule.
    pub fn step(&mut self) -> DailyRecord {
        self.day += 1;
        for agent in self.environment.agents_mut() {
            agent.advance_day();
        }

        self.transmission_pass();
        self.progression_pass();

        let record = self
            .data_collector
            .record(self.day, self.environment.agents());
        if let Err(error) = record
            .counts()
            .check_conservation(self.parameters.population)
        {
            panic!("{error}");
        }
        debug!(
            "day {}: S={} E={} I={} R={} V={}",
            record.day,
            record.susceptible,
            record.exposed,
            record.infected,
            record.recovered,
            record.vaccinated
        );
        record
    }

    /// Calls [`step`](Self::step) `days` times and returns the records produced.
    pub fn run(&mut self, days: usize) -> Vec<DailyRecord> {
        let records: Vec<DailyRecord> = (0..days).map(|_| self.step()).collect();
        info!(
            "Finished {} days; {} of {} agents were ever infected",
            self.day,
            self.environment.ever_infected_count(),
            self.environment.population_size()
        );
        records
    }

    fn transmission_pass(&mut self) {
        let population_size = self.environment.population_size();
        for index in 0..population_size {
            if self.environment.agents()[index].status() != HealthStatus::Infected {
                continue;
            }
            let contacts = self.rngs.sample_indices(
                TransmissionRng,
                population_size,
                self.parameters.contacts_per_day,
            );
            for contact in contacts {
                let agents = self.environment.agents();
                if agents[contact].status() != HealthStatus::Susceptible {
                    continue;
                }
                let p = self.infection_probability(&agents[index], &agents[contact]);
                if self.rngs.sample_bool(TransmissionRng, p) {
                    trace!(
                        "day {}: agent {} infected agent {} (p={:.3})",
                        self.day,
                        index,
                        contact,
                        p
                    );
                    self.environment.agents_mut()[contact].set_status(HealthStatus::Exposed);
                }
            }
        }
    }

    fn progression_pass(&mut self) {
        let &Parameters {
            sigma, gamma, nu, ..
        } = &self.parameters;
        for agent in self.environment.agents_mut() {
            let next_status = match agent.status() {
                HealthStatus::Exposed => self
                    .rngs
                    .sample_bool(ProgressionRng, sigma)
                    .then_some(HealthStatus::Infected),
                HealthStatus::Infected => self
                    .rngs
                    .sample_bool(ProgressionRng, gamma)
                    .then_some(HealthStatus::Recovered),
                HealthStatus::Susceptible => self
                    .rngs
                    .sample_bool(ProgressionRng, nu)
                    .then_some(HealthStatus::Vaccinated),
                HealthStatus::Recovered | HealthStatus::Vaccinated => None,
            };
            if let Some(status) = next_status {
                trace!(
                    "day {}: agent {} {} -> {}",
                    self.day,
                    agent.id(),
                    agent.status(),
                    status
                );
                agent.set_status(status);
            }
        }
    }

    /// Days simulated so far. Zero before the first step.
    #[must_use]
    pub fn day(&self) -> usize {
        self.day
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    #[must_use]
    pub fn data_collector(&self) -> &DataCollector {
        &self.data_collector
    }

    /// Current compartment counts.
    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        self.environment.counts()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::agent::AgentId;
    use crate::assert_almost_eq;
    use crate::parameters::ParametersBuilder;

    fn frozen_parameters(population: usize) -> Parameters {
        ParametersBuilder::default()
            .population(population)
            .beta(0.0)
            .sigma(0.0)
            .gamma(0.0)
            .nu(0.0)
            .build()
            .unwrap()
    }

    fn statuses(simulation: &Simulation) -> Vec<HealthStatus> {
        simulation
            .environment()
            .agents()
            .iter()
            .map(Agent::status)
            .collect()
    }

    #[test]
    fn single_seed_case() {
        for population in [1, 2, 10, 1000] {
            let simulation = Simulation::new(
                ParametersBuilder::default()
                    .population(population)
                    .build()
                    .unwrap(),
            )
            .unwrap();
            assert_eq!(simulation.day(), 0);
            assert!(simulation.data_collector().is_empty());
            let counts = simulation.counts();
            assert_eq!(counts.infected, 1);
            assert_eq!(counts.susceptible, population - 1);
            assert_eq!(
                simulation.environment().agents()[0].status(),
                HealthStatus::Infected
            );
            assert!(simulation.environment().agents()[0].ever_infected());
        }
    }

    #[test]
    fn invalid_parameters_fail_at_construction() {
        let parameters = ParametersBuilder::default().beta(1.5).build().unwrap();
        assert!(matches!(
            Simulation::new(parameters),
            Err(SeirvError::InvalidConfiguration(_))
        ));
        let parameters = ParametersBuilder::default().population(0).build().unwrap();
        assert!(matches!(
            Simulation::new(parameters),
            Err(SeirvError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn infection_probability_formula() {
        let parameters = ParametersBuilder::default()
            .beta(0.1)
            .mask_effect(0.6)
            .vaccine_effect(0.85)
            .build()
            .unwrap();
        let simulation = Simulation::new(parameters).unwrap();

        let plain = Agent::new(AgentId::new(0), false, false);
        let masked = Agent::new(AgentId::new(1), true, false);
        let vaccinated = Agent::new(AgentId::new(2), false, true);
        let masked_vaccinated = Agent::new(AgentId::new(3), true, true);

        assert_almost_eq!(simulation.infection_probability(&plain, &plain), 0.1, 1e-12);
        // A mask on either side counts.
        assert_almost_eq!(simulation.infection_probability(&masked, &plain), 0.04, 1e-12);
        assert_almost_eq!(simulation.infection_probability(&plain, &masked), 0.04, 1e-12);
        // Only the contact's vaccination counts.
        assert_almost_eq!(
            simulation.infection_probability(&vaccinated, &plain),
            0.1,
            1e-12
        );
        assert_almost_eq!(
            simulation.infection_probability(&plain, &vaccinated),
            0.015,
            1e-12
        );
        assert_almost_eq!(
            simulation.infection_probability(&masked, &masked_vaccinated),
            0.006,
            1e-12
        );
    }

    #[test]
    fn day_counter_and_conservation() {
        let mut simulation = Simulation::new(
            ParametersBuilder::default()
                .population(200)
                .seed(3)
                .build()
                .unwrap(),
        )
        .unwrap();
        for expected_day in 1..=100 {
            let record = simulation.step();
            assert_eq!(record.day, expected_day);
            assert_eq!(record.total(), 200);
        }
        assert_eq!(simulation.day(), 100);
        assert_eq!(simulation.data_collector().len(), 100);
    }

    #[test]
    #[should_panic(expected = "Degenerate state")]
    fn step_panics_when_counts_drift_from_population() {
        let mut simulation = Simulation::new(frozen_parameters(10)).unwrap();
        simulation.parameters.population = 11;
        simulation.step();
    }

    #[test]
    fn zero_probabilities_change_nothing() {
        let mut simulation = Simulation::new(frozen_parameters(50)).unwrap();
        let initial = statuses(&simulation);
        let records = simulation.run(25);
        assert_eq!(statuses(&simulation), initial);
        assert!(records
            .iter()
            .all(|record| record.infected == 1 && record.susceptible == 49));
        // The index case has now been infected for 25 days.
        assert_eq!(simulation.environment().agents()[0].days_in_status(), 25);
    }

    #[test]
    fn certain_transmission_when_every_agent_is_a_contact() {
        let parameters = ParametersBuilder::default()
            .population(5)
            .beta(1.0)
            .mask_effect(0.0)
            .vaccine_effect(0.0)
            .sigma(0.0)
            .gamma(0.0)
            .nu(0.0)
            .contacts_per_day(5)
            .build()
            .unwrap();
        let mut simulation = Simulation::new(parameters).unwrap();
        let record = simulation.step();
        assert_eq!(record.infected, 1);
        assert_eq!(record.exposed, 4);
        assert_eq!(simulation.environment().ever_infected_count(), 5);
    }

    #[test]
    fn certain_progression_chain() {
        let parameters = ParametersBuilder::default()
            .population(2)
            .beta(1.0)
            .mask_effect(0.0)
            .vaccine_effect(0.0)
            .sigma(1.0)
            .gamma(1.0)
            .nu(0.0)
            .build()
            .unwrap();
        let mut simulation = Simulation::new(parameters).unwrap();

        // Day 1: agent 1 is exposed and progresses to Infected; the index case recovers.
        simulation.step();
        assert_eq!(
            statuses(&simulation),
            vec![HealthStatus::Recovered, HealthStatus::Infected]
        );

        // Day 2: nobody is left to infect and agent 1 recovers.
        let record = simulation.step();
        assert_eq!(record.recovered, 2);
    }

    #[test]
    fn certain_vaccination() {
        let parameters = ParametersBuilder::default()
            .population(30)
            .beta(0.0)
            .sigma(0.0)
            .gamma(0.0)
            .nu(1.0)
            .build()
            .unwrap();
        let mut simulation = Simulation::new(parameters).unwrap();
        let record = simulation.step();
        assert_eq!(record.vaccinated, 29);
        assert_eq!(record.infected, 1);
        assert_eq!(simulation.environment().ever_infected_count(), 1);
    }

    #[test]
    fn absorbing_states_never_change() {
        let parameters = ParametersBuilder::default()
            .population(300)
            .beta(0.5)
            .sigma(0.5)
            .gamma(0.3)
            .nu(0.05)
            .seed(11)
            .build()
            .unwrap();
        let mut simulation = Simulation::new(parameters).unwrap();
        let mut previous = statuses(&simulation);
        for _ in 0..60 {
            simulation.step();
            let current = statuses(&simulation);
            for (before, after) in previous.iter().zip(&current) {
                if before.is_absorbing() {
                    assert_eq!(before, after);
                }
            }
            previous = current;
        }
    }

    #[test]
    fn same_seed_same_records() {
        let parameters = ParametersBuilder::default()
            .population(100)
            .beta(0.1)
            .sigma(0.2)
            .gamma(0.14)
            .nu(0.02)
            .seed(42)
            .build()
            .unwrap();
        let first = Simulation::new(parameters.clone()).unwrap().run(50);
        let second = Simulation::new(parameters).unwrap().run(50);
        assert_eq!(first.len(), 50);
        assert_eq!(first, second);
    }

    #[test]
    fn from_environment_uses_given_population() {
        let parameters = frozen_parameters(20);
        let environment =
            Environment::new(20, 1.0, 0.0, &mut StdRng::seed_from_u64(5)).unwrap();
        let simulation = Simulation::from_environment(parameters, environment).unwrap();
        assert!(simulation.environment().agents().iter().all(Agent::wears_mask));
        assert_eq!(simulation.counts().infected, 1);
    }

    #[test]
    fn from_environment_rejects_mismatch() {
        let environment =
            Environment::new(10, 0.5, 0.5, &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(matches!(
            Simulation::from_environment(frozen_parameters(20), environment),
            Err(SeirvError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn from_environment_rejects_used_population() {
        let simulation = Simulation::new(frozen_parameters(10)).unwrap();
        let used = simulation.environment().clone();
        assert!(matches!(
            Simulation::from_environment(frozen_parameters(10), used),
            Err(SeirvError::InvalidConfiguration(_))
        ));
    }
}
