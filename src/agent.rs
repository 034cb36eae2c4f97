//! Individual agents and their health status.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Identifies an agent within its population. Ids are assigned in creation order starting at 0,
/// so an `AgentId` is also the agent's index in the population.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub(crate) usize);

impl AgentId {
    #[must_use]
    pub fn new(index: usize) -> Self {
        AgentId(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The five mutually exclusive SEIRV compartments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Susceptible,
    Exposed,
    Infected,
    Recovered,
    Vaccinated,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 5] = [
        HealthStatus::Susceptible,
        HealthStatus::Exposed,
        HealthStatus::Infected,
        HealthStatus::Recovered,
        HealthStatus::Vaccinated,
    ];

    /// Recovered and Vaccinated agents never change status again.
    #[must_use]
    pub fn is_absorbing(self) -> bool {
        matches!(self, HealthStatus::Recovered | HealthStatus::Vaccinated)
    }

    /// The single-letter compartment code used in reports.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            HealthStatus::Susceptible => "S",
            HealthStatus::Exposed => "E",
            HealthStatus::Infected => "I",
            HealthStatus::Recovered => "R",
            HealthStatus::Vaccinated => "V",
        }
    }
}

impl Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single simulated individual.
///
/// Mask use and vaccination are fixed at creation. The health status is only changed by the
/// simulation engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    id: AgentId,
    status: HealthStatus,
    wears_mask: bool,
    is_vaccinated: bool,
    days_in_status: u32,
    ever_infected: bool,
}

impl Agent {
    /// Creates a susceptible agent.
    #[must_use]
    pub fn new(id: AgentId, wears_mask: bool, is_vaccinated: bool) -> Self {
        Agent {
            id,
            status: HealthStatus::Susceptible,
            wears_mask,
            is_vaccinated,
            days_in_status: 0,
            ever_infected: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> HealthStatus {
        self.status
    }

    #[must_use]
    pub fn wears_mask(&self) -> bool {
        self.wears_mask
    }

    #[must_use]
    pub fn is_vaccinated(&self) -> bool {
        self.is_vaccinated
    }

    /// Whole days spent in the current status. Zero on the day of a transition.
    #[must_use]
    pub fn days_in_status(&self) -> u32 {
        self.days_in_status
    }

    /// Whether the agent has ever been Exposed or Infected.
    #[must_use]
    pub fn ever_infected(&self) -> bool {
        self.ever_infected
    }

    pub(crate) fn set_status(&mut self, status: HealthStatus) {
        if status != self.status {
            self.status = status;
            self.days_in_status = 0;
        }
        if matches!(status, HealthStatus::Exposed | HealthStatus::Infected) {
            self.ever_infected = true;
        }
    }

    pub(crate) fn advance_day(&mut self) {
        self.days_in_status = self.days_in_status.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agent_is_susceptible() {
        let agent = Agent::new(AgentId(3), true, false);
        assert_eq!(agent.id(), AgentId(3));
        assert_eq!(agent.id().index(), 3);
        assert_eq!(agent.status(), HealthStatus::Susceptible);
        assert!(agent.wears_mask());
        assert!(!agent.is_vaccinated());
        assert_eq!(agent.days_in_status(), 0);
        assert!(!agent.ever_infected());
    }

    #[test]
    fn transition_resets_day_counter() {
        let mut agent = Agent::new(AgentId(0), false, false);
        agent.advance_day();
        agent.advance_day();
        assert_eq!(agent.days_in_status(), 2);

        // Setting the same status keeps the counter.
        agent.set_status(HealthStatus::Susceptible);
        assert_eq!(agent.days_in_status(), 2);

        agent.set_status(HealthStatus::Exposed);
        assert_eq!(agent.status(), HealthStatus::Exposed);
        assert_eq!(agent.days_in_status(), 0);
        assert!(agent.ever_infected());
    }

    #[test]
    fn vaccination_is_not_infection() {
        let mut agent = Agent::new(AgentId(0), false, true);
        agent.set_status(HealthStatus::Vaccinated);
        assert!(!agent.ever_infected());
    }

    #[test]
    fn absorbing_statuses() {
        let absorbing: Vec<_> = HealthStatus::ALL
            .into_iter()
            .filter(|status| status.is_absorbing())
            .collect();
        assert_eq!(
            absorbing,
            vec![HealthStatus::Recovered, HealthStatus::Vaccinated]
        );
    }

    #[test]
    fn status_codes() {
        let codes: String = HealthStatus::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(codes, "SEIRV");
    }
}
