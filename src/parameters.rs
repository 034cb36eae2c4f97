//! Model configuration.
//!
//! All rate constants live in a [`Parameters`] value that is passed to the simulation at
//! construction, so any number of differently configured runs can coexist in one process.
//! Parameters can be built in code with [`ParametersBuilder`] or read from a JSON file with
//! [`load_parameters`]; fields missing from the file keep their defaults.

use std::fs;
use std::path::Path;

use derive_builder::Builder;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::SeirvError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Number of agents. Fixed for the whole run.
    #[builder(default = "1000")]
    pub population: usize,

    /// Probability that a contact between an infected and a susceptible agent transmits, before
    /// any mask or vaccine reduction.
    #[builder(default = "0.10")]
    pub beta: f64,

    /// Daily probability that an exposed agent becomes infected.
    #[builder(default = "0.20")]
    pub sigma: f64,

    /// Daily probability that an infected agent recovers.
    #[builder(default = "0.14")]
    pub gamma: f64,

    /// Daily probability that a susceptible agent is vaccinated.
    #[builder(default = "0.02")]
    pub nu: f64,

    /// Fractional reduction in transmission when either party wears a mask.
    #[builder(default = "0.60")]
    pub mask_effect: f64,

    /// Fractional reduction in transmission when the contact is vaccinated.
    #[builder(default = "0.85")]
    pub vaccine_effect: f64,

    /// Probability that an agent wears a mask.
    #[builder(default = "0.60")]
    pub mask_rate: f64,

    /// Probability that an agent starts out vaccinated.
    #[builder(default = "0.40")]
    pub vaccine_rate: f64,

    /// Contacts sampled per infected agent per day, capped at the population size.
    #[builder(default = "10")]
    pub contacts_per_day: usize,

    #[builder(default = "0")]
    pub seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        ParametersBuilder::default().build().unwrap()
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), SeirvError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SeirvError::InvalidConfiguration(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

impl Parameters {
    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SeirvError::InvalidConfiguration`] if the population or contact count is zero,
    /// or if any rate, effect or adoption rate is NaN or outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), SeirvError> {
        if self.population == 0 {
            return Err(SeirvError::InvalidConfiguration(
                "population must be at least 1".to_string(),
            ));
        }
        if self.contacts_per_day == 0 {
            return Err(SeirvError::InvalidConfiguration(
                "contacts_per_day must be at least 1".to_string(),
            ));
        }
        check_probability("beta", self.beta)?;
        check_probability("sigma", self.sigma)?;
        check_probability("gamma", self.gamma)?;
        check_probability("nu", self.nu)?;
        check_probability("mask_effect", self.mask_effect)?;
        check_probability("vaccine_effect", self.vaccine_effect)?;
        check_probability("mask_rate", self.mask_rate)?;
        check_probability("vaccine_rate", self.vaccine_rate)?;
        Ok(())
    }
}

/// Reads parameters from a JSON file and validates them.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON for [`Parameters`], or holds
/// out-of-range values.
pub fn load_parameters(file_path: &Path) -> Result<Parameters, SeirvError> {
    trace!("Loading parameters from {}", file_path.display());
    let contents = fs::read_to_string(file_path)?;
    let parameters: Parameters = serde_json::from_str(&contents)?;
    parameters.validate()?;
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let parameters = Parameters::default();
        assert_eq!(parameters.population, 1000);
        assert_eq!(parameters.beta, 0.10);
        assert_eq!(parameters.vaccine_effect, 0.85);
        assert_eq!(parameters.contacts_per_day, 10);
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let parameters = ParametersBuilder::default()
            .population(100)
            .beta(0.5)
            .seed(42)
            .build()
            .unwrap();
        assert_eq!(parameters.population, 100);
        assert_eq!(parameters.beta, 0.5);
        assert_eq!(parameters.seed, 42);
        assert_eq!(parameters.gamma, 0.14);
    }

    #[test]
    fn zero_population_is_rejected() {
        let parameters = ParametersBuilder::default()
            .population(0)
            .build()
            .unwrap();
        assert!(matches!(
            parameters.validate(),
            Err(SeirvError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_contacts_is_rejected() {
        let parameters = ParametersBuilder::default()
            .contacts_per_day(0)
            .build()
            .unwrap();
        assert!(matches!(
            parameters.validate(),
            Err(SeirvError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn out_of_range_rates_are_rejected() {
        let cases = [
            ParametersBuilder::default().beta(1.5).build().unwrap(),
            ParametersBuilder::default().sigma(-0.1).build().unwrap(),
            ParametersBuilder::default().gamma(f64::NAN).build().unwrap(),
            ParametersBuilder::default().nu(2.0).build().unwrap(),
            ParametersBuilder::default().mask_effect(1.01).build().unwrap(),
            ParametersBuilder::default()
                .vaccine_effect(-1.0)
                .build()
                .unwrap(),
            ParametersBuilder::default().mask_rate(3.0).build().unwrap(),
            ParametersBuilder::default()
                .vaccine_rate(f64::INFINITY)
                .build()
                .unwrap(),
        ];
        for parameters in cases {
            assert!(
                matches!(
                    parameters.validate(),
                    Err(SeirvError::InvalidConfiguration(_))
                ),
                "{parameters:?} should be rejected"
            );
        }
    }

    #[test]
    fn error_names_the_field() {
        let parameters = ParametersBuilder::default().sigma(1.2).build().unwrap();
        let message = parameters.validate().unwrap_err().to_string();
        assert!(message.contains("sigma"), "{message}");
    }

    #[test]
    fn load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"population": 250, "beta": 0.3, "seed": 9}}"#).unwrap();
        let parameters = load_parameters(file.path()).unwrap();
        assert_eq!(parameters.population, 250);
        assert_eq!(parameters.beta, 0.3);
        assert_eq!(parameters.seed, 9);
        // Unspecified fields keep their defaults
        assert_eq!(parameters.sigma, 0.20);
        assert_eq!(parameters.mask_rate, 0.60);
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"populaton": 250}}"#).unwrap();
        assert!(matches!(
            load_parameters(file.path()),
            Err(SeirvError::JsonError(_))
        ));
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"nu": 1.5}}"#).unwrap();
        assert!(matches!(
            load_parameters(file.path()),
            Err(SeirvError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn load_missing_file() {
        assert!(matches!(
            load_parameters(Path::new("does/not/exist.json")),
            Err(SeirvError::IoError(_))
        ));
    }
}
