//! IMPALA learner configuration.
//!
//! All values are fixed for the lifetime of an [`Impala`](super::Impala)
//! instance; there is no runtime reconfiguration.

use crate::error::ConfigError;

/// Configuration for the IMPALA loss and its V-trace estimator.
///
/// # Example
///
/// ```ignore
/// let config = ImpalaConfig::new()
///     .with_sequence_length(20)
///     .with_discount_factor(0.99)
///     .with_rho_bar(1.0)
///     .with_cis_bar(1.0);
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ImpalaConfig {
    /// Transitions per segment (T). Segments carry T+1 observations.
    pub sequence_length: usize,
    /// Entropy bonus coefficient
    pub entropy_coef: f32,
    /// Value loss coefficient
    pub value_coef: f32,
    /// Discount factor, in (0, 1]
    pub discount_factor: f32,
    /// Importance weight truncation ρ̄ (which value function V-trace converges to)
    pub rho_bar: f32,
    /// Trace cutting truncation c̄ (how fast it converges)
    pub cis_bar: f32,
}

impl Default for ImpalaConfig {
    fn default() -> Self {
        Self {
            sequence_length: 20,
            entropy_coef: 0.01,
            value_coef: 0.5,
            discount_factor: 0.99,
            rho_bar: 1.0,
            cis_bar: 1.0,
        }
    }
}

impl ImpalaConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the segment length T.
    pub fn with_sequence_length(mut self, length: usize) -> Self {
        self.sequence_length = length;
        self
    }

    /// Set the entropy coefficient.
    pub fn with_entropy_coef(mut self, coef: f32) -> Self {
        self.entropy_coef = coef;
        self
    }

    /// Set the value loss coefficient.
    pub fn with_value_coef(mut self, coef: f32) -> Self {
        self.value_coef = coef;
        self
    }

    /// Set the discount factor (gamma).
    pub fn with_discount_factor(mut self, gamma: f32) -> Self {
        self.discount_factor = gamma;
        self
    }

    /// Set the importance weight truncation.
    pub fn with_rho_bar(mut self, rho_bar: f32) -> Self {
        self.rho_bar = rho_bar;
        self
    }

    /// Set the trace cutting truncation.
    pub fn with_cis_bar(mut self, cis_bar: f32) -> Self {
        self.cis_bar = cis_bar;
        self
    }

    /// Validate configuration parameters.
    ///
    /// Returns `Ok(())` if the configuration is valid, or the first violated
    /// constraint otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sequence_length == 0 {
            return Err(ConfigError::InvalidCount {
                field: "sequence_length",
                value: self.sequence_length,
            });
        }

        for (field, value) in [("entropy_coef", self.entropy_coef), ("value_coef", self.value_coef)] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: f32::MAX,
                });
            }
        }

        // Discount and truncation levels share the estimator's checks.
        crate::algorithms::vtrace::VTrace::from_config(self).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ImpalaConfig::new();
        assert_eq!(config.sequence_length, 20);
        assert_eq!(config.entropy_coef, 0.01);
        assert_eq!(config.value_coef, 0.5);
        assert_eq!(config.discount_factor, 0.99);
        assert_eq!(config.rho_bar, 1.0);
        assert_eq!(config.cis_bar, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ImpalaConfig::new()
            .with_sequence_length(40)
            .with_entropy_coef(0.02)
            .with_value_coef(0.25)
            .with_discount_factor(0.95)
            .with_rho_bar(2.0)
            .with_cis_bar(0.5);

        assert_eq!(config.sequence_length, 40);
        assert_eq!(config.entropy_coef, 0.02);
        assert_eq!(config.value_coef, 0.25);
        assert_eq!(config.discount_factor, 0.95);
        assert_eq!(config.rho_bar, 2.0);
        assert_eq!(config.cis_bar, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_sequence_length() {
        let err = ImpalaConfig::new().with_sequence_length(0).validate().unwrap_err();
        assert_eq!(err, ConfigError::InvalidCount { field: "sequence_length", value: 0 });
    }

    #[test]
    fn test_negative_coefficients() {
        assert!(matches!(
            ImpalaConfig::new().with_value_coef(-0.1).validate(),
            Err(ConfigError::OutOfRange { field: "value_coef", .. })
        ));
        assert!(matches!(
            ImpalaConfig::new().with_entropy_coef(f32::NAN).validate(),
            Err(ConfigError::OutOfRange { field: "entropy_coef", .. })
        ));
    }

    #[test]
    fn test_zero_coefficients_allowed() {
        let config = ImpalaConfig::new().with_value_coef(0.0).with_entropy_coef(0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_truncation_order() {
        let err = ImpalaConfig::new()
            .with_rho_bar(0.5)
            .with_cis_bar(1.0)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::Truncation { rho_bar: 0.5, cis_bar: 1.0 });
    }

    #[test]
    fn test_discount_range() {
        assert!(ImpalaConfig::new().with_discount_factor(1.0).validate().is_ok());
        assert!(ImpalaConfig::new().with_discount_factor(0.0).validate().is_err());
    }
}
