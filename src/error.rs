//! Error types for the IMPALA learner core.
//!
//! Two families of failure exist:
//! - [`ConfigError`]: invalid construction-time parameters. Fatal, never retried.
//! - [`ImpalaError`]: per-call failures (shape mismatches, model failures).

use std::fmt;

/// Opaque failure raised by a model implementation.
///
/// The learner core never inspects these; they are propagated unchanged.
pub type ModelError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Returned when configuration parameters are invalid or inconsistent.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count parameter (sequence_length) must be positive.
    InvalidCount {
        field: &'static str,
        value: usize,
    },
    /// A parameter is outside its valid range (or not finite).
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    /// V-trace requires rho_bar >= cis_bar.
    Truncation {
        rho_bar: f32,
        cis_bar: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCount { field, value } => {
                write!(f, "{} must be > 0, got {}", field, value)
            }
            ConfigError::OutOfRange { field, value, min, max } => {
                write!(f, "{} must be in [{}, {}], got {}", field, min, max, value)
            }
            ConfigError::Truncation { rho_bar, cis_bar } => {
                write!(
                    f,
                    "truncation levels must satisfy rho_bar >= cis_bar, got rho_bar={} cis_bar={}",
                    rho_bar, cis_bar
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error returned by V-trace and loss computation.
#[derive(Debug)]
pub enum ImpalaError {
    /// Invalid configuration.
    Config(ConfigError),
    /// Time or batch dimensions disagree between inputs.
    ShapeMismatch {
        field: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    /// The model's forward or act call failed.
    Model(ModelError),
}

impl ImpalaError {
    pub(crate) fn shape(field: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        ImpalaError::ShapeMismatch {
            field,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

impl fmt::Display for ImpalaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpalaError::Config(e) => write!(f, "configuration error: {}", e),
            ImpalaError::ShapeMismatch { field, expected, actual } => {
                write!(f, "shape mismatch for {}: expected {:?}, got {:?}", field, expected, actual)
            }
            ImpalaError::Model(e) => write!(f, "model error: {}", e),
        }
    }
}

impl std::error::Error for ImpalaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImpalaError::Config(e) => Some(e),
            ImpalaError::ShapeMismatch { .. } => None,
            ImpalaError::Model(e) => Some(e.as_ref()),
        }
    }
}

impl From<ConfigError> for ImpalaError {
    fn from(e: ConfigError) -> Self {
        ImpalaError::Config(e)
    }
}

impl From<ModelError> for ImpalaError {
    fn from(e: ModelError) -> Self {
        ImpalaError::Model(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Truncation { rho_bar: 0.5, cis_bar: 1.0 };
        let msg = err.to_string();
        assert!(msg.contains("rho_bar=0.5"));
        assert!(msg.contains("cis_bar=1"));
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = ImpalaError::shape("observations", &[21], &[20]);
        assert_eq!(
            err.to_string(),
            "shape mismatch for observations: expected [21], got [20]"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_model_error_source_preserved() {
        let inner: ModelError = "forward exploded".into();
        let err = ImpalaError::from(inner);
        assert_eq!(err.source().map(|s| s.to_string()), Some("forward exploded".to_string()));
    }

    #[test]
    fn test_config_error_converts() {
        let err: ImpalaError = ConfigError::InvalidCount { field: "sequence_length", value: 0 }.into();
        assert!(matches!(err, ImpalaError::Config(ConfigError::InvalidCount { .. })));
    }
}
