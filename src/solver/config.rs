//! Solver configuration.

use crate::error::ConfigError;

/// Solver configuration.
///
/// The defaults run an exhaustive search with no budget, so every solve
/// ends `Optimal` or `Infeasible`. Setting a budget trades that guarantee
/// for bounded run time; an interrupted solve reports `Feasible`.
///
/// # Examples
///
/// ```
/// use who_dances_what::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(2_000)
///     .with_balance_load(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds. `None` = no limit.
    pub time_limit_ms: Option<u64>,

    /// Maximum number of search nodes. `None` = no limit.
    pub node_limit: Option<u64>,

    /// Stop after finding the first complete assignment.
    pub stop_after_first: bool,

    /// Among equally good assignments, prefer dancers who already hold
    /// fewer positions in earlier dances. Never changes the score.
    pub balance_load: bool,

    /// Number of parallel workers. Only used with the `parallel` feature.
    pub num_workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            node_limit: None,
            stop_after_first: false,
            balance_load: true,
            num_workers: 1,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    pub fn with_balance_load(mut self, balance: bool) -> Self {
        self.balance_load = balance;
        self
    }

    pub fn with_num_workers(mut self, workers: usize) -> Self {
        self.num_workers = workers;
        self
    }

    /// Whether any budget may cut the search short.
    pub fn is_bounded(&self) -> bool {
        self.time_limit_ms.is_some() || self.node_limit.is_some() || self.stop_after_first
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "time_limit_ms must be positive or absent".into(),
            ));
        }
        if self.node_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "node_limit must be positive or absent".into(),
            ));
        }
        if self.num_workers == 0 {
            return Err(ConfigError::Invalid(
                "num_workers must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parses and validates configuration from a TOML string.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
