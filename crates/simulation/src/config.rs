//! Simulation configuration.

/// Configuration for driving a run to completion.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Maximum number of rounds before a run is abandoned.
    ///
    /// The reference algorithms terminate within `2 * max_degree + 1`
    /// rounds; the limit only guards against algorithms that never stop.
    pub max_rounds: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { max_rounds: 1024 }
    }
}

impl SimulationConfig {
    /// Create a config with a custom round limit.
    pub fn with_max_rounds(max_rounds: u64) -> Self {
        Self {
            max_rounds,
            ..Default::default()
        }
    }
}
