//! Tunable parameters of the simulation core.

use serde::Deserialize;
use thiserror::Error;

/// How the planning phase schedules per-ghost work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanningStrategy {
    /// One rayon task per ghost, joined before the apply phase.
    #[default]
    Parallel,
    /// Ghosts plan one after another on the calling thread.
    Sequential,
}

/// Configuration parameters required to construct the world.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Master-clock ticks per update tick; planning and apply run when it divides the tick index.
    pub update_period: u32,
    /// Update ticks a ghost stays frightened after a super pellet.
    pub fright_cycles: u8,
    /// Points for an ordinary pellet.
    pub pellet_points: u32,
    /// Points for a super pellet.
    pub super_pellet_points: u32,
    /// Points for eating a frightened ghost.
    pub ghost_eat_points: u32,
    /// Remaining-pellet counts releasing the first and second fruit.
    pub fruit_thresholds: [u16; 2],
    /// Seed from which every ghost's random stream is derived.
    pub rng_seed: u64,
    /// Scheduling of the planning phase.
    pub planning: PlanningStrategy,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            update_period: 12,
            fright_cycles: 40,
            pellet_points: 10,
            super_pellet_points: 50,
            ghost_eat_points: 200,
            fruit_thresholds: [174, 74],
            rng_seed: 0x5eed_c0de_9a57_1e55,
            planning: PlanningStrategy::Parallel,
        }
    }
}

impl WorldConfig {
    /// Checks the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_period == 0 {
            return Err(ConfigError::ZeroUpdatePeriod);
        }
        if self.fright_cycles == 0 {
            return Err(ConfigError::ZeroFrightCycles);
        }
        let [first, second] = self.fruit_thresholds;
        if first <= second {
            return Err(ConfigError::FruitThresholdOrder { first, second });
        }
        Ok(())
    }
}

/// Reasons a [`WorldConfig`] may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The update period must divide tick indices, so it cannot be zero.
    #[error("update period must be at least one tick")]
    ZeroUpdatePeriod,
    /// A super pellet must frighten ghosts for at least one update tick.
    #[error("fright duration must be at least one update tick")]
    ZeroFrightCycles,
    /// The first fruit must be released before the second as pellets run out.
    #[error("first fruit threshold {first} must exceed second threshold {second}")]
    FruitThresholdOrder {
        /// First threshold supplied.
        first: u16,
        /// Second threshold supplied.
        second: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_update_period_is_rejected() {
        let config = WorldConfig {
            update_period: 0,
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroUpdatePeriod));
    }

    #[test]
    fn fruit_thresholds_must_descend() {
        let config = WorldConfig {
            fruit_thresholds: [74, 174],
            ..WorldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::FruitThresholdOrder {
                first: 74,
                second: 174
            })
        );
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: WorldConfig = toml::from_str(
            "fright_cycles = 20\nfruit_thresholds = [200, 100]\nplanning = \"sequential\"\n",
        )
        .expect("config parses");

        assert_eq!(config.fright_cycles, 20);
        assert_eq!(config.fruit_thresholds, [200, 100]);
        assert_eq!(config.planning, PlanningStrategy::Sequential);
        assert_eq!(config.update_period, 12);
        assert_eq!(config.validate(), Ok(()));
    }
}
