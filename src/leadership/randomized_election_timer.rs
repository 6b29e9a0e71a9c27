use rand::Rng;
use std::time::Duration;

use crate::configuration::ElectionConfig;
use crate::errors::{configuration_err, Result};
use crate::leadership::ElectionTimer;

/// Provides random time duration within a range. Different draws on competing candidates
/// is what breaks repeated split votes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RandomizedElectionTimer {
    range_start_ms: u64,
    range_stop_ms: u64,
}

impl RandomizedElectionTimer {
    /// Creates new RandomizedElectionTimer with an inclusive time range in milliseconds.
    pub fn new(range_start_ms: u64, range_stop_ms: u64) -> Result<RandomizedElectionTimer> {
        if range_start_ms > range_stop_ms || range_stop_ms == 0 {
            return configuration_err(format!(
                "Invalid election timer range: range_start_ms : {}, range_stop_ms : {}",
                range_start_ms, range_stop_ms
            ));
        }

        Ok(RandomizedElectionTimer {
            range_start_ms,
            range_stop_ms,
        })
    }

    pub fn from_config(config: &ElectionConfig) -> Result<RandomizedElectionTimer> {
        RandomizedElectionTimer::new(
            config.election_timeout_min().as_millis() as u64,
            config.election_timeout_max().as_millis() as u64,
        )
    }
}

impl ElectionTimer for RandomizedElectionTimer {
    fn next_elections_timeout(&self) -> Duration {
        let mut rng = rand::thread_rng();

        Duration::from_millis(rng.gen_range(self.range_start_ms..=self.range_stop_ms))
    }
}
