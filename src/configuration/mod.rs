use std::time::Duration;

use crate::errors::{configuration_err, Result};

/// Election tunables. Built once with the chained setters, read-only afterwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ElectionConfig {
    election_timeout_min: Duration,
    election_timeout_max: Duration,
    heartbeat_interval: Duration,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        ElectionConfig {
            election_timeout_min: Duration::from_millis(150),
            election_timeout_max: Duration::from_millis(300),
            heartbeat_interval: Duration::from_millis(50),
        }
    }
}

impl ElectionConfig {
    /// Lower bound of the randomized follower/candidate timeout.
    pub fn with_election_timeout_min(mut self, millis: u64) -> Self {
        self.election_timeout_min = Duration::from_millis(millis);
        self
    }

    /// Upper bound (inclusive) of the randomized follower/candidate timeout.
    pub fn with_election_timeout_max(mut self, millis: u64) -> Self {
        self.election_timeout_max = Duration::from_millis(millis);
        self
    }

    /// Period between two leader heartbeats.
    pub fn with_heartbeat_interval(mut self, millis: u64) -> Self {
        self.heartbeat_interval = Duration::from_millis(millis);
        self
    }

    pub fn election_timeout_min(&self) -> Duration {
        self.election_timeout_min
    }

    pub fn election_timeout_max(&self) -> Duration {
        self.election_timeout_max
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Checks the bounds. A heartbeat interval not below the minimal election timeout
    /// lets followers time out under a healthy leader, so it is rejected.
    pub fn validate(&self) -> Result<()> {
        if self.election_timeout_min == Duration::from_millis(0) {
            return configuration_err("election timeout min must be positive".to_string());
        }
        if self.heartbeat_interval == Duration::from_millis(0) {
            return configuration_err("heartbeat interval must be positive".to_string());
        }
        if self.election_timeout_min >= self.election_timeout_max {
            return configuration_err(format!(
                "election timeout min ({:?}) must be less than max ({:?})",
                self.election_timeout_min, self.election_timeout_max
            ));
        }
        if self.heartbeat_interval >= self.election_timeout_min {
            return configuration_err(format!(
                "heartbeat interval ({:?}) must be less than election timeout min ({:?})",
                self.heartbeat_interval, self.election_timeout_min
            ));
        }
        if self.heartbeat_interval * 2 > self.election_timeout_min {
            warn!(
                "Heartbeat interval {:?} leaves a narrow margin to election timeout min {:?}",
                self.heartbeat_interval, self.election_timeout_min
            );
        }

        Ok(())
    }
}
