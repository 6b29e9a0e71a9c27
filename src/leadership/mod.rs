use std::time::Duration;

pub mod notifier;
pub mod randomized_election_timer;

/// Role of the node in the replica set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum NodeStatus {
    #[display(fmt = "FOLLOWER")]
    Follower,

    #[display(fmt = "CANDIDATE")]
    Candidate,

    #[display(fmt = "LEADER")]
    Leader,
}

/// Source of election timeouts. Asked for a fresh duration on every timer reset.
pub trait ElectionTimer: Send + 'static {
    fn next_elections_timeout(&self) -> Duration;
}
