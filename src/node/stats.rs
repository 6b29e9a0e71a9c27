use crate::leadership::NodeStatus;

/// Point-in-time view of the election state, taken under the election worker.
#[derive(Clone, Debug, Eq, PartialEq, Display)]
#[display(
    fmt = "Node {} status {} term {} leader {:?} peers {} running {}",
    self_address,
    status,
    current_term,
    current_leader,
    peer_count,
    running
)]
pub struct ElectionStats {
    pub self_address: String,
    pub status: NodeStatus,
    pub current_term: u64,
    pub current_leader: Option<String>,
    pub voted_for: Option<String>,

    /// Configured members excluding self.
    pub peer_count: usize,
    pub quorum_size: usize,

    /// Votes gathered by the current candidacy, self included.
    pub votes_received: usize,
    pub last_log_index: u64,
    pub last_log_term: u64,
    pub commit_index: u64,
    pub running: bool,
}

impl ElectionStats {
    pub fn is_leader(&self) -> bool {
        self.status == NodeStatus::Leader
    }
}
