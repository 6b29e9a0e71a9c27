use crate::errors::Result;

/// Vote request sent by a candidate at the start of its candidacy.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Vote request: term {} candidate {} last_log_index {} last_log_term {}",
    term,
    candidate_id,
    last_log_index,
    last_log_term
)]
pub struct VoteRequest {
    /// Candidate's term.
    pub term: u64,

    /// Candidate address.
    pub candidate_id: String,

    /// Index of the candidate's last log entry.
    pub last_log_index: u64,

    /// Term of the candidate's last log entry.
    pub last_log_term: u64,
}

/// Answer to the VoteRequest.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "Vote response: term {} vote_granted {}", term, vote_granted)]
pub struct VoteResponse {
    /// Voter's current term, for the candidate to update itself.
    pub term: u64,

    /// True means the candidate received the vote.
    pub vote_granted: bool,
}

/// Leader heartbeat. Carries no entries: logs are not replicated by this crate.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Append entries request: term {} leader {} prev_log_index {} prev_log_term {} commit_index {}",
    term,
    leader_id,
    prev_log_index,
    prev_log_term,
    commit_index
)]
pub struct AppendEntriesRequest {
    /// Leader's term.
    pub term: u64,

    /// Leader address, so followers can redirect clients.
    pub leader_id: String,

    /// Index of the leader's last known log entry.
    pub prev_log_index: u64,

    /// Term of the leader's last known log entry.
    pub prev_log_term: u64,

    /// Leader's commit index.
    pub commit_index: u64,
}

/// Answer to the AppendEntriesRequest.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "Append entries response: term {} success {}", term, success)]
pub struct AppendEntriesResponse {
    /// Receiver's current term, for the leader to update itself.
    pub term: u64,

    /// False when the request carried a stale term.
    pub success: bool,
}

/// Outbound side of the peer transport. Implemented by the surrounding server: the election
/// worker calls it from background threads, one call per peer, and treats an error as
/// "no response from that peer".
pub trait PeerRequestHandler: Send + Sync + Clone + 'static {
    fn send_vote_request(&self, destination: &str, request: VoteRequest) -> Result<VoteResponse>;
    fn send_append_entries_request(
        &self,
        destination: &str,
        request: AppendEntriesRequest,
    ) -> Result<AppendEntriesResponse>;
}
