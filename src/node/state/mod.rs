use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::communication::peers::{
    AppendEntriesRequest, AppendEntriesResponse, VoteRequest, VoteResponse,
};
use crate::configuration::ElectionConfig;
use crate::errors::{configuration_err, Result};
use crate::leadership::{ElectionTimer, NodeStatus};
use crate::node::stats::ElectionStats;


/// Part of the election state that must survive a restart for a node not to vote twice
/// in the same term.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Display)]
#[display(fmt = "Node state: current_term {} voted_for {:?}", current_term, voted_for)]
pub struct NodeState {
    pub current_term: u64,
    pub voted_for: Option<String>,
}

/// Persistence for the NodeState. Called on every term or vote change. Errors are logged only.
pub trait NodeStateSaver: Send + 'static {
    fn save_node_state(&self, state: &NodeState) -> Result<()>;
}

/// Keeps nothing: term and vote are lost on restart.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct VolatileNodeState;

impl NodeStateSaver for VolatileNodeState {
    fn save_node_state(&self, state: &NodeState) -> Result<()> {
        trace!("{} is not persisted", state);

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/// Work requested by a state transition and carried out by the election worker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ElectionEffect {
    RequestVotes(VoteRequest),
    SendHeartbeats(AppendEntriesRequest),
    LeadershipChanged(bool),
}

/// Election state machine. Knows nothing about threads or transport: every input carries
/// the current instant, every output is an ElectionEffect or a timer deadline.
pub struct ElectionState<Et, Ns>
where
    Et: ElectionTimer,
    Ns: NodeStateSaver,
{
    self_address: String,
    peers: Vec<String>,
    quorum_size: usize,

    current_term: u64,
    voted_for: Option<String>,
    status: NodeStatus,
    current_leader: Option<String>,
    votes_received: HashSet<String>,

    last_log_index: u64,
    last_log_term: u64,
    commit_index: u64,

    lifecycle: Lifecycle,
    election_deadline: Option<Instant>,
    heartbeat_deadline: Option<Instant>,
    heartbeat_interval: Duration,
    election_timer: Et,
    state_saver: Ns,

    effects: Vec<ElectionEffect>,
}

impl<Et, Ns> ElectionState<Et, Ns>
where
    Et: ElectionTimer,
    Ns: NodeStateSaver,
{
    /// `peer_addresses` is the full member list, self included.
    pub fn new(
        self_address: String,
        peer_addresses: Vec<String>,
        config: &ElectionConfig,
        election_timer: Et,
        state_saver: Ns,
        initial_state: NodeState,
    ) -> Result<ElectionState<Et, Ns>> {
        config.validate()?;
        let peers = cluster_peers(&self_address, peer_addresses)?;
        let cluster_size = peers.len() + 1;

        Ok(ElectionState {
            self_address,
            peers,
            quorum_size: cluster_size / 2 + 1,
            current_term: initial_state.current_term,
            voted_for: initial_state.voted_for,
            status: NodeStatus::Follower,
            current_leader: None,
            votes_received: HashSet::new(),
            last_log_index: 0,
            last_log_term: 0,
            commit_index: 0,
            lifecycle: Lifecycle::Created,
            election_deadline: None,
            heartbeat_deadline: None,
            heartbeat_interval: config.heartbeat_interval(),
            election_timer,
            state_saver,
            effects: Vec::new(),
        })
    }

    pub fn self_address(&self) -> &str {
        &self.self_address
    }
    pub fn peers(&self) -> &[String] {
        &self.peers
    }
    pub fn quorum_size(&self) -> usize {
        self.quorum_size
    }
    pub fn status(&self) -> NodeStatus {
        self.status
    }
    pub fn current_term(&self) -> u64 {
        self.current_term
    }
    pub fn voted_for(&self) -> Option<&str> {
        self.voted_for.as_deref()
    }
    pub fn current_leader(&self) -> Option<&str> {
        self.current_leader.as_deref()
    }
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }
    pub fn election_deadline(&self) -> Option<Instant> {
        self.election_deadline
    }
    pub fn heartbeat_deadline(&self) -> Option<Instant> {
        self.heartbeat_deadline
    }

    /// Earliest armed timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.election_deadline, self.heartbeat_deadline) {
            (Some(election), Some(heartbeat)) => Some(election.min(heartbeat)),
            (election, None) => election,
            (None, heartbeat) => heartbeat,
        }
    }

    /// Effects accumulated since the previous call.
    pub fn take_effects(&mut self) -> Vec<ElectionEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Arms the election timer. A single-member cluster elects itself right away.
    pub fn start(&mut self, now: Instant) {
        match self.lifecycle {
            Lifecycle::Created => {}
            Lifecycle::Running => {
                warn!("Node {} is already started", self.self_address);
                return;
            }
            Lifecycle::Stopped => {
                warn!("Node {} was stopped and cannot be restarted", self.self_address);
                return;
            }
        }

        self.lifecycle = Lifecycle::Running;
        info!(
            "Node {} started. Cluster size {}, quorum {}, term {}",
            self.self_address,
            self.peers.len() + 1,
            self.quorum_size,
            self.current_term
        );

        if self.peers.is_empty() {
            self.start_election(now);
        } else {
            self.reset_election_timer(now);
        }
    }

    /// Disarms both timers. A leader gives up its leadership.
    pub fn stop(&mut self) {
        if self.lifecycle == Lifecycle::Stopped {
            return;
        }

        if self.status == NodeStatus::Leader {
            self.current_leader = None;
            self.effects.push(ElectionEffect::LeadershipChanged(false));
        }
        self.status = NodeStatus::Follower;
        self.votes_received.clear();
        self.lifecycle = Lifecycle::Stopped;
        self.election_deadline = None;
        self.heartbeat_deadline = None;

        info!("Node {} stopped in term {}", self.self_address, self.current_term);
    }

    /// Fires the expired timers.
    pub fn on_timer(&mut self, now: Instant) {
        if !self.is_running() {
            return;
        }

        if let Some(deadline) = self.election_deadline {
            if deadline <= now {
                info!(
                    "Node {} Leader awaiting time elapsed. Starting new election",
                    self.self_address
                );
                self.start_election(now);
            }
        }

        if self.status == NodeStatus::Leader {
            if let Some(deadline) = self.heartbeat_deadline {
                if deadline <= now {
                    self.send_heartbeats(now);
                }
            }
        }
    }

    pub fn handle_vote_request(&mut self, request: &VoteRequest, now: Instant) -> VoteResponse {
        if self.lifecycle == Lifecycle::Stopped {
            return self.vote_response(false);
        }

        if request.term > self.current_term {
            info!(
                "Node {} Discovered higher term {} from candidate {}",
                self.self_address, request.term, request.candidate_id
            );
            self.adopt_term(request.term);
            if self.status != NodeStatus::Follower {
                self.become_follower(now);
            }
        }

        if request.term < self.current_term {
            debug!(
                "Node {} Vote denied to {}: stale term {} < {}",
                self.self_address, request.candidate_id, request.term, self.current_term
            );
            return self.vote_response(false);
        }

        if !self.candidate_log_is_up_to_date(request.last_log_term, request.last_log_index) {
            debug!(
                "Node {} Vote denied to {}: candidate log ({}, {}) is older than ({}, {})",
                self.self_address,
                request.candidate_id,
                request.last_log_term,
                request.last_log_index,
                self.last_log_term,
                self.last_log_index
            );
            return self.vote_response(false);
        }

        match &self.voted_for {
            Some(voted_for) if voted_for != &request.candidate_id => {
                debug!(
                    "Node {} Vote denied to {}: already voted for {} in term {}",
                    self.self_address, request.candidate_id, voted_for, self.current_term
                );
                return self.vote_response(false);
            }
            Some(_) => {}
            None => {
                let term = self.current_term;
                self.set_term_and_vote(term, Some(request.candidate_id.clone()));
            }
        }

        info!(
            "Node {} Voted for {} in term {}",
            self.self_address, request.candidate_id, self.current_term
        );
        self.reset_election_timer(now);

        self.vote_response(true)
    }

    pub fn handle_append_entries(
        &mut self,
        request: &AppendEntriesRequest,
        now: Instant,
    ) -> AppendEntriesResponse {
        if self.lifecycle == Lifecycle::Stopped || request.term < self.current_term {
            debug!(
                "Node {} Rejected heartbeat from {} for term {}. Current term {}",
                self.self_address, request.leader_id, request.term, self.current_term
            );
            return AppendEntriesResponse {
                term: self.current_term,
                success: false,
            };
        }

        self.adopt_term(request.term);

        if self.current_leader.as_deref() != Some(request.leader_id.as_str()) {
            info!(
                "Node {} Recognized leader {} for term {}",
                self.self_address, request.leader_id, request.term
            );
            self.current_leader = Some(request.leader_id.clone());
        }

        if self.status != NodeStatus::Follower {
            self.become_follower(now);
        } else {
            self.reset_election_timer(now);
        }

        AppendEntriesResponse {
            term: self.current_term,
            success: true,
        }
    }

    /// Applies a vote answer for the candidacy started in `request_term`.
    pub fn handle_vote_response(
        &mut self,
        peer: String,
        request_term: u64,
        response: Result<VoteResponse>,
        now: Instant,
    ) {
        if !self.is_running() {
            trace!("Node {} Vote response from {} ignored: not running", self.self_address, peer);
            return;
        }

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                debug!("Node {} No vote from {}: {}", self.self_address, peer, err);
                return;
            }
        };

        if response.term > self.current_term {
            info!(
                "Node {} Peer {} answered with higher term {}. Stepping down",
                self.self_address, peer, response.term
            );
            self.adopt_term(response.term);
            if self.status != NodeStatus::Follower {
                self.become_follower(now);
            }
            return;
        }

        if self.status != NodeStatus::Candidate || request_term != self.current_term {
            trace!(
                "Node {} Stale vote response from {} for term {} discarded",
                self.self_address, peer, request_term
            );
            return;
        }

        if !response.vote_granted {
            debug!("Node {} Vote refused by {}", self.self_address, peer);
            return;
        }

        self.votes_received.insert(peer);
        debug!(
            "Node {} Votes {} of {} in term {}",
            self.self_address,
            self.votes_received.len(),
            self.quorum_size,
            self.current_term
        );

        if self.votes_received.len() >= self.quorum_size {
            info!(
                "Leader election - quorum ({}) gathered for Node {}",
                self.quorum_size, self.self_address
            );
            self.become_leader(now);
        }
    }

    /// A heartbeat answer only matters when it reveals a newer term.
    pub fn handle_append_entries_response(
        &mut self,
        peer: String,
        request_term: u64,
        response: Result<AppendEntriesResponse>,
        now: Instant,
    ) {
        if !self.is_running() {
            return;
        }

        match response {
            Ok(response) if response.term > self.current_term => {
                info!(
                    "Node {} Peer {} answered heartbeat of term {} with higher term {}. Stepping down",
                    self.self_address, peer, request_term, response.term
                );
                self.adopt_term(response.term);
                if self.status != NodeStatus::Follower {
                    self.become_follower(now);
                }
            }
            Ok(_) => {}
            Err(err) => trace!("Node {} Heartbeat to {} failed: {}", self.self_address, peer, err),
        }
    }

    pub fn update_log_index(&mut self, index: u64, term: u64) {
        debug!(
            "Node {} Last log entry updated: index {} term {}",
            self.self_address, index, term
        );
        self.last_log_index = index;
        self.last_log_term = term;
    }

    pub fn update_commit_index(&mut self, index: u64) {
        self.commit_index = index;
    }

    /// Leaves leadership or candidacy without touching the term.
    pub fn step_down(&mut self, now: Instant) {
        match self.status {
            NodeStatus::Follower => self.reset_election_timer(now),
            NodeStatus::Candidate | NodeStatus::Leader => {
                info!(
                    "Node {} Stepping down in term {}",
                    self.self_address, self.current_term
                );
                if self.status == NodeStatus::Leader {
                    self.current_leader = None;
                }
                self.become_follower(now);
            }
        }
    }

    pub fn stats(&self) -> ElectionStats {
        ElectionStats {
            self_address: self.self_address.clone(),
            status: self.status,
            current_term: self.current_term,
            current_leader: self.current_leader.clone(),
            voted_for: self.voted_for.clone(),
            peer_count: self.peers.len(),
            quorum_size: self.quorum_size,
            votes_received: self.votes_received.len(),
            last_log_index: self.last_log_index,
            last_log_term: self.last_log_term,
            commit_index: self.commit_index,
            running: self.is_running(),
        }
    }

    fn start_election(&mut self, now: Instant) {
        let next_term = self.current_term + 1;
        let self_address = self.self_address.clone();

        self.status = NodeStatus::Candidate;
        self.current_leader = None;
        self.votes_received.clear();
        self.votes_received.insert(self_address.clone());
        self.set_term_and_vote(next_term, Some(self_address));

        info!(
            "Node {} Status changed to Candidate for term {}",
            self.self_address, self.current_term
        );

        if self.votes_received.len() >= self.quorum_size {
            self.become_leader(now);
            return;
        }

        self.effects.push(ElectionEffect::RequestVotes(VoteRequest {
            term: self.current_term,
            candidate_id: self.self_address.clone(),
            last_log_index: self.last_log_index,
            last_log_term: self.last_log_term,
        }));
        self.reset_election_timer(now);
    }

    fn become_leader(&mut self, now: Instant) {
        let was_leader = self.status == NodeStatus::Leader;

        self.status = NodeStatus::Leader;
        self.current_leader = Some(self.self_address.clone());
        self.election_deadline = None;

        info!(
            "Node {} Status changed to Leader for term {}",
            self.self_address, self.current_term
        );

        if !was_leader {
            self.effects.push(ElectionEffect::LeadershipChanged(true));
        }
        self.send_heartbeats(now);
    }

    fn become_follower(&mut self, now: Instant) {
        let was_leader = self.status == NodeStatus::Leader;

        if self.status != NodeStatus::Follower {
            info!(
                "Node {} Status changed to Follower for term {}",
                self.self_address, self.current_term
            );
        }

        self.status = NodeStatus::Follower;
        self.heartbeat_deadline = None;
        self.votes_received.clear();

        if was_leader {
            self.effects.push(ElectionEffect::LeadershipChanged(false));
        }
        self.reset_election_timer(now);
    }

    fn send_heartbeats(&mut self, now: Instant) {
        if self.peers.is_empty() {
            self.heartbeat_deadline = None;
            return;
        }

        trace!(
            "Node {} Send 'empty Append Entries Request(heartbeat)'",
            self.self_address
        );
        self.effects
            .push(ElectionEffect::SendHeartbeats(AppendEntriesRequest {
                term: self.current_term,
                leader_id: self.self_address.clone(),
                prev_log_index: self.last_log_index,
                prev_log_term: self.last_log_term,
                commit_index: self.commit_index,
            }));
        self.heartbeat_deadline = Some(now + self.heartbeat_interval);
    }

    fn reset_election_timer(&mut self, now: Instant) {
        if !self.is_running() {
            self.election_deadline = None;
            return;
        }

        let timeout = self.election_timer.next_elections_timeout();
        trace!(
            "Node {} Election timer reset: {:?}",
            self.self_address,
            timeout
        );
        self.election_deadline = Some(now + timeout);
    }

    /// Moves to a newer term. The vote and the known leader belong to the old term.
    fn adopt_term(&mut self, term: u64) {
        if term > self.current_term {
            self.current_leader = None;
            self.set_term_and_vote(term, None);
        }
    }

    fn set_term_and_vote(&mut self, term: u64, voted_for: Option<String>) {
        self.current_term = term;
        self.voted_for = voted_for;

        let state = NodeState {
            current_term: self.current_term,
            voted_for: self.voted_for.clone(),
        };
        if let Err(err) = self.state_saver.save_node_state(&state) {
            error!("Node {} Node state save failed: {}", self.self_address, err);
        }
    }

    // Compares last log term first, index afterwards.
    fn candidate_log_is_up_to_date(&self, last_log_term: u64, last_log_index: u64) -> bool {
        (last_log_term, last_log_index) >= (self.last_log_term, self.last_log_index)
    }

    fn vote_response(&self, vote_granted: bool) -> VoteResponse {
        VoteResponse {
            term: self.current_term,
            vote_granted,
        }
    }
}

fn cluster_peers(self_address: &str, peer_addresses: Vec<String>) -> Result<Vec<String>> {
    if self_address.is_empty() {
        return configuration_err("self address is empty".to_string());
    }
    if peer_addresses.is_empty() {
        return configuration_err("peer list is empty".to_string());
    }

    let mut members = HashSet::new();
    let mut peers = Vec::new();
    for address in peer_addresses {
        if !members.insert(address.clone()) {
            warn!("Cluster configuration - duplicate peer: {}", address);
            continue;
        }
        if address != self_address {
            peers.push(address);
        }
    }

    if !members.contains(self_address) {
        return configuration_err(format!(
            "peer list does not contain self address {}",
            self_address
        ));
    }

    Ok(peers)
}
