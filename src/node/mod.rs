use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::common::{run_worker, WorkerPool};
use crate::communication::peers::{
    AppendEntriesRequest, AppendEntriesResponse, PeerRequestHandler, VoteRequest, VoteResponse,
};
use crate::configuration::ElectionConfig;
use crate::errors::{ElectionError, Result};
use crate::leadership::notifier::{
    run_leadership_notifier, LeadershipCallbackSlot, LeadershipNotifierParams,
};
use crate::leadership::randomized_election_timer::RandomizedElectionTimer;
use crate::leadership::{ElectionTimer, NodeStatus};
use crate::node::state::{ElectionState, NodeState, NodeStateSaver, VolatileNodeState};
use crate::node::stats::ElectionStats;
use crate::node::worker::{run_election_worker, ElectionCommand, ElectionWorkerParams};

pub mod state;
pub mod stats;
mod peer_sender;
mod worker;

/// Everything needed to create an ElectionManager with custom timer and persistence.
#[derive(Debug)]
pub struct ElectionManagerParams<Pc, Et, Ns>
where
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Ns: NodeStateSaver,
{
    pub self_address: String,
    /// Full member list, self included.
    pub peer_addresses: Vec<String>,
    pub config: ElectionConfig,
    pub peer_communicator: Pc,
    pub election_timer: Et,
    pub state_saver: Ns,
    /// Term and vote restored from a previous run.
    pub initial_state: NodeState,
}

/// Leader election for one member of a replica set.
///
/// The state lives on a dedicated election worker thread; every method is a synchronous
/// request to that worker, so reads never observe a half-applied transition. Outbound
/// RPCs go through the provided PeerRequestHandler, inbound RPCs must be passed to
/// `handle_vote_request` and `handle_append_entries` by the transport.
pub struct ElectionManager {
    self_address: String,
    command_tx: Sender<ElectionCommand>,
    leadership_callback: LeadershipCallbackSlot,
    workers: Option<WorkerPool>,
}

impl ElectionManager {
    /// Creates a manager with randomized election timeouts from the config and no persistence.
    pub fn new<Pc>(
        self_address: impl Into<String>,
        peer_addresses: Vec<String>,
        config: ElectionConfig,
        peer_communicator: Pc,
    ) -> Result<ElectionManager>
    where
        Pc: PeerRequestHandler,
    {
        config.validate()?;
        let election_timer = RandomizedElectionTimer::from_config(&config)?;

        ElectionManager::from_params(ElectionManagerParams {
            self_address: self_address.into(),
            peer_addresses,
            config,
            peer_communicator,
            election_timer,
            state_saver: VolatileNodeState,
            initial_state: NodeState::default(),
        })
    }

    pub fn from_params<Pc, Et, Ns>(params: ElectionManagerParams<Pc, Et, Ns>) -> Result<ElectionManager>
    where
        Pc: PeerRequestHandler,
        Et: ElectionTimer,
        Ns: NodeStateSaver,
    {
        let self_address = params.self_address.clone();
        let state = ElectionState::new(
            params.self_address,
            params.peer_addresses,
            &params.config,
            params.election_timer,
            params.state_saver,
            params.initial_state,
        )?;

        let (command_tx, command_rx): (Sender<ElectionCommand>, Receiver<ElectionCommand>) =
            crossbeam_channel::unbounded();
        let (leadership_event_tx, leadership_event_rx): (Sender<bool>, Receiver<bool>) =
            crossbeam_channel::unbounded();
        let leadership_callback: LeadershipCallbackSlot = Arc::new(RwLock::new(None));

        let election_worker = run_worker(
            run_election_worker,
            ElectionWorkerParams {
                state,
                peer_communicator: params.peer_communicator,
                command_tx: command_tx.clone(),
                command_rx,
                leadership_event_tx,
            },
        );

        let notifier_worker = run_worker(
            run_leadership_notifier,
            LeadershipNotifierParams {
                node_address: self_address.clone(),
                leadership_event_rx,
                callback: leadership_callback.clone(),
            },
        );

        Ok(ElectionManager {
            self_address,
            command_tx,
            leadership_callback,
            workers: Some(WorkerPool::new(vec![election_worker, notifier_worker])),
        })
    }

    pub fn self_address(&self) -> &str {
        &self.self_address
    }

    /// Arms the timers. A single-member replica set becomes the leader immediately.
    pub fn start(&self) -> Result<()> {
        self.request(ElectionCommand::Start)
    }

    /// Cancels the timers. The manager answers queries afterwards but cannot be started again.
    pub fn stop(&self) -> Result<()> {
        self.request(ElectionCommand::Stop)
    }

    pub fn handle_vote_request(&self, request: VoteRequest) -> Result<VoteResponse> {
        self.request(|reply_tx| ElectionCommand::VoteRequest(request, reply_tx))
    }

    pub fn handle_append_entries(&self, request: AppendEntriesRequest) -> Result<AppendEntriesResponse> {
        self.request(|reply_tx| ElectionCommand::AppendEntries(request, reply_tx))
    }

    /// Sets the last log position compared against candidates' logs.
    pub fn update_log_index(&self, index: u64, term: u64) -> Result<()> {
        self.request(|reply_tx| ElectionCommand::UpdateLogIndex {
            index,
            term,
            reply_tx,
        })
    }

    /// Sets the commit index advertised in heartbeats.
    pub fn update_commit_index(&self, index: u64) -> Result<()> {
        self.request(|reply_tx| ElectionCommand::UpdateCommitIndex { index, reply_tx })
    }

    pub fn step_down(&self) -> Result<()> {
        self.request(ElectionCommand::StepDown)
    }

    pub fn stats(&self) -> Result<ElectionStats> {
        self.request(ElectionCommand::Stats)
    }

    pub fn status(&self) -> Result<NodeStatus> {
        self.stats().map(|stats| stats.status)
    }

    pub fn is_leader(&self) -> bool {
        match self.stats() {
            Ok(stats) => stats.is_leader(),
            Err(err) => {
                error!("Node {} Cannot get leadership status: {}", self.self_address, err);
                false
            }
        }
    }

    pub fn current_term(&self) -> Result<u64> {
        self.stats().map(|stats| stats.current_term)
    }

    pub fn current_leader(&self) -> Result<Option<String>> {
        self.stats().map(|stats| stats.current_leader)
    }

    /// Registers the leadership change observer, replacing the previous one. It runs on a
    /// separate thread and may call back into the manager.
    pub fn set_on_leadership_change<F>(&self, callback: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        *self.leadership_callback.write() = Some(Arc::new(callback));
    }

    fn request<T, F>(&self, command_creator: F) -> Result<T>
    where
        F: FnOnce(Sender<T>) -> ElectionCommand,
    {
        let (reply_tx, reply_rx): (Sender<T>, Receiver<T>) = crossbeam_channel::bounded(1);

        if let Err(err) = self.command_tx.send(command_creator(reply_tx)) {
            return Err(ElectionError::WorkerUnavailable(err.to_string()));
        }

        reply_rx
            .recv()
            .map_err(|err| ElectionError::WorkerUnavailable(err.to_string()))
    }
}

impl fmt::Debug for ElectionManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ElectionManager")
            .field("self_address", &self.self_address)
            .finish()
    }
}

impl Drop for ElectionManager {
    fn drop(&mut self) {
        if let Some(workers) = self.workers.take() {
            workers.terminate();
            workers.join();
        }
        debug!("Node {} Election manager dropped", self.self_address);
    }
}
