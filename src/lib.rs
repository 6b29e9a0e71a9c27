//! # Replica set leader election
//!
//! Raft-style election of a single primary among the members of a replica set. Each member
//! runs an [ElectionManager](struct.ElectionManager.html): it keeps the term, the vote and
//! the role, runs the election timer and the leader heartbeat, and reports leadership
//! changes to the surrounding server. Log replication is not part of this crate: the log
//! position used for vote comparison is supplied from outside.
//!
//! The transport is pluggable: outbound RPCs go through a
//! [PeerRequestHandler](trait.PeerRequestHandler.html), inbound RPCs are passed to
//! `handle_vote_request` and `handle_append_entries`.

#![warn(missing_debug_implementations, unsafe_code)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate crossbeam_channel;
#[macro_use]
extern crate derive_more;

mod common;
mod communication;
mod configuration;
mod errors;
mod leadership;
mod node;

pub use common::{run_worker, Worker, WorkerPool};
pub use communication::peers::{
    AppendEntriesRequest, AppendEntriesResponse, PeerRequestHandler, VoteRequest, VoteResponse,
};
pub use configuration::ElectionConfig;
pub use errors::{communication_err, ElectionError, Result};
pub use leadership::randomized_election_timer::RandomizedElectionTimer;
pub use leadership::{ElectionTimer, NodeStatus};
pub use node::state::{NodeState, NodeStateSaver, VolatileNodeState};
pub use node::stats::ElectionStats;
pub use node::{ElectionManager, ElectionManagerParams};
