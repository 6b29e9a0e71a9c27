use crossbeam_channel::{Receiver, Sender};
use std::time::Instant;

use crate::communication::peers::{
    AppendEntriesRequest, AppendEntriesResponse, PeerRequestHandler, VoteRequest, VoteResponse,
};
use crate::errors::Result;
use crate::leadership::ElectionTimer;
use crate::node::peer_sender::{PeerMessage, PeerSender};
use crate::node::state::{ElectionEffect, ElectionState, NodeStateSaver};
use crate::node::stats::ElectionStats;

/// Requests to the election worker. Synchronous calls carry a reply channel.
pub enum ElectionCommand {
    Start(Sender<()>),
    Stop(Sender<()>),
    VoteRequest(VoteRequest, Sender<VoteResponse>),
    AppendEntries(AppendEntriesRequest, Sender<AppendEntriesResponse>),
    VoteResponse {
        peer: String,
        request_term: u64,
        response: Result<VoteResponse>,
    },
    AppendEntriesResponse {
        peer: String,
        request_term: u64,
        response: Result<AppendEntriesResponse>,
    },
    UpdateLogIndex {
        index: u64,
        term: u64,
        reply_tx: Sender<()>,
    },
    UpdateCommitIndex {
        index: u64,
        reply_tx: Sender<()>,
    },
    StepDown(Sender<()>),
    Stats(Sender<ElectionStats>),
}

pub struct ElectionWorkerParams<Pc, Et, Ns>
where
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Ns: NodeStateSaver,
{
    pub state: ElectionState<Et, Ns>,
    pub peer_communicator: Pc,
    pub command_tx: Sender<ElectionCommand>,
    pub command_rx: Receiver<ElectionCommand>,
    pub leadership_event_tx: Sender<bool>,
}

/// Single owner of the election state. Commands, timer expirations and peer answers are
/// applied one at a time; network calls run elsewhere and come back as commands.
pub fn run_election_worker<Pc, Et, Ns>(
    mut params: ElectionWorkerParams<Pc, Et, Ns>,
    terminate_worker_rx: Receiver<()>,
) where
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Ns: NodeStateSaver,
{
    info!("Node {} Election worker started", params.state.self_address());
    let command_rx = params.command_rx.clone();
    let peer_senders: Vec<PeerSender> = params
        .state
        .peers()
        .iter()
        .map(|peer| {
            PeerSender::start(
                peer.clone(),
                params.peer_communicator.clone(),
                params.command_tx.clone(),
            )
        })
        .collect();
    loop {
        let timeout = match params.state.next_deadline() {
            Some(deadline) => crossbeam_channel::at(deadline),
            None => crossbeam_channel::never(),
        };

        select!(
            recv(terminate_worker_rx) -> res  => {
                if res.is_err() {
                    error!("Abnormal exit for election worker");
                }
                break
            },
            recv(timeout) -> _ => {
                params.state.on_timer(Instant::now());
            },
            recv(command_rx) -> command_result => {
                match command_result {
                    Ok(command) => process_command(&mut params, command),
                    Err(err) => {
                        error!("Invalid result from command_rx: {}", err);
                        break
                    }
                }
            }
        );

        dispatch_effects(&mut params, &peer_senders);
    }

    for peer_sender in peer_senders {
        peer_sender.terminate();
    }
    info!("Node {} Election worker stopped", params.state.self_address());
}

fn process_command<Pc, Et, Ns>(params: &mut ElectionWorkerParams<Pc, Et, Ns>, command: ElectionCommand)
where
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Ns: NodeStateSaver,
{
    let now = Instant::now();
    let state = &mut params.state;

    match command {
        ElectionCommand::Start(reply_tx) => {
            state.start(now);
            reply(reply_tx, ());
        }
        ElectionCommand::Stop(reply_tx) => {
            state.stop();
            reply(reply_tx, ());
        }
        ElectionCommand::VoteRequest(request, reply_tx) => {
            trace!("Node {} Received {}", state.self_address(), request);
            let response = state.handle_vote_request(&request, now);
            reply(reply_tx, response);
        }
        ElectionCommand::AppendEntries(request, reply_tx) => {
            trace!("Node {} Received {}", state.self_address(), request);
            let response = state.handle_append_entries(&request, now);
            reply(reply_tx, response);
        }
        ElectionCommand::VoteResponse {
            peer,
            request_term,
            response,
        } => state.handle_vote_response(peer, request_term, response, now),
        ElectionCommand::AppendEntriesResponse {
            peer,
            request_term,
            response,
        } => state.handle_append_entries_response(peer, request_term, response, now),
        ElectionCommand::UpdateLogIndex {
            index,
            term,
            reply_tx,
        } => {
            state.update_log_index(index, term);
            reply(reply_tx, ());
        }
        ElectionCommand::UpdateCommitIndex { index, reply_tx } => {
            state.update_commit_index(index);
            reply(reply_tx, ());
        }
        ElectionCommand::StepDown(reply_tx) => {
            state.step_down(now);
            reply(reply_tx, ());
        }
        ElectionCommand::Stats(reply_tx) => {
            reply(reply_tx, state.stats());
        }
    }
}

fn reply<T>(reply_tx: Sender<T>, value: T) {
    if reply_tx.send(value).is_err() {
        warn!("Election worker reply dropped: caller is gone");
    }
}

fn dispatch_effects<Pc, Et, Ns>(params: &mut ElectionWorkerParams<Pc, Et, Ns>, peer_senders: &[PeerSender])
where
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Ns: NodeStateSaver,
{
    for effect in params.state.take_effects() {
        match effect {
            ElectionEffect::RequestVotes(request) => {
                trace!("Node {} Sending {}", params.state.self_address(), request);
                send_to_peers(peer_senders, PeerMessage::Vote(request));
            }
            ElectionEffect::SendHeartbeats(request) => {
                trace!("Node {} Sending {}", params.state.self_address(), request);
                send_to_peers(peer_senders, PeerMessage::Heartbeat(request));
            }
            ElectionEffect::LeadershipChanged(is_leader) => {
                if params.leadership_event_tx.send(is_leader).is_err() {
                    error!(
                        "Node {} Cannot deliver leadership change: notifier is gone",
                        params.state.self_address()
                    );
                }
            }
        }
    }
}

fn send_to_peers(peer_senders: &[PeerSender], message: PeerMessage) {
    for peer_sender in peer_senders {
        peer_sender.send(message.clone());
    }
}
