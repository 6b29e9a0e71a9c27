use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};

use crate::common::{run_worker, Worker};
use crate::communication::peers::{AppendEntriesRequest, PeerRequestHandler, VoteRequest};
use crate::node::worker::ElectionCommand;

/// Outbound request for a single peer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PeerMessage {
    Vote(VoteRequest),
    Heartbeat(AppendEntriesRequest),
}

/// Dedicated sender thread for one peer. At most one request is in flight and at most one
/// waits behind it: a newer request replaces the waiting one, so a peer that does not
/// answer delays nobody but itself.
#[derive(Debug)]
pub struct PeerSender {
    peer: String,
    message_tx: Sender<PeerMessage>,
    message_rx: Receiver<PeerMessage>,
    worker: Worker,
}

struct PeerSenderParams<Pc: PeerRequestHandler> {
    peer: String,
    peer_communicator: Pc,
    message_rx: Receiver<PeerMessage>,
    command_tx: Sender<ElectionCommand>,
}

impl PeerSender {
    pub fn start<Pc>(peer: String, peer_communicator: Pc, command_tx: Sender<ElectionCommand>) -> PeerSender
    where
        Pc: PeerRequestHandler,
    {
        let (message_tx, message_rx): (Sender<PeerMessage>, Receiver<PeerMessage>) =
            crossbeam_channel::bounded(1);

        let worker = run_worker(
            run_peer_sender,
            PeerSenderParams {
                peer: peer.clone(),
                peer_communicator,
                message_rx: message_rx.clone(),
                command_tx,
            },
        );

        PeerSender {
            peer,
            message_tx,
            message_rx,
            worker,
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Queues the message without blocking. A message still waiting for the peer is dropped.
    pub fn send(&self, message: PeerMessage) {
        let message = match self.message_tx.try_send(message) {
            Ok(()) => return,
            Err(TrySendError::Full(message)) => message,
            Err(TrySendError::Disconnected(_)) => {
                warn!("Peer {} sender is stopped", self.peer);
                return;
            }
        };

        match self.message_rx.try_recv() {
            Ok(outdated) => trace!("Peer {} is busy. Replaced {:?}", self.peer, outdated),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return,
        }

        if self.message_tx.try_send(message).is_err() {
            debug!("Peer {} is busy. Message dropped", self.peer);
        }
    }

    /// Stops the thread without waiting for the call in flight.
    pub fn terminate(self) {
        self.worker.terminate();
    }
}

fn run_peer_sender<Pc>(params: PeerSenderParams<Pc>, terminate_worker_rx: Receiver<()>)
where
    Pc: PeerRequestHandler,
{
    trace!("Peer {} sender started", params.peer);
    loop {
        select!(
            recv(terminate_worker_rx) -> _ => break,
            recv(params.message_rx) -> message_result => {
                match message_result {
                    Ok(message) => {
                        let command = send_to_peer(&params, message);
                        if params.command_tx.send(command).is_err() {
                            trace!("Peer {} response dropped: election worker stopped", params.peer);
                            break
                        }
                    }
                    Err(_) => break,
                }
            }
        );
    }
    trace!("Peer {} sender stopped", params.peer);
}

fn send_to_peer<Pc>(params: &PeerSenderParams<Pc>, message: PeerMessage) -> ElectionCommand
where
    Pc: PeerRequestHandler,
{
    let peer = params.peer.clone();
    match message {
        PeerMessage::Vote(request) => {
            let request_term = request.term;
            let response = params.peer_communicator.send_vote_request(&peer, request);
            ElectionCommand::VoteResponse {
                peer,
                request_term,
                response,
            }
        }
        PeerMessage::Heartbeat(request) => {
            let request_term = request.term;
            let response = params
                .peer_communicator
                .send_append_entries_request(&peer, request);
            ElectionCommand::AppendEntriesResponse {
                peer,
                request_term,
                response,
            }
        }
    }
}
