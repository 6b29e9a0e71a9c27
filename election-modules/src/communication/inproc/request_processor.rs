use crate::communication::inproc::inproc_peer_communicator::{
    AppendEntriesEnvelope, InProcPeerCommunicator, VoteEnvelope,
};

use crossbeam_channel::Receiver;
use election::{run_worker, ElectionManager, Worker};
use election::{communication_err, Result};

use std::sync::Arc;

/// Inbound side of the in-proc transport for one node.
#[derive(Debug)]
pub struct PeerRequestProcessorParams {
    pub manager: Arc<ElectionManager>,
    pub vote_request_rx: Receiver<VoteEnvelope>,
    pub append_entries_request_rx: Receiver<AppendEntriesEnvelope>,
}

impl PeerRequestProcessorParams {
    /// Takes the node's inbound channels from the communicator.
    pub fn new(
        manager: Arc<ElectionManager>,
        communicator: &InProcPeerCommunicator,
    ) -> Result<PeerRequestProcessorParams> {
        let address = manager.self_address().to_string();
        match (
            communicator.vote_request_rx(&address),
            communicator.append_entries_request_rx(&address),
        ) {
            (Some(vote_request_rx), Some(append_entries_request_rx)) => {
                Ok(PeerRequestProcessorParams {
                    manager,
                    vote_request_rx,
                    append_entries_request_rx,
                })
            }
            _ => communication_err(&address, "node is not registered in the communicator".to_string()),
        }
    }

    /// Starts processing inbound requests on a dedicated worker.
    pub fn serve(self) -> Worker {
        run_worker(run_peer_request_processor, self)
    }
}

/// Passes inbound peer requests to the election manager and sends its answers back.
/// A request that the manager cannot answer is dropped: the caller sees a communication error.
pub fn run_peer_request_processor(
    params: PeerRequestProcessorParams,
    terminate_worker_rx: Receiver<()>,
) {
    let address = params.manager.self_address().to_string();
    info!("Node {} Peer request processor started", address);
    loop {
        select!(
            recv(terminate_worker_rx) -> res  => {
                if res.is_err() {
                    error!("Abnormal exit for peer request processor");
                }
                break
            },
            recv(params.vote_request_rx) -> envelope_result => {
                match envelope_result {
                    Ok(envelope) => {
                        match params.manager.handle_vote_request(envelope.request.clone()) {
                            Ok(response) => envelope.respond(response),
                            Err(err) => error!("Node {} Vote request failed: {}", address, err),
                        }
                    }
                    Err(err) => {
                        error!("Invalid result from vote_request_rx: {}", err);
                        break
                    }
                }
            },
            recv(params.append_entries_request_rx) -> envelope_result => {
                match envelope_result {
                    Ok(envelope) => {
                        match params.manager.handle_append_entries(envelope.request.clone()) {
                            Ok(response) => envelope.respond(response),
                            Err(err) => error!("Node {} Append entries request failed: {}", address, err),
                        }
                    }
                    Err(err) => {
                        error!("Invalid result from append_entries_request_rx: {}", err);
                        break
                    }
                }
            }
        );
    }
    info!("Node {} Peer request processor stopped", address);
}
