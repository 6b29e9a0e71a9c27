use crate::communication::duplex_channel::{DuplexChannel, RequestEnvelope};

use crossbeam_channel::Receiver;
use election::{communication_err, Result};
use election::{
    AppendEntriesRequest, AppendEntriesResponse, PeerRequestHandler, VoteRequest, VoteResponse,
};
use parking_lot::RwLock;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

pub type VoteEnvelope = RequestEnvelope<VoteRequest, VoteResponse>;
pub type AppendEntriesEnvelope = RequestEnvelope<AppendEntriesRequest, AppendEntriesResponse>;

/// Basic in-memory implementation of the PeerRequestHandler trait. Clones share the
/// channels and the set of disconnected nodes, so one instance serves a whole replica set.
#[derive(Clone, Debug)]
pub struct InProcPeerCommunicator {
    timeout: Duration,
    votes_channels: HashMap<String, DuplexChannel<VoteRequest, VoteResponse>>,
    append_entries_channels:
        HashMap<String, DuplexChannel<AppendEntriesRequest, AppendEntriesResponse>>,
    disconnected_nodes: Arc<RwLock<HashSet<String>>>,
}

impl InProcPeerCommunicator {
    /// Create new instance of the InProcPeerCommunicator with member addresses and communication timeout.
    pub fn new(nodes: Vec<String>, timeout: Duration) -> InProcPeerCommunicator {
        let mut communicator = InProcPeerCommunicator {
            timeout,
            votes_channels: HashMap::new(),
            append_entries_channels: HashMap::new(),
            disconnected_nodes: Arc::new(RwLock::new(HashSet::new())),
        };

        for node in nodes {
            communicator.add_node_communication(node);
        }

        communicator
    }

    fn add_node_communication(&mut self, node: String) {
        let vote_duplex = DuplexChannel::new(format!("Vote channel Node={}", node), self.timeout);
        let append_entries_duplex = DuplexChannel::new(
            format!("AppendEntries channel Node={}", node),
            self.timeout,
        );

        self.votes_channels.insert(node.clone(), vote_duplex);
        self.append_entries_channels
            .insert(node, append_entries_duplex);
    }

    /// Cuts the node off: requests from it and to it fail without waiting.
    pub fn disconnect_node(&self, node: &str) {
        info!("Node {} disconnected", node);
        self.disconnected_nodes.write().insert(node.to_string());
    }

    pub fn reconnect_node(&self, node: &str) {
        info!("Node {} reconnected", node);
        self.disconnected_nodes.write().remove(node);
    }

    pub fn is_connected(&self, node: &str) -> bool {
        !self.disconnected_nodes.read().contains(node)
    }

    pub fn vote_request_rx(&self, node: &str) -> Option<Receiver<VoteEnvelope>> {
        self.votes_channels.get(node).map(|channel| channel.request_rx())
    }

    pub fn append_entries_request_rx(&self, node: &str) -> Option<Receiver<AppendEntriesEnvelope>> {
        self.append_entries_channels
            .get(node)
            .map(|channel| channel.request_rx())
    }

    fn check_link(&self, source: &str, destination: &str) -> Result<()> {
        let disconnected_nodes = self.disconnected_nodes.read();
        if disconnected_nodes.contains(destination) {
            return communication_err(destination, "destination is disconnected".to_string());
        }
        if disconnected_nodes.contains(source) {
            return communication_err(destination, format!("source {} is disconnected", source));
        }

        Ok(())
    }
}

impl PeerRequestHandler for InProcPeerCommunicator {
    fn send_vote_request(&self, destination: &str, request: VoteRequest) -> Result<VoteResponse> {
        trace!("Destination Node {} Sending request {}", destination, request);

        self.check_link(&request.candidate_id, destination)?;
        let resp = match self.votes_channels.get(destination) {
            Some(channel) => channel.send_request(destination, request),
            None => communication_err(destination, "unknown node".to_string()),
        };

        trace!("Destination Node {} Response {:?}", destination, resp);

        resp
    }

    fn send_append_entries_request(
        &self,
        destination: &str,
        request: AppendEntriesRequest,
    ) -> Result<AppendEntriesResponse> {
        trace!("Destination Node {} Sending request {}", destination, request);

        self.check_link(&request.leader_id, destination)?;
        let resp = match self.append_entries_channels.get(destination) {
            Some(channel) => channel.send_request(destination, request),
            None => communication_err(destination, "unknown node".to_string()),
        };

        trace!("Destination Node {} Response {:?}", destination, resp);

        resp
    }
}
