use election::{
    ElectionConfig, ElectionManager, ElectionManagerParams, NodeState, RandomizedElectionTimer,
};
use election_modules::{InProcPeerCommunicator, MemoryNodeStateSaver};
use std::thread;
use std::time::Duration;

pub mod cluster;

pub fn sleep(seconds: u64) {
    thread::sleep(Duration::from_secs(seconds));
}

pub fn sleep_ms(milliseconds: u64) {
    thread::sleep(Duration::from_millis(milliseconds));
}

pub fn get_peers_communication_timeout() -> Duration {
    Duration::from_millis(100)
}

pub fn get_election_config() -> ElectionConfig {
    ElectionConfig::default()
}

pub fn node_addresses(count: usize) -> Vec<String> {
    (1..=count).map(|id| format!("db-{}:27017", id)).collect()
}

pub fn get_peer_communicator(nodes: Vec<String>) -> InProcPeerCommunicator {
    InProcPeerCommunicator::new(nodes, get_peers_communication_timeout())
}

/// Requests to a node that stopped answering wait this long before failing.
pub fn get_slow_peers_communication_timeout() -> Duration {
    Duration::from_millis(500)
}

pub fn get_slow_peer_communicator(nodes: Vec<String>) -> InProcPeerCommunicator {
    InProcPeerCommunicator::new(nodes, get_slow_peers_communication_timeout())
}

/// Node with the randomized election timer and no persistence.
pub fn create_node_inproc(
    address: &str,
    all_nodes: Vec<String>,
    peer_communicator: InProcPeerCommunicator,
) -> ElectionManager {
    ElectionManager::new(address, all_nodes, get_election_config(), peer_communicator)
        .expect("valid node configuration")
}

/// Node that saves its term and vote to the provided saver and starts from `initial_state`.
pub fn create_node_with_saver(
    address: &str,
    all_nodes: Vec<String>,
    peer_communicator: InProcPeerCommunicator,
    state_saver: MemoryNodeStateSaver,
    initial_state: NodeState,
) -> ElectionManager {
    let config = get_election_config();
    let election_timer = RandomizedElectionTimer::from_config(&config).expect("valid timeouts");

    ElectionManager::from_params(ElectionManagerParams {
        self_address: address.to_string(),
        peer_addresses: all_nodes,
        config,
        peer_communicator,
        election_timer,
        state_saver,
        initial_state,
    })
    .expect("valid node configuration")
}
