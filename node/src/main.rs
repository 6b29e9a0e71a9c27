#[macro_use]
extern crate log;
extern crate chrono;
extern crate env_logger;

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::prelude::{DateTime, Local};

extern crate election;
extern crate election_modules;

use election::{ElectionConfig, ElectionManager, ElectionManagerParams, NodeState};
use election::{RandomizedElectionTimer, Worker};
use election_modules::{InProcPeerCommunicator, MockNodeStateSaver, PeerRequestProcessorParams};

fn init_logger() {
    env_logger::builder()
        .format(|buf, record| {
            let now: DateTime<Local> = Local::now();
            writeln!(
                buf,
                "{:5}: {} - {}",
                record.level(),
                now.format("%H:%M:%S.%3f"),
                record.args()
            )
        })
        .init();
}

struct DemoNode {
    manager: Arc<ElectionManager>,
    request_processor: Worker,
}

fn main() {
    init_logger();

    info!("Replica set demo started");
    let all_nodes: Vec<String> = (1..=3).map(get_address).collect();
    let peer_communicator = InProcPeerCommunicator::new(all_nodes.clone(), get_communication_timeout());

    let mut nodes: Vec<DemoNode> = all_nodes
        .iter()
        .map(|address| start_node(address, all_nodes.clone(), peer_communicator.clone()))
        .collect();

    thread::sleep(Duration::from_secs(2));
    let leader = match report_leader(&nodes) {
        Some(leader) => leader,
        None => {
            error!("No leader elected");
            return;
        }
    };

    info!("Killing the leader {}", leader);
    peer_communicator.disconnect_node(&leader);
    if let Some(position) = nodes
        .iter()
        .position(|node| node.manager.self_address() == leader)
    {
        stop_node(nodes.remove(position));
    }

    thread::sleep(Duration::from_secs(2));
    match report_leader(&nodes) {
        Some(new_leader) => info!("Fail-over completed: {} replaced {}", new_leader, leader),
        None => error!("No leader elected after the fail-over"),
    }

    for node in nodes {
        stop_node(node);
    }
    info!("Replica set demo completed");
}

fn start_node(address: &str, all_nodes: Vec<String>, peer_communicator: InProcPeerCommunicator) -> DemoNode {
    let config = ElectionConfig::default();
    let election_timer = RandomizedElectionTimer::from_config(&config).expect("valid timeouts");

    let manager = Arc::new(
        ElectionManager::from_params(ElectionManagerParams {
            self_address: address.to_string(),
            peer_addresses: all_nodes,
            config,
            peer_communicator: peer_communicator.clone(),
            election_timer,
            state_saver: MockNodeStateSaver::default(),
            initial_state: NodeState::default(),
        })
        .expect("valid node configuration"),
    );

    let node_address = address.to_string();
    manager.set_on_leadership_change(move |is_leader| {
        if is_leader {
            info!("Node {} is the primary now", node_address);
        } else {
            info!("Node {} is not the primary anymore", node_address);
        }
    });

    let request_processor = PeerRequestProcessorParams::new(manager.clone(), &peer_communicator)
        .expect("node is registered")
        .serve();
    manager.start().expect("can start node");

    DemoNode {
        manager,
        request_processor,
    }
}

fn stop_node(node: DemoNode) {
    node.request_processor.terminate();
    node.request_processor.join();

    if let Err(err) = node.manager.stop() {
        error!("Node {} cannot be stopped: {}", node.manager.self_address(), err);
    }
}

fn report_leader(nodes: &[DemoNode]) -> Option<String> {
    let mut leader = None;
    for node in nodes {
        match node.manager.stats() {
            Ok(stats) => {
                info!("{}", stats);
                if stats.is_leader() {
                    leader = Some(stats.self_address);
                }
            }
            Err(err) => error!("Cannot get stats: {}", err),
        }
    }

    leader
}

fn get_communication_timeout() -> Duration {
    Duration::from_millis(100)
}

fn get_address(node_id: u64) -> String {
    format!("127.0.0.1:{}", 27016 + node_id)
}
