use election::{ElectionManager, Worker};
use election_modules::{InProcPeerCommunicator, PeerRequestProcessorParams};
use std::collections::HashMap;
use std::sync::Arc;

pub struct CaseNode {
    pub manager: Arc<ElectionManager>,
    request_processor: Worker,
}

pub struct CaseCluster {
    pub all_nodes: Vec<String>,
    pub peer_communicator: InProcPeerCommunicator,
    pub nodes: HashMap<String, CaseNode>,
}

/// Creates, serves and starts the given nodes. `all_nodes` is the configured membership and
/// may contain nodes that are never started.
pub fn start_initial_cluster<F>(
    nodes: Vec<String>,
    all_nodes: Vec<String>,
    peer_communicator: InProcPeerCommunicator,
    node_creator: F,
) -> CaseCluster
where
    F: Fn(&str, Vec<String>, InProcPeerCommunicator) -> ElectionManager,
{
    let mut cluster = CaseCluster {
        all_nodes,
        peer_communicator,
        nodes: HashMap::new(),
    };

    //run initial cluster
    for address in nodes {
        cluster.add_node(&address, &node_creator);
    }

    cluster
}

impl CaseCluster {
    pub fn add_node<F>(&mut self, address: &str, node_creator: F)
    where
        F: Fn(&str, Vec<String>, InProcPeerCommunicator) -> ElectionManager,
    {
        let manager = Arc::new(node_creator(
            address,
            self.all_nodes.clone(),
            self.peer_communicator.clone(),
        ));
        let request_processor = PeerRequestProcessorParams::new(manager.clone(), &self.peer_communicator)
            .expect("node is registered in the communicator")
            .serve();

        self.peer_communicator.reconnect_node(address);
        manager.start().expect("can start node");

        self.nodes.insert(
            address.to_string(),
            CaseNode {
                manager,
                request_processor,
            },
        );
    }

    pub fn manager(&self, address: &str) -> Arc<ElectionManager> {
        self.nodes[address].manager.clone()
    }

    pub fn leaders(&self) -> Vec<String> {
        let mut leaders: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.manager.is_leader())
            .map(|(address, _)| address.clone())
            .collect();
        leaders.sort();

        leaders
    }

    /// Returns the single leader among the given nodes. Panics on zero or several leaders.
    pub fn find_a_leader_among(&self, addresses: &[String]) -> String {
        let leaders: Vec<String> = self
            .leaders()
            .into_iter()
            .filter(|leader| addresses.contains(leader))
            .collect();
        info!("--Leaders: {:?}", leaders);

        assert_eq!(1, leaders.len(), "expected exactly one leader");
        leaders[0].clone()
    }

    pub fn find_a_leader(&self) -> String {
        let addresses: Vec<String> = self.nodes.keys().cloned().collect();
        self.find_a_leader_among(&addresses)
    }

    /// Every node reports `leader` as the current leader.
    pub fn assert_leader_is_known(&self, leader: &str, addresses: &[String]) {
        for address in addresses {
            let stats = self.manager(address).stats().expect("can get stats");
            info!("--{}", stats);
            assert_eq!(Some(leader.to_string()), stats.current_leader);
        }
    }

    /// Stops the node and cuts it off the communicator.
    pub fn kill_node(&mut self, address: &str) {
        self.peer_communicator.disconnect_node(address);
        if let Some(node) = self.nodes.remove(address) {
            node.terminate();
        }
        info!("--Node {} killed", address);
    }

    /// Stops the node but leaves it connected: requests to it wait for the communicator
    /// timeout instead of failing at once.
    pub fn crash_node(&mut self, address: &str) {
        if let Some(node) = self.nodes.remove(address) {
            node.terminate();
        }
        info!("--Node {} crashed", address);
    }

    pub fn disconnect_node(&self, address: &str) {
        self.peer_communicator.disconnect_node(address);
    }

    pub fn reconnect_node(&self, address: &str) {
        self.peer_communicator.reconnect_node(address);
    }

    pub fn terminate(self) {
        for (_, node) in self.nodes {
            node.terminate();
        }
    }
}

impl CaseNode {
    fn terminate(self) {
        self.request_processor.terminate();
        self.request_processor.join();

        if let Err(err) = self.manager.stop() {
            panic!("node cannot be stopped: {}", err);
        }
    }
}
