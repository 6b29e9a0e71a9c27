use crate::steps;

use election::NodeStatus;

pub fn run() {
    let all_nodes = steps::node_addresses(3);
    let node_ids = vec![all_nodes[0].clone()];

    let peer_communicator = steps::get_peer_communicator(all_nodes.clone());
    for absent_node in &all_nodes[1..] {
        peer_communicator.disconnect_node(absent_node);
    }

    let cluster = steps::cluster::start_initial_cluster(
        node_ids.clone(),
        all_nodes,
        peer_communicator,
        steps::create_node_inproc,
    );

    steps::sleep(2);

    let stats = cluster
        .manager(&node_ids[0])
        .stats()
        .expect("can get stats");
    info!("--{}", stats);

    // one vote out of three: the node keeps starting elections
    assert_ne!(NodeStatus::Leader, stats.status);
    assert!(stats.current_term > 1);
    assert_eq!(None, stats.current_leader);
    assert!(cluster.leaders().is_empty());

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_no_quorum() {
        crate::cases::no_quorum::run()
    }
}
