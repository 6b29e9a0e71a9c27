use crate::steps;

use election::NodeState;
use election_modules::MemoryNodeStateSaver;

pub fn run() {
    let node_ids = steps::node_addresses(3);
    let saver = MemoryNodeStateSaver::new();
    let restarted_node = node_ids[0].clone();

    let node_creator = |address: &str, all_nodes, peer_communicator| {
        if address == restarted_node {
            return steps::create_node_with_saver(
                address,
                all_nodes,
                peer_communicator,
                saver.clone(),
                NodeState::default(),
            );
        }
        steps::create_node_inproc(address, all_nodes, peer_communicator)
    };

    let peer_communicator = steps::get_peer_communicator(node_ids.clone());
    let mut cluster = steps::cluster::start_initial_cluster(
        node_ids.clone(),
        node_ids.clone(),
        peer_communicator,
        node_creator,
    );

    steps::sleep(2);

    let term_before_restart = cluster
        .manager(&restarted_node)
        .current_term()
        .expect("can get term");
    cluster.kill_node(&restarted_node);

    let saved_state = saver.last_saved();
    info!("--Restarting from {}", saved_state);
    assert!(saved_state.current_term >= term_before_restart);

    cluster.add_node(&restarted_node, |address: &str, all_nodes, peer_communicator| {
        steps::create_node_with_saver(
            address,
            all_nodes,
            peer_communicator,
            saver.clone(),
            saved_state.clone(),
        )
    });

    // the restored term is never lower than what was saved
    let restored_term = cluster
        .manager(&restarted_node)
        .current_term()
        .expect("can get term");
    assert!(restored_term >= term_before_restart);

    steps::sleep(2);

    let leader = cluster.find_a_leader();
    cluster.assert_leader_is_known(&leader, &node_ids);

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_restart() {
        crate::cases::restart::run()
    }
}
