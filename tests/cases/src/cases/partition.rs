use crate::steps;

pub fn run() {
    let node_ids = steps::node_addresses(3);

    let peer_communicator = steps::get_peer_communicator(node_ids.clone());
    let cluster = steps::cluster::start_initial_cluster(
        node_ids.clone(),
        node_ids.clone(),
        peer_communicator,
        steps::create_node_inproc,
    );

    steps::sleep(2);

    let old_leader = cluster.find_a_leader();

    // the old leader keeps running but cannot reach anyone
    cluster.disconnect_node(&old_leader);

    steps::sleep(2);

    let majority: Vec<String> = node_ids
        .iter()
        .filter(|address| **address != old_leader)
        .cloned()
        .collect();
    let new_leader = cluster.find_a_leader_among(&majority);
    let new_term = cluster
        .manager(&new_leader)
        .current_term()
        .expect("can get term");

    cluster.reconnect_node(&old_leader);

    steps::sleep(1);

    // the higher term wins once the partition heals
    let leader = cluster.find_a_leader();
    assert_ne!(old_leader, leader);
    cluster.assert_leader_is_known(&leader, &node_ids);

    let old_leader_term = cluster
        .manager(&old_leader)
        .current_term()
        .expect("can get term");
    assert!(old_leader_term >= new_term);

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_partition() {
        crate::cases::partition::run()
    }
}
